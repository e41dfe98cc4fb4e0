use assetstore_core::{Storage, StorageFind, StoragePatch};
use serde_json::json;

#[test]
fn storage_serializes_with_camel_case_keys() {
    let storage = Storage {
        id: 3,
        name: "s3".to_string(),
        end_point: "https://s3.example.com".to_string(),
        region: "us-east-1".to_string(),
        access_key: "AK".to_string(),
        secret_key: "SK".to_string(),
        bucket: "assets".to_string(),
        url_prefix: "https://cdn.example.com/".to_string(),
    };

    let value = serde_json::to_value(&storage).unwrap();
    assert_eq!(
        value,
        json!({
            "id": 3,
            "name": "s3",
            "endPoint": "https://s3.example.com",
            "region": "us-east-1",
            "accessKey": "AK",
            "secretKey": "SK",
            "bucket": "assets",
            "urlPrefix": "https://cdn.example.com/"
        })
    );
}

#[test]
fn patch_deserializes_only_supplied_fields() {
    let patch: StoragePatch =
        serde_json::from_value(json!({ "id": 1, "bucket": "assets-v2" })).unwrap();

    assert_eq!(patch, StoragePatch::new(1).with_bucket("assets-v2"));
    assert!(patch.name.is_none());
    assert!(patch.url_prefix.is_none());
}

#[test]
fn find_without_filters_deserializes_to_default() {
    let find: StorageFind = serde_json::from_value(json!({})).unwrap();
    assert_eq!(find, StorageFind::default());
}
