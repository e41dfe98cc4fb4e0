//! Storage configuration domain model.
//!
//! # Responsibility
//! - Define the canonical record describing one object-storage target.
//! - Define the request shapes accepted by the storage repository.
//!
//! # Invariants
//! - `id` is assigned by the store on create and never changes afterward.
//! - Every non-id field may be patched independently.
//! - `Debug` output never contains `secret_key`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Surrogate primary key assigned by the store.
pub type StorageId = i64;

const REDACTED: &str = "<redacted>";

/// Persisted object-storage configuration (endpoint, bucket and credentials).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Storage {
    pub id: StorageId,
    /// Human-readable label, unique per table.
    pub name: String,
    /// Network address of the storage provider.
    pub end_point: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    /// Prefix prepended to generated object URLs.
    pub url_prefix: String,
}

impl Debug for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("end_point", &self.end_point)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &REDACTED)
            .field("bucket", &self.bucket)
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// Input for creating a storage record. All fields are required here;
/// callers fill defaults upstream.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageCreate {
    pub name: String,
    pub end_point: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub url_prefix: String,
}

impl Debug for StorageCreate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCreate")
            .field("name", &self.name)
            .field("end_point", &self.end_point)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &REDACTED)
            .field("bucket", &self.bucket)
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// Partial update input. `None` fields are left untouched.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePatch {
    pub id: StorageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
}

impl StoragePatch {
    /// Creates an empty patch targeting `id`.
    pub fn new(id: StorageId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, value: impl Into<String>) -> Self {
        self.name = Some(value.into());
        self
    }

    pub fn with_end_point(mut self, value: impl Into<String>) -> Self {
        self.end_point = Some(value.into());
        self
    }

    pub fn with_region(mut self, value: impl Into<String>) -> Self {
        self.region = Some(value.into());
        self
    }

    pub fn with_access_key(mut self, value: impl Into<String>) -> Self {
        self.access_key = Some(value.into());
        self
    }

    pub fn with_secret_key(mut self, value: impl Into<String>) -> Self {
        self.secret_key = Some(value.into());
        self
    }

    pub fn with_bucket(mut self, value: impl Into<String>) -> Self {
        self.bucket = Some(value.into());
        self
    }

    pub fn with_url_prefix(mut self, value: impl Into<String>) -> Self {
        self.url_prefix = Some(value.into());
        self
    }

    /// Returns `true` when no field besides `id` is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.end_point.is_none()
            && self.region.is_none()
            && self.access_key.is_none()
            && self.secret_key.is_none()
            && self.bucket.is_none()
            && self.url_prefix.is_none()
    }

    /// Validates the patch before any SQL is issued.
    ///
    /// # Errors
    /// - `StorageValidationError::EmptyPatch` when no field is present.
    pub fn validate(&self) -> Result<(), StorageValidationError> {
        if self.is_empty() {
            return Err(StorageValidationError::EmptyPatch { id: self.id });
        }
        Ok(())
    }
}

impl Debug for StoragePatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoragePatch")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("end_point", &self.end_point)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| REDACTED))
            .field("bucket", &self.bucket)
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// Filter for find/list queries. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageFind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StorageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl StorageFind {
    pub fn by_id(id: StorageId) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Delete request addressing exactly one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDelete {
    pub id: StorageId,
}

/// Request-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageValidationError {
    /// Patch carried no field to update.
    EmptyPatch { id: StorageId },
}

impl Display for StorageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPatch { id } => {
                write!(f, "storage patch for id {id} contains no fields to update")
            }
        }
    }
}

impl Error for StorageValidationError {}

#[cfg(test)]
mod tests {
    use super::{Storage, StorageCreate, StoragePatch, StorageValidationError};

    #[test]
    fn empty_patch_is_rejected() {
        let patch = StoragePatch::new(7);
        assert!(patch.is_empty());
        assert_eq!(
            patch.validate(),
            Err(StorageValidationError::EmptyPatch { id: 7 })
        );
    }

    #[test]
    fn patch_with_one_field_is_valid() {
        let patch = StoragePatch::new(7).with_bucket("assets-v2");
        assert!(!patch.is_empty());
        assert!(patch.validate().is_ok());
    }

    #[test]
    fn debug_output_redacts_secret_key() {
        let storage = Storage {
            id: 1,
            name: "s3".to_string(),
            end_point: "https://s3.example.com".to_string(),
            region: "us-east-1".to_string(),
            access_key: "AK".to_string(),
            secret_key: "very-secret".to_string(),
            bucket: "assets".to_string(),
            url_prefix: "https://cdn.example.com/".to_string(),
        };
        let rendered = format!("{storage:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));

        let create = StorageCreate {
            name: storage.name.clone(),
            end_point: storage.end_point.clone(),
            region: storage.region.clone(),
            access_key: storage.access_key.clone(),
            secret_key: storage.secret_key.clone(),
            bucket: storage.bucket.clone(),
            url_prefix: storage.url_prefix.clone(),
        };
        assert!(!format!("{create:?}").contains("very-secret"));

        let patch = StoragePatch::new(1).with_secret_key("very-secret");
        assert!(!format!("{patch:?}").contains("very-secret"));
    }
}
