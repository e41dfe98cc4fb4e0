//! Small SQL fragment builders shared by repository statements.
//!
//! Placeholders are positional (`?1`, `?2`, ...) and numbered in push order,
//! so the returned bind list can be passed straight to `params_from_iter`.

use rusqlite::types::Value;

/// Accumulates `column = ?N` assignment clauses for a partial UPDATE.
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Assignments {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds `column = ?N` only when `value` is present.
    pub(crate) fn push_opt(&mut self, column: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.values.push(Value::Text(value.to_string()));
            self.clauses.push(format!("{column} = ?{}", self.values.len()));
        }
    }

    /// Renders the comma-joined SET list.
    pub(crate) fn sql(&self) -> String {
        self.clauses.join(", ")
    }

    /// Appends a trailing bind value (e.g. the WHERE key) and returns its
    /// placeholder index.
    pub(crate) fn bind_trailing(&mut self, value: Value) -> usize {
        self.values.push(value);
        self.values.len()
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Accumulates a conjunctive WHERE predicate rooted at `1 = 1`.
#[derive(Debug)]
pub(crate) struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    pub(crate) fn new() -> Self {
        Self {
            clauses: vec!["1 = 1".to_string()],
            values: Vec::new(),
        }
    }

    /// Adds `column = ?N` only when `value` is present.
    pub(crate) fn push_eq(&mut self, column: &'static str, value: Option<Value>) {
        if let Some(value) = value {
            self.values.push(value);
            self.clauses.push(format!("{column} = ?{}", self.values.len()));
        }
    }

    pub(crate) fn sql(&self) -> String {
        self.clauses.join(" AND ")
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignments, Conditions};
    use rusqlite::types::Value;

    #[test]
    fn assignments_skip_absent_values_and_number_placeholders() {
        let mut set = Assignments::new();
        set.push_opt("name", None);
        set.push_opt("region", Some("eu-west-1"));
        set.push_opt("bucket", Some("assets"));
        assert_eq!(set.sql(), "region = ?1, bucket = ?2");

        let id_index = set.bind_trailing(Value::Integer(4));
        assert_eq!(id_index, 3);
        assert_eq!(
            set.into_values(),
            vec![
                Value::Text("eu-west-1".to_string()),
                Value::Text("assets".to_string()),
                Value::Integer(4),
            ]
        );
    }

    #[test]
    fn assignments_without_values_are_empty() {
        let mut set = Assignments::new();
        set.push_opt("name", None);
        assert_eq!(set.sql(), "");
        assert!(set.into_values().is_empty());
    }

    #[test]
    fn conditions_always_have_a_base_predicate() {
        let conditions = Conditions::new();
        assert_eq!(conditions.sql(), "1 = 1");
        assert!(conditions.into_values().is_empty());
    }

    #[test]
    fn conditions_join_present_filters_with_and() {
        let mut conditions = Conditions::new();
        conditions.push_eq("id", Some(Value::Integer(3)));
        conditions.push_eq("name", Some(Value::Text("s3".to_string())));
        assert_eq!(conditions.sql(), "1 = 1 AND id = ?1 AND name = ?2");
        assert_eq!(conditions.into_values().len(), 2);
    }
}
