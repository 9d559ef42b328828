//! Declarative schema exposed to the orchestrator
//!
//! Each resource and data source describes its fields here. The schema is
//! used for two things: it is published as JSON so the host can show what
//! a document may contain, and it validates a desired document before the
//! typed decoder runs, so a missing field is reported by its dotted path
//! instead of as a serde message.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Value type of a field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Bool,
    Int,
    /// Ordered list
    List { elem: Box<FieldKind> },
    /// Unordered set
    Set { elem: Box<FieldKind> },
    /// Nested object
    Block { schema: Schema },
    /// String restricted to a closed set of values
    Enum { values: Vec<&'static str> },
    /// Any one of several kinds
    OneOf { kinds: Vec<FieldKind> },
}

impl FieldKind {
    pub fn list(elem: FieldKind) -> Self {
        FieldKind::List {
            elem: Box::new(elem),
        }
    }

    pub fn set(elem: FieldKind) -> Self {
        FieldKind::Set {
            elem: Box::new(elem),
        }
    }

    pub fn block(schema: Schema) -> Self {
        FieldKind::Block { schema }
    }

    fn strip_computed(&self, value: &mut Value) {
        match self {
            FieldKind::Block { schema } => schema.strip_computed(value),
            FieldKind::List { elem } | FieldKind::Set { elem } => {
                if let Some(items) = value.as_array_mut() {
                    items.iter_mut().for_each(|item| elem.strip_computed(item));
                }
            }
            _ => {}
        }
    }

    fn describe(&self) -> String {
        match self {
            FieldKind::String => "a string".to_string(),
            FieldKind::Bool => "a boolean".to_string(),
            FieldKind::Int => "an integer".to_string(),
            FieldKind::List { .. } => "a list".to_string(),
            FieldKind::Set { .. } => "a set".to_string(),
            FieldKind::Block { .. } => "an object".to_string(),
            FieldKind::Enum { values } => format!("one of {:?}", values),
            FieldKind::OneOf { kinds } => kinds
                .iter()
                .map(FieldKind::describe)
                .collect::<Vec<_>>()
                .join(" or "),
        }
    }
}

/// Whether the user must, may, or cannot set a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMode {
    Required,
    Optional,
    /// Populated by Read; ignored in desired documents
    Computed,
}

/// A named field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub mode: FieldMode,
    pub description: &'static str,
}

/// Set of fields of one resource, data source or nested block
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.field(name, kind, FieldMode::Required, description)
    }

    pub fn optional(self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.field(name, kind, FieldMode::Optional, description)
    }

    pub fn computed(self, name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        self.field(name, kind, FieldMode::Computed, description)
    }

    fn field(
        mut self,
        name: &'static str,
        kind: FieldKind,
        mode: FieldMode,
        description: &'static str,
    ) -> Self {
        self.fields.push(Field {
            name,
            kind,
            mode,
            description,
        });
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a desired document against this schema
    ///
    /// Reports the first problem found: a missing required field, a value of
    /// the wrong type, or a field the schema does not declare. Values of
    /// computed fields are not checked.
    pub fn validate(&self, document: &Value) -> Result<()> {
        self.validate_at("", document)
    }

    /// Drop every computed value from a desired document, nested blocks included
    pub fn strip_computed(&self, document: &mut Value) {
        let Some(object) = document.as_object_mut() else {
            return;
        };
        for field in &self.fields {
            if field.mode == FieldMode::Computed {
                object.remove(field.name);
            } else if let Some(value) = object.get_mut(field.name) {
                field.kind.strip_computed(value);
            }
        }
    }

    fn validate_at(&self, prefix: &str, value: &Value) -> Result<()> {
        let object = value.as_object().ok_or_else(|| {
            if prefix.is_empty() {
                Error::validation("document must be an object")
            } else {
                Error::validation(format!("field `{}` must be an object", prefix))
            }
        })?;

        if let Some(unknown) = object.keys().find(|key| self.get(key).is_none()) {
            return Err(Error::validation(format!(
                "unknown field `{}`",
                join_path(prefix, unknown)
            )));
        }

        for field in &self.fields {
            let path = join_path(prefix, field.name);
            match object.get(field.name) {
                None | Some(Value::Null) => {
                    if field.mode == FieldMode::Required {
                        return Err(Error::validation(format!(
                            "missing required field `{}`",
                            path
                        )));
                    }
                }
                Some(_) if field.mode == FieldMode::Computed => {}
                Some(v) => check_kind(&path, &field.kind, v)?,
            }
        }

        Ok(())
    }
}

fn check_kind(path: &str, kind: &FieldKind, value: &Value) -> Result<()> {
    let matches = match kind {
        FieldKind::String => value.is_string(),
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Int => value.is_i64() || value.is_u64(),
        FieldKind::List { elem } | FieldKind::Set { elem } => {
            let Some(items) = value.as_array() else {
                return Err(mismatch(path, kind));
            };
            for (i, item) in items.iter().enumerate() {
                check_kind(&format!("{}.{}", path, i), elem, item)?;
            }
            true
        }
        FieldKind::Block { schema } => return schema.validate_at(path, value),
        FieldKind::Enum { values } => value.as_str().is_some_and(|s| values.contains(&s)),
        FieldKind::OneOf { kinds } => kinds.iter().any(|k| check_kind(path, k, value).is_ok()),
    };

    if matches {
        Ok(())
    } else {
        Err(mismatch(path, kind))
    }
}

fn mismatch(path: &str, kind: &FieldKind) -> Error {
    Error::validation(format!("field `{}` must be {}", path, kind.describe()))
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::new()
            .required("profile_id", FieldKind::String, "")
            .computed("endpoint", FieldKind::String, "")
            .optional("tags", FieldKind::list(FieldKind::String), "")
            .required(
                "logs",
                FieldKind::block(
                    Schema::new()
                        .required("enabled", FieldKind::Bool, "")
                        .required(
                            "retention",
                            FieldKind::OneOf {
                                kinds: vec![
                                    FieldKind::Enum {
                                        values: vec!["1 hour", "1 day"],
                                    },
                                    FieldKind::Int,
                                ],
                            },
                            "",
                        ),
                ),
                "",
            )
    }

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "profile_id": "abc123",
            "tags": ["a", "b"],
            "logs": {"enabled": true, "retention": "1 day"}
        });
        assert!(sample().validate(&doc).is_ok());

        let raw = json!({"profile_id": "abc123", "logs": {"enabled": false, "retention": 3600}});
        assert!(sample().validate(&raw).is_ok());
    }

    #[test]
    fn test_missing_nested_field_reports_path() {
        let doc = json!({"profile_id": "abc123", "logs": {"retention": "1 day"}});
        let err = sample().validate(&doc).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("`logs.enabled`"), "{}", err);
    }

    #[test]
    fn test_type_mismatches() {
        let bad_enum = json!({"profile_id": "x", "logs": {"enabled": true, "retention": "forever"}});
        assert!(sample().validate(&bad_enum).is_err());

        let bad_item = json!({"profile_id": "x", "tags": ["a", 1], "logs": {"enabled": true, "retention": 1}});
        let err = sample().validate(&bad_item).unwrap_err();
        assert!(err.to_string().contains("`tags.1`"), "{}", err);
    }

    #[test]
    fn test_computed_values_are_ignored_and_unknown_rejected() {
        let with_computed = json!({"profile_id": "x", "endpoint": 5, "logs": {"enabled": true, "retention": 1}});
        assert!(sample().validate(&with_computed).is_ok());

        let unknown = json!({"profile_id": "x", "bogus": 1, "logs": {"enabled": true, "retention": 1}});
        let err = sample().validate(&unknown).unwrap_err();
        assert!(err.to_string().contains("`bogus`"));
    }

    #[test]
    fn test_strip_computed_removes_only_computed_values() {
        let nested = Schema::new()
            .computed("id", FieldKind::String, "")
            .required("name", FieldKind::String, "");
        let schema = sample().optional("entries", FieldKind::set(FieldKind::block(nested)), "");

        let mut doc = json!({
            "profile_id": "x",
            "endpoint": "https://dns.nextdns.io/x",
            "entries": [{"id": "e1", "name": "a"}],
            "logs": {"enabled": true, "retention": 1}
        });
        schema.strip_computed(&mut doc);

        assert_eq!(
            doc,
            json!({
                "profile_id": "x",
                "entries": [{"name": "a"}],
                "logs": {"enabled": true, "retention": 1}
            })
        );
    }

    #[test]
    fn test_schema_serializes_for_publication() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["fields"][0]["name"], json!("profile_id"));
        assert_eq!(value["fields"][0]["type"], json!("string"));
        assert_eq!(value["fields"][0]["mode"], json!("required"));
    }
}
