//! Structured-output schema descriptors.
//!
//! A [`ResponseSchema`] describes a flat JSON object whose fields are strings
//! or arrays of strings. Generators translate it into their provider's schema
//! format and validate the returned JSON against it with
//! [`ResponseSchema::validate`].

use serde_json::{json, Map, Value};

/// Declared type of one schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    StringArray,
}

/// One property of the object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Shape of the JSON object a structured completion must return.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseSchema {
    fields: Vec<SchemaField>,
}

impl ResponseSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        self.fields.push(SchemaField {
            name: name.into(),
            kind,
            required,
        });
        self
    }

    /// `{title, content, tags}` with every field required.
    pub fn article() -> Self {
        Self::new()
            .field("title", FieldKind::String, true)
            .field("content", FieldKind::String, true)
            .field("tags", FieldKind::StringArray, true)
    }

    /// `{title, content, tags?}`: a revision may leave the tags out.
    pub fn revision() -> Self {
        Self::new()
            .field("title", FieldKind::String, true)
            .field("content", FieldKind::String, true)
            .field("tags", FieldKind::StringArray, false)
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Render as the OpenAPI-subset object Gemini accepts in `responseSchema`.
    pub fn to_gemini_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let prop = match field.kind {
                FieldKind::String => json!({ "type": "STRING" }),
                FieldKind::StringArray => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
            };
            let _ = properties.insert(field.name.clone(), prop);
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `value` against the declared shape.
    ///
    /// Unknown extra keys are tolerated. A `null` optional field counts as absent.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        let Some(object) = value.as_object() else {
            return Err(format!("expected a JSON object, got {}", kind_name(value)));
        };

        for field in &self.fields {
            match object.get(&field.name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(format!("missing required field `{}`", field.name));
                    }
                }
                Some(found) => check_kind(&field.name, field.kind, found)?,
            }
        }
        Ok(())
    }
}

fn check_kind(name: &str, kind: FieldKind, value: &Value) -> Result<(), String> {
    match kind {
        FieldKind::String if value.is_string() => Ok(()),
        FieldKind::String => Err(format!(
            "field `{name}` must be a string, got {}",
            kind_name(value)
        )),
        FieldKind::StringArray => {
            let Some(items) = value.as_array() else {
                return Err(format!(
                    "field `{name}` must be an array of strings, got {}",
                    kind_name(value)
                ));
            };
            match items.iter().position(|item| !item.is_string()) {
                Some(index) => Err(format!("field `{name}`[{index}] must be a string")),
                None => Ok(()),
            }
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_schema_renders_for_gemini() {
        let schema = ResponseSchema::article().to_gemini_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["title"]["type"], "STRING");
        assert_eq!(schema["properties"]["tags"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["tags"]["items"]["type"], "STRING");
        assert_eq!(schema["required"], json!(["title", "content", "tags"]));
    }

    #[test]
    fn revision_schema_leaves_tags_optional() {
        let schema = ResponseSchema::revision().to_gemini_schema();
        assert_eq!(schema["required"], json!(["title", "content"]));
    }

    #[test]
    fn validate_accepts_conforming_object() {
        let value = json!({"title": "T", "content": "C", "tags": ["a", "b"]});
        assert!(ResponseSchema::article().validate(&value).is_ok());
    }

    #[test]
    fn validate_tolerates_extra_keys() {
        let value = json!({"title": "T", "content": "C", "tags": [], "summary": "x"});
        assert!(ResponseSchema::article().validate(&value).is_ok());
    }

    #[test]
    fn validate_rejects_missing_required() {
        let value = json!({"title": "T", "tags": []});
        let err = ResponseSchema::article().validate(&value).unwrap_err();
        assert!(err.contains("content"), "got: {err}");
    }

    #[test]
    fn validate_rejects_wrong_types() {
        let err = ResponseSchema::article()
            .validate(&json!({"title": 5, "content": "C", "tags": []}))
            .unwrap_err();
        assert!(err.contains("`title` must be a string"), "got: {err}");

        let err = ResponseSchema::article()
            .validate(&json!({"title": "T", "content": "C", "tags": ["a", 1]}))
            .unwrap_err();
        assert!(err.contains("`tags`[1]"), "got: {err}");
    }

    #[test]
    fn validate_rejects_non_object() {
        let err = ResponseSchema::article().validate(&json!(["title"])).unwrap_err();
        assert!(err.contains("array"), "got: {err}");
    }

    #[test]
    fn optional_field_may_be_null_or_absent() {
        let schema = ResponseSchema::revision();
        assert!(schema.validate(&json!({"title": "T", "content": "C"})).is_ok());
        assert!(schema
            .validate(&json!({"title": "T", "content": "C", "tags": null}))
            .is_ok());
    }
}
