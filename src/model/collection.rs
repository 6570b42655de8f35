//! Collection and field definitions, as read from configuration.

use serde::{Deserialize, Serialize};

fn default_widget() -> String {
    "string".to_string()
}

fn default_required() -> bool {
    true
}

/// A field of a collection.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default = "default_widget")]
    pub widget: String,
    /// Required fields must be present and non-empty before persisting.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Wire format for date-like widgets (strftime syntax).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Nested fields of `object` and `list` widgets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>, widget: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            widget: widget.into(),
            required: true,
            format: None,
            fields: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

/// A named group of entries sharing a field schema.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Folder the provider stores entries under.
    #[serde(default)]
    pub folder: String,
    /// Field the provider derives new slugs from.
    #[serde(default = "Collection::default_identifier_field")]
    pub identifier_field: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Collection {
    fn default_identifier_field() -> String {
        "title".to_string()
    }

    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            folder: format!("content/{name}"),
            name,
            identifier_field: Self::default_identifier_field(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Path an entry with `slug` is stored under.
    pub fn entry_path(&self, slug: &str) -> String {
        if self.folder.is_empty() {
            format!("{slug}.md")
        } else {
            format!("{}/{slug}.md", self.folder.trim_end_matches('/'))
        }
    }
}
