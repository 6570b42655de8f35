//! Field value serializers.
//!
//! Widgets may keep values in an in-memory form that differs from what is
//! written to the repository. A serializer registered for the widget name
//! converts between the two; fields without one are passed through.

mod date;

pub use date::DateSerializer;

use crate::model::{EntryData, Field};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Converts one widget's values to and from their stored form.
pub trait FieldSerializer: Send + Sync {
    /// In-memory value to stored value.
    fn serialize(&self, field: &Field, value: &Value) -> Value;

    /// Stored value to in-memory value.
    fn deserialize(&self, field: &Field, value: &Value) -> Value;
}

/// Serializers by widget name.
#[derive(Clone, Default)]
pub struct SerializerRegistry {
    serializers: HashMap<String, Arc<dyn FieldSerializer>>,
}

impl SerializerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in `date` and `datetime` serializers.
    pub fn with_defaults() -> Self {
        Self::new()
            .with("date", DateSerializer)
            .with("datetime", DateSerializer)
    }

    pub fn with(
        mut self,
        widget: impl Into<String>,
        serializer: impl FieldSerializer + 'static,
    ) -> Self {
        self.register(widget, serializer);
        self
    }

    pub fn register(
        &mut self,
        widget: impl Into<String>,
        serializer: impl FieldSerializer + 'static,
    ) {
        self.serializers.insert(widget.into(), Arc::new(serializer));
    }

    pub fn get(&self, widget: &str) -> Option<&dyn FieldSerializer> {
        self.serializers.get(widget).map(Arc::as_ref)
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widgets: Vec<&str> = self.serializers.keys().map(String::as_str).collect();
        widgets.sort_unstable();
        f.debug_struct("SerializerRegistry")
            .field("widgets", &widgets)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Serialize,
    Deserialize,
}

/// Converts `data` to its stored form, recursing into `object` and `list`
/// fields that declare nested fields.
pub fn serialize_values(
    data: &EntryData,
    fields: &[Field],
    registry: &SerializerRegistry,
) -> EntryData {
    convert_map(data, fields, registry, Direction::Serialize)
}

/// Converts stored `data` back to its in-memory form.
pub fn deserialize_values(
    data: &EntryData,
    fields: &[Field],
    registry: &SerializerRegistry,
) -> EntryData {
    convert_map(data, fields, registry, Direction::Deserialize)
}

fn convert_map(
    data: &EntryData,
    fields: &[Field],
    registry: &SerializerRegistry,
    direction: Direction,
) -> EntryData {
    data.iter()
        .map(|(name, value)| {
            let converted = match fields.iter().find(|f| &f.name == name) {
                Some(field) => convert_value(field, value, registry, direction),
                None => value.clone(),
            };
            (name.clone(), converted)
        })
        .collect()
}

fn convert_value(
    field: &Field,
    value: &Value,
    registry: &SerializerRegistry,
    direction: Direction,
) -> Value {
    if let Some(serializer) = registry.get(&field.widget) {
        return match direction {
            Direction::Serialize => serializer.serialize(field, value),
            Direction::Deserialize => serializer.deserialize(field, value),
        };
    }
    if field.fields.is_empty() {
        return value.clone();
    }

    match value {
        Value::Object(map) => Value::Object(convert_map(map, &field.fields, registry, direction)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => {
                        Value::Object(convert_map(map, &field.fields, registry, direction))
                    }
                    other => other.clone(),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
