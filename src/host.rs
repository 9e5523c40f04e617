use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::container::{self, Object, shape_of};
use crate::error::Result;

/// A host field that can act as a root container.
///
/// `as_root_mut` must always hand back a usable map, repairing the field
/// if needed. `as_root` is the non-mutating view and returns `None` when
/// the field is not currently a map.
pub trait RootField {
    fn as_root(&self) -> Option<&Object>;
    fn as_root_mut(&mut self) -> &mut Object;
}

impl RootField for Object {
    fn as_root(&self) -> Option<&Object> {
        Some(self)
    }

    fn as_root_mut(&mut self) -> &mut Object {
        self
    }
}

impl RootField for Value {
    fn as_root(&self) -> Option<&Object> {
        self.as_object()
    }

    fn as_root_mut(&mut self) -> &mut Object {
        container::repair_root(self)
    }
}

/// A record that stores one or more root fields, looked up by name.
pub trait Host {
    fn root_field(&mut self, field: &str) -> Option<&mut Object>;

    fn root_field_ref(&self, field: &str) -> Option<&Object>;
}

/// A record represented as a JSON object whose keys are its columns.
///
/// A missing column is defaulted to an empty map, as a freshly created
/// record would be.
impl Host for Object {
    fn root_field(&mut self, field: &str) -> Option<&mut Object> {
        let slot = self
            .entry(field)
            .or_insert_with(|| Value::Object(Object::new()));
        Some(slot.as_root_mut())
    }

    fn root_field_ref(&self, field: &str) -> Option<&Object> {
        self.get(field).and_then(Value::as_object)
    }
}

impl Host for Value {
    fn root_field(&mut self, field: &str) -> Option<&mut Object> {
        self.as_object_mut()?.root_field(field)
    }

    fn root_field_ref(&self, field: &str) -> Option<&Object> {
        self.as_object()?.root_field_ref(field)
    }
}

/// Field type for a JSON column holding a root container.
///
/// Defaults to an empty map. Loading `null` (or any non-object value)
/// produces an empty map too, so accessors never see anything but a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SerializedMap(Object);

impl SerializedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the field from the text stored in a column. Blank text is an
    /// empty map.
    pub fn from_column(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from(value))
    }

    pub fn to_column(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn into_inner(self) -> Object {
        self.0
    }
}

impl From<Value> for SerializedMap {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::default(),
            other => {
                warn!(found = shape_of(&other), "serialized field is not a map, starting empty");
                Self::default()
            }
        }
    }
}

impl From<Object> for SerializedMap {
    fn from(map: Object) -> Self {
        Self(map)
    }
}

impl<'de> Deserialize<'de> for SerializedMap {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Deref for SerializedMap {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

impl DerefMut for SerializedMap {
    fn deref_mut(&mut self) -> &mut Object {
        &mut self.0
    }
}

impl RootField for SerializedMap {
    fn as_root(&self) -> Option<&Object> {
        Some(&self.0)
    }

    fn as_root_mut(&mut self) -> &mut Object {
        &mut self.0
    }
}
