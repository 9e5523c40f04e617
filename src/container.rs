//! Primitives for reading and writing inside a root container.
//!
//! Both the [`AccessorSet`](crate::AccessorSet) registry and the code emitted
//! by `nested_accessor!` go through these functions, so lazy creation and
//! type repair of group containers behave the same in both.

use serde::{Deserialize, Serialize};
use serde_json::map::Entry;
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

/// The nested mapping held in a host's serialized field.
pub type Object = Map<String, Value>;

/// Which container a group is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerKind {
    Map,
    List,
}

impl ContainerKind {
    /// A fresh, empty container of this kind.
    pub fn empty(self) -> Value {
        match self {
            ContainerKind::Map => Value::Object(Object::new()),
            ContainerKind::List => Value::Array(Vec::new()),
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            ContainerKind::Map => value.is_object(),
            ContainerKind::List => value.is_array(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerKind::Map => "map",
            ContainerKind::List => "list",
        }
    }
}

/// Describes a JSON value's shape for log output.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

/// A live handle into a group container.
///
/// The handle borrows from the root container, so pushes and inserts made
/// through it land in the host's field directly.
#[derive(Debug)]
pub enum Container<'a> {
    Map(&'a mut Object),
    List(&'a mut Vec<Value>),
}

impl<'a> Container<'a> {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Map(_) => ContainerKind::Map,
            Container::List(_) => ContainerKind::List,
        }
    }

    pub fn into_map(self) -> Option<&'a mut Object> {
        match self {
            Container::Map(map) => Some(map),
            Container::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<&'a mut Vec<Value>> {
        match self {
            Container::List(list) => Some(list),
            Container::Map(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Container::Map(map) => map.is_empty(),
            Container::List(list) => list.is_empty(),
        }
    }
}

/// Returns the slot for `key` in `parent`, holding a container of `kind`.
///
/// A missing key gets a fresh empty container. A key holding any other kind
/// of value is overwritten with a fresh empty container. A key already
/// holding the right kind is returned untouched.
fn slot<'a>(parent: &'a mut Object, key: &str, kind: ContainerKind) -> &'a mut Value {
    match parent.entry(key) {
        Entry::Vacant(entry) => {
            debug!(key, kind = kind.name(), "creating group container");
            entry.insert(kind.empty())
        }
        Entry::Occupied(entry) => {
            let slot = entry.into_mut();
            if !kind.matches(slot) {
                warn!(
                    key,
                    expected = kind.name(),
                    found = shape_of(slot),
                    "replacing group value of the wrong kind"
                );
                *slot = kind.empty();
            }
            slot
        }
    }
}

/// Resolves the group container under `key`, creating or repairing it.
pub fn ensure<'a>(parent: &'a mut Object, key: &str, kind: ContainerKind) -> Container<'a> {
    match slot(parent, key, kind) {
        Value::Object(map) => Container::Map(map),
        Value::Array(list) => Container::List(list),
        _ => unreachable!("slot always holds a container"),
    }
}

/// Resolves a map-backed group under `key`.
pub fn ensure_map<'a>(parent: &'a mut Object, key: &str) -> &'a mut Object {
    let Value::Object(map) = slot(parent, key, ContainerKind::Map) else {
        unreachable!("slot holds a map")
    };
    map
}

/// Resolves a list-backed group under `key`.
pub fn ensure_list<'a>(parent: &'a mut Object, key: &str) -> &'a mut Vec<Value> {
    let Value::Array(list) = slot(parent, key, ContainerKind::List) else {
        unreachable!("slot holds a list")
    };
    list
}

/// Walks a chain of map groups from `root`, creating each one as needed.
pub fn ensure_path<'a, S>(root: &'a mut Object, groups: &[S]) -> &'a mut Object
where
    S: AsRef<str>,
{
    groups
        .iter()
        .fold(root, |parent, group| ensure_map(parent, group.as_ref()))
}

/// Reads a leaf as a string. Unset keys, and keys holding something other
/// than a string, read as `None`. Nothing is written back.
pub fn read_leaf<'a>(parent: &'a Object, key: &str) -> Option<&'a str> {
    parent.get(key).and_then(Value::as_str)
}

/// Reads a leaf as raw JSON, whatever it holds.
pub fn read_leaf_value<'a>(parent: &'a Object, key: &str) -> Option<&'a Value> {
    parent.get(key)
}

/// Stores the string form of `value` under `key`, replacing any prior value.
pub fn write_leaf<V>(parent: &mut Object, key: &str, value: V)
where
    V: ToString,
{
    let value = value.to_string();
    trace!(key, value = %value, "writing leaf");
    parent.insert(key.to_owned(), Value::String(value));
}

/// Makes a host field usable as a root container.
///
/// Null and other non-object values are replaced with an empty map, the
/// same default a freshly loaded record gets.
pub fn repair_root(value: &mut Value) -> &mut Object {
    if !value.is_object() {
        if !value.is_null() {
            warn!(found = shape_of(value), "replacing non-map root field");
        }
        *value = Value::Object(Object::new());
    }
    let Value::Object(map) = value else {
        unreachable!("root was just replaced with a map")
    };
    map
}
