//! Declarations: the ordered list of directives describing which accessors
//! to generate for one root field.
//!
//! A declaration can be built in code with the [`Declaration`] builder
//! methods, or loaded from JSON:
//!
//! ```
//! use nested_accessors::Declaration;
//!
//! let declaration = Declaration::from_json_str(
//!     r#"["phone", {"address": ["street", "city"], "balls": "List"}]"#,
//! )
//! .unwrap();
//! assert_eq!(declaration.len(), 3);
//! ```
//!
//! JSON elements are one of: a string (one root leaf), an array of strings
//! (several root leaves), or an object whose entries each declare a group.
//! A group value is an array of leaf names, the string `"List"` (a
//! list-backed group), a single leaf name, or an object mapping second-level
//! group names to leaf names.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Marks a group backed by a list instead of a map.
pub const LIST_MARKER: &str = "List";

/// What sits under a group's subroot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupBody {
    /// `address: [street, city]`
    Leaves(Vec<String>),
    /// `auth: facebook`, shorthand for a one-leaf list
    Leaf(String),
    /// `balls: List`
    List,
    /// `budget: { heating: [high, low] }`
    Nested(Vec<(String, Vec<String>)>),
}

/// One element of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Leaf(String),
    Leaves(Vec<String>),
    Group { subroot: String, body: GroupBody },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    directives: Vec<Directive>,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn leaf(self, name: impl Into<String>) -> Self {
        self.push(Directive::Leaf(name.into()))
    }

    pub fn leaves<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Directive::Leaves(names.into_iter().map(Into::into).collect()))
    }

    pub fn group<I, S>(self, subroot: impl Into<String>, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Directive::Group {
            subroot: subroot.into(),
            body: GroupBody::Leaves(leaves.into_iter().map(Into::into).collect()),
        })
    }

    pub fn group_leaf(self, subroot: impl Into<String>, leaf: impl Into<String>) -> Self {
        self.push(Directive::Group {
            subroot: subroot.into(),
            body: GroupBody::Leaf(leaf.into()),
        })
    }

    pub fn list(self, subroot: impl Into<String>) -> Self {
        self.push(Directive::Group {
            subroot: subroot.into(),
            body: GroupBody::List,
        })
    }

    /// Declares `subroot → { subsubroot: leaves }`.
    ///
    /// Consecutive calls with the same subroot are merged into one
    /// directive, matching what a single JSON object with several
    /// second-level entries produces.
    pub fn nested<I, S>(
        mut self,
        subroot: impl Into<String>,
        subsubroot: impl Into<String>,
        leaves: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let subroot = subroot.into();
        let entry = (
            subsubroot.into(),
            leaves.into_iter().map(Into::into).collect(),
        );
        if let Some(Directive::Group {
            subroot: last,
            body: GroupBody::Nested(entries),
        }) = self.directives.last_mut()
        {
            if *last == subroot {
                entries.push(entry);
                return self;
            }
        }
        self.push(Directive::Group {
            subroot,
            body: GroupBody::Nested(vec![entry]),
        })
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Parses a JSON declaration, rejecting any element whose shape is not
    /// part of the grammar.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::invalid("declaration", "expected an array of directives"));
        };
        let mut directives = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let path = format!("declaration[{index}]");
            match item {
                Value::String(name) => directives.push(Directive::Leaf(name_at(&path, name)?)),
                Value::Array(names) => directives.push(Directive::Leaves(names_at(&path, names)?)),
                Value::Object(groups) => {
                    for (subroot, body) in groups {
                        let path = format!("{path}.{subroot}");
                        directives.push(Directive::Group {
                            subroot: name_at(&path, subroot)?,
                            body: parse_body(&path, body)?,
                        });
                    }
                }
                _ => {
                    return Err(Error::invalid(
                        path,
                        "expected a leaf name, a list of leaf names, or a group object",
                    ));
                }
            }
        }
        Ok(Self { directives })
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.directives.iter().map(Directive::to_value).collect())
    }
}

impl Directive {
    fn to_value(&self) -> Value {
        match self {
            Directive::Leaf(name) => Value::String(name.clone()),
            Directive::Leaves(names) => strings(names),
            Directive::Group { subroot, body } => {
                let body = match body {
                    GroupBody::Leaves(names) => strings(names),
                    GroupBody::Leaf(name) => Value::String(name.clone()),
                    GroupBody::List => Value::String(LIST_MARKER.to_owned()),
                    GroupBody::Nested(entries) => Value::Object(
                        entries
                            .iter()
                            .map(|(subsubroot, names)| (subsubroot.clone(), strings(names)))
                            .collect(),
                    ),
                };
                let mut group = Map::new();
                group.insert(subroot.clone(), body);
                Value::Object(group)
            }
        }
    }
}

fn strings(names: &[String]) -> Value {
    Value::Array(names.iter().cloned().map(Value::String).collect())
}

fn name_at(path: &str, name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::invalid(path, "names must not be empty"));
    }
    Ok(name.to_owned())
}

fn names_at(path: &str, names: &[Value]) -> Result<Vec<String>> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let path = format!("{path}[{index}]");
            match name {
                Value::String(name) => name_at(&path, name),
                _ => Err(Error::invalid(path, "expected a leaf name")),
            }
        })
        .collect()
}

fn parse_body(path: &str, body: &Value) -> Result<GroupBody> {
    match body {
        Value::Array(names) => Ok(GroupBody::Leaves(names_at(path, names)?)),
        Value::String(marker) if marker == LIST_MARKER => Ok(GroupBody::List),
        Value::String(name) => Ok(GroupBody::Leaf(name_at(path, name)?)),
        Value::Object(subgroups) => subgroups
            .iter()
            .map(|(subsubroot, leaves)| {
                let path = format!("{path}.{subsubroot}");
                let leaves = match leaves {
                    Value::Array(names) => names_at(&path, names)?,
                    Value::String(marker) if marker == LIST_MARKER => {
                        return Err(Error::invalid(
                            path,
                            "second-level groups cannot be list-backed",
                        ));
                    }
                    Value::String(name) => vec![name_at(&path, name)?],
                    _ => {
                        return Err(Error::invalid(
                            path,
                            "second-level groups take a list of leaf names",
                        ));
                    }
                };
                Ok((name_at(&path, subsubroot)?, leaves))
            })
            .collect::<Result<Vec<_>>>()
            .map(GroupBody::Nested),
        _ => Err(Error::invalid(
            path,
            "expected a list of leaf names, \"List\", a leaf name, or a nested group object",
        )),
    }
}

impl Serialize for Declaration {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Declaration {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Declaration::from_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_every_directive_shape() {
        let declaration = Declaration::from_value(&json!([
            "phone",
            ["phone1", "phone2"],
            {
                "address": ["street", "city"],
                "balls": "List",
                "auth": "facebook",
                "budget": {"heating": ["high", "low"], "cooling": "fan"}
            }
        ]))
        .unwrap();

        let expected = Declaration::new()
            .leaf("phone")
            .leaves(["phone1", "phone2"])
            .group("address", ["street", "city"])
            .list("balls")
            .group_leaf("auth", "facebook")
            .nested("budget", "heating", ["high", "low"])
            .nested("budget", "cooling", ["fan"]);
        assert_eq!(declaration, expected);
    }

    #[test]
    fn group_entries_keep_declaration_order() {
        let declaration =
            Declaration::from_json_str(r#"[{"zeta": ["a"], "alpha": ["b"], "mid": "List"}]"#)
                .unwrap();
        let subroots: Vec<_> = declaration
            .directives()
            .iter()
            .map(|directive| match directive {
                Directive::Group { subroot, .. } => subroot.as_str(),
                other => panic!("unexpected directive {other:?}"),
            })
            .collect();
        assert_eq!(subroots, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        let err = Declaration::from_value(&json!(["phone", 42])).unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "invalid directive at declaration[1]: expected a leaf name, a list of leaf names, or a group object"
        );

        let err = Declaration::from_value(&json!([{"address": 7}])).unwrap_err();
        assert!(err.to_string().contains("declaration[0].address"));

        let err = Declaration::from_value(&json!([["ok", null]])).unwrap_err();
        assert!(err.to_string().contains("declaration[0][1]"));

        let err = Declaration::from_value(&json!([{"budget": {"heating": {"deep": []}}}]))
            .unwrap_err();
        assert!(err.to_string().contains("declaration[0].budget.heating"));

        let err = Declaration::from_value(&json!([{"budget": {"heating": "List"}}]))
            .unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "invalid directive at declaration[0].budget.heating: second-level groups cannot be list-backed"
        );
        assert!(Declaration::from_value(&json!([{"budget": {"heating": "fan"}}])).is_ok());

        let err = Declaration::from_value(&json!({"phone": []})).unwrap_err();
        assert!(err.is_config_error());

        let err = Declaration::from_value(&json!([""])).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn serde_uses_the_json_shape() {
        let declaration = Declaration::new()
            .leaf("phone")
            .list("balls")
            .nested("budget", "heating", ["high"]);
        let text = serde_json::to_string(&declaration).unwrap();
        assert_eq!(
            text,
            r#"["phone",{"balls":"List"},{"budget":{"heating":["high"]}}]"#
        );
        let back: Declaration = serde_json::from_str(&text).unwrap();
        assert_eq!(back, declaration);

        let err = serde_json::from_str::<Declaration>("[true]").unwrap_err();
        assert!(err.to_string().contains("declaration[0]"));
    }
}
