use std::fmt;

use serde_json::Value;

use crate::container::{self, Container, ContainerKind, Object};

/// Resolved location of a leaf or group inside a root field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    root: String,
    groups: Vec<String>,
    key: String,
}

impl Path {
    pub(crate) fn new(root: &str, groups: &[&str], key: &str) -> Self {
        Self {
            root: root.to_owned(),
            groups: groups.iter().map(|group| (*group).to_owned()).collect(),
            key: key.to_owned(),
        }
    }

    /// Name of the host field holding the root container.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Map groups between the root and the final key, outermost first.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Nesting depth below the root field: 1 for a root leaf or first-level
    /// group, up to 3 for a leaf inside a second-level group.
    pub fn depth(&self) -> usize {
        self.groups.len() + 1
    }

    /// The full path as key segments, root field first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.root.as_str())
            .chain(self.groups.iter().map(String::as_str))
            .chain(std::iter::once(self.key.as_str()))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut segments = self.segments();
        if let Some(first) = segments.next() {
            f.write_str(first)?;
        }
        for segment in segments {
            write!(f, "[{segment:?}]")?;
        }
        Ok(())
    }
}

/// Getter/setter pair for a string leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafAccessor {
    path: Path,
}

impl LeafAccessor {
    pub(crate) fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent<'a>(&self, root: &'a mut Object) -> &'a mut Object {
        container::ensure_path(root, &self.path.groups)
    }

    /// Reads the leaf, creating any enclosing groups first.
    pub fn get<'a>(&self, root: &'a mut Object) -> Option<&'a str> {
        container::read_leaf(self.parent(root), &self.path.key)
    }

    /// Reads the leaf as raw JSON, creating any enclosing groups first.
    pub fn get_value<'a>(&self, root: &'a mut Object) -> Option<&'a Value> {
        container::read_leaf_value(self.parent(root), &self.path.key)
    }

    /// Reads the leaf without touching the container. Missing groups read
    /// as an unset leaf.
    pub fn peek<'a>(&self, root: &'a Object) -> Option<&'a str> {
        let mut parent = root;
        for group in &self.path.groups {
            parent = parent.get(group)?.as_object()?;
        }
        container::read_leaf(parent, &self.path.key)
    }

    pub fn set<V>(&self, root: &mut Object, value: V)
    where
        V: ToString,
    {
        container::write_leaf(self.parent(root), &self.path.key, value)
    }
}

/// Read-only accessor returning a live group container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAccessor {
    path: Path,
    kind: ContainerKind,
}

impl GroupAccessor {
    pub(crate) fn new(path: Path, kind: ContainerKind) -> Self {
        Self { path, kind }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Resolves the group, creating it (and its parent group) when missing
    /// or of the wrong kind.
    pub fn get<'a>(&self, root: &'a mut Object) -> Container<'a> {
        let parent = container::ensure_path(root, &self.path.groups);
        container::ensure(parent, &self.path.key, self.kind)
    }
}

/// A compiled accessor bound to one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    Leaf(LeafAccessor),
    Group(GroupAccessor),
}

impl Accessor {
    pub fn path(&self) -> &Path {
        match self {
            Accessor::Leaf(leaf) => leaf.path(),
            Accessor::Group(group) => group.path(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Accessor::Leaf(_) => "leaf",
            Accessor::Group(_) => "group",
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafAccessor> {
        match self {
            Accessor::Leaf(leaf) => Some(leaf),
            Accessor::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupAccessor> {
        match self {
            Accessor::Group(group) => Some(group),
            Accessor::Leaf(_) => None,
        }
    }
}
