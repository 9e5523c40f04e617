//! Compiles declarations into an [`AccessorSet`].
//!
//! Generated names follow the field layout: a root leaf keeps its own name,
//! a group's leaf is `subroot_leaf`, and a second-level group and its leaves
//! are `subroot_subsubroot` and `subroot_subsubroot_leaf`.

use std::collections::HashMap;

use tracing::debug;

use crate::accessor::{Accessor, GroupAccessor, LeafAccessor, Path};
use crate::container::{Container, ContainerKind, Object};
use crate::declaration::{Declaration, Directive, GroupBody};
use crate::error::{Error, Result};
use crate::host::Host;

/// Translates directives into accessors bound to one root field.
#[derive(Debug, Clone)]
pub struct AccessorCompiler {
    root_field: String,
}

impl AccessorCompiler {
    pub fn new(root_field: impl Into<String>) -> Self {
        Self {
            root_field: root_field.into(),
        }
    }

    pub fn root_field(&self) -> &str {
        &self.root_field
    }

    pub fn compile(&self, declaration: &Declaration) -> Result<AccessorSet> {
        let mut set = AccessorSet::empty(&self.root_field);
        self.compile_into(&mut set, declaration)?;
        Ok(set)
    }

    /// Adds the accessors of `declaration` to an existing set. Later
    /// accessors replace earlier ones with the same name.
    pub fn compile_into(&self, set: &mut AccessorSet, declaration: &Declaration) -> Result<()> {
        if self.root_field.is_empty() {
            return Err(Error::invalid("root field", "names must not be empty"));
        }
        if set.root_field != self.root_field {
            return Err(Error::invalid(
                "root field",
                format!(
                    "set is bound to `{}`, not `{}`",
                    set.root_field, self.root_field
                ),
            ));
        }
        // Nothing reaches `set` until every directive has compiled.
        let mut staged = AccessorSet::empty(&self.root_field);
        for directive in declaration.directives() {
            match directive {
                Directive::Leaf(name) => self.define_property(&mut staged, name)?,
                Directive::Leaves(names) => {
                    for name in names {
                        self.define_property(&mut staged, name)?;
                    }
                }
                Directive::Group { subroot, body } => match body {
                    GroupBody::Leaves(leaves) => {
                        self.define_group(&mut staged, subroot, ContainerKind::Map, leaves)?
                    }
                    GroupBody::Leaf(leaf) => {
                        self.define_group(&mut staged, subroot, ContainerKind::Map, std::slice::from_ref(leaf))?
                    }
                    GroupBody::List => self.define_group(&mut staged, subroot, ContainerKind::List, &[])?,
                    GroupBody::Nested(entries) => {
                        for (subsubroot, leaves) in entries {
                            self.define_group(&mut staged, subroot, ContainerKind::Map, &[])?;
                            self.define_nested_group(&mut staged, subroot, subsubroot, leaves)?;
                        }
                    }
                },
            }
        }
        for (name, accessor) in staged.entries {
            set.insert(name, accessor);
        }
        debug!(
            root_field = %self.root_field,
            accessors = set.len(),
            "compiled nested accessors"
        );
        Ok(())
    }

    fn define_property(&self, set: &mut AccessorSet, name: &str) -> Result<()> {
        let path = self.path(&[], name)?;
        set.insert(name.to_owned(), Accessor::Leaf(LeafAccessor::new(path)));
        Ok(())
    }

    fn define_group(
        &self,
        set: &mut AccessorSet,
        subroot: &str,
        kind: ContainerKind,
        leaves: &[String],
    ) -> Result<()> {
        let path = self.path(&[], subroot)?;
        set.insert(subroot.to_owned(), Accessor::Group(GroupAccessor::new(path, kind)));
        for leaf in leaves {
            let path = self.path(&[subroot], leaf)?;
            set.insert(
                format!("{subroot}_{leaf}"),
                Accessor::Leaf(LeafAccessor::new(path)),
            );
        }
        Ok(())
    }

    fn define_nested_group(
        &self,
        set: &mut AccessorSet,
        subroot: &str,
        subsubroot: &str,
        leaves: &[String],
    ) -> Result<()> {
        let path = self.path(&[subroot], subsubroot)?;
        set.insert(
            format!("{subroot}_{subsubroot}"),
            Accessor::Group(GroupAccessor::new(path, ContainerKind::Map)),
        );
        for leaf in leaves {
            let path = self.path(&[subroot, subsubroot], leaf)?;
            set.insert(
                format!("{subroot}_{subsubroot}_{leaf}"),
                Accessor::Leaf(LeafAccessor::new(path)),
            );
        }
        Ok(())
    }

    fn path(&self, groups: &[&str], key: &str) -> Result<Path> {
        let path = Path::new(&self.root_field, groups, key);
        if path.segments().any(str::is_empty) {
            return Err(Error::invalid(path.to_string(), "names must not be empty"));
        }
        Ok(path)
    }
}

/// Registry of compiled accessors for one root field, keyed by generated
/// name and listed in declaration order.
#[derive(Debug, Clone)]
pub struct AccessorSet {
    root_field: String,
    entries: Vec<(String, Accessor)>,
    index: HashMap<String, usize>,
}

impl AccessorSet {
    fn empty(root_field: &str) -> Self {
        Self {
            root_field: root_field.to_owned(),
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Shorthand for `AccessorCompiler::new(root_field).compile(declaration)`.
    pub fn compile(root_field: impl Into<String>, declaration: &Declaration) -> Result<Self> {
        AccessorCompiler::new(root_field).compile(declaration)
    }

    /// Compiles another declaration for the same root field into this set.
    pub fn extend(&mut self, declaration: &Declaration) -> Result<()> {
        AccessorCompiler::new(self.root_field.clone()).compile_into(self, declaration)
    }

    fn insert(&mut self, name: String, accessor: Accessor) {
        match self.index.get(&name) {
            Some(&position) => self.entries[position].1 = accessor,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, accessor));
            }
        }
    }

    pub fn root_field(&self) -> &str {
        &self.root_field
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Accessor)> {
        self.entries
            .iter()
            .map(|(name, accessor)| (name.as_str(), accessor))
    }

    pub fn accessor(&self, name: &str) -> Option<&Accessor> {
        self.index.get(name).map(|&position| &self.entries[position].1)
    }

    pub fn leaf(&self, name: &str) -> Result<&LeafAccessor> {
        let accessor = self.lookup(name)?;
        accessor.as_leaf().ok_or_else(|| Error::KindMismatch {
            name: name.to_owned(),
            expected: "leaf",
            actual: accessor.kind_name(),
        })
    }

    pub fn group(&self, name: &str) -> Result<&GroupAccessor> {
        let accessor = self.lookup(name)?;
        accessor.as_group().ok_or_else(|| Error::KindMismatch {
            name: name.to_owned(),
            expected: "group",
            actual: accessor.kind_name(),
        })
    }

    fn lookup(&self, name: &str) -> Result<&Accessor> {
        self.accessor(name).ok_or_else(|| Error::UnknownAccessor {
            name: name.to_owned(),
        })
    }

    /// The host's root container for this set's field.
    pub fn root<'a, H>(&self, host: &'a mut H) -> Result<&'a mut Object>
    where
        H: Host + ?Sized,
    {
        host.root_field(&self.root_field)
            .ok_or_else(|| Error::MissingRootField {
                field: self.root_field.clone(),
            })
    }

    /// Reads a leaf by generated name.
    pub fn get<'a, H>(&self, host: &'a mut H, name: &str) -> Result<Option<&'a str>>
    where
        H: Host + ?Sized,
    {
        let leaf = self.leaf(name)?;
        Ok(leaf.get(self.root(host)?))
    }

    /// Reads a leaf without creating any group along the way. A host that
    /// lacks the root field reads as unset.
    pub fn peek<'a, H>(&self, host: &'a H, name: &str) -> Result<Option<&'a str>>
    where
        H: Host + ?Sized,
    {
        let leaf = self.leaf(name)?;
        Ok(host
            .root_field_ref(&self.root_field)
            .and_then(|root| leaf.peek(root)))
    }

    /// Writes a leaf by generated name, storing the value's string form.
    pub fn set<H, V>(&self, host: &mut H, name: &str, value: V) -> Result<()>
    where
        H: Host + ?Sized,
        V: ToString,
    {
        let leaf = self.leaf(name)?;
        leaf.set(self.root(host)?, value);
        Ok(())
    }

    /// Returns the live container of a group by generated name.
    pub fn group_mut<'a, H>(&self, host: &'a mut H, name: &str) -> Result<Container<'a>>
    where
        H: Host + ?Sized,
    {
        let group = self.group(name)?;
        Ok(group.get(self.root(host)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info_declaration() -> Declaration {
        Declaration::new()
            .leaf("phone")
            .group("address", ["street", "city"])
    }

    #[test]
    fn generates_names_in_declaration_order() {
        let set = AccessorSet::compile(
            "info",
            &Declaration::new()
                .leaf("phone")
                .leaves(["phone1", "phone2"])
                .group("address", ["street", "city"])
                .list("balls")
                .group_leaf("auth", "facebook")
                .nested("budget", "heating", ["high", "low"]),
        )
        .unwrap();

        assert_eq!(
            set.names().collect::<Vec<_>>(),
            [
                "phone",
                "phone1",
                "phone2",
                "address",
                "address_street",
                "address_city",
                "balls",
                "auth",
                "auth_facebook",
                "budget",
                "budget_heating",
                "budget_heating_high",
                "budget_heating_low",
            ]
        );
        assert_eq!(set.group("balls").unwrap().kind(), ContainerKind::List);
        assert_eq!(set.group("budget").unwrap().kind(), ContainerKind::Map);
        assert_eq!(
            set.leaf("budget_heating_low").unwrap().path().to_string(),
            r#"info["budget"]["heating"]["low"]"#
        );
    }

    #[test]
    fn nested_group_has_no_direct_leaf() {
        let set = AccessorSet::compile(
            "home",
            &Declaration::new()
                .nested("budget", "heating", ["high"])
                .nested("budget", "cooling", ["fan"]),
        )
        .unwrap();
        assert!(set.group("budget_heating").is_ok());
        assert!(set.group("budget_cooling").is_ok());
        assert_eq!(set.len(), 5);
    }

    #[test]
    fn later_definitions_replace_earlier_ones() {
        let set = AccessorSet::compile(
            "info",
            &Declaration::new()
                .leaf("address")
                .leaf("phone")
                .list("address"),
        )
        .unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), ["address", "phone"]);
        assert_eq!(set.group("address").unwrap().kind(), ContainerKind::List);
    }

    #[test]
    fn lookups_report_unknown_and_mismatched_names() {
        let set = AccessorSet::compile("info", &info_declaration()).unwrap();
        let err = set.leaf("zipcode").unwrap_err();
        assert!(matches!(err, Error::UnknownAccessor { ref name } if name == "zipcode"));
        let err = set.leaf("address").unwrap_err();
        assert!(matches!(
            err,
            Error::KindMismatch {
                expected: "leaf",
                actual: "group",
                ..
            }
        ));
        assert!(set.group("phone").unwrap_err().is_lookup_error());
    }

    #[test]
    fn reads_and_writes_through_a_host() {
        let set = AccessorSet::compile("info", &info_declaration()).unwrap();
        let mut record = json!({"id": 7});

        set.set(&mut record, "phone", 12378).unwrap();
        assert_eq!(set.get(&mut record, "phone").unwrap(), Some("12378"));
        assert_eq!(set.get(&mut record, "address_street").unwrap(), None);
        set.set(&mut record, "address_city", "Goteborg").unwrap();

        assert_eq!(
            record,
            json!({"id": 7, "info": {"phone": "12378", "address": {"city": "Goteborg"}}})
        );
    }

    #[test]
    fn missing_root_field_is_an_error() {
        let set = AccessorSet::compile("info", &info_declaration()).unwrap();
        let mut record = json!("not a record");
        let err = set.get(&mut record, "phone").unwrap_err();
        assert!(matches!(err, Error::MissingRootField { ref field } if field == "info"));
    }

    #[test]
    fn extend_accumulates_declarations() {
        let mut set = AccessorSet::compile("info", &Declaration::new().leaf("phone")).unwrap();
        set.extend(&Declaration::new().leaves(["phone1", "phone2"]))
            .unwrap();
        assert!(set.contains("phone"));
        assert!(set.contains("phone2"));

        let other = AccessorCompiler::new("bank");
        let err = other
            .compile_into(&mut set, &Declaration::new().leaf("branch_id"))
            .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn failed_extend_leaves_set_unchanged() {
        let mut set = AccessorSet::compile("info", &Declaration::new().leaf("phone")).unwrap();
        let err = set
            .extend(
                &Declaration::new()
                    .leaves(["fax", "pager"])
                    .group("address", [""]),
            )
            .unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(set.len(), 1);
        assert_eq!(set.names().collect::<Vec<_>>(), ["phone"]);
        assert!(!set.contains("fax"));
        assert!(set.leaf("pager").unwrap_err().is_lookup_error());
    }

    #[test]
    fn peek_reads_without_creating_groups() {
        let set = AccessorSet::compile("info", &info_declaration()).unwrap();
        let mut record = json!({"id": 7, "info": {"phone": "12378"}});

        assert_eq!(set.peek(&record, "phone").unwrap(), Some("12378"));
        assert_eq!(set.peek(&record, "address_city").unwrap(), None);
        assert_eq!(record, json!({"id": 7, "info": {"phone": "12378"}}));

        set.set(&mut record, "address_city", "Goteborg").unwrap();
        assert_eq!(set.peek(&record, "address_city").unwrap(), Some("Goteborg"));
        assert!(set.peek(&record, "address").unwrap_err().is_lookup_error());

        let detached = json!({"id": 8});
        assert_eq!(set.peek(&detached, "phone").unwrap(), None);
    }

    #[test]
    fn rejects_empty_names() {
        let err = AccessorSet::compile("info", &Declaration::new().group("address", [""]))
            .unwrap_err();
        assert!(err.is_config_error());
        assert!(AccessorSet::compile("", &Declaration::new()).is_err());
    }
}
