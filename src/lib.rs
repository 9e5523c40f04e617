//! Declarative getters and setters for nested key-value structures stored in
//! a single serialized field of a record.
//!
//! A declaration names the leaves and groups that live inside the field.
//! It can be compiled at runtime into an [`AccessorSet`], or expanded at
//! build time into inherent methods with [`nested_accessor!`] (behind the
//! default `derive` feature). Both read and write through the functions in
//! [`container`], which create group containers lazily and repair groups
//! holding the wrong kind of value.
//!
//! ```
//! use nested_accessors::{AccessorSet, Declaration};
//! use serde_json::json;
//!
//! let accessors = AccessorSet::compile(
//!     "info",
//!     &Declaration::new().leaf("phone").group("address", ["street", "city"]),
//! )
//! .unwrap();
//!
//! let mut person = json!({"name": "Ada"});
//! accessors.set(&mut person, "phone", 12378).unwrap();
//! accessors.set(&mut person, "address_city", "Goteborg").unwrap();
//!
//! assert_eq!(accessors.get(&mut person, "phone").unwrap(), Some("12378"));
//! assert_eq!(person["info"]["address"]["city"], "Goteborg");
//! ```

pub mod accessor;
pub mod compiler;
pub mod container;
pub mod declaration;
pub mod error;
pub mod host;
#[cfg(feature = "parking_lot")]
pub mod shared;

pub use accessor::{Accessor, GroupAccessor, LeafAccessor, Path};
pub use compiler::{AccessorCompiler, AccessorSet};
pub use container::{Container, ContainerKind, Object};
pub use declaration::{Declaration, Directive, GroupBody, LIST_MARKER};
pub use error::{Error, Result};
pub use host::{Host, RootField, SerializedMap};
#[cfg(feature = "parking_lot")]
pub use shared::SharedRecord;

#[cfg(feature = "derive")]
pub use nested_accessors_derive::nested_accessor;

// Generated code names these through the crate root.
#[doc(hidden)]
pub use serde_json;
