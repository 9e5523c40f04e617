//! Build-time form of [nested-accessors] declarations.
//!
//! `nested_accessor!` takes a host type, the field holding the root
//! container, and a list of directives, and expands to an `impl` block of
//! typed getters and setters on the host.
//!
//! [nested-accessors]: https://docs.rs/nested-accessors
//!
//! # Examples
//!
//! ```
//! use nested_accessors::{SerializedMap, nested_accessor};
//!
//! #[derive(Default)]
//! struct Person { info: SerializedMap }
//!
//! nested_accessor!(Person.info =>
//!     phone,
//!     [phone1, phone2],
//!     address: [street, city],
//!     balls: List,
//!     auth: facebook,
//!     budget: { heating: [high, low] },
//! );
//!
//! let mut person = Person::default();
//! person.set_phone(12378);
//! person.set_address_city("Goteborg");
//! person.balls().push("bob".into());
//! person.set_budget_heating_high("32 C");
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Ident, LitStr, Token, braced, bracketed, parse_macro_input, token};

/// Marker selecting a list-backed group: `balls: List`.
const LIST_MARKER: &str = "List";

struct Invocation {
    host: syn::Path,
    field: Ident,
    directives: Punctuated<Directive, Token![,]>,
}

enum Directive {
    Leaf(Ident),
    Leaves(Vec<Ident>),
    Group { subroot: Ident, body: GroupBody },
}

enum GroupBody {
    Leaves(Vec<Ident>),
    Leaf(Ident),
    List,
    Nested(Vec<(Ident, Vec<Ident>)>),
}

impl Parse for Invocation {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let host = input.call(syn::Path::parse_mod_style)?;
        input.parse::<Token![.]>()?;
        let field = input.parse()?;
        input.parse::<Token![=>]>()?;
        let directives = Punctuated::parse_terminated(input)?;
        Ok(Self {
            host,
            field,
            directives,
        })
    }
}

fn parse_names(input: ParseStream) -> syn::Result<Vec<Ident>> {
    let content;
    bracketed!(content in input);
    let names = Punctuated::<Ident, Token![,]>::parse_terminated(&content)?;
    Ok(names.into_iter().collect())
}

impl Parse for Directive {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(token::Bracket) {
            return Ok(Directive::Leaves(parse_names(input)?));
        }
        if !input.peek(Ident) {
            return Err(input.error(
                "expected a leaf name, `[leaf, ...]`, or `group: ...`",
            ));
        }
        let name: Ident = input.parse()?;
        if !input.peek(Token![:]) {
            return Ok(Directive::Leaf(name));
        }
        input.parse::<Token![:]>()?;
        Ok(Directive::Group {
            subroot: name,
            body: input.parse()?,
        })
    }
}

impl Parse for GroupBody {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(token::Bracket) {
            return Ok(GroupBody::Leaves(parse_names(input)?));
        }
        if input.peek(token::Brace) {
            let content;
            braced!(content in input);
            let mut entries = Vec::new();
            while !content.is_empty() {
                let subsubroot: Ident = content.parse()?;
                content.parse::<Token![:]>()?;
                let leaves = if content.peek(token::Bracket) {
                    parse_names(&content)?
                } else if content.peek(Ident) {
                    let name: Ident = content.parse()?;
                    if name == LIST_MARKER {
                        return Err(syn::Error::new(
                            name.span(),
                            "second-level groups cannot be list-backed",
                        ));
                    }
                    vec![name]
                } else {
                    return Err(content.error(
                        "second-level groups take `[leaf, ...]` or a single leaf name",
                    ));
                };
                entries.push((subsubroot, leaves));
                if content.is_empty() {
                    break;
                }
                content.parse::<Token![,]>()?;
            }
            return Ok(GroupBody::Nested(entries));
        }
        if input.peek(Ident) {
            let name: Ident = input.parse()?;
            if name == LIST_MARKER {
                return Ok(GroupBody::List);
            }
            return Ok(GroupBody::Leaf(name));
        }
        Err(input.error(
            "expected `[leaf, ...]`, `List`, a leaf name, or `{ group: [leaf, ...] }`",
        ))
    }
}

fn key(ident: &Ident) -> LitStr {
    LitStr::new(&ident.unraw().to_string(), ident.span())
}

/// Joins idents into a method name: `address` + `city` -> `address_city`.
fn joined(parts: &[&Ident]) -> Ident {
    if let [single] = parts {
        return (*single).clone();
    }
    let name = parts
        .iter()
        .map(|part| part.unraw().to_string())
        .collect::<Vec<_>>()
        .join("_");
    format_ident!("{}", name, span = parts[parts.len() - 1].span())
}

/// Generated methods keyed by name. A later definition replaces an earlier
/// one in place.
#[derive(Default)]
struct Methods {
    entries: Vec<(String, TokenStream2)>,
}

impl Methods {
    fn insert(&mut self, name: &Ident, tokens: TokenStream2) {
        let name = name.to_string();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = tokens,
            None => self.entries.push((name, tokens)),
        }
    }
}

struct Generator<'a> {
    field: &'a Ident,
    methods: Methods,
}

impl Generator<'_> {
    fn root_mut(&self) -> TokenStream2 {
        let field = self.field;
        quote! { ::nested_accessors::RootField::as_root_mut(&mut self.#field) }
    }

    /// Statements binding `parent` to the map at the end of `groups`.
    fn parent(&self, groups: &[&Ident]) -> TokenStream2 {
        let root = self.root_mut();
        let keys = groups.iter().map(|group| key(group));
        quote! {
            let parent = #root;
            #( let parent = ::nested_accessors::container::ensure_map(parent, #keys); )*
        }
    }

    fn location(&self, groups: &[&Ident], leaf: &Ident) -> String {
        let mut location = self.field.unraw().to_string();
        for segment in groups.iter().copied().chain(std::iter::once(leaf)) {
            location.push_str(&format!("[\"{}\"]", segment.unraw()));
        }
        location
    }

    fn leaf(&mut self, groups: &[&Ident], leaf: &Ident) {
        let mut parts = groups.to_vec();
        parts.push(leaf);
        let getter = joined(&parts);
        let setter = format_ident!("set_{}", getter.unraw(), span = leaf.span());
        let leaf_key = key(leaf);
        let location = self.location(groups, leaf);
        let get_doc = format!("Reads `{location}`. Unset reads as `None`.");
        let set_doc = format!("Stores the string form of `value` at `{location}`.");

        let getter_tokens = if groups.is_empty() {
            let field = self.field;
            quote! {
                #[doc = #get_doc]
                pub fn #getter(&self) -> ::core::option::Option<&str> {
                    ::nested_accessors::RootField::as_root(&self.#field)
                        .and_then(|root| ::nested_accessors::container::read_leaf(root, #leaf_key))
                }
            }
        } else {
            let parent = self.parent(groups);
            quote! {
                #[doc = #get_doc]
                pub fn #getter(&mut self) -> ::core::option::Option<&str> {
                    #parent
                    ::nested_accessors::container::read_leaf(parent, #leaf_key)
                }
            }
        };
        let parent = self.parent(groups);
        let setter_tokens = quote! {
            #[doc = #set_doc]
            pub fn #setter<V: ::std::string::ToString>(&mut self, value: V) {
                #parent
                ::nested_accessors::container::write_leaf(parent, #leaf_key, value)
            }
        };
        self.methods.insert(&getter, getter_tokens);
        self.methods.insert(&setter, setter_tokens);
    }

    fn group(&mut self, groups: &[&Ident], group: &Ident, list: bool) {
        let mut parts = groups.to_vec();
        parts.push(group);
        let name = joined(&parts);
        let group_key = key(group);
        let parent = self.parent(groups);
        let location = self.location(groups, group);
        let tokens = if list {
            let doc = format!("The list at `{location}`, created empty on first access.");
            quote! {
                #[doc = #doc]
                pub fn #name(&mut self) -> &mut ::std::vec::Vec<::nested_accessors::serde_json::Value> {
                    #parent
                    ::nested_accessors::container::ensure_list(parent, #group_key)
                }
            }
        } else {
            let doc = format!("The map at `{location}`, created empty on first access.");
            quote! {
                #[doc = #doc]
                pub fn #name(&mut self) -> &mut ::nested_accessors::Object {
                    #parent
                    ::nested_accessors::container::ensure_map(parent, #group_key)
                }
            }
        };
        self.methods.insert(&name, tokens);
    }

    fn directive(&mut self, directive: &Directive) {
        match directive {
            Directive::Leaf(name) => self.leaf(&[], name),
            Directive::Leaves(names) => {
                for name in names {
                    self.leaf(&[], name);
                }
            }
            Directive::Group { subroot, body } => match body {
                GroupBody::Leaves(leaves) => {
                    self.group(&[], subroot, false);
                    for leaf in leaves {
                        self.leaf(&[subroot], leaf);
                    }
                }
                GroupBody::Leaf(leaf) => {
                    self.group(&[], subroot, false);
                    self.leaf(&[subroot], leaf);
                }
                GroupBody::List => self.group(&[], subroot, true),
                GroupBody::Nested(entries) => {
                    for (subsubroot, leaves) in entries {
                        self.group(&[], subroot, false);
                        self.group(&[subroot], subsubroot, false);
                        for leaf in leaves {
                            self.leaf(&[subroot, subsubroot], leaf);
                        }
                    }
                }
            },
        }
    }
}

/// Expands a nested accessor declaration into methods on the host type.
///
/// Syntax: `nested_accessor!(Host.field => directive, ...)` where the field
/// implements `nested_accessors::RootField` and each directive is one of:
///
/// - `phone`: `phone()` / `set_phone(v)` on `field["phone"]`
/// - `[phone1, phone2]`: one pair per name
/// - `address: [street, city]`: `address()` returning the map, plus
///   `address_street()` / `set_address_street(v)` and so on
/// - `auth: facebook`: same as `auth: [facebook]`
/// - `balls: List`: `balls()` returning the list
/// - `budget: { heating: [high, low] }`: `budget()`, `budget_heating()`,
///   `budget_heating_high()` / `set_budget_heating_high(v)`, ...
///
/// Getters of leaves inside a group take `&mut self` because reading
/// creates the enclosing group. If two directives generate the same
/// method, the later one wins.
///
/// Shapes outside this grammar are compile errors:
///
/// ```compile_fail
/// struct Person { info: nested_accessors::SerializedMap }
/// nested_accessors::nested_accessor!(Person.info => 42);
/// ```
///
/// ```compile_fail
/// struct Person { info: nested_accessors::SerializedMap }
/// nested_accessors::nested_accessor!(Person.info => address: 7);
/// ```
///
/// ```compile_fail
/// struct Person { info: nested_accessors::SerializedMap }
/// nested_accessors::nested_accessor!(Person.info => budget: { heating: { deep: [] } });
/// ```
///
/// Only first-level groups can be list-backed:
///
/// ```compile_fail
/// struct Person { info: nested_accessors::SerializedMap }
/// nested_accessors::nested_accessor!(Person.info => budget: { heating: List });
/// ```
///
/// The same host with a valid declaration compiles:
///
/// ```
/// struct Person { info: nested_accessors::SerializedMap }
/// nested_accessors::nested_accessor!(Person.info => budget: { heating: fan });
/// ```
#[proc_macro]
pub fn nested_accessor(input: TokenStream) -> TokenStream {
    let Invocation {
        host,
        field,
        directives,
    } = parse_macro_input!(input as Invocation);

    let mut generator = Generator {
        field: &field,
        methods: Methods::default(),
    };
    for directive in &directives {
        generator.directive(directive);
    }
    let methods = generator.methods.entries.into_iter().map(|(_, tokens)| tokens);

    let expanded = quote! {
        impl #host {
            #( #methods )*
        }
    };
    TokenStream::from(expanded)
}
