//! Structural type introspection for request and response models.
//!
//! Every model type exposes a [`TypeDesc`] through the [`Introspect`] trait
//! (normally via `#[derive(Introspect)]`). The walker in this module turns a
//! description into a [`FieldInfo`] tree: declared type, field name, the
//! recognized tags and, for composite or sequence-of-composite fields, the
//! nested tree of the child type.
//!
//! Field and element types are produced lazily through `fn` pointers, so a
//! type that refers to itself can be described. The walker keeps the chain of
//! composite types it is currently inside and emits a `recursive` marker
//! instead of descending into a type already on that chain.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    rc::Rc,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

/// Tag keys in scan order. `form`, `uri` and `json` are accepted as aliases
/// of `query`, `path` and `body`.
pub const TAG_KEYS: &[&str] = &["query", "path", "body", "title", "format", "desc"];

/// Structural classification of a type.
#[derive(Debug, Clone, Copy)]
pub enum TypeKind {
    /// Anything that is not walked further.
    Scalar,
    /// A struct-like type with named fields.
    Composite(fn() -> Vec<StructField>),
    /// A transparent wrapper (`Option`, `Box`, `Arc`, references).
    Pointer(fn() -> TypeDesc),
    /// A homogeneous sequence (`Vec`, slices, arrays, sets).
    Sequence(fn() -> TypeDesc),
}

/// Runtime description of a type.
#[derive(Debug, Clone)]
pub struct TypeDesc {
    pub name: String,
    pub kind: TypeKind,
}

impl TypeDesc {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Scalar,
        }
    }

    pub fn composite(name: impl Into<String>, fields: fn() -> Vec<StructField>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Composite(fields),
        }
    }

    pub fn pointer(name: impl Into<String>, inner: fn() -> TypeDesc) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Pointer(inner),
        }
    }

    pub fn sequence(name: impl Into<String>, element: fn() -> TypeDesc) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Sequence(element),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite(_))
    }

    /// Strips pointer layers, then a sequence layer and its element's pointer
    /// layers.
    pub fn unwrap_indirection(self) -> Self {
        let desc = self.strip_pointers();
        match desc.kind {
            TypeKind::Sequence(element) => element().strip_pointers(),
            _ => desc,
        }
    }

    fn strip_pointers(mut self) -> Self {
        while let TypeKind::Pointer(inner) = self.kind {
            self = inner();
        }
        self
    }
}

/// One member of a composite type as declared in source.
#[derive(Debug, Clone, Copy)]
pub struct StructField {
    pub name: &'static str,
    pub ty: fn() -> TypeDesc,
    pub tags: &'static [(&'static str, &'static str)],
}

impl StructField {
    pub const fn new(
        name: &'static str,
        ty: fn() -> TypeDesc,
        tags: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { name, ty, tags }
    }

    fn lookup(&self, key: &str) -> Option<&'static str> {
        let alias = match key {
            "query" => "form",
            "path" => "uri",
            "body" => "json",
            _ => key,
        };
        self.tags
            .iter()
            .find(|(k, _)| *k == key || *k == alias)
            .map(|(_, v)| *v)
    }
}

/// Types that can describe their own structure.
pub trait Introspect {
    fn describe() -> TypeDesc;
}

/// Recognized annotations of one field. Missing annotations stay empty,
/// except `title`, which defaults to the field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub query_key: String,
    pub path_key: String,
    pub body_key: String,
    pub title: String,
    pub format: String,
    pub desc: String,
}

impl Tag {
    fn scan(field: &StructField) -> Self {
        let mut tag = Self {
            title: field.name.to_string(),
            ..Self::default()
        };
        for key in TAG_KEYS {
            let Some(value) = field.lookup(key) else {
                continue;
            };
            let value = value.to_string();
            match *key {
                "query" => tag.query_key = value,
                "path" => tag.path_key = value,
                "title" => tag.title = value,
                "format" => tag.format = value,
                "desc" => tag.desc = value,
                _ => tag.body_key = value,
            }
        }
        tag
    }

    /// Path parameter key, if the field binds to one. `-` opts out.
    pub fn path_param(&self) -> Option<&str> {
        match self.path_key.as_str() {
            "" | "-" => None,
            key => Some(key),
        }
    }

    /// Query parameter key, if the field binds to one. `-` opts out.
    pub fn query_param(&self) -> Option<&str> {
        match self.query_key.as_str() {
            "" | "-" => None,
            key => Some(key),
        }
    }
}

/// Description of one field and, recursively, of its child type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    pub tags: Tag,
    pub child_type: String,
    pub info: Vec<FieldInfo>,
    /// Set when the child type is already being walked higher up.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub recursive: bool,
}

impl FieldInfo {
    /// Key the field is serialized under: the `body` tag when set, the Rust
    /// field name otherwise.
    pub fn wire_name(&self) -> &str {
        match self.tags.body_key.as_str() {
            "" | "-" => &self.name,
            key => key,
        }
    }
}

/// Introspects `T`.
pub fn introspect<T: Introspect + ?Sized>() -> Vec<FieldInfo> {
    introspect_desc(T::describe())
}

/// Introspects an arbitrary description. Non-composite types yield nothing.
pub fn introspect_desc(desc: TypeDesc) -> Vec<FieldInfo> {
    walk(desc.unwrap_indirection(), &mut Vec::new())
}

fn walk(desc: TypeDesc, stack: &mut Vec<String>) -> Vec<FieldInfo> {
    let TypeKind::Composite(fields) = desc.kind else {
        return Vec::new();
    };

    stack.push(desc.name);
    let infos = fields()
        .iter()
        .map(|field| {
            let declared = (field.ty)();
            let type_name = declared.name.clone();
            let child = declared.unwrap_indirection();
            let recursive = child.is_composite() && stack.contains(&child.name);
            let child_type = child.name.clone();
            let info = if recursive {
                Vec::new()
            } else {
                walk(child, stack)
            };
            FieldInfo {
                type_name,
                name: field.name.to_string(),
                tags: Tag::scan(field),
                child_type,
                info,
                recursive,
            }
        })
        .collect();
    stack.pop();
    infos
}

macro_rules! scalar {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Introspect for $ty {
                fn describe() -> TypeDesc {
                    TypeDesc::scalar($name)
                }
            }
        )*
    };
}

scalar! {
    bool => "bool", char => "char", str => "str", String => "String", () => "()",
    i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", i128 => "i128", isize => "isize",
    u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", u128 => "u128", usize => "usize",
    f32 => "f32", f64 => "f64",
    uuid::Uuid => "Uuid", serde_json::Value => "Value",
}

macro_rules! pointer {
    ($($wrapper:ident),*) => {
        $(
            impl<T: Introspect + ?Sized> Introspect for $wrapper<T> {
                fn describe() -> TypeDesc {
                    TypeDesc::pointer(
                        format!(concat!(stringify!($wrapper), "<{}>"), T::describe().name),
                        T::describe,
                    )
                }
            }
        )*
    };
}

pointer!(Box, Arc, Rc);

impl<T: Introspect> Introspect for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::pointer(format!("Option<{}>", T::describe().name), T::describe)
    }
}

impl<T: Introspect + ?Sized> Introspect for &T {
    fn describe() -> TypeDesc {
        TypeDesc::pointer(format!("&{}", T::describe().name), T::describe)
    }
}

macro_rules! sequence {
    ($($seq:ident),*) => {
        $(
            impl<T: Introspect> Introspect for $seq<T> {
                fn describe() -> TypeDesc {
                    TypeDesc::sequence(
                        format!(concat!(stringify!($seq), "<{}>"), T::describe().name),
                        T::describe,
                    )
                }
            }
        )*
    };
}

sequence!(Vec, VecDeque, HashSet, BTreeSet);

impl<T: Introspect> Introspect for [T] {
    fn describe() -> TypeDesc {
        TypeDesc::sequence(format!("[{}]", T::describe().name), T::describe)
    }
}

impl<T: Introspect, const N: usize> Introspect for [T; N] {
    fn describe() -> TypeDesc {
        TypeDesc::sequence(format!("[{}; {N}]", T::describe().name), T::describe)
    }
}

impl<K: Introspect, V: Introspect, S> Introspect for HashMap<K, V, S> {
    fn describe() -> TypeDesc {
        TypeDesc::scalar(format!(
            "HashMap<{}, {}>",
            K::describe().name,
            V::describe().name
        ))
    }
}

impl<K: Introspect, V: Introspect> Introspect for BTreeMap<K, V> {
    fn describe() -> TypeDesc {
        TypeDesc::scalar(format!(
            "BTreeMap<{}, {}>",
            K::describe().name,
            V::describe().name
        ))
    }
}
