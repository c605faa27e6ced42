//! Type references and class definitions
//!
//! Every value the bridge moves around has a [`TypeRef`]. Primitive types are
//! plain variants; mod classes and the well-known handle classes are
//! [`ClassDef`]s shared behind an `Arc`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Kind of a class definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClassKind {
    /// Ordinary instantiable class
    #[default]
    Concrete,
    /// Abstract class (cannot be instantiated)
    Abstract,
    /// Interface (cannot be instantiated)
    Interface,
}

/// A class declared by a mod or by the API itself
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// Fully qualified name, unique across the process
    pub name: String,
    /// Base class, `None` for classes deriving directly from `object`
    pub base: Option<TypeRef>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeRef>,
    /// Concrete, abstract or interface
    pub kind: ClassKind,
    /// Whether a parameterless constructor exists
    pub has_default_ctor: bool,
}

impl ClassDef {
    /// Create a concrete class with a parameterless constructor
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            interfaces: Vec::new(),
            kind: ClassKind::Concrete,
            has_default_ctor: true,
        }
    }

    /// Set the base class
    pub fn extends(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: TypeRef) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set the class kind
    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    /// Remove the parameterless constructor
    pub fn without_default_ctor(mut self) -> Self {
        self.has_default_ctor = false;
        self
    }

    /// Finish the definition
    pub fn into_type(self) -> TypeRef {
        TypeRef::Class(Arc::new(self))
    }

    /// Check whether `target` appears in this class's base chain or interfaces
    fn derives_from(&self, target: &TypeRef) -> bool {
        let via_base = self
            .base
            .as_ref()
            .is_some_and(|base| base == target || base.class().is_some_and(|c| c.derives_from(target)));

        via_base
            || self.interfaces.iter().any(|i| {
                i == target || i.class().is_some_and(|c| c.derives_from(target))
            })
    }
}

/// Reference to a type in the metadata model
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// No value
    Void,
    Bool,
    Int,
    Float,
    String,
    /// Value tuple, e.g. `(string, int)`
    Tuple(Vec<TypeRef>),
    /// Root of the class hierarchy
    Object,
    /// Runtime type object, produced by loading a type token
    Type,
    /// Declared class
    Class(Arc<ClassDef>),
}

impl TypeRef {
    /// Tuple type helper
    pub fn tuple(elements: impl IntoIterator<Item = TypeRef>) -> Self {
        TypeRef::Tuple(elements.into_iter().collect())
    }

    /// Class definition if this is a class type
    pub fn class(&self) -> Option<&ClassDef> {
        match self {
            TypeRef::Class(def) => Some(def),
            _ => None,
        }
    }

    /// Check whether this type names a class
    pub fn is_class(&self) -> bool {
        matches!(self, TypeRef::Class(_))
    }

    /// Check whether this is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Ordinary assignability: can a value of type `source` be stored in a
    /// variable of this type?
    ///
    /// `void` is only assignable to `void`. Every other type is assignable
    /// to `object`.
    pub fn is_assignable_from(&self, source: &TypeRef) -> bool {
        if self == source {
            return true;
        }

        match (self, source) {
            (TypeRef::Void, _) | (_, TypeRef::Void) => false,
            (TypeRef::Object, _) => true,
            (TypeRef::Class(_), TypeRef::Class(src)) => src.derives_from(self),
            _ => false,
        }
    }

    /// Display name used in diagnostics
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeRef::Class(a), TypeRef::Class(b)) => Arc::ptr_eq(a, b) || a.name == b.name,
            (TypeRef::Tuple(a), TypeRef::Tuple(b)) => a == b,
            (TypeRef::Void, TypeRef::Void)
            | (TypeRef::Bool, TypeRef::Bool)
            | (TypeRef::Int, TypeRef::Int)
            | (TypeRef::Float, TypeRef::Float)
            | (TypeRef::String, TypeRef::String)
            | (TypeRef::Object, TypeRef::Object)
            | (TypeRef::Type, TypeRef::Type) => true,
            _ => false,
        }
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            TypeRef::Class(def) => def.name.hash(state),
            TypeRef::Tuple(elements) => elements.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str("void"),
            TypeRef::Bool => f.write_str("bool"),
            TypeRef::Int => f.write_str("int"),
            TypeRef::Float => f.write_str("float"),
            TypeRef::String => f.write_str("string"),
            TypeRef::Object => f.write_str("object"),
            TypeRef::Type => f.write_str("Type"),
            TypeRef::Class(def) => f.write_str(&def.name),
            TypeRef::Tuple(elements) => {
                f.write_str("(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_assignability() {
        assert!(TypeRef::Int.is_assignable_from(&TypeRef::Int));
        assert!(!TypeRef::Int.is_assignable_from(&TypeRef::Float));
        assert!(TypeRef::Object.is_assignable_from(&TypeRef::String));
        assert!(!TypeRef::Object.is_assignable_from(&TypeRef::Void));
        assert!(TypeRef::Void.is_assignable_from(&TypeRef::Void));
        assert!(!TypeRef::Void.is_assignable_from(&TypeRef::Bool));
    }

    #[test]
    fn test_class_hierarchy() {
        let iface = ClassDef::new("IThing").with_kind(ClassKind::Interface).into_type();
        let base = ClassDef::new("Base").into_type();
        let mid = ClassDef::new("Mid").extends(base.clone()).implements(iface.clone()).into_type();
        let leaf = ClassDef::new("Leaf").extends(mid.clone()).into_type();

        assert!(base.is_assignable_from(&leaf));
        assert!(iface.is_assignable_from(&leaf));
        assert!(mid.is_assignable_from(&leaf));
        assert!(!leaf.is_assignable_from(&base));
        assert!(TypeRef::Object.is_assignable_from(&leaf));
    }

    #[test]
    fn test_class_equality_by_name() {
        let a = ClassDef::new("Same").into_type();
        let b = ClassDef::new("Same").without_default_ctor().into_type();
        assert_eq!(a, b);
    }

    #[test]
    fn test_tuple_display() {
        let t = TypeRef::tuple([TypeRef::String, TypeRef::Int]);
        assert_eq!(t.to_string(), "(string, int)");
        assert_eq!(t, TypeRef::tuple([TypeRef::String, TypeRef::Int]));
    }
}
