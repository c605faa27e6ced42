//! Method signatures
//!
//! A [`MethodSig`] identifies a method by declaring type, name and parameter
//! types. Handles are shared as [`MethodRef`] and compare by value, so a
//! handle rebuilt from the same signature finds the same method.

use std::fmt;
use std::sync::Arc;

use crate::types::TypeRef;

/// Shared handle to a method signature
pub type MethodRef = Arc<MethodSig>;

/// Signature of a declared method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    /// Class declaring the method
    pub declaring: TypeRef,
    /// Method name (case-sensitive)
    pub name: String,
    /// Declared parameter types, excluding the receiver
    pub params: Vec<TypeRef>,
    /// Return type
    pub ret: TypeRef,
    /// Static methods have no receiver
    pub is_static: bool,
}

impl MethodSig {
    /// Instance method signature
    pub fn instance(
        declaring: TypeRef,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
    ) -> Self {
        Self {
            declaring,
            name: name.into(),
            params: params.into_iter().collect(),
            ret,
            is_static: false,
        }
    }

    /// Static method signature
    pub fn static_fn(
        declaring: TypeRef,
        name: impl Into<String>,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
    ) -> Self {
        Self {
            is_static: true,
            ..Self::instance(declaring, name, params, ret)
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> MethodRef {
        Arc::new(self)
    }

    /// Argument types as seen on the stack: the receiver (declaring type)
    /// comes first for instance methods.
    pub fn arguments(&self) -> Vec<TypeRef> {
        let mut args = Vec::with_capacity(self.arity());
        if !self.is_static {
            args.push(self.declaring.clone());
        }
        args.extend(self.params.iter().cloned());
        args
    }

    /// Number of stack arguments, including the receiver
    pub fn arity(&self) -> usize {
        self.params.len() + usize::from(!self.is_static)
    }

    /// `Declaring::Name`
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.declaring, self.name)
    }

    /// Check name and declared parameters, ignoring the declaring type
    pub fn has_shape(&self, name: &str, params: &[TypeRef]) -> bool {
        self.name == name && self.params == params
    }

    /// Check whether `self` can override `other` under virtual dispatch
    pub fn overrides(&self, other: &MethodSig) -> bool {
        !self.is_static && !other.is_static && self.has_shape(&other.name, &other.params)
    }

    /// Parameter list rendered as `(a, b)`
    pub fn param_list(&self) -> String {
        let params: Vec<String> = self.params.iter().map(ToString::to_string).collect();
        format!("({})", params.join(", "))
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}{}",
            if self.is_static { "static " } else { "" },
            self.ret,
            self.full_name(),
            self.param_list()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassDef;

    #[test]
    fn test_instance_arguments_prepend_receiver() {
        let holder = ClassDef::new("Holder").into_type();
        let sig = MethodSig::instance(holder.clone(), "Go", [TypeRef::String], TypeRef::Void);
        assert_eq!(sig.arguments(), vec![holder, TypeRef::String]);
        assert_eq!(sig.arity(), 2);
    }

    #[test]
    fn test_static_arguments() {
        let holder = ClassDef::new("Holder").into_type();
        let sig = MethodSig::static_fn(holder, "Go", [TypeRef::Int], TypeRef::Bool);
        assert_eq!(sig.arguments(), vec![TypeRef::Int]);
        assert_eq!(sig.to_string(), "static bool Holder::Go(int)");
    }

    #[test]
    fn test_overrides_requires_instance_and_shape() {
        let base = ClassDef::new("Base").into_type();
        let derived = ClassDef::new("Derived").extends(base.clone()).into_type();
        let a = MethodSig::instance(base.clone(), "Go", [TypeRef::Int], TypeRef::Void);
        let b = MethodSig::instance(derived.clone(), "Go", [TypeRef::Int], TypeRef::Void);
        let c = MethodSig::static_fn(derived, "Go", [TypeRef::Int], TypeRef::Void);
        assert!(b.overrides(&a));
        assert!(!c.overrides(&a));
    }

    #[test]
    fn test_handles_compare_by_value() {
        let holder = ClassDef::new("Holder").into_type();
        let a = MethodSig::instance(holder.clone(), "Go", [], TypeRef::Void).into_ref();
        let b = MethodSig::instance(holder, "Go", [], TypeRef::Void).into_ref();
        assert_eq!(a, b);
    }
}
