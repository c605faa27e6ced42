//! Mod assemblies
//!
//! A [`ModAssembly`] is the statically declared description of a mod's
//! classes and their methods. Each method carries a body that is either an
//! instruction list, a native Rust function, or nothing (abstract).
//!
//! The bridge rewrites instruction bodies in place: hook stubs get a
//! synthesized adapter body, and call sites targeting them are promoted to
//! virtual dispatch.
//!
//! # Example
//!
//! ```ignore
//! use esapi_core::assembly::{ClassEntry, Instruction, MethodBody, ModAssembly};
//! use esapi_sdk::{mod_type, ClassDef, TypeRef};
//!
//! let main = ClassDef::new("MyMod").extends(mod_type()).into_type();
//! let assembly = ModAssembly::new("MyMod").with_class(
//!     ClassEntry::new(main).instance_method(
//!         "ExtraSettingsAPI_GetCheckboxState",
//!         [TypeRef::String],
//!         TypeRef::Bool,
//!         MethodBody::Abstract,
//!     ),
//! );
//! ```

mod instruction;
mod value;

use std::fmt;
use std::sync::Arc;

use esapi_sdk::{MethodRef, MethodSig, TypeRef};

use crate::bridge::{ExecError, NativeEnv};

pub use instruction::Instruction;
pub use value::{arg, Value};

/// Native method implementation
pub type NativeFn = Arc<dyn Fn(&NativeEnv<'_>, &[Value]) -> Result<Value, ExecError> + Send + Sync>;

/// Body of a declared method
#[derive(Clone)]
pub enum MethodBody {
    /// Instruction list evaluated by the interpreter
    Il(Vec<Instruction>),
    /// Native implementation; cannot be decoded or rewritten
    Native(NativeFn),
    /// No body
    Abstract,
}

impl MethodBody {
    /// Wrap a closure as a native body
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&NativeEnv<'_>, &[Value]) -> Result<Value, ExecError> + Send + Sync + 'static,
    {
        MethodBody::Native(Arc::new(f))
    }

    /// Decoded instructions, if this body has any
    pub fn instructions(&self) -> Option<&[Instruction]> {
        match self {
            MethodBody::Il(code) => Some(code),
            _ => None,
        }
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Il(code) => f.debug_tuple("Il").field(code).finish(),
            MethodBody::Native(_) => f.write_str("Native(..)"),
            MethodBody::Abstract => f.write_str("Abstract"),
        }
    }
}

/// A method with its body
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub sig: MethodRef,
    pub body: MethodBody,
}

/// A class and the methods it declares
#[derive(Debug, Clone)]
pub struct ClassEntry {
    ty: TypeRef,
    methods: Vec<MethodDef>,
}

impl ClassEntry {
    /// Create an entry with no methods
    pub fn new(ty: TypeRef) -> Self {
        Self {
            ty,
            methods: Vec::new(),
        }
    }

    /// Declare an instance method
    pub fn instance_method(
        self,
        name: &str,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
        body: MethodBody,
    ) -> Self {
        let sig = MethodSig::instance(self.ty.clone(), name, params, ret);
        self.with_method(sig, body)
    }

    /// Declare a static method
    pub fn static_method(
        self,
        name: &str,
        params: impl IntoIterator<Item = TypeRef>,
        ret: TypeRef,
        body: MethodBody,
    ) -> Self {
        let sig = MethodSig::static_fn(self.ty.clone(), name, params, ret);
        self.with_method(sig, body)
    }

    fn with_method(mut self, sig: MethodSig, body: MethodBody) -> Self {
        self.methods.push(MethodDef {
            sig: sig.into_ref(),
            body,
        });
        self
    }

    /// The declared class
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Declared methods in declaration order
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    /// Handle of the method declared here with exactly this signature
    pub fn method_ref(&self, name: &str, params: &[TypeRef]) -> Option<MethodRef> {
        self.find(name, params).map(|def| def.sig.clone())
    }

    /// Find a declared method by name and parameter types
    pub fn find(&self, name: &str, params: &[TypeRef]) -> Option<&MethodDef> {
        self.methods.iter().find(|def| def.sig.has_shape(name, params))
    }
}

/// Declared classes of one mod
#[derive(Debug, Clone)]
pub struct ModAssembly {
    name: String,
    classes: Vec<ClassEntry>,
}

impl ModAssembly {
    /// Create an empty assembly
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
        }
    }

    /// Add a class (builder style)
    pub fn with_class(mut self, class: ClassEntry) -> Self {
        self.add_class(class);
        self
    }

    /// Add a class; a class with the same type replaces the previous one
    pub fn add_class(&mut self, class: ClassEntry) {
        match self.classes.iter_mut().find(|c| c.ty == class.ty) {
            Some(existing) => *existing = class,
            None => self.classes.push(class),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    /// Find the entry for a declared class
    pub fn class(&self, ty: &TypeRef) -> Option<&ClassEntry> {
        self.classes.iter().find(|c| &c.ty == ty)
    }

    /// Find a method by handle
    pub fn method(&self, method: &MethodSig) -> Option<&MethodDef> {
        self.class(&method.declaring)?
            .methods
            .iter()
            .find(|def| *def.sig == *method)
    }

    /// Replace a method's body
    ///
    /// Returns `false` if the method is not declared in this assembly.
    pub fn set_body(&mut self, method: &MethodSig, body: MethodBody) -> bool {
        let def = self
            .classes
            .iter_mut()
            .filter(|c| c.ty == method.declaring)
            .flat_map(|c| c.methods.iter_mut())
            .find(|def| *def.sig == *method);

        match def {
            Some(def) => {
                def.body = body;
                true
            }
            None => false,
        }
    }

    /// All method definitions across all classes
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.classes.iter().flat_map(|c| c.methods.iter())
    }

    /// Mutable access to all method definitions
    pub fn methods_mut(&mut self) -> impl Iterator<Item = &mut MethodDef> {
        self.classes.iter_mut().flat_map(|c| c.methods.iter_mut())
    }

    /// Walk `ty` and its base classes, yielding the entries declared here
    pub fn hierarchy<'a>(&'a self, ty: &TypeRef) -> impl Iterator<Item = &'a ClassEntry> + 'a {
        let mut current = Some(ty.clone());
        std::iter::from_fn(move || loop {
            let ty = current.take()?;
            current = ty.class().and_then(|c| c.base.clone());
            if let Some(entry) = self.class(&ty) {
                return Some(entry);
            }
        })
    }

    /// Find a method by name and parameters on `ty` or its nearest base
    pub fn find_in_hierarchy(&self, ty: &TypeRef, name: &str, params: &[TypeRef]) -> Option<&MethodDef> {
        self.hierarchy(ty).find_map(|class| class.find(name, params))
    }

    /// Resolve the most derived override of `method` for a receiver whose
    /// runtime class is `runtime`
    pub fn resolve_virtual(&self, runtime: &TypeRef, method: &MethodSig) -> Option<MethodRef> {
        self.hierarchy(runtime).find_map(|class| {
            class
                .methods
                .iter()
                .find(|def| def.sig.overrides(method))
                .map(|def| def.sig.clone())
        })
    }
}
