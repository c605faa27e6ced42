//! Method body interpreter
//!
//! Evaluates instruction bodies on an operand stack. Calls into the API
//! class (and the `EventCaller` intrinsics) resolve to catalog natives; every
//! other call resolves inside the mod's assembly.
//!
//! `call` always invokes the referenced method. `callvirt` looks up the most
//! derived override for the receiver's runtime class first.

use esapi_engine::{Registry, RegistryError};
use esapi_sdk::{api_type, event_caller_type, MethodRef, MethodSig, TypeRef};

use crate::assembly::{Instruction, MethodBody, ModAssembly, Value};
use crate::settings::{SettingsError, SettingsStore};

use super::catalog::ApiCatalog;

/// Maximum nested call depth before execution is aborted
pub const MAX_CALL_DEPTH: usize = 64;

/// Errors raised while executing a method
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Operand stack had fewer values than an instruction needed
    #[error("Stack underflow in {0}")]
    StackUnderflow(String),

    /// A value had the wrong kind
    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A native was called with too few arguments
    #[error("Missing argument {0}")]
    MissingArgument(usize),

    /// `ldarg` referenced an argument that does not exist
    #[error("Argument {index} out of range in {method}")]
    ArgumentOutOfRange { method: String, index: usize },

    /// Wrong number of arguments for a call
    #[error("{method} takes {expected} arguments, got {found}")]
    ArityMismatch {
        method: String,
        expected: usize,
        found: usize,
    },

    /// Call target is neither in the catalog nor in the assembly
    #[error("Unresolved method: {0}")]
    UnresolvedMethod(String),

    /// Call target has no body
    #[error("Method has no body: {0}")]
    NoBody(String),

    /// Recursion limit reached
    #[error("Call depth exceeded {0}")]
    CallDepthExceeded(usize),

    /// Registry lookup failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Settings store access failed
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Raised by a native mod method
    #[error("{0}")]
    Raised(String),

    /// An error that unwound through a method frame
    #[error("{source}")]
    InMethod {
        method: String,
        #[source]
        source: Box<ExecError>,
    },
}

impl ExecError {
    /// Attach a frame to this error
    fn within(self, method: &MethodSig) -> Self {
        ExecError::InMethod {
            method: method.full_name(),
            source: Box::new(self),
        }
    }

    /// The innermost error, without frames
    pub fn root(&self) -> &ExecError {
        match self {
            ExecError::InMethod { source, .. } => source.root(),
            other => other,
        }
    }

    /// Frames the error unwound through, innermost first
    pub fn frames(&self) -> Vec<&str> {
        let mut frames = Vec::new();
        let mut current = self;
        while let ExecError::InMethod { method, source } = current {
            frames.push(method.as_str());
            current = source;
        }
        frames.reverse();
        frames
    }

    /// Error message followed by one `at` line per frame
    pub fn clean_trace(&self) -> String {
        let mut out = self.root().to_string();
        for frame in self.frames() {
            out.push_str("\n  at ");
            out.push_str(frame);
        }
        out
    }
}

/// Context handed to native methods
pub struct NativeEnv<'a> {
    pub registry: &'a Registry,
    pub store: &'a SettingsStore,
}

/// Interpreter bound to one mod assembly
pub struct Interpreter<'a> {
    assembly: &'a ModAssembly,
    catalog: &'a ApiCatalog,
    env: NativeEnv<'a>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        assembly: &'a ModAssembly,
        catalog: &'a ApiCatalog,
        registry: &'a Registry,
        store: &'a SettingsStore,
    ) -> Self {
        Self {
            assembly,
            catalog,
            env: NativeEnv { registry, store },
        }
    }

    /// Invoke a method with its full argument list (receiver first)
    pub fn invoke(&self, method: &MethodRef, args: Vec<Value>) -> Result<Value, ExecError> {
        self.invoke_at(method, args, 0)
    }

    fn invoke_at(&self, method: &MethodRef, args: Vec<Value>, depth: usize) -> Result<Value, ExecError> {
        if depth >= MAX_CALL_DEPTH {
            return Err(ExecError::CallDepthExceeded(MAX_CALL_DEPTH));
        }
        if args.len() != method.arity() {
            return Err(ExecError::ArityMismatch {
                method: method.full_name(),
                expected: method.arity(),
                found: args.len(),
            });
        }

        if self.is_api_method(method) {
            let native = self
                .catalog
                .native(method)
                .ok_or_else(|| ExecError::UnresolvedMethod(method.to_string()))?;
            return (**native)(&self.env, &args);
        }

        let def = self
            .assembly
            .method(method)
            .ok_or_else(|| ExecError::UnresolvedMethod(method.to_string()))?;

        match &def.body {
            MethodBody::Native(native) => (**native)(&self.env, &args).map_err(|e| e.within(method)),
            MethodBody::Il(code) => self.run(method, code, &args, depth).map_err(|e| e.within(method)),
            MethodBody::Abstract => Err(ExecError::NoBody(method.to_string())),
        }
    }

    fn is_api_method(&self, method: &MethodSig) -> bool {
        method.declaring == api_type() || method.declaring == event_caller_type()
    }

    /// Runtime class of a receiver value
    fn runtime_class(&self, receiver: &Value) -> Option<TypeRef> {
        match receiver {
            Value::Object(ty) => Some(ty.clone()),
            Value::Mod(key) => self.env.registry.main_type(*key),
            Value::Caller(_) => Some(event_caller_type()),
            _ => None,
        }
    }

    fn run(&self, method: &MethodSig, code: &[Instruction], args: &[Value], depth: usize) -> Result<Value, ExecError> {
        let mut stack: Vec<Value> = Vec::new();
        let underflow = || ExecError::StackUnderflow(method.full_name());

        for instruction in code {
            match instruction {
                Instruction::LdArg(index) => {
                    let index = usize::from(*index);
                    let value = args.get(index).cloned().ok_or_else(|| ExecError::ArgumentOutOfRange {
                        method: method.full_name(),
                        index,
                    })?;
                    stack.push(value);
                }
                Instruction::LdInt(v) => stack.push(Value::Int(*v)),
                Instruction::LdStr(s) => stack.push(Value::Str(s.clone())),
                Instruction::LdToken(ty) => stack.push(Value::Type(ty.clone())),
                Instruction::Call(target) | Instruction::CallVirt(target) => {
                    let arity = target.arity();
                    if stack.len() < arity {
                        return Err(underflow());
                    }
                    let call_args = stack.split_off(stack.len() - arity);

                    let resolved = match instruction {
                        Instruction::CallVirt(_) if !target.is_static => call_args
                            .first()
                            .and_then(|receiver| self.runtime_class(receiver))
                            .and_then(|class| self.assembly.resolve_virtual(&class, target))
                            .unwrap_or_else(|| target.clone()),
                        _ => target.clone(),
                    };

                    let result = self.invoke_at(&resolved, call_args, depth + 1)?;
                    if !resolved.ret.is_void() {
                        stack.push(result);
                    }
                }
                Instruction::Ret => {
                    return if method.ret.is_void() {
                        Ok(Value::Unit)
                    } else {
                        stack.pop().ok_or_else(underflow)
                    };
                }
            }
        }

        // Falling off the end behaves like `ret`
        if method.ret.is_void() {
            Ok(Value::Unit)
        } else {
            stack.pop().ok_or_else(underflow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{arg, ClassEntry};
    use esapi_sdk::{mod_type, ClassDef};

    struct Fixture {
        registry: Registry,
        store: SettingsStore,
        catalog: ApiCatalog,
    }

    fn fixture() -> Fixture {
        Fixture {
            registry: Registry::new(),
            store: SettingsStore::new(),
            catalog: ApiCatalog::standard(),
        }
    }

    #[test]
    fn test_constant_body() {
        let fx = fixture();
        let holder = ClassDef::new("Holder").into_type();
        let assembly = ModAssembly::new("m").with_class(ClassEntry::new(holder.clone()).static_method(
            "Answer",
            [],
            TypeRef::Int,
            MethodBody::Il(vec![Instruction::LdInt(42), Instruction::Ret]),
        ));
        let answer = assembly.class(&holder).unwrap().method_ref("Answer", &[]).unwrap();

        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        assert_eq!(vm.invoke(&answer, vec![]).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_call_vs_callvirt() {
        let fx = fixture();
        let base = ClassDef::new("Base").into_type();
        let derived = ClassDef::new("Derived").extends(base.clone()).into_type();
        let base_name = MethodSig::instance(base.clone(), "Name", [], TypeRef::String).into_ref();

        let assembly = ModAssembly::new("m")
            .with_class(
                ClassEntry::new(base.clone())
                    .instance_method("Name", [], TypeRef::String, MethodBody::Il(vec![Instruction::LdStr("base".into()), Instruction::Ret]))
                    .instance_method(
                        "Early",
                        [],
                        TypeRef::String,
                        MethodBody::Il(vec![Instruction::LdArg(0), Instruction::Call(base_name.clone()), Instruction::Ret]),
                    )
                    .instance_method(
                        "Late",
                        [],
                        TypeRef::String,
                        MethodBody::Il(vec![Instruction::LdArg(0), Instruction::CallVirt(base_name.clone()), Instruction::Ret]),
                    ),
            )
            .with_class(ClassEntry::new(derived.clone()).instance_method(
                "Name",
                [],
                TypeRef::String,
                MethodBody::Il(vec![Instruction::LdStr("derived".into()), Instruction::Ret]),
            ));

        let class = assembly.class(&base).unwrap();
        let early = class.method_ref("Early", &[]).unwrap();
        let late = class.method_ref("Late", &[]).unwrap();
        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        let receiver = Value::Object(derived);

        assert_eq!(vm.invoke(&early, vec![receiver.clone()]).unwrap(), Value::Str("base".into()));
        assert_eq!(vm.invoke(&late, vec![receiver]).unwrap(), Value::Str("derived".into()));
    }

    #[test]
    fn test_native_error_carries_frames() {
        let fx = fixture();
        let holder = ClassDef::new("Holder").into_type();
        let fail = MethodSig::static_fn(holder.clone(), "Fail", [], TypeRef::Void).into_ref();
        let assembly = ModAssembly::new("m").with_class(
            ClassEntry::new(holder.clone())
                .static_method("Fail", [], TypeRef::Void, MethodBody::native(|_, _| Err(ExecError::Raised("boom".into()))))
                .static_method("Outer", [], TypeRef::Void, MethodBody::Il(vec![Instruction::Call(fail), Instruction::Ret])),
        );
        let outer = assembly.class(&holder).unwrap().method_ref("Outer", &[]).unwrap();

        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        let err = vm.invoke(&outer, vec![]).unwrap_err();
        assert_eq!(err.frames(), vec!["Holder::Fail", "Holder::Outer"]);
        assert_eq!(err.clean_trace(), "boom\n  at Holder::Fail\n  at Holder::Outer");
    }

    #[test]
    fn test_recursion_is_bounded() {
        let fx = fixture();
        let holder = ClassDef::new("Holder").into_type();
        let spin = MethodSig::static_fn(holder.clone(), "Spin", [], TypeRef::Void).into_ref();
        let assembly = ModAssembly::new("m").with_class(ClassEntry::new(holder).static_method(
            "Spin",
            [],
            TypeRef::Void,
            MethodBody::Il(vec![Instruction::Call(spin.clone()), Instruction::Ret]),
        ));

        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        let err = vm.invoke(&spin, vec![]).unwrap_err();
        assert!(matches!(err.root(), ExecError::CallDepthExceeded(_)));
    }

    #[test]
    fn test_arity_checked() {
        let fx = fixture();
        let holder = ClassDef::new("Holder").into_type();
        let assembly = ModAssembly::new("m").with_class(ClassEntry::new(holder.clone()).static_method(
            "Echo",
            [TypeRef::Int],
            TypeRef::Int,
            MethodBody::native(|_, args| arg(args, 0).cloned()),
        ));
        let echo = assembly.class(&holder).unwrap().method_ref("Echo", &[TypeRef::Int]).unwrap();

        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        assert_eq!(vm.invoke(&echo, vec![Value::Int(7)]).unwrap(), Value::Int(7));
        assert!(matches!(vm.invoke(&echo, vec![]), Err(ExecError::ArityMismatch { .. })));
    }

    #[test]
    fn test_api_calls_resolve_to_catalog() {
        let fx = fixture();
        let main = ClassDef::new("Alpha").extends(mod_type()).into_type();
        let key = fx.registry.register_mod("Alpha", main.clone()).unwrap();

        let assembly = ModAssembly::new("m");
        let vm = Interpreter::new(&assembly, &fx.catalog, &fx.registry, &fx.store);
        let result = vm
            .invoke(fx.catalog.get_mod(), vec![Value::Type(main)])
            .unwrap();
        assert_eq!(result, Value::Mod(key));
    }
}
