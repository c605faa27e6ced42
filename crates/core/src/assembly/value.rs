//! Runtime values

use std::fmt;

use esapi_engine::ModKey;
use esapi_sdk::TypeRef;

use crate::bridge::ExecError;

/// A value on the operand stack or passed to a method
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Result of a `void` call
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Value>),
    /// Runtime type object
    Type(TypeRef),
    /// Mod-identity handle
    Mod(ModKey),
    /// Event-caller (dispatcher) handle
    Caller(ModKey),
    /// Instance of a declared class
    Object(TypeRef),
}

impl Value {
    /// Short kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Unit => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Type(_) => "Type",
            Value::Mod(_) => "Mod",
            Value::Caller(_) => "EventCaller",
            Value::Object(_) => "object",
        }
    }

    fn mismatch(&self, expected: &'static str) -> ExecError {
        ExecError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn as_bool(&self) -> Result<bool, ExecError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, ExecError> {
        match self {
            Value::Int(v) => Ok(*v),
            other => Err(other.mismatch("int")),
        }
    }

    /// Float value; integers widen
    pub fn as_float(&self) -> Result<f64, ExecError> {
        match self {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_str(&self) -> Result<&str, ExecError> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn as_type(&self) -> Result<&TypeRef, ExecError> {
        match self {
            Value::Type(t) => Ok(t),
            other => Err(other.mismatch("Type")),
        }
    }

    /// Mod handle
    pub fn as_mod(&self) -> Result<ModKey, ExecError> {
        match self {
            Value::Mod(key) => Ok(*key),
            other => Err(other.mismatch("Mod")),
        }
    }

    /// Event-caller handle
    pub fn as_caller(&self) -> Result<ModKey, ExecError> {
        match self {
            Value::Caller(key) => Ok(*key),
            other => Err(other.mismatch("EventCaller")),
        }
    }

    /// `(string, int)` tuple, if this value has that shape
    pub fn as_text_and_int(&self) -> Option<(String, i64)> {
        match self {
            Value::Tuple(items) => match items.as_slice() {
                [Value::Str(s), Value::Int(i)] => Some((s.clone(), *i)),
                _ => None,
            },
            _ => None,
        }
    }

    /// `(int, int)` tuple, if this value has that shape
    pub fn as_int_pair(&self) -> Option<(i64, i64)> {
        match self {
            Value::Tuple(items) => match items.as_slice() {
                [Value::Int(a), Value::Int(b)] => Some((*a, *b)),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Fetch argument `index` from a native call's argument list
pub fn arg(args: &[Value], index: usize) -> Result<&Value, ExecError> {
    args.get(index).ok_or(ExecError::MissingArgument(index))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => f.write_str(s),
            Value::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            Value::Type(t) => write!(f, "{}", t),
            Value::Mod(key) => write!(f, "Mod({:?})", key),
            Value::Caller(key) => write!(f, "EventCaller({:?})", key),
            Value::Object(t) => write!(f, "{}", t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_report_mismatch() {
        assert_eq!(Value::Bool(true).as_bool().unwrap(), true);
        assert_eq!(Value::Int(3).as_float().unwrap(), 3.0);
        let err = Value::Str("x".into()).as_int().unwrap_err();
        assert!(matches!(
            err,
            ExecError::TypeMismatch { expected: "int", found: "string" }
        ));
    }

    #[test]
    fn test_tuple_shapes() {
        let t = Value::Tuple(vec![Value::Str("abc".into()), Value::Int(2)]);
        assert_eq!(t.as_text_and_int(), Some(("abc".to_string(), 2)));
        assert_eq!(t.as_int_pair(), None);

        let p = Value::Tuple(vec![Value::Int(1), Value::Int(4)]);
        assert_eq!(p.as_int_pair(), Some((1, 4)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(
            Value::Tuple(vec![Value::Int(1), Value::Str("a".into())]).to_string(),
            "(1, a)"
        );
    }
}
