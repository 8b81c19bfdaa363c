//! The dynamic value model of the host scripting runtime.

use std::fmt;
use std::rc::Rc;

use duplicate::duplicate_item;

use crate::convert::{MemberId, MemberKind, Reference};
use crate::env::ForeignEnv;
use crate::error::{Error, Result};

/// A script value as seen by the bridge.
///
/// References are shared: cloning a `Value::Reference` clones the `Rc`, not the global reference.
pub enum Value<E: ForeignEnv> {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Str(String),
    Symbol(String),
    Array(Vec<Value<E>>),
    Reference(Rc<Reference<E>>),
    Member(MemberId),
}

impl<E: ForeignEnv> Value<E> {
    pub fn symbol(name: &str) -> Self {
        Value::Symbol(name.to_owned())
    }

    /// Name of the script class of this value, used in type error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(true) => "true",
            Value::Bool(false) => "false",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Symbol(_) => "Symbol",
            Value::Array(_) => "Array",
            Value::Reference(_) => "JNI::FFI::Reference",
            Value::Member(_) => "JNI::FFI::Pointer",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Rc<Reference<E>>> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&MemberId> {
        match self {
            Value::Member(m) => Some(m),
            _ => None,
        }
    }

    /// The reference handle this value holds, or a `TypeError`.
    pub fn reference(&self) -> Result<&Rc<Reference<E>>> {
        self.as_reference().ok_or(Error::TypeError {
            expected: "JNI::FFI::Reference",
            actual: self.type_name(),
        })
    }

    /// The member ID this value holds if it has the given kind, or a `TypeError`.
    pub fn member(&self, kind: MemberKind) -> Result<&MemberId> {
        match self {
            Value::Member(m) if m.kind() == kind => Ok(m),
            Value::Member(_) => Err(Error::TypeError {
                expected: kind.description(),
                actual: "JNI::FFI::Pointer of another kind",
            }),
            _ => Err(Error::TypeError {
                expected: kind.description(),
                actual: self.type_name(),
            }),
        }
    }

    /// The text of a string argument, or a `TypeError`.
    pub fn string(&self) -> Result<&str> {
        self.as_str().ok_or(Error::TypeError {
            expected: "String",
            actual: self.type_name(),
        })
    }
}

impl<E: ForeignEnv> Clone for Value<E> {
    fn clone(&self) -> Self {
        match self {
            Value::Nil => Value::Nil,
            Value::Bool(b) => Value::Bool(*b),
            Value::Integer(i) => Value::Integer(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(s.clone()),
            Value::Symbol(s) => Value::Symbol(s.clone()),
            Value::Array(a) => Value::Array(a.clone()),
            Value::Reference(r) => Value::Reference(Rc::clone(r)),
            Value::Member(m) => Value::Member(m.clone()),
        }
    }
}

impl<E: ForeignEnv> PartialEq for Value<E> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => Rc::ptr_eq(a, b),
            (Value::Member(a), Value::Member(b)) => a == b,
            _ => false,
        }
    }
}

impl<E: ForeignEnv> fmt::Debug for Value<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Symbol(s) => write!(f, ":{}", s),
            Value::Array(a) => f.debug_list().entries(a).finish(),
            Value::Reference(r) => write!(f, "{:?}", r),
            Value::Member(m) => write!(f, "{:?}", m),
        }
    }
}

#[duplicate_item(
    int_type;
    [i8];
    [i16];
    [i32];
    [i64];
    [u8];
    [u16];
    [u32];
)]
impl<E: ForeignEnv> From<int_type> for Value<E> {
    fn from(i: int_type) -> Self {
        Value::Integer(i as i64)
    }
}

#[duplicate_item(
    float_type;
    [f32];
    [f64];
)]
impl<E: ForeignEnv> From<float_type> for Value<E> {
    fn from(x: float_type) -> Self {
        Value::Float(x as f64)
    }
}

impl<E: ForeignEnv> From<bool> for Value<E> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<E: ForeignEnv> From<&str> for Value<E> {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl<E: ForeignEnv> From<String> for Value<E> {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<E: ForeignEnv> From<Rc<Reference<E>>> for Value<E> {
    fn from(r: Rc<Reference<E>>) -> Self {
        Value::Reference(r)
    }
}

impl<E: ForeignEnv> From<MemberId> for Value<E> {
    fn from(m: MemberId) -> Self {
        Value::Member(m)
    }
}

impl<E: ForeignEnv, T: Into<Value<E>>> From<Option<T>> for Value<E> {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Nil, Into::into)
    }
}

impl<E: ForeignEnv, T: Into<Value<E>>> From<Vec<T>> for Value<E> {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}
