//! Conversion between script values and JNI's typed value union.
//!
//! Arguments go through [`encode`], results through [`decode`](crate::bridge::Bridge::decode).
//! Both sides are driven by an explicit type: argument descriptors ([`ArgType`]) chosen by the
//! script writer, and the return or field kind ([`JavaKind`]) fixed by the bridge function called.

use std::fmt;

use constcat::concat;
use jni::sys::{jboolean, jbyte, jchar, jdouble, jfloat, jint, jlong, jobject, jshort, jvalue};

use crate::error::Expected;
use crate::value::Value;

pub use encode::*;
pub use handle::*;
pub use local::*;

mod decode;
mod encode;
mod handle;
mod local;

pub const OBJECT_CLASS: &str = "java/lang/Object";
pub const STRING_CLASS: &str = "java/lang/String";
pub const STRING_CLASS_NAME: &str = "java.lang.String";
pub const STRING_SIG: &str = concat!("L", STRING_CLASS, ";");
/// Signature of a no-argument method returning a `String`, like `toString` or `getName`.
pub const STRING_GETTER_SIG: &str = concat!("()", STRING_SIG);

/// The closed set of return and field types JNI has a typed call variant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JavaKind {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl JavaKind {
    pub const ALL: [JavaKind; 10] = [
        JavaKind::Void,
        JavaKind::Boolean,
        JavaKind::Byte,
        JavaKind::Char,
        JavaKind::Short,
        JavaKind::Int,
        JavaKind::Long,
        JavaKind::Float,
        JavaKind::Double,
        JavaKind::Object,
    ];

    /// Kinds a field can have.
    pub const FIELDS: [JavaKind; 9] = [
        JavaKind::Boolean,
        JavaKind::Byte,
        JavaKind::Char,
        JavaKind::Short,
        JavaKind::Int,
        JavaKind::Long,
        JavaKind::Float,
        JavaKind::Double,
        JavaKind::Object,
    ];

    /// The lowercase name used in script function names (`call_<name>_method`).
    pub fn name(self) -> &'static str {
        match self {
            JavaKind::Void => "void",
            JavaKind::Boolean => "boolean",
            JavaKind::Byte => "byte",
            JavaKind::Char => "char",
            JavaKind::Short => "short",
            JavaKind::Int => "int",
            JavaKind::Long => "long",
            JavaKind::Float => "float",
            JavaKind::Double => "double",
            JavaKind::Object => "object",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        JavaKind::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// The JNI signature character. Objects use `L`, the class name is not known here.
    pub fn signature(self) -> char {
        match self {
            JavaKind::Void => 'V',
            JavaKind::Boolean => 'Z',
            JavaKind::Byte => 'B',
            JavaKind::Char => 'C',
            JavaKind::Short => 'S',
            JavaKind::Int => 'I',
            JavaKind::Long => 'J',
            JavaKind::Float => 'F',
            JavaKind::Double => 'D',
            JavaKind::Object => 'L',
        }
    }
}

impl fmt::Display for JavaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single value as JNI sees it: one variant per member of the `jvalue` union, plus `Void` for
/// the result of void methods.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForeignValue {
    Void,
    Boolean(jboolean),
    Byte(jbyte),
    Char(jchar),
    Short(jshort),
    Int(jint),
    Long(jlong),
    Float(jfloat),
    Double(jdouble),
    Object(jobject),
}

impl ForeignValue {
    pub fn null() -> Self {
        ForeignValue::Object(std::ptr::null_mut())
    }

    pub fn kind(&self) -> JavaKind {
        match self {
            ForeignValue::Void => JavaKind::Void,
            ForeignValue::Boolean(_) => JavaKind::Boolean,
            ForeignValue::Byte(_) => JavaKind::Byte,
            ForeignValue::Char(_) => JavaKind::Char,
            ForeignValue::Short(_) => JavaKind::Short,
            ForeignValue::Int(_) => JavaKind::Int,
            ForeignValue::Long(_) => JavaKind::Long,
            ForeignValue::Float(_) => JavaKind::Float,
            ForeignValue::Double(_) => JavaKind::Double,
            ForeignValue::Object(_) => JavaKind::Object,
        }
    }

    /// The raw union member for `Call*MethodA` argument arrays. `Void` has no union member and is
    /// passed as a zeroed `long`.
    pub fn to_jvalue(self) -> jvalue {
        match self {
            ForeignValue::Void => jvalue { j: 0 },
            ForeignValue::Boolean(z) => jvalue { z },
            ForeignValue::Byte(b) => jvalue { b },
            ForeignValue::Char(c) => jvalue { c },
            ForeignValue::Short(s) => jvalue { s },
            ForeignValue::Int(i) => jvalue { i },
            ForeignValue::Long(j) => jvalue { j },
            ForeignValue::Float(f) => jvalue { f },
            ForeignValue::Double(d) => jvalue { d },
            ForeignValue::Object(l) => jvalue { l },
        }
    }
}

/// Declared type of one positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    /// Any object. The class name is informational and is not checked against the reference.
    Object(String),
}

impl ArgType {
    /// Reads a descriptor: a symbol naming a primitive (or `string`), or a string naming a class.
    pub fn from_descriptor<E>(descriptor: &Value<E>) -> std::result::Result<Self, Expected>
    where
        E: crate::env::ForeignEnv,
    {
        match descriptor {
            Value::Symbol(name) => ArgType::from_symbol(name).ok_or(Expected::UnknownTypeSymbol),
            Value::Str(class_name) => Ok(ArgType::Object(class_name.clone())),
            _ => Err(Expected::InvalidDescriptor),
        }
    }

    pub fn from_symbol(name: &str) -> Option<Self> {
        let arg_type = match name {
            "boolean" => ArgType::Boolean,
            "byte" => ArgType::Byte,
            "char" => ArgType::Char,
            "short" => ArgType::Short,
            "int" => ArgType::Int,
            "long" => ArgType::Long,
            "float" => ArgType::Float,
            "double" => ArgType::Double,
            "string" => ArgType::String,
            _ => return None,
        };

        Some(arg_type)
    }

    /// The argument type a field setter of the given kind encodes its value as.
    pub(crate) fn for_field(kind: JavaKind) -> Option<Self> {
        let arg_type = match kind {
            JavaKind::Void | JavaKind::Object => return None,
            JavaKind::Boolean => ArgType::Boolean,
            JavaKind::Byte => ArgType::Byte,
            JavaKind::Char => ArgType::Char,
            JavaKind::Short => ArgType::Short,
            JavaKind::Int => ArgType::Int,
            JavaKind::Long => ArgType::Long,
            JavaKind::Float => ArgType::Float,
            JavaKind::Double => ArgType::Double,
        };

        Some(arg_type)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ArgType::Boolean => "boolean",
            ArgType::Byte => "byte",
            ArgType::Char => "char",
            ArgType::Short => "short",
            ArgType::Int => "int",
            ArgType::Long => "long",
            ArgType::Float => "float",
            ArgType::Double => "double",
            ArgType::String => "string",
            ArgType::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEnv;

    #[test]
    fn signature_constants() {
        assert_eq!(STRING_SIG, "Ljava/lang/String;");
        assert_eq!(STRING_GETTER_SIG, "()Ljava/lang/String;");
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in JavaKind::ALL.iter() {
            assert_eq!(JavaKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(JavaKind::from_name("string"), None);
        assert!(!JavaKind::FIELDS.contains(&JavaKind::Void));
    }

    #[test]
    fn descriptors() {
        let int: Value<MockEnv> = Value::symbol("int");
        assert_eq!(ArgType::from_descriptor(&int), Ok(ArgType::Int));

        let class: Value<MockEnv> = Value::from("java.lang.Runnable");
        assert_eq!(
            ArgType::from_descriptor(&class),
            Ok(ArgType::Object("java.lang.Runnable".into()))
        );

        let unknown: Value<MockEnv> = Value::symbol("integer");
        assert_eq!(
            ArgType::from_descriptor(&unknown),
            Err(Expected::UnknownTypeSymbol)
        );

        let number: Value<MockEnv> = Value::from(3);
        assert_eq!(
            ArgType::from_descriptor(&number),
            Err(Expected::InvalidDescriptor)
        );
    }

    #[test]
    fn jvalue_members() {
        let v = ForeignValue::Int(-7).to_jvalue();
        assert_eq!(unsafe { v.i }, -7);

        let v = ForeignValue::Double(1.5).to_jvalue();
        assert_eq!(unsafe { v.d }, 1.5);

        assert!(unsafe { ForeignValue::null().to_jvalue().l }.is_null());
    }
}
