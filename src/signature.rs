//! JNI type signatures built from script type descriptors.
//!
//! A descriptor is a symbol naming a primitive (`:int`), `:string` or `:void`, a string naming a
//! class (`"java.net.URL"`, dots or slashes), or a one-element array for an array type (`[:int]`).

use std::fmt;

use crate::convert::{JavaKind, STRING_SIG};
use crate::env::ForeignEnv;
use crate::error::{Error, Result};
use crate::value::Value;

/// A parsed type descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    /// A primitive type or `void`. Never [`JavaKind::Object`].
    Primitive(JavaKind),
    String,
    /// A class name, as written by the script.
    Class(String),
    Array(Box<TypeSpec>),
}

impl TypeSpec {
    pub fn from_symbol(name: &str) -> Option<Self> {
        match name {
            "string" => Some(TypeSpec::String),
            "object" => None,
            _ => JavaKind::from_name(name).map(TypeSpec::Primitive),
        }
    }

    pub fn from_value<E: ForeignEnv>(value: &Value<E>) -> Result<Self> {
        match value {
            Value::Symbol(name) => TypeSpec::from_symbol(name)
                .ok_or_else(|| Error::Usage(format!("Unknown type: {}", name))),
            Value::Str(class_name) => Ok(TypeSpec::Class(class_name.clone())),
            Value::Array(items) => match items.as_slice() {
                [item] => Ok(TypeSpec::Array(Box::new(TypeSpec::from_value(item)?))),
                _ => Err(Error::Usage("Invalid array type".to_owned())),
            },
            other => Err(Error::Usage(format!("Unknown type: {:?}", other))),
        }
    }

    /// Parses every element of an array of descriptors.
    pub fn list_from_value<E: ForeignEnv>(value: &Value<E>) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items.iter().map(TypeSpec::from_value).collect(),
            other => Err(Error::TypeError {
                expected: "Array",
                actual: other.type_name(),
            }),
        }
    }

    /// The kind of the typed JNI call or field accessor that reads this type.
    pub fn kind(&self) -> JavaKind {
        match self {
            TypeSpec::Primitive(kind) => *kind,
            TypeSpec::String | TypeSpec::Class(_) | TypeSpec::Array(_) => JavaKind::Object,
        }
    }

    pub fn signature(&self) -> String {
        match self {
            TypeSpec::Primitive(kind) => kind.signature().to_string(),
            TypeSpec::String => STRING_SIG.to_owned(),
            TypeSpec::Class(name) => format!("L{};", name.replace('.', "/")),
            TypeSpec::Array(element) => format!("[{}", element.signature()),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// `(<arguments>)<return>`, e.g. `(IZ)Z`.
pub fn method_signature(argument_types: &[TypeSpec], return_type: &TypeSpec) -> String {
    let arguments: String = argument_types.iter().map(TypeSpec::signature).collect();
    format!("({}){}", arguments, return_type.signature())
}

/// `parse_boolean` becomes `parseBoolean`. Parts after the first are capitalized, the rest of each
/// part is lowercased.
pub fn snake_case_to_camel_case(snake_case: &str) -> String {
    let mut parts = snake_case.split('_');
    let mut camel_case = parts.next().unwrap_or_default().to_owned();

    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            camel_case.extend(first.to_uppercase());
            camel_case.push_str(&chars.as_str().to_lowercase());
        }
    }

    camel_case
}
