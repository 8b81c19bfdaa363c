use std::fmt;
use std::str::FromStr;

use crate::bridge::Bridge;
use crate::convert::JavaKind;
use crate::env::ForeignEnv;
use crate::error::{Error, Result};
use crate::value::Value;

/// How many positional arguments a function takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Required(usize),
    /// `n` required arguments followed by any number of extra ones.
    RequiredAndRest(usize),
}

impl Arity {
    pub fn accepts(self, given: usize) -> bool {
        match self {
            Arity::Required(n) => given == n,
            Arity::RequiredAndRest(n) => given >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Required(n) => write!(f, "{}", n),
            Arity::RequiredAndRest(n) => write!(f, "{}+", n),
        }
    }
}

/// Every function the bridge exposes to scripts.
///
/// The script-visible name of a typed variant embeds its kind, e.g.
/// `Function::CallStaticMethod(JavaKind::Int)` is `call_static_int_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    FindClass,
    GetObjectClass,
    GetMethodId,
    GetStaticMethodId,
    GetFieldId,
    GetStaticFieldId,
    NewObject,
    CallMethod(JavaKind),
    CallStaticMethod(JavaKind),
    GetField(JavaKind),
    SetField(JavaKind),
    GetStaticField(JavaKind),
    SetStaticField(JavaKind),
}

impl Function {
    /// The whole surface, in registration order.
    pub fn all() -> Vec<Function> {
        let mut functions = vec![
            Function::FindClass,
            Function::NewObject,
            Function::GetObjectClass,
            Function::GetFieldId,
            Function::GetMethodId,
            Function::GetStaticFieldId,
            Function::GetStaticMethodId,
        ];

        for kind in JavaKind::FIELDS.iter().copied() {
            functions.push(Function::GetField(kind));
            functions.push(Function::SetField(kind));
            functions.push(Function::GetStaticField(kind));
            functions.push(Function::SetStaticField(kind));
        }
        for kind in JavaKind::ALL.iter().copied() {
            functions.push(Function::CallMethod(kind));
            functions.push(Function::CallStaticMethod(kind));
        }

        functions
    }

    pub fn name(self) -> String {
        match self {
            Function::FindClass => "find_class".to_owned(),
            Function::GetObjectClass => "get_object_class".to_owned(),
            Function::GetMethodId => "get_method_id".to_owned(),
            Function::GetStaticMethodId => "get_static_method_id".to_owned(),
            Function::GetFieldId => "get_field_id".to_owned(),
            Function::GetStaticFieldId => "get_static_field_id".to_owned(),
            Function::NewObject => "new_object".to_owned(),
            Function::CallMethod(kind) => format!("call_{}_method", kind),
            Function::CallStaticMethod(kind) => format!("call_static_{}_method", kind),
            Function::GetField(kind) => format!("get_{}_field", kind),
            Function::SetField(kind) => format!("set_{}_field", kind),
            Function::GetStaticField(kind) => format!("get_static_{}_field", kind),
            Function::SetStaticField(kind) => format!("set_static_{}_field", kind),
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Function::FindClass | Function::GetObjectClass => Arity::Required(1),
            Function::GetMethodId
            | Function::GetStaticMethodId
            | Function::GetFieldId
            | Function::GetStaticFieldId => Arity::Required(3),
            Function::NewObject | Function::CallMethod(_) | Function::CallStaticMethod(_) => {
                Arity::RequiredAndRest(3)
            }
            Function::GetField(_) | Function::GetStaticField(_) => Arity::Required(2),
            Function::SetField(_) | Function::SetStaticField(_) => Arity::Required(3),
        }
    }

    fn parse_typed(name: &str) -> Option<Function> {
        let typed: [(&str, &str, fn(JavaKind) -> Function, bool); 6] = [
            ("call_static_", "_method", Function::CallStaticMethod, true),
            ("call_", "_method", Function::CallMethod, true),
            ("get_static_", "_field", Function::GetStaticField, false),
            ("set_static_", "_field", Function::SetStaticField, false),
            ("get_", "_field", Function::GetField, false),
            ("set_", "_field", Function::SetField, false),
        ];

        typed.iter().find_map(|&(prefix, suffix, function, allows_void)| {
            let kind = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
            match JavaKind::from_name(kind)? {
                JavaKind::Void if !allows_void => None,
                kind => Some(function(kind)),
            }
        })
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Function {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let function = match name {
            "find_class" => Function::FindClass,
            "get_object_class" => Function::GetObjectClass,
            "get_method_id" => Function::GetMethodId,
            "get_static_method_id" => Function::GetStaticMethodId,
            "get_field_id" => Function::GetFieldId,
            "get_static_field_id" => Function::GetStaticFieldId,
            "new_object" => Function::NewObject,
            _ => Function::parse_typed(name)
                .ok_or_else(|| Error::Usage(format!("undefined function '{}'", name)))?,
        };

        Ok(function)
    }
}

impl<E: ForeignEnv> Bridge<E> {
    /// Runs `function` with positional script arguments, the way the host runtime calls it.
    pub fn invoke(&self, function: Function, args: &[Value<E>]) -> Result<Value<E>> {
        let arity = function.arity();
        if !arity.accepts(args.len()) {
            return Err(Error::Usage(format!(
                "wrong number of arguments (given {}, expected {})",
                args.len(),
                arity
            )));
        }

        match function {
            Function::FindClass => self.find_class(args[0].string()?),
            Function::GetObjectClass => self.get_object_class(&args[0]),
            Function::GetMethodId => {
                self.get_method_id(&args[0], args[1].string()?, args[2].string()?)
            }
            Function::GetStaticMethodId => {
                self.get_static_method_id(&args[0], args[1].string()?, args[2].string()?)
            }
            Function::GetFieldId => {
                self.get_field_id(&args[0], args[1].string()?, args[2].string()?)
            }
            Function::GetStaticFieldId => {
                self.get_static_field_id(&args[0], args[1].string()?, args[2].string()?)
            }
            Function::NewObject => self.new_object(&args[0], &args[1], &args[2], &args[3..]),
            Function::CallMethod(kind) => {
                self.call_method(kind, &args[0], &args[1], &args[2], &args[3..])
            }
            Function::CallStaticMethod(kind) => {
                self.call_static_method(kind, &args[0], &args[1], &args[2], &args[3..])
            }
            Function::GetField(kind) => self.get_field(kind, &args[0], &args[1]),
            Function::SetField(kind) => self.set_field(kind, &args[0], &args[1], &args[2]),
            Function::GetStaticField(kind) => self.get_static_field(kind, &args[0], &args[1]),
            Function::SetStaticField(kind) => {
                self.set_static_field(kind, &args[0], &args[1], &args[2])
            }
        }
    }

    /// [`Bridge::invoke`] by script-visible name.
    pub fn invoke_by_name(&self, name: &str, args: &[Value<E>]) -> Result<Value<E>> {
        self.invoke(name.parse()?, args)
    }
}
