use jni::sys::{jbyte, jchar, jfloat, jint, jshort, JNI_FALSE, JNI_TRUE};
use log::trace;

use crate::convert::{ArgType, ForeignValue, JavaKind, Local};
use crate::env::ForeignEnv;
use crate::error::{Error, Expected, Result};
use crate::value::Value;

pub const ARGUMENT_TYPES_MISMATCH: &str =
    "argument_types must be an array with the same length as args";

/// The argument buffer of one foreign call.
///
/// Owns the Java strings created while encoding: they are deleted when the buffer is dropped,
/// whether the call went through, threw, or was never made because a later argument failed to
/// encode.
pub struct EncodedArguments<'b, E: ForeignEnv> {
    values: Vec<ForeignValue>,
    locals: Vec<Local<'b, E>>,
}

impl<'b, E: ForeignEnv> EncodedArguments<'b, E> {
    fn with_capacity(capacity: usize) -> Self {
        EncodedArguments {
            values: Vec::with_capacity(capacity),
            locals: Vec::new(),
        }
    }

    pub fn as_slice(&self) -> &[ForeignValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Encodes positional arguments according to the script writer's type descriptors.
///
/// `arg_types` must be an array with one descriptor per argument; this is checked before anything
/// is encoded. Encoding stops at the first argument that does not match its descriptor, and the
/// error cites that argument's 1-based index.
pub fn encode_arguments<'b, E: ForeignEnv>(
    env: &'b E,
    arg_types: &Value<E>,
    args: &[Value<E>],
) -> Result<EncodedArguments<'b, E>> {
    let descriptors = match arg_types {
        Value::Array(descriptors) if descriptors.len() == args.len() => descriptors,
        _ => return Err(Error::Usage(ARGUMENT_TYPES_MISMATCH.to_owned())),
    };

    let mut encoded = EncodedArguments::with_capacity(args.len());
    for (i, (descriptor, arg)) in descriptors.iter().zip(args).enumerate() {
        let index = i + 1;
        let arg_type = ArgType::from_descriptor(descriptor)
            .map_err(|expected| Error::WrongArgumentType { index, expected })?;

        let value = encode_value(env, &arg_type, arg, index, &mut encoded.locals)?;
        encoded.values.push(value);
    }

    trace!("encoded {} argument(s)", encoded.len());
    Ok(encoded)
}

/// Encodes the value passed to a field setter of the given kind.
///
/// Object fields take a reference, a string (stored as a new `java.lang.String`) or nil.
pub fn encode_field_value<'b, E: ForeignEnv>(
    env: &'b E,
    kind: JavaKind,
    value: &Value<E>,
) -> Result<EncodedArguments<'b, E>> {
    let mut encoded = EncodedArguments::with_capacity(1);

    let foreign = match ArgType::for_field(kind) {
        Some(arg_type) => encode_value(env, &arg_type, value, 1, &mut encoded.locals)?,
        None => match value {
            Value::Reference(_) | Value::Nil => {
                encode_value(env, &ArgType::Object(String::new()), value, 1, &mut encoded.locals)?
            }
            Value::Str(_) => encode_value(env, &ArgType::String, value, 1, &mut encoded.locals)?,
            _ => {
                return Err(Error::WrongArgumentType {
                    index: 1,
                    expected: Expected::ObjectOrNil,
                })
            }
        },
    };

    encoded.values.push(foreign);
    Ok(encoded)
}

fn encode_value<'b, E: ForeignEnv>(
    env: &'b E,
    arg_type: &ArgType,
    value: &Value<E>,
    index: usize,
    locals: &mut Vec<Local<'b, E>>,
) -> Result<ForeignValue> {
    let mismatch = |expected| Error::WrongArgumentType { index, expected };
    let primitive = || mismatch(Expected::Type(arg_type.name()));

    let foreign = match arg_type {
        ArgType::Boolean => {
            let b = value.as_bool().ok_or_else(primitive)?;
            ForeignValue::Boolean(if b { JNI_TRUE } else { JNI_FALSE })
        }
        ArgType::Byte => ForeignValue::Byte(value.as_integer().ok_or_else(primitive)? as jbyte),
        ArgType::Short => ForeignValue::Short(value.as_integer().ok_or_else(primitive)? as jshort),
        ArgType::Int => ForeignValue::Int(value.as_integer().ok_or_else(primitive)? as jint),
        ArgType::Long => ForeignValue::Long(value.as_integer().ok_or_else(primitive)?),
        ArgType::Char => match value {
            Value::Str(s) if s.len() == 1 => ForeignValue::Char(s.as_bytes()[0] as jchar),
            _ => return Err(primitive()),
        },
        ArgType::Float => ForeignValue::Float(value.as_float().ok_or_else(primitive)? as jfloat),
        ArgType::Double => ForeignValue::Double(value.as_float().ok_or_else(primitive)?),
        ArgType::String => match value {
            Value::Str(s) => {
                let string = Local::new(env, env.new_string(s)?);
                let raw = string.as_obj();
                locals.push(string);
                ForeignValue::Object(raw)
            }
            Value::Nil => ForeignValue::null(),
            _ => return Err(mismatch(Expected::StringOrNil)),
        },
        ArgType::Object(_) => match value {
            Value::Reference(r) => ForeignValue::Object(r.as_raw()),
            Value::Nil => ForeignValue::null(),
            _ => return Err(mismatch(Expected::ReferenceOrNil)),
        },
    };

    Ok(foreign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEnv;

    type V = Value<MockEnv>;

    fn types(names: &[&str]) -> V {
        Value::Array(names.iter().map(|n| V::symbol(n)).collect())
    }

    fn wrong_index(result: Result<EncodedArguments<'_, MockEnv>>) -> usize {
        match result {
            Err(Error::WrongArgumentType { index, .. }) => index,
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("encoding should have failed"),
        }
    }

    #[test]
    fn encodes_every_primitive() {
        let env = MockEnv::new();
        let args = vec![
            V::from(true),
            V::from(0x1ff),
            V::from("a"),
            V::from(0x1_0002),
            V::from(-5),
            V::from(1i64 << 40),
            V::from(0.5),
            V::from(2.25),
        ];
        let encoded = encode_arguments(
            &env,
            &types(&["boolean", "byte", "char", "short", "int", "long", "float", "double"]),
            &args,
        )
        .unwrap();

        assert_eq!(
            encoded.as_slice(),
            &[
                ForeignValue::Boolean(1),
                ForeignValue::Byte(-1),
                ForeignValue::Char(b'a' as jchar),
                ForeignValue::Short(2),
                ForeignValue::Int(-5),
                ForeignValue::Long(1 << 40),
                ForeignValue::Float(0.5),
                ForeignValue::Double(2.25),
            ]
        );
    }

    #[test]
    fn wrong_type_for_every_primitive_cites_index() {
        let env = MockEnv::new();
        let cases: Vec<(&str, V)> = vec![
            ("boolean", V::from(1)),
            ("byte", V::from(1.0)),
            ("char", V::from(7)),
            ("short", V::from("1")),
            ("int", V::from(1.5)),
            ("long", V::Nil),
            ("float", V::from(1)),
            ("double", V::from(true)),
            ("string", V::from(3)),
        ];

        for (name, bad) in cases {
            let args = vec![V::from(1), bad];
            let result = encode_arguments(&env, &types(&["int", name]), &args);
            assert_eq!(wrong_index(result), 2, "{}", name);
        }
        assert_eq!(env.foreign_calls(), 0);
    }

    #[test]
    fn char_needs_a_single_byte_string() {
        let env = MockEnv::new();
        for bad in &["", "ab", "é"] {
            let result = encode_arguments(&env, &types(&["char"]), &[V::from(*bad)]);
            assert_eq!(wrong_index(result), 1);
        }
    }

    #[test]
    fn message_names_expected_type() {
        let env = MockEnv::new();
        let err = encode_arguments(&env, &types(&["float"]), &[V::from(1)])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 1: Expected float argument");

        let err = encode_arguments(&env, &types(&["string"]), &[V::from(1)])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 1: Expected string argument or nil");
    }

    #[test]
    fn length_mismatch_is_a_usage_error() {
        let env = MockEnv::new();
        let result = encode_arguments(&env, &types(&["string", "int"]), &[V::from("x")]);
        match result {
            Err(Error::Usage(message)) => assert_eq!(message, ARGUMENT_TYPES_MISMATCH),
            _ => panic!("expected usage error"),
        }
        // nothing was encoded, not even the string that would have matched
        assert_eq!(env.created_strings(), 0);

        let result = encode_arguments(&env, &V::symbol("int"), &[V::from(1)]);
        assert!(matches!(result, Err(Error::Usage(_))));
    }

    #[test]
    fn strings_and_nil() {
        let env = MockEnv::new();
        let args = vec![V::from("hello"), V::Nil, V::Nil];
        let descriptors = Value::Array(vec![
            V::symbol("string"),
            V::symbol("string"),
            V::from("java.lang.Object"),
        ]);

        {
            let encoded = encode_arguments(&env, &descriptors, &args).unwrap();
            let values = encoded.as_slice();
            match values[0] {
                ForeignValue::Object(s) => assert_eq!(env.get_string(s).unwrap(), "hello"),
                other => panic!("unexpected {:?}", other),
            }
            assert_eq!(values[1], ForeignValue::null());
            assert_eq!(values[2], ForeignValue::null());
            assert_eq!(env.live_local_refs(), 1);
        }

        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn failure_releases_already_encoded_strings() {
        let env = MockEnv::new();
        let args = vec![V::from("one"), V::from("two"), V::from(3)];
        let result = encode_arguments(&env, &types(&["string", "string", "boolean"]), &args);

        assert_eq!(wrong_index(result), 3);
        assert_eq!(env.created_strings(), 2);
        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn object_descriptor_takes_references_only() {
        let env = MockEnv::new();
        let descriptors = Value::Array(vec![V::from("java.lang.String")]);
        let err = encode_arguments(&env, &descriptors, &[V::from("text")])
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "Argument 1: Expected JNI::Reference object or nil"
        );
    }

    #[test]
    fn invalid_descriptors() {
        let env = MockEnv::new();
        let err = encode_arguments(&env, &types(&["integer"]), &[V::from(1)])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 1: Unknown type symbol");

        let descriptors = Value::Array(vec![V::from(1)]);
        let err = encode_arguments(&env, &descriptors, &[V::from(1)])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 1: Type must be a symbol or string");
    }

    #[test]
    fn field_values() {
        let env = MockEnv::new();
        let encoded = encode_field_value(&env, JavaKind::Int, &V::from(9)).unwrap();
        assert_eq!(encoded.as_slice(), &[ForeignValue::Int(9)]);

        let encoded = encode_field_value(&env, JavaKind::Object, &V::from("s")).unwrap();
        assert_eq!(encoded.len(), 1);
        assert_eq!(env.live_local_refs(), 1);
        drop(encoded);
        assert_eq!(env.live_local_refs(), 0);

        let result = encode_field_value(&env, JavaKind::Object, &V::from(1));
        assert_eq!(wrong_index(result), 1);
        let result = encode_field_value(&env, JavaKind::Boolean, &V::from(1));
        assert_eq!(wrong_index(result), 1);
    }
}
