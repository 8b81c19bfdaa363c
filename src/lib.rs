//! This library provides a dynamic bridge between an embedded scripting runtime and the Java Native Interface.
//!
//! Scripts get a small, untyped surface (find a class, look up a method or field ID, call it) and
//! `robusta_ffi` takes care of everything JNI is strict about: converting values according to
//! explicit type descriptors, keeping references alive for as long as scripts hold them, and
//! turning pending Java exceptions into errors.
//!
//! ```toml
//! [dependencies]
//! robusta_ffi = "0.1.0"
//! ```
//!
//! ## Usage
//! A [`Bridge`](bridge::Bridge) is created from the thread's `JNIEnv` and a [`Config`](config::Config).
//! Every script-visible function is a method on it, and [`Bridge::invoke`](bridge::Bridge::invoke)
//! routes calls by name for hosts that register functions dynamically.
//!
//! ```rust,no_run
//! use robusta_ffi::bridge::Bridge;
//! use robusta_ffi::config::Config;
//! use robusta_ffi::env::JniEnv;
//! use robusta_ffi::jni::JNIEnv;
//! use robusta_ffi::value::Value;
//!
//! fn value_of(env: JNIEnv<'_>) -> robusta_ffi::Result<Value<JniEnv<'_>>> {
//!     let bridge = Bridge::new(JniEnv::new(env), Config::default())?;
//!
//!     let string = bridge.find_class("java/lang/String")?;
//!     let value_of = bridge.get_static_method_id(&string, "valueOf", "(I)Ljava/lang/String;")?;
//!
//!     // "42"
//!     bridge.call_static_object_method(
//!         &string,
//!         &value_of,
//!         &Value::Array(vec![Value::symbol("int")]),
//!         &[Value::from(42)],
//!     )
//! }
//! ```
//!
//! ## Conversion details
//! Arguments are encoded according to a descriptor array passed alongside them: a symbol names a
//! primitive type (or `string`), a string names an object class.
//!
//! | **Descriptor**        | **Script value**                 | **Java**                |
//! |-----------------------|----------------------------------|-------------------------|
//! | `:boolean`            | `true` / `false`                 | boolean                 |
//! | `:byte` ... `:long`   | Integer (truncated)              | byte, short, int, long  |
//! | `:char`               | one-byte String                  | char                    |
//! | `:float`, `:double`   | Float                            | float, double           |
//! | `:string`             | String or nil                    | `java.lang.String`      |
//! | `"com.example.Foo"`   | [`Reference`](convert::Reference) or nil | any object      |
//!
//! Results are decoded by the return type of the function called: primitives become integers,
//! floats or booleans, `char` becomes a one-character string, `java.lang.String` objects become
//! strings and every other object becomes a [`Reference`](convert::Reference) handle.
//!
//! The first argument that does not match its descriptor fails the whole call with
//! [`Error::WrongArgumentType`] before anything is sent to the JVM.
//!
//! ## Classes
//! [`Bridge::java_class`](bridge::Bridge::java_class) gives the object-style layer on top of the
//! raw functions: a [`JavaClass`](bridge::JavaClass) looked up once by its dotted name, with
//! methods registered under snake_case names and script type descriptors. The JNI signature is
//! built from the descriptors (see [`signature`]).
//!
//! ```rust,no_run
//! # use robusta_ffi::bridge::Bridge;
//! # use robusta_ffi::env::JniEnv;
//! # use robusta_ffi::value::Value;
//! fn parse_boolean<'a>(bridge: &Bridge<JniEnv<'a>>) -> robusta_ffi::Result<Value<JniEnv<'a>>> {
//!     let boolean = bridge.java_class("java.lang.Boolean")?;
//!     // parseBoolean(Ljava/lang/String;)Z
//!     boolean.register_static_method(
//!         bridge,
//!         "parse_boolean",
//!         &Value::Array(vec![Value::symbol("string")]),
//!         &Value::symbol("boolean"),
//!     )?;
//!     Ok(boolean.call_static(bridge, "parse_boolean", &[Value::from("true")])?.into_value())
//! }
//! ```
//!
//! ## Exceptions
//! Pending Java exceptions are cleared and translated through an
//! [`ExceptionTable`](exception::ExceptionTable): `ClassNotFoundException`, `NoClassDefFoundError`,
//! `NoSuchMethodError` and `NoSuchFieldError` have dedicated errors by default, anything else becomes
//! [`Error::JavaException`] with the Java class name kept in the message.
//!
//! ## Testing
//! The `testing` feature exports [`testing::MockEnv`], an in-memory stand-in for the JVM that
//! also tracks local and global references. The `invocation` feature enables the integration tests
//! that start a real JVM.

pub mod bridge;
pub mod config;
pub mod convert;
pub mod env;
pub mod error;
pub mod exception;
pub mod signature;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod value;

pub use crate::bridge::{Bridge, Function, JavaClass, JavaObject, Returned};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::value::Value;

pub use jni;
