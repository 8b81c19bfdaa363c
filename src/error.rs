use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised to the script frame that invoked the bridge.
///
/// The three named lookup failures and [`Error::JavaException`] come from a pending Java exception
/// (see [`crate::exception::ExceptionTable`]), the others are detected before any foreign call is made.
#[derive(Debug, Error)]
pub enum Error {
    /// A positional argument does not match its declared foreign type. `index` is 1-based.
    #[error("Argument {index}: {expected}")]
    WrongArgumentType { index: usize, expected: Expected },

    /// Generic misuse of the bridge, e.g. an argument type array of the wrong length.
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    ClassNotFound(String),

    #[error("{0}")]
    NoSuchMethod(String),

    #[error("{0}")]
    NoSuchField(String),

    /// Any other Java exception. The class name is kept so the message is not lost by the generic mapping.
    #[error("{message} ({class_name})")]
    JavaException { class_name: String, message: String },

    /// A value that is not a handle of the required kind was passed where one is needed.
    #[error("wrong argument type {actual} (expected {expected})")]
    TypeError {
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Jni(#[from] jni::errors::Error),
}

impl Error {
    /// Returns `true` if the error was translated from a pending Java exception.
    pub fn is_java_exception(&self) -> bool {
        matches!(
            self,
            Error::ClassNotFound(_)
                | Error::NoSuchMethod(_)
                | Error::NoSuchField(_)
                | Error::JavaException { .. }
        )
    }

    /// Name of the script-side exception class this error is raised as.
    pub fn script_class(&self) -> &'static str {
        match self {
            Error::WrongArgumentType { .. } => "WrongArgumentType",
            Error::Usage(_) | Error::Jni(_) => "Exception",
            Error::ClassNotFound(_) => "ClassNotFound",
            Error::NoSuchMethod(_) => "NoSuchMethod",
            Error::NoSuchField(_) => "NoSuchField",
            Error::JavaException { .. } => "JavaException",
            Error::TypeError { .. } => "TypeError",
        }
    }
}

/// What an argument was expected to be when encoding failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Expected {
    #[error("Expected {0} argument")]
    Type(&'static str),

    #[error("Expected string argument or nil")]
    StringOrNil,

    #[error("Expected JNI::Reference object or nil")]
    ReferenceOrNil,

    #[error("Expected JNI::Reference object, string or nil")]
    ObjectOrNil,

    #[error("Unknown type symbol")]
    UnknownTypeSymbol,

    #[error("Type must be a symbol or string")]
    InvalidDescriptor,
}
