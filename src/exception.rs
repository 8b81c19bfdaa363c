//! Translation of pending Java exceptions into bridge errors.

use crate::error::Error;

pub const CLASS_NOT_FOUND_EXCEPTION: &str = "java.lang.ClassNotFoundException";
/// What `FindClass` throws for a class it cannot load.
pub const NO_CLASS_DEF_FOUND_ERROR: &str = "java.lang.NoClassDefFoundError";
pub const NO_SUCH_METHOD_ERROR: &str = "java.lang.NoSuchMethodError";
pub const NO_SUCH_FIELD_ERROR: &str = "java.lang.NoSuchFieldError";

/// The typed errors a Java exception class can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    ClassNotFound,
    NoSuchMethod,
    NoSuchField,
}

impl ExceptionKind {
    fn into_error(self, message: String) -> Error {
        match self {
            ExceptionKind::ClassNotFound => Error::ClassNotFound(message),
            ExceptionKind::NoSuchMethod => Error::NoSuchMethod(message),
            ExceptionKind::NoSuchField => Error::NoSuchField(message),
        }
    }
}

/// Maps fully qualified Java exception class names to typed errors.
///
/// Classes without an entry become [`Error::JavaException`], which keeps the class name next to the
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionTable {
    entries: Vec<(String, ExceptionKind)>,
}

impl ExceptionTable {
    /// A table without any entry: every exception is a `JavaException`.
    pub fn empty() -> Self {
        ExceptionTable {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces the mapping for `class_name` (dotted, e.g. `java.lang.NoSuchFieldError`).
    pub fn with(mut self, class_name: &str, kind: ExceptionKind) -> Self {
        self.insert(class_name, kind);
        self
    }

    /// Removes the mapping for `class_name`, folding it into the generic case.
    pub fn without(mut self, class_name: &str) -> Self {
        self.entries.retain(|(name, _)| name != class_name);
        self
    }

    pub fn insert(&mut self, class_name: &str, kind: ExceptionKind) {
        match self.entries.iter_mut().find(|(name, _)| name == class_name) {
            Some(entry) => entry.1 = kind,
            None => self.entries.push((class_name.to_owned(), kind)),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<ExceptionKind> {
        self.entries
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, kind)| *kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The error raised for an exception of class `class_name` carrying `message`.
    pub fn translate(&self, class_name: String, message: String) -> Error {
        match self.get(&class_name) {
            Some(kind) => kind.into_error(message),
            None => Error::JavaException {
                class_name,
                message,
            },
        }
    }
}

impl Default for ExceptionTable {
    fn default() -> Self {
        ExceptionTable::empty()
            .with(CLASS_NOT_FOUND_EXCEPTION, ExceptionKind::ClassNotFound)
            .with(NO_CLASS_DEF_FOUND_ERROR, ExceptionKind::ClassNotFound)
            .with(NO_SUCH_METHOD_ERROR, ExceptionKind::NoSuchMethod)
            .with(NO_SUCH_FIELD_ERROR, ExceptionKind::NoSuchField)
    }
}
