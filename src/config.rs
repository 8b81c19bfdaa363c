use crate::exception::{ExceptionKind, ExceptionTable};

/// Settings of a [`Bridge`](crate::bridge::Bridge), built like `android_logger::Config`:
///
/// ```
/// use robusta_ffi::config::Config;
/// use robusta_ffi::exception::NO_SUCH_FIELD_ERROR;
///
/// let config = Config::default()
///     .without_exception(NO_SUCH_FIELD_ERROR)
///     .with_describe_exceptions(true);
/// assert!(config.exceptions().get(NO_SUCH_FIELD_ERROR).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    exceptions: ExceptionTable,
    describe_exceptions: bool,
}

impl Config {
    /// Replaces the whole exception table.
    pub fn with_exception_table(mut self, exceptions: ExceptionTable) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn with_exception(mut self, class_name: &str, kind: ExceptionKind) -> Self {
        self.exceptions.insert(class_name, kind);
        self
    }

    pub fn without_exception(mut self, class_name: &str) -> Self {
        self.exceptions = self.exceptions.without(class_name);
        self
    }

    /// Print pending exceptions with `ExceptionDescribe` before they are cleared and translated.
    pub fn with_describe_exceptions(mut self, describe: bool) -> Self {
        self.describe_exceptions = describe;
        self
    }

    pub fn exceptions(&self) -> &ExceptionTable {
        &self.exceptions
    }

    pub fn describe_exceptions(&self) -> bool {
        self.describe_exceptions
    }
}
