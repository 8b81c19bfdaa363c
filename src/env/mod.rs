//! The foreign call surface the bridge is written against.
//!
//! [`ForeignEnv`] mirrors the subset of the JNI function table the bridge needs. Calls that can
//! throw return `Err(jni::errors::Error::JavaException)` while leaving the exception pending, like
//! the `jni` crate does; the bridge then hands the pending exception to the
//! [`ExceptionTable`](crate::exception::ExceptionTable).

use jni::errors::Result as JniResult;
use jni::sys::{jclass, jfieldID, jmethodID, jobject, jstring, jthrowable};

use crate::convert::{ForeignValue, JavaKind};

pub use self::native::JniEnv;

mod native;

/// An owned global reference. Dropping it deletes the reference.
pub trait GlobalHandle {
    fn as_raw(&self) -> jobject;
}

/// A handle to the per-thread foreign execution environment.
///
/// Implementations are cheap to clone; the bridge and every encoded argument buffer hold one.
pub trait ForeignEnv: Clone {
    type Global: GlobalHandle;

    fn find_class(&self, name: &str) -> JniResult<jclass>;

    fn get_object_class(&self, obj: jobject) -> JniResult<jclass>;

    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID>;

    fn get_static_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID>;

    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID>;

    fn get_static_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID>;

    /// `Call<Kind>MethodA`. The returned value has the variant matching `ret`.
    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue>;

    /// `CallStatic<Kind>MethodA`.
    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue>;

    fn new_object(&self, class: jclass, ctor: jmethodID, args: &[ForeignValue])
        -> JniResult<jobject>;

    fn get_field(&self, obj: jobject, field: jfieldID, kind: JavaKind) -> JniResult<ForeignValue>;

    fn set_field(&self, obj: jobject, field: jfieldID, value: ForeignValue) -> JniResult<()>;

    fn get_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        kind: JavaKind,
    ) -> JniResult<ForeignValue>;

    fn set_static_field(&self, class: jclass, field: jfieldID, value: ForeignValue)
        -> JniResult<()>;

    fn new_global_ref(&self, obj: jobject) -> JniResult<Self::Global>;

    fn delete_local_ref(&self, obj: jobject);

    /// Creates a `java.lang.String` local reference from UTF-8 text.
    fn new_string(&self, s: &str) -> JniResult<jstring>;

    /// Reads the UTF-8 content of a `java.lang.String`.
    fn get_string(&self, s: jstring) -> JniResult<String>;

    /// The pending throwable, if any. Does not clear it.
    fn exception_occurred(&self) -> JniResult<Option<jthrowable>>;

    fn exception_clear(&self) -> JniResult<()>;

    /// Prints the pending exception and its backtrace to the platform's error log.
    fn exception_describe(&self) -> JniResult<()>;
}
