use jni::sys::jobject;

use crate::env::ForeignEnv;

/// A call-scoped local reference owned by the bridge. The reference is deleted on drop, so locals
/// created while handling one script call never pile up in the frame of the native caller.
pub struct Local<'b, E: ForeignEnv> {
    obj: jobject,
    env: &'b E,
}

impl<'b, E: ForeignEnv> Local<'b, E> {
    pub fn new(env: &'b E, obj: jobject) -> Self {
        Local { obj, env }
    }

    /// Get the wrapped reference. It stays valid as long as `self` is alive.
    pub fn as_obj(&self) -> jobject {
        self.obj
    }

    pub fn is_null(&self) -> bool {
        self.obj.is_null()
    }
}

impl<'b, E: ForeignEnv> Drop for Local<'b, E> {
    fn drop(&mut self) {
        if !self.obj.is_null() {
            self.env.delete_local_ref(self.obj);
        }
    }
}
