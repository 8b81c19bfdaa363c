use jni::errors::{Error, Result as JniResult};
use jni::objects::{
    GlobalRef, JClass, JFieldID, JMethodID, JObject, JStaticFieldID, JStaticMethodID, JString,
    JValue,
};
use jni::signature::{JavaType, Primitive, ReturnType};
use jni::sys::{self, jclass, jfieldID, jlong, jmethodID, jobject, jstring, jthrowable, jvalue};
use jni::JNIEnv;
use log::debug;
use static_assertions::assert_eq_size;

use crate::convert::{ForeignValue, JavaKind, OBJECT_CLASS};
use crate::env::{ForeignEnv, GlobalHandle};

// `Call*MethodA` reads argument arrays as packed 8-byte unions.
assert_eq_size!(jvalue, jlong);

impl GlobalHandle for GlobalRef {
    fn as_raw(&self) -> jobject {
        self.as_obj().into_raw()
    }
}

/// [`ForeignEnv`] backed by a live [`JNIEnv`].
///
/// IDs arrive as raw pointers from the bridge and are rewrapped for the `*_unchecked` family of
/// `JNIEnv`, which maps one to one onto `Call<Kind>MethodA`, `Get<Kind>Field` and friends.
#[derive(Clone)]
pub struct JniEnv<'a> {
    env: JNIEnv<'a>,
}

impl<'a> JniEnv<'a> {
    pub fn new(env: JNIEnv<'a>) -> Self {
        JniEnv { env }
    }

    /// # Safety
    /// `ptr` must be a valid `JNIEnv` pointer for the current thread.
    pub unsafe fn from_raw(ptr: *mut sys::JNIEnv) -> JniResult<Self> {
        JNIEnv::from_raw(ptr).map(JniEnv::new)
    }

    pub fn env(&self) -> &JNIEnv<'a> {
        &self.env
    }

    fn object(&self, obj: jobject, what: &'static str) -> JniResult<JObject<'a>> {
        if obj.is_null() {
            return Err(Error::NullPtr(what));
        }
        Ok(unsafe { JObject::from_raw(obj) })
    }

    fn class(&self, class: jclass, what: &'static str) -> JniResult<JClass<'a>> {
        if class.is_null() {
            return Err(Error::NullPtr(what));
        }
        Ok(unsafe { JClass::from_raw(class) })
    }

    /// Primitive field accessors do not look for a pending exception on their own.
    fn check_exception(&self) -> JniResult<()> {
        if self.env.exception_check()? {
            Err(Error::JavaException)
        } else {
            Ok(())
        }
    }
}

fn primitive(kind: JavaKind) -> Option<Primitive> {
    let primitive = match kind {
        JavaKind::Object => return None,
        JavaKind::Void => Primitive::Void,
        JavaKind::Boolean => Primitive::Boolean,
        JavaKind::Byte => Primitive::Byte,
        JavaKind::Char => Primitive::Char,
        JavaKind::Short => Primitive::Short,
        JavaKind::Int => Primitive::Int,
        JavaKind::Long => Primitive::Long,
        JavaKind::Float => Primitive::Float,
        JavaKind::Double => Primitive::Double,
    };

    Some(primitive)
}

fn return_type(kind: JavaKind) -> ReturnType {
    primitive(kind).map_or(ReturnType::Object, ReturnType::Primitive)
}

fn field_type(kind: JavaKind) -> JavaType {
    primitive(kind).map_or_else(
        || JavaType::Object(OBJECT_CLASS.to_owned()),
        JavaType::Primitive,
    )
}

fn from_java_value(value: JValue<'_>) -> ForeignValue {
    match value {
        JValue::Void => ForeignValue::Void,
        JValue::Bool(z) => ForeignValue::Boolean(z),
        JValue::Byte(b) => ForeignValue::Byte(b),
        JValue::Char(c) => ForeignValue::Char(c),
        JValue::Short(s) => ForeignValue::Short(s),
        JValue::Int(i) => ForeignValue::Int(i),
        JValue::Long(j) => ForeignValue::Long(j),
        JValue::Float(f) => ForeignValue::Float(f),
        JValue::Double(d) => ForeignValue::Double(d),
        JValue::Object(l) => ForeignValue::Object(l.into_raw()),
    }
}

fn into_java_value<'b>(value: ForeignValue) -> JValue<'b> {
    match value {
        ForeignValue::Void => JValue::Void,
        ForeignValue::Boolean(z) => JValue::Bool(z),
        ForeignValue::Byte(b) => JValue::Byte(b),
        ForeignValue::Char(c) => JValue::Char(c),
        ForeignValue::Short(s) => JValue::Short(s),
        ForeignValue::Int(i) => JValue::Int(i),
        ForeignValue::Long(j) => JValue::Long(j),
        ForeignValue::Float(f) => JValue::Float(f),
        ForeignValue::Double(d) => JValue::Double(d),
        ForeignValue::Object(l) => JValue::Object(unsafe { JObject::from_raw(l) }),
    }
}

fn raw_arguments(args: &[ForeignValue]) -> Vec<jvalue> {
    args.iter().map(|a| a.to_jvalue()).collect()
}

impl<'a> ForeignEnv for JniEnv<'a> {
    type Global = GlobalRef;

    fn find_class(&self, name: &str) -> JniResult<jclass> {
        Ok(self.env.find_class(name)?.into_raw())
    }

    fn get_object_class(&self, obj: jobject) -> JniResult<jclass> {
        let obj = self.object(obj, "get_object_class obj argument")?;
        Ok(self.env.get_object_class(obj)?.into_raw())
    }

    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID> {
        let class = self.class(class, "get_method_id class argument")?;
        Ok(self.env.get_method_id(class, name, sig)?.into_raw())
    }

    fn get_static_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID> {
        let class = self.class(class, "get_static_method_id class argument")?;
        Ok(self.env.get_static_method_id(class, name, sig)?.into_raw())
    }

    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID> {
        let class = self.class(class, "get_field_id class argument")?;
        Ok(self.env.get_field_id(class, name, sig)?.into_raw())
    }

    fn get_static_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID> {
        let class = self.class(class, "get_static_field_id class argument")?;
        Ok(self.env.get_static_field_id(class, name, sig)?.into_raw())
    }

    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue> {
        let obj = self.object(obj, "call_method obj argument")?;
        let method = unsafe { JMethodID::from_raw(method) };
        let args = raw_arguments(args);

        let result = self
            .env
            .call_method_unchecked(obj, method, return_type(ret), &args)?;
        Ok(from_java_value(result))
    }

    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue> {
        let class = self.class(class, "call_static_method class argument")?;
        let method = unsafe { JStaticMethodID::from_raw(method) };
        let args = raw_arguments(args);

        let result = self
            .env
            .call_static_method_unchecked(class, method, return_type(ret), &args)?;
        Ok(from_java_value(result))
    }

    fn new_object(
        &self,
        class: jclass,
        ctor: jmethodID,
        args: &[ForeignValue],
    ) -> JniResult<jobject> {
        let class = self.class(class, "new_object class argument")?;
        let ctor = unsafe { JMethodID::from_raw(ctor) };
        let args: Vec<JValue> = args.iter().copied().map(into_java_value).collect();

        Ok(self.env.new_object_unchecked(class, ctor, &args)?.into_raw())
    }

    fn get_field(&self, obj: jobject, field: jfieldID, kind: JavaKind) -> JniResult<ForeignValue> {
        let obj = self.object(obj, "get_field obj argument")?;
        let field = unsafe { JFieldID::from_raw(field) };

        let value = self.env.get_field_unchecked(obj, field, return_type(kind))?;
        self.check_exception()?;
        Ok(from_java_value(value))
    }

    fn set_field(&self, obj: jobject, field: jfieldID, value: ForeignValue) -> JniResult<()> {
        let obj = self.object(obj, "set_field obj argument")?;
        let field = unsafe { JFieldID::from_raw(field) };

        self.env
            .set_field_unchecked(obj, field, into_java_value(value))?;
        self.check_exception()
    }

    fn get_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        kind: JavaKind,
    ) -> JniResult<ForeignValue> {
        let class = self.class(class, "get_static_field class argument")?;
        let field = unsafe { JStaticFieldID::from_raw(field) };

        let value = self
            .env
            .get_static_field_unchecked(class, field, field_type(kind))?;
        self.check_exception()?;
        Ok(from_java_value(value))
    }

    fn set_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        value: ForeignValue,
    ) -> JniResult<()> {
        let class = self.class(class, "set_static_field class argument")?;
        let field = unsafe { JStaticFieldID::from_raw(field) };

        self.env
            .set_static_field(class, field, into_java_value(value))?;
        self.check_exception()
    }

    fn new_global_ref(&self, obj: jobject) -> JniResult<GlobalRef> {
        let obj = self.object(obj, "new_global_ref obj argument")?;
        self.env.new_global_ref(obj)
    }

    fn delete_local_ref(&self, obj: jobject) {
        if let Err(err) = self.env.delete_local_ref(unsafe { JObject::from_raw(obj) }) {
            debug!("error deleting local ref: {:#?}", err);
        }
    }

    fn new_string(&self, s: &str) -> JniResult<jstring> {
        Ok(self.env.new_string(s)?.into_raw())
    }

    fn get_string(&self, s: jstring) -> JniResult<String> {
        let s = unsafe { JString::from_raw(s) };
        Ok(self.env.get_string(s)?.into())
    }

    fn exception_occurred(&self) -> JniResult<Option<jthrowable>> {
        let throwable = self.env.exception_occurred()?.into_raw();
        if throwable.is_null() {
            Ok(None)
        } else {
            Ok(Some(throwable))
        }
    }

    fn exception_clear(&self) -> JniResult<()> {
        self.env.exception_clear()
    }

    fn exception_describe(&self) -> JniResult<()> {
        self.env.exception_describe()
    }
}
