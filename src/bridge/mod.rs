//! The script-visible bridge operations.
//!
//! A [`Bridge`] is created once per attached thread. It owns the environment handle, the
//! [`Config`] and the method IDs it needs for its own bookkeeping (`Class.getName`,
//! `Object.toString` and `Throwable.getMessage`). Every operation follows the same path: unwrap
//! the handles, encode the arguments, make the foreign call, translate a pending exception, decode
//! the result.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use jni::errors::Result as JniResult;
use jni::sys::{jfieldID, jmethodID, jobject};
use log::{debug, warn};
use paste::paste;

use crate::config::Config;
use crate::convert::{
    encode_arguments, encode_field_value, ForeignValue, JavaKind, Local, MemberId, MemberKind,
    Reference, ReferenceKind, OBJECT_CLASS, STRING_GETTER_SIG,
};
use crate::env::ForeignEnv;
use crate::error::{Error, Result};
use crate::value::Value;

pub use self::class::{JavaClass, JavaObject, Returned};
pub use self::function::{Arity, Function};

mod class;
mod function;

const CLASS_CLASS: &str = "java/lang/Class";
const THROWABLE_CLASS: &str = "java/lang/Throwable";

/// Method IDs resolved once when the bridge is created. They belong to bootstrap classes, which
/// are never unloaded.
struct CachedMethods {
    class_get_name: jmethodID,
    object_to_string: jmethodID,
    throwable_get_message: jmethodID,
}

pub struct Bridge<E: ForeignEnv> {
    env: E,
    config: Config,
    methods: CachedMethods,
    game_activity: Option<Value<E>>,
    classes: RefCell<HashMap<String, JavaClass<E>>>,
}

macro_rules! typed_calls {
    ($($kind:ident => $variant:ident),* $(,)?) => {
        paste! {
            $(
                #[doc = "`Call" $variant "MethodA` on `obj`."]
                pub fn [<call_ $kind _method>](
                    &self,
                    obj: &Value<E>,
                    method: &Value<E>,
                    arg_types: &Value<E>,
                    args: &[Value<E>],
                ) -> Result<Value<E>> {
                    self.call_method(JavaKind::$variant, obj, method, arg_types, args)
                }

                #[doc = "`CallStatic" $variant "MethodA` on `class`."]
                pub fn [<call_static_ $kind _method>](
                    &self,
                    class: &Value<E>,
                    method: &Value<E>,
                    arg_types: &Value<E>,
                    args: &[Value<E>],
                ) -> Result<Value<E>> {
                    self.call_static_method(JavaKind::$variant, class, method, arg_types, args)
                }
            )*
        }
    };
}

macro_rules! typed_fields {
    ($($kind:ident => $variant:ident),* $(,)?) => {
        paste! {
            $(
                pub fn [<get_ $kind _field>](&self, obj: &Value<E>, field: &Value<E>) -> Result<Value<E>> {
                    self.get_field(JavaKind::$variant, obj, field)
                }

                pub fn [<set_ $kind _field>](
                    &self,
                    obj: &Value<E>,
                    field: &Value<E>,
                    value: &Value<E>,
                ) -> Result<Value<E>> {
                    self.set_field(JavaKind::$variant, obj, field, value)
                }

                pub fn [<get_static_ $kind _field>](
                    &self,
                    class: &Value<E>,
                    field: &Value<E>,
                ) -> Result<Value<E>> {
                    self.get_static_field(JavaKind::$variant, class, field)
                }

                pub fn [<set_static_ $kind _field>](
                    &self,
                    class: &Value<E>,
                    field: &Value<E>,
                    value: &Value<E>,
                ) -> Result<Value<E>> {
                    self.set_static_field(JavaKind::$variant, class, field, value)
                }
            )*
        }
    };
}

impl<E: ForeignEnv> Bridge<E> {
    /// Resolves the bookkeeping method IDs. Fails if any of them cannot be found.
    pub fn new(env: E, config: Config) -> Result<Self> {
        let class_get_name = lookup_method(&env, CLASS_CLASS, "getName")?;
        let object_to_string = lookup_method(&env, OBJECT_CLASS, "toString")?;
        let throwable_get_message = lookup_method(&env, THROWABLE_CLASS, "getMessage")?;
        debug!("bridge ready, {} exception mapping(s)", config.exceptions().len());

        Ok(Bridge {
            env,
            config,
            methods: CachedMethods {
                class_get_name,
                object_to_string,
                throwable_get_message,
            },
            game_activity: None,
            classes: RefCell::new(HashMap::new()),
        })
    }

    /// Wraps the host activity once, so scripts can reach it through [`Bridge::game_activity`].
    /// `activity` is borrowed: only the new global reference is owned by the bridge.
    pub fn with_activity(mut self, activity: jobject) -> Result<Self> {
        let activity = self.wrap_borrowed(activity, ReferenceKind::Object)?;
        self.game_activity = Some(activity);
        Ok(self)
    }

    /// The wrapped host activity, or nil if the bridge was created without one.
    pub fn game_activity(&self) -> Value<E> {
        self.game_activity.clone().unwrap_or(Value::Nil)
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clears a pending Java exception and returns it as an error. Does nothing when no exception
    /// is pending.
    pub fn check_exception(&self) -> Result<()> {
        let throwable = match self.env.exception_occurred()? {
            Some(throwable) => Local::new(&self.env, throwable),
            None => return Ok(()),
        };

        if self.config.describe_exceptions() {
            self.env.exception_describe()?;
        }
        self.env.exception_clear()?;

        let class_name = self.class_name_of(throwable.as_obj())?;
        let message = self
            .string_getter(throwable.as_obj(), self.methods.throwable_get_message)?
            .unwrap_or_default();
        warn!("java exception {}: {}", class_name, message);

        Err(self.config.exceptions().translate(class_name, message))
    }

    /// Translates a failed foreign call. A thrown exception is cleared and mapped through the
    /// exception table; other failures are passed through.
    fn check<T>(&self, result: JniResult<T>) -> Result<T> {
        match result {
            Err(jni::errors::Error::JavaException) => {
                self.check_exception()?;
                Err(jni::errors::Error::JavaException.into())
            }
            other => Ok(other?),
        }
    }

    /// Calls a no-argument method returning a `String` and reads the result. Null gives `None`.
    fn string_getter(&self, obj: jobject, method: jmethodID) -> Result<Option<String>> {
        let result = self.env.call_method(obj, method, JavaKind::Object, &[]);
        match self.check(result)? {
            ForeignValue::Object(s) => {
                let s = Local::new(&self.env, s);
                if s.is_null() {
                    Ok(None)
                } else {
                    Ok(Some(self.env.get_string(s.as_obj())?))
                }
            }
            other => Err(jni::errors::Error::WrongJValueType(other.kind().name(), "object").into()),
        }
    }

    /// `obj.getClass().getName()`, e.g. `java.lang.String`.
    pub(crate) fn class_name_of(&self, obj: jobject) -> Result<String> {
        let class = Local::new(&self.env, self.check(self.env.get_object_class(obj))?);
        Ok(self
            .string_getter(class.as_obj(), self.methods.class_get_name)?
            .unwrap_or_default())
    }

    /// Turns a call-scoped local reference into a script handle. The qualifier is taken before
    /// promotion, so a throwing `toString()` leaves no global reference behind. Null gives nil.
    pub(crate) fn wrap(&self, local: Local<'_, E>, kind: ReferenceKind) -> Result<Value<E>> {
        self.wrap_borrowed(local.as_obj(), kind)
    }

    fn wrap_borrowed(&self, obj: jobject, kind: ReferenceKind) -> Result<Value<E>> {
        if obj.is_null() {
            return Ok(Value::Nil);
        }

        let qualifier = self
            .string_getter(obj, self.methods.object_to_string)?
            .unwrap_or_else(|| "null".to_owned());
        let reference = Reference::promote(&self.env, obj, kind, qualifier)?;
        Ok(Value::Reference(Rc::new(reference)))
    }

    /// Returns the raw reference held by a script handle.
    pub fn unwrap(&self, value: &Value<E>) -> Result<jobject> {
        Ok(value.reference()?.as_raw())
    }

    /// Finds a class by its slash-separated name, e.g. `java/lang/String`.
    pub fn find_class(&self, name: &str) -> Result<Value<E>> {
        let class = Local::new(&self.env, self.check(self.env.find_class(name))?);
        self.wrap(class, ReferenceKind::Class)
    }

    pub fn get_object_class(&self, obj: &Value<E>) -> Result<Value<E>> {
        let obj = obj.reference()?;
        let class = Local::new(&self.env, self.check(self.env.get_object_class(obj.as_raw()))?);
        self.wrap(class, ReferenceKind::Class)
    }

    pub fn get_method_id(&self, class: &Value<E>, name: &str, sig: &str) -> Result<Value<E>> {
        let class = class.reference()?;
        let id = self.check(self.env.get_method_id(class.as_raw(), name, sig))?;
        let qualifier = format!("{} {}{}", class.qualifier(), name, sig);
        Ok(Value::Member(MemberId::method(id, false, qualifier)))
    }

    pub fn get_static_method_id(&self, class: &Value<E>, name: &str, sig: &str) -> Result<Value<E>> {
        let class = class.reference()?;
        let id = self.check(self.env.get_static_method_id(class.as_raw(), name, sig))?;
        let qualifier = format!("{} static {}{}", class.qualifier(), name, sig);
        Ok(Value::Member(MemberId::method(id, true, qualifier)))
    }

    pub fn get_field_id(&self, class: &Value<E>, name: &str, sig: &str) -> Result<Value<E>> {
        let class = class.reference()?;
        let id = self.check(self.env.get_field_id(class.as_raw(), name, sig))?;
        let qualifier = format!("{} {}", class.qualifier(), name);
        Ok(Value::Member(MemberId::field(id, false, qualifier)))
    }

    pub fn get_static_field_id(&self, class: &Value<E>, name: &str, sig: &str) -> Result<Value<E>> {
        let class = class.reference()?;
        let id = self.check(self.env.get_static_field_id(class.as_raw(), name, sig))?;
        let qualifier = format!("{} static {}", class.qualifier(), name);
        Ok(Value::Member(MemberId::field(id, true, qualifier)))
    }

    /// Calls an instance method and decodes its result as `ret`.
    pub fn call_method(
        &self,
        ret: JavaKind,
        obj: &Value<E>,
        method: &Value<E>,
        arg_types: &Value<E>,
        args: &[Value<E>],
    ) -> Result<Value<E>> {
        let obj = obj.reference()?;
        let method_id = method_id(method, MemberKind::Method)?;
        debug!("call_{}_method {}", ret, method_qualifier(method));

        let encoded = encode_arguments(&self.env, arg_types, args)?;
        let result = self
            .env
            .call_method(obj.as_raw(), method_id, ret, encoded.as_slice());
        drop(encoded);

        let result = self.check(result)?;
        self.decode(result)
    }

    /// Calls a static method and decodes its result as `ret`.
    pub fn call_static_method(
        &self,
        ret: JavaKind,
        class: &Value<E>,
        method: &Value<E>,
        arg_types: &Value<E>,
        args: &[Value<E>],
    ) -> Result<Value<E>> {
        let class = class.reference()?;
        let method_id = method_id(method, MemberKind::StaticMethod)?;
        debug!("call_static_{}_method {}", ret, method_qualifier(method));

        let encoded = encode_arguments(&self.env, arg_types, args)?;
        let result = self
            .env
            .call_static_method(class.as_raw(), method_id, ret, encoded.as_slice());
        drop(encoded);

        let result = self.check(result)?;
        self.decode(result)
    }

    /// Runs the constructor `ctor` (an instance method ID of `<init>`). The new object is always
    /// returned as a handle, strings included.
    pub fn new_object(
        &self,
        class: &Value<E>,
        ctor: &Value<E>,
        arg_types: &Value<E>,
        args: &[Value<E>],
    ) -> Result<Value<E>> {
        let class = class.reference()?;
        let ctor_id = method_id(ctor, MemberKind::Method)?;
        debug!("new_object {}", method_qualifier(ctor));

        let encoded = encode_arguments(&self.env, arg_types, args)?;
        let result = self
            .env
            .new_object(class.as_raw(), ctor_id, encoded.as_slice());
        drop(encoded);

        let obj = Local::new(&self.env, self.check(result)?);
        self.wrap(obj, ReferenceKind::Object)
    }

    pub fn get_field(&self, kind: JavaKind, obj: &Value<E>, field: &Value<E>) -> Result<Value<E>> {
        let obj = obj.reference()?;
        let field_id = field_id(field, MemberKind::Field)?;

        let result = self.env.get_field(obj.as_raw(), field_id, kind);
        let result = self.check(result)?;
        self.decode(result)
    }

    /// Stores `value` in an instance field. Returns nil.
    pub fn set_field(
        &self,
        kind: JavaKind,
        obj: &Value<E>,
        field: &Value<E>,
        value: &Value<E>,
    ) -> Result<Value<E>> {
        let obj = obj.reference()?;
        let field_id = field_id(field, MemberKind::Field)?;

        let encoded = encode_field_value(&self.env, kind, value)?;
        let result = self
            .env
            .set_field(obj.as_raw(), field_id, encoded.as_slice()[0]);
        drop(encoded);

        self.check(result)?;
        Ok(Value::Nil)
    }

    pub fn get_static_field(
        &self,
        kind: JavaKind,
        class: &Value<E>,
        field: &Value<E>,
    ) -> Result<Value<E>> {
        let class = class.reference()?;
        let field_id = field_id(field, MemberKind::StaticField)?;

        let result = self.env.get_static_field(class.as_raw(), field_id, kind);
        let result = self.check(result)?;
        self.decode(result)
    }

    /// Stores `value` in a static field. Returns nil.
    pub fn set_static_field(
        &self,
        kind: JavaKind,
        class: &Value<E>,
        field: &Value<E>,
        value: &Value<E>,
    ) -> Result<Value<E>> {
        let class = class.reference()?;
        let field_id = field_id(field, MemberKind::StaticField)?;

        let encoded = encode_field_value(&self.env, kind, value)?;
        let result = self
            .env
            .set_static_field(class.as_raw(), field_id, encoded.as_slice()[0]);
        drop(encoded);

        self.check(result)?;
        Ok(Value::Nil)
    }

    typed_calls! {
        void => Void,
        boolean => Boolean,
        byte => Byte,
        char => Char,
        short => Short,
        int => Int,
        long => Long,
        float => Float,
        double => Double,
        object => Object,
    }

    typed_fields! {
        boolean => Boolean,
        byte => Byte,
        char => Char,
        short => Short,
        int => Int,
        long => Long,
        float => Float,
        double => Double,
        object => Object,
    }
}

fn lookup_method<E: ForeignEnv>(env: &E, class: &str, name: &str) -> Result<jmethodID> {
    let class = Local::new(env, env.find_class(class)?);
    Ok(env.get_method_id(class.as_obj(), name, STRING_GETTER_SIG)?)
}

fn method_id<E: ForeignEnv>(value: &Value<E>, kind: MemberKind) -> Result<jmethodID> {
    let member = value.member(kind)?;
    member.as_method(kind.is_static()).ok_or(Error::TypeError {
        expected: kind.description(),
        actual: member.type_name(),
    })
}

fn field_id<E: ForeignEnv>(value: &Value<E>, kind: MemberKind) -> Result<jfieldID> {
    let member = value.member(kind)?;
    member.as_field(kind.is_static()).ok_or(Error::TypeError {
        expected: kind.description(),
        actual: member.type_name(),
    })
}

fn method_qualifier<E: ForeignEnv>(value: &Value<E>) -> &str {
    value.as_member().map_or("?", MemberId::qualifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::{ExceptionKind, NO_CLASS_DEF_FOUND_ERROR, NO_SUCH_FIELD_ERROR};
    use crate::testing::MockEnv;

    type V = Value<MockEnv>;

    fn bridge() -> (MockEnv, Bridge<MockEnv>) {
        let env = MockEnv::new();
        let bridge = Bridge::new(env.clone(), Config::default()).unwrap();
        (env, bridge)
    }

    fn types(names: &[&str]) -> V {
        Value::Array(names.iter().map(|n| V::symbol(n)).collect())
    }

    fn counter_class(env: &MockEnv) {
        env.define_class("com/example/Counter");
        env.define_field("com/example/Counter", "count", "I");
        env.define_field("com/example/Counter", "label", "Ljava/lang/String;");
        env.define_static_field(
            "com/example/Counter",
            "instances",
            "J",
            ForeignValue::Long(2),
        );
        env.define_method("com/example/Counter", "add", "(IZ)I", |_, _, args| {
            match (args[0], args[1]) {
                (ForeignValue::Int(n), ForeignValue::Boolean(twice)) => {
                    ForeignValue::Int(if twice != 0 { 2 * n } else { n })
                }
                _ => ForeignValue::Int(-1),
            }
        });
        env.define_method("com/example/Counter", "self", "()Lcom/example/Counter;", |_, this, _| {
            ForeignValue::Object(this)
        });
        env.define_static_method(
            "com/example/Counter",
            "fail",
            "(Ljava/lang/String;)V",
            |env, _, args| {
                let message = match args[0] {
                    ForeignValue::Object(s) => env.get_string(s).unwrap(),
                    _ => String::new(),
                };
                env.throw_new("java.lang.IllegalStateException", Some(&message));
                ForeignValue::Void
            },
        );
    }

    #[test]
    fn find_class_qualifier() {
        let (env, bridge) = bridge();
        let class = bridge.find_class("java/lang/String").unwrap();
        let reference = class.reference().unwrap();

        assert_eq!(reference.qualifier(), "class java.lang.String");
        assert_eq!(reference.type_name(), "jclass");
        assert_eq!(
            format!("{:?}", reference),
            "#<JNI::FFI::Reference jclass class java.lang.String>"
        );
        assert_eq!(env.live_global_refs(), 1);
        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn missing_class_is_class_not_found() {
        let (env, bridge) = bridge();
        let err = bridge.find_class("nonexistent/Class").err().unwrap();

        assert!(matches!(err, Error::ClassNotFound(ref m) if m == "nonexistent/Class"));
        assert!(!env.exception_pending());
        assert_eq!(env.live_local_refs(), 0);
        assert_eq!(env.live_global_refs(), 0);
    }

    #[test]
    fn find_class_failure_is_no_class_def_found_error() {
        let env = MockEnv::new();
        let config = Config::default().without_exception(NO_CLASS_DEF_FOUND_ERROR);
        let bridge = Bridge::new(env.clone(), config).unwrap();

        let err = bridge.find_class("nonexistent/Class").err().unwrap();
        assert_eq!(
            err.to_string(),
            "nonexistent/Class (java.lang.NoClassDefFoundError)"
        );
        assert!(!env.exception_pending());
    }

    #[test]
    fn lookups_and_qualifiers() {
        let (_, bridge) = bridge();
        let string = bridge.find_class("java/lang/String").unwrap();

        let value_of = bridge
            .get_static_method_id(&string, "valueOf", "(I)Ljava/lang/String;")
            .unwrap();
        assert_eq!(
            value_of.as_member().unwrap().qualifier(),
            "class java.lang.String static valueOf(I)Ljava/lang/String;"
        );

        let length = bridge.get_method_id(&string, "length", "()I").unwrap();
        assert_eq!(
            format!("{:?}", length),
            "#<JNI::FFI::Pointer jmethodID class java.lang.String length()I>"
        );

        let err = bridge
            .get_static_method_id(&string, "nonExistentMethod", "()V")
            .err()
            .unwrap();
        assert!(matches!(err, Error::NoSuchMethod(_)));
        assert_eq!(err.script_class(), "NoSuchMethod");
    }

    #[test]
    fn field_lookups() {
        let (env, bridge) = bridge();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();

        let count = bridge.get_field_id(&class, "count", "I").unwrap();
        assert_eq!(
            count.as_member().unwrap().qualifier(),
            "class com.example.Counter count"
        );
        let instances = bridge.get_static_field_id(&class, "instances", "J").unwrap();
        assert_eq!(
            format!("{:?}", instances),
            "#<JNI::FFI::Pointer jfieldID class com.example.Counter static instances>"
        );

        let err = bridge.get_field_id(&class, "missing", "I").err().unwrap();
        assert!(matches!(err, Error::NoSuchField(_)));
    }

    #[test]
    fn static_object_call_returns_string() {
        let (env, bridge) = bridge();
        let string = bridge.find_class("java/lang/String").unwrap();
        let value_of = bridge
            .get_static_method_id(&string, "valueOf", "(I)Ljava/lang/String;")
            .unwrap();

        let result = bridge
            .call_static_object_method(&string, &value_of, &types(&["int"]), &[V::from(42)])
            .unwrap();
        assert_eq!(result, V::from("42"));
        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn instance_calls() {
        let (env, bridge) = bridge();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();
        let obj = env.new_instance("com/example/Counter", Some("Counter#1"));
        let counter = bridge.decode(ForeignValue::Object(obj)).unwrap();

        let add = bridge.get_method_id(&class, "add", "(IZ)I").unwrap();
        let result = bridge
            .call_int_method(
                &counter,
                &add,
                &types(&["int", "boolean"]),
                &[V::from(21), V::from(true)],
            )
            .unwrap();
        assert_eq!(result, V::Integer(42));

        let this = bridge
            .get_method_id(&class, "self", "()Lcom/example/Counter;")
            .unwrap();
        let same = bridge
            .call_object_method(&counter, &this, &types(&[]), &[])
            .unwrap();
        let (a, b) = (same.reference().unwrap(), counter.reference().unwrap());
        assert!(!Rc::ptr_eq(a, b));
        assert!(env.is_same_object(a.as_raw(), b.as_raw()));
        assert_eq!(a.qualifier(), "Counter#1");
    }

    #[test]
    fn wrong_argument_makes_no_call() {
        let (env, bridge) = bridge();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();
        let obj = env.new_instance("com/example/Counter", None);
        let counter = bridge.decode(ForeignValue::Object(obj)).unwrap();
        let add = bridge.get_method_id(&class, "add", "(IZ)I").unwrap();

        let err = bridge
            .call_int_method(
                &counter,
                &add,
                &types(&["int", "boolean"]),
                &[V::from(1), V::from(1)],
            )
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 2: Expected boolean argument");
        assert_eq!(env.invocations("add"), 0);

        let err = bridge
            .call_int_method(&counter, &add, &types(&["int"]), &[V::from(1), V::from(true)])
            .err()
            .unwrap();
        assert!(matches!(err, Error::Usage(_)));
        assert_eq!(env.invocations("add"), 0);
    }

    #[test]
    fn member_kind_is_checked() {
        let (env, bridge) = bridge();
        let string = bridge.find_class("java/lang/String").unwrap();
        let value_of = bridge
            .get_static_method_id(&string, "valueOf", "(I)Ljava/lang/String;")
            .unwrap();
        let s = bridge
            .new_object(
                &string,
                &bridge.get_method_id(&string, "<init>", "()V").unwrap(),
                &types(&[]),
                &[],
            )
            .unwrap();

        let err = bridge
            .call_object_method(&s, &value_of, &types(&["int"]), &[V::from(1)])
            .err()
            .unwrap();
        assert!(matches!(err, Error::TypeError { .. }));
        assert_eq!(env.invocations("valueOf"), 0);

        let err = bridge
            .call_static_int_method(&V::from("x"), &value_of, &types(&[]), &[])
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "wrong argument type String (expected JNI::FFI::Reference)"
        );
    }

    #[test]
    fn new_object_always_returns_a_reference() {
        let (env, bridge) = bridge();
        let string = bridge.find_class("java/lang/String").unwrap();
        let ctor = bridge
            .get_method_id(&string, "<init>", "(Ljava/lang/String;)V")
            .unwrap();

        let copy = bridge
            .new_object(&string, &ctor, &types(&["string"]), &[V::from("Hello String")])
            .unwrap();
        let reference = copy.reference().unwrap();
        assert_eq!(reference.qualifier(), "Hello String");
        assert_eq!(reference.type_name(), "jobject");

        let class = bridge.get_object_class(&copy).unwrap();
        assert_eq!(
            class.reference().unwrap().qualifier(),
            "class java.lang.String"
        );
        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn java_exceptions_are_translated_and_cleared() {
        let (env, bridge) = bridge();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();
        let fail = bridge
            .get_static_method_id(&class, "fail", "(Ljava/lang/String;)V")
            .unwrap();

        let err = bridge
            .call_static_void_method(&class, &fail, &types(&["string"]), &[V::from("bad state")])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "bad state (java.lang.IllegalStateException)");
        assert_eq!(err.script_class(), "JavaException");
        assert!(!env.exception_pending());
        assert_eq!(env.live_local_refs(), 0);
        assert_eq!(env.describe_count(), 0);
    }

    #[test]
    fn null_message_is_empty() {
        let (env, bridge) = bridge();
        env.throw_new("java.lang.NullPointerException", None);

        let err = bridge.check_exception().err().unwrap();
        assert_eq!(err.to_string(), " (java.lang.NullPointerException)");
        assert!(bridge.check_exception().is_ok());
    }

    #[test]
    fn exception_table_is_configurable() {
        let env = MockEnv::new();
        let config = Config::default()
            .without_exception(NO_SUCH_FIELD_ERROR)
            .with_exception("java.lang.IllegalStateException", ExceptionKind::NoSuchMethod)
            .with_describe_exceptions(true);
        let bridge = Bridge::new(env.clone(), config).unwrap();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();

        let err = bridge.get_field_id(&class, "missing", "I").err().unwrap();
        assert!(matches!(
            err,
            Error::JavaException { ref class_name, .. } if class_name == NO_SUCH_FIELD_ERROR
        ));

        env.throw_new("java.lang.IllegalStateException", Some("x"));
        assert!(matches!(bridge.check_exception(), Err(Error::NoSuchMethod(_))));
        assert_eq!(env.describe_count(), 2);
    }

    #[test]
    fn throwing_to_string_leaves_no_global() {
        let (env, bridge) = bridge();
        env.define_class("com/example/Grumpy");
        env.define_method("com/example/Grumpy", "toString", STRING_GETTER_SIG, |env, _, _| {
            env.throw_new("java.lang.UnsupportedOperationException", Some("no"));
            ForeignValue::null()
        });
        env.define_static_method(
            "com/example/Grumpy",
            "create",
            "()Lcom/example/Grumpy;",
            |env, _, _| ForeignValue::Object(env.new_instance("com/example/Grumpy", None)),
        );
        let class = bridge.find_class("com/example/Grumpy").unwrap();
        let create = bridge
            .get_static_method_id(&class, "create", "()Lcom/example/Grumpy;")
            .unwrap();

        let globals = env.live_global_refs();
        let err = bridge
            .call_static_object_method(&class, &create, &types(&[]), &[])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "no (java.lang.UnsupportedOperationException)");
        assert_eq!(env.live_global_refs(), globals);
        assert_eq!(env.live_local_refs(), 0);
    }

    #[test]
    fn fields() {
        let (env, bridge) = bridge();
        counter_class(&env);
        let class = bridge.find_class("com/example/Counter").unwrap();
        let obj = env.new_instance("com/example/Counter", None);
        let counter = bridge.decode(ForeignValue::Object(obj)).unwrap();

        let count = bridge.get_field_id(&class, "count", "I").unwrap();
        assert_eq!(bridge.get_int_field(&counter, &count).unwrap(), V::Integer(0));
        assert_eq!(
            bridge.set_int_field(&counter, &count, &V::from(5)).unwrap(),
            V::Nil
        );
        assert_eq!(bridge.get_int_field(&counter, &count).unwrap(), V::Integer(5));

        let label = bridge
            .get_field_id(&class, "label", "Ljava/lang/String;")
            .unwrap();
        assert_eq!(bridge.get_object_field(&counter, &label).unwrap(), V::Nil);
        bridge
            .set_object_field(&counter, &label, &V::from("hits"))
            .unwrap();
        assert_eq!(
            bridge.get_object_field(&counter, &label).unwrap(),
            V::from("hits")
        );

        let err = bridge
            .set_int_field(&counter, &count, &V::from("5"))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Argument 1: Expected int argument");

        let instances = bridge.get_static_field_id(&class, "instances", "J").unwrap();
        assert_eq!(
            bridge.get_static_long_field(&class, &instances).unwrap(),
            V::Integer(2)
        );
        bridge
            .set_static_long_field(&class, &instances, &V::from(3))
            .unwrap();
        assert_eq!(
            bridge.get_static_long_field(&class, &instances).unwrap(),
            V::Integer(3)
        );

        let err = bridge.get_int_field(&counter, &instances).err().unwrap();
        assert!(matches!(err, Error::TypeError { .. }));
    }

    #[test]
    fn game_activity() {
        let env = MockEnv::new();
        let activity = env.new_instance("com/example/MainActivity", Some("MainActivity"));
        let bridge = Bridge::new(env.clone(), Config::default())
            .unwrap()
            .with_activity(activity)
            .unwrap();

        let wrapped = bridge.game_activity();
        assert_eq!(wrapped.reference().unwrap().qualifier(), "MainActivity");
        assert!(env.is_same_object(bridge.unwrap(&wrapped).unwrap(), activity));
        assert!(env.is_global(bridge.unwrap(&wrapped).unwrap()));

        let without = Bridge::new(env, Config::default()).unwrap();
        assert_eq!(without.game_activity(), V::Nil);
    }

    #[test]
    fn handles_are_released_once() {
        let (env, bridge) = bridge();
        let class = bridge.find_class("java/lang/String").unwrap();
        let copy = class.clone();
        assert_eq!(env.live_global_refs(), 1);

        drop(class);
        assert_eq!(env.deleted_global_refs(), 0);
        drop(copy);
        assert_eq!(env.deleted_global_refs(), 1);
        assert_eq!(env.live_global_refs(), 0);
    }
}
