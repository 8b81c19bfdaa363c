//! The object-style layer scripts use on top of the raw bridge functions.
//!
//! A [`JavaClass`] is looked up once per bridge by name and then taught its members: methods are
//! registered with snake_case names and script type descriptors, and called by that name later.
//! Instances built through a registered constructor carry the class's instance methods.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::bridge::Bridge;
use crate::convert::{JavaKind, ReferenceKind};
use crate::env::ForeignEnv;
use crate::error::{Error, Result};
use crate::signature::{method_signature, snake_case_to_camel_case, TypeSpec};
use crate::value::Value;

const CONSTRUCTOR_NAME: &str = "<init>";

struct Registered<E: ForeignEnv> {
    method_id: Value<E>,
    argument_types: Value<E>,
    return_type: TypeSpec,
}

type Methods<E> = HashMap<String, Rc<Registered<E>>>;

struct ClassInner<E: ForeignEnv> {
    reference: Value<E>,
    name: String,
    methods: RefCell<Methods<E>>,
    static_methods: RefCell<Methods<E>>,
    constructors: RefCell<HashMap<usize, Rc<Registered<E>>>>,
}

/// A Java class and the members registered on it. Clones share the registrations.
pub struct JavaClass<E: ForeignEnv> {
    inner: Rc<ClassInner<E>>,
}

impl<E: ForeignEnv> Clone for JavaClass<E> {
    fn clone(&self) -> Self {
        JavaClass {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: ForeignEnv> JavaClass<E> {
    /// Wraps a class reference, as returned by `find_class` or `get_object_class`.
    pub fn new(reference: Value<E>) -> Result<Self> {
        let handle = reference.reference()?;
        if handle.kind() != ReferenceKind::Class {
            return Err(Error::TypeError {
                expected: "jclass reference",
                actual: handle.type_name(),
            });
        }

        // `class com.example.MyClass`, or `interface ...`
        let name = handle
            .qualifier()
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_owned();

        Ok(JavaClass {
            inner: Rc::new(ClassInner {
                reference,
                name,
                methods: RefCell::new(HashMap::new()),
                static_methods: RefCell::new(HashMap::new()),
                constructors: RefCell::new(HashMap::new()),
            }),
        })
    }

    pub fn reference(&self) -> &Value<E> {
        &self.inner.reference
    }

    /// The dotted class name, e.g. `java.lang.Integer`.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Looks up the instance method `name` (snake_case, called as camelCase in Java) and makes it
    /// available on instances built from now on.
    pub fn register_method(
        &self,
        bridge: &Bridge<E>,
        name: &str,
        argument_types: &Value<E>,
        return_type: &Value<E>,
    ) -> Result<()> {
        let method = self.resolve(name, argument_types, return_type, |java_name, sig| {
            bridge.get_method_id(&self.inner.reference, java_name, sig)
        })?;
        self.inner
            .methods
            .borrow_mut()
            .insert(name.to_owned(), Rc::new(method));
        Ok(())
    }

    pub fn register_static_method(
        &self,
        bridge: &Bridge<E>,
        name: &str,
        argument_types: &Value<E>,
        return_type: &Value<E>,
    ) -> Result<()> {
        let method = self.resolve(name, argument_types, return_type, |java_name, sig| {
            bridge.get_static_method_id(&self.inner.reference, java_name, sig)
        })?;
        self.inner
            .static_methods
            .borrow_mut()
            .insert(name.to_owned(), Rc::new(method));
        Ok(())
    }

    /// Registers a constructor. Constructors are told apart by their number of arguments.
    pub fn register_constructor(&self, bridge: &Bridge<E>, argument_types: &Value<E>) -> Result<()> {
        let arguments = TypeSpec::list_from_value(argument_types)?;
        let void = TypeSpec::Primitive(JavaKind::Void);
        let sig = method_signature(&arguments, &void);
        let method_id = bridge.get_method_id(&self.inner.reference, CONSTRUCTOR_NAME, &sig)?;
        debug!("registered constructor {}{}", self.name(), sig);

        let constructor = Registered {
            method_id,
            argument_types: argument_types.clone(),
            return_type: void,
        };
        self.inner
            .constructors
            .borrow_mut()
            .insert(arguments.len(), Rc::new(constructor));
        Ok(())
    }

    fn resolve<F>(
        &self,
        name: &str,
        argument_types: &Value<E>,
        return_type: &Value<E>,
        lookup: F,
    ) -> Result<Registered<E>>
    where
        F: FnOnce(&str, &str) -> Result<Value<E>>,
    {
        let arguments = TypeSpec::list_from_value(argument_types)?;
        let return_type = TypeSpec::from_value(return_type)?;
        let sig = method_signature(&arguments, &return_type);
        let java_name = snake_case_to_camel_case(name);

        let method_id = lookup(&java_name, &sig)?;
        debug!("registered {}.{}{} as {}", self.name(), java_name, sig, name);

        Ok(Registered {
            method_id,
            argument_types: argument_types.clone(),
            return_type,
        })
    }

    /// Calls a registered static method.
    pub fn call_static(&self, bridge: &Bridge<E>, name: &str, args: &[Value<E>]) -> Result<Returned<E>> {
        let method = self
            .inner
            .static_methods
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_method(name, self))?;

        let result = bridge.call_static_method(
            method.return_type.kind(),
            &self.inner.reference,
            &method.method_id,
            &method.argument_types,
            args,
        )?;
        Returned::new(&method.return_type, result)
    }

    /// Runs the constructor registered for `args.len()` arguments.
    pub fn build_new_instance(&self, bridge: &Bridge<E>, args: &[Value<E>]) -> Result<JavaObject<E>> {
        let constructor = self
            .inner
            .constructors
            .borrow()
            .get(&args.len())
            .cloned()
            .ok_or_else(|| {
                Error::NoSuchMethod(format!(
                    "No constructor for {:?} with {} arguments",
                    self,
                    args.len()
                ))
            })?;

        let reference = bridge.new_object(
            &self.inner.reference,
            &constructor.method_id,
            &constructor.argument_types,
            args,
        )?;

        Ok(JavaObject {
            reference,
            java_class: OnceCell::from(self.clone()),
            methods: self.inner.methods.borrow().clone(),
        })
    }
}

impl<E: ForeignEnv> fmt::Debug for JavaClass<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<JNI::JavaClass {}>", self.name())
    }
}

/// A Java object held by a script.
pub struct JavaObject<E: ForeignEnv> {
    reference: Value<E>,
    java_class: OnceCell<JavaClass<E>>,
    methods: Methods<E>,
}

impl<E: ForeignEnv> JavaObject<E> {
    /// Wraps an object reference. It has no registered methods.
    pub fn new(reference: Value<E>) -> Result<Self> {
        reference.reference()?;
        Ok(JavaObject {
            reference,
            java_class: OnceCell::new(),
            methods: HashMap::new(),
        })
    }

    pub fn reference(&self) -> &Value<E> {
        &self.reference
    }

    pub fn into_reference(self) -> Value<E> {
        self.reference
    }

    /// The runtime class of the object. Looked up on first use unless the object was built from a
    /// registered class.
    pub fn java_class(&self, bridge: &Bridge<E>) -> Result<JavaClass<E>> {
        if let Some(class) = self.java_class.get() {
            return Ok(class.clone());
        }

        let class = JavaClass::new(bridge.get_object_class(&self.reference)?)?;
        Ok(self.java_class.get_or_init(|| class).clone())
    }

    /// Calls an instance method registered on the class this object was built from.
    pub fn call(&self, bridge: &Bridge<E>, name: &str, args: &[Value<E>]) -> Result<Returned<E>> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| undefined_method(name, self))?;

        let result = bridge.call_method(
            method.return_type.kind(),
            &self.reference,
            &method.method_id,
            &method.argument_types,
            args,
        )?;
        Returned::new(&method.return_type, result)
    }

    /// `#<JNI::JavaObject qualifier>`, with the class name appended when the qualifier does not
    /// mention it.
    pub fn inspect(&self, bridge: &Bridge<E>) -> Result<String> {
        let class = self.java_class(bridge)?;
        let qualifier = self.reference.reference()?.qualifier();

        if qualifier.contains(class.name()) {
            Ok(format!("#<JNI::JavaObject {}>", qualifier))
        } else {
            Ok(format!("#<JNI::JavaObject {} ({})>", qualifier, class.name()))
        }
    }
}

impl<E: ForeignEnv> fmt::Debug for JavaObject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<JNI::JavaObject {:?}>", self.reference)
    }
}

/// What a registered method returns: a plain value, or an object when the declared return type
/// is a class.
pub enum Returned<E: ForeignEnv> {
    Value(Value<E>),
    Object(JavaObject<E>),
}

impl<E: ForeignEnv> Returned<E> {
    fn new(return_type: &TypeSpec, value: Value<E>) -> Result<Self> {
        match (return_type, value) {
            (TypeSpec::Class(_), value @ Value::Reference(_)) => {
                Ok(Returned::Object(JavaObject::new(value)?))
            }
            (_, value) => Ok(Returned::Value(value)),
        }
    }

    pub fn as_object(&self) -> Option<&JavaObject<E>> {
        match self {
            Returned::Object(object) => Some(object),
            Returned::Value(_) => None,
        }
    }

    /// The result as a script value. Objects give their reference.
    pub fn into_value(self) -> Value<E> {
        match self {
            Returned::Value(value) => value,
            Returned::Object(object) => object.into_reference(),
        }
    }
}

impl<E: ForeignEnv> fmt::Debug for Returned<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Returned::Value(value) => write!(f, "{:?}", value),
            Returned::Object(object) => write!(f, "{:?}", object),
        }
    }
}

fn undefined_method(name: &str, receiver: &dyn fmt::Debug) -> Error {
    Error::Usage(format!("undefined method '{}' for {:?}", name, receiver))
}

impl<E: ForeignEnv> Bridge<E> {
    /// The class called `name` (dots or slashes). It is looked up once; later calls with the same
    /// name return the same class and its registrations.
    pub fn java_class(&self, name: &str) -> Result<JavaClass<E>> {
        if let Some(class) = self.classes.borrow().get(name) {
            return Ok(class.clone());
        }

        let class = JavaClass::new(self.find_class(&name.replace('.', "/"))?)?;
        self.classes
            .borrow_mut()
            .insert(name.to_owned(), class.clone());
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::convert::ForeignValue;
    use crate::testing::MockEnv;

    type V = Value<MockEnv>;

    const MY_CLASS: &str = "com/example/MyClass";

    fn bridge() -> (MockEnv, Bridge<MockEnv>) {
        let env = MockEnv::new();
        env.define_class(MY_CLASS);
        let bridge = Bridge::new(env.clone(), Config::default()).unwrap();
        (env, bridge)
    }

    fn types(names: &[&str]) -> V {
        Value::Array(names.iter().map(|n| V::symbol(n)).collect())
    }

    #[test]
    fn classes_are_looked_up_once() {
        let (env, bridge) = bridge();
        let class = bridge.java_class("com.example.MyClass").unwrap();
        let again = bridge.java_class("com.example.MyClass").unwrap();

        assert_eq!(class.name(), "com.example.MyClass");
        assert_eq!(format!("{:?}", class), "#<JNI::JavaClass com.example.MyClass>");
        assert_eq!(class.reference(), again.reference());
        assert_eq!(env.live_global_refs(), 1);

        let err = bridge.java_class("com.example.Missing").err().unwrap();
        assert!(matches!(err, Error::ClassNotFound(_)));
    }

    #[test]
    fn object_references_are_not_classes() {
        let (env, bridge) = bridge();
        let obj = env.new_instance(MY_CLASS, Some("thing"));
        let obj = bridge.decode(ForeignValue::Object(obj)).unwrap();

        let err = JavaClass::new(obj).err().unwrap();
        assert_eq!(
            err.to_string(),
            "wrong argument type jobject (expected jclass reference)"
        );
    }

    #[test]
    fn static_boolean_method() {
        let (env, bridge) = bridge();
        env.define_static_method(MY_CLASS, "myMethod", "(IZ)Z", |_, _, args| {
            match (args[0], args[1]) {
                (ForeignValue::Int(1), ForeignValue::Boolean(z)) => ForeignValue::Boolean(z),
                _ => ForeignValue::Boolean(0),
            }
        });
        let class = bridge.java_class("com.example.MyClass").unwrap();

        class
            .register_static_method(
                &bridge,
                "my_method",
                &types(&["int", "boolean"]),
                &V::symbol("boolean"),
            )
            .unwrap();
        let result = class
            .call_static(&bridge, "my_method", &[V::from(1), V::from(true)])
            .unwrap();

        assert_eq!(result.into_value(), V::Bool(true));
        assert_eq!(env.invocations("myMethod"), 1);
    }

    #[test]
    fn static_string_method() {
        let (env, bridge) = bridge();
        env.define_static_method(MY_CLASS, "myMethod", "(I)Ljava/lang/String;", |env, _, _| {
            ForeignValue::Object(env.new_string("Hello, World!").unwrap())
        });
        let class = bridge.java_class("com.example.MyClass").unwrap();

        class
            .register_static_method(&bridge, "my_method", &types(&["int"]), &V::symbol("string"))
            .unwrap();
        let result = class.call_static(&bridge, "my_method", &[V::from(1)]).unwrap();

        assert!(result.as_object().is_none());
        assert_eq!(result.into_value(), V::from("Hello, World!"));
    }

    #[test]
    fn static_object_method() {
        let (env, bridge) = bridge();
        env.define_static_method(MY_CLASS, "myMethod", "(I)Ljava/lang/Integer;", |env, _, _| {
            ForeignValue::Object(env.new_instance("java/lang/Integer", Some("42")))
        });
        let class = bridge.java_class("com.example.MyClass").unwrap();

        class
            .register_static_method(
                &bridge,
                "my_method",
                &types(&["int"]),
                &V::from("java.lang.Integer"),
            )
            .unwrap();
        let result = class.call_static(&bridge, "my_method", &[V::from(1)]).unwrap();

        let object = result.as_object().unwrap();
        assert_eq!(object.reference().reference().unwrap().qualifier(), "42");
        assert_eq!(object.java_class(&bridge).unwrap().name(), "java.lang.Integer");
        assert_eq!(
            object.inspect(&bridge).unwrap(),
            "#<JNI::JavaObject 42 (java.lang.Integer)>"
        );
    }

    #[test]
    fn void_static_method_and_unknown_names() {
        let (env, bridge) = bridge();
        env.define_static_method(MY_CLASS, "reset", "()V", |_, _, _| ForeignValue::Void);
        let class = bridge.java_class("com.example.MyClass").unwrap();

        class
            .register_static_method(&bridge, "reset", &types(&[]), &V::symbol("void"))
            .unwrap();
        assert_eq!(class.call_static(&bridge, "reset", &[]).unwrap().into_value(), V::Nil);

        let err = class.call_static(&bridge, "resets", &[]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "undefined method 'resets' for #<JNI::JavaClass com.example.MyClass>"
        );

        let err = class
            .register_static_method(&bridge, "missing", &types(&[]), &V::symbol("void"))
            .err()
            .unwrap();
        assert!(matches!(err, Error::NoSuchMethod(_)));
    }

    #[test]
    fn build_new_instance_by_argument_count() {
        let (env, bridge) = bridge();
        env.define_method(MY_CLASS, "<init>", "()V", |_, _, _| ForeignValue::Void);
        env.define_method(MY_CLASS, "getCount", "()I", |_, _, _| ForeignValue::Int(7));
        let class = bridge.java_class("com.example.MyClass").unwrap();

        class.register_constructor(&bridge, &types(&[])).unwrap();
        class
            .register_method(&bridge, "get_count", &types(&[]), &V::symbol("int"))
            .unwrap();

        let instance = class.build_new_instance(&bridge, &[]).unwrap();
        assert_eq!(instance.java_class(&bridge).unwrap().name(), "com.example.MyClass");
        assert!(instance
            .inspect(&bridge)
            .unwrap()
            .starts_with("#<JNI::JavaObject com.example.MyClass@"));
        assert_eq!(
            instance.call(&bridge, "get_count", &[]).unwrap().into_value(),
            V::Integer(7)
        );

        let err = class.build_new_instance(&bridge, &[V::from(1)]).err().unwrap();
        assert!(matches!(err, Error::NoSuchMethod(_)));
        assert_eq!(
            err.to_string(),
            "No constructor for #<JNI::JavaClass com.example.MyClass> with 1 arguments"
        );
    }

    #[test]
    fn plain_objects_find_their_class() {
        let (env, bridge) = bridge();
        let obj = env.new_instance(MY_CLASS, Some("my object"));
        let object = JavaObject::new(bridge.decode(ForeignValue::Object(obj)).unwrap()).unwrap();

        let class = object.java_class(&bridge).unwrap();
        assert_eq!(class.name(), "com.example.MyClass");
        assert_eq!(
            object.inspect(&bridge).unwrap(),
            "#<JNI::JavaObject my object (com.example.MyClass)>"
        );
        assert!(matches!(
            object.call(&bridge, "get_count", &[]),
            Err(Error::Usage(_))
        ));
        assert!(matches!(
            JavaObject::new(V::from(3)),
            Err(Error::TypeError { .. })
        ));
    }
}
