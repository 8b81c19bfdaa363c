//! An in-memory [`ForeignEnv`] for unit tests.
//!
//! [`MockEnv`] models just enough of a JVM for the bridge: classes with a superclass chain,
//! strings, plain instances and throwables, method and field IDs, local and global references and
//! one pending exception. Every reference is a distinct handle, so using a deleted reference or
//! deleting a global reference twice panics instead of passing silently.
//!
//! `java.lang.Object.toString`, `java.lang.Class.getName` and `java.lang.Throwable.getMessage` are
//! predefined; other methods are defined by tests with a closure body.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use jni::errors::{Error, Result as JniResult};
use jni::sys::{jclass, jfieldID, jmethodID, jobject, jstring, jthrowable};

use crate::convert::{ForeignValue, JavaKind};
use crate::env::{ForeignEnv, GlobalHandle};
use crate::exception::{NO_CLASS_DEF_FOUND_ERROR, NO_SUCH_FIELD_ERROR, NO_SUCH_METHOD_ERROR};

/// Body of a mocked method: receives the environment, `this` (the class for static methods) and
/// the arguments. A body throws by calling [`MockEnv::throw_new`]; its return value is then ignored.
pub type MethodBody = Rc<dyn Fn(&MockEnv, jobject, &[ForeignValue]) -> ForeignValue>;

const OBJECT: &str = "java/lang/Object";
const CLASS: &str = "java/lang/Class";
const STRING: &str = "java/lang/String";
const THROWABLE: &str = "java/lang/Throwable";

enum Object {
    Class {
        name: String,
        superclass: Option<usize>,
    },
    Str(String),
    Instance {
        class: usize,
        to_string: Option<String>,
        message: Option<String>,
        fields: HashMap<usize, ForeignValue>,
    },
}

struct Handle {
    object: usize,
    global: bool,
}

struct Member {
    class: usize,
    name: String,
    sig: String,
    is_static: bool,
    is_field: bool,
    body: Option<MethodBody>,
    static_value: ForeignValue,
}

#[derive(Default)]
struct State {
    next_id: usize,
    objects: HashMap<usize, Object>,
    handles: HashMap<usize, Handle>,
    classes: HashMap<String, usize>,
    members: HashMap<usize, Member>,
    pending: Option<usize>,
    foreign_calls: usize,
    invocations: HashMap<String, usize>,
    created_strings: usize,
    deleted_locals: usize,
    deleted_globals: usize,
    describes: usize,
}

impl State {
    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    fn object_of(&self, raw: jobject) -> usize {
        assert!(!raw.is_null(), "null reference used");
        match self.handles.get(&(raw as usize)) {
            Some(handle) => handle.object,
            None => panic!("use of deleted or unknown reference {:?}", raw),
        }
    }

    fn new_handle(&mut self, object: usize, global: bool) -> jobject {
        let id = self.next();
        self.handles.insert(id, Handle { object, global });
        id as jobject
    }

    fn new_object(&mut self, object: Object) -> usize {
        let id = self.next();
        self.objects.insert(id, object);
        id
    }

    fn class_name(&self, class: usize) -> String {
        match self.objects.get(&class) {
            Some(Object::Class { name, .. }) => name.replace('/', "."),
            _ => panic!("object {} is not a class", class),
        }
    }

    fn class_of(&self, object: usize) -> usize {
        match &self.objects[&object] {
            Object::Class { .. } => self.classes[CLASS],
            Object::Str(_) => self.classes[STRING],
            Object::Instance { class, .. } => *class,
        }
    }

    fn superclass(&self, class: usize) -> Option<usize> {
        match self.objects.get(&class) {
            Some(Object::Class { superclass, .. }) => *superclass,
            _ => None,
        }
    }

    fn define_class(&mut self, name: &str, superclass: Option<&str>) -> usize {
        if let Some(id) = self.classes.get(name) {
            return *id;
        }
        let superclass = superclass.map(|s| self.define_class(s, Some(OBJECT)));
        let superclass = if name == OBJECT { None } else { superclass };
        let id = self.new_object(Object::Class {
            name: name.to_owned(),
            superclass,
        });
        self.classes.insert(name.to_owned(), id);
        id
    }

    fn find_member(
        &self,
        class: usize,
        name: &str,
        sig: &str,
        is_static: bool,
        is_field: bool,
    ) -> Option<usize> {
        let mut current = Some(class);
        while let Some(class) = current {
            let found = self.members.iter().find(|(_, m)| {
                m.class == class
                    && m.name == name
                    && m.sig == sig
                    && m.is_static == is_static
                    && m.is_field == is_field
            });
            if let Some((id, _)) = found {
                return Some(*id);
            }
            if name == "<init>" {
                return None;
            }
            current = self.superclass(class);
        }
        None
    }

    fn add_member(
        &mut self,
        class: usize,
        name: &str,
        sig: &str,
        is_static: bool,
        is_field: bool,
        body: Option<MethodBody>,
    ) -> usize {
        let id = self.next();
        let static_value = zero_value(field_kind(sig));
        self.members.insert(
            id,
            Member {
                class,
                name: name.to_owned(),
                sig: sig.to_owned(),
                is_static,
                is_field,
                body,
                static_value,
            },
        );
        id
    }
}

fn field_kind(sig: &str) -> JavaKind {
    let ty = match sig.rfind(')') {
        Some(i) => &sig[i + 1..],
        None => sig,
    };
    match ty.chars().next() {
        Some('Z') => JavaKind::Boolean,
        Some('B') => JavaKind::Byte,
        Some('C') => JavaKind::Char,
        Some('S') => JavaKind::Short,
        Some('I') => JavaKind::Int,
        Some('J') => JavaKind::Long,
        Some('F') => JavaKind::Float,
        Some('D') => JavaKind::Double,
        Some('V') => JavaKind::Void,
        _ => JavaKind::Object,
    }
}

/// Field storage keeps objects, not references: object values are stored as object ids.
fn store(st: &State, value: ForeignValue) -> ForeignValue {
    match value {
        ForeignValue::Object(obj) if !obj.is_null() => {
            ForeignValue::Object(st.object_of(obj) as jobject)
        }
        other => other,
    }
}

fn load(st: &mut State, value: ForeignValue) -> ForeignValue {
    match value {
        ForeignValue::Object(object) if !object.is_null() => {
            ForeignValue::Object(st.new_handle(object as usize, false))
        }
        other => other,
    }
}

fn zero_value(kind: JavaKind) -> ForeignValue {
    match kind {
        JavaKind::Void => ForeignValue::Void,
        JavaKind::Boolean => ForeignValue::Boolean(0),
        JavaKind::Byte => ForeignValue::Byte(0),
        JavaKind::Char => ForeignValue::Char(0),
        JavaKind::Short => ForeignValue::Short(0),
        JavaKind::Int => ForeignValue::Int(0),
        JavaKind::Long => ForeignValue::Long(0),
        JavaKind::Float => ForeignValue::Float(0.0),
        JavaKind::Double => ForeignValue::Double(0.0),
        JavaKind::Object => ForeignValue::null(),
    }
}

/// In-memory JVM stand-in. Clones share the same state.
#[derive(Clone)]
pub struct MockEnv {
    state: Rc<RefCell<State>>,
}

/// A global reference of a [`MockEnv`], deleted on drop.
pub struct MockGlobal {
    env: MockEnv,
    raw: jobject,
}

impl GlobalHandle for MockGlobal {
    fn as_raw(&self) -> jobject {
        self.raw
    }
}

impl Drop for MockGlobal {
    fn drop(&mut self) {
        self.env.delete_global_ref(self.raw);
    }
}

impl Default for MockEnv {
    fn default() -> Self {
        MockEnv::new()
    }
}

impl MockEnv {
    pub fn new() -> Self {
        let env = MockEnv {
            state: Rc::new(RefCell::new(State::default())),
        };

        {
            let mut st = env.state.borrow_mut();
            st.define_class(OBJECT, None);
            st.define_class(CLASS, Some(OBJECT));
            st.define_class(STRING, Some(OBJECT));
            st.define_class(THROWABLE, Some(OBJECT));
        }

        env.define_method(OBJECT, "toString", "()Ljava/lang/String;", |env, this, _| {
            let text = env.describe(this);
            ForeignValue::Object(env.new_local_string(&text))
        });
        env.define_method(CLASS, "getName", "()Ljava/lang/String;", |env, this, _| {
            let name = {
                let st = env.state.borrow();
                let class = st.object_of(this);
                st.class_name(class)
            };
            ForeignValue::Object(env.new_local_string(&name))
        });
        env.define_method(THROWABLE, "getMessage", "()Ljava/lang/String;", |env, this, _| {
            let message = {
                let st = env.state.borrow();
                match &st.objects[&st.object_of(this)] {
                    Object::Instance { message, .. } => message.clone(),
                    _ => None,
                }
            };
            match message {
                Some(m) => ForeignValue::Object(env.new_local_string(&m)),
                None => ForeignValue::null(),
            }
        });
        env.define_method(STRING, "<init>", "()V", |env, _, _| {
            ForeignValue::Object(env.new_local_string(""))
        });
        env.define_method(STRING, "<init>", "(Ljava/lang/String;)V", |env, _, args| {
            let text = match args.first() {
                Some(ForeignValue::Object(s)) => env.get_string(*s).unwrap_or_default(),
                _ => String::new(),
            };
            ForeignValue::Object(env.new_local_string(&text))
        });
        env.define_method(STRING, "length", "()I", |env, this, _| {
            ForeignValue::Int(env.get_string(this).map(|s| s.len() as i32).unwrap_or(0))
        });
        env.define_static_method(
            STRING,
            "valueOf",
            "(I)Ljava/lang/String;",
            |env, _, args| match args.first() {
                Some(ForeignValue::Int(i)) => {
                    ForeignValue::Object(env.new_local_string(&i.to_string()))
                }
                _ => ForeignValue::null(),
            },
        );

        env
    }

    /// Defines a class extending `java.lang.Object`. Names use slashes, e.g. `com/example/Foo`.
    pub fn define_class(&self, name: &str) {
        self.state.borrow_mut().define_class(name, Some(OBJECT));
    }

    pub fn define_class_extending(&self, name: &str, superclass: &str) {
        self.state.borrow_mut().define_class(name, Some(superclass));
    }

    pub fn define_method<F>(&self, class: &str, name: &str, sig: &str, body: F)
    where
        F: Fn(&MockEnv, jobject, &[ForeignValue]) -> ForeignValue + 'static,
    {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(class, Some(OBJECT));
        st.add_member(class, name, sig, false, false, Some(Rc::new(body)));
    }

    pub fn define_static_method<F>(&self, class: &str, name: &str, sig: &str, body: F)
    where
        F: Fn(&MockEnv, jobject, &[ForeignValue]) -> ForeignValue + 'static,
    {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(class, Some(OBJECT));
        st.add_member(class, name, sig, true, false, Some(Rc::new(body)));
    }

    /// Defines an instance field. Its value starts at zero (or null) on every instance.
    pub fn define_field(&self, class: &str, name: &str, sig: &str) {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(class, Some(OBJECT));
        st.add_member(class, name, sig, false, true, None);
    }

    pub fn define_static_field(&self, class: &str, name: &str, sig: &str, value: ForeignValue) {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(class, Some(OBJECT));
        let id = st.add_member(class, name, sig, true, true, None);
        let value = store(&st, value);
        if let Some(member) = st.members.get_mut(&id) {
            member.static_value = value;
        }
    }

    /// Creates an instance of `class` and returns a local reference to it. `to_string` is what its
    /// `toString()` returns; the default is `<class name>@<hex id>`.
    pub fn new_instance(&self, class: &str, to_string: Option<&str>) -> jobject {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(class, Some(OBJECT));
        let object = st.new_object(Object::Instance {
            class,
            to_string: to_string.map(str::to_owned),
            message: None,
            fields: HashMap::new(),
        });
        st.new_handle(object, false)
    }

    /// Makes a new throwable of `class` (dotted or slashed name) the pending exception.
    pub fn throw_new(&self, class: &str, message: Option<&str>) {
        let mut st = self.state.borrow_mut();
        let class = st.define_class(&class.replace('.', "/"), Some(THROWABLE));
        let object = st.new_object(Object::Instance {
            class,
            to_string: None,
            message: message.map(str::to_owned),
            fields: HashMap::new(),
        });
        st.pending = Some(object);
    }

    pub fn exception_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Number of method invocations, constructor calls and field accesses so far.
    pub fn foreign_calls(&self) -> usize {
        self.state.borrow().foreign_calls
    }

    /// Number of invocations of methods called `name`.
    pub fn invocations(&self, name: &str) -> usize {
        self.state
            .borrow()
            .invocations
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    pub fn created_strings(&self) -> usize {
        self.state.borrow().created_strings
    }

    pub fn live_local_refs(&self) -> usize {
        self.state
            .borrow()
            .handles
            .values()
            .filter(|h| !h.global)
            .count()
    }

    pub fn deleted_local_refs(&self) -> usize {
        self.state.borrow().deleted_locals
    }

    pub fn live_global_refs(&self) -> usize {
        self.state
            .borrow()
            .handles
            .values()
            .filter(|h| h.global)
            .count()
    }

    pub fn deleted_global_refs(&self) -> usize {
        self.state.borrow().deleted_globals
    }

    pub fn describe_count(&self) -> usize {
        self.state.borrow().describes
    }

    /// Whether two references point to the same object.
    pub fn is_same_object(&self, a: jobject, b: jobject) -> bool {
        let st = self.state.borrow();
        st.object_of(a) == st.object_of(b)
    }

    pub fn is_global(&self, raw: jobject) -> bool {
        self.state
            .borrow()
            .handles
            .get(&(raw as usize))
            .map_or(false, |h| h.global)
    }

    /// Deletes a global reference. [`MockGlobal`] calls this when dropped.
    pub fn delete_global_ref(&self, obj: jobject) {
        let mut st = self.state.borrow_mut();
        match st.handles.remove(&(obj as usize)) {
            Some(Handle { global: true, .. }) => st.deleted_globals += 1,
            Some(_) => panic!("DeleteGlobalRef on a local reference {:?}", obj),
            None => panic!("global reference {:?} deleted twice", obj),
        }
    }

    fn new_local_string(&self, text: &str) -> jobject {
        let mut st = self.state.borrow_mut();
        st.created_strings += 1;
        let object = st.new_object(Object::Str(text.to_owned()));
        st.new_handle(object, false)
    }

    fn describe(&self, raw: jobject) -> String {
        let st = self.state.borrow();
        let object = st.object_of(raw);
        match &st.objects[&object] {
            Object::Class { .. } => format!("class {}", st.class_name(object)),
            Object::Str(s) => s.clone(),
            Object::Instance {
                to_string: Some(s), ..
            } => s.clone(),
            Object::Instance {
                class,
                message: Some(m),
                ..
            } => format!("{}: {}", st.class_name(*class), m),
            Object::Instance { class, .. } => format!("{}@{:x}", st.class_name(*class), object),
        }
    }

    fn throw_lookup_error(&self, class: &str, message: String) -> Error {
        self.throw_new(class, Some(&message));
        Error::JavaException
    }

    fn lookup(
        &self,
        class: jclass,
        name: &str,
        sig: &str,
        is_static: bool,
        is_field: bool,
    ) -> JniResult<usize> {
        let found = {
            let st = self.state.borrow();
            let class_id = st.object_of(class);
            st.find_member(class_id, name, sig, is_static, is_field)
                .ok_or_else(|| st.class_name(class_id))
        };

        found.map_err(|class_name| {
            let what = if is_static { "static " } else { "non-static " };
            if is_field {
                self.throw_lookup_error(
                    NO_SUCH_FIELD_ERROR,
                    format!("no \"{}\" field \"{}\" in class \"{}\"", sig, name, class_name),
                )
            } else {
                self.throw_lookup_error(
                    NO_SUCH_METHOD_ERROR,
                    format!("no {}method \"{}.{}{}\"", what, class_name, name, sig),
                )
            }
        })
    }

    /// Runs a method body. `ret` is the kind of the typed call used, `None` for constructors.
    fn invoke(
        &self,
        this: jobject,
        method: jmethodID,
        is_static: bool,
        ret: Option<JavaKind>,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue> {
        let body = {
            let mut st = self.state.borrow_mut();
            assert!(st.pending.is_none(), "JNI call with a pending exception");
            st.object_of(this);
            st.foreign_calls += 1;

            let member = match st.members.get(&(method as usize)) {
                Some(m) => m,
                None => panic!("unknown method ID {:?}", method),
            };
            assert!(!member.is_field, "field ID used as a method ID");
            assert_eq!(member.is_static, is_static, "method binding mismatch");
            if let Some(ret) = ret {
                assert_eq!(field_kind(&member.sig), ret, "method called with the wrong return type");
            }
            let (name, sig) = (member.name.clone(), member.sig.clone());

            // virtual dispatch on the runtime class of `this`
            let target = if is_static || name == "<init>" {
                method as usize
            } else {
                let class = st.class_of(st.object_of(this));
                st.find_member(class, &name, &sig, false, false)
                    .unwrap_or(method as usize)
            };
            let body = st.members[&target].body.clone();
            *st.invocations.entry(name).or_insert(0) += 1;
            body
        };

        let result = match body {
            Some(body) => body(self, this, args),
            None => ForeignValue::Void,
        };

        if self.exception_pending() {
            return Err(Error::JavaException);
        }
        if let Some(ret) = ret {
            assert_eq!(result.kind(), ret, "method body returned the wrong type");
        }

        // results are always fresh local references, as in JNI
        match result {
            ForeignValue::Object(obj) if !obj.is_null() && self.is_global(obj) => {
                let mut st = self.state.borrow_mut();
                let object = st.object_of(obj);
                Ok(ForeignValue::Object(st.new_handle(object, false)))
            }
            other => Ok(other),
        }
    }

    fn field_member(&self, field: jfieldID, is_static: bool) -> (usize, JavaKind) {
        let st = self.state.borrow();
        match st.members.get(&(field as usize)) {
            Some(m) if m.is_field && m.is_static == is_static => {
                (field as usize, field_kind(&m.sig))
            }
            _ => panic!("invalid field ID {:?}", field),
        }
    }
}

impl ForeignEnv for MockEnv {
    type Global = MockGlobal;

    fn find_class(&self, name: &str) -> JniResult<jclass> {
        let found = {
            let mut st = self.state.borrow_mut();
            match st.classes.get(name).copied() {
                Some(class) => Some(st.new_handle(class, false)),
                None => None,
            }
        };

        match found {
            Some(class) => Ok(class),
            // like FindClass, which reports the name as given
            None => Err(self.throw_lookup_error(NO_CLASS_DEF_FOUND_ERROR, name.to_owned())),
        }
    }

    fn get_object_class(&self, obj: jobject) -> JniResult<jclass> {
        let mut st = self.state.borrow_mut();
        let object = st.object_of(obj);
        let class = st.class_of(object);
        Ok(st.new_handle(class, false))
    }

    fn get_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID> {
        self.lookup(class, name, sig, false, false)
            .map(|id| id as jmethodID)
    }

    fn get_static_method_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jmethodID> {
        self.lookup(class, name, sig, true, false)
            .map(|id| id as jmethodID)
    }

    fn get_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID> {
        self.lookup(class, name, sig, false, true)
            .map(|id| id as jfieldID)
    }

    fn get_static_field_id(&self, class: jclass, name: &str, sig: &str) -> JniResult<jfieldID> {
        self.lookup(class, name, sig, true, true)
            .map(|id| id as jfieldID)
    }

    fn call_method(
        &self,
        obj: jobject,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue> {
        if obj.is_null() {
            return Err(Error::NullPtr("call_method obj argument"));
        }
        self.invoke(obj, method, false, Some(ret), args)
    }

    fn call_static_method(
        &self,
        class: jclass,
        method: jmethodID,
        ret: JavaKind,
        args: &[ForeignValue],
    ) -> JniResult<ForeignValue> {
        if class.is_null() {
            return Err(Error::NullPtr("call_static_method class argument"));
        }
        self.invoke(class, method, true, Some(ret), args)
    }

    fn new_object(
        &self,
        class: jclass,
        ctor: jmethodID,
        args: &[ForeignValue],
    ) -> JniResult<jobject> {
        let this = {
            let mut st = self.state.borrow_mut();
            let class = st.object_of(class);
            let object = st.new_object(Object::Instance {
                class,
                to_string: None,
                message: None,
                fields: HashMap::new(),
            });
            st.new_handle(object, false)
        };

        match self.invoke(this, ctor, false, None, args) {
            Ok(ForeignValue::Object(replacement)) if !replacement.is_null() => {
                self.delete_local_ref(this);
                Ok(replacement)
            }
            Ok(_) => Ok(this),
            Err(e) => {
                self.delete_local_ref(this);
                Err(e)
            }
        }
    }

    fn get_field(&self, obj: jobject, field: jfieldID, kind: JavaKind) -> JniResult<ForeignValue> {
        let (id, field_kind) = self.field_member(field, false);
        assert_eq!(field_kind, kind, "field accessed with the wrong type");

        let mut st = self.state.borrow_mut();
        st.foreign_calls += 1;
        let object = st.object_of(obj);
        let stored = match st.objects.get(&object) {
            Some(Object::Instance { fields, .. }) => {
                fields.get(&id).copied().unwrap_or_else(|| zero_value(kind))
            }
            _ => panic!("field access on a non-instance"),
        };
        Ok(load(&mut st, stored))
    }

    fn set_field(&self, obj: jobject, field: jfieldID, value: ForeignValue) -> JniResult<()> {
        let (id, field_kind) = self.field_member(field, false);
        assert_eq!(field_kind, value.kind(), "field set with the wrong type");

        let mut st = self.state.borrow_mut();
        st.foreign_calls += 1;
        let object = st.object_of(obj);
        let value = store(&st, value);
        match st.objects.get_mut(&object) {
            Some(Object::Instance { fields, .. }) => {
                fields.insert(id, value);
                Ok(())
            }
            _ => panic!("field access on a non-instance"),
        }
    }

    fn get_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        kind: JavaKind,
    ) -> JniResult<ForeignValue> {
        let (id, field_kind) = self.field_member(field, true);
        assert_eq!(field_kind, kind, "field accessed with the wrong type");

        let mut st = self.state.borrow_mut();
        st.foreign_calls += 1;
        st.object_of(class);
        let stored = st.members[&id].static_value;
        Ok(load(&mut st, stored))
    }

    fn set_static_field(
        &self,
        class: jclass,
        field: jfieldID,
        value: ForeignValue,
    ) -> JniResult<()> {
        let (id, field_kind) = self.field_member(field, true);
        assert_eq!(field_kind, value.kind(), "field set with the wrong type");

        let mut st = self.state.borrow_mut();
        st.foreign_calls += 1;
        st.object_of(class);
        let value = store(&st, value);
        if let Some(member) = st.members.get_mut(&id) {
            member.static_value = value;
        }
        Ok(())
    }

    fn new_global_ref(&self, obj: jobject) -> JniResult<MockGlobal> {
        if obj.is_null() {
            return Err(Error::NullPtr("new_global_ref obj argument"));
        }
        let raw = {
            let mut st = self.state.borrow_mut();
            let object = st.object_of(obj);
            st.new_handle(object, true)
        };
        Ok(MockGlobal {
            env: self.clone(),
            raw,
        })
    }

    fn delete_local_ref(&self, obj: jobject) {
        let mut st = self.state.borrow_mut();
        match st.handles.remove(&(obj as usize)) {
            Some(Handle { global: false, .. }) => st.deleted_locals += 1,
            Some(_) => panic!("DeleteLocalRef on a global reference {:?}", obj),
            None => panic!("local reference {:?} deleted twice", obj),
        }
    }

    fn new_string(&self, s: &str) -> JniResult<jstring> {
        Ok(self.new_local_string(s))
    }

    fn get_string(&self, s: jstring) -> JniResult<String> {
        if s.is_null() {
            return Err(Error::NullPtr("get_string argument"));
        }
        let st = self.state.borrow();
        match &st.objects[&st.object_of(s)] {
            Object::Str(text) => Ok(text.clone()),
            _ => Err(Error::WrongJValueType("object", "java.lang.String")),
        }
    }

    fn exception_occurred(&self) -> JniResult<Option<jthrowable>> {
        let mut st = self.state.borrow_mut();
        let pending = st.pending;
        match pending {
            Some(object) => Ok(Some(st.new_handle(object, false))),
            None => Ok(None),
        }
    }

    fn exception_clear(&self) -> JniResult<()> {
        self.state.borrow_mut().pending = None;
        Ok(())
    }

    fn exception_describe(&self) -> JniResult<()> {
        self.state.borrow_mut().describes += 1;
        Ok(())
    }
}
