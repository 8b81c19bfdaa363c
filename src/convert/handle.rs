use std::fmt;

use jni::sys::{jfieldID, jmethodID, jobject};
use log::trace;

use crate::env::{ForeignEnv, GlobalHandle};
use crate::error::Result;

/// What a [`Reference`] was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Object,
    Class,
}

impl ReferenceKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ReferenceKind::Object => "jobject",
            ReferenceKind::Class => "jclass",
        }
    }
}

/// Script-visible owner of one global reference.
///
/// The reference is deleted when the handle is dropped. Script values share a handle through an
/// `Rc`, so the deletion happens exactly once, when the last script value referring to it goes away.
pub struct Reference<E: ForeignEnv> {
    global: E::Global,
    kind: ReferenceKind,
    qualifier: String,
}

impl<E: ForeignEnv> Reference<E> {
    /// Promotes `local` to a global reference. The local reference itself is left alone.
    pub(crate) fn promote(
        env: &E,
        local: jobject,
        kind: ReferenceKind,
        qualifier: String,
    ) -> Result<Self> {
        let global = env.new_global_ref(local)?;
        trace!(
            "promoted {} {} to global {:?}",
            kind.type_name(),
            qualifier,
            global.as_raw()
        );

        Ok(Reference {
            global,
            kind,
            qualifier,
        })
    }

    /// The underlying global reference, for use in a foreign call. Valid while `self` is alive.
    pub fn as_raw(&self) -> jobject {
        self.global.as_raw()
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// `toString()` of the object, taken when the handle was created.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }
}

impl<E: ForeignEnv> Drop for Reference<E> {
    fn drop(&mut self) {
        trace!("deleting global {:?} ({})", self.as_raw(), self.qualifier);
    }
}

impl<E: ForeignEnv> fmt::Debug for Reference<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#<JNI::FFI::Reference {} {}>",
            self.type_name(),
            self.qualifier
        )
    }
}

impl<E: ForeignEnv> fmt::Display for Reference<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualifier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method,
    StaticMethod,
    Field,
    StaticField,
}

impl MemberKind {
    pub fn type_name(self) -> &'static str {
        match self {
            MemberKind::Method | MemberKind::StaticMethod => "jmethodID",
            MemberKind::Field | MemberKind::StaticField => "jfieldID",
        }
    }

    pub fn is_static(self) -> bool {
        matches!(self, MemberKind::StaticMethod | MemberKind::StaticField)
    }

    pub fn description(self) -> &'static str {
        match self {
            MemberKind::Method => "method ID",
            MemberKind::StaticMethod => "static method ID",
            MemberKind::Field => "field ID",
            MemberKind::StaticField => "static field ID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawMember {
    Method(jmethodID),
    Field(jfieldID),
}

/// A method or field ID. IDs are not references: nothing is released, and they stay valid while
/// the declaring class is loaded, which the bridge assumes to be the whole process lifetime.
#[derive(Clone, PartialEq, Eq)]
pub struct MemberId {
    raw: RawMember,
    is_static: bool,
    qualifier: String,
}

impl MemberId {
    pub(crate) fn method(raw: jmethodID, is_static: bool, qualifier: String) -> Self {
        MemberId {
            raw: RawMember::Method(raw),
            is_static,
            qualifier,
        }
    }

    pub(crate) fn field(raw: jfieldID, is_static: bool, qualifier: String) -> Self {
        MemberId {
            raw: RawMember::Field(raw),
            is_static,
            qualifier,
        }
    }

    pub fn kind(&self) -> MemberKind {
        match (self.raw, self.is_static) {
            (RawMember::Method(_), false) => MemberKind::Method,
            (RawMember::Method(_), true) => MemberKind::StaticMethod,
            (RawMember::Field(_), false) => MemberKind::Field,
            (RawMember::Field(_), true) => MemberKind::StaticField,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// The raw method ID if this is a method of the given binding.
    pub fn as_method(&self, is_static: bool) -> Option<jmethodID> {
        match self.raw {
            RawMember::Method(id) if self.is_static == is_static => Some(id),
            _ => None,
        }
    }

    /// The raw field ID if this is a field of the given binding.
    pub fn as_field(&self, is_static: bool) -> Option<jfieldID> {
        match self.raw {
            RawMember::Field(id) if self.is_static == is_static => Some(id),
            _ => None,
        }
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#<JNI::FFI::Pointer {} {}>",
            self.type_name(),
            self.qualifier
        )
    }
}
