use jni::sys::{jchar, JNI_FALSE};

use crate::bridge::Bridge;
use crate::convert::{ForeignValue, Local, ReferenceKind, STRING_CLASS_NAME};
use crate::env::ForeignEnv;
use crate::error::Result;
use crate::value::Value;

impl<E: ForeignEnv> Bridge<E> {
    /// Converts the result of a foreign call into a script value.
    ///
    /// Objects whose runtime class is exactly `java.lang.String` become script strings, other
    /// objects are wrapped in a new [`Reference`](crate::convert::Reference). The local reference
    /// of the result is deleted either way.
    pub(crate) fn decode(&self, value: ForeignValue) -> Result<Value<E>> {
        let value = match value {
            ForeignValue::Void => Value::Nil,
            ForeignValue::Boolean(z) => Value::Bool(z != JNI_FALSE),
            ForeignValue::Byte(b) => Value::Integer(b.into()),
            ForeignValue::Short(s) => Value::Integer(s.into()),
            ForeignValue::Int(i) => Value::Integer(i.into()),
            ForeignValue::Long(j) => Value::Integer(j),
            ForeignValue::Char(c) => Value::Str(decode_char(c)),
            ForeignValue::Float(f) => Value::Float(f.into()),
            ForeignValue::Double(d) => Value::Float(d),
            ForeignValue::Object(obj) => return self.decode_object(Local::new(self.env(), obj)),
        };

        Ok(value)
    }

    fn decode_object(&self, obj: Local<'_, E>) -> Result<Value<E>> {
        if obj.is_null() {
            return Ok(Value::Nil);
        }

        if self.class_name_of(obj.as_obj())? == STRING_CLASS_NAME {
            Ok(Value::Str(self.env().get_string(obj.as_obj())?))
        } else {
            self.wrap(obj, ReferenceKind::Object)
        }
    }
}

/// Only the low byte of the UTF-16 unit is kept; NUL gives an empty string.
fn decode_char(c: jchar) -> String {
    match (c & 0xff) as u8 {
        0 => String::new(),
        byte => char::from(byte).to_string(),
    }
}
