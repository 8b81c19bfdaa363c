use log::debug;
use robusta_ffi::env::JniEnv;
use robusta_ffi::{Bridge, Config, Value};

/// Bridges are bound to the thread they were created on, so a worker thread attaches and builds
/// its own.
pub(crate) fn value_of_in_thread() -> Result<String, String> {
    debug!("SCRIPT_THREAD: start...");

    let vm = crate::JAVA_VM
        .get()
        .ok_or_else(|| "Couldn't get JAVA_VM".to_string())?;
    let env = vm
        .attach_current_thread_permanently()
        .map_err(|_| "Couldn't attach to current thread".to_string())?;

    let bridge = Bridge::new(JniEnv::new(env), Config::default()).map_err(|e| e.to_string())?;
    let string = bridge
        .find_class("java/lang/String")
        .map_err(|e| format!("Couldn't find String: {}", e))?;
    let value_of = bridge
        .get_static_method_id(&string, "valueOf", "(I)Ljava/lang/String;")
        .map_err(|e| format!("Couldn't find valueOf: {}", e))?;

    debug!("SCRIPT_THREAD: calling {:?}", value_of);
    let result = bridge
        .call_static_object_method(
            &string,
            &value_of,
            &Value::Array(vec![Value::symbol("int")]),
            &[Value::from(42)],
        )
        .map_err(|e| format!("Couldn't call valueOf: {}", e))?;

    match result {
        Value::Str(s) => Ok(s),
        other => Err(format!("unexpected result {:?}", other)),
    }
}
