pub(crate) mod thread_func;

use std::sync::OnceLock;
use std::thread;

use android_logger::Config as LoggerConfig;
use jni::objects::{JClass, JObject};
use jni::sys::{jint, JNI_ERR, JNI_OK};
use jni::{JNIEnv, JavaVM};
use log::{error, info};
use robusta_ffi::convert::JavaKind;
use robusta_ffi::env::JniEnv;
use robusta_ffi::{Bridge, Config, Function, JavaObject, Value};

static JAVA_VM: OnceLock<JavaVM> = OnceLock::new();

/// `ScriptHost.runScripts(Activity)`: drives the bridge the way a script would, on the UI thread
/// and on a freshly attached worker thread.
#[no_mangle]
pub extern "system" fn Java_com_example_robustaffiandroidexample_ScriptHost_runScripts(
    env: JNIEnv,
    _class: JClass,
    activity: JObject,
) -> jint {
    android_logger::init_once(LoggerConfig::default().with_tag("RUST_ROBUSTA_FFI_EXAMPLE"));

    info!("TEST START");
    if let Ok(vm) = env.get_java_vm() {
        let _ = JAVA_VM.set(vm);
    }

    if let Err(e) = run_scripts(env, activity) {
        error!("script failed: {} ({})", e, e.script_class());
        return JNI_ERR;
    }

    let thread_handler = thread::Builder::new()
        .name("script_thread".to_string())
        .spawn(crate::thread_func::value_of_in_thread);
    match thread_handler.map(|handle| handle.join()) {
        Ok(Ok(Ok(result))) => info!("script thread: valueOf(42) = {}", result),
        Ok(Ok(Err(msg))) => error!("script thread failed: {}", msg),
        _ => error!("script thread didn't run"),
    }

    info!("TEST END");
    JNI_OK
}

fn run_scripts(env: JNIEnv<'_>, activity: JObject<'_>) -> robusta_ffi::Result<()> {
    let config = Config::default().with_describe_exceptions(true);
    let bridge = Bridge::new(JniEnv::new(env), config)?.with_activity(activity.into_raw())?;

    let activity = bridge.game_activity();
    info!("activity: {:?}", activity);

    let class = bridge.invoke_by_name("get_object_class", &[activity.clone()])?;
    let get_package_name = bridge.invoke_by_name(
        "get_method_id",
        &[
            class,
            Value::from("getPackageName"),
            Value::from("()Ljava/lang/String;"),
        ],
    )?;
    let package_name = bridge.invoke(
        Function::CallMethod(JavaKind::Object),
        &[activity, get_package_name, Value::Array(Vec::new())],
    )?;
    info!("package name: {:?}", package_name);

    let activity = JavaObject::new(bridge.game_activity())?;
    info!("{}", activity.inspect(&bridge)?);

    match bridge.find_class("com/example/robustaffiandroidexample/Missing") {
        Err(e) => info!("expected failure: {} ({})", e, e.script_class()),
        Ok(class) => error!("unexpected class {:?}", class),
    }

    Ok(())
}
