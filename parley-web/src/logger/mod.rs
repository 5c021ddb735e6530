pub struct Logger;

impl Logger {
    pub fn debug(msg: &str) {
        emit("[DEBUG]", msg);
    }

    pub fn info(msg: &str) {
        emit("[INFO]", msg);
    }

    pub fn warn(msg: &str) {
        emit("[WARN]", msg);
    }

    pub fn error(msg: &str) {
        emit("[ERROR]", msg);
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: &str, msg: &str) {
    web_sys::console::log_1(&format!("{level} {msg}").into());
}

// Shared logic is unit-tested natively; route diagnostics to stderr there.
#[cfg(not(target_arch = "wasm32"))]
fn emit(level: &str, msg: &str) {
    eprintln!("{level} {msg}");
}
