use std::path::Path;
use std::sync::{Mutex, OnceLock};

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Runs `run` while holding the process-wide environment lock.
pub(crate) fn with_locked_env<R>(run: impl FnOnce() -> R) -> R {
    let _guard = env_lock().lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    run()
}

/// Sets an environment variable. Callers hold [`with_locked_env`].
pub(crate) fn set_env_var(key: &str, value: &str) {
    // SAFETY: env mutation is serialised by `with_locked_env`.
    unsafe {
        std::env::set_var(key, value);
    }
}

/// Removes an environment variable. Callers hold [`with_locked_env`].
pub(crate) fn remove_env_var(key: &str) {
    // SAFETY: env mutation is serialised by `with_locked_env`.
    unsafe {
        std::env::remove_var(key);
    }
}

/// Points `HOME` at `home` for the duration of `run`, then restores it.
/// Callers hold [`with_locked_env`].
pub(crate) fn with_home<R>(home: &Path, run: impl FnOnce() -> R) -> R {
    let original = std::env::var("HOME").ok();
    set_env_var("HOME", &home.to_string_lossy());
    let out = run();
    match original {
        Some(value) => set_env_var("HOME", &value),
        None => remove_env_var("HOME"),
    }
    out
}
