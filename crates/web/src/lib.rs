//! Browser front-end for the game assistant chat.
//!
//! Attaches to an existing page (chat box, session list, game slider) and
//! drives it with the shared chat controller. Sessions persist in
//! `localStorage`; messages go to the relay with `fetch`.

use wasm_bindgen::prelude::*;
use web_sys::console;

pub mod layout;
pub mod storage;

#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod fetch;
#[cfg(target_arch = "wasm32")]
mod widget;

pub use storage::LocalStorage;
#[cfg(target_arch = "wasm32")]
pub use widget::{Widget, mount};

// ─── Logging helper ────────────────────────────────────────

pub(crate) fn log(s: &str) {
    console::log_1(&JsValue::from_str(s));
}

// ─── Public API ────────────────────────────────────────────

/// Returns the crate version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// WASM entry point, called by the JS glue on load.
///
/// Installs the panic hook for readable console errors. The page then
/// calls [`mount`] with its relay URL.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    log(&format!(
        "gamechat-web v{} WASM module loaded",
        env!("CARGO_PKG_VERSION")
    ));
}

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);
