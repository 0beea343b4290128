//! Browser entry point for portfolio-enhance.
//!
//! The web-sys bindings only build for `wasm32` with the `web` feature, so
//! the workspace still builds and tests on native targets.
//!
//! Enable the real entry point with: `--features web` (and a wasm32 target).

pub mod logging;

/// Placeholder function for non-web (or non-wasm) builds.
#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
pub fn placeholder() {
    // No-op.
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod browser;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use browser::{start, BrowserDom};
