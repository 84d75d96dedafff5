//! Depth-field arcade core crate.
//!
//! Two independent pieces share this crate: a parallax depth-field canvas
//! background (`field`) and a deadline-driven mini-game runtime (`games`).
//! Both keep their simulation free of browser types so it can be tested
//! natively; the `canvas` and `host` modules are the wasm bindings.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod disposer;
pub mod error;
pub mod field;
pub mod games;
pub mod rng;

pub use config::{DepthBand, FieldConfig, GameConfig};
pub use error::Error;
pub use field::canvas::{DepthField, mount_depth_field};
pub use field::palette::Theme;
pub use field::{Field, InputState, Surface};
pub use games::host::GameHost;
pub use games::{Arcade, Game, GameKind, Input, Snapshot};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second init (e.g. hot reload) keeps the first logger.
    console_log::init_with_level(log::Level::Info).ok();
}

