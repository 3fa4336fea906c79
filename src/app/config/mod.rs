//! Tool settings loading.
//!
//! The TOML model and its validation live in `domain::settings`.

mod load_settings;

pub use load_settings::{CONFIG_ENV, load_settings, load_settings_with};
