pub mod catalog;
pub mod classify;
pub mod controls;
pub mod descriptor;
pub mod module;
pub mod resolver;
pub mod settings_layer;

use std::path::PathBuf;

pub fn default_app_root_from_manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}
