use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const SERVER_URL_ENV: &str = "RUNIMAGEJ_SERVER_URL";
pub const DEFAULT_OPERATION_ENV: &str = "RUNIMAGEJ_DEFAULT_OPERATION";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BridgeSettingsOverlay {
    pub server_url: Option<String>,
    pub default_operation: Option<String>,
}

/// Fully merged settings used to build the catalog and the module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeSettings {
    pub server_url: String,
    pub default_operation: Option<String>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            server_url: String::from(DEFAULT_SERVER_URL),
            default_operation: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsLayerError {
    #[error("failed to read runimagej settings '{path}': {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse runimagej settings JSON '{path}': {message}")]
    ParseJson { path: String, message: String },
    #[error("failed to parse runimagej settings TOML '{path}': {message}")]
    ParseToml { path: String, message: String },
    #[error("runimagej settings root must be an object")]
    RootMustBeObject,
    #[error("runimagej settings field '{field}' has invalid type")]
    InvalidFieldType { field: String },
}

pub fn load_app_settings(
    app_root: &Path,
    explicit_path: Option<&str>,
) -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    if let Some(path) = explicit_path
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .map(|p| if p.is_absolute() { p } else { app_root.join(p) })
    {
        return load_optional_overlay_by_extension(path.as_path());
    }

    let toml_path = app_root.join("config/runimagej.settings.toml");
    if toml_path.exists() {
        return load_optional_overlay_from_toml_path(toml_path.as_path());
    }
    load_optional_overlay_from_json_path(app_root.join("config/runimagej.settings.json").as_path())
}

pub fn env_settings_overlay() -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    env_settings_overlay_from(|key| std::env::var(key).ok())
}

pub fn env_settings_overlay_from<F>(lookup: F) -> Result<BridgeSettingsOverlay, SettingsLayerError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = BridgeSettingsOverlay::default();
    if let Some(v) = lookup(SERVER_URL_ENV) {
        out.server_url = Some(non_empty(v.as_str(), SERVER_URL_ENV)?);
    }
    if let Some(v) = lookup(DEFAULT_OPERATION_ENV) {
        out.default_operation = Some(non_empty(v.as_str(), DEFAULT_OPERATION_ENV)?);
    }
    Ok(out)
}

/// Later layers win: `overrides` over `env` over `app`.
pub fn merge_settings_overlays(
    app: &BridgeSettingsOverlay,
    env: &BridgeSettingsOverlay,
    overrides: &BridgeSettingsOverlay,
) -> BridgeSettings {
    let defaults = BridgeSettings::default();
    BridgeSettings {
        server_url: overrides
            .server_url
            .as_deref()
            .or(env.server_url.as_deref())
            .or(app.server_url.as_deref())
            .map_or(defaults.server_url, str::to_string),
        default_operation: overrides
            .default_operation
            .as_deref()
            .or(env.default_operation.as_deref())
            .or(app.default_operation.as_deref())
            .map(str::to_string),
    }
}

pub fn parse_settings_overlay_json(
    value: &Value,
) -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    let root = value.as_object().ok_or(SettingsLayerError::RootMustBeObject)?;
    let section_value = root.get("runimagej").unwrap_or(value);
    let section = section_value
        .as_object()
        .ok_or(SettingsLayerError::RootMustBeObject)?;

    let mut out = BridgeSettingsOverlay::default();
    if let Some(v) = section.get("server_url") {
        out.server_url = Some(parse_string(v, "server_url")?);
    }
    if let Some(v) = section.get("default_operation") {
        out.default_operation = Some(parse_string(v, "default_operation")?);
    }
    Ok(out)
}

fn load_optional_overlay_by_extension(
    path: &Path,
) -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    match path
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
    {
        Some(ext) if ext == "toml" => load_optional_overlay_from_toml_path(path),
        _ => load_optional_overlay_from_json_path(path),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, SettingsLayerError> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|error| SettingsLayerError::ReadFile {
            path: path.display().to_string(),
            message: error.to_string(),
        })
}

fn load_optional_overlay_from_json_path(
    path: &Path,
) -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(BridgeSettingsOverlay::default());
    };
    let parsed = serde_json::from_str::<Value>(raw.as_str()).map_err(|error| {
        SettingsLayerError::ParseJson {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    })?;
    parse_settings_overlay_json(&parsed)
}

fn load_optional_overlay_from_toml_path(
    path: &Path,
) -> Result<BridgeSettingsOverlay, SettingsLayerError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(BridgeSettingsOverlay::default());
    };
    let parsed = toml::from_str::<toml::Value>(raw.as_str()).map_err(|error| {
        SettingsLayerError::ParseToml {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    })?;
    let json_value =
        serde_json::to_value(parsed).map_err(|error| SettingsLayerError::ParseToml {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
    parse_settings_overlay_json(&json_value)
}

fn parse_string(value: &Value, field: &str) -> Result<String, SettingsLayerError> {
    let parsed = value
        .as_str()
        .ok_or_else(|| SettingsLayerError::InvalidFieldType {
            field: field.to_string(),
        })?;
    non_empty(parsed, field)
}

fn non_empty(value: &str, field: &str) -> Result<String, SettingsLayerError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SettingsLayerError::InvalidFieldType {
            field: field.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
