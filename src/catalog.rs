mod imagej_server;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::{InputDescriptor, OperationDetail};

pub use imagej_server::ImageJServerCatalog;

/// Fully-qualified operation identifier, e.g. `command:net.imagej.plugins.commands.imglib.GaussianBlur`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationHandle(String);

impl OperationHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        self.0.as_str()
    }

    pub fn short_name(&self) -> &str {
        short_name_of(self.0.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid ImageJ server URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("ImageJ server request failed: {0}")]
    Http(String),
    #[error("ImageJ server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("operation not found: {0}")]
    OperationNotFound(String),
    #[error("operation metadata JSON decode failed: {source}")]
    JsonDecode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("operation catalog filesystem error: {0}")]
    Io(#[source] std::io::Error),
}

/// Remote provider of operation metadata.
pub trait OperationCatalog: Send + Sync + 'static {
    fn list_operations(&self) -> Result<Vec<String>, CatalogError>;

    fn describe(&self, operation: &OperationHandle) -> Result<OperationDetail, CatalogError>;

    /// First operation matching `short_name`; see [`find_operation`].
    fn find(&self, short_name: &str) -> Result<OperationHandle, CatalogError> {
        let operations = self.list_operations()?;
        find_operation(&operations, short_name)
            .map(OperationHandle::new)
            .ok_or_else(|| CatalogError::OperationNotFound(short_name.to_string()))
    }
}

pub type SharedOperationCatalog = Arc<dyn OperationCatalog>;

/// Last `.`-separated segment of an operation identifier.
pub fn short_name_of(id: &str) -> &str {
    id.rsplit('.').next().unwrap_or(id)
}

/// Prefers an identifier whose short name equals `short_name`, then the first one containing it.
pub fn find_operation<'a>(operations: &'a [String], short_name: &str) -> Option<&'a str> {
    let short_name = short_name.trim();
    if short_name.is_empty() {
        return None;
    }
    operations
        .iter()
        .find(|id| short_name_of(id) == short_name)
        .or_else(|| operations.iter().find(|id| id.contains(short_name)))
        .map(String::as_str)
}

#[derive(Debug, Clone, Deserialize)]
struct StaticCatalogEntry {
    id: String,
    #[serde(default)]
    inputs: Vec<InputDescriptor>,
}

/// Catalog backed by an in-memory list, loadable from a JSON file of
/// `[{"id": "...", "inputs": [...]}]` records.
#[derive(Debug, Clone, Default)]
pub struct StaticOperationCatalog {
    entries: Vec<(String, OperationDetail)>,
}

impl StaticOperationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operation(mut self, id: impl Into<String>, inputs: Vec<InputDescriptor>) -> Self {
        self.entries.push((id.into(), OperationDetail { inputs }));
        self
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let parsed: Vec<StaticCatalogEntry> =
            serde_json::from_str(raw).map_err(|source| CatalogError::JsonDecode {
                source,
                body: raw.to_string(),
            })?;
        Ok(Self {
            entries: parsed
                .into_iter()
                .map(|entry| (entry.id, OperationDetail { inputs: entry.inputs }))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(CatalogError::Io)?;
        Self::from_json_str(raw.as_str())
    }
}

impl OperationCatalog for StaticOperationCatalog {
    fn list_operations(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.entries.iter().map(|(id, _)| id.clone()).collect())
    }

    fn describe(&self, operation: &OperationHandle) -> Result<OperationDetail, CatalogError> {
        self.entries
            .iter()
            .find(|(id, _)| id == operation.id())
            .map(|(_, detail)| detail.clone())
            .ok_or_else(|| CatalogError::OperationNotFound(operation.id().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn short_name_is_last_dotted_segment() {
        assert_eq!(
            short_name_of("command:net.imagej.plugins.commands.imglib.GaussianBlur"),
            "GaussianBlur"
        );
        assert_eq!(short_name_of("Plain"), "Plain");
    }

    #[test]
    fn find_prefers_exact_short_name_over_substring() {
        let operations = ids(&[
            "command:net.imagej.ops.GaussDerivative",
            "command:net.imagej.ops.Gauss",
        ]);
        assert_eq!(
            find_operation(&operations, "Gauss"),
            Some("command:net.imagej.ops.Gauss")
        );
        assert_eq!(
            find_operation(&operations, "Deriv"),
            Some("command:net.imagej.ops.GaussDerivative")
        );
        assert_eq!(find_operation(&operations, "Median"), None);
        assert_eq!(find_operation(&operations, "  "), None);
    }

    #[test]
    fn static_catalog_parses_and_describes_entries() {
        let catalog = StaticOperationCatalog::from_json_str(
            r#"[
                {"id": "command:demo.Blur", "inputs": [{"name": "sigma", "genericType": "double"}]},
                {"id": "command:demo.Invert"}
            ]"#,
        )
        .expect("catalog should parse");

        assert_eq!(
            catalog.list_operations().expect("list"),
            ids(&["command:demo.Blur", "command:demo.Invert"])
        );
        let handle = catalog.find("Blur").expect("find");
        let detail = catalog.describe(&handle).expect("describe");
        assert_eq!(detail.inputs.len(), 1);
        assert_eq!(detail.inputs[0].name, "sigma");

        let err = catalog
            .describe(&OperationHandle::new("command:demo.Missing"))
            .expect_err("missing operation should fail");
        assert!(matches!(err, CatalogError::OperationNotFound(_)));
    }

    #[test]
    fn static_catalog_rejects_malformed_json() {
        let err = StaticOperationCatalog::from_json_str("{not json")
            .expect_err("malformed catalog should fail");
        assert!(matches!(err, CatalogError::JsonDecode { .. }));
    }

    #[test]
    fn static_catalog_loads_from_file() {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("runimagej_catalog_{stamp}.json"));
        fs::write(&path, r#"[{"id": "command:demo.Threshold", "inputs": []}]"#)
            .expect("catalog write");

        let catalog = StaticOperationCatalog::load(path.as_path()).expect("catalog load");
        assert_eq!(
            catalog.find("Threshold").expect("find").id(),
            "command:demo.Threshold"
        );

        let _ = fs::remove_file(path);
    }
}
