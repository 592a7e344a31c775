use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{CatalogError, OperationCatalog, OperationHandle};
use crate::descriptor::OperationDetail;

/// Catalog served by an ImageJ server over its REST surface
/// (`GET /modules`, `GET /modules/{id}`).
#[derive(Debug, Clone)]
pub struct ImageJServerCatalog {
    base_url: Url,
    client: Client,
}

impl ImageJServerCatalog {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: String::from("URL cannot be used as a base"),
            });
        }
        let client = Client::builder()
            .build()
            .map_err(|e| CatalogError::Http(format!("http client init failed: {e}")))?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn modules_url(&self, module_id: Option<&str>) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|()| CatalogError::InvalidBaseUrl {
                        url: self.base_url.to_string(),
                        message: String::from("URL cannot be used as a base"),
                    })?;
            segments.pop_if_empty().push("modules");
            if let Some(id) = module_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!(url = %url, "requesting ImageJ server metadata");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| CatalogError::Http(format!("HTTP request failed: {e}")))?;
        let (status, body) = read_body(resp)?;
        decode_response_body(status, body)
    }
}

fn read_body(resp: Response) -> Result<(StatusCode, String), CatalogError> {
    let status = resp.status();
    if !status.is_success() {
        return Ok((status, resp.text().unwrap_or_default()));
    }
    let body = resp
        .text()
        .map_err(|e| CatalogError::Http(format!("HTTP body read failed: {e}")))?;
    Ok((status, body))
}

/// Maps a non-success status to [`CatalogError::Status`] and decodes the JSON body otherwise.
fn decode_response_body<T: DeserializeOwned>(
    status: StatusCode,
    body: String,
) -> Result<T, CatalogError> {
    if !status.is_success() {
        return Err(CatalogError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(body.as_str()).map_err(|source| CatalogError::JsonDecode { source, body })
}

impl OperationCatalog for ImageJServerCatalog {
    fn list_operations(&self) -> Result<Vec<String>, CatalogError> {
        self.get_json(self.modules_url(None)?)
    }

    fn describe(&self, operation: &OperationHandle) -> Result<OperationDetail, CatalogError> {
        self.get_json(self.modules_url(Some(operation.id()))?)
    }
}
