//! Local storage of uploaded legal documents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use chrono::{NaiveDate, Utc};
use tracing::{debug, trace, warn};

use crate::error::{ApiError, ApiResult};

/// Public prefix the uploads directory is served under.
pub const UPLOADS_ROUTE: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadScope {
    Business,
    Products,
}

impl UploadScope {
    fn dir_name(self) -> &'static str {
        match self {
            UploadScope::Business => "business",
            UploadScope::Products => "products",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name on disk
    pub file_name: String,
    /// Public URL under [`UPLOADS_ROUTE`]
    pub url: String,
    pub path: PathBuf,
}

/// Final path component of a client-supplied file name.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

/// `{business}_{unix}_{name}` or `{business}_{product}_{unix}_{name}`.
pub fn stored_file_name(business_id: i32, product_id: Option<i32>, timestamp: i64, original: &str) -> String {
    match product_id {
        Some(product_id) => format!("{}_{}_{}_{}", business_id, product_id, timestamp, original),
        None => format!("{}_{}_{}", business_id, timestamp, original),
    }
}

/// Write an upload below `{root}/legal/{business|products}/`.
pub async fn store_upload(
    root: &Path,
    scope: UploadScope,
    business_id: i32,
    product_id: Option<i32>,
    original_name: &str,
    bytes: &[u8],
) -> std::io::Result<StoredFile> {
    let dir = root.join("legal").join(scope.dir_name());
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = stored_file_name(business_id, product_id, Utc::now().timestamp(), original_name);
    let path = dir.join(&file_name);
    tokio::fs::write(&path, bytes).await?;
    debug!("Stored {} bytes at {}", bytes.len(), path.display());

    Ok(StoredFile {
        url: format!("{}/legal/{}/{}", UPLOADS_ROUTE, scope.dir_name(), file_name),
        file_name,
        path,
    })
}

/// The file part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied name, already reduced to its final component
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and the first file of a multipart form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// A trimmed, non-empty text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_text(&self, name: &str) -> ApiResult<&str> {
        self.text(name)
            .ok_or_else(|| ApiError::bad_request(format!("Field '{}' is required", name)))
    }

    pub fn require_file(&self) -> ApiResult<&UploadedFile> {
        self.file
            .as_ref()
            .filter(|f| !f.bytes.is_empty())
            .ok_or_else(|| ApiError::bad_request("A non-empty file is required"))
    }
}

/// Read a whole multipart body. Parts with a file name are files; the rest are text.
pub async fn read_multipart(mut multipart: Multipart) -> ApiResult<MultipartForm> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        match file_name {
            Some(raw_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?;
                if form.file.is_some() {
                    debug!("Ignoring extra file part '{}'", name);
                    continue;
                }
                let file_name = sanitize_file_name(&raw_name)
                    .ok_or_else(|| ApiError::bad_request("Invalid file name"))?;
                trace!("Received file '{}' ({} bytes)", file_name, bytes.len());
                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field '{}': {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }
    }
    Ok(form)
}

/// `YYYY-MM-DD`, or `None` when blank or unparsable.
pub fn parse_date_lenient(raw: Option<&str>, field: &str) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring unparsable {} '{}': {}", field, raw, e);
            None
        }
    }
}
