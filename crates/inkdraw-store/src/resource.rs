//! Adapter over the host's attachment CRUD operations.

use std::sync::{Arc, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use inkdraw_core::{AttachmentMeta, AttachmentStore, StoreError};
use regex::Regex;

use crate::tempdir::TemporaryDirectory;

/// Mime type of editable drawings.
pub const SVG_MIME: &str = "image/svg+xml";

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Extract a resource id from a user-visible reference.
///
/// Accepted encodings:
/// - bare 32-character hex id (`4a6f...`)
/// - `scheme://.../<id>.<ext>` URLs, optionally followed by `?` or `#` parts
/// - `:/<id>` shorthand links
///
/// Returns `None` for anything else; parsing never fails.
#[must_use]
pub fn parse_resource_ref(reference: &str) -> Option<String> {
    static BARE_ID: OnceLock<Regex> = OnceLock::new();
    static FILE_URL: OnceLock<Regex> = OnceLock::new();
    static SHORT_LINK: OnceLock<Regex> = OnceLock::new();

    let bare_id = BARE_ID.get_or_init(|| Regex::new(r"^[a-f0-9]{32}$").unwrap());
    let file_url = FILE_URL.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9+.-]*://.*/([a-zA-Z0-9]+)\.\w+(?:[?#]|$)").unwrap()
    });
    let short_link = SHORT_LINK.get_or_init(|| Regex::new(r"^:/([a-zA-Z0-9]+)$").unwrap());

    if bare_id.is_match(reference) {
        return Some(reference.to_string());
    }
    if let Some(captures) = file_url.captures(reference) {
        return Some(captures[1].to_string());
    }
    if let Some(captures) = short_link.captures(reference) {
        return Some(captures[1].to_string());
    }
    None
}

/// A persisted drawing attachment.
///
/// The id is host-assigned and immutable; `ResourceStore::update` replaces
/// the payload but preserves identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub mime: String,
    pub title: String,
    /// File extension including the leading dot.
    pub file_extension: String,
}

impl Resource {
    /// Title with markup-significant characters escaped, for inline links.
    #[must_use]
    pub fn html_safe_title(&self) -> String {
        self.title
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Markup inserted into the note body for this resource.
    #[must_use]
    pub fn markup_link(&self) -> String {
        format!("![{}](:/{})", self.html_safe_title(), self.id)
    }
}

/// Resource store adapter: wraps the host's attachment CRUD and stages
/// payloads through scratch files.
pub struct ResourceStore {
    host: Arc<dyn AttachmentStore>,
    tempdir: Arc<TemporaryDirectory>,
}

impl ResourceStore {
    #[must_use]
    pub fn new(host: Arc<dyn AttachmentStore>, tempdir: Arc<TemporaryDirectory>) -> Self {
        Self { host, tempdir }
    }

    /// Look up an existing resource by a user-visible reference.
    ///
    /// Returns `Ok(None)` when the reference does not match any accepted
    /// encoding or the host has no attachment with that id. `file_extension`
    /// should include the leading dot; `fallback_mime` is used when the host
    /// record carries no mime type.
    ///
    /// # Errors
    /// Returns an error only when the host storage call itself fails.
    pub async fn fetch_by_ref(
        &self,
        reference: &str,
        file_extension: &str,
        fallback_mime: &str,
    ) -> Result<Option<Resource>, StoreError> {
        let Some(id) = parse_resource_ref(reference) else {
            return Ok(None);
        };

        let Some(meta) = self.host.get(&id).await? else {
            return Ok(None);
        };

        let mime = if meta.mime.is_empty() {
            fallback_mime.to_string()
        } else {
            meta.mime
        };

        Ok(Some(Resource {
            id: meta.id,
            mime,
            title: meta.title,
            file_extension: file_extension.to_string(),
        }))
    }

    /// Create a new resource from `data`.
    ///
    /// The title gains the extension suffix when it does not already carry
    /// it, matching how the host names attachments.
    ///
    /// # Errors
    /// Returns an error if staging or the host `post` fails.
    pub async fn create(
        &self,
        data: &str,
        title: &str,
        file_extension: &str,
    ) -> Result<Resource, StoreError> {
        let timestamp = now_ms();
        let full_title = if title.ends_with(file_extension) {
            title.to_string()
        } else {
            format!("{title}{file_extension}")
        };

        let staged = self.tempdir.new_file(data, file_extension).await?;
        let meta = AttachmentMeta {
            id: String::new(),
            mime: SVG_MIME.to_string(),
            title: full_title,
            file_extension: Some(file_extension.trim_start_matches('.').to_string()),
            created_time: Some(timestamp),
            updated_time: Some(timestamp),
        };

        let created = self.host.post(meta, &staged).await?;
        tracing::debug!(id = %created.id, "created drawing resource");

        Ok(Resource {
            id: created.id,
            mime: created.mime,
            title: created.title,
            file_extension: file_extension.to_string(),
        })
    }

    /// Replace the payload of an existing resource, preserving its id.
    ///
    /// # Errors
    /// Returns an error if staging or the host `put` fails.
    pub async fn update(&self, resource: &Resource, data: &str) -> Result<(), StoreError> {
        let staged = self.tempdir.new_file(data, &resource.file_extension).await?;
        let meta = AttachmentMeta {
            id: resource.id.clone(),
            mime: resource.mime.clone(),
            title: resource.title.clone(),
            file_extension: Some(resource.file_extension.trim_start_matches('.').to_string()),
            created_time: None,
            updated_time: Some(now_ms()),
        };

        self.host.put(&resource.id, meta, &staged).await?;
        tracing::debug!(id = %resource.id, "overwrote drawing resource");
        Ok(())
    }

    /// Fetch the current text payload of a resource.
    ///
    /// # Errors
    /// Returns an error if the host fetch fails or the payload is not UTF-8.
    pub async fn read_text(&self, resource: &Resource) -> Result<String, StoreError> {
        let bytes = self.host.get_file(&resource.id).await?;
        String::from_utf8(bytes).map_err(|e| StoreError::Host(format!("non-utf8 payload: {e}")))
    }
}
