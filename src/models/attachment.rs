//! Attachment metadata stored alongside a record.

use serde::{Deserialize, Serialize};

/// Metadata of a file kept on a storage disk. The bytes never live in the
/// database; `url` is filled in when the record is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Generated file name, unique within the folder
    pub name: String,
    /// File name supplied by the uploader
    pub original_name: String,
    /// Lower-cased extension without the dot
    pub extname: String,
    /// Size in bytes
    pub size: u64,
    pub mime_type: Option<String>,
    /// Public URL, computed from the disk on read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Attachment {
    /// Copy without the computed URL, suitable for persisting.
    pub fn without_url(&self) -> Self {
        Self {
            url: None,
            ..self.clone()
        }
    }
}
