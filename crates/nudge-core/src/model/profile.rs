//! User profile model.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::document::Fields;

const NAME: &str = "name";
const CONTACT_NUMBER: &str = "contactNumber";
const HOBBY: &str = "hobby";
const AVATAR_URL: &str = "avatarUrl";

/// A user's profile, stored as one document keyed by the user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub contact_number: String,
    pub hobby: String,
    /// URL of the uploaded avatar image, if any.
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Decode a profile. Missing text fields read as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a field holds a non-string value.
    pub fn from_fields(fields: &Fields) -> Result<Self> {
        let text = |name: &str| -> Result<String> {
            Ok(fields.get_optional_str(name)?.unwrap_or_default().to_string())
        };

        Ok(Self {
            name: text(NAME)?,
            contact_number: text(CONTACT_NUMBER)?,
            hobby: text(HOBBY)?,
            avatar_url: fields.get_optional_str(AVATAR_URL)?.map(str::to_string),
        })
    }

    /// Encode for a full write. A missing avatar is stored as an empty string.
    pub fn to_fields(&self) -> Fields {
        Fields::new()
            .with(NAME, self.name.as_str())
            .with(CONTACT_NUMBER, self.contact_number.as_str())
            .with(HOBBY, self.hobby.as_str())
            .with(AVATAR_URL, self.avatar_url.clone().unwrap_or_default())
    }
}

/// An avatar image ready for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct Avatar {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl Avatar {
    /// Wrap image bytes with an explicit content type.
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Guess the content type from a file name's extension.
    pub fn from_file_name(bytes: Vec<u8>, file_name: &str) -> Self {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let content_type = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        };

        Self::new(bytes, content_type)
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

impl std::fmt::Debug for Avatar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Avatar")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
