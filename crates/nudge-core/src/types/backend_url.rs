//! Backend URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Where a backend URL points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendKind {
    /// A filesystem backend rooted at a directory.
    File(PathBuf),
    /// The hosted service for a project, reached at the provider's own hosts.
    Firebase { project: String },
    /// A REST gateway or emulator serving every API under one base URL.
    Rest(Url),
}

/// A validated backend URL.
///
/// Three schemes are understood:
///
/// - `file:///path/to/dir` selects the filesystem backend, for local-only use
///   and testing.
/// - `firebase://<project-id>` selects the hosted REST APIs for a project.
/// - `https://host` (or `http://` for localhost) selects a REST gateway or
///   emulator that serves all APIs under one base URL.
///
/// # Example
///
/// ```
/// use nudge_core::BackendUrl;
///
/// let local = BackendUrl::new("file:///tmp/nudge").unwrap();
/// assert!(local.is_local());
///
/// let hosted = BackendUrl::new("firebase://my-reminders").unwrap();
/// assert!(!hosted.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BackendUrl(Url);

impl BackendUrl {
    /// Create a new backend URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or uses an unsupported scheme.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::BackendUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Build a file backend URL from a directory path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn from_directory(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let url = Url::from_directory_path(path).map_err(|()| InvalidInputError::BackendUrl {
            value: path.display().to_string(),
            reason: "directory path must be absolute".to_string(),
        })?;
        Ok(Self(url))
    }

    /// Returns the URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns true if this is a filesystem backend.
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Classify the URL.
    pub fn kind(&self) -> BackendKind {
        match self.0.scheme() {
            "file" => BackendKind::File(self.0.to_file_path().unwrap_or_default()),
            "firebase" => BackendKind::Firebase {
                project: self.0.host_str().unwrap_or_default().to_string(),
            },
            _ => BackendKind::Rest(self.0.clone()),
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            InvalidInputError::BackendUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        match url.scheme() {
            "file" => {
                if url.to_file_path().is_err() {
                    return Err(invalid("file:// URL must be an absolute path"));
                }
                Ok(())
            }
            "firebase" => {
                if url.host_str().is_none_or(str::is_empty) {
                    return Err(invalid("firebase:// URL must name a project"));
                }
                Ok(())
            }
            "https" | "http" => {
                let is_localhost = url
                    .host_str()
                    .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

                if url.scheme() == "http" && !is_localhost {
                    return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
                }

                if url.host_str().is_none() {
                    return Err(invalid("must have a host"));
                }

                Ok(())
            }
            _ => Err(invalid("scheme must be file, firebase, https or http")),
        }
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BackendUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BackendUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for BackendUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BackendUrl::new(&s).map_err(serde::de::Error::custom)
    }
}
