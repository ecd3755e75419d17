//! Filesystem storage for the file-backed backend.
//!
//! Layout under the root directory:
//!
//! ```text
//! accounts/<uid>/account.json
//! collections/<collection>/<id>.json
//! blobs/<path>
//! outbox.jsonl
//! ```

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use nudge_core::error::{AuthError, InvalidInputError, RemoteError};
use nudge_core::{
    Collection, Document, DocumentRef, Email, Error, Fields, Filter, RecordId, Result, UserId,
};

pub(crate) fn map_io(err: std::io::Error) -> Error {
    RemoteError::Storage {
        message: format!("IO error: {}", err),
    }
    .into()
}

fn map_decode(path: &Path, err: serde_json::Error) -> Error {
    RemoteError::Decode {
        message: format!("{}: {}", path.display(), err),
    }
    .into()
}

fn map_encode(err: serde_json::Error) -> Error {
    RemoteError::Storage {
        message: err.to_string(),
    }
    .into()
}

/// Account metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAccount {
    /// The account's user id.
    pub uid: String,
    /// Normalized sign-in email.
    pub email: String,
    /// When the account was created.
    pub created_at: String,
    /// Password hash (bcrypt).
    pub password_hash: String,
}

/// A message the backend would have emailed, appended to the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxMessage {
    /// Recipient address.
    pub to: String,
    /// What the message is for.
    pub kind: OutboxKind,
    /// ISO 8601 timestamp.
    pub time: String,
}

/// Kinds of outbox messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxKind {
    PasswordReset,
}

/// Filesystem-backed storage shared by the file auth, document and blob stores.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accounts_dir(&self) -> PathBuf {
        self.root.join("accounts")
    }

    fn account_path(&self, uid: &UserId) -> PathBuf {
        self.accounts_dir().join(uid.as_str()).join("account.json")
    }

    fn collection_dir(&self, collection: &Collection) -> PathBuf {
        self.root.join("collections").join(collection.as_str())
    }

    fn document_path(&self, reference: &DocumentRef) -> PathBuf {
        self.collection_dir(&reference.collection)
            .join(format!("{}.json", reference.id))
    }

    fn blobs_dir(&self) -> PathBuf {
        self.root.join("blobs")
    }

    /// Path of the outbox log.
    pub fn outbox_path(&self) -> PathBuf {
        self.root.join("outbox.jsonl")
    }

    /// Run `f` while holding an exclusive lock on `lock_path`.
    fn with_lock<T>(&self, lock_path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)
            .map_err(map_io)?;

        lock_file.lock_exclusive().map_err(map_io)?;
        let result = f();
        lock_file.unlock().map_err(map_io)?;

        result
    }

    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(map_io)?;
        }

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content).map_err(map_io)?;
        fs::rename(&temp_path, path).map_err(map_io)?;
        Ok(())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Create an account, failing if the email is taken.
    #[instrument(skip(self, password_hash))]
    pub fn create_account(&self, email: &Email, password_hash: &str) -> Result<LocalAccount> {
        self.with_lock(&self.root.join("accounts.lock"), || {
            if self.find_account_by_email(email)?.is_some() {
                return Err(AuthError::EmailInUse.into());
            }

            let uid = UserId::new(&Uuid::new_v4().simple().to_string()[..28])?;
            let account = LocalAccount {
                uid: uid.to_string(),
                email: email.to_string(),
                created_at: Utc::now().to_rfc3339(),
                password_hash: password_hash.to_string(),
            };

            let content = serde_json::to_string_pretty(&account).map_err(map_encode)?;
            Self::write_atomic(&self.account_path(&uid), &content)?;

            debug!(%uid, %email, "Created local account");
            Ok(account)
        })
    }

    pub fn get_account(&self, uid: &UserId) -> Result<Option<LocalAccount>> {
        let path = self.account_path(uid);
        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .map(Some)
                .map_err(|e| map_decode(&path, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e)),
        }
    }

    pub fn list_accounts(&self) -> Result<Vec<LocalAccount>> {
        let accounts_dir = self.accounts_dir();

        if !accounts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut accounts = Vec::new();

        for entry in fs::read_dir(&accounts_dir).map_err(map_io)? {
            let entry = entry.map_err(map_io)?;
            let account_file = entry.path().join("account.json");

            if account_file.exists() {
                let content = fs::read_to_string(&account_file).map_err(map_io)?;
                match serde_json::from_str::<LocalAccount>(&content) {
                    Ok(account) => accounts.push(account),
                    Err(e) => warn!(path = %account_file.display(), error = %e, "Skipping unreadable account"),
                }
            }
        }

        Ok(accounts)
    }

    pub fn find_account_by_email(&self, email: &Email) -> Result<Option<LocalAccount>> {
        let accounts = self.list_accounts()?;
        Ok(accounts.into_iter().find(|a| a.email == email.as_str()))
    }

    // ========================================================================
    // Documents
    // ========================================================================

    fn read_document(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        let path = self.document_path(reference);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(map_io(e)),
        };

        let fields: Fields = serde_json::from_str(&content).map_err(|e| map_decode(&path, e))?;
        Ok(Some(Document {
            reference: reference.clone(),
            fields,
        }))
    }

    fn store_fields(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        let content = serde_json::to_string_pretty(fields).map_err(map_encode)?;
        Self::write_atomic(&self.document_path(reference), &content)
    }

    fn collection_lock(&self, collection: &Collection) -> PathBuf {
        self.collection_dir(collection).join(".lock")
    }

    #[instrument(skip(self))]
    pub fn query(&self, collection: &Collection, filter: &Filter) -> Result<Vec<Document>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries: Vec<_> = fs::read_dir(&dir)
            .map_err(map_io)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut documents = Vec::new();
        for entry in entries {
            let Some(id) = entry
                .path()
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| RecordId::new(s).ok())
            else {
                continue;
            };

            let reference = DocumentRef::new(collection.clone(), id);
            match self.read_document(&reference) {
                Ok(Some(document)) if filter.matches(&document.fields) => documents.push(document),
                Ok(_) => {}
                Err(e) => warn!(%reference, error = %e, "Skipping unreadable document"),
            }
        }

        debug!(count = documents.len(), "Queried documents");
        Ok(documents)
    }

    #[instrument(skip(self))]
    pub fn get_document(&self, reference: &DocumentRef) -> Result<Option<Document>> {
        self.read_document(reference)
    }

    #[instrument(skip(self, fields))]
    pub fn write_document(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        self.with_lock(&self.collection_lock(&reference.collection), || {
            self.store_fields(reference, fields)
        })?;

        debug!("Wrote document");
        Ok(())
    }

    #[instrument(skip(self, fields))]
    pub fn update_document(&self, reference: &DocumentRef, fields: &Fields) -> Result<()> {
        self.with_lock(&self.collection_lock(&reference.collection), || {
            let mut document =
                self.read_document(reference)?
                    .ok_or_else(|| Error::RecordNotFound {
                        id: reference.id.to_string(),
                    })?;

            document.fields.merge(fields);
            self.store_fields(reference, &document.fields)
        })?;

        debug!("Updated document");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn delete_document(&self, reference: &DocumentRef) -> Result<()> {
        self.with_lock(&self.collection_lock(&reference.collection), || {
            match fs::remove_file(self.document_path(reference)) {
                Ok(()) => {
                    debug!("Deleted document");
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(map_io(e)),
            }
        })
    }

    // ========================================================================
    // Blobs
    // ========================================================================

    /// Resolve a blob path under the blobs directory, rejecting anything
    /// that would escape it.
    fn blob_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !valid {
            return Err(InvalidInputError::Field {
                name: "path".to_string(),
                reason: format!("invalid blob path '{}'", path),
            }
            .into());
        }

        Ok(self.blobs_dir().join(relative))
    }

    /// Store a blob and return its `file://` URL.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn put_blob(&self, path: &str, bytes: &[u8]) -> Result<Url> {
        let target = self.blob_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(map_io)?;
        }

        let temp_path = target.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes).await.map_err(map_io)?;
        tokio::fs::rename(&temp_path, &target)
            .await
            .map_err(map_io)?;

        let absolute = std::path::absolute(&target).map_err(map_io)?;
        let url = Url::from_file_path(&absolute).map_err(|()| RemoteError::Storage {
            message: format!("cannot express {} as a URL", absolute.display()),
        })?;

        debug!(%url, "Stored blob");
        Ok(url)
    }

    /// Read a blob by the URL [`put_blob`](Self::put_blob) returned.
    #[instrument(skip(self))]
    pub async fn get_blob(&self, url: &str) -> Result<Vec<u8>> {
        let not_found = || Error::BlobNotFound {
            url: url.to_string(),
        };

        let path = Url::parse(url)
            .ok()
            .filter(|u| u.scheme() == "file")
            .and_then(|u| u.to_file_path().ok())
            .ok_or_else(not_found)?;

        let blobs_dir = std::path::absolute(self.blobs_dir()).map_err(map_io)?;
        let inside = path
            .strip_prefix(&blobs_dir)
            .is_ok_and(|rest| rest.components().all(|c| matches!(c, Component::Normal(_))));
        if !inside {
            return Err(not_found());
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(map_io(e)),
        }
    }

    // ========================================================================
    // Outbox
    // ========================================================================

    /// Append a message to the outbox log.
    pub fn append_outbox(&self, to: &Email, kind: OutboxKind) -> Result<()> {
        let message = OutboxMessage {
            to: to.to_string(),
            kind,
            time: Utc::now().to_rfc3339(),
        };
        let line = serde_json::to_string(&message).map_err(map_encode)?;
        let outbox_path = self.outbox_path();

        self.with_lock(&self.root.join("outbox.lock"), || {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&outbox_path)
                .map_err(map_io)?;

            writeln!(file, "{}", line).map_err(map_io)?;
            file.sync_data().map_err(map_io)?;
            Ok(())
        })?;

        debug!(to = %to, ?kind, "Queued outbox message");
        Ok(())
    }

    /// Read every outbox message, oldest first.
    pub fn read_outbox(&self) -> Result<Vec<OutboxMessage>> {
        let path = self.outbox_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_io(e)),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|e| map_decode(&path, e)))
            .collect()
    }
}
