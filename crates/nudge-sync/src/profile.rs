//! Profile persistence for the signed-in user.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument};

use nudge_core::{
    AuthState, Avatar, BlobStore, DocumentRef, DocumentStore, Error, Profile, Result, UserId,
};

use crate::config::SyncConfig;
use crate::remote::with_timeout;
use crate::session::AuthSession;

/// Blob path prefix for uploaded avatars.
const AVATAR_PREFIX: &str = "profileImages";

/// Reads and writes the signed-in user's profile document and avatar.
///
/// The profile lives at `profiles/<uid>`; the avatar at
/// `profileImages/<uid>.<ext>` in blob storage.
#[derive(Clone)]
pub struct ProfileManager {
    auth: watch::Receiver<AuthState>,
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    config: SyncConfig,
}

impl ProfileManager {
    pub fn new(
        session: &AuthSession,
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            auth: session.subscribe(),
            documents,
            blobs,
            config,
        }
    }

    /// The stored profile, or `None` if the user never saved one.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Option<Profile>> {
        let user = self.user()?;
        let reference = self.reference(&user);

        let document = with_timeout(
            self.config.remote_timeout,
            "get",
            self.documents.get(&reference),
        )
        .await?;

        document
            .map(|document| Profile::from_fields(&document.fields))
            .transpose()
    }

    /// Write the whole profile, uploading `avatar` first when given.
    ///
    /// Returns the profile as stored, with `avatar_url` pointing at the new
    /// upload. If the upload fails nothing is written.
    #[instrument(skip(self, profile, avatar))]
    pub async fn save(&self, profile: &Profile, avatar: Option<Avatar>) -> Result<Profile> {
        let user = self.user()?;
        let mut profile = profile.clone();

        if let Some(avatar) = avatar {
            let path = format!("{AVATAR_PREFIX}/{user}.{}", avatar.extension());
            debug!(%path, len = avatar.bytes.len(), "Uploading avatar");

            let url = with_timeout(
                self.config.remote_timeout,
                "upload",
                self.blobs.upload(&path, avatar.bytes, &avatar.content_type),
            )
            .await?;
            profile.avatar_url = Some(url);
        }

        with_timeout(
            self.config.remote_timeout,
            "write",
            self.documents.write(
                &self.config.profiles_collection,
                &user.document_id(),
                &profile.to_fields(),
            ),
        )
        .await?;

        debug!(%user, "Saved profile");
        Ok(profile)
    }

    /// Download the avatar referenced by `profile`, if it has one.
    #[instrument(skip(self, profile))]
    pub async fn fetch_avatar(&self, profile: &Profile) -> Result<Option<Vec<u8>>> {
        self.user()?;

        let Some(url) = profile.avatar_url.as_deref() else {
            return Ok(None);
        };

        let bytes =
            with_timeout(self.config.remote_timeout, "download", self.blobs.download(url)).await?;
        Ok(Some(bytes))
    }

    fn user(&self) -> Result<UserId> {
        self.auth.borrow().clone().ok_or(Error::NotAuthenticated)
    }

    fn reference(&self, user: &UserId) -> DocumentRef {
        DocumentRef::new(self.config.profiles_collection.clone(), user.document_id())
    }
}

impl std::fmt::Debug for ProfileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileManager")
            .field("user", &*self.auth.borrow())
            .finish_non_exhaustive()
    }
}
