//! ProfileManager tests.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use nudge_core::{Avatar, Collection, Error, Profile};
use nudge_sync::{AuthSession, ProfileManager, SyncConfig};

use common::{MemoryAuth, MemoryBlobs, MemoryDocuments, uid};

struct Fixture {
    auth: Arc<MemoryAuth>,
    documents: Arc<MemoryDocuments>,
    blobs: Arc<MemoryBlobs>,
    profiles: ProfileManager,
    session: AuthSession,
}

async fn fixture(user: Option<&str>) -> Fixture {
    let auth = MemoryAuth::new();
    auth.set_user(user.map(uid));
    let documents = MemoryDocuments::new();
    let blobs = MemoryBlobs::new();

    let session = AuthSession::observe(auth.as_ref());
    let profiles = ProfileManager::new(
        &session,
        documents.clone(),
        blobs.clone(),
        SyncConfig::default(),
    );

    Fixture {
        auth,
        documents,
        blobs,
        profiles,
        session,
    }
}

fn alice() -> Profile {
    Profile {
        name: "Alice".to_string(),
        contact_number: "555-0100".to_string(),
        hobby: "climbing".to_string(),
        avatar_url: None,
    }
}

#[tokio::test]
async fn test_fetch_before_save_is_none() {
    let f = fixture(Some("alice")).await;
    assert_eq!(f.profiles.fetch().await.unwrap(), None);
}

#[tokio::test]
async fn test_save_without_avatar_round_trips() {
    let f = fixture(Some("alice")).await;

    let saved = f.profiles.save(&alice(), None).await.unwrap();

    assert_eq!(saved, alice());
    assert_eq!(f.profiles.fetch().await.unwrap(), Some(alice()));
    assert!(
        f.documents
            .fields(&Collection::profiles(), "alice")
            .is_some()
    );
    assert_eq!(f.blobs.uploads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_save_with_avatar_uploads_first() {
    let f = fixture(Some("alice")).await;
    let avatar = Avatar::new(vec![0x89, b'P', b'N', b'G'], "image/png");

    let saved = f.profiles.save(&alice(), Some(avatar)).await.unwrap();

    assert_eq!(
        saved.avatar_url.as_deref(),
        Some("mem://profileImages/alice.png")
    );
    let fetched = f.profiles.fetch().await.unwrap().unwrap();
    assert_eq!(fetched, saved);
    assert_eq!(
        f.profiles.fetch_avatar(&fetched).await.unwrap(),
        Some(vec![0x89, b'P', b'N', b'G'])
    );
}

#[tokio::test]
async fn test_failed_upload_writes_nothing() {
    let f = fixture(Some("alice")).await;
    f.blobs.set_failing(true);

    let err = f
        .profiles
        .save(&alice(), Some(Avatar::new(vec![1, 2, 3], "image/jpeg")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RemoteUnavailable(_)));
    assert_eq!(f.documents.len(), 0);
}

#[tokio::test]
async fn test_profile_without_avatar_has_nothing_to_download() {
    let f = fixture(Some("alice")).await;
    assert_eq!(f.profiles.fetch_avatar(&alice()).await.unwrap(), None);
}

#[tokio::test]
async fn test_requires_signed_in_user() {
    let f = fixture(None).await;

    assert!(matches!(
        f.profiles.fetch().await,
        Err(Error::NotAuthenticated)
    ));
    assert!(matches!(
        f.profiles.save(&alice(), None).await,
        Err(Error::NotAuthenticated)
    ));
    assert_eq!(f.documents.calls.total(), 0);
}

#[tokio::test]
async fn test_follows_sign_out() {
    let f = fixture(Some("alice")).await;
    f.profiles.save(&alice(), None).await.unwrap();

    f.auth.set_user(None);
    f.session.wait_for(|state| state.is_none()).await;

    assert!(matches!(
        f.profiles.fetch().await,
        Err(Error::NotAuthenticated)
    ));
}
