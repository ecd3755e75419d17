//! Request and response bodies of the REST APIs.

use serde::{Deserialize, Serialize};

use nudge_core::{FieldValue, Fields};

// ============================================================================
// Account API
// ============================================================================

/// accounts:signInWithPassword
pub const SIGN_IN: &str = "signInWithPassword";

/// accounts:signUp
pub const SIGN_UP: &str = "signUp";

/// accounts:sendOobCode
pub const SEND_OOB_CODE: &str = "sendOobCode";

/// Request body for signInWithPassword and signUp.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Response from signInWithPassword and signUp.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResponse {
    pub local_id: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for sendOobCode.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OobCodeRequest<'a> {
    pub request_type: &'a str,
    pub email: &'a str,
}

/// Response from the token endpoint. Uses snake_case on the wire.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub user_id: String,
}

// ============================================================================
// Document API
// ============================================================================

/// A document as the API returns it.
#[derive(Debug, Deserialize)]
pub struct ApiDocument {
    /// Full resource name, ending in `<collection>/<id>`.
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

/// Body of a document write.
#[derive(Debug, Serialize)]
pub struct DocumentBody<'a> {
    pub fields: &'a Fields,
}

/// Request body for runQuery.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest<'a> {
    pub structured_query: StructuredQuery<'a>,
}

#[derive(Debug, Serialize)]
pub struct StructuredQuery<'a> {
    pub from: [CollectionSelector<'a>; 1],
    #[serde(rename = "where")]
    pub filter: QueryFilter<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector<'a> {
    pub collection_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilter<'a> {
    pub field_filter: FieldFilter<'a>,
}

#[derive(Debug, Serialize)]
pub struct FieldFilter<'a> {
    pub field: FieldReference<'a>,
    pub op: &'static str,
    pub value: &'a FieldValue,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference<'a> {
    pub field_path: &'a str,
}

/// One element of the runQuery response stream. Elements without a
/// document only carry progress information.
#[derive(Debug, Deserialize)]
pub struct RunQueryItem {
    #[serde(default)]
    pub document: Option<ApiDocument>,
}

// ============================================================================
// Blob API
// ============================================================================

/// Response from an object upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub name: String,
    /// Comma-separated download tokens.
    #[serde(default)]
    pub download_tokens: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Error envelope shared by all the APIs.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
