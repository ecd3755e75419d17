//! Document model spoken by the remote store.
//!
//! Documents are flat maps of typed field values addressed by a
//! [`DocumentRef`]. The JSON shape of [`FieldValue`] matches the typed-value
//! encoding used by the hosted document database, so both backends store and
//! exchange the same representation.

mod fields;
mod timestamp;
mod types;

pub use fields::{FieldValue, Fields};
pub use timestamp::Timestamp;
pub use types::{Document, DocumentRef, Filter};
