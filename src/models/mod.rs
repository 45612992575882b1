//! Data carried through the upload pipeline.
//!
//! Nothing here is persisted by this service: requests live for one HTTP call
//! and stored objects are owned by the bucket once written.

pub mod object;
pub mod upload;
