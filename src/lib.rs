//! Screenshot uploader: accepts a multipart file upload, checks the shared
//! secret and file rules, writes the file to an S3 bucket under a generated
//! key and answers with the public CDN URL.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
