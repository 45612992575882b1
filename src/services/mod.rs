pub mod auth;
pub mod key_generator;
pub mod storage_service;
pub mod upload_service;
pub mod validator;
