pub mod codec;
pub mod download;
pub mod error;
pub mod record_store;
