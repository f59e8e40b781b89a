pub mod adapters;
pub mod derived;
pub mod engine;
pub mod error;
pub mod query;
