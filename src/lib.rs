pub mod config;
pub mod engine;
pub mod extract;
pub mod manifest;
pub mod source;
pub mod urn;
pub mod walker;
