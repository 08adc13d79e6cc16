pub mod config;
pub mod discover;
pub mod emit;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod table;
pub mod transform;
pub mod verify;
