//! Relay DNS Domain Layer
pub mod config;
pub mod errors;
pub mod query;
pub mod record_type;
pub mod wire;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::RelayError;
pub use query::RelayQuery;
pub use record_type::RecordType;
pub use wire::{QuestionInfo, ResourceRecord, ResponseFlags};
