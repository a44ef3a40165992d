// Service exports
pub mod cache;
pub mod memory;
pub mod messages;
pub mod postgres;
pub mod source;

pub use cache::CachedSource;
pub use memory::InMemorySource;
pub use messages::reason_text;
pub use postgres::PostgresClient;
pub use source::{CandidateSource, SourceError};
