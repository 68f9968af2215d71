//! # Typelog Store
//!
//! A typed, append-only event log on top of redb.
//!
//! Events are recorded under a named type. Each type is stored in its own
//! namespace, and every event gets the next sequence number of that
//! namespace. Replaying a type visits its events in the order they were
//! appended.
//!
//! ## Features
//!
//! - **EventLogger**: append with [`EventLogger::log`], replay with
//!   [`EventLogger::iterate`]
//! - **StoreHandle**: owns the database file and its lifecycle
//! - **Codec**: pluggable payload serialization ([`PostcardCodec`],
//!   [`JsonCodec`])
//! - **Record**: per-record accessor with typed decoding
//!
//! ## Example
//!
//! ```rust,no_run
//! use serde::{Deserialize, Serialize};
//! use typelog_store::{EventLogger, StoreError};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Signup {
//!     user: String,
//! }
//!
//! fn main() -> Result<(), StoreError> {
//!     let logger = EventLogger::open("events.redb")?;
//!
//!     logger.log("signup", &Signup { user: "alice".into() })?;
//!     logger.log("signup", &Signup { user: "bob".into() })?;
//!
//!     logger.iterate("signup", |record| -> Result<(), StoreError> {
//!         let signup: Signup = record.decode()?;
//!         println!("{} {}", record.sequence(), signup.user);
//!         Ok(())
//!     })?;
//!
//!     logger.close()
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handle;
pub mod key;
pub mod logger;
pub mod record;

// Re-exports
pub use codec::{Codec, JsonCodec, PostcardCodec};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use handle::StoreHandle;
pub use logger::EventLogger;
pub use record::Record;

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_send_sync<T: Send + Sync>() {}

    /// The logger is shared across threads behind an `Arc`
    #[test]
    fn test_logger_is_send_sync() {
        _assert_send_sync::<EventLogger>();
        _assert_send_sync::<EventLogger<JsonCodec>>();
    }
}
