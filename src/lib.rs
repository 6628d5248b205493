//! Kondex - symbol cross-references for Clojure buffers
//!
//! Fetches analysis results from an external clj-kondo style analyzer,
//! indexes them per buffer, and answers "what is under the cursor" and
//! "where else does it occur" queries.

pub mod analysis;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use session::{Location, Session, Source};
