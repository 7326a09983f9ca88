//! Configuration modules for the Scolaris API.
//!
//! Each submodule handles one aspect of configuration, loaded from
//! environment variables with sensible defaults.
//!
//! # Modules
//!
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`server`]: HTTP listener configuration

pub mod cors;
pub mod server;
