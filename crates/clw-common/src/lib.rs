//! CLW Common Library
//!
//! Shared error handling and logging setup for the CLW workspace.
//!
//! # Overview
//!
//! This crate provides the two concerns every CLW component needs before it
//! can do real work:
//!
//! - **Error Handling**: the shared [`CommonError`] type and result alias
//! - **Logging**: tracing subscriber configuration with optional daily
//!   rotating file output
//!
//! # Example
//!
//! ```no_run
//! use clw_common::logging::{init_logging, LogConfig};
//! use tracing::info;
//!
//! fn main() -> clw_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CommonError, Result};
