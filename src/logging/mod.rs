//! Logger setup for the viewer binary.
//!
//! Library code only emits through the `log` macros. The viewer installs an
//! `env_logger` backend, filtered by the `log_filter` entry of its config
//! file or by RUST_LOG.

mod init;

pub use init::{init_logging, LoggingConfig};
