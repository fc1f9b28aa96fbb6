//! Structured logging for pkgpush
//!
//! Thin initialization layer over `tracing` / `tracing-subscriber`:
//! pretty, compact, or JSON output, level control via config or `RUST_LOG`.
//!
//! # Example
//!
//! ```ignore
//! use pkgpush_observability::{init_tracing, LogFormat};
//!
//! fn main() {
//!     init_tracing(LogFormat::Pretty, Some("debug")).ok();
//!     tracing::info!("starting");
//! }
//! ```

pub mod config;
pub mod initialization;

pub use config::{LogConfig, LogError, LogFormat, LogOutput};
pub use initialization::{init_tracing, init_tracing_with_config};
