//! Tracing-subscriber initialization for binaries embedding this crate.
//! The teacher's own binary entrypoints weren't part of the retrieval pack,
//! so this follows the standard `tracing-subscriber` `EnvFilter` + `fmt`
//! convention rather than a specific teacher file.

use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber honoring `RUST_LOG`, defaulting to
/// `info` when unset. Safe to call once per process; a second call is a
/// no-op error that this function swallows rather than panics on.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
