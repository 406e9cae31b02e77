//! The outer execution facade: wires the tool registry, scheduler, graph
//! executor, and storage layer into the small operation set a caller needs
//! (create, inspect, pause/resume, cancel, delete).

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod facade;
pub mod logging;

pub use facade::Executor;
pub use logging::init_tracing;
