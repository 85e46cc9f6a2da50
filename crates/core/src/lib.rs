// Pivate Eye Core - Domain Logic, Ports & Reconciliation Engine
// NO infrastructure dependencies: HTTP and hardware live behind ports

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
