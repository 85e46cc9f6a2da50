// Domain Layer - Pure values describing job statuses and output signals

pub mod error;
pub mod signal;
pub mod snapshot;

// Re-exports
pub use error::DomainError;
pub use signal::SignalSpec;
pub use snapshot::StatusSnapshot;
