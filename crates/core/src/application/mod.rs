// Application Layer - Signal tasks, status mapping and the reconciliation loop

pub mod mapper;
pub mod reconciler;
pub mod shutdown;
pub mod signal_task;

// Re-exports
pub use mapper::{MapperConfig, StatusMapper};
pub use reconciler::{CycleSummary, Reconciler, ReconcilerConfig};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};
pub use signal_task::SignalTask;
