// Port Layer - Interfaces for external dependencies

pub mod output_channel;
pub mod status_fetcher;

// Re-exports
pub use output_channel::{ChannelId, OutputChannel};
pub use status_fetcher::{FetchError, StatusFetcher};
