//! Pivate Eye HTTP adapter
//!
//! Fetches a Jenkins-style job list and turns it into a [`StatusSnapshot`].
//!
//! # Example
//!
//! ```no_run
//! use pivate_core::port::StatusFetcher;
//! use pivate_infra_http::HttpStatusFetcher;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = HttpStatusFetcher::new(
//!         "http://jenkins.local:8080/api/json",
//!         Duration::from_secs(5),
//!     )?;
//!
//!     let snapshot = fetcher.fetch().await?;
//!     println!("build is {:?}", snapshot.status_of("build"));
//!
//!     Ok(())
//! }
//! ```
//!
//! [`StatusSnapshot`]: pivate_core::domain::StatusSnapshot

mod client;
mod error;
mod types;

pub use client::HttpStatusFetcher;
pub use error::transport_error;
pub use types::{parse_job_list, JobEntry, JobListDocument};
