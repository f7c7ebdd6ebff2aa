pub mod client;
pub mod codecs;
pub mod provision;

pub use client::{BrainFrameClient, StatusStream};
pub use provision::ensure_environment;

use anyhow::Result;

use crate::models::Snapshot;

/// Live, possibly endless, feed of zone status snapshots.
pub trait AnalyticsStream: Iterator<Item = Result<Snapshot>> {}

impl<T: Iterator<Item = Result<Snapshot>>> AnalyticsStream for T {}
