pub mod client;
pub mod response;

pub use client::{HttpNumberSource, SourceStatus};
pub use response::parse_numbers;

use async_trait::async_trait;
use winavg_core::{NumberKind, Result};

/// Anything that can produce a batch of numbers for a [`NumberKind`].
///
/// `Ok(vec![])` means the source answered with no numbers; any failure to
/// get an answer at all is an `Err`.
#[async_trait]
pub trait NumberSource: Send + Sync {
    async fn fetch(&self, kind: NumberKind) -> Result<Vec<i64>>;
}
