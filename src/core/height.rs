//! Chain height abstraction

use crate::core::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait HeightOracle: Send + Sync {
    async fn current(&self) -> Result<u64>;
}
