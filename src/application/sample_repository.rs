// Repository trait for boiler sample access
use crate::domain::sample::Sample;
use async_trait::async_trait;

#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Snapshot of the whole log, in file order
    async fn load_samples(&self) -> anyhow::Result<Vec<Sample>>;
}
