use crate::domain::model::{AssessmentRecord, LayoutConfig, Scene};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn output_path(&self) -> &str;
    fn layout(&self) -> LayoutConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<AssessmentRecord>>;
    async fn transform(&self, records: Vec<AssessmentRecord>) -> Result<Scene>;
    async fn load(&self, scene: Scene) -> Result<String>;
}
