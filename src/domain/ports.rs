use crate::domain::model::{Backup, RunSummary, TableKind, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn input_files(&self) -> &[String];
    fn table_file_name(&self, kind: TableKind) -> &str;
    fn images_dir(&self) -> &str;
    fn decode_images(&self) -> bool;
    fn archive_name(&self) -> Option<&str>;
    fn write_summary(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Backup>;
    async fn transform(&self, backup: Backup) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<RunSummary>;
}
