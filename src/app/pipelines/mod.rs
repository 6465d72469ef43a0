pub mod backup_pipeline;

pub use backup_pipeline::BackupPipeline;
