use crate::adapters::LocalStorage;
use crate::app::pipelines::BackupPipeline;
use crate::core::etl::EtlEngine;
use crate::core::ConfigProvider;
use crate::domain::model::{BackupKind, RunSummary};
use crate::utils::error::{ErrorSeverity, EtlError};
use std::path::Path;
use std::time::Instant;

/// Outcome of processing every configured input file.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub summaries: Vec<RunSummary>,
    /// Inputs that were reported and not processed.
    pub skipped: Vec<String>,
    pub worst: Option<ErrorSeverity>,
}

impl BatchReport {
    pub fn exit_code(&self) -> i32 {
        self.worst.map_or(0, ErrorSeverity::exit_code)
    }

    fn record_error(&mut self, e: &EtlError) {
        tracing::warn!("{}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());
        self.worst = self.worst.max(Some(e.severity()));
    }
}

/// Run every input file through its own pipeline, one after another.
///
/// A file that cannot be resolved, has an unexpected name or fails to parse is
/// reported and the remaining files still run.
pub async fn run_files<C>(config: &C, monitor: bool) -> BatchReport
where
    C: ConfigProvider + Clone,
{
    let start = Instant::now();
    let storage = LocalStorage::new(config.output_path());
    println!("Output directory set to {}", storage.base_path().display());

    let mut report = BatchReport::default();

    for file in config.input_files() {
        let path = match std::fs::canonicalize(file) {
            Ok(path) => path,
            Err(e) => {
                report.record_error(&EtlError::IoError(e));
                report.skipped.push(file.clone());
                continue;
            }
        };

        let Some(kind) = BackupKind::from_path(&path) else {
            report.record_error(&EtlError::UnexpectedFileName { file: file.clone() });
            report.skipped.push(file.clone());
            continue;
        };

        println!(
            "\nLoading {} into memory and parsing (this may take a little while) ...",
            file
        );

        // 每個檔案建立獨立的管道與引擎
        let source = path.to_string_lossy().into_owned();
        let pipeline = BackupPipeline::new(storage.clone(), config.clone(), source, kind);
        let engine = EtlEngine::new_with_monitoring(pipeline, monitor);

        match engine.run().await {
            Ok(summary) => {
                print_summary(&summary, config);
                if summary.has_output_errors() {
                    report.worst = report.worst.max(Some(ErrorSeverity::Medium));
                }
                report.summaries.push(summary);
            }
            Err(e) => {
                tracing::error!(
                    "❌ Processing {} failed: {} (Category: {:?}, Severity: {:?})",
                    file,
                    e,
                    e.category(),
                    e.severity()
                );
                report.record_error(&e);
            }
        }
    }

    println!(
        "\nCompleted in {:.2} seconds.",
        start.elapsed().as_secs_f64()
    );
    println!("📁 Output saved to {}", storage.base_path().display());

    report
}

fn print_summary<C: ConfigProvider>(summary: &RunSummary, config: &C) {
    println!("\n{}", summary.qc);

    for table in &summary.tables {
        match &table.error {
            None => println!("{} rows written to {}", table.rows, table.file_name),
            Some(error) => println!("❌ {}", error),
        }
    }

    if let Some(attachments) = &summary.attachments {
        let images_dir = Path::new(config.output_path()).join(config.images_dir());
        println!("\nDecoding MMS images into {}", images_dir.display());
        for failure in &attachments.failures {
            println!("\t{}", failure);
        }
        println!(
            "{} images were identified and {} were successfully written",
            attachments.identified, attachments.written
        );
    }

    if let Some(archive) = &summary.archive {
        println!("📦 Archive written to {}", archive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::utils::validation::Validate;
    use tempfile::TempDir;

    const CALLS: &str = r#"<calls count="1">
  <call number="3125551212" duration="5" date="1000000000000" type="1" readable_date="" contact_name="(Unknown)" />
</calls>"#;

    fn config_with(dir: &TempDir, files: &[&str]) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.output.path = dir.path().to_str().unwrap().to_string();
        config.output.write_summary = false;
        config.input.files = files
            .iter()
            .map(|name| dir.path().join(name).to_str().unwrap().to_string())
            .collect();
        config
    }

    #[tokio::test]
    async fn test_unexpected_file_is_skipped_and_others_run() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a backup").unwrap();
        std::fs::write(dir.path().join("calls-1.xml"), CALLS).unwrap();
        let config = config_with(&dir, &["notes.txt", "calls-1.xml"]);

        config.validate().unwrap();
        let report = run_files(&config, false).await;

        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].kind, BackupKind::Calls);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].ends_with("notes.txt"));
        assert_eq!(report.worst, Some(ErrorSeverity::Low));
        assert_eq!(report.exit_code(), 0);
        assert!(dir.path().join("calls.tsv").exists());
    }

    #[tokio::test]
    async fn test_parse_failure_sets_exit_code_and_continues() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("sms-1.xml"), "<smses count=\"1\"><sms").unwrap();
        std::fs::write(dir.path().join("calls-1.xml"), CALLS).unwrap();
        let config = config_with(&dir, &["sms-1.xml", "calls-1.xml"]);

        let report = run_files(&config, false).await;

        assert_eq!(report.summaries.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.worst, Some(ErrorSeverity::High));
        assert_eq!(report.exit_code(), 1);
    }
}
