use crate::adapters::xml;
use crate::core::{attachment, flatten, qc, tsv};
use crate::core::{ConfigProvider, Pipeline, Storage, TransformResult};
use crate::domain::model::{Backup, BackupKind, RunSummary, TableOutcome};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

/// One backup file through extract / transform / load.
pub struct BackupPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) source: String,
    pub(crate) kind: BackupKind,
}

impl<S: Storage, C: ConfigProvider> BackupPipeline<S, C> {
    pub fn new(storage: S, config: C, source: impl Into<String>, kind: BackupKind) -> Self {
        Self {
            storage,
            config,
            source: source.into(),
            kind,
        }
    }

    /// `sms-20240101.xml` -> `sms-20240101.summary.json`
    pub fn summary_file_name(&self) -> String {
        let stem = Path::new(&self.source)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("backup");
        format!("{}.summary.json", stem)
    }

    async fn write_archive(&self, name: &str, entries: &[(String, Vec<u8>)]) -> Result<()> {
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            for (file_name, data) in entries {
                zip.start_file::<_, ()>(file_name.as_str(), FileOptions::default())?;
                zip.write_all(data)?;
            }
            // 完成並取回底層 Vec<u8>
            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing archive {} ({} bytes)", name, zip_data.len());
        self.storage.write_file(name, &zip_data).await
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BackupPipeline<S, C> {
    async fn extract(&self) -> Result<Backup> {
        tracing::debug!("Reading {:?} backup from {}", self.kind, self.source);
        let bytes = self.storage.read_file(&self.source).await?;

        // 非 UTF-8 位元組以 U+FFFD 取代
        let content = String::from_utf8_lossy(&bytes);
        xml::parse_backup(self.kind, &content)
    }

    async fn transform(&self, backup: Backup) -> Result<TransformResult> {
        let (qc, tables) = match &backup {
            Backup::Messages(set) => (
                qc::reconcile(&set.count, set.sms.len(), set.mms.len()),
                vec![flatten::sms_table(set), flatten::mms_table(set)],
            ),
            Backup::Calls(log) => (
                qc::reconcile_calls(&log.count, log.calls.len()),
                vec![flatten::calls_table(log)],
            ),
        };

        if !qc.ok {
            tracing::warn!(
                "⚠️ Declared count {} does not match {} parsed records in {}",
                qc.declared,
                qc.total_actual(),
                self.source
            );
        }

        Ok(TransformResult {
            qc,
            tables,
            source: backup,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<RunSummary> {
        let mut outcomes = Vec::with_capacity(result.tables.len());
        let mut archive_entries = Vec::new();

        // 每個表獨立寫出，單一失敗不影響其他輸出
        for table in &result.tables {
            let file_name = self.config.table_file_name(table.kind).to_string();
            let written = match tsv::render_table(table) {
                Ok(bytes) => self
                    .storage
                    .write_file(&file_name, &bytes)
                    .await
                    .map(|_| bytes),
                Err(e) => Err(e),
            };

            let error = match written {
                Ok(bytes) => {
                    tracing::info!("📄 Wrote {} rows to {}", table.rows.len(), file_name);
                    archive_entries.push((file_name.clone(), bytes));
                    None
                }
                Err(e) => {
                    let e = EtlError::OutputCreation {
                        file: file_name.clone(),
                        message: e.to_string(),
                    };
                    tracing::error!("❌ {}", e);
                    Some(e.to_string())
                }
            };

            outcomes.push(TableOutcome {
                kind: table.kind,
                file_name,
                rows: table.rows.len(),
                error,
            });
        }

        let attachments = match &result.source {
            Backup::Messages(set) if self.config.decode_images() => {
                // 圖片與表格一樣經由 Storage 寫出
                let report =
                    attachment::decode_images(&self.storage, set, self.config.images_dir()).await;
                tracing::info!(
                    "🖼️ {} images were identified and {} were successfully written",
                    report.identified,
                    report.written
                );
                Some(report.summary())
            }
            _ => None,
        };

        let archive_name = match self.config.archive_name() {
            Some(name) if archive_entries.is_empty() => {
                tracing::warn!("No tables were written, skipping archive {}", name);
                None
            }
            other => other,
        };

        let mut summary = RunSummary {
            source: self.source.clone(),
            kind: self.kind,
            qc: result.qc,
            tables: outcomes,
            attachments,
            archive: archive_name.map(str::to_string),
        };

        let summary_name = self.summary_file_name();
        if self.config.write_summary() {
            let json = serde_json::to_vec_pretty(&summary)?;
            match self.storage.write_file(&summary_name, &json).await {
                Ok(()) => tracing::debug!("Wrote run summary to {}", summary_name),
                Err(e) => tracing::error!("❌ Unable to write {}: {}", summary_name, e),
            }
            archive_entries.push((summary_name.clone(), json));
        }

        if let Some(name) = archive_name {
            if let Err(e) = self.write_archive(name, &archive_entries).await {
                tracing::error!("❌ Unable to create archive {}: {}", name, e);
                summary.archive = None;

                // 摘要不可指向不存在的壓縮檔
                if self.config.write_summary() {
                    let json = serde_json::to_vec_pretty(&summary)?;
                    self.storage.write_file(&summary_name, &json).await?;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TableKind;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        read_only: Vec<String>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                read_only: Vec::new(),
            }
        }

        async fn put_file(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if self.read_only.iter().any(|p| p == path) {
                return Err(EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("Permission denied: {}", path),
                )));
            }
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        output_path: String,
        files: Vec<String>,
        decode_images: bool,
        archive: Option<String>,
        write_summary: bool,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                output_path: ".".to_string(),
                files: vec![],
                decode_images: false,
                archive: None,
                write_summary: true,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn input_files(&self) -> &[String] {
            &self.files
        }

        fn table_file_name(&self, kind: TableKind) -> &str {
            kind.default_file_name()
        }

        fn images_dir(&self) -> &str {
            "images"
        }

        fn decode_images(&self) -> bool {
            self.decode_images
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }

        fn write_summary(&self) -> bool {
            self.write_summary
        }
    }

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn messages_xml(count: &str) -> String {
        format!(
            r#"<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>
<smses count="{count}">
  <sms protocol="0" address="+1 (312) 555-1212" date="1000000000000" type="1" subject="null" body="hi&#10;there" service_center="null" read="1" status="-1" locked="0" date_sent="0" readable_date="Sep 9, 2001" contact_name="Smith, MD" />
  <mms date="1000000001000" seen="1" address="3125551212~3125553434" text_only="0" locked="0" date_sent="0" read="1" m_size="2048" m_cls="personal" readable_date="Sep 9, 2001" contact_name="Alice, Bob" from_address="3125553434">
    <parts>
      <part seq="0" ct="image/png" name="pic" cd="null" fn="pic.png" text="null" data="{png}" />
      <part seq="1" ct="image/jpeg" name="broken" cd="null" fn="null" text="null" data="!!not base64!!" />
      <part seq="2" ct="text/plain" name="null" cd="null" fn="null" text="see pics" />
    </parts>
    <addrs>
      <addr address="3125551212" type="151" charset="106" />
      <addr address="3125553434" type="137" charset="106" />
    </addrs>
  </mms>
</smses>"#,
            count = count,
            png = PNG_B64
        )
    }

    const CALLS_XML: &str = r#"<calls count="2">
  <call number="+13125551212" duration="65" date="1000000000000" type="1" readable_date="Sep 9, 2001" contact_name="Jones, Jr" />
  <call number="3125553434" duration="0" date="1000000100000" type="3" readable_date="Sep 9, 2001" contact_name="(Unknown)" />
</calls>"#;

    async fn messages_pipeline(
        config: MockConfig,
        count: &str,
    ) -> (MockStorage, BackupPipeline<MockStorage, MockConfig>) {
        let storage = MockStorage::new();
        storage.put_file("sms-1.xml", &messages_xml(count)).await;
        let pipeline = BackupPipeline::new(storage.clone(), config, "sms-1.xml", BackupKind::Messages);
        (storage, pipeline)
    }

    #[tokio::test]
    async fn test_extract_messages() {
        let (_, pipeline) = messages_pipeline(MockConfig::new(), "2").await;

        let backup = pipeline.extract().await.unwrap();

        assert_eq!(backup.kind(), BackupKind::Messages);
        assert_eq!(backup.record_count(), 2);
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = BackupPipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            "sms-missing.xml",
            BackupKind::Messages,
        );

        let result = pipeline.extract().await;
        assert!(matches!(result, Err(EtlError::IoError(_))));
    }

    #[tokio::test]
    async fn test_transform_messages_builds_two_tables() {
        let (_, pipeline) = messages_pipeline(MockConfig::new(), "2").await;

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();

        assert!(result.qc.ok);
        assert_eq!(result.tables.len(), 2);
        assert_eq!(result.tables[0].kind, TableKind::Sms);
        assert_eq!(result.tables[0].rows.len(), 1);
        assert_eq!(result.tables[1].kind, TableKind::Mms);

        // one row per part of the single MMS
        let mms_rows = &result.tables[1].rows;
        assert_eq!(mms_rows.len(), 3);
        let part_indices: Vec<&str> = mms_rows.iter().map(|row| row[1].as_str()).collect();
        assert_eq!(part_indices, vec!["0", "1", "2"]);
        assert!(mms_rows.iter().all(|row| row[0] == "0"));
    }

    #[tokio::test]
    async fn test_transform_reports_count_mismatch() {
        let (_, pipeline) = messages_pipeline(MockConfig::new(), "5").await;

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();

        assert!(!result.qc.ok);
        assert_eq!(result.qc.parsed_count, 5);
        assert_eq!(result.qc.total_actual(), 2);
    }

    #[tokio::test]
    async fn test_load_writes_tables_and_summary() {
        let (storage, pipeline) = messages_pipeline(MockConfig::new(), "2").await;

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert!(!summary.has_output_errors());
        assert!(summary.attachments.is_none());

        let sms = String::from_utf8(storage.get_file("sms.tsv").await.unwrap()).unwrap();
        let mut lines = sms.lines();
        assert!(lines.next().unwrap().starts_with("SMS Index #\t"));
        let row = lines.next().unwrap();
        assert!(row.contains("13125551212"));
        assert!(row.contains("hi there"));
        assert!(row.contains("Smith MD"));

        assert!(storage.get_file("mms.tsv").await.is_some());

        let json = storage.get_file("sms-1.summary.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["kind"], "messages");
        assert_eq!(value["qc"]["ok"], true);
        assert_eq!(value["tables"][0]["rows"], 1);
    }

    #[tokio::test]
    async fn test_load_continues_after_table_failure() {
        let mut storage = MockStorage::new();
        storage.read_only.push("sms.tsv".to_string());
        storage.put_file("sms-1.xml", &messages_xml("2")).await;
        let pipeline = BackupPipeline::new(
            storage.clone(),
            MockConfig::new(),
            "sms-1.xml",
            BackupKind::Messages,
        );

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert!(summary.has_output_errors());
        let sms = &summary.tables[0];
        assert!(sms.error.as_deref().unwrap().contains("sms.tsv"));
        assert!(summary.tables[1].error.is_none());
        assert!(storage.get_file("mms.tsv").await.is_some());
    }

    #[tokio::test]
    async fn test_load_decodes_images_and_collects_failures() {
        let mut config = MockConfig::new();
        config.decode_images = true;
        let (storage, pipeline) = messages_pipeline(config, "2").await;

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        let attachments = summary.attachments.unwrap();
        assert_eq!(attachments.identified, 2);
        assert_eq!(attachments.written, 1);
        assert_eq!(attachments.failures.len(), 1);
        assert!(attachments.failures[0].contains("broken_0-1.jpg"));

        let image = storage.get_file("images/pic_0-0.png").await.unwrap();
        assert_eq!(&image[..4], b"\x89PNG");
        assert!(storage.get_file("images/broken_0-1.jpg").await.is_none());
    }

    #[tokio::test]
    async fn test_load_records_image_write_failure() {
        let mut config = MockConfig::new();
        config.decode_images = true;
        let mut storage = MockStorage::new();
        storage.read_only.push("images/pic_0-0.png".to_string());
        storage.put_file("sms-1.xml", &messages_xml("2")).await;
        let pipeline =
            BackupPipeline::new(storage.clone(), config, "sms-1.xml", BackupKind::Messages);

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        let attachments = summary.attachments.unwrap();
        assert_eq!(attachments.identified, 2);
        assert_eq!(attachments.written, 0);
        assert_eq!(attachments.failures.len(), 2);
        assert!(attachments.failures[0].contains("Error writing image images/pic_0-0.png"));
        // tables are unaffected
        assert!(!summary.tables.iter().any(|t| t.error.is_some()));
    }

    #[tokio::test]
    async fn test_load_writes_archive() {
        let mut config = MockConfig::new();
        config.archive = Some("export.zip".to_string());
        let (storage, pipeline) = messages_pipeline(config, "2").await;

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert_eq!(summary.archive.as_deref(), Some("export.zip"));

        let zip_data = storage.get_file("export.zip").await.unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["mms.tsv", "sms-1.summary.json", "sms.tsv"]);
    }

    #[tokio::test]
    async fn test_load_archive_failure_is_recorded() {
        let mut storage = MockStorage::new();
        storage.read_only.push("export.zip".to_string());
        storage.put_file("sms-1.xml", &messages_xml("2")).await;
        let mut config = MockConfig::new();
        config.archive = Some("export.zip".to_string());
        let pipeline =
            BackupPipeline::new(storage.clone(), config, "sms-1.xml", BackupKind::Messages);

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        let summary = pipeline.load(result).await.unwrap();

        assert!(summary.archive.is_none());
        let json = storage.get_file("sms-1.summary.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert!(value["archive"].is_null());
    }

    #[tokio::test]
    async fn test_calls_pipeline() {
        let storage = MockStorage::new();
        storage.put_file("calls-1.xml", CALLS_XML).await;
        let pipeline = BackupPipeline::new(
            storage.clone(),
            MockConfig::new(),
            "calls-1.xml",
            BackupKind::Calls,
        );

        let backup = pipeline.extract().await.unwrap();
        let result = pipeline.transform(backup).await.unwrap();
        assert!(result.qc.ok);
        assert_eq!(result.tables.len(), 1);

        let summary = pipeline.load(result).await.unwrap();
        assert!(summary.attachments.is_none());

        let calls = String::from_utf8(storage.get_file("calls.tsv").await.unwrap()).unwrap();
        assert_eq!(calls.lines().count(), 3);
        assert!(calls.contains("Missed"));
        assert!(calls.contains("Jones Jr"));
    }

    #[test]
    fn test_summary_file_name() {
        let pipeline = BackupPipeline::new(
            MockStorage::new(),
            MockConfig::new(),
            "/backups/sms-20240101.xml",
            BackupKind::Messages,
        );
        assert_eq!(pipeline.summary_file_name(), "sms-20240101.summary.json");
    }
}
