pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::TableKind;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sbr-etl")]
#[command(about = "Parse SMS Backup & Restore XML exports into TSV tables and MMS images")]
pub struct CliConfig {
    /// Path(s) to sms-*.xml or calls-*.xml backup files
    pub files: Vec<String>,

    #[arg(
        short = 'd',
        long = "output-dir",
        default_value = ".",
        help = "Directory path for parsed output"
    )]
    pub output_path: String,

    #[arg(long, default_value = "images", help = "Image directory, relative to the output directory")]
    pub images_dir: String,

    #[arg(long, help = "Skip decoding MMS images")]
    pub no_images: bool,

    #[arg(long, help = "Also bundle the TSV tables into this zip archive")]
    pub archive: Option<String>,

    #[arg(long, help = "Do not write <backup>.summary.json")]
    pub no_summary: bool,

    #[arg(short, long, help = "Load settings from a TOML file")]
    pub config: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory after each phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
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
        &self.images_dir
    }

    fn decode_images(&self) -> bool {
        !self.no_images
    }

    fn archive_name(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn write_summary(&self) -> bool {
        !self.no_summary
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_output_dir("output-dir", &self.output_path)?;
        validation::validate_input_files("files", &self.files)?;
        validation::validate_non_empty_string("images-dir", &self.images_dir)?;
        if let Some(archive) = &self.archive {
            validation::validate_path("archive", archive)?;
        }
        Ok(())
    }
}
