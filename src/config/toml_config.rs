use crate::domain::model::TableKind;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub sms_file: String,
    pub mms_file: String,
    pub calls_file: String,
    pub images_dir: String,
    pub decode_images: bool,
    pub archive: Option<String>,
    pub write_summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            sms_file: TableKind::Sms.default_file_name().to_string(),
            mms_file: TableKind::Mms.default_file_name().to_string(),
            calls_file: TableKind::Calls.default_file_name().to_string(),
            images_dir: "images".to_string(),
            decode_images: true,
            archive: None,
            write_summary: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json: bool,
    pub monitor: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env-var pattern"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_output_dir("output.path", &self.output.path)?;
        validation::validate_input_files("input.files", &self.input.files)?;

        for (field, value) in [
            ("output.sms_file", &self.output.sms_file),
            ("output.mms_file", &self.output.mms_file),
            ("output.calls_file", &self.output.calls_file),
            ("output.images_dir", &self.output.images_dir),
        ] {
            validation::validate_non_empty_string(field, value)?;
        }

        if let Some(archive) = &self.output.archive {
            validation::validate_path("output.archive", archive)?;
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn input_files(&self) -> &[String] {
        &self.input.files
    }

    fn table_file_name(&self, kind: TableKind) -> &str {
        match kind {
            TableKind::Sms => &self.output.sms_file,
            TableKind::Mms => &self.output.mms_file,
            TableKind::Calls => &self.output.calls_file,
        }
    }

    fn images_dir(&self) -> &str {
        &self.output.images_dir
    }

    fn decode_images(&self) -> bool {
        self.output.decode_images
    }

    fn archive_name(&self) -> Option<&str> {
        self.output.archive.as_deref()
    }

    fn write_summary(&self) -> bool {
        self.output.write_summary
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
