//! Records as they come out of an SMS Backup & Restore export.
//!
//! Field names follow the export's attribute names through `@` renames, so the
//! XML adapter can hand these structs straight to `quick_xml::de`. Nothing in
//! here is normalized; display strings are derived at flattening time.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Root of an `sms-*.xml` export (`<smses>`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageSet {
    #[serde(rename = "@count", default)]
    pub count: String,
    #[serde(rename = "@backup_set", default)]
    pub backup_set: String,
    #[serde(rename = "@backup_date", default)]
    pub backup_date: String,
    #[serde(rename = "sms", default)]
    pub sms: Vec<SmsRecord>,
    #[serde(rename = "mms", default)]
    pub mms: Vec<MmsRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsRecord {
    #[serde(rename = "@protocol", default)]
    pub protocol: String,
    #[serde(rename = "@address", default)]
    pub address: String,
    #[serde(rename = "@type", default, deserialize_with = "lenient_int")]
    pub message_type: i64,
    #[serde(rename = "@subject", default)]
    pub subject: String,
    #[serde(rename = "@body", default)]
    pub body: String,
    #[serde(rename = "@service_center", default)]
    pub service_center: String,
    #[serde(rename = "@status", default, deserialize_with = "lenient_int")]
    pub status: i64,
    #[serde(rename = "@read", default, deserialize_with = "lenient_int")]
    pub read: i64,
    #[serde(rename = "@date", default)]
    pub date: String,
    #[serde(rename = "@locked", default, deserialize_with = "lenient_int")]
    pub locked: i64,
    #[serde(rename = "@date_sent", default)]
    pub date_sent: String,
    #[serde(rename = "@readable_date", default)]
    pub readable_date: String,
    #[serde(rename = "@contact_name", default)]
    pub contact_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MmsRecord {
    #[serde(rename = "@text_only", default, deserialize_with = "lenient_int")]
    pub text_only: i64,
    #[serde(rename = "@read", default, deserialize_with = "lenient_int")]
    pub read: i64,
    #[serde(rename = "@date", default)]
    pub date: String,
    #[serde(rename = "@locked", default, deserialize_with = "lenient_int")]
    pub locked: i64,
    #[serde(rename = "@date_sent", default)]
    pub date_sent: String,
    #[serde(rename = "@readable_date", default)]
    pub readable_date: String,
    #[serde(rename = "@contact_name", default)]
    pub contact_name: String,
    #[serde(rename = "@seen", default, deserialize_with = "lenient_int")]
    pub seen: i64,
    #[serde(rename = "@from_address", default)]
    pub from_address: String,
    #[serde(rename = "@address", default)]
    pub address: String,
    #[serde(rename = "@m_cls", default)]
    pub message_classifier: String,
    #[serde(rename = "@m_size", default)]
    pub message_size: String,
    /// `<parts><part .../></parts>`
    #[serde(default, deserialize_with = "part_list")]
    pub parts: Vec<Part>,
    /// `<addrs><addr .../></addrs>`, the group recipient list.
    #[serde(rename = "addrs", default, deserialize_with = "address_list")]
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Part {
    #[serde(rename = "@ct", default)]
    pub content_type: String,
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@fn", default)]
    pub file_name: String,
    #[serde(rename = "@cd", default)]
    pub content_display: String,
    #[serde(rename = "@text", default)]
    pub text: String,
    #[serde(rename = "@data", default)]
    pub data: String,
}

impl Part {
    pub fn is_image(&self) -> bool {
        self.content_type.contains("image/")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Address {
    #[serde(rename = "@address", default)]
    pub address: String,
}

/// Root of a `calls-*.xml` export (`<calls>`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallLog {
    #[serde(rename = "@count", default)]
    pub count: String,
    #[serde(rename = "call", default)]
    pub calls: Vec<CallRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallRecord {
    #[serde(rename = "@number", default)]
    pub number: String,
    #[serde(rename = "@duration", default, deserialize_with = "lenient_int")]
    pub duration: i64,
    #[serde(rename = "@date", default)]
    pub date: String,
    #[serde(rename = "@type", default, deserialize_with = "lenient_int")]
    pub call_type: i64,
    #[serde(rename = "@readable_date", default)]
    pub readable_date: String,
    #[serde(rename = "@contact_name", default)]
    pub contact_name: String,
}

/// Which export a file holds, decided from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Messages,
    Calls,
}

impl BackupKind {
    /// `sms-*.xml` or `calls-*.xml` (the app's default lowercase naming).
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if path.extension().and_then(|ext| ext.to_str()) != Some("xml") {
            return None;
        }
        if name.starts_with("sms-") {
            Some(BackupKind::Messages)
        } else if name.starts_with("calls-") {
            Some(BackupKind::Calls)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub enum Backup {
    Messages(MessageSet),
    Calls(CallLog),
}

impl Backup {
    pub fn kind(&self) -> BackupKind {
        match self {
            Backup::Messages(_) => BackupKind::Messages,
            Backup::Calls(_) => BackupKind::Calls,
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            Backup::Messages(set) => set.sms.len() + set.mms.len(),
            Backup::Calls(log) => log.calls.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Sms,
    Mms,
    Calls,
}

impl TableKind {
    pub fn default_file_name(self) -> &'static str {
        match self {
            TableKind::Sms => "sms.tsv",
            TableKind::Mms => "mms.tsv",
            TableKind::Calls => "calls.tsv",
        }
    }
}

/// A flattened output table, header first, rows in source order.
#[derive(Debug, Clone)]
pub struct Table {
    pub kind: TableKind,
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub qc: crate::core::qc::QcReport,
    pub tables: Vec<Table>,
    /// Kept for the image pass in `load`.
    pub source: Backup,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub kind: TableKind,
    pub file_name: String,
    pub rows: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachmentSummary {
    pub identified: usize,
    pub written: usize,
    pub failures: Vec<String>,
}

/// Everything one pipeline run produced, also written as `<stem>.summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub kind: BackupKind,
    pub qc: crate::core::qc::QcReport,
    pub tables: Vec<TableOutcome>,
    pub attachments: Option<AttachmentSummary>,
    pub archive: Option<String>,
}

impl RunSummary {
    pub fn has_output_errors(&self) -> bool {
        self.tables.iter().any(|t| t.error.is_some())
    }
}

// Integer attributes: missing -> 0, malformed -> 0 with a warning instead of
// rejecting the whole document.
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    Ok(trimmed.parse::<i64>().unwrap_or_else(|_| {
        tracing::warn!("Non-numeric attribute value '{}', using 0", raw);
        0
    }))
}

fn part_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Part>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Parts {
        #[serde(default)]
        part: Vec<Part>,
    }
    Ok(Parts::deserialize(deserializer)?.part)
}

fn address_list<'de, D>(deserializer: D) -> std::result::Result<Vec<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Addrs {
        #[serde(default)]
        addr: Vec<Address>,
    }
    Ok(Addrs::deserialize(deserializer)?.addr)
}
