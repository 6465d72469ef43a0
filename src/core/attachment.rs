use crate::domain::model::{AttachmentSummary, MessageSet, Part};
use crate::domain::ports::Storage;
use crate::utils::error::DecodeError;
use base64::Engine;
use std::path::Path;

/// Counts and failures of one image pass.
#[derive(Debug, Default)]
pub struct AttachmentReport {
    pub identified: usize,
    pub written: usize,
    pub errors: Vec<DecodeError>,
}

impl AttachmentReport {
    pub fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            identified: self.identified,
            written: self.written,
            failures: self.errors.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Extension taken from the MIME subtype, `jpeg` shortened to `jpg`.
pub fn extension_from_content_type(content_type: &str) -> &str {
    let ext = match content_type.find('/') {
        Some(slash) => &content_type[slash + 1..],
        None => content_type,
    };
    if ext == "jpeg" {
        "jpg"
    } else {
        ext
    }
}

/// Output name for an image part: `{name}_{mms_index}-{part_index}.{ext}`.
///
/// The part's own name is used as-is, extension included, so `pic.jpg`
/// becomes `pic.jpg_3-1.jpg`. The app writes the literal string `null` for a
/// missing name; the file name attribute is used instead then.
pub fn image_file_name(part: &Part, mms_index: usize, part_index: usize) -> String {
    let base = if part.name == "null" {
        &part.file_name
    } else {
        &part.name
    };
    format!(
        "{}_{}-{}.{}",
        base,
        mms_index,
        part_index,
        extension_from_content_type(&part.content_type)
    )
}

/// Decode the part's base64 payload. Line breaks inside the payload are ignored.
///
/// `output_path` only labels the error.
pub fn decode_payload(part: &Part, output_path: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = part
        .data
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|source| DecodeError::Base64 {
            path: output_path.to_string(),
            source,
        })
}

pub async fn decode_and_write_image<S: Storage>(
    storage: &S,
    part: &Part,
    output_path: &str,
) -> Result<(), DecodeError> {
    let bytes = decode_payload(part, output_path)?;

    storage
        .write_file(output_path, &bytes)
        .await
        .map_err(|source| DecodeError::Write {
            path: output_path.to_string(),
            source,
        })
}

/// Decode every image part of every MMS into `images_dir`, relative to the
/// storage root.
///
/// A failing part is recorded and skipped; the pass always visits all parts.
pub async fn decode_images<S: Storage>(
    storage: &S,
    set: &MessageSet,
    images_dir: &str,
) -> AttachmentReport {
    let mut report = AttachmentReport::default();

    for (mms_index, mms) in set.mms.iter().enumerate() {
        for (part_index, part) in mms.parts.iter().enumerate() {
            if !part.is_image() {
                continue;
            }
            report.identified += 1;

            let output_path = Path::new(images_dir)
                .join(image_file_name(part, mms_index, part_index))
                .to_string_lossy()
                .into_owned();
            match decode_and_write_image(storage, part, &output_path).await {
                Ok(()) => {
                    tracing::debug!("Wrote image {}", output_path);
                    report.written += 1;
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    report.errors.push(e);
                }
            }
        }
    }

    report
}
