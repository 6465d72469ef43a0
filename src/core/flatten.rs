//! Flattens parsed records into table rows.
//!
//! One row per SMS and per call. MMS expand to one row per part, with the
//! message-level columns repeated on each row.

use crate::core::attachment::image_file_name;
use crate::core::contact::strip_suffix_commas;
use crate::core::normalize::{
    bool_string, call_type_string, clean_body, message_type_string, normalize_phone,
    read_status_string, status_string, timestamp_string,
};
use crate::domain::model::{CallLog, MessageSet, MmsRecord, Table, TableKind};

pub const SMS_HEADERS: &[&str] = &[
    "SMS Index #",
    "Protocol",
    "Address",
    "Type",
    "Subject",
    "Body",
    "Service Center",
    "Status",
    "Read",
    "Date",
    "Locked",
    "Date Sent",
    "Readable Date",
    "Contact Name",
];

pub const MMS_HEADERS: &[&str] = &[
    "MMS Index #",
    "MMS Part Index #",
    "Text Only",
    "Read",
    "Date",
    "Locked",
    "Date Sent",
    "Readable Date",
    "Contact Name",
    "Seen",
    "From Address",
    "Address",
    "Addresses",
    "Message Classifier",
    "Message Size",
    "Part Content Type",
    "Part Name",
    "Part File Name",
    "Part Text",
    "Part Content Display",
    "Part Output Image Name",
];

pub const CALL_HEADERS: &[&str] = &[
    "Call Index #",
    "Number",
    "Duration (Seconds)",
    "Date",
    "Type",
    "Readable Date",
    "Contact Name",
];

/// Shown in the image column for parts that are not images.
pub const NOT_AN_IMAGE: &str = "N/A";

/// Display values for the recipients of one MMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients {
    pub is_group: bool,
    /// `;`-joined for group messages
    pub contact_names: String,
    /// `;`-joined for group messages
    pub addresses: String,
    /// the `<addrs>` list, `;`-joined, empty when absent
    pub group_addresses: String,
}

impl Recipients {
    pub fn from_mms(mms: &MmsRecord) -> Self {
        let address = normalize_phone(&mms.address);
        let contact_name = strip_suffix_commas(&mms.contact_name);
        let is_group = mms.contact_name.contains(',') || address.contains('~');

        let (contact_names, addresses) = if is_group {
            let names = contact_name
                .split(',')
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(";");
            let numbers = address
                .split('~')
                .map(normalize_phone)
                .collect::<Vec<_>>()
                .join(";");
            (names, numbers)
        } else {
            (contact_name, address)
        };

        let group_addresses = mms
            .addresses
            .iter()
            .map(|a| normalize_phone(&a.address))
            .collect::<Vec<_>>()
            .join(";");

        Self {
            is_group,
            contact_names,
            addresses,
            group_addresses,
        }
    }
}

pub fn sms_table(set: &MessageSet) -> Table {
    let rows = set
        .sms
        .iter()
        .enumerate()
        .map(|(index, sms)| {
            vec![
                index.to_string(),
                sms.protocol.clone(),
                normalize_phone(&sms.address),
                message_type_string(sms.message_type),
                sms.subject.clone(),
                clean_body(&sms.body),
                normalize_phone(&sms.service_center),
                status_string(sms.status).to_string(),
                read_status_string(sms.read).to_string(),
                timestamp_string(&sms.date),
                bool_string(sms.locked),
                timestamp_string(&sms.date_sent),
                sms.readable_date.clone(),
                strip_suffix_commas(&sms.contact_name),
            ]
        })
        .collect();

    Table {
        kind: TableKind::Sms,
        headers: SMS_HEADERS,
        rows,
    }
}

pub fn mms_table(set: &MessageSet) -> Table {
    let mut rows = Vec::new();

    for (mms_index, mms) in set.mms.iter().enumerate() {
        let recipients = Recipients::from_mms(mms);
        if recipients.is_group {
            tracing::trace!("MMS {} is a group message", mms_index);
        }

        for (part_index, part) in mms.parts.iter().enumerate() {
            let image_file = if part.is_image() {
                image_file_name(part, mms_index, part_index)
            } else {
                NOT_AN_IMAGE.to_string()
            };

            rows.push(vec![
                mms_index.to_string(),
                part_index.to_string(),
                bool_string(mms.text_only),
                read_status_string(mms.read).to_string(),
                timestamp_string(&mms.date),
                bool_string(mms.locked),
                timestamp_string(&mms.date_sent),
                mms.readable_date.clone(),
                recipients.contact_names.clone(),
                bool_string(mms.seen),
                normalize_phone(&mms.from_address),
                recipients.addresses.clone(),
                recipients.group_addresses.clone(),
                mms.message_classifier.clone(),
                mms.message_size.clone(),
                part.content_type.clone(),
                part.name.clone(),
                part.file_name.clone(),
                clean_body(&part.text),
                part.content_display.clone(),
                image_file,
            ]);
        }
    }

    Table {
        kind: TableKind::Mms,
        headers: MMS_HEADERS,
        rows,
    }
}

pub fn calls_table(log: &CallLog) -> Table {
    let rows = log
        .calls
        .iter()
        .enumerate()
        .map(|(index, call)| {
            vec![
                index.to_string(),
                normalize_phone(&call.number),
                call.duration.to_string(),
                timestamp_string(&call.date),
                call_type_string(call.call_type),
                call.readable_date.clone(),
                strip_suffix_commas(&call.contact_name),
            ]
        })
        .collect();

    Table {
        kind: TableKind::Calls,
        headers: CALL_HEADERS,
        rows,
    }
}
