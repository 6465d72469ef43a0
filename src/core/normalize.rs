//! Field normalizers.
//!
//! Every function here is pure and total: malformed input yields a best-effort
//! string, never an error. Value tables follow the app's field documentation
//! (http://synctech.com.au/fields-in-xml-backup-files/).

use chrono::DateTime;

/// Normalize a phone number to the `13125551212` shape.
///
/// Tilde-delimited multi-number fields are returned untouched. Only formatting
/// characters are stripped; numbers of other lengths (international, short
/// codes) pass through as they are.
pub fn normalize_phone(raw: &str) -> String {
    if raw.contains('~') {
        return raw.to_string();
    }

    let number: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '(' | ')' | '+' | ' '))
        .collect();

    if number.len() == 10 && !number.starts_with('1') {
        return format!("1{}", number);
    }
    number
}

pub fn bool_string(value: i64) -> String {
    match value {
        0 => "False".to_string(),
        1 => "True".to_string(),
        other => other.to_string(),
    }
}

pub fn read_status_string(value: i64) -> &'static str {
    match value {
        0 => "Unread",
        1 => "Read",
        _ => "",
    }
}

const MESSAGE_TYPES: [&str; 6] = ["Received", "Sent", "Draft", "Outbox", "Failed", "Queued"];

pub fn message_type_string(value: i64) -> String {
    match value {
        1..=6 => MESSAGE_TYPES[(value - 1) as usize].to_string(),
        other => other.to_string(),
    }
}

pub fn status_string(value: i64) -> &'static str {
    match value {
        -1 => "None",
        0 => "Complete",
        32 => "Pending",
        64 => "Failed",
        _ => "",
    }
}

const CALL_TYPES: [&str; 6] = [
    "Incoming",
    "Outgoing",
    "Missed",
    "Voicemail",
    "Rejected",
    "Refused List",
];

pub fn call_type_string(value: i64) -> String {
    match value {
        1..=6 => CALL_TYPES[(value - 1) as usize].to_string(),
        other => other.to_string(),
    }
}

/// Render an epoch-milliseconds string as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Sub-second precision is truncated. Unparseable or out-of-range input is
/// returned unchanged.
pub fn timestamp_string(raw: &str) -> String {
    let Ok(millis) = raw.parse::<i64>() else {
        return raw.to_string();
    };

    match DateTime::from_timestamp(millis / 1000, 0) {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => raw.to_string(),
    }
}

/// Replace newlines, carriage returns and tabs with spaces so a value fits on one TSV row.
pub fn clean_body(body: &str) -> String {
    body.replace('\n', " ").replace('\r', " ").replace('\t', " ")
}
