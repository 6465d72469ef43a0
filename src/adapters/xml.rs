//! Decoding of export documents into domain records.
//!
//! SMS Backup & Restore writes characters outside the BMP (mostly emoji) as a
//! pair of character references (decimal or hex) holding UTF-16 surrogates, e.g.
//! `&#55357;&#56832;`. Those are not legal XML, so they are folded into the
//! literal character before the document reaches the parser.

use crate::domain::model::{Backup, BackupKind, CallLog, MessageSet};
use crate::utils::error::Result;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xD800..=0xDBFF;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xDC00..=0xDFFF;

fn char_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"&#(?:([0-9]{1,7})|[xX]([0-9A-Fa-f]{1,6}));").expect("valid char-ref pattern")
    })
}

struct CharRef {
    start: usize,
    end: usize,
    value: u32,
}

/// Replace surrogate-pair character references with the character they encode.
///
/// Lone surrogates become U+FFFD; every other reference is left for the parser.
pub fn repair_surrogate_entities(xml: &str) -> Cow<'_, str> {
    let refs: Vec<CharRef> = char_ref_pattern()
        .captures_iter(xml)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            // 十進位或十六進位
            let value = match (caps.get(1), caps.get(2)) {
                (Some(dec), _) => dec.as_str().parse::<u32>().ok()?,
                (None, Some(hex)) => u32::from_str_radix(hex.as_str(), 16).ok()?,
                (None, None) => return None,
            };
            (HIGH_SURROGATES.contains(&value) || LOW_SURROGATES.contains(&value)).then_some(
                CharRef {
                    start: whole.start(),
                    end: whole.end(),
                    value,
                },
            )
        })
        .collect();

    if refs.is_empty() {
        return Cow::Borrowed(xml);
    }

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;
    let mut i = 0;
    while i < refs.len() {
        let current = &refs[i];
        out.push_str(&xml[cursor..current.start]);

        let pair = refs
            .get(i + 1)
            .filter(|next| {
                next.start == current.end
                    && HIGH_SURROGATES.contains(&current.value)
                    && LOW_SURROGATES.contains(&next.value)
            })
            .and_then(|next| {
                let code = 0x10000 + ((current.value - 0xD800) << 10) + (next.value - 0xDC00);
                char::from_u32(code).map(|c| (c, next.end))
            });

        match pair {
            Some((c, end)) => {
                out.push(c);
                cursor = end;
                i += 2;
            }
            None => {
                out.push(char::REPLACEMENT_CHARACTER);
                cursor = current.end;
                i += 1;
            }
        }
    }
    out.push_str(&xml[cursor..]);

    Cow::Owned(out)
}

pub fn parse_messages(xml: &str) -> Result<MessageSet> {
    let repaired = repair_surrogate_entities(xml);
    Ok(quick_xml::de::from_str(&repaired)?)
}

pub fn parse_calls(xml: &str) -> Result<CallLog> {
    let repaired = repair_surrogate_entities(xml);
    Ok(quick_xml::de::from_str(&repaired)?)
}

pub fn parse_backup(kind: BackupKind, xml: &str) -> Result<Backup> {
    match kind {
        BackupKind::Messages => parse_messages(xml).map(Backup::Messages),
        BackupKind::Calls => parse_calls(xml).map(Backup::Calls),
    }
}
