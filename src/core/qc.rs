use serde::Serialize;
use std::fmt;

/// Declared-vs-parsed record count check. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QcReport {
    pub declared: String,
    pub parsed_count: i64,
    pub parse_failed: bool,
    /// (label, count) per record kind, e.g. ("SMS", 10)
    pub actual: Vec<(String, usize)>,
    pub ok: bool,
}

impl QcReport {
    pub fn total_actual(&self) -> usize {
        self.actual.iter().map(|(_, n)| n).sum()
    }
}

fn reconcile_counts(declared: &str, actual: Vec<(String, usize)>) -> QcReport {
    let (parsed_count, parse_failed) = match declared.trim().parse::<i64>() {
        Ok(n) => (n, false),
        Err(_) => {
            tracing::warn!("Error converting reported count to integer: {:?}", declared);
            (0, true)
        }
    };

    let total = actual.iter().map(|(_, n)| *n as i64).sum::<i64>();
    QcReport {
        declared: declared.to_string(),
        parsed_count,
        parse_failed,
        actual,
        ok: !parse_failed && total == parsed_count,
    }
}

pub fn reconcile(declared: &str, actual_sms: usize, actual_mms: usize) -> QcReport {
    reconcile_counts(
        declared,
        vec![("SMS".to_string(), actual_sms), ("MMS".to_string(), actual_mms)],
    )
}

pub fn reconcile_calls(declared: &str, actual_calls: usize) -> QcReport {
    reconcile_counts(declared, vec![("call".to_string(), actual_calls)])
}

impl fmt::Display for QcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XML File Validation / QC")?;
        writeln!(f, "{}", "=".repeat(63))?;
        writeln!(
            f,
            "Record count reported by SMS Backup and Restore app: {}",
            self.declared
        )?;
        if self.parse_failed {
            writeln!(f, "Error converting reported count to integer: {}", self.declared)?;
        }
        for (label, count) in &self.actual {
            writeln!(f, "Actual # {} records identified: {}", label, count)?;
        }
        write!(
            f,
            "Total actual records identified: {} ... {}",
            self.total_actual(),
            if self.ok { "OK" } else { "DISCREPANCY DETECTED" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_matching_count() {
        let report = reconcile("2", 1, 1);
        assert!(report.ok);
        assert_eq!(report.parsed_count, 2);
        assert_eq!(report.total_actual(), 2);
    }

    #[test]
    fn test_reconcile_mismatch() {
        let report = reconcile("2", 1, 0);
        assert!(!report.ok);
        assert!(report.to_string().ends_with("DISCREPANCY DETECTED"));
    }

    #[test]
    fn test_reconcile_unparseable_count() {
        let report = reconcile("lots", 0, 0);
        assert!(report.parse_failed);
        assert_eq!(report.parsed_count, 0);
        // never treated as a match, even with zero records
        assert!(!report.ok);
    }

    #[test]
    fn test_reconcile_trims_whitespace() {
        assert!(reconcile(" 3 ", 2, 1).ok);
    }

    #[test]
    fn test_reconcile_calls() {
        let report = reconcile_calls("5", 5);
        assert!(report.ok);
        let text = report.to_string();
        assert!(text.contains("Actual # call records identified: 5"));
        assert!(text.ends_with("OK"));
    }
}
