//! Storage keys derived from an assembled result.
//!
//! `ResultKey` is unique only when no two observations in a message share
//! order, test code and observation second. Collisions are passed through to
//! the sink unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::LabResult;

/// Separator between the parts of a result key.
pub const KEY_SEPARATOR: char = '#';

/// Timestamp layout used inside result keys (`yyyyMMddHHmmss`).
pub const KEY_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Partition and sort key of one stored result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordKeys {
    pub patient_pk: String,
    pub result_key: String,
}

impl RecordKeys {
    pub fn for_result(result: &LabResult) -> Self {
        Self {
            patient_pk: result.patient_pk().to_string(),
            result_key: result.result_key(),
        }
    }

    pub fn result_key(order_id: &str, test_code: &str, observed_at: &DateTime<Utc>) -> String {
        format!(
            "{order_id}{sep}{test_code}{sep}{time}",
            sep = KEY_SEPARATOR,
            time = observed_at.format(KEY_TIMESTAMP_FORMAT)
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_result_key_uses_second_precision() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 5).unwrap();
        assert_eq!(
            RecordKeys::result_key("ORD-7", "GLU", &at),
            "ORD-7#GLU#20240101123005"
        );
    }

    #[test]
    fn test_empty_parts_keep_separators() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(RecordKeys::result_key("", "", &at), "##20240101000000");
    }
}
