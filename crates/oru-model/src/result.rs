use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::RecordKeys;

/// How the observation timestamp of a result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    /// Parsed from `yyyyMMddHHmmss`.
    Seconds,
    /// Parsed from `yyyyMMddHHmm`.
    Minutes,
    /// Parsed from `yyyyMMdd`; time is midnight.
    Date,
    /// OBX-14 was empty or unparsable and the processing time was used.
    ProcessingTime,
}

impl TimestampSource {
    pub const fn is_fallback(self) -> bool {
        matches!(self, Self::ProcessingTime)
    }
}

/// One decoded observation, flattened with its patient and order context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabResult {
    pub patient_id: String,
    pub last_name: String,
    pub first_name: String,
    pub order_id: String,
    pub test_code: String,
    pub test_description: String,
    pub result_value: String,
    pub units: String,
    pub reference_range: String,
    pub abnormal_flag: String,
    pub observation_date_time: DateTime<Utc>,
    pub observation_time_source: TimestampSource,
    pub result_status: String,
}

impl LabResult {
    /// Partition key: the patient identifier unchanged.
    pub fn patient_pk(&self) -> &str {
        &self.patient_id
    }

    /// Sort key: order, test code and second-precision observation time.
    pub fn result_key(&self) -> String {
        RecordKeys::result_key(
            &self.order_id,
            &self.test_code,
            &self.observation_date_time,
        )
    }

    pub fn keys(&self) -> RecordKeys {
        RecordKeys::for_result(self)
    }
}
