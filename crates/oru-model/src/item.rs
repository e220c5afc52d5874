//! Attribute map written to the key-value store for each result.

use std::collections::BTreeMap;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::result::LabResult;

pub const ATTR_PATIENT_ID: &str = "PatientId";
pub const ATTR_RESULT_KEY: &str = "ResultKey";

/// Flat string attributes of one stored result, addressed by
/// (`PatientId`, `ResultKey`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreItem {
    pub attributes: BTreeMap<String, String>,
}

impl StoreItem {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn partition_key(&self) -> &str {
        self.get(ATTR_PATIENT_ID).unwrap_or_default()
    }

    pub fn sort_key(&self) -> &str {
        self.get(ATTR_RESULT_KEY).unwrap_or_default()
    }
}

impl From<&LabResult> for StoreItem {
    fn from(result: &LabResult) -> Self {
        let keys = result.keys();
        let observed = result
            .observation_date_time
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let attributes = [
            (ATTR_PATIENT_ID, keys.patient_pk),
            (ATTR_RESULT_KEY, keys.result_key),
            ("OrderId", result.order_id.clone()),
            ("TestCode", result.test_code.clone()),
            ("TestDescription", result.test_description.clone()),
            ("ResultValue", result.result_value.clone()),
            ("Units", result.units.clone()),
            ("ReferenceRange", result.reference_range.clone()),
            ("AbnormalFlag", result.abnormal_flag.clone()),
            ("ObservationDateTime", observed),
            ("ResultStatus", result.result_status.clone()),
            ("PatientLastName", result.last_name.clone()),
            ("PatientFirstName", result.first_name.clone()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
        Self { attributes }
    }
}
