//! Defensive extraction of clinical values from composite fields.
//!
//! Every extractor returns owned text and never fails: a missing field,
//! repetition or component yields an empty string.

use oru_model::{Delimiters, Segment, fields};

/// Patient identity read once per patient-result group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFields {
    pub patient_id: String,
    pub last_name: String,
    pub first_name: String,
}

impl PatientFields {
    pub fn extract(pid: &Segment) -> Self {
        Self {
            patient_id: patient_id(pid),
            last_name: last_name(pid),
            first_name: first_name(pid),
        }
    }
}

/// Observation values read from one OBX segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFields {
    pub test_code: String,
    pub test_description: String,
    pub result_value: String,
    pub units: String,
    pub reference_range: String,
    pub abnormal_flag: String,
    pub result_status: String,
    /// Raw OBX-14 text, normalized separately.
    pub observed_at: String,
}

impl ObservationFields {
    pub fn extract(obx: &Segment, delimiters: &Delimiters) -> Self {
        Self {
            test_code: fields::OBSERVATION_ID.read(obx).to_string(),
            test_description: fields::OBSERVATION_TEXT.read(obx).to_string(),
            result_value: result_value(obx, delimiters),
            units: fields::UNITS.read(obx).to_string(),
            reference_range: fields::REFERENCE_RANGE.read(obx).to_string(),
            abnormal_flag: fields::ABNORMAL_FLAGS.read(obx).to_string(),
            result_status: fields::RESULT_STATUS.read(obx).to_string(),
            observed_at: fields::OBSERVATION_TIME.read(obx).trim().to_string(),
        }
    }
}

/// PID-3: ID number of the first identifier.
pub fn patient_id(pid: &Segment) -> String {
    fields::PATIENT_ID.read(pid).to_string()
}

/// PID-5: surname of the first name's family-name component.
pub fn last_name(pid: &Segment) -> String {
    fields::PATIENT_FAMILY_NAME.read(pid).to_string()
}

/// PID-5: given name of the first name.
pub fn first_name(pid: &Segment) -> String {
    fields::PATIENT_GIVEN_NAME.read(pid).to_string()
}

/// Order identifier of an OBR segment.
///
/// Policy: the filler order number (OBR-3) takes precedence over the placer
/// order number (OBR-2) whenever it is non-empty. Both absent gives empty
/// text.
pub fn order_id(obr: &Segment) -> String {
    let filler = fields::FILLER_ORDER_NUMBER.read(obr).trim();
    if !filler.is_empty() {
        return filler.to_string();
    }
    fields::PLACER_ORDER_NUMBER.read(obr).trim().to_string()
}

/// OBX-5: the whole first repetition as text, whatever OBX-2 declares.
///
/// Coded or structured values keep their components, joined with the
/// message's component separator.
pub fn result_value(obx: &Segment, delimiters: &Delimiters) -> String {
    if !obx.is(fields::OBSERVATION_VALUE.segment) {
        return String::new();
    }
    obx.field(fields::OBSERVATION_VALUE.field)
        .and_then(|field| field.first())
        .map(|rep| rep.joined(delimiters))
        .unwrap_or_default()
}
