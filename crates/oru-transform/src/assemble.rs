//! Flattens a navigated message into one [`LabResult`] per observation.

use chrono::{DateTime, Utc};
use oru_model::{Group, LabResult, MessageTree};
use tracing::{trace, warn};

use crate::datetime::normalize_observation_time;
use crate::extract::{ObservationFields, PatientFields, order_id};

/// Walks the tree depth-first (patient, then order, then observation) and
/// emits results in segment order.
///
/// Patient fields are read once per patient-result group and the order id
/// once per order-observation group. Groups without observations emit
/// nothing. `processing_time` replaces any missing or unparsable OBX-14.
pub fn assemble(tree: &MessageTree, processing_time: DateTime<Utc>) -> Vec<LabResult> {
    let mut results = Vec::with_capacity(tree.observation_count());
    for patient_group in &tree.groups {
        let patient = PatientFields::extract(&patient_group.segment);
        for order_group in &patient_group.children {
            let order = order_id(&order_group.segment);
            for observation_group in &order_group.children {
                results.push(assemble_one(
                    tree,
                    &patient,
                    &order,
                    observation_group,
                    processing_time,
                ));
            }
        }
    }
    results
}

fn assemble_one(
    tree: &MessageTree,
    patient: &PatientFields,
    order_id: &str,
    observation: &Group,
    processing_time: DateTime<Utc>,
) -> LabResult {
    let fields = ObservationFields::extract(&observation.segment, &tree.delimiters);
    let time = normalize_observation_time(&fields.observed_at, processing_time);
    if time.source.is_fallback() {
        warn!(
            control_id = %tree.header.control_id,
            order_id = %order_id,
            test_code = %fields.test_code,
            raw = %fields.observed_at,
            "observation time missing or unparsable; using processing time"
        );
    }
    trace!(order_id = %order_id, test_code = %fields.test_code, "assembled result");

    LabResult {
        patient_id: patient.patient_id.clone(),
        last_name: patient.last_name.clone(),
        first_name: patient.first_name.clone(),
        order_id: order_id.to_string(),
        test_code: fields.test_code,
        test_description: fields.test_description,
        result_value: fields.result_value,
        units: fields.units,
        reference_range: fields.reference_range,
        abnormal_flag: fields.abnormal_flag,
        observation_date_time: time.at,
        observation_time_source: time.source,
        result_status: fields.result_status,
    }
}
