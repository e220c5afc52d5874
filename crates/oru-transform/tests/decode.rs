//! End-to-end decoding tests.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use oru_model::{DecodeError, LabResult, TimestampSource};
use oru_transform::{Decoder, FixedClock, decode_message};

const REFERENCE: &str = "MSH|^~\\&|LIS|MAIN|EHR|MAIN|20240101120000||ORU^R01^ORU_R01|CTRL-1|P|2.5.1\r\
PID|1||MRN-1^^^MAIN^MR||DOE^JANE\r\
OBR|1|PLC-1|FIL-1|80048^BMP\r\
OBX|1|NM|2345-7^Glucose||98|mg/dL^mg/dL|70-99|N|||F|||20240101110000\r\
NTE|1||fasting\r\
OBX|2|NM|2951-2^Sodium||141|^mmol/L|135-145|N|||F|||202401011100\r\
PID|2||MRN-2||ROE\r\
OBR|1|PLC-2||85025^CBC\r\
OBX|1|NM|6690-2^WBC||12.1|^10*3/uL|4.0-11.0|H|||F|||20240101\r";

fn processing_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
}

fn decode(text: &str) -> Result<Vec<LabResult>, DecodeError> {
    decode_message(text, FixedClock(processing_time()))
}

fn message(body: &[&str]) -> String {
    let mut text = String::from("MSH|^~\\&|LIS|MAIN|||20240101120000||ORU^R01|1|P|2.5.1");
    for line in body {
        text.push('\r');
        text.push_str(line);
    }
    text
}

fn render(results: &[LabResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{:?}",
                r.result_key(),
                r.patient_pk(),
                r.last_name,
                r.first_name,
                r.test_description,
                r.result_value,
                r.units,
                r.reference_range,
                r.abnormal_flag,
                r.result_status,
                r.observation_time_source,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_reference_message_snapshot() {
    let results = decode(REFERENCE).unwrap();
    insta::assert_snapshot!(render(&results), @r"
    FIL-1#2345-7#20240101110000|MRN-1|DOE|JANE|Glucose|98|mg/dL|70-99|N|F|Seconds
    FIL-1#2951-2#20240101110000|MRN-1|DOE|JANE|Sodium|141|mmol/L|135-145|N|F|Minutes
    PLC-2#6690-2#20240101000000|MRN-2|ROE||WBC|12.1|10*3/uL|4.0-11.0|H|F|Date
    ");
}

#[test]
fn test_one_order_two_observations_yield_two_records() {
    let results = decode(&message(&[
        "PID|1||MRN-9||SMITH^ANN",
        "OBR|1|PLC-9|FIL-9",
        "OBX|1|NM|GLU^Glucose||101|^mg/dL|70-99|H|||F|||20240301080000",
        "OBX|2|NM|K^Potassium||4.1|^mmol/L|3.5-5.1|N|||F|||20240301080000",
    ]))
    .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.patient_id == "MRN-9"));
    assert!(results.iter().all(|r| r.order_id == "FIL-9"));
    assert_eq!(results[0].test_code, "GLU");
    assert_eq!(results[0].result_value, "101");
    assert_eq!(results[1].test_code, "K");
    assert_eq!(results[1].result_value, "4.1");
}

#[test]
fn test_blank_input_is_malformed() {
    for text in ["", " ", "\r\n", "\n\t  \r"] {
        assert!(matches!(
            decode(text),
            Err(DecodeError::MalformedMessage { .. })
        ));
    }
}

#[test]
fn test_other_message_type_is_reported_verbatim() {
    let text = REFERENCE.replacen("ORU^R01^ORU_R01", "ORM^O01", 1);
    let err = decode(&text).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnsupportedMessageType {
            declared: "ORM^O01".to_string()
        }
    );
    assert!(err.to_string().contains("ORM^O01"));
}

#[test]
fn test_missing_given_name_is_empty_not_an_error() {
    let results = decode(&message(&["PID|1||MRN-3||SOLO", "OBR|1||F", "OBX|1|ST|X||y"])).unwrap();
    assert_eq!(results[0].last_name, "SOLO");
    assert_eq!(results[0].first_name, "");
}

#[test]
fn test_observation_times_by_precision_and_fallback() {
    let results = decode(&message(&[
        "PID|1||P",
        "OBR|1||F",
        "OBX|1|ST|DATE||v||||||F|||20240101",
        "OBX|2|ST|MINUTE||v||||||F|||202401011230",
        "OBX|3|ST|BLANK||v||||||F",
        "OBX|4|ST|JUNK||v||||||F|||2024-01-01T12:30",
    ]))
    .unwrap();

    assert_eq!(
        results[0].observation_date_time,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(
        results[1].observation_date_time,
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap()
    );
    for fallback in &results[2..] {
        assert_eq!(fallback.observation_date_time, processing_time());
        assert_eq!(
            fallback.observation_time_source,
            TimestampSource::ProcessingTime
        );
    }
}

#[test]
fn test_filler_order_number_wins_over_placer() {
    let results = decode(&message(&[
        "PID|1||P",
        "OBR|1|PLACER-1|FILLER-1",
        "OBX|1|ST|A||x",
    ]))
    .unwrap();
    assert_eq!(results[0].order_id, "FILLER-1");
}

#[test]
fn test_duplicate_observations_collide_without_dedup() {
    let obx = "OBX|1|NM|GLU^Glucose||98|^mg/dL|||||F|||20240101110000";
    let results = decode(&message(&["PID|1||P", "OBR|1||F", obx, obx])).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].result_key(), results[1].result_key());
    assert_eq!(results[0].result_key(), "F#GLU#20240101110000");
}

#[test]
fn test_order_without_observations_emits_nothing() {
    let results = decode(&message(&[
        "PID|1||P",
        "OBR|1||EMPTY",
        "OBR|2||FULL",
        "OBX|1|ST|A||x",
    ]))
    .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].order_id, "FULL");
}

#[test]
fn test_structural_error_returns_no_partial_results() {
    let err = decode(&message(&["PID|1||P", "OBR|1||F", "OBX|1|ST|A||x", "PID|2||Q", "OBX|1|ST|B||y"]))
        .unwrap_err();
    assert!(matches!(err, DecodeError::MissingGroup { .. }));
}

#[test]
fn test_decoder_reports_header() {
    let decoded = Decoder::with_clock(FixedClock(processing_time()))
        .decode(REFERENCE)
        .unwrap();
    assert_eq!(decoded.header.control_id, "CTRL-1");
    assert_eq!(decoded.header.sending_facility, "MAIN");
    assert_eq!(decoded.results.len(), 3);
}

#[test]
fn test_decoder_is_shareable_across_threads() {
    let decoder = Decoder::with_clock(FixedClock(processing_time()));
    let expected = decoder.decode(REFERENCE).unwrap();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| decoder.decode(REFERENCE).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

proptest! {
    #[test]
    fn test_decoding_is_deterministic(
        patient in "[A-Z0-9]{1,8}",
        value in "[a-z0-9 .]{0,12}",
        time in prop_oneof![
            Just(String::new()),
            "20[0-9]{2}0[1-9][0-2][0-9]",
            "20[0-9]{2}0[1-9][0-2][0-9][01][0-9][0-5][0-9]",
        ],
        observations in 1usize..6,
    ) {
        let mut body = vec![format!("PID|1||{patient}"), "OBR|1||ORD".to_string()];
        for i in 0..observations {
            body.push(format!("OBX|{i}|ST|T{i}||{value}||||||F|||{time}"));
        }
        let lines: Vec<&str> = body.iter().map(String::as_str).collect();
        let text = message(&lines);

        let first = decode(&text).unwrap();
        let second = decode(&text).unwrap();
        prop_assert_eq!(first.len(), observations);
        prop_assert_eq!(first, second);
    }
}
