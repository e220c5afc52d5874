//! Splits raw HL7 v2 text into typed segments.
//!
//! Delimiters are read from the header: the field separator is the character
//! right after `MSH`, and MSH-2 lists the component, repetition, escape and
//! subcomponent characters in that order. Missing characters fall back to the
//! standard `|^~\&`.
//!
//! Values are split on raw delimiters first and unescaped afterwards, so an
//! escaped delimiter (`\F\`, `\S\`, ...) never splits a value.

use oru_model::{Component, DecodeError, Delimiters, Field, Repetition, Result, Segment};
use tracing::trace;

/// Code of the header segment.
pub const HEADER_CODE: &str = "MSH";

/// Segments of one message and the delimiters they were split with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizedMessage {
    pub delimiters: Delimiters,
    pub segments: Vec<Segment>,
    /// The header line as received, before splitting or unescaping.
    pub header_line: String,
}

impl TokenizedMessage {
    /// Raw text of header field `MSH-n` exactly as written, escapes and
    /// trailing separators included.
    pub fn raw_header_field(&self, position: usize) -> Option<&str> {
        // Split index 1 is MSH-2; MSH-1 is the separator itself.
        if position < 2 {
            return None;
        }
        self.header_line
            .split(self.delimiters.field)
            .nth(position - 1)
    }
}

/// Tokenizes a whole message.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedMessage`] when the input is empty or
/// whitespace-only, or when the first segment is not `MSH`.
pub fn tokenize(text: &str) -> Result<TokenizedMessage> {
    if text.trim().is_empty() {
        return Err(DecodeError::malformed("message is empty"));
    }

    let mut lines = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Err(DecodeError::malformed("message is empty"));
    };
    if !header_line.starts_with(HEADER_CODE) {
        let found: String = header_line.chars().take(3).collect();
        return Err(DecodeError::malformed(format!(
            "first segment must be {HEADER_CODE}, found '{found}'"
        )));
    }

    let delimiters = read_delimiters(header_line);
    let mut segments = vec![tokenize_header(header_line, &delimiters)];
    segments.extend(lines.map(|line| tokenize_segment(line, &delimiters)));

    trace!(segment_count = segments.len(), "tokenized message");
    Ok(TokenizedMessage {
        delimiters,
        segments,
        header_line: header_line.to_string(),
    })
}

/// Reads MSH-1 and MSH-2 from the raw header line.
pub fn read_delimiters(header_line: &str) -> Delimiters {
    let defaults = Delimiters::default();
    let mut chars = header_line.chars().skip(HEADER_CODE.len());
    let Some(field) = chars.next() else {
        return defaults;
    };
    let mut encoding = chars.take_while(|c| *c != field);
    Delimiters {
        field,
        component: encoding.next().unwrap_or(defaults.component),
        repetition: encoding.next().unwrap_or(defaults.repetition),
        escape: encoding.next().unwrap_or(defaults.escape),
        subcomponent: encoding.next().unwrap_or(defaults.subcomponent),
    }
}

/// MSH is special: MSH-1 is the separator itself and MSH-2 holds the
/// encoding characters verbatim.
fn tokenize_header(line: &str, delimiters: &Delimiters) -> Segment {
    let rest = line
        .get(HEADER_CODE.len()..)
        .and_then(|rest| rest.strip_prefix(delimiters.field))
        .unwrap_or_default();
    let mut parts = rest.split(delimiters.field);
    let encoding = parts.next().unwrap_or_default();

    let mut fields = vec![
        Field::from_text(delimiters.field.to_string()),
        Field::from_text(encoding),
    ];
    fields.extend(parts.map(|raw| tokenize_field(raw, delimiters)));
    Segment::new(HEADER_CODE, fields)
}

fn tokenize_segment(line: &str, delimiters: &Delimiters) -> Segment {
    let mut parts = line.split(delimiters.field);
    let code = parts.next().unwrap_or_default().trim();
    let fields = parts.map(|raw| tokenize_field(raw, delimiters)).collect();
    Segment::new(code, fields)
}

fn tokenize_field(raw: &str, delimiters: &Delimiters) -> Field {
    Field {
        repetitions: raw
            .split(delimiters.repetition)
            .map(|rep| Repetition {
                components: rep
                    .split(delimiters.component)
                    .map(|component| Component {
                        subcomponents: component
                            .split(delimiters.subcomponent)
                            .map(|value| unescape(value, delimiters))
                            .collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Resolves HL7 escape sequences in a leaf value.
///
/// `\F\ \S\ \T\ \R\ \E\` become the delimiters they name, `\Xhh..\` becomes
/// the hex-encoded bytes, `\H\` and `\N\` highlight markers are dropped.
/// Any other sequence, or an unterminated one, is kept as written.
pub fn unescape(value: &str, delimiters: &Delimiters) -> String {
    let escape = delimiters.escape;
    if !value.contains(escape) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(escape) {
        out.push_str(&rest[..start]);
        let after = &rest[start + escape.len_utf8()..];
        let Some(end) = after.find(escape) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let sequence = &after[..end];
        match sequence {
            "F" => out.push(delimiters.field),
            "S" => out.push(delimiters.component),
            "T" => out.push(delimiters.subcomponent),
            "R" => out.push(delimiters.repetition),
            "E" => out.push(escape),
            "H" | "N" => {}
            _ => match decode_hex(sequence) {
                Some(decoded) => out.push_str(&decoded),
                None => {
                    out.push(escape);
                    out.push_str(sequence);
                    out.push(escape);
                }
            },
        }
        rest = &after[end + escape.len_utf8()..];
    }
    out.push_str(rest);
    out
}

fn decode_hex(sequence: &str) -> Option<String> {
    let digits = sequence.strip_prefix('X')?;
    if digits.is_empty() || digits.len() % 2 != 0 {
        return None;
    }
    let bytes = (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok())
        .collect::<Option<Vec<u8>>>()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "MSH|^~\\&|LAB|HOSP|||20240101120000||ORU^R01|MSG1|P|2.5.1\r\
                          PID|||MRN-1^^^HOSP~ALT-9||DOE^JANE\r\
                          OBR|1|PLC-1|FIL-1|CBC\r\
                          OBX|1|NM|WBC^White cells||7.2|10*3/uL|4.0-11.0|N|||F|||20240101113000\r";

    #[test]
    fn test_empty_input_is_malformed() {
        for input in ["", "   ", "\r\n\r\n", "\t"] {
            let err = tokenize(input).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedMessage { .. }), "{input:?}");
        }
    }

    #[test]
    fn test_first_segment_must_be_header() {
        let err = tokenize("PID|||123\rMSH|^~\\&").unwrap_err();
        assert_eq!(
            err,
            DecodeError::malformed("first segment must be MSH, found 'PID'")
        );
    }

    #[test]
    fn test_splits_segments_on_any_line_break() {
        let text = "MSH|^~\\&|A\nPID|||1\r\nOBR|1\rOBX|1\n\n";
        let message = tokenize(text).unwrap();
        let codes: Vec<&str> = message.segments.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, ["MSH", "PID", "OBR", "OBX"]);
    }

    #[test]
    fn test_header_fields_keep_hl7_numbering() {
        let message = tokenize(SAMPLE).unwrap();
        let msh = &message.segments[0];
        assert_eq!(msh.value(1, 1), "|");
        assert_eq!(msh.value(2, 1), "^~\\&");
        assert_eq!(msh.value(3, 1), "LAB");
        assert_eq!(msh.value(9, 1), "ORU");
        assert_eq!(msh.value(9, 2), "R01");
        assert_eq!(msh.value(12, 1), "2.5.1");
    }

    #[test]
    fn test_fields_split_into_repetitions_and_components() {
        let message = tokenize(SAMPLE).unwrap();
        let pid = &message.segments[1];
        let ids = pid.field(3).unwrap();
        assert_eq!(ids.repetitions.len(), 2);
        assert_eq!(ids.value(1), "MRN-1");
        assert_eq!(ids.repetitions[0].value(4), "HOSP");
        assert_eq!(ids.repetitions[1].value(1), "ALT-9");
        assert_eq!(pid.value(5, 2), "JANE");
    }

    #[test]
    fn test_custom_delimiters_are_honoured() {
        let text = "MSH#$*!%#APP\rPID###ID1$X*ID2##SMITH$JOHN%J";
        let message = tokenize(text).unwrap();
        assert_eq!(
            message.delimiters,
            Delimiters {
                field: '#',
                component: '$',
                repetition: '*',
                escape: '!',
                subcomponent: '%',
            }
        );
        let pid = &message.segments[1];
        assert_eq!(pid.value(3, 1), "ID1");
        assert_eq!(pid.value(3, 2), "X");
        assert_eq!(pid.field(3).unwrap().repetitions[1].value(1), "ID2");
        let name = pid.field(5).unwrap().value(2);
        assert_eq!(name, "JOHN");
    }

    #[test]
    fn test_raw_header_field_is_verbatim() {
        let message = tokenize("MSH|^~\\&|LAB||||||ADT\\S\\X^A01^|CTRL\rPID|||1").unwrap();
        assert_eq!(message.raw_header_field(3), Some("LAB"));
        assert_eq!(message.raw_header_field(2), Some("^~\\&"));
        assert_eq!(message.raw_header_field(9), Some("ADT\\S\\X^A01^"));
        assert_eq!(message.raw_header_field(10), Some("CTRL"));
        assert_eq!(message.raw_header_field(1), None);
        assert_eq!(message.raw_header_field(40), None);
    }

    #[test]
    fn test_short_header_falls_back_to_defaults() {
        assert_eq!(read_delimiters("MSH"), Delimiters::default());
        let partial = read_delimiters("MSH|^~");
        assert_eq!(partial.component, '^');
        assert_eq!(partial.repetition, '~');
        assert_eq!(partial.escape, '\\');
        assert_eq!(partial.subcomponent, '&');
    }

    #[test]
    fn test_escaped_delimiters_do_not_split() {
        let message = tokenize("MSH|^~\\&\rOBX|1|ST|NOTE||a\\F\\b\\S\\c\\T\\d\\R\\e\\E\\f").unwrap();
        let obx = &message.segments[1];
        assert_eq!(obx.value(5, 1), "a|b^c&d~e\\f");
        assert_eq!(obx.field(5).unwrap().first().unwrap().components.len(), 1);
    }

    #[test]
    fn test_unescape_handles_hex_highlight_and_unknown() {
        let d = Delimiters::default();
        assert_eq!(unescape("\\X4142\\", &d), "AB");
        assert_eq!(unescape("\\H\\bold\\N\\", &d), "bold");
        assert_eq!(unescape("x\\.br\\y", &d), "x\\.br\\y");
        assert_eq!(unescape("open\\F", &d), "open\\F");
        assert_eq!(unescape("plain", &d), "plain");
    }
}
