//! Version-agnostic description of the ORU^R01 message structure.
//!
//! The navigator walks segments using only this table: which segment is the
//! header, which segment opens each group level and how levels nest. HL7
//! version differences stay confined to the table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::segment::Segment;

/// Nesting levels of an observation-result message, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupLevel {
    PatientResult,
    OrderObservation,
    Observation,
}

impl GroupLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PatientResult => "patient-result",
            Self::OrderObservation => "order-observation",
            Self::Observation => "observation",
        }
    }
}

impl fmt::Display for GroupLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A group level and the segment that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRule {
    pub level: GroupLevel,
    pub opener: &'static str,
}

/// Location of a value inside a segment: field, component and subcomponent,
/// all 1-based. Extraction always reads the first repetition unless the
/// caller walks repetitions itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath {
    pub segment: &'static str,
    pub field: usize,
    pub component: usize,
    pub subcomponent: usize,
}

impl FieldPath {
    pub const fn new(segment: &'static str, field: usize) -> Self {
        Self {
            segment,
            field,
            component: 1,
            subcomponent: 1,
        }
    }

    pub const fn component(self, component: usize) -> Self {
        Self { component, ..self }
    }

    pub const fn subcomponent(self, subcomponent: usize) -> Self {
        Self {
            subcomponent,
            ..self
        }
    }

    /// Reads the value at this path from the first repetition of the field.
    ///
    /// Returns empty text when the segment type differs or any level is
    /// missing.
    pub fn read<'a>(&self, segment: &'a Segment) -> &'a str {
        if !segment.is(self.segment) {
            return "";
        }
        segment
            .field(self.field)
            .and_then(|field| field.first())
            .and_then(|rep| rep.component(self.component))
            .and_then(|component| component.subcomponent(self.subcomponent))
            .unwrap_or_default()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}.{}", self.segment, self.field, self.component)?;
        if self.subcomponent > 1 {
            write!(f, ".{}", self.subcomponent)?;
        }
        Ok(())
    }
}

/// Field positions read by the extractors.
pub mod fields {
    use super::FieldPath;

    pub const MESSAGE_TYPE: FieldPath = FieldPath::new("MSH", 9);
    pub const SENDING_APPLICATION: FieldPath = FieldPath::new("MSH", 3);
    pub const SENDING_FACILITY: FieldPath = FieldPath::new("MSH", 4);
    pub const CONTROL_ID: FieldPath = FieldPath::new("MSH", 10);
    pub const VERSION_ID: FieldPath = FieldPath::new("MSH", 12);

    pub const PATIENT_ID: FieldPath = FieldPath::new("PID", 3);
    pub const PATIENT_FAMILY_NAME: FieldPath = FieldPath::new("PID", 5);
    pub const PATIENT_GIVEN_NAME: FieldPath = FieldPath::new("PID", 5).component(2);

    pub const PLACER_ORDER_NUMBER: FieldPath = FieldPath::new("OBR", 2);
    pub const FILLER_ORDER_NUMBER: FieldPath = FieldPath::new("OBR", 3);

    pub const OBSERVATION_ID: FieldPath = FieldPath::new("OBX", 3);
    pub const OBSERVATION_TEXT: FieldPath = FieldPath::new("OBX", 3).component(2);
    pub const OBSERVATION_VALUE: FieldPath = FieldPath::new("OBX", 5);
    pub const UNITS: FieldPath = FieldPath::new("OBX", 6).component(2);
    pub const REFERENCE_RANGE: FieldPath = FieldPath::new("OBX", 7);
    pub const ABNORMAL_FLAGS: FieldPath = FieldPath::new("OBX", 8);
    pub const RESULT_STATUS: FieldPath = FieldPath::new("OBX", 11);
    pub const OBSERVATION_TIME: FieldPath = FieldPath::new("OBX", 14);
}

/// Structure table for one supported message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageGrammar {
    pub header: &'static str,
    pub message_code: &'static str,
    pub trigger_event: &'static str,
    /// Group levels from outermost to innermost. Each level nests directly
    /// inside the previous one.
    pub groups: &'static [GroupRule],
}

/// ORU^R01 observation-result grammar.
pub const ORU_R01: MessageGrammar = MessageGrammar {
    header: "MSH",
    message_code: "ORU",
    trigger_event: "R01",
    groups: &[
        GroupRule {
            level: GroupLevel::PatientResult,
            opener: "PID",
        },
        GroupRule {
            level: GroupLevel::OrderObservation,
            opener: "OBR",
        },
        GroupRule {
            level: GroupLevel::Observation,
            opener: "OBX",
        },
    ],
};

impl MessageGrammar {
    /// Nesting depth (0 = outermost) of the group opened by a segment code.
    pub fn depth_of(&self, segment_code: &str) -> Option<usize> {
        self.groups.iter().position(|rule| rule.opener == segment_code)
    }

    pub fn rule(&self, depth: usize) -> Option<&GroupRule> {
        self.groups.get(depth)
    }

    /// Returns true when the declared code and trigger equal this grammar's
    /// exactly. HL7 codes are upper case; no case folding or trimming.
    pub fn accepts(&self, message_code: &str, trigger_event: &str) -> bool {
        self.message_code == message_code && self.trigger_event == trigger_event
    }
}
