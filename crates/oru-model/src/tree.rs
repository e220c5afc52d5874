//! Group structure reconstructed from the flat segment stream.

use serde::{Deserialize, Serialize};

use crate::grammar::GroupLevel;
use crate::segment::{Delimiters, Segment};

/// Values read from the MSH segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub message_code: String,
    pub trigger_event: String,
    pub message_structure: String,
    pub control_id: String,
    pub version: String,
    pub sending_application: String,
    pub sending_facility: String,
}

/// One group: the segment that opened it, any attached segments the grammar
/// does not decode (NTE and similar) and its nested groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub level: GroupLevel,
    pub segment: Segment,
    pub attached: Vec<Segment>,
    pub children: Vec<Group>,
}

impl Group {
    pub fn new(level: GroupLevel, segment: Segment) -> Self {
        Self {
            level,
            segment,
            attached: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A navigated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTree {
    pub delimiters: Delimiters,
    pub header: MessageHeader,
    pub header_segment: Segment,
    /// Segments between the header and the first group (SFT and similar).
    pub leading: Vec<Segment>,
    /// Patient-result groups in message order.
    pub groups: Vec<Group>,
}

impl MessageTree {
    /// Number of observation groups across all patients and orders.
    pub fn observation_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|patient| &patient.children)
            .map(|order| order.children.len())
            .sum()
    }
}
