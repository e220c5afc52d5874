//! Rebuilds the group hierarchy implied by the flat segment order.
//!
//! Navigation is a single forward scan over the segments with a stack of open
//! groups, driven entirely by a [`MessageGrammar`]:
//!
//! - a segment that opens a grammar level closes every open group at that
//!   level or deeper, then opens a new group under the still-open parent;
//! - a segment outside the grammar is attached to the innermost open group
//!   (or kept as a leading segment before the first group) and never decoded.

use oru_model::{
    DecodeError, Group, MessageGrammar, MessageHeader, MessageTree, ORU_R01, Result, Segment,
    fields,
};
use tracing::{debug, warn};

use crate::tokenizer::TokenizedMessage;

/// Navigates a tokenized ORU^R01 message.
///
/// # Errors
///
/// - [`DecodeError::UnsupportedMessageType`] when MSH-9 is not `ORU^R01`
/// - [`DecodeError::MissingGroup`] when a segment appears before its parent
///   or the message holds no patient-result group
pub fn navigate(message: TokenizedMessage) -> Result<MessageTree> {
    navigate_with(&ORU_R01, message)
}

/// Navigates a tokenized message with an explicit grammar.
pub fn navigate_with(grammar: &MessageGrammar, message: TokenizedMessage) -> Result<MessageTree> {
    let declared_type = message
        .raw_header_field(fields::MESSAGE_TYPE.field)
        .unwrap_or_default()
        .to_string();
    let TokenizedMessage {
        delimiters,
        segments,
        ..
    } = message;
    let mut segments = segments.into_iter();

    let header_segment = match segments.next() {
        Some(segment) if segment.is(grammar.header) => segment,
        Some(segment) => {
            return Err(DecodeError::malformed(format!(
                "first segment must be {}, found '{}'",
                grammar.header, segment.code
            )));
        }
        None => return Err(DecodeError::malformed("message is empty")),
    };

    let header = read_header(&header_segment);
    if !grammar.accepts(&header.message_code, &header.trigger_event) {
        return Err(DecodeError::UnsupportedMessageType {
            declared: declared_type,
        });
    }

    let mut stack: Vec<Group> = Vec::with_capacity(grammar.groups.len());
    let mut roots: Vec<Group> = Vec::new();
    let mut leading: Vec<Segment> = Vec::new();

    for segment in segments {
        let Some(depth) = grammar.depth_of(&segment.code) else {
            match stack.last_mut() {
                Some(group) => group.attached.push(segment),
                None => leading.push(segment),
            }
            continue;
        };

        close_to(grammar, &mut stack, &mut roots, depth);
        if stack.len() < depth {
            let required = grammar
                .rule(stack.len())
                .map_or("parent", |rule| rule.level.label());
            return Err(DecodeError::MissingGroup {
                segment: segment.code,
                required,
            });
        }
        if let Some(rule) = grammar.rule(depth) {
            stack.push(Group::new(rule.level, segment));
        }
    }
    close_to(grammar, &mut stack, &mut roots, 0);

    if roots.is_empty() {
        let required = grammar
            .rule(0)
            .map_or("patient-result", |rule| rule.level.label());
        return Err(DecodeError::MissingGroup {
            segment: header_segment.code,
            required,
        });
    }

    let tree = MessageTree {
        delimiters,
        header,
        header_segment,
        leading,
        groups: roots,
    };
    debug!(
        control_id = %tree.header.control_id,
        version = %tree.header.version,
        patient_groups = tree.groups.len(),
        observations = tree.observation_count(),
        "navigated message"
    );
    Ok(tree)
}

/// Pops open groups deeper than `depth`, folding each into its parent.
fn close_to(
    grammar: &MessageGrammar,
    stack: &mut Vec<Group>,
    roots: &mut Vec<Group>,
    depth: usize,
) {
    while stack.len() > depth {
        let Some(group) = stack.pop() else {
            break;
        };
        if group.children.is_empty()
            && let Some(child) = grammar.rule(stack.len() + 1)
        {
            if stack.is_empty() {
                warn!(
                    group = %group.level,
                    missing = %child.level,
                    segment = %group.segment.code,
                    "group closed without child groups; it yields no results"
                );
            } else {
                debug!(
                    group = %group.level,
                    missing = %child.level,
                    "group closed without child groups"
                );
            }
        }
        match stack.last_mut() {
            Some(parent) => parent.children.push(group),
            None => roots.push(group),
        }
    }
}

fn read_header(msh: &Segment) -> MessageHeader {
    MessageHeader {
        message_code: fields::MESSAGE_TYPE.read(msh).to_string(),
        trigger_event: fields::MESSAGE_TYPE.component(2).read(msh).to_string(),
        message_structure: fields::MESSAGE_TYPE.component(3).read(msh).to_string(),
        control_id: fields::CONTROL_ID.read(msh).to_string(),
        version: fields::VERSION_ID.read(msh).to_string(),
        sending_application: fields::SENDING_APPLICATION.read(msh).to_string(),
        sending_facility: fields::SENDING_FACILITY.read(msh).to_string(),
    }
}
