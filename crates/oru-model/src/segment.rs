//! Tokenized HL7 v2 segments.
//!
//! A segment is a typed list of fields. Each field holds repetitions, each
//! repetition holds components and each component holds subcomponents. Every
//! level is plain text: numeric and date semantics are applied later by the
//! extractors.
//!
//! All positions exposed here are 1-based to match HL7 notation, so
//! `segment.field(3)` is `PID-3` on a PID segment.

use serde::{Deserialize, Serialize};

/// Delimiter characters declared in the message header (MSH-1 and MSH-2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: '|',
            component: '^',
            repetition: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

/// One segment of a message, e.g. `PID` or `OBX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub code: String,
    pub fields: Vec<Field>,
}

impl Segment {
    pub fn new(code: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            code: code.into(),
            fields,
        }
    }

    /// Returns true if this segment has the given type code.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    /// Field by 1-based HL7 position.
    pub fn field(&self, position: usize) -> Option<&Field> {
        position
            .checked_sub(1)
            .and_then(|index| self.fields.get(index))
    }

    /// First subcomponent of the given component in the first repetition of a
    /// field, or empty text when any level is absent.
    pub fn value(&self, field: usize, component: usize) -> &str {
        self.field(field)
            .map(|f| f.value(component))
            .unwrap_or_default()
    }
}

/// A field and its repetitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub repetitions: Vec<Repetition>,
}

impl Field {
    /// Field holding a single value with no further structure.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            repetitions: vec![Repetition {
                components: vec![Component {
                    subcomponents: vec![text.into()],
                }],
            }],
        }
    }

    pub fn first(&self) -> Option<&Repetition> {
        self.repetitions.first()
    }

    pub fn value(&self, component: usize) -> &str {
        self.first()
            .map(|rep| rep.value(component))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.repetitions.iter().all(Repetition::is_empty)
    }
}

/// One repetition of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repetition {
    pub components: Vec<Component>,
}

impl Repetition {
    pub fn component(&self, position: usize) -> Option<&Component> {
        position
            .checked_sub(1)
            .and_then(|index| self.components.get(index))
    }

    pub fn value(&self, component: usize) -> &str {
        self.component(component)
            .and_then(|c| c.subcomponent(1))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Component::is_empty)
    }

    /// Rejoins the repetition into its encoded text form, without escaping.
    ///
    /// Trailing empty components and subcomponents are not re-emitted.
    pub fn joined(&self, delimiters: &Delimiters) -> String {
        let mut components: Vec<String> = self
            .components
            .iter()
            .map(|c| c.joined(delimiters.subcomponent))
            .collect();
        while components.last().is_some_and(String::is_empty) {
            components.pop();
        }
        components.join(&delimiters.component.to_string())
    }
}

/// One component of a repetition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub subcomponents: Vec<String>,
}

impl Component {
    pub fn subcomponent(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|index| self.subcomponents.get(index))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.subcomponents.iter().all(String::is_empty)
    }

    fn joined(&self, separator: char) -> String {
        let mut end = self.subcomponents.len();
        while end > 0 && self.subcomponents[end - 1].is_empty() {
            end -= 1;
        }
        self.subcomponents[..end].join(&separator.to_string())
    }
}
