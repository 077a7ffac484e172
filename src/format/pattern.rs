//! Pattern string scanning.
//!
//! A pattern such as `hh:mm:ss.lll` is a sequence of marker segments split by
//! runs of delimiter characters. The length of a segment is the digit width of
//! every field whose marker it contains.

use crate::error::{FormatError, Result};
use std::fmt;

/// Characters accepted as separators inside a pattern.
pub const DELIMITERS: [char; 3] = [':', '.', ','];

/// One component of a rendered duration, in its fixed rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Hours,
        Field::Minutes,
        Field::Seconds,
        Field::Milliseconds,
    ];

    /// Lowercase marker letter used for this field in patterns.
    pub fn marker(self) -> char {
        match self {
            Field::Hours => 'h',
            Field::Minutes => 'm',
            Field::Seconds => 's',
            Field::Milliseconds => 'l',
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Delimiter slot that follows this field, if any.
    pub(crate) fn slot(self) -> Option<usize> {
        match self {
            Field::Hours => Some(0),
            Field::Minutes => Some(1),
            Field::Seconds => Some(2),
            Field::Milliseconds => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Hours => "hours",
            Field::Minutes => "minutes",
            Field::Seconds => "seconds",
            Field::Milliseconds => "milliseconds",
        };
        f.write_str(name)
    }
}

/// Digit width per field, indexed by [`Field`]; `None` marks an absent field.
pub type FieldWidths = [Option<usize>; 4];

/// Separator emitted after hours, after minutes, and between seconds and milliseconds.
pub type DelimiterSlots = [Option<char>; 3];

pub fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

/// Field presence and widths by marker containment.
///
/// Consecutive delimiters yield empty segments, which carry no marker and so
/// behave as a single separator. A segment holding several markers (`hm`)
/// sets all of them to the same width; a later segment overrides an earlier
/// one for the same field.
pub fn field_widths(pattern: &str) -> FieldWidths {
    let mut widths: FieldWidths = [None; 4];

    for segment in pattern.split(is_delimiter) {
        let lower = segment.to_lowercase();
        for field in Field::ALL {
            if lower.contains(field.marker()) {
                widths[field.index()] = Some(segment.chars().count());
            }
        }
    }

    widths
}

/// Which delimiter slots must hold a separator for the given fields.
pub fn required_slots(widths: &FieldWidths) -> [bool; 3] {
    let has = |field: Field| widths[field.index()].is_some();
    [
        has(Field::Hours) && has(Field::Minutes),
        has(Field::Minutes) && has(Field::Seconds),
        has(Field::Seconds) && has(Field::Milliseconds),
    ]
}

/// Hands out the pattern's delimiters, in order, to the slots that need one.
///
/// Slots that are not required take nothing. Surplus delimiters are ignored.
pub fn assign_slots(pattern: &str, widths: &FieldWidths) -> Result<DelimiterSlots> {
    let mut delimiters = pattern.chars().filter(|c| is_delimiter(*c));
    let mut slots: DelimiterSlots = [None; 3];

    for (index, (slot, required)) in slots
        .iter_mut()
        .zip(required_slots(widths))
        .enumerate()
    {
        if !required {
            continue;
        }
        let delimiter = delimiters.next().ok_or_else(|| {
            FormatError::pattern(
                pattern,
                format!("missing delimiter for slot {index} (after {})", Field::ALL[index]),
            )
        })?;
        *slot = Some(delimiter);
    }

    Ok(slots)
}
