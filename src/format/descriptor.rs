use super::pattern::{self, DelimiterSlots, Field, FieldWidths};
use crate::error::{FormatError, Result};
use chrono::Duration;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PATTERN: &str = "hh:mm:ss.lll";

/// Width given to every field when a format is built from presence flags.
const FLAG_WIDTH: usize = 2;
const FLAG_MILLIS_WIDTH: usize = 3;

/// Describes which duration fields are shown, how many digits each takes and
/// which characters separate them.
///
/// Fields always appear in the order hours, minutes, seconds, milliseconds.
/// A `DurationFormat` never changes after construction, so one instance can
/// be shared across threads for rendering and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationFormat {
    widths: FieldWidths,
    delimiters: DelimiterSlots,
}

impl DurationFormat {
    /// Builds a format from a pattern such as `hh:mm:ss.lll` or `mm:ss,ll`.
    ///
    /// Fails with [`FormatError::InvalidFormatPattern`] when the pattern names
    /// no field or lacks a delimiter between two adjacent fields.
    pub fn new(pattern: &str) -> Result<Self> {
        let widths = pattern::field_widths(pattern);
        if widths.iter().all(Option::is_none) {
            return Err(FormatError::pattern(pattern, "no h, m, s or l field found"));
        }
        let delimiters = pattern::assign_slots(pattern, &widths)?;
        Ok(Self { widths, delimiters })
    }

    /// Builds a format from field presence alone.
    ///
    /// No delimiters are configured on this path: rendering concatenates the
    /// zero-padded fields (`013007250` for 1h 30m 7.25s). Use [`Self::new`]
    /// when separators are needed. Its display still separates the fields
    /// (`hh:mm:ss.lll`), so reading that back keeps fields and widths but
    /// gains delimiters.
    pub fn from_flags(hours: bool, minutes: bool, seconds: bool, milliseconds: bool) -> Self {
        let width = |present: bool, digits: usize| present.then_some(digits);
        Self {
            widths: [
                width(hours, FLAG_WIDTH),
                width(minutes, FLAG_WIDTH),
                width(seconds, FLAG_WIDTH),
                width(milliseconds, FLAG_MILLIS_WIDTH),
            ],
            delimiters: [None; 3],
        }
    }

    /// Builds a format inferred from a sample duration such as `53:07.1`.
    pub fn derive(sample: &str) -> Result<Self> {
        Self::new(&super::derive::derive_format(sample)?)
    }

    pub fn has(&self, field: Field) -> bool {
        self.widths[field.index()].is_some()
    }

    /// Digit width of a present field.
    pub fn width(&self, field: Field) -> Option<usize> {
        self.widths[field.index()]
    }

    /// Separator written after `field`, if one is configured.
    pub fn delimiter_after(&self, field: Field) -> Option<char> {
        field.slot().and_then(|slot| self.delimiters[slot])
    }

    pub fn delimiters(&self) -> DelimiterSlots {
        self.delimiters
    }

    /// Renders a duration.
    ///
    /// Hours are the whole hours of the duration and are not wrapped at 24;
    /// the other fields are the remainder within their larger unit.
    /// Milliseconds are written as three digits and then cut to the field
    /// width without rounding. Negative durations get a leading `-`.
    pub fn render(&self, duration: &Duration) -> String {
        let total_ms = duration.num_milliseconds().unsigned_abs();
        let components = [
            total_ms / 3_600_000,
            total_ms / 60_000 % 60,
            total_ms / 1_000 % 60,
            total_ms % 1_000,
        ];

        let mut out = String::new();
        if total_ms > 0 && *duration < Duration::zero() {
            out.push('-');
        }

        for field in Field::ALL {
            let Some(width) = self.width(field) else {
                continue;
            };
            let value = components[field.index()];
            match field {
                Field::Milliseconds => out.push_str(&millis_digits(value, width)),
                _ => out.push_str(&format!("{value:0width$}")),
            }
            if let Some(delimiter) = self.delimiter_after(field) {
                out.push(delimiter);
            }
        }

        out
    }

    /// Parses text shaped like `[[h:]m:]s[.l]` back into a duration.
    ///
    /// The structure is read from the `:` and `.`/`,` separators rather than
    /// from this format's widths, so `1:02:03` and `01:02:03.000` both parse
    /// under `hh:mm:ss.lll`. The format must include seconds.
    pub fn parse(&self, text: &str) -> Result<Duration> {
        if !self.has(Field::Seconds) {
            return Err(FormatError::pattern(
                &self.to_string(),
                "a format without seconds cannot parse",
            ));
        }
        parse_text(text)
    }
}

impl Default for DurationFormat {
    /// The `hh:mm:ss.lll` format.
    fn default() -> Self {
        Self {
            widths: [Some(2), Some(2), Some(2), Some(3)],
            delimiters: [Some(':'), Some(':'), Some('.')],
        }
    }
}

impl FromStr for DurationFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Writes a pattern for this format, e.g. `mm:ss.ll`.
///
/// Present fields are always separated so the widths survive being read back:
/// a format built by [`DurationFormat::new`] rebuilds to an equal format from
/// its display. A [`DurationFormat::from_flags`] format displays as
/// `hh:mm:ss.lll` style text, which rebuilds with the same fields and widths
/// but with delimiters configured.
impl fmt::Display for DurationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present: Vec<Field> = Field::ALL.into_iter().filter(|&field| self.has(field)).collect();
        for (i, &field) in present.iter().enumerate() {
            let width = self.width(field).unwrap_or_default();
            for _ in 0..width {
                write!(f, "{}", field.marker())?;
            }
            let Some(&next) = present.get(i + 1) else {
                continue;
            };
            write!(f, "{}", self.separator_between(field, next))?;
        }
        Ok(())
    }
}

impl DurationFormat {
    /// Separator displayed between two consecutive present fields.
    ///
    /// An unconfigured gap borrows the next configured delimiter, since slots
    /// take delimiters in order when the pattern is read back.
    fn separator_between(&self, field: Field, next: Field) -> char {
        if let Some(delimiter) = self.delimiter_after(field) {
            return delimiter;
        }
        let after = field.slot().map_or(self.delimiters.len(), |slot| slot + 1);
        self.delimiters[after..]
            .iter()
            .flatten()
            .copied()
            .next()
            .unwrap_or(if next == Field::Milliseconds { '.' } else { ':' })
    }
}

/// Three-digit milliseconds cut (or zero-extended) to `width` digits.
fn millis_digits(millis: u64, width: usize) -> String {
    let digits = format!("{millis:03}");
    if width <= digits.len() {
        digits[..width].to_string()
    } else {
        format!("{digits:0<width$}")
    }
}

pub(crate) fn parse_text(text: &str) -> Result<Duration> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let normalized = body.replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 {
        return Err(FormatError::text(text, "expected at most two ':' separators"));
    }
    let Some((last, leading)) = parts.split_last() else {
        return Err(FormatError::text(text, "empty duration"));
    };

    let mut fraction = last.split('.');
    let seconds_piece = fraction.next().unwrap_or_default();
    // "12." carries no milliseconds
    let millis_piece = fraction.next().filter(|piece| !piece.is_empty());
    if fraction.next().is_some() {
        return Err(FormatError::text(text, "more than one decimal separator"));
    }

    let seconds = field_value(text, seconds_piece, Field::Seconds)?;
    let millis = match millis_piece {
        Some(piece) => field_value(text, piece, Field::Milliseconds)?,
        None => 0,
    };
    let (hours, minutes) = match leading {
        [h, m] => (
            field_value(text, h, Field::Hours)?,
            field_value(text, m, Field::Minutes)?,
        ),
        [m] => (0, field_value(text, m, Field::Minutes)?),
        _ => (0, 0),
    };

    let total_ms = hours
        .checked_mul(3_600)
        .and_then(|s| s.checked_add(minutes.checked_mul(60)?))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1_000))
        .and_then(|ms| ms.checked_add(millis))
        .and_then(Duration::try_milliseconds)
        .ok_or_else(|| FormatError::text(text, "duration out of range"))?;

    Ok(if negative { -total_ms } else { total_ms })
}

fn field_value(text: &str, piece: &str, field: Field) -> Result<i64> {
    if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::text(
            text,
            format!("{field} value '{piece}' is not a number"),
        ));
    }
    piece
        .parse()
        .map_err(|_| FormatError::text(text, format!("{field} value '{piece}' is too large")))
}
