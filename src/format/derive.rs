use super::descriptor::DurationFormat;
use crate::error::{FormatError, Result};
use chrono::Duration;

/// Infers a pattern from the separators in a sample duration.
///
/// A single `:` is read as `mm:ss`, never `hh:mm`. When the sample has a
/// fractional part (after `.` or `,`), one `l` is added per digit following
/// the last separator. Digit values are not inspected.
pub fn derive_format(sample: &str) -> Result<String> {
    let sample = sample.trim();
    let mut pattern = match sample.matches(':').count() {
        0 => String::from("ss"),
        1 => String::from("mm:ss"),
        2 => String::from("hh:mm:ss"),
        n => {
            return Err(FormatError::pattern(
                sample,
                format!("cannot derive a format from {n} ':' separators"),
            ));
        }
    };

    if let Some(pos) = sample.rfind(['.', ',']) {
        let fraction_len = sample[pos + 1..].chars().count();
        pattern.push('.');
        pattern.extend(std::iter::repeat_n('l', fraction_len));
    }

    Ok(pattern)
}

/// Parses text without a known format by deriving one from the text itself.
pub fn parse_simple(text: &str) -> Result<Duration> {
    DurationFormat::derive(text)?.parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_full_pattern() {
        assert_eq!(derive_format("12:53:07.124").unwrap(), "hh:mm:ss.lll");
    }

    #[test]
    fn test_derive_single_colon_is_minutes() {
        assert_eq!(derive_format("53:07").unwrap(), "mm:ss");
    }

    #[test]
    fn test_derive_seconds_only() {
        assert_eq!(derive_format("42").unwrap(), "ss");
        assert_eq!(derive_format("42,5").unwrap(), "ss.l");
    }

    #[test]
    fn test_derive_too_many_colons() {
        assert!(matches!(
            derive_format("1:2:3:4"),
            Err(FormatError::InvalidFormatPattern { .. })
        ));
    }

    #[test]
    fn test_parse_simple_single_colon() {
        let parsed = parse_simple("53:07").unwrap();
        assert_eq!(parsed, Duration::minutes(53) + Duration::seconds(7));
    }
}
