//! Response frames of the USB-ITN interface
//!
//! After a read request the cable answers with a short ASCII frame on its
//! interrupt endpoint:
//!
//! - `01A+00012.345\r` - a measurement (`01A` followed by a signed decimal)
//! - `91<code>\r` - the instrument could not be read (e.g. gauge not attached)
//!
//! Trailing carriage returns and zero padding are ignored.

/// Prefix of a measurement frame
const VALUE_PREFIX: &str = "01A";

/// Prefix of an instrument-side error frame
const ERROR_PREFIX: &str = "91";

/// A decoded response frame
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A measurement value
    Value(f64),
    /// The instrument reported an error code
    InstrumentError(String),
    /// Anything we do not understand
    Unrecognized(String),
}

/// Decode a raw response
pub fn parse_frame(raw: &[u8]) -> Frame {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches(['\0', '\r', '\n']).trim();

    if let Some(rest) = text.strip_prefix(VALUE_PREFIX) {
        return match rest.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Frame::Value(v),
            _ => Frame::Unrecognized(text.to_string()),
        };
    }

    if let Some(code) = text.strip_prefix(ERROR_PREFIX) {
        return Frame::InstrumentError(code.to_string());
    }

    Frame::Unrecognized(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_value() {
        assert_eq!(parse_frame(b"01A+00012.345\r"), Frame::Value(12.345));
    }

    #[test]
    fn test_parse_negative_value() {
        assert_eq!(parse_frame(b"01A-0000.120\r"), Frame::Value(-0.12));
    }

    #[test]
    fn test_zero_padding_is_ignored() {
        let mut raw = b"01A+00010.010\r".to_vec();
        raw.resize(64, 0);
        assert_eq!(parse_frame(&raw), Frame::Value(10.01));
    }

    #[test]
    fn test_instrument_error() {
        assert_eq!(
            parse_frame(b"9101\r"),
            Frame::InstrumentError("01".to_string())
        );
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(parse_frame(b"hello"), Frame::Unrecognized(_)));
        assert!(matches!(parse_frame(b"01Axyz\r"), Frame::Unrecognized(_)));
        assert!(matches!(parse_frame(b""), Frame::Unrecognized(_)));
    }
}
