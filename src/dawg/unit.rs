//! Conversions between `&str` and the 16-bit code units used as edge
//! labels.
//!
//! The graph stores strings as sequences of UTF-16 code units. Nothing
//! here normalizes or validates; a string round-trips through
//! [`units_of`] and [`string_from_units`] unchanged.

/// Convert a string slice into its UTF-16 code units.
#[inline]
pub(crate) fn units_of(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Convert a sequence of UTF-16 code units back into a `String`.
///
/// Units produced by [`units_of`] are always well formed; the lossy
/// decode only matters for labels injected through other means.
#[inline]
pub(crate) fn string_from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_round_trip() {
        let units = units_of("hello");
        assert_eq!(units, vec![104, 101, 108, 108, 111]);
        assert_eq!(string_from_units(&units), "hello");
    }

    #[test]
    fn bmp_unicode_round_trip() {
        let s = "caf\u{e9} \u{4e2d}\u{6587}";
        assert_eq!(string_from_units(&units_of(s)), s);
    }

    #[test]
    fn astral_round_trip() {
        // Surrogate pairs stay paired through the conversion.
        let s = "a\u{1f389}b";
        let units = units_of(s);
        assert_eq!(units.len(), 4);
        assert_eq!(string_from_units(&units), s);
    }

    #[test]
    fn empty_round_trip() {
        assert!(units_of("").is_empty());
        assert_eq!(string_from_units(&[]), "");
    }
}
