use proptest::prelude::*;

use kyc_types::{Email, Timestamp, ValidationCriteria};

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// RFC 3339 rendering parses back to the same second.
    #[test]
    fn timestamp_rfc3339_roundtrip(secs in 0u64..4_102_444_800) {
        let ts = Timestamp::new(secs);
        prop_assert_eq!(Timestamp::from_rfc3339(&ts.to_rfc3339()).unwrap(), ts);
    }

    /// plus_secs then elapsed_since recovers the offset.
    #[test]
    fn timestamp_plus_then_elapsed(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::new(base);
        prop_assert_eq!(t.elapsed_since(t.plus_secs(offset)), offset);
    }

    /// Any local@domain pair without whitespace or extra '@' parses unchanged.
    #[test]
    fn email_accepts_simple_addresses(local in "[a-z0-9.]{1,16}", domain in "[a-z0-9]{1,12}\\.[a-z]{2,4}") {
        let raw = format!("{local}@{domain}");
        let email = Email::parse(&raw).unwrap();
        prop_assert_eq!(email.as_str(), raw.as_str());
    }

    /// Surrounding whitespace never changes the parsed identity.
    #[test]
    fn email_trim_is_identity_preserving(pad in "[ \t]{0,4}") {
        let padded = format!("{pad}a@x.com{pad}");
        prop_assert_eq!(Email::parse(&padded).unwrap(), Email::parse("a@x.com").unwrap());
    }

    /// Every criteria value inside 0..=100 validates.
    #[test]
    fn criteria_in_range_valid(
        c in 0.0f32..=100.0,
        b in 0.0f32..=100.0,
        s in 0.0f32..=100.0,
        m in 0.0f32..=100.0,
    ) {
        let criteria = ValidationCriteria {
            min_confidence: c,
            min_brightness: b,
            min_sharpness: s,
            min_similarity: m,
        };
        prop_assert!(criteria.validate().is_ok());
    }
}
