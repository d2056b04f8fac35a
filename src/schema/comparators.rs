//! Comparators: the ordering half of a matching rule. They operate on
//! normalized forms.

use core::cmp::Ordering;

use crate::time::GeneralizedTime;

/// Totally orders normalized values.
pub trait Comparator: Send + Sync {
    /// The OID of the matching rule this comparator serves.
    fn oid(&self) -> &str;

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering;

    fn compare_str(&self, a: &str, b: &str) -> Ordering {
        self.compare_bytes(a.as_bytes(), b.as_bytes())
    }
}

/// octetStringMatch: plain byte order.
pub struct ByteArrayComparator;

impl Comparator for ByteArrayComparator {
    fn oid(&self) -> &str {
        "2.5.13.17"
    }

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// caseIgnore/caseExact string order; inputs are already case-folded where
/// the rule ignores case.
pub struct StringComparator;

impl Comparator for StringComparator {
    fn oid(&self) -> &str {
        "2.5.13.2"
    }

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

/// integerMatch: numeric order over minimal decimal forms.
pub struct IntegerComparator;

impl Comparator for IntegerComparator {
    fn oid(&self) -> &str {
        "2.5.13.14"
    }

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering {
        let a_negative = a.first() == Some(&b'-');
        let b_negative = b.first() == Some(&b'-');
        match (a_negative, b_negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => magnitude(a).cmp(&magnitude(b)),
            (true, true) => magnitude(&b[1..]).cmp(&magnitude(&a[1..])),
        }
    }
}

/// Compares decimal magnitudes: longer wins, then lexicographic.
fn magnitude(digits: &[u8]) -> (usize, &[u8]) {
    (digits.len(), digits)
}

/// generalizedTimeMatch: instant order, with the infinite sentinel above
/// everything. Falls back to byte order for unparseable input.
pub struct GeneralizedTimeComparator;

impl Comparator for GeneralizedTimeComparator {
    fn oid(&self) -> &str {
        "2.5.13.27"
    }

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering {
        let parsed = (
            core::str::from_utf8(a).ok().and_then(|s| GeneralizedTime::parse(s).ok()),
            core::str::from_utf8(b).ok().and_then(|s| GeneralizedTime::parse(s).ok()),
        );
        match parsed {
            (Some(a), Some(b)) => a.cmp_instant(&b),
            _ => a.cmp(b),
        }
    }
}

/// distinguishedNameMatch: byte order over normalized DN text.
pub struct DnComparator;

impl Comparator for DnComparator {
    fn oid(&self) -> &str {
        "2.5.13.1"
    }

    fn compare_bytes(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_order_is_numeric() {
        let c = IntegerComparator;
        assert_eq!(c.compare_str("9", "10"), Ordering::Less);
        assert_eq!(c.compare_str("10", "9"), Ordering::Greater);
        assert_eq!(c.compare_str("-10", "-9"), Ordering::Less);
        assert_eq!(c.compare_str("-1", "1"), Ordering::Less);
        assert_eq!(c.compare_str("42", "42"), Ordering::Equal);
    }

    #[test]
    fn time_order_is_by_instant() {
        let c = GeneralizedTimeComparator;
        // same instant, different shapes
        assert_eq!(
            c.compare_str("20090805122634+0200", "20090805102634Z"),
            Ordering::Equal
        );
        assert_eq!(
            c.compare_str("20090805102634Z", "9223372036854775807"),
            Ordering::Less
        );
    }
}
