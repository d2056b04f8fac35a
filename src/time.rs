//! RFC 4517 generalized time: shape-preserving parse and format, canonical
//! UTC form, and instant comparison.

use core::cmp::Ordering;
use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::error::SchemaError;

const SYNTAX_OID: &str = "1.3.6.1.4.1.1466.115.121.1.24";

/// Interoperability sentinel some directories store for "never expires".
const INFINITE_LITERAL: &str = "9223372036854775807";

fn invalid() -> SchemaError {
    SchemaError::InvalidSyntax {
        oid: SYNTAX_OID.to_owned(),
    }
}

/// The `Z` or `±HH[MM]` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GtTimeZone {
    Utc,
    Offset {
        negative: bool,
        hours: u32,
        minutes: Option<u32>,
    },
}

impl GtTimeZone {
    fn offset_seconds(self) -> i32 {
        match self {
            GtTimeZone::Utc => 0,
            GtTimeZone::Offset {
                negative,
                hours,
                minutes,
            } => {
                let seconds = (hours * 3600 + minutes.unwrap_or(0) * 60) as i32;
                if negative {
                    -seconds
                } else {
                    seconds
                }
            }
        }
    }
}

/// A fraction with its source delimiter, applying to the smallest time
/// component present (hour, minute or second).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtFraction {
    pub comma: bool,
    pub digits: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Finite {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: Option<u32>,
    /// 60 is a leap second.
    second: Option<u32>,
    fraction: Option<GtFraction>,
    zone: GtTimeZone,
}

/// A generalized time value, kept in its as-parsed shape so formatting
/// reproduces the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralizedTime {
    repr: Repr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    Finite(Finite),
    /// Sorts above every finite instant.
    Infinite,
}

impl GeneralizedTime {
    pub fn infinite() -> Self {
        Self {
            repr: Repr::Infinite,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.repr, Repr::Infinite)
    }

    /// A second-precision UTC value.
    pub fn from_utc(datetime: DateTime<Utc>) -> Self {
        use chrono::{Datelike, Timelike};
        Self {
            repr: Repr::Finite(Finite {
                year: datetime.year(),
                month: datetime.month(),
                day: datetime.day(),
                hour: datetime.hour(),
                minute: Some(datetime.minute()),
                second: Some(datetime.second()),
                fraction: None,
                zone: GtTimeZone::Utc,
            }),
        }
    }

    /// Parses the RFC 4517 text form.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        if text == INFINITE_LITERAL {
            return Ok(Self::infinite());
        }

        let bytes = text.as_bytes();
        if bytes.len() < 11 || !bytes.is_ascii() {
            return Err(invalid());
        }

        let year: i32 = digits(&bytes[0..4])?.try_into().map_err(|_| invalid())?;
        let month = digits(&bytes[4..6])?;
        let day = digits(&bytes[6..8])?;
        let hour = digits(&bytes[8..10])?;
        let mut pos = 10;

        let mut minute = None;
        let mut second = None;
        if bytes.len() >= pos + 2 && bytes[pos].is_ascii_digit() {
            minute = Some(digits(&bytes[pos..pos + 2])?);
            pos += 2;
            if bytes.len() >= pos + 2 && bytes[pos].is_ascii_digit() {
                second = Some(digits(&bytes[pos..pos + 2])?);
                pos += 2;
            }
        }

        let mut fraction = None;
        if bytes.len() > pos && (bytes[pos] == b'.' || bytes[pos] == b',') {
            let comma = bytes[pos] == b',';
            pos += 1;
            let start = pos;
            while bytes.len() > pos && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos == start {
                return Err(invalid());
            }
            fraction = Some(GtFraction {
                comma,
                digits: text[start..pos].to_owned(),
            });
        }

        let zone = match bytes.get(pos) {
            Some(b'Z') => {
                pos += 1;
                GtTimeZone::Utc
            }
            Some(sign @ (b'+' | b'-')) => {
                pos += 1;
                if bytes.len() < pos + 2 {
                    return Err(invalid());
                }
                let hours = digits(&bytes[pos..pos + 2])?;
                pos += 2;
                let minutes = if bytes.len() >= pos + 2 {
                    let m = digits(&bytes[pos..pos + 2])?;
                    pos += 2;
                    Some(m)
                } else {
                    None
                };
                if hours > 23 || minutes.is_some_and(|m| m > 59) {
                    return Err(invalid());
                }
                GtTimeZone::Offset {
                    negative: *sign == b'-',
                    hours,
                    minutes,
                }
            }
            _ => return Err(invalid()),
        };

        if pos != bytes.len() {
            return Err(invalid());
        }

        let finite = Finite {
            year,
            month,
            day,
            hour,
            minute,
            second,
            fraction,
            zone,
        };
        // reject impossible dates and times up front
        finite.instant().ok_or_else(invalid)?;
        Ok(Self {
            repr: Repr::Finite(finite),
        })
    }

    /// The instant in UTC; `None` for the infinite sentinel.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match &self.repr {
            Repr::Finite(finite) => finite.instant().map(|dt| dt.with_timezone(&Utc)),
            Repr::Infinite => None,
        }
    }

    /// Orders by instant; the infinite sentinel sorts above everything.
    pub fn cmp_instant(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (Repr::Infinite, Repr::Infinite) => Ordering::Equal,
            (Repr::Infinite, _) => Ordering::Greater,
            (_, Repr::Infinite) => Ordering::Less,
            (Repr::Finite(_), Repr::Finite(_)) => self.to_utc().cmp(&other.to_utc()),
        }
    }

    /// The canonical UTC form: `YYYYmmddHHMMSS[.f]Z` with the fraction
    /// folded down to (at most millisecond) seconds.
    pub fn format_canonical(&self) -> String {
        match &self.repr {
            Repr::Infinite => INFINITE_LITERAL.to_owned(),
            Repr::Finite(finite) => {
                let utc = finite
                    .instant()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or(DateTime::UNIX_EPOCH);
                let millis = utc.timestamp_subsec_millis();
                let base = utc.format("%Y%m%d%H%M%S").to_string();
                if millis == 0 {
                    format!("{base}Z")
                } else {
                    let mut frac = format!("{millis:03}");
                    while frac.ends_with('0') {
                        frac.pop();
                    }
                    format!("{base}.{frac}Z")
                }
            }
        }
    }
}

impl fmt::Display for GeneralizedTime {
    /// Reproduces the as-parsed shape.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let finite = match &self.repr {
            Repr::Infinite => return f.write_str(INFINITE_LITERAL),
            Repr::Finite(finite) => finite,
        };

        write!(
            f,
            "{:04}{:02}{:02}{:02}",
            finite.year, finite.month, finite.day, finite.hour
        )?;
        if let Some(minute) = finite.minute {
            write!(f, "{minute:02}")?;
        }
        if let Some(second) = finite.second {
            write!(f, "{second:02}")?;
        }
        if let Some(fraction) = &finite.fraction {
            write!(f, "{}{}", if fraction.comma { ',' } else { '.' }, fraction.digits)?;
        }
        match finite.zone {
            GtTimeZone::Utc => f.write_str("Z"),
            GtTimeZone::Offset {
                negative,
                hours,
                minutes,
            } => {
                write!(f, "{}{hours:02}", if negative { '-' } else { '+' })?;
                if let Some(minutes) = minutes {
                    write!(f, "{minutes:02}")?;
                }
                Ok(())
            }
        }
    }
}

impl Finite {
    /// The fraction scaled to nanoseconds of the unit it applies to.
    fn fraction_nanos(&self) -> u64 {
        let Some(fraction) = &self.fraction else {
            return 0;
        };
        let unit_seconds: u64 = if self.second.is_some() {
            1
        } else if self.minute.is_some() {
            60
        } else {
            3600
        };

        let digits: &str = &fraction.digits[..fraction.digits.len().min(9)];
        let value: u64 = digits.parse().unwrap_or(0);
        let scale = 10u64.pow(digits.len() as u32);
        value * unit_seconds * 1_000_000_000 / scale
    }

    fn instant(&self) -> Option<DateTime<FixedOffset>> {
        if self.month == 0 || self.day == 0 || self.hour > 23 {
            return None;
        }
        let minute = self.minute.unwrap_or(0);
        let second = self.second.unwrap_or(0);
        if minute > 59 || second > 60 {
            return None;
        }

        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let nanos = self.fraction_nanos();
        let extra_seconds = nanos / 1_000_000_000;
        let sub_nanos = (nanos % 1_000_000_000) as u32;

        // chrono carries leap seconds in the nanosecond field of :59
        let (second, leap_nanos) = if second == 60 {
            (59, 1_000_000_000)
        } else {
            (second, 0)
        };
        let time = chrono::NaiveTime::from_hms_nano_opt(self.hour, minute, second, leap_nanos)?;
        let datetime = date.and_time(time)
            + chrono::Duration::seconds(extra_seconds as i64)
            + chrono::Duration::nanoseconds(i64::from(sub_nanos));

        FixedOffset::east_opt(self.zone.offset_seconds())?
            .from_local_datetime(&datetime)
            .single()
    }
}

fn digits(bytes: &[u8]) -> Result<u32, SchemaError> {
    let mut value: u32 = 0;
    for byte in bytes {
        if !byte.is_ascii_digit() {
            return Err(invalid());
        }
        value = value * 10 + u32::from(byte - b'0');
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shapes_round_trip() {
        for text in [
            "20090805102634Z",
            "20090805102634.5Z",
            "20090805102634,125Z",
            "200908051026Z",
            "2009080510Z",
            "2009080510.5Z",
            "200908051026.5+0200",
            "20090805102634-05",
            "20090805102634+0930",
        ] {
            let parsed = GeneralizedTime::parse(text).unwrap();
            assert_eq!(parsed.to_string(), text);
            assert_eq!(GeneralizedTime::parse(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn fractions_fold_into_the_instant() {
        let half_hour = GeneralizedTime::parse("2009080510.5Z").unwrap();
        let explicit = GeneralizedTime::parse("200908051030Z").unwrap();
        assert_eq!(half_hour.to_utc(), explicit.to_utc());

        let half_minute = GeneralizedTime::parse("200908051026.5Z").unwrap();
        let explicit = GeneralizedTime::parse("20090805102630Z").unwrap();
        assert_eq!(half_minute.to_utc(), explicit.to_utc());
    }

    #[test]
    fn offsets_shift_to_utc() {
        let offset = GeneralizedTime::parse("20090805122634+0200").unwrap();
        let utc = GeneralizedTime::parse("20090805102634Z").unwrap();
        assert_eq!(offset.to_utc(), utc.to_utc());
        assert_eq!(offset.format_canonical(), "20090805102634Z");
    }

    #[test]
    fn canonical_form_is_idempotent() {
        for text in [
            "20090805102634Z",
            "20090805102634.25Z",
            "2009080510,5Z",
            "200908051026+1130",
        ] {
            let canonical = GeneralizedTime::parse(text).unwrap().format_canonical();
            let again = GeneralizedTime::parse(&canonical).unwrap().format_canonical();
            assert_eq!(canonical, again);
        }
    }

    #[test]
    fn infinite_sentinel() {
        let infinite = GeneralizedTime::parse("9223372036854775807").unwrap();
        assert!(infinite.is_infinite());
        assert_eq!(infinite.to_string(), "9223372036854775807");

        let finite = GeneralizedTime::parse("20991231235959Z").unwrap();
        assert_eq!(infinite.cmp_instant(&finite), Ordering::Greater);
        assert_eq!(finite.cmp_instant(&infinite), Ordering::Less);
        assert_eq!(infinite.cmp_instant(&infinite.clone()), Ordering::Equal);
    }

    #[test]
    fn leap_second_is_accepted() {
        let leap = GeneralizedTime::parse("20161231235960Z").unwrap();
        assert!(leap.to_utc().is_some());
    }

    #[test]
    fn rejections() {
        for text in [
            "",
            "2009",
            "20090805",      // no hour
            "200908051060Z", // bad minute
            "20090231102634Z", // bad day
            "20090805102634",  // missing zone
            "20090805102634.Z", // empty fraction
            "20090805102634X",
            "20090805102634+24",
        ] {
            assert!(GeneralizedTime::parse(text).is_err(), "{text}");
        }
    }
}
