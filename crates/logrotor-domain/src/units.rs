//! Unit-aware magnitudes for size and age thresholds
//!
//! Thresholds are written as `<number><optional unit letter>`, e.g. `10k`,
//! `1.5G`, `7d` or `30`. Sizes step by 1024 per unit; durations use calendar
//! steps with a month approximated as 31 days.

use std::error::Error;
use std::fmt;

/// A parsed magnitude with its unit
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    /// The numeric part as written
    pub magnitude: f64,

    /// Base units (bytes or seconds) per unit of `magnitude`
    pub multiplier: u64,

    /// Human-readable unit name, pluralized for magnitudes above one
    pub unit: String,

    /// The unit letter given in the input, if any
    pub suffix: Option<char>,
}

impl Quantity {
    /// Total in base units (bytes or seconds)
    pub fn total(&self) -> f64 {
        self.magnitude * self.multiplier as f64
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

/// Errors from parsing a quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// No leading number
    MissingNumber(String),

    /// A unit letter not present in the unit table
    UnknownUnit {
        /// Original input
        input: String,
        /// Offending letter
        unit: char,
    },

    /// Anything else that does not fit `<number><letter?>`
    Malformed(String),
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitError::MissingNumber(input) => write!(f, "no number in '{}'", input),
            UnitError::UnknownUnit { input, unit } => {
                write!(f, "unknown unit '{}' in '{}'", unit, input)
            }
            UnitError::Malformed(input) => write!(f, "malformed quantity '{}'", input),
        }
    }
}

impl Error for UnitError {}

struct UnitStep {
    letter: char,
    name: &'static str,
    /// Factor relative to the previous table entry
    step: u64,
}

const SIZE_UNITS: [UnitStep; 5] = [
    UnitStep { letter: 'b', name: "byte", step: 1 },
    UnitStep { letter: 'k', name: "kilobyte", step: 1024 },
    UnitStep { letter: 'm', name: "megabyte", step: 1024 },
    UnitStep { letter: 'g', name: "gigabyte", step: 1024 },
    UnitStep { letter: 't', name: "terabyte", step: 1024 },
];

const DURATION_UNITS: [UnitStep; 6] = [
    UnitStep { letter: 's', name: "second", step: 1 },
    UnitStep { letter: 'm', name: "minute", step: 60 },
    UnitStep { letter: 'h', name: "hour", step: 60 },
    UnitStep { letter: 'd', name: "day", step: 24 },
    UnitStep { letter: 'M', name: "month", step: 31 },
    UnitStep { letter: 'Y', name: "year", step: 12 },
];

/// Seconds in a year. The year does not follow the month step (12 * 31 days).
const SECONDS_PER_YEAR: u64 = 365 * 86_400;
const SECONDS_PER_DAY: u64 = 86_400;

/// Parse a byte quantity such as `512`, `10k` or `2G`
///
/// Unit letters are case-insensitive. Without a letter the unit is bytes.
///
/// # Examples
///
/// ```
/// use logrotor_domain::units::parse_size;
///
/// let q = parse_size("10k").unwrap();
/// assert_eq!(q.multiplier, 1024);
/// assert_eq!(q.unit, "kilobytes");
/// assert_eq!(q.total(), 10240.0);
/// ```
pub fn parse_size(input: &str) -> Result<Quantity, UnitError> {
    let (magnitude, suffix) = split_number(input)?;
    let Some(letter) = suffix else {
        return Ok(quantity(magnitude, 1, "byte", None));
    };

    let wanted = letter.to_ascii_lowercase();
    let mut multiplier = 1u64;
    for unit in &SIZE_UNITS {
        multiplier *= unit.step;
        if unit.letter == wanted {
            return Ok(quantity(magnitude, multiplier, unit.name, Some(letter)));
        }
    }

    Err(UnitError::UnknownUnit {
        input: input.to_string(),
        unit: letter,
    })
}

/// Parse a duration such as `30s`, `12h` or `6M`
///
/// `m` is minutes and `M` is months; the other letters also match in the
/// opposite case. Without a letter the multiplier is one and the unit label is
/// "minute".
///
/// # Examples
///
/// ```
/// use logrotor_domain::units::parse_duration;
///
/// let q = parse_duration("2h").unwrap();
/// assert_eq!(q.total(), 7200.0);
/// assert_eq!(q.unit, "hours");
/// ```
pub fn parse_duration(input: &str) -> Result<Quantity, UnitError> {
    let (magnitude, suffix) = split_number(input)?;
    let Some(letter) = suffix else {
        return Ok(quantity(magnitude, 1, "minute", None));
    };

    let mut multiplier = 1u64;
    for unit in &DURATION_UNITS {
        multiplier *= unit.step;
        if duration_letter_matches(unit.letter, letter) {
            if unit.letter == 'Y' {
                multiplier = SECONDS_PER_YEAR;
            }
            return Ok(quantity(magnitude, multiplier, unit.name, Some(letter)));
        }
    }

    Err(UnitError::UnknownUnit {
        input: input.to_string(),
        unit: letter,
    })
}

/// Parse a file age threshold
///
/// Same as [`parse_duration`] except that a bare number counts days.
///
/// ```
/// use logrotor_domain::units::parse_age;
///
/// assert_eq!(parse_age("7").unwrap().total(), 7.0 * 86400.0);
/// assert_eq!(parse_age("7m").unwrap().total(), 420.0);
/// ```
pub fn parse_age(input: &str) -> Result<Quantity, UnitError> {
    let parsed = parse_duration(input)?;
    if parsed.suffix.is_some() {
        return Ok(parsed);
    }
    Ok(quantity(parsed.magnitude, SECONDS_PER_DAY, "day", None))
}

fn duration_letter_matches(table: char, given: char) -> bool {
    match table {
        'm' | 'M' => table == given,
        _ => table.eq_ignore_ascii_case(&given),
    }
}

fn quantity(magnitude: f64, multiplier: u64, name: &str, suffix: Option<char>) -> Quantity {
    let unit = if magnitude.abs() <= 1.0 {
        name.to_string()
    } else {
        format!("{}s", name)
    };
    Quantity {
        magnitude,
        multiplier,
        unit,
        suffix,
    }
}

/// Split `<number><letter?>` into its parts
fn split_number(input: &str) -> Result<(f64, Option<char>), UnitError> {
    let trimmed = input.trim();
    let digits_end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, rest) = trimmed.split_at(digits_end);

    if !number.chars().any(|c| c.is_ascii_digit()) {
        return Err(UnitError::MissingNumber(input.to_string()));
    }
    let magnitude: f64 = number
        .parse()
        .map_err(|_| UnitError::Malformed(input.to_string()))?;

    let mut letters = rest.chars();
    match (letters.next(), letters.next()) {
        (None, _) => Ok((magnitude, None)),
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok((magnitude, Some(letter))),
        _ => Err(UnitError::Malformed(input.to_string())),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every size unit multiplies the magnitude by a power of 1024
        #[test]
        fn test_size_total_is_power_of_1024(n in 0u32..100_000, idx in 0usize..5) {
            let letter = ['b', 'k', 'm', 'g', 't'][idx];
            let q = parse_size(&format!("{}{}", n, letter)).unwrap();
            prop_assert_eq!(q.multiplier, 1024u64.pow(idx as u32));
            prop_assert_eq!(q.total(), n as f64 * q.multiplier as f64);
        }

        /// Property: bare integers parse back to themselves
        #[test]
        fn test_bare_integer_roundtrip(n in 0u64..1_000_000_000) {
            let q = parse_size(&n.to_string()).unwrap();
            prop_assert_eq!(q.magnitude, n as f64);
            prop_assert_eq!(q.suffix, None);
        }
    }
}
