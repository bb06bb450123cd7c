//! Always-simplified fractions

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RationalError;

/// Greatest common divisor by Euclid's algorithm.
///
/// `gcd(0, n) == n`, so a zero numerator simplifies to `0/1`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// A non-negative fraction held in lowest terms.
///
/// Simplification happens once, in [`Rational::new`]; the fields are never
/// mutated afterwards. `normalized` is a floating approximation kept for
/// display and bounds only. Equality, hashing and ordering look at the
/// integer fields exclusively.
///
/// # Example
///
/// ```
/// use cwtree::Rational;
///
/// let r = Rational::new(6, 4).unwrap();
/// assert_eq!((r.numerator(), r.denominator()), (3, 2));
/// assert!(r > Rational::new(4, 3).unwrap());
/// assert!(Rational::new(1, 0).is_err());
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rational {
    numerator: u64,
    denominator: u64,
    normalized: f64,
}

impl Rational {
    /// The root of the canonical tree, `1/1`.
    pub const ONE: Rational = Rational {
        numerator: 1,
        denominator: 1,
        normalized: 1.0,
    };

    /// Build a simplified fraction.
    ///
    /// # Errors
    ///
    /// `InvalidDenominator` if `denominator == 0`.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, RationalError> {
        if denominator == 0 {
            return Err(RationalError::InvalidDenominator { numerator });
        }
        // Taken from the inputs as given, before simplification.
        let normalized = numerator as f64 / denominator as f64;
        let hcf = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / hcf,
            denominator: denominator / hcf,
            normalized,
        })
    }

    /// Numerator in lowest terms.
    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    /// Denominator in lowest terms (never zero).
    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// Floating approximation of the value.
    pub fn normalized(&self) -> f64 {
        self.normalized
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.numerator == other.numerator && self.denominator == other.denominator
    }
}

impl Eq for Rational {}

impl Hash for Rational {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numerator.hash(state);
        self.denominator.hash(state);
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.denominator == other.denominator {
            return self.numerator.cmp(&other.numerator);
        }
        // Widened so the cross products of two u64 fractions cannot overflow.
        let lhs = u128::from(self.numerator) * u128::from(other.denominator);
        let rhs = u128::from(other.numerator) * u128::from(self.denominator);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Rational {
    type Err = RationalError;

    /// Parse `n/d` or a bare integer `n` (read as `n/1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|e| RationalError::Parse(format!("{s:?}: {e}")))
        };
        match s.split_once('/') {
            Some((n, d)) => Rational::new(parse(n)?, parse(d)?),
            None => Rational::new(parse(s)?, 1),
        }
    }
}

impl TryFrom<String> for Rational {
    type Error = RationalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rational> for String {
    fn from(value: Rational) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 7), 7);
        assert_eq!(gcd(1, 9), 1);
        assert_eq!(gcd(0, 5), 5);
        assert_eq!(gcd(5, 0), 5);
    }

    #[test]
    fn test_new_simplifies() {
        let r = Rational::new(10, 4).unwrap();
        assert_eq!(r.numerator(), 5);
        assert_eq!(r.denominator(), 2);
    }

    #[test]
    fn test_zero_numerator_simplifies_to_zero_over_one() {
        let r = Rational::new(0, 9).unwrap();
        assert_eq!((r.numerator(), r.denominator()), (0, 1));
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert_eq!(
            Rational::new(3, 0),
            Err(RationalError::InvalidDenominator { numerator: 3 })
        );
    }

    #[test]
    fn test_normalized_uses_given_inputs() {
        let r = Rational::new(2, 8).unwrap();
        assert_eq!(r.normalized(), 0.25);
    }

    #[test]
    fn test_one_constant_matches_constructor() {
        assert_eq!(Rational::ONE, Rational::new(1, 1).unwrap());
        assert_eq!(Rational::ONE.normalized(), 1.0);
    }

    #[test]
    fn test_ordering_same_denominator() {
        let a = Rational::new(1, 7).unwrap();
        let b = Rational::new(3, 7).unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_ordering_large_values_do_not_overflow() {
        let a = Rational::new(u64::MAX - 1, u64::MAX).unwrap();
        let b = Rational::new(u64::MAX, u64::MAX - 1).unwrap();
        assert!(a < b);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }

    #[test]
    fn test_equality_ignores_float() {
        let a = Rational::new(1, 3).unwrap();
        let b = Rational::new(3, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_and_parse() {
        let r: Rational = "4/6".parse().unwrap();
        assert_eq!(r.to_string(), "2/3");
        let whole: Rational = " 5 ".parse().unwrap();
        assert_eq!(whole.to_string(), "5/1");
        assert!(matches!("x/2".parse::<Rational>(), Err(RationalError::Parse(_))));
        assert!(matches!(
            "1/0".parse::<Rational>(),
            Err(RationalError::InvalidDenominator { .. })
        ));
    }

    #[test]
    fn test_serde_as_string() {
        let r = Rational::new(3, 5).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, "\"3/5\"");
        let back: Rational = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
