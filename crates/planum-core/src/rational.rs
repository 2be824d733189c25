//! Exact rational numbers.
//!
//! Every numeric literal a user types, every region bound and every
//! coefficient of an expanded expression is a [`Rational`]. Values are kept
//! in lowest terms with a positive denominator, so structural equality is
//! numeric equality and rationals can be hash-consed inside the arena.

use dashu::base::{Abs, Inverse, Signed as DashuSigned, UnsignedAbs};
use dashu::integer::IBig;
use dashu::rational::RBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Largest power of ten a decimal literal may scale by.
pub const MAX_DECIMAL_SCALE: u32 = 4096;

/// An arbitrary precision rational number.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rational(RBig);

impl Rational {
    /// Creates a rational from i64 numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn from_i64(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "denominator cannot be zero");
        Self::from_parts(IBig::from(numerator), IBig::from(denominator))
    }

    /// Creates an integral rational.
    #[must_use]
    pub fn from_integer(n: i64) -> Self {
        Self(RBig::from(IBig::from(n)))
    }

    fn from_parts(numerator: IBig, denominator: IBig) -> Self {
        let negative = DashuSigned::is_negative(&denominator);
        let value = RBig::from_parts(numerator, denominator.unsigned_abs());
        if negative {
            Self(-value)
        } else {
            Self(value)
        }
    }

    /// Parses a decimal literal such as `12`, `-0.25`, `.5` or `1.5e-3`.
    ///
    /// The conversion is exact: `0.1` becomes `1/10`, not the nearest binary
    /// float. Returns `None` for anything that is not a plain decimal literal,
    /// and for literals whose power of ten exceeds [`MAX_DECIMAL_SCALE`].
    #[must_use]
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, body) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (mantissa, exponent) = match body.find(|c: char| c == 'e' || c == 'E') {
            Some(pos) => (&body[..pos], body[pos + 1..].parse::<i32>().ok()?),
            None => (body, 0),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let digits = format!("{int_part}{frac_part}");
        let numerator = IBig::from_str_radix(&digits, 10).ok()?;
        let scale = i32::try_from(frac_part.len()).ok()?.checked_sub(exponent)?;
        if scale.unsigned_abs() > MAX_DECIMAL_SCALE {
            return None;
        }

        let ten = Self::from_integer(10);
        let mut value = Self(RBig::from(numerator));
        value = if scale >= 0 {
            value / ten.pow(scale)
        } else {
            value * ten.pow(-scale)
        };

        Some(if negative { -value } else { value })
    }

    /// Returns the numerator.
    #[must_use]
    pub fn numerator(&self) -> IBig {
        self.0.numerator().clone()
    }

    /// Returns the (positive) denominator.
    #[must_use]
    pub fn denominator(&self) -> IBig {
        IBig::from(self.0.denominator().clone())
    }

    /// Returns true if the denominator is one.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.denominator().is_one()
    }

    /// Converts to an i64 when the value is an integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.numerator().try_into().ok()
        } else {
            None
        }
    }

    /// Returns numerator and denominator as machine integers when they fit.
    #[must_use]
    pub fn to_i64_parts(&self) -> Option<(i64, i64)> {
        let num: i64 = self.numerator().try_into().ok()?;
        let den: i64 = self.denominator().try_into().ok()?;
        Some((num, den))
    }

    /// Nearest `f64`. Huge values saturate to infinity.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        if let Some((num, den)) = self.to_i64_parts() {
            #[allow(clippy::cast_precision_loss)]
            return num as f64 / den as f64;
        }
        let num: f64 = self.numerator().to_string().parse().unwrap_or(f64::NAN);
        let den: f64 = self.denominator().to_string().parse().unwrap_or(f64::NAN);
        num / den
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the reciprocal, or `None` for zero.
    #[must_use]
    pub fn checked_recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self(self.0.clone().inv()))
        }
    }

    /// Returns the sign: -1, 0, or 1.
    #[must_use]
    pub fn signum(&self) -> i8 {
        if self.0.is_zero() {
            0
        } else if DashuSigned::is_positive(&self.0) {
            1
        } else {
            -1
        }
    }

    /// Returns true if negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns true if strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        DashuSigned::is_positive(&self.0)
    }

    /// Raises to an integer power.
    ///
    /// # Panics
    ///
    /// Panics on a negative power of zero; use [`Rational::checked_pow`] when
    /// the base may be zero.
    #[must_use]
    pub fn pow(&self, exp: i32) -> Self {
        self.checked_pow(exp).expect("negative power of zero")
    }

    /// Raises to an integer power, returning `None` for `0^-n`.
    #[must_use]
    pub fn checked_pow(&self, exp: i32) -> Option<Self> {
        let magnitude = Self(self.0.pow(exp.unsigned_abs() as usize));
        if exp >= 0 {
            Some(magnitude)
        } else {
            magnitude.checked_recip()
        }
    }

    /// Exact square root when numerator and denominator are perfect squares.
    #[must_use]
    pub fn sqrt_exact(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        let (num, den) = self.to_i64_parts()?;
        let num_root = isqrt_exact(num.unsigned_abs())?;
        let den_root = isqrt_exact(den.unsigned_abs())?;
        Some(Self::from_i64(
            i64::try_from(num_root).ok()?,
            i64::try_from(den_root).ok()?,
        ))
    }

    /// Splits a positive integer `n` into `(a, b)` with `n = a² · b` and `b`
    /// square-free, for `n` below 10¹².
    #[must_use]
    pub fn square_factor(&self) -> Option<(i64, i64)> {
        let n = self.to_i64()?;
        if n <= 0 || n > 1_000_000_000_000 {
            return None;
        }
        let mut outside = 1;
        let mut inside = n;
        let mut d = 2;
        while d * d <= inside {
            while inside % (d * d) == 0 {
                inside /= d * d;
                outside *= d;
            }
            d += 1;
        }
        Some((outside, inside))
    }
}

fn isqrt_exact(n: u64) -> Option<u64> {
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let guess = (n as f64).sqrt() as u64;
    (guess.saturating_sub(1)..=guess + 1).find(|r| r.checked_mul(*r) == Some(n))
}

impl Zero for Rational {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<&Rational> for Rational {
    type Output = Self;

    fn add(self, rhs: &Rational) -> Self::Output {
        Self(self.0 + &rhs.0)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul<&Rational> for Rational {
    type Output = Self;

    fn mul(self, rhs: &Rational) -> Self::Output {
        Self(self.0 * &rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for Rational {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when dividing by zero.
    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Div for &Rational {
    type Output = Rational;

    fn div(self, rhs: Self) -> Self::Output {
        Rational(&self.0 / &rhs.0)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-&self.0)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_integer(i64::from(n))
    }
}
