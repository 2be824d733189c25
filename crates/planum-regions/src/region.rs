//! Plane regions with exact parameters.

use std::fmt;

use num_traits::Zero;
use planum_core::Rational;

use crate::error::ShapeError;

/// A region of integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// `[x1, x2] × [y1, y2]`.
    Rectangle {
        /// Left edge.
        x1: Rational,
        /// Right edge.
        x2: Rational,
        /// Bottom edge.
        y1: Rational,
        /// Top edge.
        y2: Rational,
    },
    /// The disk of the given radius centred at the origin.
    Disk {
        /// Radius.
        radius: Rational,
    },
    /// The triangle with vertices `(0, 0)`, `(a, 0)` and `(0, b)`.
    RightTriangle {
        /// Base along the x axis.
        a: Rational,
        /// Height along the y axis.
        b: Rational,
    },
}

impl Region {
    /// A validated rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Reversed`] unless `x1 <= x2` and `y1 <= y2`.
    /// Zero width or height is allowed.
    pub fn rectangle(x1: Rational, x2: Rational, y1: Rational, y2: Rational) -> Result<Self, ShapeError> {
        let region = Region::Rectangle { x1, x2, y1, y2 };
        region.validate()?;
        Ok(region)
    }

    /// A validated disk.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::NotPositive`] unless `radius > 0`.
    pub fn disk(radius: Rational) -> Result<Self, ShapeError> {
        let region = Region::Disk { radius };
        region.validate()?;
        Ok(region)
    }

    /// A validated right triangle.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::NotPositive`] unless both legs are positive.
    pub fn right_triangle(a: Rational, b: Rational) -> Result<Self, ShapeError> {
        let region = Region::RightTriangle { a, b };
        region.validate()?;
        Ok(region)
    }

    /// Checks the shape invariants.
    ///
    /// # Errors
    ///
    /// See the constructors.
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self {
            Region::Rectangle { x1, x2, y1, y2 } => {
                ordered("x1", x1, "x2", x2)?;
                ordered("y1", y1, "y2", y2)
            }
            Region::Disk { radius } => positive("radius", radius),
            Region::RightTriangle { a, b } => {
                positive("a", a)?;
                positive("b", b)
            }
        }
    }

    /// Short lowercase name of the shape.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Region::Rectangle { .. } => "rectangle",
            Region::Disk { .. } => "disk",
            Region::RightTriangle { .. } => "triangle",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Rectangle { x1, x2, y1, y2 } => write!(f, "rectangle [{x1}, {x2}] x [{y1}, {y2}]"),
            Region::Disk { radius } => write!(f, "disk of radius {radius}"),
            Region::RightTriangle { a, b } => write!(f, "triangle (0, 0), ({a}, 0), (0, {b})"),
        }
    }
}

/// Parses a region parameter from decimal text such as `2`, `-0.5` or `1e3`.
///
/// # Errors
///
/// Returns [`ShapeError::InvalidNumber`] for anything else.
pub fn parse_parameter(name: &'static str, text: &str) -> Result<Rational, ShapeError> {
    Rational::parse_decimal(text.trim()).ok_or_else(|| ShapeError::InvalidNumber {
        name,
        text: text.to_string(),
    })
}

fn ordered(low_name: &'static str, low: &Rational, high_name: &'static str, high: &Rational) -> Result<(), ShapeError> {
    if low > high {
        return Err(ShapeError::Reversed {
            low_name,
            high_name,
            low: low.to_string(),
            high: high.to_string(),
        });
    }
    Ok(())
}

fn positive(name: &'static str, value: &Rational) -> Result<(), ShapeError> {
    if value.is_zero() || value.is_negative() {
        return Err(ShapeError::NotPositive {
            name,
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64) -> Rational {
        Rational::from_integer(n)
    }

    #[test]
    fn test_valid_shapes() {
        assert!(Region::rectangle(r(0), r(2), r(0), r(3)).is_ok());
        assert!(Region::rectangle(r(1), r(1), r(0), r(3)).is_ok());
        assert!(Region::disk(r(2)).is_ok());
        assert!(Region::right_triangle(r(3), r(4)).is_ok());
    }

    #[test]
    fn test_invalid_shapes() {
        assert_eq!(
            Region::rectangle(r(2), r(0), r(0), r(3)),
            Err(ShapeError::Reversed {
                low_name: "x1",
                high_name: "x2",
                low: "2".to_string(),
                high: "0".to_string(),
            })
        );
        assert!(matches!(Region::disk(r(0)), Err(ShapeError::NotPositive { name: "radius", .. })));
        assert!(matches!(
            Region::right_triangle(r(3), r(-1)),
            Err(ShapeError::NotPositive { name: "b", .. })
        ));
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!(parse_parameter("x1", " 2.5 "), Ok(Rational::from_i64(5, 2)));
        assert!(matches!(
            parse_parameter("x1", "two"),
            Err(ShapeError::InvalidNumber { name: "x1", .. })
        ));
    }

    #[test]
    fn test_display() {
        let region = Region::right_triangle(r(3), r(4)).unwrap();
        assert_eq!(region.to_string(), "triangle (0, 0), (3, 0), (0, 4)");
    }
}
