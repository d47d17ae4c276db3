//! Declarative per-field constraints.
//!
//! Constraints are only checked against values that were supplied in the query string; a field's
//! default is trusted as-is.

use crate::error::ErrorKind;
use crate::value::QueryValue;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constraint {
    /// value >= bound
    Ge(f64),
    /// value > bound
    Gt(f64),
    /// value <= bound
    Le(f64),
    /// value < bound
    Lt(f64),
    MinLength(usize),
    MaxLength(usize),
}

impl Constraint {
    /// Checks `value` against this constraint.
    ///
    /// Values the constraint does not apply to (a length bound on a number, or an absent optional)
    /// always pass.
    pub fn check<T: QueryValue>(&self, value: &T) -> Result<(), ErrorKind> {
        match *self {
            Constraint::Ge(limit) => match value.as_number() {
                Some(n) if n < limit => Err(ErrorKind::NotGe { limit }),
                _ => Ok(()),
            },
            Constraint::Gt(limit) => match value.as_number() {
                Some(n) if n <= limit => Err(ErrorKind::NotGt { limit }),
                _ => Ok(()),
            },
            Constraint::Le(limit) => match value.as_number() {
                Some(n) if n > limit => Err(ErrorKind::NotLe { limit }),
                _ => Ok(()),
            },
            Constraint::Lt(limit) => match value.as_number() {
                Some(n) if n >= limit => Err(ErrorKind::NotLt { limit }),
                _ => Ok(()),
            },
            Constraint::MinLength(limit) => match value.char_len() {
                Some(len) if len < limit => Err(ErrorKind::MinLength { limit }),
                _ => Ok(()),
            },
            Constraint::MaxLength(limit) => match value.char_len() {
                Some(len) if len > limit => Err(ErrorKind::MaxLength { limit }),
                _ => Ok(()),
            },
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Ge(limit) => write!(f, ">= {limit}"),
            Constraint::Gt(limit) => write!(f, "> {limit}"),
            Constraint::Le(limit) => write!(f, "<= {limit}"),
            Constraint::Lt(limit) => write!(f, "< {limit}"),
            Constraint::MinLength(limit) => write!(f, "min length {limit}"),
            Constraint::MaxLength(limit) => write!(f, "max length {limit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let ge = Constraint::Ge(0.0);
        let le = Constraint::Le(1000.0);

        assert_eq!(le.check(&1000_u32), Ok(()));
        assert_eq!(le.check(&1001_u32), Err(ErrorKind::NotLe { limit: 1000.0 }));
        assert_eq!(ge.check(&0_i32), Ok(()));
        assert_eq!(ge.check(&-1_i32), Err(ErrorKind::NotGe { limit: 0.0 }));
    }

    #[test]
    fn test_exclusive_bounds() {
        assert_eq!(Constraint::Gt(1.0).check(&1.0_f64), Err(ErrorKind::NotGt { limit: 1.0 }));
        assert_eq!(Constraint::Lt(1.0).check(&0.5_f64), Ok(()));
    }

    #[test]
    fn test_length() {
        let min = Constraint::MinLength(2);
        assert_eq!(min.check(&"ab".to_owned()), Ok(()));
        assert_eq!(min.check(&"a".to_owned()), Err(ErrorKind::MinLength { limit: 2 }));
        assert_eq!(Constraint::MaxLength(1).check(&"ab".to_owned()), Err(ErrorKind::MaxLength { limit: 1 }));
    }

    #[test]
    fn test_not_applicable_passes() {
        assert_eq!(Constraint::MaxLength(1).check(&100_u32), Ok(()));
        assert_eq!(Constraint::Le(1.0).check(&None::<u32>), Ok(()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::Le(1000.0).to_string(), "<= 1000");
        assert_eq!(Constraint::MinLength(3).to_string(), "min length 3");
    }
}
