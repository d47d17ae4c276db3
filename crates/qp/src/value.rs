//! Coercion of raw query string values into typed field values.

use crate::error::ErrorKind;
use std::fmt;

/// The broad category of a field's value, used for documentation and constraint checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Boolean,
    Integer,
    Float,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "number"),
        }
    }
}

/// A type that a single query parameter can be decoded into.
///
/// Implemented for `String`, `bool`, the primitive integers and floats, and `Option<T>` of any of
/// them. An `Option` field may be absent from the query string.
pub trait QueryValue: Sized {
    const KIND: ValueKind;
    const OPTIONAL: bool = false;

    /// Decodes one raw (already percent-decoded) query value.
    fn from_raw(raw: &str) -> Result<Self, ErrorKind>;

    /// The natural string form of this value, `None` if there is nothing to write.
    fn to_raw(&self) -> Option<String>;

    /// The value an optional field takes when it is absent.
    fn absent() -> Option<Self> {
        None
    }

    fn as_number(&self) -> Option<f64> {
        None
    }

    fn char_len(&self) -> Option<usize> {
        None
    }
}

impl QueryValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_raw(raw: &str) -> Result<Self, ErrorKind> {
        Ok(raw.to_owned())
    }

    fn to_raw(&self) -> Option<String> {
        Some(self.clone())
    }

    fn char_len(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

impl QueryValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_raw(raw: &str) -> Result<Self, ErrorKind> {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
            _ => Err(ErrorKind::Bool),
        }
    }

    fn to_raw(&self) -> Option<String> {
        Some(self.to_string())
    }
}

macro_rules! impl_query_value_for_int {
    ($($ty:ty),*) => {
        $(
            impl QueryValue for $ty {
                const KIND: ValueKind = ValueKind::Integer;

                fn from_raw(raw: &str) -> Result<Self, ErrorKind> {
                    raw.trim().parse::<$ty>().or(Err(ErrorKind::Integer))
                }

                fn to_raw(&self) -> Option<String> {
                    Some(self.to_string())
                }

                #[allow(clippy::cast_precision_loss, clippy::cast_lossless, reason = "bounds are compared as f64")]
                fn as_number(&self) -> Option<f64> {
                    Some(*self as f64)
                }
            }
        )*
    };
}

impl_query_value_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_query_value_for_float {
    ($($ty:ty),*) => {
        $(
            impl QueryValue for $ty {
                const KIND: ValueKind = ValueKind::Float;

                fn from_raw(raw: &str) -> Result<Self, ErrorKind> {
                    raw.trim().parse::<$ty>().or(Err(ErrorKind::Float))
                }

                fn to_raw(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn as_number(&self) -> Option<f64> {
                    Some(f64::from(*self))
                }
            }
        )*
    };
}

impl_query_value_for_float!(f32, f64);

impl<T: QueryValue> QueryValue for Option<T> {
    const KIND: ValueKind = T::KIND;
    const OPTIONAL: bool = true;

    fn from_raw(raw: &str) -> Result<Self, ErrorKind> {
        T::from_raw(raw).map(Some)
    }

    fn to_raw(&self) -> Option<String> {
        self.as_ref().and_then(T::to_raw)
    }

    fn absent() -> Option<Self> {
        Some(None)
    }

    fn as_number(&self) -> Option<f64> {
        self.as_ref().and_then(T::as_number)
    }

    fn char_len(&self) -> Option<usize> {
        self.as_ref().and_then(T::char_len)
    }
}
