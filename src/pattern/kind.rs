// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scalar kinds a placeholder may be converted into, and the converted
//! [`Value`]s themselves.

use std::str::FromStr;

use derive_more::with_trait::{Display, Error, From};

use super::Error as PatternError;

/// Scalar kind of a `{placeholder}` captured by a [`StepPattern`].
///
/// [`StepPattern`]: super::StepPattern
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, PartialEq)]
pub enum ParamKind {
    /// Captured text is passed through as is.
    #[default]
    #[display("string")]
    String,

    /// Captured text is parsed as a signed 64-bit integer.
    #[display("int")]
    Int,

    /// Captured text is parsed as a 64-bit float.
    #[display("double")]
    Double,

    /// Captured text is parsed as `true` or `false`.
    #[display("bool")]
    Bool,
}

impl ParamKind {
    /// Converts the `raw` text captured by the `placeholder` into a [`Value`]
    /// of this [`ParamKind`].
    ///
    /// # Errors
    ///
    /// If the `raw` text cannot be represented as this [`ParamKind`]. The text
    /// is never coerced into some default value.
    pub fn convert(self, placeholder: &str, raw: &str) -> Result<Value, PatternError> {
        let failed = || PatternError::Conversion {
            placeholder: placeholder.to_owned(),
            value: raw.to_owned(),
            kind: self,
        };
        Ok(match self {
            Self::String => Value::String(raw.to_owned()),
            Self::Int => Value::Int(raw.parse().map_err(|_| failed())?),
            Self::Double => Value::Double(raw.parse().map_err(|_| failed())?),
            Self::Bool => Value::Bool(raw.parse().map_err(|_| failed())?),
        })
    }
}

/// Error of parsing an unknown [`ParamKind`] name.
#[derive(Clone, Debug, Display, Error)]
#[display("unknown parameter kind `{_0}`, expected one of: string, int, double, bool")]
pub struct UnknownKind(#[error(not(source))] String);

impl FromStr for ParamKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" | "str" | "String" => Ok(Self::String),
            "int" | "i64" | "integer" => Ok(Self::Int),
            "double" | "f64" | "float" => Ok(Self::Double),
            "bool" | "boolean" => Ok(Self::Bool),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

/// Parameter value extracted from a step line, or resolved by a scheme
/// handler.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum Value {
    /// Textual value.
    #[display("{_0}")]
    String(String),

    /// Integer value.
    #[display("{_0}")]
    Int(i64),

    /// Floating point value.
    #[display("{_0}")]
    Double(f64),

    /// Boolean value.
    #[display("{_0}")]
    Bool(bool),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl Value {
    /// Returns the [`ParamKind`] of this [`Value`].
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::String(_) => ParamKind::String,
            Self::Int(_) => ParamKind::Int,
            Self::Double(_) => ParamKind::Double,
            Self::Bool(_) => ParamKind::Bool,
        }
    }

    /// Returns the inner text if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Int(_) | Self::Double(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the inner integer if this is a [`Value::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(_) | Self::Double(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the inner float if this is a [`Value::Double`].
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::String(_) | Self::Int(_) | Self::Bool(_) => None,
        }
    }

    /// Returns the inner flag if this is a [`Value::Bool`].
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(_) | Self::Int(_) | Self::Double(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_every_kind() {
        assert_eq!(
            ParamKind::String.convert("x", "hello").unwrap(),
            Value::String("hello".into()),
        );
        assert_eq!(ParamKind::Int.convert("x", "-42").unwrap(), Value::Int(-42));
        assert_eq!(
            ParamKind::Double.convert("x", "2.5").unwrap(),
            Value::Double(2.5),
        );
        assert_eq!(ParamKind::Bool.convert("x", "true").unwrap(), Value::Bool(true));
    }

    #[test]
    fn never_defaults_on_conversion_failure() {
        let err = ParamKind::Int.convert("count", "many").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert `many` captured by `{count}` into int",
        );
        assert!(ParamKind::Bool.convert("flag", "yes").is_err());
        assert!(ParamKind::Double.convert("ratio", "").is_err());
    }

    #[test]
    fn parses_kind_names() {
        assert_eq!("int".parse::<ParamKind>().unwrap(), ParamKind::Int);
        assert_eq!("f64".parse::<ParamKind>().unwrap(), ParamKind::Double);
        assert!("decimal".parse::<ParamKind>().is_err());
    }

    #[test]
    fn value_accessors_and_display() {
        let v = Value::from(7_i64);
        assert_eq!(v.as_int(), Some(7));
        assert_eq!(v.as_str(), None);
        assert_eq!(v.kind(), ParamKind::Int);
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::Bool(false).to_string(), "false");
    }
}
