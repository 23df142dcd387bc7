//! Leaf storage: conversion from matched text into typed fields.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConversionError;
use crate::option::RawValue;

/// A typed field an option can be bound to.
pub trait Slot {
    /// Flags are set by presence alone and never consume a value; they are
    /// registered without a terminator, so `--flag=x` or `--flag:false` is an
    /// `UnexpectedValue` match error.
    fn is_flag(&self) -> bool {
        false
    }

    /// Whether the field still holds the default value of its type.
    fn is_type_default(&self) -> bool;

    /// Current value as shown in `default=` annotations.
    fn render(&self) -> String;

    fn type_name(&self) -> &'static str;

    /// Convert `value` and store it. `option` is only used for error reporting.
    fn assign(&mut self, option: &str, value: &RawValue) -> Result<(), ConversionError>;
}

fn convert<T: FromStr>(option: &str, text: &str, target: &'static str) -> Result<T, ConversionError> {
    text.parse::<T>().map_err(|_| ConversionError {
        option: option.to_string(),
        value: text.to_string(),
        target,
    })
}

/// Last path segment of a type name (`alloc::string::String` -> `String`).
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

impl Slot for bool {
    fn is_flag(&self) -> bool {
        true
    }

    fn is_type_default(&self) -> bool {
        !*self
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn assign(&mut self, _option: &str, _value: &RawValue) -> Result<(), ConversionError> {
        *self = true;
        Ok(())
    }
}

macro_rules! scalar_slot {
    ($($t:ty),* $(,)?) => {$(
        impl Slot for $t {
            fn is_type_default(&self) -> bool {
                *self == <$t>::default()
            }

            fn render(&self) -> String {
                self.to_string()
            }

            fn type_name(&self) -> &'static str {
                stringify!($t)
            }

            fn assign(&mut self, option: &str, value: &RawValue) -> Result<(), ConversionError> {
                if let Some(text) = value.as_text() {
                    *self = convert(option, text, stringify!($t))?;
                }
                Ok(())
            }
        }
    )*};
}

scalar_slot!(
    String, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Slot for PathBuf {
    fn is_type_default(&self) -> bool {
        self.as_os_str().is_empty()
    }

    fn render(&self) -> String {
        self.display().to_string()
    }

    fn type_name(&self) -> &'static str {
        "PathBuf"
    }

    fn assign(&mut self, _option: &str, value: &RawValue) -> Result<(), ConversionError> {
        if let Some(text) = value.as_text() {
            *self = PathBuf::from(text);
        }
        Ok(())
    }
}

impl<T: FromStr + Display> Slot for Option<T> {
    fn is_type_default(&self) -> bool {
        self.is_none()
    }

    fn render(&self) -> String {
        self.as_ref().map(|v| v.to_string()).unwrap_or_default()
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn assign(&mut self, option: &str, value: &RawValue) -> Result<(), ConversionError> {
        if let Some(text) = value.as_text() {
            *self = Some(convert(option, text, short_type_name::<T>())?);
        }
        Ok(())
    }
}

/// Repeatable option: every occurrence appends one element.
impl<T: FromStr + Display> Slot for Vec<T> {
    fn is_type_default(&self) -> bool {
        self.is_empty()
    }

    fn render(&self) -> String {
        self.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn type_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn assign(&mut self, option: &str, value: &RawValue) -> Result<(), ConversionError> {
        if let Some(text) = value.as_text() {
            self.push(convert(option, text, short_type_name::<T>())?);
        }
        Ok(())
    }
}
