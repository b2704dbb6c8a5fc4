//! Typed binding of raw command line values.
//!
//! The interpreter never looks at types: it hands raw strings to a [`Binding`]. A [`Value`] is
//! the stock binding, a shared handle that converts each raw string with [`Unmarshal`] and keeps
//! the results for the caller to read once parsing is done.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::error::Error;

/// Conversion from a raw command line value.
pub trait Unmarshal: Sized {
    /// Whether a flag bound to this type means `true` when it is given without value.
    const IS_BOOL: bool = false;

    /// Convert the raw value.
    fn unmarshal(raw: &str) -> Result<Self, Error>;
}

macro_rules! make_unmarshal_impl {
    ($($target:ty => $expected:literal),* $(,)?) => {
        $(
            impl Unmarshal for $target {
                fn unmarshal(raw: &str) -> Result<Self, Error> {
                    raw.parse::<$target>().map_err(|_| Error::InvalidFormat {
                        raw: String::from(raw),
                        expected: $expected,
                    })
                }
            }
        )*
    };
}

make_unmarshal_impl!(
    u8 => "an unsigned 8-bit integer",
    u16 => "an unsigned 16-bit integer",
    u32 => "an unsigned 32-bit integer",
    u64 => "an unsigned 64-bit integer",
    usize => "an unsigned integer",
    i8 => "a signed 8-bit integer",
    i16 => "a signed 16-bit integer",
    i32 => "a signed 32-bit integer",
    i64 => "a signed 64-bit integer",
    isize => "a signed integer",
    f32 => "a floating point number",
    f64 => "a floating point number",
    char => "a single character",
);

impl Unmarshal for bool {
    const IS_BOOL: bool = true;

    fn unmarshal(raw: &str) -> Result<Self, Error> {
        match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(Error::InvalidFormat {
                raw: String::from(raw),
                expected: "a boolean",
            }),
        }
    }
}

impl Unmarshal for String {
    fn unmarshal(raw: &str) -> Result<Self, Error> {
        Ok(String::from(raw))
    }
}

/// Destination of the raw values received by an argument.
pub trait Binding {
    /// Convert and store one raw value.
    fn bind(&mut self, raw: &str) -> Result<(), Error>;

    /// Whether a bare flag hit stands for `true`.
    fn is_bool(&self) -> bool {
        false
    }
}

type PostValidator<T> = Rc<dyn Fn(&T, &str) -> Result<(), Error>>;

/// A shared handle on the values bound to an argument.
///
/// Clone the handle, give one copy to [`Argument::bind`](crate::argument::Argument::bind) and
/// keep the other to read the values after parsing.
pub struct Value<T> {
    values: Rc<RefCell<Vec<T>>>,
    validator: Option<PostValidator<T>>,
}

impl<T> Value<T> {
    /// Create an empty handle.
    pub fn new() -> Self {
        Value {
            values: Rc::new(RefCell::new(Vec::new())),
            validator: None,
        }
    }

    /// Add a validator that runs on each converted value, along with its raw form.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T, &str) -> Result<(), Error> + 'static,
    {
        self.validator = Some(Rc::new(validator));
        self
    }

    /// Check if at least one value has been bound.
    #[inline(always)]
    pub fn is_set(&self) -> bool {
        !self.values.borrow().is_empty()
    }

    /// Number of values bound so far.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Check if no value has been bound.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        !self.is_set()
    }

    /// Get the last bound value.
    pub fn get(&self) -> Option<T>
    where
        T: Clone,
    {
        self.values.borrow().last().cloned()
    }

    /// Get every bound value, in order.
    pub fn all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values.borrow().clone()
    }
}

impl<T> Clone for Value<T> {
    fn clone(&self) -> Self {
        Value {
            values: Rc::clone(&self.values),
            validator: self.validator.clone(),
        }
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("values", &self.values.borrow())
            .finish_non_exhaustive()
    }
}

impl<T: Unmarshal> Binding for Value<T> {
    fn bind(&mut self, raw: &str) -> Result<(), Error> {
        let value = T::unmarshal(raw)?;

        if let Some(validator) = &self.validator {
            validator(&value, raw)?;
        }

        self.values.borrow_mut().push(value);
        Ok(())
    }

    fn is_bool(&self) -> bool {
        T::IS_BOOL
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[test]
    fn it_should_unmarshal_numbers() {
        assert_that!(u32::unmarshal("42").ok(), eq(Some(42)));
        assert_that!(i32::unmarshal("-42").ok(), eq(Some(-42)));
        assert_that!(f64::unmarshal("2.5").ok(), eq(Some(2.5)));
        assert_that!(u8::unmarshal("256").is_err(), eq(true));
    }

    #[test]
    fn it_should_unmarshal_booleans() {
        assert_that!(bool::unmarshal("true").ok(), eq(Some(true)));
        assert_that!(bool::unmarshal("F").ok(), eq(Some(false)));
        assert_that!(bool::unmarshal("yes").is_err(), eq(true));
        assert_that!(bool::IS_BOOL, eq(true));
        assert_that!(u32::IS_BOOL, eq(false));
    }

    #[test]
    fn it_should_report_expected_format() {
        let error = u16::unmarshal("abc").unwrap_err();

        assert_that!(
            error
                == Error::InvalidFormat {
                    raw: String::from("abc"),
                    expected: "an unsigned 16-bit integer"
                },
            eq(true)
        );
    }

    #[test]
    fn it_should_share_bound_values_between_clones() {
        let value = Value::<u32>::new();
        let mut binding = value.clone();

        binding.bind("1").unwrap();
        binding.bind("2").unwrap();

        let all = value.all();
        assert_that!(value.len(), eq(2));
        assert_that!(value.get(), eq(Some(2)));
        assert_that!(all.as_slice(), eq(&[1, 2]));
    }

    #[test]
    fn it_should_run_post_validator() {
        let value = Value::<u32>::new().validate(|v, raw| {
            if *v > 10 {
                return Err(Error::validation(raw, "must be at most 10"));
            }
            Ok(())
        });
        let mut binding = value.clone();

        assert_that!(binding.bind("3").is_ok(), eq(true));
        assert_that!(binding.bind("11").is_err(), eq(true));

        let all = value.all();
        assert_that!(all.as_slice(), eq(&[3]));
    }
}
