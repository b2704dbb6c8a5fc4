//! Values attached to flags or given as positional arguments.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::Error;
use crate::value::Binding;

/// A check on the raw value, run before it is converted.
pub type Validator = Box<dyn Fn(&str) -> Result<(), Error>>;

/// Defines an `Argument`, either the value of a flag or a positional argument of a command.
///
/// Arguments are required by default. For a flag, an optional argument means that the flag may
/// be given without value.
pub struct Argument {
    name: String,
    description: String,
    required: bool,
    multiple: bool,
    default: Option<String>,
    values: Vec<String>,
    rejected: bool,
    binding: Option<Box<dyn Binding>>,
    validators: Vec<Validator>,
}

impl Argument {
    /// Create a required argument.
    pub fn new(name: impl Into<String>) -> Self {
        Argument {
            name: name.into(),
            description: String::new(),
            required: true,
            multiple: false,
            default: None,
            values: Vec::new(),
            rejected: false,
            binding: None,
            validators: Vec::new(),
        }
    }

    /// Set the description shown in help.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Make the argument optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Let a positional argument absorb every remaining plain value.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Set the raw value applied when the argument is never given.
    pub fn with_default(mut self, raw: impl Into<String>) -> Self {
        self.default = Some(raw.into());
        self
    }

    /// Bind the raw values to a typed destination, usually a [`Value`](crate::value::Value).
    pub fn bind(mut self, binding: impl Binding + 'static) -> Self {
        self.binding = Some(Box::new(binding));
        self
    }

    /// Add a validator on raw values.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Result<(), Error> + 'static,
    {
        self.validators.push(Box::new(validator));
        self
    }

    /// Name of the argument.
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description of the argument.
    #[inline(always)]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Check if a value must be given.
    #[inline(always)]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Check if the argument accepts more than one value.
    #[inline(always)]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Check if a default value is declared.
    #[inline(always)]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Retrieve the default raw value.
    #[inline(always)]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Check if at least one value has been accepted.
    #[inline(always)]
    pub fn was_hit(&self) -> bool {
        !self.values.is_empty()
    }

    /// Check if a value has been given but refused by a validator or the binding.
    #[inline(always)]
    pub fn was_rejected(&self) -> bool {
        self.rejected
    }

    /// Check if the bound destination is a boolean.
    #[inline(always)]
    pub fn is_bool(&self) -> bool {
        self.binding.as_ref().is_some_and(|x| x.is_bool())
    }

    /// Retrieve the last accepted raw value.
    #[inline(always)]
    pub fn raw_value(&self) -> Option<&str> {
        self.values.last().map(String::as_str)
    }

    /// Retrieve every accepted raw value, in order.
    #[inline(always)]
    pub fn raw_values(&self) -> &[String] {
        &self.values
    }

    /// Validate, convert and store a raw value. The value is only recorded when every step
    /// succeeded.
    pub fn set_value(&mut self, raw: &str) -> Result<(), Error> {
        if let Err(error) = self.convert(raw) {
            self.rejected = true;
            return Err(error);
        }

        self.values.push(String::from(raw));
        Ok(())
    }

    fn convert(&mut self, raw: &str) -> Result<(), Error> {
        for validator in &self.validators {
            validator(raw)?;
        }

        match self.binding.as_mut() {
            Some(binding) => binding.bind(raw),
            None => Ok(()),
        }
    }

    /// Apply the default value if one is declared.
    pub(crate) fn apply_default(&mut self) -> Result<(), Error> {
        match self.default.clone() {
            Some(raw) => {
                trace!("applying default `{}` to {}", raw.as_str(), self.name.as_str());
                self.set_value(&raw)
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("multiple", &self.multiple)
            .field("default", &self.default)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}
