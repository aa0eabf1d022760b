//! Target types of `CAST`.

use std::fmt;

/// A type name with its optional parameters, as in `DECIMAL(10, 2)`.
///
/// Types pass through the compiler untouched, so they are not interpreted:
/// any name is accepted and printed back in upper case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataType {
    pub name: String,
    /// Length, or precision and scale.
    pub params: Vec<u32>,
}

impl DataType {
    /// A type without parameters.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn param(mut self, value: u32) -> Self {
        self.params.push(value);
        self
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name.to_ascii_uppercase())?;
        if let Some((first, rest)) = self.params.split_first() {
            write!(f, "({first}")?;
            for param in rest {
                write!(f, ", {param}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}
