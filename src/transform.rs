//! The built-in transform set and its registry.
//!
//! Transforms operate on raw bytes; case folding and trimming are
//! ASCII-only and leave every other byte untouched.

use crate::error::{PipelineError, Result};
use crate::stage::Transform;

/// Default literal prepended by [`Prefix`]
pub const DEFAULT_PREFIX: &str = "PREFIX:";

/// Default literal appended by [`Suffix`]
pub const DEFAULT_SUFFIX: &str = ":SUFFIX";

/// Create a transform by registry name.
///
/// `config` is an opaque per-stage string; `prefix` and `suffix` use it to
/// override their literal, the rest ignore it.
pub fn create(name: &str, config: Option<&str>) -> Result<Box<dyn Transform>> {
    match name {
        "upper" => Ok(Box::new(Upper)),
        "lower" => Ok(Box::new(Lower)),
        "reverse" => Ok(Box::new(Reverse)),
        "trim" => Ok(Box::new(Trim)),
        "prefix" => Ok(Box::new(Prefix::new(config.unwrap_or(DEFAULT_PREFIX)))),
        "suffix" => Ok(Box::new(Suffix::new(config.unwrap_or(DEFAULT_SUFFIX)))),
        _ => Err(PipelineError::UnknownTransform(name.to_string())),
    }
}

/// Names of every registered transform, in registry order
pub fn names() -> &'static [&'static str] {
    &["upper", "lower", "reverse", "trim", "prefix", "suffix"]
}

/// Uppercase each ASCII letter
pub struct Upper;

impl Transform for Upper {
    fn apply(&mut self, mut input: Vec<u8>) -> Result<Vec<u8>> {
        input.make_ascii_uppercase();
        Ok(input)
    }

    fn name(&self) -> &str {
        "upper"
    }
}

/// Lowercase each ASCII letter
pub struct Lower;

impl Transform for Lower {
    fn apply(&mut self, mut input: Vec<u8>) -> Result<Vec<u8>> {
        input.make_ascii_lowercase();
        Ok(input)
    }

    fn name(&self) -> &str {
        "lower"
    }
}

/// Reverse the byte sequence
pub struct Reverse;

impl Transform for Reverse {
    fn apply(&mut self, mut input: Vec<u8>) -> Result<Vec<u8>> {
        input.reverse();
        Ok(input)
    }

    fn name(&self) -> &str {
        "reverse"
    }
}

/// Remove leading and trailing ASCII whitespace
pub struct Trim;

impl Transform for Trim {
    fn apply(&mut self, input: Vec<u8>) -> Result<Vec<u8>> {
        Ok(input.trim_ascii().to_vec())
    }

    fn name(&self) -> &str {
        "trim"
    }
}

/// Prepend a literal to each line
pub struct Prefix {
    literal: Vec<u8>,
}

impl Prefix {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into().into_bytes(),
        }
    }
}

impl Transform for Prefix {
    fn apply(&mut self, input: Vec<u8>) -> Result<Vec<u8>> {
        let mut line = Vec::with_capacity(self.literal.len() + input.len());
        line.extend_from_slice(&self.literal);
        line.extend_from_slice(&input);
        Ok(line)
    }

    fn name(&self) -> &str {
        "prefix"
    }
}

/// Append a literal to each line
pub struct Suffix {
    literal: Vec<u8>,
}

impl Suffix {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into().into_bytes(),
        }
    }
}

impl Transform for Suffix {
    fn apply(&mut self, mut input: Vec<u8>) -> Result<Vec<u8>> {
        input.extend_from_slice(&self.literal);
        Ok(input)
    }

    fn name(&self) -> &str {
        "suffix"
    }
}
