use crate::{EmulatorError, Result};
use std::fmt;
use std::str::FromStr;

/// A dotted handler reference such as `mathlib.square` or `pkg.jobs.handle`.
///
/// The final segment names the function; everything before it is the module
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerReference {
    raw: String,
    split: usize,
}

impl HandlerReference {
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |why: &str| EmulatorError::import(raw, why);

        if raw.is_empty() {
            return Err(malformed("the handler reference is empty"));
        }
        let split = raw
            .rfind('.')
            .ok_or_else(|| malformed("expected `module.function`, found no `.` separator"))?;

        for segment in raw.split('.') {
            if segment.is_empty() {
                return Err(malformed("the reference contains an empty segment"));
            }
            if segment
                .chars()
                .any(|c| c.is_whitespace() || c == '/' || c == '\\')
            {
                return Err(malformed(&format!(
                    "segment `{}` contains whitespace or a path separator",
                    segment
                )));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            split,
        })
    }

    /// Module path, e.g. `pkg.jobs` for `pkg.jobs.handle`.
    pub fn module(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Function name, e.g. `handle` for `pkg.jobs.handle`.
    pub fn function(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    pub fn module_segments(&self) -> impl Iterator<Item = &str> {
        self.module().split('.')
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for HandlerReference {
    type Err = EmulatorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
