//! Configuration for a diff run.
//!
//! `DiffConfig` carries everything that varies per run: the source
//! descriptions echoed into the run summary, one ignore-rule list per
//! side, and the style-reporting mode.

use crate::ignore::{IgnoreError, WorkbookIgnores};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Description of the first input (typically its path), echoed into
    /// the run summary.
    pub source_a: String,
    /// Description of the second input.
    pub source_b: String,
    /// Ignore rules applied to the first input's cell stream.
    pub ignore_a: Vec<String>,
    /// Ignore rules applied to the second input's cell stream.
    pub ignore_b: Vec<String>,
    /// Report every mismatching style attribute instead of stopping at
    /// the first one in the fixed order.
    pub all_style_mismatches: bool,
}

impl Default for DiffConfig {
    fn default() -> DiffConfig {
        DiffConfig {
            source_a: String::new(),
            source_b: String::new(),
            ignore_a: Vec::new(),
            ignore_b: Vec::new(),
            all_style_mismatches: false,
        }
    }
}

impl DiffConfig {
    pub fn builder() -> DiffConfigBuilder {
        DiffConfigBuilder {
            inner: DiffConfig::default(),
        }
    }

    /// Check that both rule lists compile. The engine re-compiles on
    /// every run; this surfaces rule errors before any file is opened.
    pub fn validate(&self) -> Result<(), IgnoreError> {
        WorkbookIgnores::compile(&self.ignore_a)?;
        WorkbookIgnores::compile(&self.ignore_b)?;
        Ok(())
    }

    /// Compile both rule lists into their per-sheet form.
    pub fn compiled_ignores(&self) -> Result<(WorkbookIgnores, WorkbookIgnores), IgnoreError> {
        Ok((
            WorkbookIgnores::compile(&self.ignore_a)?,
            WorkbookIgnores::compile(&self.ignore_b)?,
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiffConfigBuilder {
    inner: DiffConfig,
}

impl DiffConfigBuilder {
    pub fn new() -> DiffConfigBuilder {
        DiffConfig::builder()
    }

    pub fn source_a(mut self, value: impl Into<String>) -> DiffConfigBuilder {
        self.inner.source_a = value.into();
        self
    }

    pub fn source_b(mut self, value: impl Into<String>) -> DiffConfigBuilder {
        self.inner.source_b = value.into();
        self
    }

    pub fn ignore_a(mut self, rules: Vec<String>) -> DiffConfigBuilder {
        self.inner.ignore_a = rules;
        self
    }

    pub fn ignore_b(mut self, rules: Vec<String>) -> DiffConfigBuilder {
        self.inner.ignore_b = rules;
        self
    }

    pub fn all_style_mismatches(mut self, value: bool) -> DiffConfigBuilder {
        self.inner.all_style_mismatches = value;
        self
    }

    pub fn build(self) -> Result<DiffConfig, IgnoreError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}
