//! The contract between edit chains and the external media engine.

use std::path::{Path, PathBuf};

use moviekit_clip_model::{InstructionSet, ProbeInfo};
use moviekit_common::error::MoviekitResult;
use serde::Serialize;

/// One input of an engine invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpec {
    /// File to read.
    pub path: PathBuf,

    /// Options that apply to this input (placed before `-i`).
    pub options: InstructionSet,
}

impl InputSpec {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: InstructionSet::new(),
        }
    }

    pub fn with_options(mut self, options: InstructionSet) -> Self {
        self.options = options;
        self
    }
}

/// A complete, self-contained request to produce one output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invocation {
    /// Inputs in order.
    pub inputs: Vec<InputSpec>,

    /// Destination file.
    pub output: PathBuf,

    /// Options applied to the output.
    pub output_options: InstructionSet,

    /// Replace `output` if it already exists.
    pub overwrite: bool,
}

impl Invocation {
    /// Single-input invocation writing `output` with `options`, overwriting.
    pub fn single(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        options: InstructionSet,
    ) -> Self {
        Self {
            inputs: vec![InputSpec::new(input)],
            output: output.into(),
            output_options: options,
            overwrite: true,
        }
    }

    /// Pretty JSON rendering, used for dry runs and debug reports.
    pub fn to_json(&self) -> MoviekitResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Trait for media engines (ffmpeg, test doubles, ...).
///
/// Every call blocks until the engine is done.
pub trait MediaEngine: Send {
    /// Inspect `path` and report its dimensions and duration.
    fn probe(&self, path: &Path) -> MoviekitResult<ProbeInfo>;

    /// Run one invocation to completion.
    fn execute(&self, invocation: &Invocation) -> MoviekitResult<()>;

    /// Check if this engine is available on the system.
    fn is_available(&self) -> bool;

    /// Engine name.
    fn name(&self) -> &str;
}
