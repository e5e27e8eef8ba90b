//! moviekit Clip Model
//!
//! Defines the value types an edit chain is built from:
//! - **Clip:** the [`Video`] descriptor and its pure transforms (resize, fade, trim staging)
//! - **Args:** staged engine arguments and the compiler that flattens them
//! - **Probe:** stream metadata parsed from the inspection tool
//!
//! Every transform returns a new descriptor. Rendering lives in the render engine.

pub mod args;
pub mod clip;
pub mod probe;

pub use args::{compile, keys, InstructionSet, PendingArgs};
pub use clip::{SourceHandle, Video};
pub use probe::ProbeInfo;
