//! moviekit Render Engine
//!
//! Turns edit chains into files by driving an external media engine.
//!
//! # Pipeline Architecture
//!
//! ```text
//! source.mp4 ── load ──► Video ── resize / fade ──► Video (staged args)
//!                                     │
//!                 ┌───────────────────┼────────────────────┐
//!                 ▼                   ▼                    ▼
//!          output(dest).run     subclip(start,end)    concatenate([..])
//!                 │              temp render +          stage edited clips,
//!                 │              reload (transient)     manifest, stream copy
//!                 ▼                   ▼                    ▼
//!             dest file        transient Video       transient Video
//! ```

pub mod backend;
pub mod concat;
pub mod editor;
pub mod ffmpeg;

pub use backend::{InputSpec, Invocation, MediaEngine};
pub use concat::{build_manifest, concatenate};
pub use editor::{Editor, RenderRequest};
pub use ffmpeg::FfmpegBackend;
