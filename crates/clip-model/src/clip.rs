//! The clip descriptor and its pure edit operations.
//!
//! A [`Video`] is a value: every edit returns a new descriptor with its own copy
//! of the staged arguments. Nothing here touches the engine; the render engine
//! crate compiles and executes descriptors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moviekit_common::error::{MoviekitError, MoviekitResult, RangeViolation};
use tempfile::TempPath;

use crate::args::{self, keys, InstructionSet, PendingArgs};
use crate::probe::ProbeInfo;

#[derive(Debug)]
enum Backing {
    Source(PathBuf),
    Transient(TempPath),
}

/// Shared handle to the file behind a clip.
///
/// Transient artifacts are removed when the last handle is dropped, so a temp
/// render stays on disk exactly as long as some descriptor or pending render
/// can still read it.
#[derive(Debug, Clone)]
pub struct SourceHandle(Arc<Backing>);

impl SourceHandle {
    /// A caller-owned file that is never deleted.
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self(Arc::new(Backing::Source(path.into())))
    }

    /// A temp artifact owned by the clips that reference it.
    pub fn transient(path: TempPath) -> Self {
        Self(Arc::new(Backing::Transient(path)))
    }

    pub fn path(&self) -> &Path {
        match self.0.as_ref() {
            Backing::Source(path) => path.as_path(),
            Backing::Transient(path) => &**path,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self.0.as_ref(), Backing::Transient(_))
    }
}

/// One clip's current edit state.
#[derive(Debug, Clone)]
pub struct Video {
    source: SourceHandle,
    width: u32,
    height: u32,
    duration: f64,
    probe: Arc<serde_json::Value>,
    pending: PendingArgs,
    has_pending_edits: bool,
    extension: String,
}

impl Video {
    /// Build a fresh descriptor from probe results. No edits are staged.
    pub fn new(source: SourceHandle, extension: impl Into<String>, info: ProbeInfo) -> Self {
        Self {
            source,
            width: info.width,
            height: info.height,
            duration: info.duration,
            probe: Arc::new(info.raw),
            pending: PendingArgs::new(),
            has_pending_edits: false,
            extension: extension.into(),
        }
    }

    /// Absolute path of the backing file.
    pub fn filename(&self) -> &Path {
        self.source.path()
    }

    pub fn source(&self) -> &SourceHandle {
        &self.source
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Logical length in seconds. After a trim this is the trimmed length.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Container extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn probe_metadata(&self) -> &serde_json::Value {
        &self.probe
    }

    pub fn pending(&self) -> &PendingArgs {
        &self.pending
    }

    /// Whether any staged transform differs from a byte-for-byte copy of the source.
    pub fn has_pending_edits(&self) -> bool {
        self.has_pending_edits
    }

    /// Whether the backing file is a temp artifact owned by this clip.
    pub fn is_transient(&self) -> bool {
        self.source.is_transient()
    }

    /// A copy with `value` staged under `keyword`. Does not mark the clip as edited.
    pub fn stage(&self, keyword: &str, value: impl Into<String>) -> Video {
        let mut next = self.clone();
        next.pending.stage(keyword, value);
        next
    }

    fn stage_edit(&self, keyword: &str, value: impl Into<String>) -> Video {
        let mut next = self.stage(keyword, value);
        next.has_pending_edits = true;
        next
    }

    /// Stage stream-copy codecs for any codec keyword not yet staged.
    ///
    /// A copy codec only survives compilation for streams without a filter
    /// chain; video always carries the scale filter, so in practice this
    /// keeps audio untouched until an audio fade is staged.
    pub fn with_stream_copy_defaults(&self) -> Video {
        let mut next = self.clone();
        for keyword in [keys::VIDEO_CODEC, keys::AUDIO_CODEC] {
            if !next.pending.contains(keyword) {
                next.pending.stage(keyword, args::STREAM_COPY);
            }
        }
        next
    }

    /// Scale to `width`, deriving an even height from the aspect ratio.
    pub fn resize_by_width(&self, width: u32) -> Video {
        let mut next = self.clone();
        if self.width > 0 {
            next.height = scaled_even(self.height, self.width, width);
        }
        next.width = width;
        next.has_pending_edits = true;
        next
    }

    /// Scale to `height`, deriving an even width from the aspect ratio.
    pub fn resize_by_height(&self, height: u32) -> Video {
        let mut next = self.clone();
        if self.height > 0 {
            next.width = scaled_even(self.width, self.height, height);
        }
        next.height = height;
        next.has_pending_edits = true;
        next
    }

    /// Scale to an exact size, ignoring the aspect ratio.
    pub fn resize(&self, width: u32, height: u32) -> Video {
        let mut next = self.clone();
        next.width = width;
        next.height = height;
        next.has_pending_edits = true;
        next
    }

    pub fn fade_in(&self, start: f64, duration: f64) -> Video {
        self.stage_edit(keys::VIDEO_FILTER, fade("fade", "in", start, duration))
    }

    /// Fade out over the last `duration` seconds of the clip.
    pub fn fade_out(&self, duration: f64) -> Video {
        let start = self.duration - duration;
        self.stage_edit(keys::VIDEO_FILTER, fade("fade", "out", start, duration))
    }

    pub fn audio_fade_in(&self, start: f64, duration: f64) -> Video {
        self.stage_edit(keys::AUDIO_FILTER, fade("afade", "in", start, duration))
    }

    /// Audio fade out over the last `duration` seconds of the clip.
    pub fn audio_fade_out(&self, duration: f64) -> Video {
        let start = self.duration - duration;
        self.stage_edit(keys::AUDIO_FILTER, fade("afade", "out", start, duration))
    }

    /// Validate trim bounds against this clip.
    pub fn check_range(&self, start: f64, end: f64) -> MoviekitResult<()> {
        let violation = if !start.is_finite() || !end.is_finite() {
            Some(RangeViolation::NotFinite)
        } else if start > end {
            Some(RangeViolation::StartAfterEnd)
        } else if start > self.duration {
            Some(RangeViolation::StartPastDuration)
        } else if end > self.duration {
            Some(RangeViolation::EndPastDuration)
        } else if start < 0.0 {
            Some(RangeViolation::NegativeStart)
        } else {
            None
        };

        match violation {
            Some(v) => Err(MoviekitError::range(v, start, end, self.duration)),
            None => Ok(()),
        }
    }

    /// Stage a trim to `[start, end]` without rendering it.
    ///
    /// The returned clip's duration is `end - start`. `self` is unchanged on error.
    pub fn stage_subclip(&self, start: f64, end: f64) -> MoviekitResult<Video> {
        self.check_range(start, end)?;

        let mut next = self
            .stage_edit(keys::SEEK_START, format!("{start:.6}"))
            .stage_edit(keys::SEEK_END, format!("{end:.6}"));
        next.duration = end - start;
        Ok(next)
    }

    /// A copy whose logical duration is `duration` seconds (clamped at zero).
    ///
    /// Used when the logical length is known exactly, e.g. after a trim is
    /// materialized and the container reports a slightly different length.
    pub fn with_logical_duration(&self, duration: f64) -> Video {
        let mut next = self.clone();
        next.duration = duration.max(0.0);
        next
    }

    /// Compile staged arguments, dropping `exclude` keywords.
    pub fn compile(&self, exclude: &[&str]) -> InstructionSet {
        args::compile(&self.pending, self.width, self.height, exclude)
    }
}

/// Largest even frame dimension.
const MAX_EVEN_DIMENSION: u32 = u32::MAX - 1;

/// `other * target / base`, rounded, then bumped to the next even number.
///
/// Saturates at [`MAX_EVEN_DIMENSION`].
fn scaled_even(other: u32, base: u32, target: u32) -> u32 {
    let scaled = (f64::from(other) / f64::from(base) * f64::from(target))
        .round()
        .min(f64::from(MAX_EVEN_DIMENSION)) as u64;
    let even = scaled + scaled % 2;
    even.min(u64::from(MAX_EVEN_DIMENSION)) as u32
}

fn fade(filter: &str, kind: &str, start: f64, duration: f64) -> String {
    format!("{filter}=t={kind}:st={start:.3}:d={duration:.3}")
}
