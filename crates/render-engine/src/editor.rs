//! Loading clips and turning descriptors into files.
//!
//! The [`Editor`] owns the media engine and the temp-artifact namespace. It is
//! the only place where descriptors meet the engine: plain loads, explicit
//! renders through [`RenderRequest`], implicit temp renders (subclip,
//! concatenation staging) and screenshots.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use moviekit_clip_model::{keys, InstructionSet, SourceHandle, Video};
use moviekit_common::config::AppConfig;
use moviekit_common::error::{MoviekitError, MoviekitResult};
use tempfile::TempPath;

use crate::backend::{Invocation, MediaEngine};
use crate::ffmpeg::FfmpegBackend;

/// Keywords a still frame can't use.
pub const SCREENSHOT_EXCLUDED: [&str; 3] =
    [keys::AUDIO_CODEC, keys::VIDEO_CODEC, keys::AUDIO_FILTER];

/// Entry point for running edit chains against a media engine.
pub struct Editor {
    engine: Box<dyn MediaEngine>,
    temp_dir: PathBuf,
    stream_copy_defaults: bool,
}

impl Editor {
    /// Editor over `engine`, allocating temp artifacts in the system temp dir.
    pub fn new(engine: Box<dyn MediaEngine>) -> Self {
        Self {
            engine,
            temp_dir: std::env::temp_dir(),
            stream_copy_defaults: false,
        }
    }

    /// Editor using the ffmpeg backend and the settings in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Box::new(FfmpegBackend::from_config(&config.engine)))
            .with_temp_dir(config.temp_dir())
            .with_stream_copy_defaults(config.edit.stream_copy_defaults)
    }

    /// Allocate transient artifacts in `dir`.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = absolutize(dir.into());
        self
    }

    /// Stage stream-copy codecs on every freshly loaded clip.
    pub fn with_stream_copy_defaults(mut self, enabled: bool) -> Self {
        self.stream_copy_defaults = enabled;
        self
    }

    pub fn engine(&self) -> &dyn MediaEngine {
        self.engine.as_ref()
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Load a clip from disk, probing its dimensions and duration.
    pub fn load(&self, path: impl AsRef<Path>) -> MoviekitResult<Video> {
        let path = path.as_ref();
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MoviekitError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(MoviekitError::load(path, e.to_string())),
        };
        if metadata.is_dir() {
            return Err(MoviekitError::load(path, "path is a directory"));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| MoviekitError::load(path, "file does not have an extension"))?
            .to_string();

        let absolute = std::fs::canonicalize(path)
            .map_err(|e| MoviekitError::load(path, format!("failed to resolve path: {e}")))?;

        let video = self.describe(SourceHandle::persistent(absolute), &extension)?;
        tracing::info!(
            path = %video.filename().display(),
            width = video.width(),
            height = video.height(),
            duration_secs = video.duration(),
            "Loaded clip"
        );
        Ok(video)
    }

    /// Probe the file behind `source` into a fresh descriptor.
    fn describe(&self, source: SourceHandle, extension: &str) -> MoviekitResult<Video> {
        let info = self.engine.probe(source.path()).map_err(|e| {
            if e.is_load_error() {
                e
            } else {
                MoviekitError::load(source.path(), e.to_string())
            }
        })?;

        let video = Video::new(source, extension, info);
        Ok(if self.stream_copy_defaults {
            video.with_stream_copy_defaults()
        } else {
            video
        })
    }

    /// Reserve a unique `<prefix>*.<extension>` path in the temp dir.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn allocate_temp(&self, prefix: &str, extension: &str) -> MoviekitResult<TempPath> {
        let suffix = format!(".{extension}");
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(&suffix)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| {
                MoviekitError::resource(format!(
                    "failed to allocate temp file in {}: {e}",
                    self.temp_dir.display()
                ))
            })?;
        Ok(file.into_temp_path())
    }

    /// Re-load a freshly written temp artifact as a transient clip.
    pub(crate) fn adopt_artifact(
        &self,
        path: TempPath,
        extension: &str,
    ) -> MoviekitResult<Video> {
        self.describe(SourceHandle::transient(path), extension)
    }

    /// Render `video` into a new temp artifact and load it back as a transient clip.
    pub fn temp_render(&self, video: &Video) -> MoviekitResult<Video> {
        self.temp_render_with_prefix(video, "video-")
    }

    pub(crate) fn temp_render_with_prefix(
        &self,
        video: &Video,
        prefix: &str,
    ) -> MoviekitResult<Video> {
        let target = self.allocate_temp(prefix, video.extension())?;
        self.output(video, target.to_path_buf()).run()?;

        let rendered = self.adopt_artifact(target, video.extension())?;
        tracing::debug!(
            source = %video.filename().display(),
            artifact = %rendered.filename().display(),
            duration_secs = rendered.duration(),
            "Temp render complete"
        );
        Ok(rendered)
    }

    /// Trim `video` to `[start, end]` and materialize the result immediately.
    ///
    /// The returned clip is transient and its duration is `end - start`. Range
    /// errors are reported before anything is rendered.
    pub fn subclip(&self, video: &Video, start: f64, end: f64) -> MoviekitResult<Video> {
        let staged = video.stage_subclip(start, end)?;
        let rendered = self.temp_render(&staged)?;
        Ok(rendered.with_logical_duration(staged.duration()))
    }

    /// Bind the compiled instructions of `video` to `destination`.
    pub fn output(&self, video: &Video, destination: impl Into<PathBuf>) -> RenderRequest<'_> {
        RenderRequest {
            engine: self.engine.as_ref(),
            invocation: Invocation::single(video.filename(), destination, video.compile(&[])),
            _source: video.source().clone(),
        }
    }

    /// Write `video` to `destination` and return its absolute path.
    ///
    /// A clip without pending edits is copied byte for byte, so a concatenation
    /// or trim result is saved without another encode. Edited clips are rendered.
    pub fn persist(
        &self,
        video: &Video,
        destination: impl AsRef<Path>,
    ) -> MoviekitResult<PathBuf> {
        let destination = absolutize(destination.as_ref().to_path_buf());
        if video.has_pending_edits() {
            self.output(video, &destination).run()?;
            return Ok(destination);
        }

        if std::fs::canonicalize(&destination).ok().as_deref() == Some(video.filename()) {
            return Ok(destination);
        }
        ensure_parent_dir(&destination)?;
        let bytes = std::fs::copy(video.filename(), &destination).map_err(|e| {
            MoviekitError::render(format!(
                "failed to copy {} to {}: {e}",
                video.filename().display(),
                destination.display()
            ))
        })?;

        tracing::info!(
            source = %video.filename().display(),
            output = %destination.display(),
            bytes,
            "Copied clip"
        );
        Ok(destination)
    }

    /// Write the frame at `timestamp` to `destination` and return its absolute path.
    pub fn screenshot(
        &self,
        video: &Video,
        timestamp: f64,
        destination: impl AsRef<Path>,
    ) -> MoviekitResult<PathBuf> {
        video.check_range(timestamp, timestamp)?;

        let destination = absolutize(destination.as_ref().to_path_buf());
        let mut options = video.compile(&SCREENSHOT_EXCLUDED);
        options.set(keys::SEEK_START, format!("{timestamp:.6}"));
        options.set(keys::FRAME_COUNT, "1");

        ensure_parent_dir(&destination)?;
        let invocation = Invocation::single(video.filename(), &destination, options);
        self.engine.execute(&invocation)?;

        tracing::info!(
            source = %video.filename().display(),
            timestamp,
            output = %destination.display(),
            "Wrote screenshot"
        );
        Ok(destination)
    }

    /// Concatenate `videos` in order. See [`crate::concat::concatenate`].
    pub fn concatenate(&self, videos: &[Video]) -> MoviekitResult<Video> {
        crate::concat::concatenate(self, videos)
    }
}

/// A compiled render bound to a destination. Runs at most once.
pub struct RenderRequest<'a> {
    engine: &'a dyn MediaEngine,
    invocation: Invocation,
    // Keeps a transient source readable until the render has run.
    _source: SourceHandle,
}

impl RenderRequest<'_> {
    pub fn destination(&self) -> &Path {
        &self.invocation.output
    }

    pub fn instructions(&self) -> &InstructionSet {
        &self.invocation.output_options
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    /// Execute the render, overwriting the destination.
    pub fn run(self) -> MoviekitResult<()> {
        ensure_parent_dir(&self.invocation.output)?;
        tracing::info!(
            engine = self.engine.name(),
            output = %self.invocation.output.display(),
            "Rendering"
        );
        self.engine.execute(&self.invocation)
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> MoviekitResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
