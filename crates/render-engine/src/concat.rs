//! Joining clips end to end with the concat demuxer.
//!
//! Clips without pending edits are referenced in place. Edited clips are first
//! rendered to temp artifacts so the final merge can be a plain stream copy.

use std::path::Path;

use moviekit_clip_model::{keys, InstructionSet, SourceHandle, Video};
use moviekit_common::error::{MoviekitError, MoviekitResult};

use crate::backend::{InputSpec, Invocation};
use crate::editor::Editor;

/// Concat-list manifest for `paths`, one `file '<path>'` line each.
///
/// Single quotes inside paths are not escaped.
pub fn build_manifest<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    paths
        .into_iter()
        .map(|path| format!("file '{}'\n", path.display()))
        .collect()
}

/// Concatenate `videos` in order into a new transient clip.
///
/// Staging renders run one at a time. Any staging failure aborts the whole
/// call. Staged artifacts are removed once the merge has run, whether it
/// succeeded or not; the manifest is removed after the result is loaded.
pub fn concatenate(editor: &Editor, videos: &[Video]) -> MoviekitResult<Video> {
    let last = videos
        .last()
        .ok_or_else(|| MoviekitError::render("nothing to concatenate: no clips given"))?;

    let started = std::time::Instant::now();
    tracing::info!(clips = videos.len(), "Starting concatenation");

    // Holds every part readable until the merge is done.
    let mut parts: Vec<SourceHandle> = Vec::with_capacity(videos.len());
    for (index, video) in videos.iter().enumerate() {
        if video.has_pending_edits() {
            let staged = editor.temp_render_with_prefix(video, &format!("video-{index}-"))?;
            tracing::info!(
                index,
                artifact = %staged.filename().display(),
                "Staged edited clip"
            );
            parts.push(staged.source().clone());
        } else {
            tracing::debug!(index, path = %video.filename().display(), "Reusing source");
            parts.push(video.source().clone());
        }
    }

    let manifest = editor.allocate_temp("list-", "txt")?;
    std::fs::write(&manifest, build_manifest(parts.iter().map(|p| p.path()))).map_err(|e| {
        MoviekitError::resource(format!(
            "failed to write concat manifest {}: {e}",
            manifest.display()
        ))
    })?;

    let target = editor.allocate_temp("final-", last.extension())?;
    let invocation = Invocation {
        inputs: vec![InputSpec::new(manifest.to_path_buf()).with_options(
            InstructionSet::new()
                .with(keys::FORMAT, "concat")
                .with(keys::SAFE, "0"),
        )],
        output: target.to_path_buf(),
        output_options: InstructionSet::new().with(keys::CODEC, "copy"),
        overwrite: true,
    };

    let merged = editor.engine().execute(&invocation);
    drop(parts);
    merged?;

    let result = editor.adopt_artifact(target, last.extension())?;
    drop(manifest);

    tracing::info!(
        clips = videos.len(),
        output = %result.filename().display(),
        duration_secs = result.duration(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Concatenation finished"
    );
    Ok(result)
}
