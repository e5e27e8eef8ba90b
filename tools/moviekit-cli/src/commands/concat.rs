//! Concatenate clips into one file.

use std::path::PathBuf;

use moviekit_common::config::AppConfig;
use moviekit_render_engine::Editor;

pub fn run(config: &AppConfig, paths: Vec<PathBuf>, output: PathBuf) -> anyhow::Result<()> {
    let editor = Editor::from_config(config);

    let videos = paths
        .iter()
        .map(|path| editor.load(path))
        .collect::<Result<Vec<_>, _>>()?;
    println!("Concatenating {} clips", videos.len());

    let merged = editor.concatenate(&videos)?;
    tracing::debug!(artifact = %merged.filename().display(), "Merged clips");
    let written = editor.persist(&merged, &output)?;

    println!("Wrote {} ({:.3}s)", written.display(), merged.duration());
    Ok(())
}
