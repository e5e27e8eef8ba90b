//! Grab a single frame.

use std::path::PathBuf;

use moviekit_common::config::AppConfig;
use moviekit_render_engine::Editor;

pub fn run(config: &AppConfig, path: PathBuf, at: f64, output: PathBuf) -> anyhow::Result<()> {
    let editor = Editor::from_config(config);
    let video = editor.load(&path)?;
    let written = editor.screenshot(&video, at, &output)?;
    println!("Wrote frame at {at:.3}s to {}", written.display());
    Ok(())
}
