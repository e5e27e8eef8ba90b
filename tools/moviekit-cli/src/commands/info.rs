//! Show clip information.

use std::path::PathBuf;

use moviekit_common::config::AppConfig;
use moviekit_render_engine::Editor;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let editor = Editor::from_config(config);
    let video = editor.load(&path)?;

    println!("Clip: {}", video.filename().display());
    println!("  Resolution: {}x{}", video.width(), video.height());
    println!("  Duration: {:.3}s", video.duration());
    println!("  Container: {}", video.extension());

    if let Some(streams) = video.probe_metadata()["streams"].as_array() {
        println!();
        println!("Streams:");
        for stream in streams {
            println!(
                "  #{} {} ({})",
                stream["index"].as_u64().unwrap_or_default(),
                stream["codec_type"].as_str().unwrap_or("unknown"),
                stream["codec_name"].as_str().unwrap_or("unknown"),
            );
        }
    }

    Ok(())
}
