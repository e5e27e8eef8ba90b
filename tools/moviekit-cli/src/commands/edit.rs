//! Apply an edit chain to a clip and render it.

use std::path::PathBuf;

use moviekit_common::config::AppConfig;
use moviekit_render_engine::Editor;

/// Edits requested on the command line, applied in field order.
#[derive(Debug, Default)]
pub struct EditPlan {
    pub trim: Option<(f64, f64)>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fade_in: Option<(f64, f64)>,
    pub fade_out: Option<f64>,
    pub audio_fade_in: Option<(f64, f64)>,
    pub audio_fade_out: Option<f64>,
}

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    output: PathBuf,
    plan: EditPlan,
    dry_run: bool,
) -> anyhow::Result<()> {
    let editor = Editor::from_config(config);
    let mut video = editor.load(&path)?;
    println!(
        "Loaded {} ({}x{}, {:.3}s)",
        video.filename().display(),
        video.width(),
        video.height(),
        video.duration()
    );

    // Trimming renders immediately, so it goes first.
    if let Some((start, end)) = plan.trim {
        video = editor.subclip(&video, start, end)?;
        println!("  Trimmed to [{start:.3}, {end:.3}]");
    }

    match (plan.width, plan.height) {
        (Some(w), Some(h)) => video = video.resize(w, h),
        (Some(w), None) => video = video.resize_by_width(w),
        (None, Some(h)) => video = video.resize_by_height(h),
        (None, None) => {}
    }
    if let Some((start, duration)) = plan.fade_in {
        video = video.fade_in(start, duration);
    }
    if let Some(duration) = plan.fade_out {
        video = video.fade_out(duration);
    }
    if let Some((start, duration)) = plan.audio_fade_in {
        video = video.audio_fade_in(start, duration);
    }
    if let Some(duration) = plan.audio_fade_out {
        video = video.audio_fade_out(duration);
    }

    tracing::debug!(pending = video.pending().len(), "Edit chain staged");
    let request = editor.output(&video, &output);
    if dry_run {
        println!("{}", request.invocation().to_json()?);
        return Ok(());
    }

    request.run()?;
    println!(
        "Wrote {} ({}x{}, {:.3}s)",
        output.display(),
        video.width(),
        video.height(),
        video.duration()
    );
    Ok(())
}
