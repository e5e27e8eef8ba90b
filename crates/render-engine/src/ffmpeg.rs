//! `ffmpeg`/`ffprobe` subprocess backend.

use std::path::Path;
use std::process::{Command, Stdio};

use moviekit_clip_model::ProbeInfo;
use moviekit_common::config::EngineConfig;
use moviekit_common::error::{MoviekitError, MoviekitResult};

use crate::backend::{Invocation, MediaEngine};

/// Media engine that shells out to the system `ffmpeg` and `ffprobe`.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg_path: String,
    ffprobe_path: String,
    loglevel: String,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl FfmpegBackend {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            ffprobe_path: config.ffprobe_path.clone(),
            loglevel: config.loglevel.clone(),
        }
    }

    /// Command-line arguments (without the program name) for `invocation`.
    pub fn build_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            self.loglevel.clone(),
            if invocation.overwrite { "-y" } else { "-n" }.to_string(),
        ];
        for input in &invocation.inputs {
            args.extend(input.options.to_args());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().into_owned());
        }
        args.extend(invocation.output_options.to_args());
        args.push(invocation.output.to_string_lossy().into_owned());
        args
    }
}

impl MediaEngine for FfmpegBackend {
    fn probe(&self, path: &Path) -> MoviekitResult<ProbeInfo> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| MoviekitError::load(path, format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(MoviekitError::load(
                path,
                format!(
                    "ffprobe failed (status {}): {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        ProbeInfo::from_json(path, &output.stdout)
    }

    fn execute(&self, invocation: &Invocation) -> MoviekitResult<()> {
        let args = self.build_args(invocation);
        tracing::debug!(args = ?args, "Running ffmpeg");

        let started = std::time::Instant::now();
        let output = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MoviekitError::render(format!("Failed to start ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(MoviekitError::render(format!(
                "ffmpeg failed for '{}' (status {}): {}",
                invocation.output.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::debug!(
            output = %invocation.output.display(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ffmpeg finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_runs(&self.ffmpeg_path) && command_runs(&self.ffprobe_path)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Return `true` when `binary -version` exits successfully.
pub fn command_runs(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InputSpec;
    use moviekit_clip_model::InstructionSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_input_args_place_options_after_input() {
        let backend = FfmpegBackend::default();
        let invocation = Invocation::single(
            "/in/a.mp4",
            "/out/b.mp4",
            InstructionSet::new()
                .with("ss", "2.000000")
                .with("to", "5.000000")
                .with("vf", "scale=640:360"),
        );

        assert_eq!(
            backend.build_args(&invocation),
            strings(&[
                "-hide_banner",
                "-loglevel",
                "error",
                "-y",
                "-i",
                "/in/a.mp4",
                "-ss",
                "2.000000",
                "-to",
                "5.000000",
                "-vf",
                "scale=640:360",
                "/out/b.mp4",
            ])
        );
    }

    #[test]
    fn test_concat_args_put_demuxer_options_before_input() {
        let backend = FfmpegBackend::default();
        let invocation = Invocation {
            inputs: vec![InputSpec::new("/tmp/list-1.txt")
                .with_options(InstructionSet::new().with("f", "concat").with("safe", "0"))],
            output: "/tmp/final-1.mp4".into(),
            output_options: InstructionSet::new().with("c", "copy"),
            overwrite: false,
        };

        assert_eq!(
            backend.build_args(&invocation),
            strings(&[
                "-hide_banner",
                "-loglevel",
                "error",
                "-n",
                "-f",
                "concat",
                "-safe",
                "0",
                "-i",
                "/tmp/list-1.txt",
                "-c",
                "copy",
                "/tmp/final-1.mp4",
            ])
        );
    }

    #[test]
    fn test_missing_binaries_surface_as_errors() {
        let backend = FfmpegBackend::from_config(&EngineConfig {
            ffmpeg_path: "/nonexistent/moviekit-ffmpeg".to_string(),
            ffprobe_path: "/nonexistent/moviekit-ffprobe".to_string(),
            loglevel: "error".to_string(),
        });

        assert!(!backend.is_available());

        let err = backend
            .execute(&Invocation::single("/a.mp4", "/b.mp4", InstructionSet::new()))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to start ffmpeg"));

        let err = backend.probe(Path::new("/a.mp4")).unwrap_err();
        assert!(err.is_load_error());
    }
}
