//! Check system capabilities.

use std::path::Path;

use moviekit_common::config::AppConfig;
use moviekit_render_engine::ffmpeg::command_runs;

pub fn run(config: &AppConfig, config_path: &Path, write_config: bool) -> anyhow::Result<()> {
    println!("moviekit System Check");
    println!("{}", "=".repeat(50));

    let tools = [
        ("ffmpeg", config.engine.ffmpeg_path.as_str()),
        ("ffprobe", config.engine.ffprobe_path.as_str()),
    ];
    let mut all_ok = true;
    for (name, binary) in tools {
        if command_runs(binary) {
            println!("[OK] {name}: {binary}");
        } else {
            println!("[MISSING] {name}: '{binary}' could not be run");
            all_ok = false;
        }
    }

    let temp_dir = config.temp_dir();
    if temp_dir.is_dir() {
        println!("[OK] Temp dir: {}", temp_dir.display());
    } else {
        println!("[WARN] Temp dir does not exist: {}", temp_dir.display());
    }
    if config_path.exists() {
        println!("[OK] Config file: {}", config_path.display());
    } else if write_config {
        config.save_to(config_path)?;
        println!("[OK] Wrote config: {}", config_path.display());
    } else {
        println!("[INFO] No config file at {} (using defaults)", config_path.display());
    }

    println!();
    if all_ok {
        println!("All required tools are available. moviekit is ready.");
    } else {
        println!("Some required tools are missing.");
        println!("Install ffmpeg or set engine paths in {}.", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_config_targets_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom").join("moviekit.json");

        let mut config = AppConfig::default();
        config.engine.loglevel = "warning".to_string();
        run(&config, &path, true).unwrap();

        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path).engine.loglevel, "warning");
    }

    #[test]
    fn test_check_without_write_leaves_path_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moviekit.json");
        run(&AppConfig::default(), &path, false).unwrap();
        assert!(!path.exists());
    }
}
