//! Stream metadata reported by the inspection tool.

use std::path::Path;

use moviekit_common::error::{MoviekitError, MoviekitResult};
use serde::Deserialize;

/// Dimensions and duration extracted from `ffprobe -print_format json` output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeInfo {
    /// Width of the first video stream, in pixels.
    pub width: u32,
    /// Height of the first video stream, in pixels.
    pub height: u32,
    /// Container duration in seconds.
    pub duration: f64,
    /// The complete probe document.
    pub raw: serde_json::Value,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationField {
    Text(String),
    Number(f64),
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<DurationField>,
}

#[derive(Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl ProbeInfo {
    /// Parse probe output for the file at `path`.
    ///
    /// Missing or malformed fields are load errors; nothing is defaulted.
    pub fn from_json(path: &Path, json: &[u8]) -> MoviekitResult<Self> {
        let raw: serde_json::Value = serde_json::from_slice(json)
            .map_err(|e| MoviekitError::load(path, format!("probe json parse failed: {e}")))?;
        let parsed: ProbeOut = serde_json::from_value(raw.clone())
            .map_err(|e| MoviekitError::load(path, format!("unexpected probe layout: {e}")))?;

        let stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .or_else(|| parsed.streams.first())
            .ok_or_else(|| MoviekitError::load(path, "no streams found"))?;
        let width = stream
            .width
            .ok_or_else(|| MoviekitError::load(path, "missing stream width"))?;
        let height = stream
            .height
            .ok_or_else(|| MoviekitError::load(path, "missing stream height"))?;

        let duration = match parsed.format.and_then(|f| f.duration) {
            Some(DurationField::Number(d)) => d,
            Some(DurationField::Text(s)) => s.trim().parse::<f64>().map_err(|e| {
                MoviekitError::load(path, format!("invalid container duration '{s}': {e}"))
            })?,
            None => return Err(MoviekitError::load(path, "missing container duration")),
        };
        if !duration.is_finite() || duration < 0.0 {
            return Err(MoviekitError::load(
                path,
                format!("invalid container duration {duration}"),
            ));
        }

        Ok(Self {
            width,
            height,
            duration,
            raw,
        })
    }
}
