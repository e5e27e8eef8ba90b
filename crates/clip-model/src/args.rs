//! Staged engine arguments and the argument compiler.
//!
//! Edits never talk to the engine directly. They stage keyword/value pairs in a
//! [`PendingArgs`] multi-map, and [`compile`] folds that map into the flat
//! [`InstructionSet`] handed to the external engine at render time.

use serde::Serialize;

/// Engine keywords used by the edit operations.
pub mod keys {
    /// Video filter chain.
    pub const VIDEO_FILTER: &str = "vf";
    /// Audio filter chain.
    pub const AUDIO_FILTER: &str = "af";
    /// Seek to start time.
    pub const SEEK_START: &str = "ss";
    /// Stop at end time.
    pub const SEEK_END: &str = "to";
    /// Video codec.
    pub const VIDEO_CODEC: &str = "c:v";
    /// Audio codec.
    pub const AUDIO_CODEC: &str = "c:a";
    /// Codec for every stream.
    pub const CODEC: &str = "c";
    /// Number of video frames to write.
    pub const FRAME_COUNT: &str = "vframes";
    /// Container format.
    pub const FORMAT: &str = "f";
    /// Concat demuxer path safety switch.
    pub const SAFE: &str = "safe";
}

/// Codec value that passes a stream through without re-encoding.
pub const STREAM_COPY: &str = "copy";

/// Separator used when several staged values share one keyword.
pub const VALUE_SEPARATOR: &str = ",";

/// Insertion-ordered multi-map from engine keyword to staged values.
///
/// Cloning produces a fully independent copy; descriptors derived from the same
/// ancestor never observe each other's staging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingArgs {
    entries: Vec<(String, Vec<String>)>,
}

impl PendingArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `keyword`, keeping first-staged keyword order.
    pub fn stage(&mut self, keyword: impl Into<String>, value: impl Into<String>) {
        let keyword = keyword.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((keyword, vec![value])),
        }
    }

    /// A copy of `self` with `value` staged under `keyword`.
    pub fn with_staged(&self, keyword: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.stage(keyword, value);
        next
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == keyword)
    }

    /// Values staged under `keyword`, oldest first.
    pub fn values(&self, keyword: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final keyword -> value instructions for one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstructionSet {
    entries: Vec<(String, String)>,
}

impl InstructionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `keyword` to `value`, replacing any earlier value in place.
    pub fn set(&mut self, keyword: impl Into<String>, value: impl Into<String>) {
        let keyword = keyword.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == keyword) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((keyword, value)),
        }
    }

    /// Builder-style [`InstructionSet::set`].
    pub fn with(mut self, keyword: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(keyword, value);
        self
    }

    pub fn get(&self, keyword: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Drop `keyword`, keeping the order of the rest.
    pub fn remove(&mut self, keyword: &str) {
        self.entries.retain(|(k, _)| k != keyword);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten into `-keyword value` command-line pairs.
    pub fn to_args(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(k, v)| [format!("-{k}"), v.clone()])
            .collect()
    }
}

/// Scale filter for the given output size.
///
/// Odd dimensions make most encoders reject the stream, so they get an explicit
/// pixel format that tolerates them.
pub fn scale_filter(width: u32, height: u32) -> String {
    if width % 2 != 0 || height % 2 != 0 {
        format!("format=yuv444p,scale={width}:{height}")
    } else {
        format!("scale={width}:{height}")
    }
}

/// Fold staged arguments into an instruction set.
///
/// The scale filter for `width`x`height` is always appended to the video filter
/// chain. Keywords in `exclude` are dropped. `pending` itself is left untouched,
/// so compiling twice yields the same result.
pub fn compile(pending: &PendingArgs, width: u32, height: u32, exclude: &[&str]) -> InstructionSet {
    let merged = pending.with_staged(keys::VIDEO_FILTER, scale_filter(width, height));

    let mut set = InstructionSet::new();
    for (keyword, values) in merged.iter() {
        if exclude.contains(&keyword) {
            continue;
        }
        set.set(keyword, values.join(VALUE_SEPARATOR));
    }

    // A stream that is filtered can't also be stream-copied.
    for (codec, filter) in [
        (keys::VIDEO_CODEC, keys::VIDEO_FILTER),
        (keys::AUDIO_CODEC, keys::AUDIO_FILTER),
    ] {
        if set.get(codec) == Some(STREAM_COPY) && set.contains(filter) {
            set.remove(codec);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_keeps_keyword_and_value_order() {
        let mut args = PendingArgs::new();
        args.stage("vf", "fade=t=in:st=0.000:d=1.000");
        args.stage("af", "afade=t=in:st=0.000:d=1.000");
        args.stage("vf", "fade=t=out:st=9.000:d=1.000");

        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["vf", "af"]);
        assert_eq!(
            args.values("vf"),
            &[
                "fade=t=in:st=0.000:d=1.000".to_string(),
                "fade=t=out:st=9.000:d=1.000".to_string()
            ]
        );
        assert!(args.values("ss").is_empty());
    }

    #[test]
    fn test_with_staged_leaves_original_untouched() {
        let base = PendingArgs::new().with_staged("vf", "a");
        let left = base.with_staged("vf", "b");
        let right = base.with_staged("vf", "c");

        assert_eq!(base.values("vf"), &["a".to_string()]);
        assert_eq!(left.values("vf"), &["a".to_string(), "b".to_string()]);
        assert_eq!(right.values("vf"), &["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_scale_filter_parity() {
        assert_eq!(scale_filter(640, 360), "scale=640:360");
        assert_eq!(scale_filter(641, 360), "format=yuv444p,scale=641:360");
        assert_eq!(scale_filter(640, 361), "format=yuv444p,scale=640:361");
    }

    #[test]
    fn test_compile_joins_values_and_appends_scale() {
        let pending = PendingArgs::new()
            .with_staged("vf", "fade=t=in:st=0.000:d=1.000")
            .with_staged("af", "afade=t=in:st=0.000:d=1.000");

        let set = compile(&pending, 1280, 720, &[]);
        assert_eq!(
            set.get("vf"),
            Some("fade=t=in:st=0.000:d=1.000,scale=1280:720")
        );
        assert_eq!(set.get("af"), Some("afade=t=in:st=0.000:d=1.000"));
    }

    #[test]
    fn test_compile_on_empty_pending_only_scales() {
        let set = compile(&PendingArgs::new(), 1919, 1080, &[]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("vf"), Some("format=yuv444p,scale=1919:1080"));
    }

    #[test]
    fn test_compile_respects_exclusions() {
        let pending = PendingArgs::new()
            .with_staged("c:v", "copy")
            .with_staged("c:a", "copy")
            .with_staged("af", "afade=t=out:st=8.000:d=2.000");

        let set = compile(&pending, 640, 360, &["c:a", "c:v", "af"]);
        assert!(!set.contains("c:v"));
        assert!(!set.contains("c:a"));
        assert!(!set.contains("af"));
        assert_eq!(set.get("vf"), Some("scale=640:360"));
    }

    #[test]
    fn test_compile_drops_stream_copy_on_filtered_streams() {
        let pending = PendingArgs::new()
            .with_staged("c:v", "copy")
            .with_staged("c:a", "copy");
        let set = compile(&pending, 640, 360, &[]);
        assert!(!set.contains("c:v"));
        assert_eq!(set.get("c:a"), Some("copy"));

        let faded = pending.with_staged("af", "afade=t=in:st=0.000:d=1.000");
        let set = compile(&faded, 640, 360, &[]);
        assert!(!set.contains("c:a"));

        let encoded = PendingArgs::new().with_staged("c:v", "libx264");
        let set = compile(&encoded, 640, 360, &[]);
        assert_eq!(set.get("c:v"), Some("libx264"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let pending = PendingArgs::new().with_staged("vf", "fade=t=in:st=0.000:d=2.000");
        let first = compile(&pending, 640, 360, &[]);
        let second = compile(&pending, 640, 360, &[]);
        assert_eq!(first, second);
        assert_eq!(pending.values("vf").len(), 1);
    }

    #[test]
    fn test_instruction_set_replaces_in_place() {
        let mut set = InstructionSet::new().with("ss", "1.0").with("vf", "scale=2:2");
        set.set("ss", "4.5");
        assert_eq!(
            set.to_args(),
            vec!["-ss", "4.5", "-vf", "scale=2:2"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
    }
}
