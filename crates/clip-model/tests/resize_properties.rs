use moviekit_clip_model::{keys, ProbeInfo, SourceHandle, Video};
use moviekit_common::error::RangeViolation;
use proptest::prelude::*;

fn clip(width: u32, height: u32, duration: f64) -> Video {
    Video::new(
        SourceHandle::persistent("/media/source.mov"),
        "mov",
        ProbeInfo {
            width,
            height,
            duration,
            raw: serde_json::json!({"format": {"duration": duration.to_string()}}),
        },
    )
}

#[test]
fn full_hd_resize_scenario() {
    let video = clip(1920, 1080, 10.0);
    let resized = video.resize_by_width(640);

    assert_eq!((resized.width(), resized.height()), (640, 360));
    assert!(resized.has_pending_edits());
    assert_eq!(resized.duration(), 10.0);
    assert_eq!(
        resized.compile(&[]).get(keys::VIDEO_FILTER),
        Some("scale=640:360")
    );
}

#[test]
fn failed_subclip_leaves_clip_unchanged() {
    let video = clip(1920, 1080, 10.0).fade_in(0.0, 1.0);
    let before = video.pending().clone();

    let err = video.stage_subclip(4.0, 11.0).unwrap_err();
    assert_eq!(err.range_violation(), Some(RangeViolation::EndPastDuration));
    assert_eq!(video.pending(), &before);
    assert_eq!(video.duration(), 10.0);
}

proptest! {
    #[test]
    fn resize_by_width_matches_rounded_even_height(
        width in 2u32..8000,
        height in 2u32..8000,
        target in 2u32..8000,
    ) {
        let resized = clip(width, height, 1.0).resize_by_width(target);
        let mut expected = (height as f64 / width as f64 * target as f64).round() as u32;
        if expected % 2 != 0 {
            expected += 1;
        }

        prop_assert_eq!(resized.width(), target);
        prop_assert_eq!(resized.height(), expected);
        prop_assert_eq!(resized.height() % 2, 0);
    }

    #[test]
    fn resize_by_height_yields_even_width(
        width in 2u32..8000,
        height in 2u32..8000,
        target in 2u32..8000,
    ) {
        let resized = clip(width, height, 1.0).resize_by_height(target);
        prop_assert_eq!(resized.height(), target);
        prop_assert_eq!(resized.width() % 2, 0);
    }

    #[test]
    fn valid_subclip_duration_is_end_minus_start(
        duration in 0.1f64..3600.0,
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (start, end) = (lo * duration, hi * duration);

        let trimmed = clip(1280, 720, duration).stage_subclip(start, end).unwrap();
        prop_assert_eq!(trimmed.duration(), end - start);
    }

    #[test]
    fn inverted_subclip_is_rejected(
        duration in 1.0f64..3600.0,
        start in 0.0f64..1.0,
        gap in 0.001f64..1.0,
    ) {
        let video = clip(1280, 720, duration);
        let start = start * duration;
        let err = video.stage_subclip(start, start - gap).unwrap_err();
        prop_assert_eq!(err.range_violation(), Some(RangeViolation::StartAfterEnd));
    }

    #[test]
    fn compile_twice_is_stable(
        fade in 0.0f64..5.0,
        width in 1u32..4000,
        height in 1u32..4000,
    ) {
        let video = clip(width, height, 10.0).fade_in(0.0, fade).audio_fade_out(fade);
        prop_assert_eq!(video.compile(&[]), video.compile(&[]));
    }
}
