use serde_json::json;

use super::*;
use crate::{
    bind::slots::SlotManager,
    foundation::log::RecordingLogger,
    scene::canvas::{DisplayList, DrawOp},
};

fn fading_doc() -> Value {
    json!({
        "v": "5.7.0", "w": 100, "h": 50, "fr": 30, "ip": 0, "op": 60,
        "layers": [{
            "ty": 1, "sw": 100, "sh": 50, "sc": "#336699",
            "ks": {"o": {"sid": "fade", "a": 1, "k": [{"t": 0, "s": [0]}, {"t": 60, "s": [100]}]}}
        }]
    })
}

fn build(doc: &Value) -> Animation {
    AnimationBuilder::new().build_from_value(doc).unwrap()
}

fn opacity(animation: &Animation) -> Option<f32> {
    let mut list = DisplayList::new();
    animation.render(&mut list);
    list.draws().find_map(|op| match op {
        DrawOp::Path { opacity, .. } => Some(*opacity),
        _ => None,
    })
}

#[test]
fn header_fields_are_exposed() {
    let animation = build(&fading_doc());
    assert_eq!(animation.version(), "5.7.0");
    assert_eq!(animation.size(), Size::new(100.0, 50.0));
    assert_eq!(animation.fps(), 30.0);
    assert_eq!(animation.in_point(), 0.0);
    assert_eq!(animation.out_point(), 60.0);
    assert_eq!(animation.duration(), 2.0);
}

#[test]
fn malformed_headers_are_fatal() {
    let patches = [
        ("v", json!("")),
        ("v", Value::Null),
        ("w", json!(0)),
        ("h", json!(-5)),
        ("fr", json!(0)),
        ("fr", json!("fast")),
        ("ip", Value::Null),
        ("op", json!([])),
    ];
    for (key, value) in patches {
        let mut doc = fading_doc();
        doc[key] = value;
        let err = AnimationBuilder::new().build_from_value(&doc).err();
        assert!(
            matches!(err, Some(LottieError::Validation(_))),
            "{key} should be rejected"
        );
    }

    assert!(matches!(
        AnimationBuilder::new().build_from_value(&json!([1, 2])),
        Err(LottieError::Validation(_))
    ));
}

#[test]
fn out_point_never_precedes_in_point() {
    let mut doc = fading_doc();
    doc["ip"] = json!(40);
    doc["op"] = json!(10);
    let animation = build(&doc);
    assert_eq!(animation.out_point(), 40.0);
    assert_eq!(animation.duration(), 0.0);
}

#[test]
fn seeking_interpolates_and_clamps() {
    let mut animation = build(&fading_doc());

    animation.seek_frame(30.0);
    assert!((opacity(&animation).unwrap() - 0.5).abs() < 1e-6);

    animation.seek_frame(-100.0);
    assert_eq!(opacity(&animation), None);

    animation.seek_frame(1e9);
    let last = opacity(&animation).unwrap();
    assert!(last > 0.99 && last <= 1.0);

    animation.seek_frame(f32::NAN);
    assert_eq!(opacity(&animation), None);
}

#[test]
fn normalized_and_time_seeks_map_to_frames() {
    let mut animation = build(&fading_doc());

    animation.seek(0.25);
    assert!((opacity(&animation).unwrap() - 0.25).abs() < 1e-6);

    animation.seek_frame_time(1.0);
    assert!((opacity(&animation).unwrap() - 0.5).abs() < 1e-6);

    animation.seek(5.0);
    let last = opacity(&animation).unwrap();
    assert!(last > 0.99);
}

#[test]
fn repeated_seeks_report_no_damage() {
    let mut animation = build(&fading_doc());
    let full = Rect::new(0.0, 0.0, 100.0, 50.0);
    assert_eq!(animation.seek_frame(0.0), full);
    assert_eq!(animation.seek_frame(0.0), Rect::ZERO);
    assert_eq!(animation.seek_frame(30.0), full);
    assert_eq!(animation.seek_frame(30.0), Rect::ZERO);
}

#[test]
fn rendering_before_the_first_seek_shows_the_in_point() {
    let animation = build(&fading_doc());
    assert_eq!(opacity(&animation), None);

    let mut doc = fading_doc();
    doc["ip"] = json!(30);
    let mut animation = build(&doc);
    assert!((opacity(&animation).unwrap() - 0.5).abs() < 1e-6);

    // The first seek still reports the initial content.
    assert_eq!(animation.seek_frame(30.0), Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn render_targets_fit_and_clip_to_the_composition() {
    let mut animation = build(&fading_doc());
    animation.seek_frame(30.0);
    let src = Rect::new(0.0, 0.0, 100.0, 50.0);

    let mut list = DisplayList::new();
    animation.render(&mut list);
    assert_eq!(&list.ops()[..2], &[DrawOp::Save, DrawOp::ClipRect(src)]);
    assert_eq!(list.ops().last(), Some(&DrawOp::Restore));

    let mut list = DisplayList::new();
    animation.render_to(&mut list, Some(Rect::new(0.0, 0.0, 400.0, 400.0)));
    // Scaled by 4 to fill the width, centered vertically.
    assert_eq!(
        list.ops()[1],
        DrawOp::Concat(Affine::new([4.0, 0.0, 0.0, 4.0, 0.0, 100.0]))
    );
    assert_eq!(list.ops()[2], DrawOp::ClipRect(src));
    assert_eq!(list.draws().count(), 1);
}

#[test]
fn stats_describe_the_build() {
    let source = fading_doc().to_string();
    let animation = AnimationBuilder::new().build(&source).unwrap();
    let stats = animation.stats();
    assert_eq!(stats.json_size, source.len());
    assert_eq!(stats.layer_count, 1);
    assert_eq!(stats.animator_count, 1);
    assert_eq!(stats.precomp_count, 0);
}

#[test]
fn slot_overrides_reach_the_tree() {
    let mut slots = SlotManager::new();
    slots.set_scalar("fade", 25.0);
    let mut animation = AnimationBuilder::new()
        .slot_manager(slots)
        .build_from_value(&fading_doc())
        .unwrap();

    assert_eq!(animation.stats().animator_count, 0);
    animation.seek_frame(10.0);
    assert!((opacity(&animation).unwrap() - 0.25).abs() < 1e-6);
}

#[test]
fn diagnostics_go_to_the_configured_logger() {
    let logger = Rc::new(RecordingLogger::new());
    let mut doc = fading_doc();
    doc["layers"][0]["ty"] = json!(2);
    let animation = AnimationBuilder::new()
        .logger(logger.clone())
        .build_from_value(&doc)
        .unwrap();

    assert_eq!(animation.stats().layer_count, 0);
    assert!(logger.contains("Image layers"));
}

#[test]
fn text_parsing_entry_points() {
    assert!(Animation::make("{").is_none());
    assert!(Animation::make(&fading_doc().to_string()).is_some());

    let err = "not json".parse::<Animation>().err();
    assert!(matches!(err, Some(LottieError::Serde(_))));
    let ok = fading_doc().to_string().parse::<Animation>();
    assert!(ok.is_ok());
}
