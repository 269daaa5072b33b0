use serde_json::json;

use super::*;
use crate::{
    bind::binder::PropertyBinder,
    foundation::log::{LogLevel, RecordingLogger},
    player::animation::BuildOpts,
    scene::canvas::{DisplayList, DrawOp, RenderContext},
};

fn fading_solid() -> Value {
    json!({
        "ty": 1, "sw": 10, "sh": 10, "sc": "#ffffff",
        "ks": {"o": {"a": 1, "k": [{"t": 0, "s": [0]}, {"t": 10, "s": [100]}]}}
    })
}

fn attach(doc: &Value, logger: &RecordingLogger, opts: &BuildOpts) -> (NodeRef, AnimatorScope) {
    let mut ctx = BuildContext::new(PropertyBinder::new(doc, logger, 30.0), doc, opts, 30.0);
    let mut scope = AnimatorScope::new();
    let root = ctx.attach_composition(
        &doc["layers"],
        &mut scope,
        CompRange {
            in_point: 0.0,
            out_point: 100.0,
        },
    );
    (root, scope)
}

fn draw_opacities(node: &NodeRef) -> Vec<f32> {
    let mut list = DisplayList::new();
    node.borrow().render(&mut list, &RenderContext::default());
    list.draws()
        .filter_map(|op| match op {
            DrawOp::Path { opacity, .. } => Some(*opacity),
            _ => None,
        })
        .collect()
}

#[test]
fn local_time_applies_start_and_stretch() {
    let mapper = TimeMapper::new(Vec::new(), 10.0, 2.0, None, 30.0);
    assert_eq!(mapper.local_time(30.0), 10.0);
    assert_eq!(mapper.local_time(10.0), 0.0);

    let unstretched = TimeMapper::new(Vec::new(), 0.0, 0.0, None, 30.0);
    assert_eq!(unstretched.local_time(7.0), 7.0);
}

#[test]
fn time_remap_overrides_parent_time() {
    let mapper = TimeMapper::new(Vec::new(), 10.0, 2.0, Some(Slot::new(1.5)), 30.0);
    assert_eq!(mapper.local_time(0.0), 45.0);
    assert_eq!(mapper.local_time(99.0), 45.0);
}

#[test]
fn precomp_layers_run_in_local_time() {
    let doc = json!({
        "assets": [{"id": "fade", "layers": [fading_solid()]}],
        "layers": [{"ty": 0, "refId": "fade", "st": 10, "ks": {}}]
    });
    let logger = RecordingLogger::new();
    let (root, mut scope) = attach(&doc, &logger, &BuildOpts::default());
    assert_eq!(scope.len(), 1);

    seek_all(&mut scope, 10.0);
    assert!(draw_opacities(&root).is_empty());
    seek_all(&mut scope, 15.0);
    let opacities = draw_opacities(&root);
    assert_eq!(opacities.len(), 1);
    assert!((opacities[0] - 0.5).abs() < 1e-6);
}

#[test]
fn remapped_precomps_follow_the_remap_curve() {
    let doc = json!({
        "assets": [{"id": "fade", "layers": [fading_solid()]}],
        "layers": [{
            "ty": 0, "refId": "fade", "ks": {},
            "tm": {"a": 1, "k": [{"t": 0, "s": [0]}, {"t": 60, "s": [0.2]}]}
        }]
    });
    let logger = RecordingLogger::new();
    let (root, mut scope) = attach(&doc, &logger, &BuildOpts::default());

    // At frame 30 the remap reads 0.1s, i.e. local frame 3.
    seek_all(&mut scope, 30.0);
    let opacities = draw_opacities(&root);
    assert!((opacities[0] - 0.3).abs() < 1e-4);
}

#[test]
fn shared_assets_are_instanced_per_layer() {
    let doc = json!({
        "assets": [{"id": "fade", "layers": [fading_solid()]}],
        "layers": [
            {"ty": 0, "refId": "fade", "ks": {}},
            {"ty": 0, "refId": "fade", "st": 5, "ks": {}}
        ]
    });
    let logger = RecordingLogger::new();
    let (root, mut scope) = attach(&doc, &logger, &BuildOpts::default());

    seek_all(&mut scope, 10.0);
    let mut opacities = draw_opacities(&root);
    opacities.sort_by(f32::total_cmp);
    assert!((opacities[0] - 0.5).abs() < 1e-6);
    assert!((opacities[1] - 1.0).abs() < 1e-6);
}

#[test]
fn missing_assets_are_reported() {
    let doc = json!({"layers": [
        {"ty": 0, "refId": "nowhere", "ks": {}},
        {"ty": 0, "ks": {}}
    ]});
    let logger = RecordingLogger::new();
    let (root, scope) = attach(&doc, &logger, &BuildOpts::default());

    assert!(scope.is_empty());
    assert!(draw_opacities(&root).is_empty());
    assert!(logger.contains("nowhere"));
    assert!(logger.contains("refId"));
}

#[test]
fn asset_cycles_are_cut() {
    let doc = json!({
        "assets": [
            {"id": "a", "layers": [{"ty": 0, "refId": "b", "ks": {}}, fading_solid()]},
            {"id": "b", "layers": [{"ty": 0, "refId": "a", "ks": {}}]}
        ],
        "layers": [{"ty": 0, "refId": "a", "ks": {}}]
    });
    let logger = RecordingLogger::new();
    let (root, mut scope) = attach(&doc, &logger, &BuildOpts::default());

    assert!(logger.contains("cycle"));
    assert_eq!(logger.count(LogLevel::Warning), 1);
    seek_all(&mut scope, 10.0);
    assert_eq!(draw_opacities(&root).len(), 1);
}

#[test]
fn nesting_depth_is_limited() {
    let doc = json!({
        "assets": [
            {"id": "outer", "layers": [{"ty": 0, "refId": "inner", "ks": {}}]},
            {"id": "inner", "layers": [fading_solid()]}
        ],
        "layers": [{"ty": 0, "refId": "outer", "ks": {}}]
    });
    let logger = RecordingLogger::new();
    let opts = BuildOpts {
        max_precomp_depth: 1,
    };
    let (root, mut scope) = attach(&doc, &logger, &opts);

    assert_eq!(logger.count(LogLevel::Error), 1);
    assert!(logger.contains("nested too deeply"));
    seek_all(&mut scope, 10.0);
    assert!(draw_opacities(&root).is_empty());
}
