use serde_json::json;

use super::*;
use crate::{
    animation::animator::seek_all,
    foundation::{
        core::{Affine, Color, Rect},
        log::{LogLevel, RecordingLogger},
    },
    scene::{
        canvas::{DisplayList, DrawOp, RenderContext},
        node::InvalidationController,
    },
};

fn solid(extra: Value) -> Value {
    let mut layer = json!({"ty": 1, "sw": 10, "sh": 10, "sc": "#ff0000", "ks": {}});
    if let (Some(layer), Some(extra)) = (layer.as_object_mut(), extra.as_object()) {
        layer.extend(extra.clone());
    }
    layer
}

fn attach(doc: &Value, logger: &RecordingLogger) -> (NodeRef, AnimatorScope) {
    let opts = BuildOpts::default();
    let binder = PropertyBinder::new(doc, logger, 30.0);
    let mut ctx = BuildContext::new(binder, doc, &opts, 30.0);
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

fn bounds(root: &NodeRef) -> Rect {
    root.borrow_mut()
        .revalidate(&mut InvalidationController::new(), Affine::IDENTITY)
}

fn draw_colors(root: &NodeRef) -> Vec<Color> {
    let mut list = DisplayList::new();
    root.borrow().render(&mut list, &RenderContext::default());
    list.draws()
        .filter_map(|op| match op {
            DrawOp::Path { style, .. } => Some(style.color()),
            _ => None,
        })
        .collect()
}

#[test]
fn parented_layers_inherit_parent_transforms() {
    let doc = json!({"layers": [
        solid(json!({"ind": 2, "parent": 1})),
        {"ty": 3, "ind": 1, "ks": {"p": {"k": [100, 0]}}}
    ]});
    let logger = RecordingLogger::new();
    let (root, scope) = attach(&doc, &logger);

    assert!(scope.is_empty());
    assert_eq!(bounds(&root), Rect::new(100.0, 0.0, 110.0, 10.0));
    assert!(logger.entries().is_empty());
}

#[test]
fn parent_chains_accumulate() {
    let doc = json!({"layers": [
        solid(json!({"ind": 3, "parent": 2})),
        {"ty": 3, "ind": 2, "parent": 1, "ks": {"p": {"k": [0, 50]}}},
        {"ty": 3, "ind": 1, "ks": {"p": {"k": [100, 0]}}}
    ]});
    let logger = RecordingLogger::new();
    let (root, _) = attach(&doc, &logger);
    assert_eq!(bounds(&root), Rect::new(100.0, 50.0, 110.0, 60.0));
}

#[test]
fn animated_parents_move_their_children() {
    let doc = json!({"layers": [
        solid(json!({"ind": 2, "parent": 1})),
        {"ty": 3, "ind": 1, "ks": {"p": {"a": 1, "k": [
            {"t": 0, "s": [0, 0]},
            {"t": 10, "s": [100, 0]}
        ]}}}
    ]});
    let logger = RecordingLogger::new();
    let (root, mut scope) = attach(&doc, &logger);

    assert_eq!(scope.len(), 1);
    seek_all(&mut scope, 5.0);
    assert_eq!(bounds(&root), Rect::new(50.0, 0.0, 60.0, 10.0));
}

#[test]
fn parenting_cycles_are_broken() {
    let doc = json!({"layers": [
        solid(json!({"ind": 1, "parent": 2, "ks": {"p": {"k": [10, 0]}}})),
        solid(json!({"ind": 2, "parent": 1, "ks": {"p": {"k": [0, 10]}}})),
        solid(json!({"ind": 3, "parent": 3}))
    ]});
    let logger = RecordingLogger::new();
    let (root, _) = attach(&doc, &logger);

    assert_eq!(logger.count(LogLevel::Warning), 2);
    assert!(logger.contains("cycle"));
    // Layer 1 keeps its link to layer 2; the reverse link is dropped.
    assert_eq!(bounds(&root), Rect::new(0.0, 0.0, 20.0, 20.0));
}

#[test]
fn missing_parents_are_reported() {
    let doc = json!({"layers": [solid(json!({"ind": 1, "parent": 7}))]});
    let logger = RecordingLogger::new();
    let (root, _) = attach(&doc, &logger);

    assert!(logger.contains("parent layer 7"));
    assert_eq!(bounds(&root), Rect::new(0.0, 0.0, 10.0, 10.0));
}

#[test]
fn first_layer_draws_on_top() {
    let doc = json!({"layers": [
        solid(json!({"sc": "#ff0000"})),
        solid(json!({"sc": "#0000ff"}))
    ]});
    let logger = RecordingLogger::new();
    let (root, _) = attach(&doc, &logger);

    assert_eq!(
        draw_colors(&root),
        vec![
            Color::rgba(0.0, 0.0, 1.0, 1.0),
            Color::rgba(1.0, 0.0, 0.0, 1.0)
        ]
    );
}

#[test]
fn hidden_layers_are_skipped() {
    let doc = json!({"layers": [
        solid(json!({"hd": true})),
        solid(json!({}))
    ]});
    let logger = RecordingLogger::new();
    let (root, _) = attach(&doc, &logger);
    assert_eq!(draw_colors(&root).len(), 1);
}

#[test]
fn missing_layers_build_an_empty_composition() {
    let doc = json!({});
    let logger = RecordingLogger::new();
    let (root, scope) = attach(&doc, &logger);
    assert!(scope.is_empty());
    assert_eq!(bounds(&root), Rect::ZERO);
}

#[test]
fn assets_are_indexed_by_id() {
    let doc = json!({"assets": [
        {"id": "comp_0", "layers": []},
        {"nm": "no id"},
        {"id": "image_0", "p": "img.png"}
    ]});
    let (logger, opts) = (RecordingLogger::new(), BuildOpts::default());
    let mut ctx = BuildContext::new(PropertyBinder::new(&doc, &logger, 30.0), &doc, &opts, 30.0);

    assert!(ctx.asset("comp_0").is_some());
    assert_eq!(ctx.asset("image_0").unwrap()["p"], "img.png");
    assert!(ctx.asset("comp_1").is_none());

    assert!(ctx.begin_asset("comp_0"));
    assert!(!ctx.begin_asset("comp_0"));
    assert_eq!(ctx.nesting_depth(), 1);
    ctx.end_asset("comp_0");
    assert_eq!(ctx.nesting_depth(), 0);
}
