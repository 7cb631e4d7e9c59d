//! Integration tests: upload JSON → Dataset → Library.
//!
//! Exercises the full `vs-core` pipeline on recorded upload responses.

use pretty_assertions::assert_eq;
use vs_core::{
    Bounds, CharId, Command, Dataset, Library, PointKind, Resolved, SceneError, compute_bounds,
    convex_hull,
};

const HERO: &str = include_str!("fixtures/hero.json");
const CYCLE: &str = include_str!("fixtures/cycle.json");

// ─── Decoding ────────────────────────────────────────────────────────────

#[test]
fn hero_decodes_every_section() {
    let ds = Dataset::from_json(HERO).unwrap();
    assert_eq!(ds.name, "hero.swf");
    assert_eq!(ds.shapes.len(), 3);
    assert_eq!(ds.sprites.len(), 3);
    assert_eq!(ds.symbol_map.len(), 2);

    // The BITMAP record survives as an inert command.
    let last = ds.shapes[2].commands.last().unwrap();
    assert_eq!(*last, Command::Unknown);
    assert_eq!(last.point(PointKind::End), None);
}

#[test]
fn hero_validation_flags_only_the_bad_frame_count() {
    let ds = Dataset::from_json(HERO).unwrap();
    let problems = ds.validate();
    assert_eq!(problems.len(), 1);
    match &problems[0] {
        SceneError::FrameCountMismatch {
            sprite,
            declared,
            actual,
        } => assert_eq!((*sprite, *declared, *actual), (CharId(102), 2, 1)),
        other => panic!("unexpected problem: {other}"),
    }
}

#[test]
fn cycles_are_reported_not_rejected() {
    let ds = Dataset::from_json(CYCLE).unwrap();
    let cycles: Vec<Vec<CharId>> = ds
        .validate()
        .into_iter()
        .filter_map(|p| match p {
            SceneError::SpriteCycle { path } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(cycles, vec![vec![CharId(7), CharId(8)], vec![CharId(9)]]);

    let lib = Library::from_dataset(ds);
    assert!(lib.sprite(CharId(7)).is_some());
}

// ─── Library ─────────────────────────────────────────────────────────────

#[test]
fn library_resolves_and_labels() {
    let lib = Library::from_json(HERO).unwrap();
    assert_eq!(lib.name(), "hero.swf");
    assert!(matches!(lib.resolve(CharId(10)), Resolved::Shape(_)));
    assert!(matches!(lib.resolve(CharId(101)), Resolved::Sprite(_)));
    assert!(matches!(lib.resolve(CharId(999)), Resolved::Missing));

    assert_eq!(lib.label(CharId(10)), "hero_body");
    assert_eq!(lib.label(CharId(11)), "11");
    assert_eq!(lib.sprite_display_name(CharId(100)), "Hero (ID: 100)");
    assert_eq!(lib.sprite_display_name(CharId(101)), "Sprite ID: 101");

    let order: Vec<CharId> = lib.shapes().iter().map(|s| s.char_id).collect();
    assert_eq!(order, vec![CharId(10), CharId(11), CharId(12)]);
}

#[test]
fn shape_geometry_includes_control_points() {
    let lib = Library::from_json(HERO).unwrap();
    let curve = lib.shape(CharId(11)).unwrap();
    assert_eq!(curve.bounds(), Bounds::new(0.0, 20.0, -10.0, 5.0));
    assert_eq!(curve.layers().len(), 2);

    let square = lib.shape(CharId(12)).unwrap();
    assert_eq!(compute_bounds(&square.points()), Bounds::new(-10.0, 10.0, -10.0, 10.0));
    assert_eq!(convex_hull(&square.points()).len(), 4);
}

#[test]
fn malformed_upload_is_an_ingest_error() {
    let err = Library::from_json(r#"{"shapes": [{"charId": "ten"}]}"#).unwrap_err();
    assert!(matches!(err, SceneError::Ingest(_)));
}
