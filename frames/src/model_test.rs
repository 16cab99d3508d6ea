#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y, 0.5)
}

// --- Stroke ---

#[test]
fn begin_holds_first_point() {
    let s = Stroke::begin(Tool::Pen, Color::BLACK, 5.0, 1.0, pt(1.0, 2.0));
    assert_eq!(s.points, vec![pt(1.0, 2.0)]);
    assert_eq!(s.last_point(), Some(pt(1.0, 2.0)));
}

#[test]
fn push_point_preserves_earlier_points() {
    let mut s = Stroke::begin(Tool::Pen, Color::BLACK, 5.0, 1.0, Point::new(0.0, 0.0, 0.1));
    for i in 1..50 {
        s.push_point(Point::new(f64::from(i), 0.0, 0.9));
    }
    assert_eq!(s.points.len(), 50);
    assert_eq!(s.points[0], Point::new(0.0, 0.0, 0.1));
}

#[test]
fn finalize_discards_only_empty_strokes() {
    for appended in 0..4 {
        let mut s = Stroke::begin(Tool::Pen, Color::BLACK, 5.0, 1.0, pt(0.0, 0.0));
        s.points.clear();
        for i in 0..appended {
            s.push_point(pt(f64::from(i), 0.0));
        }
        assert_eq!(s.finalize().is_none(), appended == 0, "appended = {appended}");
    }
}

#[test]
fn validate_accepts_well_formed_stroke() {
    let s = Stroke::begin(Tool::Eraser, Color::WHITE, 20.0, 0.3, Point::new(0.0, 0.0, 1.0));
    assert_eq!(s.validate(), Ok(()));
}

#[test]
fn validate_rejects_bad_fields() {
    let base = Stroke::begin(Tool::Pen, Color::BLACK, 5.0, 1.0, pt(0.0, 0.0));

    let mut s = base.clone();
    s.base_width = 0.0;
    assert_eq!(s.validate(), Err(ModelError::InvalidWidth(0.0)));

    let mut s = base.clone();
    s.opacity = -0.1;
    assert_eq!(s.validate(), Err(ModelError::InvalidOpacity(-0.1)));

    let mut s = base.clone();
    s.push_point(Point::new(1.0, 1.0, 1.5));
    assert_eq!(s.validate(), Err(ModelError::PressureOutOfRange { index: 1, pressure: 1.5 }));

    let mut s = base;
    s.points[0].x = f64::NAN;
    assert_eq!(s.validate(), Err(ModelError::NonFinitePoint { index: 0 }));
}

// --- Color ---

#[test]
fn color_parses_long_and_short_hex() {
    assert_eq!("#FF8000".parse::<Color>(), Ok(Color::rgb(255, 128, 0)));
    assert_eq!("#f80".parse::<Color>(), Ok(Color::rgb(255, 136, 0)));
}

#[test]
fn color_rejects_malformed_hex() {
    for bad in ["", "ff8000", "#ff80", "#gg0000", "#ff80001", "#éé"] {
        assert!(bad.parse::<Color>().is_err(), "{bad} should fail");
    }
}

#[test]
fn color_rejects_signed_channels() {
    for bad in ["#+f+f+f", "#+0+0+0", "#+1+2+3"] {
        assert!(bad.parse::<Color>().is_err(), "{bad} should fail");
    }
}

#[test]
fn color_displays_lowercase_hex() {
    assert_eq!(Color::rgb(0xAB, 0x0C, 0xFF).to_string(), "#ab0cff");
}

#[test]
fn tool_accepts_brush_alias() {
    let tool: Tool = serde_json::from_str(r#""brush""#).expect("decode");
    assert_eq!(tool, Tool::Pen);
    assert_eq!(serde_json::to_string(&Tool::Eraser).expect("encode"), r#""eraser""#);
}

// --- Viewport ---

#[test]
fn viewport_default_is_identity() {
    let v = Viewport::default();
    assert_eq!(v.to_board(12.0, 34.0), (12.0, 34.0));
}

#[test]
fn viewport_to_board_applies_pan_then_scale() {
    let v = Viewport { pan_x: 100.0, pan_y: 50.0, scale: 2.0 };
    assert_eq!(v.to_board(300.0, 250.0), (100.0, 100.0));
}

#[test]
fn to_board_inverts_to_screen() {
    let viewports = [
        Viewport { pan_x: 0.0, pan_y: 0.0, scale: 1.0 },
        Viewport { pan_x: -250.5, pan_y: 13.25, scale: MIN_SCALE },
        Viewport { pan_x: 999.0, pan_y: -4.0, scale: MAX_SCALE },
        Viewport { pan_x: 3.5, pan_y: 7.0, scale: 0.37 },
    ];
    let points = [(0.0, 0.0), (1.5, -2.25), (-1000.0, 640.0), (12345.6, 0.001)];
    for v in viewports {
        for (x, y) in points {
            let (sx, sy) = v.to_screen(x, y);
            let (bx, by) = v.to_board(sx, sy);
            assert!(approx_eq(bx, x) && approx_eq(by, y), "{v:?} ({x}, {y}) -> ({bx}, {by})");
        }
    }
}

#[test]
fn zoom_at_keeps_anchor_fixed() {
    let start = Viewport { pan_x: 40.0, pan_y: -20.0, scale: 1.5 };
    let anchors = [(0.0, 0.0), (400.0, 300.0), (-50.0, 900.0)];
    for target in [0.05, 0.1, 0.5, 1.0, 3.3, 10.0, 25.0] {
        for (ax, ay) in anchors {
            let mut v = start;
            let (bx, by) = start.to_board(ax, ay);
            v.zoom_at(target, ax, ay);
            let (sx, sy) = v.to_screen(bx, by);
            assert!(approx_eq(sx, ax) && approx_eq(sy, ay), "scale {target} anchor ({ax}, {ay})");
        }
    }
}

#[test]
fn zoom_at_clamps_scale() {
    let mut v = Viewport::default();
    v.zoom_at(50.0, 0.0, 0.0);
    assert_eq!(v.scale, MAX_SCALE);
    v.zoom_at(0.0001, 0.0, 0.0);
    assert_eq!(v.scale, MIN_SCALE);
}

#[test]
fn pan_is_unaffected_by_scale() {
    let mut v = Viewport { pan_x: 0.0, pan_y: 0.0, scale: 4.0 };
    v.pan_by(10.0, -5.0);
    assert_eq!((v.pan_x, v.pan_y), (10.0, -5.0));
}

#[test]
fn normalized_repairs_bad_values() {
    let v = Viewport { pan_x: f64::INFINITY, pan_y: 2.0, scale: f64::NAN }.normalized();
    assert_eq!(v, Viewport { pan_x: 0.0, pan_y: 2.0, scale: 1.0 });
}

#[test]
fn viewport_wire_names() {
    let text = serde_json::to_string(&Viewport { pan_x: 1.0, pan_y: 2.0, scale: 3.0 }).expect("encode");
    assert_eq!(text, r#"{"x":1.0,"y":2.0,"scale":3.0}"#);
}

// --- Board ---

#[test]
fn board_decodes_with_missing_collections() {
    let board: Board = serde_json::from_str(r#"{"id":"x","lastModified":5}"#).expect("decode");
    assert_eq!(board, Board::empty("x", 5));
}
