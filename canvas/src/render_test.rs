#![allow(clippy::float_cmp)]

use std::cell::RefCell;
use std::convert::Infallible;

use super::*;
use frames::{Color, Viewport};

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Save,
    Restore,
    ResetTransform(f64),
    Translate(f64, f64),
    Scale(f64, f64),
    ClearRect(f64, f64, f64, f64),
    FillRect(f64, f64, f64, f64),
    Alpha(f64),
    Composite(Composite),
    FillColor(String),
    StrokeColor(String),
    LineWidth(f64),
    RoundLine,
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Quad(f64, f64, f64, f64),
    Arc(f64, f64, f64),
    Fill,
    Stroke,
}

#[derive(Default)]
struct Recorder {
    ops: RefCell<Vec<Op>>,
}

impl Recorder {
    fn push(&self, op: Op) {
        self.ops.borrow_mut().push(op);
    }

    fn ops(&self) -> Vec<Op> {
        self.ops.borrow().clone()
    }

    fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.borrow().iter().filter(|op| pred(op)).count()
    }
}

impl Painter for Recorder {
    type Error = Infallible;

    fn save(&self) {
        self.push(Op::Save);
    }
    fn restore(&self) {
        self.push(Op::Restore);
    }
    fn reset_transform(&self, scale: f64) -> Result<(), Infallible> {
        self.push(Op::ResetTransform(scale));
        Ok(())
    }
    fn translate(&self, x: f64, y: f64) -> Result<(), Infallible> {
        self.push(Op::Translate(x, y));
        Ok(())
    }
    fn scale(&self, x: f64, y: f64) -> Result<(), Infallible> {
        self.push(Op::Scale(x, y));
        Ok(())
    }
    fn clear_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::ClearRect(x, y, w, h));
    }
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64) {
        self.push(Op::FillRect(x, y, w, h));
    }
    fn set_global_alpha(&self, alpha: f64) {
        self.push(Op::Alpha(alpha));
    }
    fn set_composite(&self, composite: Composite) -> Result<(), Infallible> {
        self.push(Op::Composite(composite));
        Ok(())
    }
    fn set_fill_color(&self, color: &str) {
        self.push(Op::FillColor(color.to_owned()));
    }
    fn set_stroke_color(&self, color: &str) {
        self.push(Op::StrokeColor(color.to_owned()));
    }
    fn set_line_width(&self, width: f64) {
        self.push(Op::LineWidth(width));
    }
    fn set_round_line(&self) {
        self.push(Op::RoundLine);
    }
    fn begin_path(&self) {
        self.push(Op::BeginPath);
    }
    fn move_to(&self, x: f64, y: f64) {
        self.push(Op::MoveTo(x, y));
    }
    fn line_to(&self, x: f64, y: f64) {
        self.push(Op::LineTo(x, y));
    }
    fn quadratic_curve_to(&self, cpx: f64, cpy: f64, x: f64, y: f64) {
        self.push(Op::Quad(cpx, cpy, x, y));
    }
    fn arc(&self, x: f64, y: f64, radius: f64) -> Result<(), Infallible> {
        self.push(Op::Arc(x, y, radius));
        Ok(())
    }
    fn fill(&self) {
        self.push(Op::Fill);
    }
    fn stroke(&self) {
        self.push(Op::Stroke);
    }
}

fn pen(points: &[(f64, f64, f64)]) -> Stroke {
    Stroke {
        tool: Tool::Pen,
        color: Color::rgb(0x11, 0x22, 0x33),
        base_width: 10.0,
        opacity: 1.0,
        points: points.iter().map(|&(x, y, p)| Point::new(x, y, p)).collect(),
    }
}

fn camera() -> Camera {
    Camera { viewport: Viewport::default(), width_css: 200.0, height_css: 100.0, dpr: 1.0 }
}

// =============================================================
// Width
// =============================================================

#[test]
fn width_spans_min_to_base() {
    assert_eq!(stroke_width(10.0, 0.0), 1.0);
    assert_eq!(stroke_width(10.0, 1.0), 10.0);
    assert_eq!(stroke_width(10.0, 0.5), 5.5);
}

#[test]
fn width_never_below_minimum_for_thin_brush() {
    assert_eq!(stroke_width(0.2, 0.0), 1.0);
    assert_eq!(stroke_width(0.2, 1.0), 1.0);
}

// =============================================================
// Stroke geometry
// =============================================================

#[test]
fn single_point_full_pressure_is_disc_of_base_width() {
    let r = Recorder::default();
    paint_stroke(&r, &pen(&[(5.0, 6.0, 1.0)])).unwrap();
    assert!(r.ops().contains(&Op::Arc(5.0, 6.0, 5.0)));
    assert_eq!(r.count(|op| *op == Op::Fill), 1);
    assert_eq!(r.count(|op| *op == Op::Stroke), 0);
}

#[test]
fn single_point_zero_pressure_is_one_unit_disc() {
    let r = Recorder::default();
    paint_stroke(&r, &pen(&[(0.0, 0.0, 0.0)])).unwrap();
    assert!(r.ops().contains(&Op::Arc(0.0, 0.0, 0.5)));
}

#[test]
fn two_points_draw_one_straight_segment_with_mean_width() {
    let r = Recorder::default();
    paint_stroke(&r, &pen(&[(0.0, 0.0, 0.0), (10.0, 0.0, 1.0)])).unwrap();
    let ops = r.ops();
    assert!(ops.contains(&Op::LineWidth(5.5)));
    assert!(ops.contains(&Op::MoveTo(0.0, 0.0)));
    assert!(ops.contains(&Op::LineTo(10.0, 0.0)));
    assert_eq!(r.count(|op| matches!(op, Op::Quad(..))), 0);
    assert_eq!(r.count(|op| *op == Op::Stroke), 1);
}

#[test]
fn interior_segments_curve_toward_next_midpoint() {
    let r = Recorder::default();
    paint_stroke(&r, &pen(&[(0.0, 0.0, 1.0), (10.0, 0.0, 1.0), (10.0, 10.0, 1.0), (20.0, 10.0, 1.0)])).unwrap();
    let ops = r.ops();
    assert!(ops.contains(&Op::Quad(10.0, 0.0, 10.0, 5.0)));
    assert!(ops.contains(&Op::Quad(10.0, 10.0, 15.0, 10.0)));
    assert!(ops.contains(&Op::LineTo(20.0, 10.0)));
    assert_eq!(r.count(|op| matches!(op, Op::Quad(..))), 2);
    assert_eq!(r.count(|op| *op == Op::Stroke), 3);
}

#[test]
fn stroke_style_applies_color_opacity_and_round_caps() {
    let mut stroke = pen(&[(0.0, 0.0, 1.0), (1.0, 1.0, 1.0)]);
    stroke.opacity = 0.4;
    let r = Recorder::default();
    paint_stroke(&r, &stroke).unwrap();
    let ops = r.ops();
    assert!(ops.contains(&Op::Alpha(0.4)));
    assert!(ops.contains(&Op::StrokeColor("#112233".into())));
    assert!(ops.contains(&Op::Composite(Composite::SourceOver)));
    assert!(ops.contains(&Op::RoundLine));
    assert_eq!(ops.first(), Some(&Op::Save));
    assert_eq!(ops.last(), Some(&Op::Restore));
}

#[test]
fn eraser_uses_destination_out() {
    let mut stroke = pen(&[(0.0, 0.0, 1.0)]);
    stroke.tool = Tool::Eraser;
    let r = Recorder::default();
    paint_stroke(&r, &stroke).unwrap();
    assert!(r.ops().contains(&Op::Composite(Composite::DestinationOut)));
}

#[test]
fn empty_stroke_paints_nothing() {
    let r = Recorder::default();
    let mut stroke = pen(&[]);
    stroke.points.clear();
    paint_stroke(&r, &stroke).unwrap();
    assert!(r.ops().is_empty());
}

// =============================================================
// Surfaces
// =============================================================

#[test]
fn base_fills_background_then_applies_view() {
    let mut cam = camera();
    cam.viewport = Viewport { pan_x: 30.0, pan_y: -5.0, scale: 2.0 };
    let r = Recorder::default();
    paint_base(&r, &[pen(&[(1.0, 1.0, 1.0)])], &cam).unwrap();
    let ops = r.ops();

    assert_eq!(ops[0], Op::ResetTransform(cam.backing_scale()));
    assert_eq!(ops[1], Op::ClearRect(0.0, 0.0, 200.0, 100.0));
    assert_eq!(ops[2], Op::FillColor(BACKGROUND.into()));
    assert_eq!(ops[3], Op::FillRect(0.0, 0.0, 200.0, 100.0));
    assert_eq!(ops[4], Op::Save);
    assert_eq!(ops[5], Op::Translate(30.0, -5.0));
    assert_eq!(ops[6], Op::Scale(2.0, 2.0));
    assert!(ops.contains(&Op::Arc(1.0, 1.0, 5.0)));
}

#[test]
fn base_supersamples_at_or_below_unit_zoom() {
    let r = Recorder::default();
    paint_base(&r, &[], &camera()).unwrap();
    assert_eq!(r.ops()[0], Op::ResetTransform(2.0));
}

#[test]
fn base_paints_strokes_in_commit_order() {
    let r = Recorder::default();
    let strokes = [pen(&[(1.0, 0.0, 1.0)]), pen(&[(2.0, 0.0, 1.0)]), pen(&[(3.0, 0.0, 1.0)])];
    paint_base(&r, &strokes, &camera()).unwrap();
    let arcs: Vec<f64> = r
        .ops()
        .into_iter()
        .filter_map(|op| match op {
            Op::Arc(x, _, _) => Some(x),
            _ => None,
        })
        .collect();
    assert_eq!(arcs, vec![1.0, 2.0, 3.0]);
}

#[test]
fn preview_clears_without_background() {
    let r = Recorder::default();
    paint_preview(&r, &[pen(&[(0.0, 0.0, 1.0)])], &camera()).unwrap();
    let ops = r.ops();
    assert!(ops.contains(&Op::ClearRect(0.0, 0.0, 200.0, 100.0)));
    assert_eq!(r.count(|op| matches!(op, Op::FillRect(..))), 0);
}

#[test]
fn live_segment_draws_only_newest_pair() {
    let r = Recorder::default();
    let stroke = pen(&[(0.0, 0.0, 1.0), (5.0, 0.0, 1.0), (9.0, 0.0, 1.0)]);
    paint_live_segment(&r, &stroke, &camera()).unwrap();
    let ops = r.ops();
    assert!(ops.contains(&Op::MoveTo(5.0, 0.0)));
    assert!(ops.contains(&Op::LineTo(9.0, 0.0)));
    assert_eq!(r.count(|op| *op == Op::Stroke), 1);
    assert_eq!(r.count(|op| matches!(op, Op::ClearRect(..))), 0);
}

#[test]
fn live_segment_first_sample_is_disc() {
    let r = Recorder::default();
    paint_live_segment(&r, &pen(&[(3.0, 4.0, 1.0)]), &camera()).unwrap();
    assert!(r.ops().contains(&Op::Arc(3.0, 4.0, 5.0)));
}
