//! Point-editing session: pan/zoom view plus the drag state machine.
//!
//! The session never owns the shape. Every operation borrows the live
//! command list, so the same session logic serves whichever shape the
//! editor currently has open.
//!
//! ## Pointer flow
//!
//! | Event | Idle | Panning | DraggingPoint |
//! |-------|------|---------|---------------|
//! | down (pan button) | → Panning | — | — |
//! | down (select button) | handle hit → DraggingPoint, else re-select | — | — |
//! | move | no-op | offset += delta | write permitted axes |
//! | up | Idle | Idle | Idle |

use crate::input::PointerButton;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use vs_core::{Command, PointKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Hit radius for selecting points, in screen pixels.
    pub hit_tolerance: f64,
    /// Distance of the axis handles from the selected point, in screen pixels.
    pub handle_length: f64,
    /// Hit radius of the move circle and the axis handles, in screen pixels.
    pub handle_radius: f64,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pan_button: PointerButton,
    pub select_button: PointerButton,
    /// Margin kept when fitting a shape into the view.
    pub fit_padding: f64,
    pub point_radius: f64,
    pub background: String,
    pub point_color: String,
    pub control_color: String,
    pub selection_color: String,
    pub x_handle_color: String,
    pub y_handle_color: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            hit_tolerance: 10.0,
            handle_length: 40.0,
            handle_radius: 10.0,
            zoom_step: 0.1,
            min_zoom: 0.1,
            max_zoom: 25.0,
            pan_button: PointerButton::Secondary,
            select_button: PointerButton::Primary,
            fit_padding: 50.0,
            point_radius: 3.0,
            background: "#1e1e1e".into(),
            point_color: "#ffffff".into(),
            control_color: "#ffaa00".into(),
            selection_color: "#00ff00".into(),
            x_handle_color: "#ff4444".into(),
            y_handle_color: "#4488ff".into(),
        }
    }
}

// ─── View transform ──────────────────────────────────────────────────────

/// Shape-local → screen: `screen = local · zoom + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub offset: Vec2,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn to_local(&self, screen: Point) -> Point {
        ((screen.to_vec2() - self.offset) / self.zoom).to_point()
    }

    pub fn to_screen(&self, local: Point) -> Point {
        (local.to_vec2() * self.zoom + self.offset).to_point()
    }

    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Set a new zoom keeping the local point under `cursor` fixed.
    pub fn zoom_at(&mut self, cursor: Point, new_zoom: f64) {
        let ratio = new_zoom / self.zoom;
        self.offset = cursor.to_vec2() - (cursor.to_vec2() - self.offset) * ratio;
        self.zoom = new_zoom;
    }
}

// ─── Drag state ──────────────────────────────────────────────────────────

/// Axes a point drag may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Both,
    X,
    Y,
}

impl Axis {
    fn constrain(self, old: Point, new: Point) -> Point {
        match self {
            Axis::Both => new,
            Axis::X => Point::new(new.x, old.y),
            Axis::Y => Point::new(old.x, new.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Panning { last: Point },
    /// `grab` is the anchor minus the pointer, in local units.
    DraggingPoint { axis: Axis, grab: Vec2 },
}

/// A point of the open shape: which command, and which of its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedPoint {
    pub command: usize,
    pub kind: PointKind,
}

/// Screen positions of the selection handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handles {
    pub point: Point,
    pub x: Point,
    pub y: Point,
}

/// What an event changed, for redraw decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Unchanged,
    View,
    Selection,
    Geometry,
    Released,
}

impl Outcome {
    pub fn needs_redraw(self) -> bool {
        self != Outcome::Unchanged
    }
}

// ─── Session ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EditSession {
    pub view: ViewTransform,
    pub config: EditorConfig,
    drag: DragState,
    selected: Option<SelectedPoint>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            view: ViewTransform::default(),
            config,
            drag: DragState::Idle,
            selected: None,
        }
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn selected(&self) -> Option<SelectedPoint> {
        self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.drag = DragState::Idle;
    }

    /// Back to an unselected, unpanned, unzoomed view.
    pub fn reset(&mut self) {
        self.clear_selection();
        self.view = ViewTransform::default();
    }

    /// Hit-test a screen position against every point of `commands`.
    ///
    /// Commands are scanned in order, endpoint before control point; the
    /// first point within tolerance wins. A miss clears the selection.
    pub fn select_point(&mut self, commands: &[Command], screen: Point) -> Option<SelectedPoint> {
        let local = self.view.to_local(screen);
        let tolerance = self.config.hit_tolerance / self.view.zoom;

        self.selected = commands.iter().enumerate().find_map(|(command, cmd)| {
            [PointKind::End, PointKind::Control].into_iter().find_map(|kind| {
                cmd.point(kind)
                    .filter(|p| p.distance(local) < tolerance)
                    .map(|_| SelectedPoint { command, kind })
            })
        });
        self.selected
    }

    /// Local position of the selected point, if it still exists.
    pub fn selected_position(&self, commands: &[Command]) -> Option<Point> {
        let sel = self.selected?;
        commands.get(sel.command)?.point(sel.kind)
    }

    pub fn handles(&self, commands: &[Command]) -> Option<Handles> {
        let point = self.view.to_screen(self.selected_position(commands)?);
        let len = self.config.handle_length;
        Some(Handles {
            point,
            x: point + Vec2::new(len, 0.0),
            y: point + Vec2::new(0.0, len),
        })
    }

    /// Which handle of the selected point is under `screen`, if any.
    pub fn hit_handle(&self, commands: &[Command], screen: Point) -> Option<Axis> {
        let handles = self.handles(commands)?;
        let r = self.config.handle_radius;
        [
            (handles.point, Axis::Both),
            (handles.x, Axis::X),
            (handles.y, Axis::Y),
        ]
        .into_iter()
        .find(|(at, _)| at.distance(screen) < r)
        .map(|(_, axis)| axis)
    }

    pub fn pointer_down(&mut self, commands: &[Command], screen: Point, button: PointerButton) -> Outcome {
        if button == self.config.pan_button {
            self.drag = DragState::Panning { last: screen };
            return Outcome::Unchanged;
        }
        if button != self.config.select_button {
            return Outcome::Unchanged;
        }

        if let Some(axis) = self.hit_handle(commands, screen)
            && let Some(anchor) = self.selected_position(commands)
        {
            let grab = anchor - self.view.to_local(screen);
            self.drag = DragState::DraggingPoint { axis, grab };
            log::trace!("drag {axis:?} on {:?}", self.selected);
            return Outcome::Unchanged;
        }

        let before = self.selected;
        let after = self.select_point(commands, screen);
        if before == after {
            Outcome::Unchanged
        } else {
            Outcome::Selection
        }
    }

    /// Continue the armed gesture. Safe to call at any rate, with or
    /// without an active drag.
    pub fn pointer_move(&mut self, commands: &mut [Command], screen: Point) -> Outcome {
        match self.drag {
            DragState::Idle => Outcome::Unchanged,
            DragState::Panning { last } => {
                self.view.offset += screen - last;
                self.drag = DragState::Panning { last: screen };
                Outcome::View
            }
            DragState::DraggingPoint { axis, grab } => {
                let Some(sel) = self.selected else {
                    return Outcome::Unchanged;
                };
                let Some(cmd) = commands.get_mut(sel.command) else {
                    return Outcome::Unchanged;
                };
                let Some(old) = cmd.point(sel.kind) else {
                    return Outcome::Unchanged;
                };
                let target = self.view.to_local(screen) + grab;
                if cmd.set_point(sel.kind, axis.constrain(old, target)) {
                    Outcome::Geometry
                } else {
                    Outcome::Unchanged
                }
            }
        }
    }

    /// End any gesture.
    pub fn pointer_up(&mut self) -> Outcome {
        let was = std::mem::replace(&mut self.drag, DragState::Idle);
        if was == DragState::Idle {
            Outcome::Unchanged
        } else {
            Outcome::Released
        }
    }

    /// One wheel step: zoom in for `delta_y < 0`, out otherwise, about
    /// the cursor.
    pub fn wheel(&mut self, cursor: Point, delta_y: f64) -> Outcome {
        let factor = if delta_y < 0.0 {
            1.0 + self.config.zoom_step
        } else {
            1.0 - self.config.zoom_step
        };
        let zoom = (self.view.zoom * factor).clamp(self.config.min_zoom, self.config.max_zoom);
        if zoom == self.view.zoom {
            return Outcome::Unchanged;
        }
        self.view.zoom_at(cursor, zoom);
        Outcome::View
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape() -> Vec<Command> {
        vec![
            Command::style(Some("red"), None, None),
            Command::move_to(0.0, 0.0),
            Command::line_to(100.0, 0.0),
            Command::curve_to(150.0, 50.0, 100.0, 100.0),
        ]
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn select_point_endpoint_before_control() {
        let cmds = shape();
        let mut s = EditSession::default();
        assert_eq!(
            s.select_point(&cmds, Point::new(98.0, 3.0)),
            Some(SelectedPoint { command: 2, kind: PointKind::End })
        );
        assert_eq!(
            s.select_point(&cmds, Point::new(148.0, 52.0)),
            Some(SelectedPoint { command: 3, kind: PointKind::Control })
        );
        assert_eq!(s.select_point(&cmds, Point::new(50.0, 50.0)), None);
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn tolerance_scales_with_zoom() {
        let cmds = shape();
        let mut s = EditSession::default();
        s.view.zoom = 4.0;
        // 12px away on screen is 3 local units: outside 10px tolerance.
        assert_eq!(s.select_point(&cmds, Point::new(412.0, 0.0)), None);
        assert!(s.select_point(&cmds, Point::new(408.0, 0.0)).is_some());
    }

    #[test]
    fn pan_moves_offset_by_pointer_delta() {
        let mut cmds = shape();
        let mut s = EditSession::default();
        s.pointer_down(&cmds, Point::new(10.0, 10.0), PointerButton::Secondary);
        assert_eq!(s.pointer_move(&mut cmds, Point::new(15.0, 7.0)), Outcome::View);
        s.pointer_move(&mut cmds, Point::new(20.0, 7.0));
        assert_eq!(s.view.offset, Vec2::new(10.0, -3.0));
        assert_eq!(s.pointer_up(), Outcome::Released);
        assert_eq!(s.pointer_move(&mut cmds, Point::new(90.0, 90.0)), Outcome::Unchanged);
        assert_eq!(cmds, shape());
    }

    #[test]
    fn select_click_without_handle_does_not_arm_drag() {
        let mut cmds = shape();
        let mut s = EditSession::default();
        assert_eq!(
            s.pointer_down(&cmds, Point::new(1.0, 1.0), PointerButton::Primary),
            Outcome::Selection
        );
        assert_eq!(s.drag(), DragState::Idle);
        assert_eq!(s.pointer_move(&mut cmds, Point::new(30.0, 30.0)), Outcome::Unchanged);
        assert_eq!(cmds, shape());
    }

    #[test]
    fn x_handle_drag_writes_only_x() {
        let mut cmds = shape();
        let mut s = EditSession::default();
        s.select_point(&cmds, Point::new(100.0, 0.0));

        // +X handle sits 40px right of the point.
        s.pointer_down(&cmds, Point::new(141.0, 1.0), PointerButton::Primary);
        assert!(matches!(s.drag(), DragState::DraggingPoint { axis: Axis::X, .. }));
        assert_eq!(s.pointer_move(&mut cmds, Point::new(161.0, 30.0)), Outcome::Geometry);
        assert_eq!(cmds[2], Command::line_to(120.0, 0.0));
        s.pointer_up();
        assert_eq!(s.drag(), DragState::Idle);
    }

    #[test]
    fn move_circle_drags_control_point_both_axes() {
        let mut cmds = shape();
        let mut s = EditSession::default();
        s.view = ViewTransform { offset: Vec2::new(10.0, 10.0), zoom: 2.0 };
        let screen = s.view.to_screen(Point::new(150.0, 50.0));
        s.select_point(&cmds, screen);
        s.pointer_down(&cmds, screen + Vec2::new(2.0, 0.0), PointerButton::Primary);
        s.pointer_move(&mut cmds, screen + Vec2::new(22.0, -20.0));
        assert_eq!(cmds[3], Command::curve_to(160.0, 40.0, 100.0, 100.0));
    }

    #[test]
    fn y_handle_with_zoom() {
        let mut cmds = shape();
        let mut s = EditSession::default();
        s.view.zoom = 0.5;
        s.select_point(&cmds, Point::new(0.0, 0.0));
        assert_eq!(s.hit_handle(&cmds, Point::new(0.0, 45.0)), Some(Axis::Y));
        s.pointer_down(&cmds, Point::new(0.0, 45.0), PointerButton::Primary);
        s.pointer_move(&mut cmds, Point::new(50.0, 55.0));
        assert_eq!(cmds[1], Command::move_to(0.0, 20.0));
    }

    #[test]
    fn wheel_zooms_about_cursor_and_clamps() {
        let mut s = EditSession::default();
        let cursor = Point::new(100.0, 100.0);
        let before = s.view.to_local(cursor);
        assert_eq!(s.wheel(cursor, -120.0), Outcome::View);
        assert!((s.view.zoom - 1.1).abs() < 1e-12);
        assert!(close(s.view.to_local(cursor), before));

        s.wheel(cursor, 120.0);
        assert!((s.view.zoom - 0.99).abs() < 1e-12);

        s.view.zoom = 25.0;
        assert_eq!(s.wheel(cursor, -1.0), Outcome::Unchanged);
        s.view.zoom = 0.105;
        s.wheel(cursor, 1.0);
        assert_eq!(s.view.zoom, 0.1);
    }

    #[test]
    fn other_buttons_are_ignored() {
        let cmds = shape();
        let mut s = EditSession::default();
        assert_eq!(
            s.pointer_down(&cmds, Point::new(0.0, 0.0), PointerButton::Auxiliary),
            Outcome::Unchanged
        );
        assert_eq!(s.selected(), None);
        assert_eq!(s.pointer_up(), Outcome::Unchanged);
    }
}
