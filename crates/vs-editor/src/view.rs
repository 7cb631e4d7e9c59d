//! Editor view: the open shape under pan/zoom plus its point overlay.
//!
//! The shape is drawn through the view transform; points and handles are
//! drawn in screen space so they keep a constant on-screen size.

use crate::session::{EditSession, EditorConfig, Handles};
use kurbo::Rect;
use vs_core::{Command, PointKind};
use vs_render::{Surface, replay_layers};

pub fn render_editor_view<S, F>(
    surface: &mut S,
    commands: &[Command],
    session: &EditSession,
    visible: F,
    width: f64,
    height: f64,
) where
    S: Surface + ?Sized,
    F: Fn(usize) -> bool,
{
    let config = &session.config;
    surface.fill_rect(Rect::new(0.0, 0.0, width, height), &config.background);

    surface.save();
    surface.transform(session.view.affine());
    replay_layers(surface, commands, visible);
    surface.restore();

    draw_points(surface, commands, session);
    if let Some(handles) = session.handles(commands) {
        draw_handles(surface, &handles, config);
    }
}

fn draw_points<S: Surface + ?Sized>(surface: &mut S, commands: &[Command], session: &EditSession) {
    let config = &session.config;
    for kind in [PointKind::Control, PointKind::End] {
        let color = match kind {
            PointKind::End => &config.point_color,
            PointKind::Control => &config.control_color,
        };
        surface.begin_path();
        for p in commands.iter().filter_map(|c| c.point(kind)) {
            surface.arc(session.view.to_screen(p), config.point_radius);
        }
        surface.fill(color);
    }
}

fn draw_handles<S: Surface + ?Sized>(surface: &mut S, handles: &Handles, config: &EditorConfig) {
    surface.begin_path();
    surface.arc(handles.point, config.handle_radius);
    surface.stroke(&config.selection_color, 1.5);

    for (end, color) in [
        (handles.x, &config.x_handle_color),
        (handles.y, &config.y_handle_color),
    ] {
        surface.begin_path();
        surface.move_to(handles.point);
        surface.line_to(end);
        surface.stroke(color, 2.0);

        surface.begin_path();
        surface.arc(end, config.handle_radius / 2.0);
        surface.fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use pretty_assertions::assert_eq;
    use vs_render::{DisplayList, DrawOp};

    fn two_layers() -> Vec<Command> {
        vec![
            Command::style(Some("red"), None, None),
            Command::move_to(0.0, 0.0),
            Command::line_to(10.0, 0.0),
            Command::style(Some("blue"), None, None),
            Command::move_to(0.0, 5.0),
            Command::curve_to(5.0, 10.0, 10.0, 5.0),
        ]
    }

    #[test]
    fn hidden_layers_are_not_painted_but_points_are() {
        let cmds = two_layers();
        let session = EditSession::default();
        let mut dl = DisplayList::new();
        render_editor_view(&mut dl, &cmds, &session, |i| i != 0, 200.0, 100.0);

        let config = &session.config;
        assert_eq!(
            dl.fills(),
            vec!["blue", config.control_color.as_str(), config.point_color.as_str()]
        );
        let arcs = dl.ops.iter().filter(|op| matches!(op, DrawOp::Arc(..))).count();
        assert_eq!(arcs, 5);
    }

    #[test]
    fn selection_draws_move_circle_and_axis_handles() {
        let cmds = two_layers();
        let mut session = EditSession::default();
        session.view.zoom = 2.0;
        session.select_point(&cmds, Point::new(20.0, 0.0));

        let mut dl = DisplayList::new();
        render_editor_view(&mut dl, &cmds, &session, |_| true, 200.0, 100.0);

        assert!(dl.ops.contains(&DrawOp::Arc(Point::new(20.0, 0.0), 10.0)));
        assert!(dl.ops.contains(&DrawOp::LineTo(Point::new(60.0, 0.0))));
        assert!(dl.ops.contains(&DrawOp::LineTo(Point::new(20.0, 40.0))));
        assert_eq!(dl.strokes().len(), 3);
    }
}
