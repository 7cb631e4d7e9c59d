//! Shape commands → surface drawing calls.
//!
//! Each paint layer (see [`split_layers`]) becomes one fresh path, filled
//! and then stroked with the layer's style. Line width carries over from
//! earlier layers when a `STYLE` does not set a positive one.

use crate::surface::Surface;
use kurbo::Point;
use vs_core::{Command, convex_hull, split_layers};

/// Starting line width before any `STYLE` sets one.
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;

/// Replay every layer of a shape.
pub fn replay<S: Surface + ?Sized>(surface: &mut S, commands: &[Command]) {
    replay_layers(surface, commands, |_| true);
}

/// Replay the layers for which `visible(layer_index)` holds.
///
/// Hidden layers still update the carried line width so that showing or
/// hiding one layer never changes how the others are stroked.
pub fn replay_layers<S, F>(surface: &mut S, commands: &[Command], visible: F)
where
    S: Surface + ?Sized,
    F: Fn(usize) -> bool,
{
    let mut line_width = DEFAULT_LINE_WIDTH;

    for (i, layer) in split_layers(commands).iter().enumerate() {
        if let Some(w) = layer.style.line_width.filter(|w| *w > 0.0) {
            line_width = w;
        }
        if !visible(i) {
            continue;
        }

        surface.begin_path();
        for cmd in &commands[layer.commands.clone()] {
            trace_command(surface, cmd);
        }
        if let Some(fill) = layer.style.fill() {
            surface.fill(fill);
        }
        if let Some(stroke) = layer.style.stroke() {
            surface.stroke(stroke, line_width);
        }
    }
}

fn trace_command<S: Surface + ?Sized>(surface: &mut S, cmd: &Command) {
    match *cmd {
        Command::Move { x, y } => surface.move_to(Point::new(x, y)),
        Command::Line { x, y } => surface.line_to(Point::new(x, y)),
        Command::Curve { cx, cy, x, y } => surface.quad_to(Point::new(cx, cy), Point::new(x, y)),
        Command::Style(_) | Command::Unknown => {}
    }
}

/// Outline the convex hull of a shape's points. A debugging overlay.
pub fn draw_hull<S: Surface + ?Sized>(surface: &mut S, commands: &[Command], color: &str, line_width: f64) {
    let hull = convex_hull(&vs_core::extract_points(commands));
    let Some((first, rest)) = hull.split_first() else {
        return;
    };
    surface.begin_path();
    surface.move_to(*first);
    for p in rest {
        surface.line_to(*p);
    }
    surface.close_path();
    surface.stroke(color, line_width);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DisplayList, DrawOp};
    use pretty_assertions::assert_eq;

    fn two_layer_shape() -> Vec<Command> {
        vec![
            Command::style(Some("red"), None, Some(3.0)),
            Command::move_to(0.0, 0.0),
            Command::line_to(10.0, 0.0),
            Command::line_to(10.0, 10.0),
            Command::style(Some("blue"), Some("black"), None),
            Command::move_to(20.0, 20.0),
            Command::curve_to(25.0, 15.0, 30.0, 20.0),
        ]
    }

    #[test]
    fn each_layer_is_a_fresh_path() {
        let mut dl = DisplayList::new();
        replay(&mut dl, &two_layer_shape());
        assert_eq!(
            dl.ops,
            vec![
                DrawOp::BeginPath,
                DrawOp::MoveTo(Point::new(0.0, 0.0)),
                DrawOp::LineTo(Point::new(10.0, 0.0)),
                DrawOp::LineTo(Point::new(10.0, 10.0)),
                DrawOp::Fill("red".into()),
                DrawOp::BeginPath,
                DrawOp::MoveTo(Point::new(20.0, 20.0)),
                DrawOp::QuadTo(Point::new(25.0, 15.0), Point::new(30.0, 20.0)),
                DrawOp::Fill("blue".into()),
                DrawOp::Stroke("black".into(), 3.0),
            ]
        );
    }

    #[test]
    fn line_width_carries_over_hidden_layers() {
        let mut dl = DisplayList::new();
        replay_layers(&mut dl, &two_layer_shape(), |i| i == 1);
        assert_eq!(dl.fills(), vec!["blue"]);
        assert_eq!(dl.strokes(), vec![("black", 3.0)]);
    }

    #[test]
    fn transparent_and_missing_paint_are_skipped() {
        let cmds = vec![
            Command::move_to(0.0, 0.0),
            Command::line_to(1.0, 1.0),
            Command::style(Some("transparent"), Some(""), Some(0.0)),
            Command::line_to(2.0, 2.0),
        ];
        let mut dl = DisplayList::new();
        replay(&mut dl, &cmds);
        assert!(dl.fills().is_empty());
        assert!(dl.strokes().is_empty());
        assert_eq!(dl.path_points().len(), 3);
    }

    #[test]
    fn hull_is_closed_outline() {
        let cmds = vec![
            Command::move_to(0.0, 0.0),
            Command::line_to(10.0, 0.0),
            Command::line_to(5.0, 2.0),
            Command::line_to(0.0, 10.0),
        ];
        let mut dl = DisplayList::new();
        draw_hull(&mut dl, &cmds, "lime", 1.0);
        assert_eq!(dl.path_points().len(), 3);
        assert!(dl.ops.contains(&DrawOp::ClosePath));
        assert_eq!(dl.strokes(), vec![("lime", 1.0)]);

        let mut empty = DisplayList::new();
        draw_hull(&mut empty, &[], "lime", 1.0);
        assert!(empty.ops.is_empty());
    }
}
