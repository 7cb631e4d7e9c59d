//! Atlas: every shape of a dataset in a fixed-cell grid.
//!
//! Layout is row-major in upload order. Each shape is centered in its cell
//! and scaled so large shapes fit and tiny ones stay legible. The layout is
//! kept after rendering so pointer positions can be mapped back to a charId
//! with the same column count that placed the cells.

use crate::paint::replay;
use crate::surface::Surface;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use vs_core::{Bounds, CharId, Library, Shape};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub cell_size: f64,
    /// Breathing room subtracted from the cell when fitting a shape.
    pub padding: f64,
    pub min_height: f64,
    /// Label position relative to the cell's top-left corner.
    pub label_offset: [f64; 2],
    pub label_px: f64,
    pub background: String,
    pub cell_border: Option<String>,
    pub label_color: String,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            cell_size: 150.0,
            padding: 20.0,
            min_height: 600.0,
            label_offset: [5.0, 15.0],
            label_px: 11.0,
            background: "#222".into(),
            cell_border: Some("#444".into()),
            label_color: "#ccc".into(),
        }
    }
}

/// Scale that fits a shape of extent `max_dim` into a cell.
///
/// Shapes larger than the padded cell shrink to fit; shapes smaller than a
/// third of it grow to half the padded cell; anything in between is drawn
/// at its natural size. A degenerate shape keeps scale 1.
pub fn fit_scale(max_dim: f64, cell_size: f64, padding: f64) -> f64 {
    if !max_dim.is_finite() || max_dim <= 0.0 {
        return 1.0;
    }
    let target = cell_size - padding;
    if max_dim > target {
        target / max_dim
    } else if max_dim < cell_size / 3.0 - padding {
        target / (2.0 * max_dim)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasCell {
    pub index: usize,
    pub char_id: CharId,
    pub row: usize,
    pub col: usize,
    /// Shape bounds at layout time.
    pub bounds: Bounds,
    pub scale: f64,
}

impl AtlasCell {
    pub fn rect(&self, cell_size: f64) -> Rect {
        let x = self.col as f64 * cell_size;
        let y = self.row as f64 * cell_size;
        Rect::new(x, y, x + cell_size, y + cell_size)
    }

    /// Shape-local → atlas pixels: cell center ∘ scale ∘ −bounds center.
    pub fn transform(&self, cell_size: f64) -> Affine {
        let center = self.rect(cell_size).center();
        Affine::translate(center.to_vec2())
            * Affine::scale(self.scale)
            * Affine::translate(-self.bounds.center().to_vec2())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtlasLayout {
    pub cols: usize,
    pub rows: usize,
    pub width: f64,
    pub height: f64,
    pub cell_size: f64,
    pub cells: Vec<AtlasCell>,
}

impl AtlasLayout {
    pub fn compute(shapes: &[Shape], viewport_width: f64, config: &AtlasConfig) -> Self {
        let cell = config.cell_size;
        let cols = ((viewport_width / cell).floor() as usize).max(1);
        let rows = shapes.len().div_ceil(cols);
        let height = config.min_height.max(rows as f64 * cell);

        let cells = shapes
            .iter()
            .enumerate()
            .map(|(index, shape)| {
                let bounds = shape.bounds();
                AtlasCell {
                    index,
                    char_id: shape.char_id,
                    row: index / cols,
                    col: index % cols,
                    bounds,
                    scale: fit_scale(bounds.max_dim(), cell, config.padding),
                }
            })
            .collect();

        log::debug!("atlas: {} shapes in {cols}x{rows} cells", shapes.len());

        Self {
            cols,
            rows,
            width: viewport_width,
            height,
            cell_size: cell,
            cells,
        }
    }

    pub fn index_of(&self, row: usize, col: usize) -> usize {
        self.cols * row + col
    }

    /// The cell under an atlas-space pixel, if a shape occupies it.
    pub fn cell_at(&self, p: Point) -> Option<&AtlasCell> {
        if !(p.x >= 0.0 && p.y >= 0.0) {
            return None;
        }
        let col = (p.x / self.cell_size).floor() as usize;
        let row = (p.y / self.cell_size).floor() as usize;
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(self.index_of(row, col))
    }

    pub fn char_id_at(&self, p: Point) -> Option<CharId> {
        self.cell_at(p).map(|c| c.char_id)
    }
}

/// Paint the whole atlas: background, cell frames, shapes, labels.
pub fn render_atlas<S: Surface + ?Sized>(
    surface: &mut S,
    library: &Library,
    layout: &AtlasLayout,
    config: &AtlasConfig,
) {
    surface.fill_rect(
        Rect::new(0.0, 0.0, layout.width, layout.height),
        &config.background,
    );

    for cell in &layout.cells {
        let rect = cell.rect(layout.cell_size);

        if let Some(border) = &config.cell_border {
            surface.begin_path();
            surface.move_to(Point::new(rect.x0, rect.y0));
            surface.line_to(Point::new(rect.x1, rect.y0));
            surface.line_to(Point::new(rect.x1, rect.y1));
            surface.line_to(Point::new(rect.x0, rect.y1));
            surface.close_path();
            surface.stroke(border, 1.0);
        }

        let Some(shape) = library.shape(cell.char_id) else {
            log::trace!("atlas cell {} lost shape {}", cell.index, cell.char_id);
            continue;
        };
        surface.save();
        surface.transform(cell.transform(layout.cell_size));
        replay(surface, &shape.commands);
        surface.restore();

        let [dx, dy] = config.label_offset;
        surface.fill_text(
            &library.label(cell.char_id),
            Point::new(rect.x0 + dx, rect.y0 + dy),
            &config.label_color,
            config.label_px,
        );
    }
}
