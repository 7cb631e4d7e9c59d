use kurbo::Size;
use std::fmt::Write as _;
use std::path::Path;
use vs_core::{CharId, Dataset, Library, SceneError};
use vs_editor::export_json;
use vs_render::{AtlasConfig, AtlasLayout, SceneCompositor, SvgSurface, render_atlas};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

fn load(input: &Path) -> CliResult<(Library, Vec<SceneError>)> {
    let json = std::fs::read_to_string(input)?;
    log::debug!("reading {}", input.display());
    Ok(Library::ingest(Dataset::from_json(&json)?))
}

fn emit(text: &str, output: Option<&Path>) -> CliResult {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("wrote {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// `WxH` with both sides positive.
pub fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{s}`"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("reference size must be positive, got {w}x{h}"));
    }
    Ok(Size::new(w, h))
}

/// A cell edge in pixels; zero or negative would make the grid unbounded.
pub fn parse_cell_size(s: &str) -> Result<f64, String> {
    let size: f64 = s.trim().parse().map_err(|e| format!("cell size: {e}"))?;
    if !(size > 0.0 && size.is_finite()) {
        return Err(format!("cell size must be positive, got {size}"));
    }
    Ok(size)
}

pub fn summary(library: &Library, diagnostics: &[SceneError]) -> String {
    let mut out = String::new();
    let name = if library.name().is_empty() { "(unnamed)" } else { library.name() };
    let _ = writeln!(out, "{name}: {} shapes, {} sprites", library.shapes().len(), library.sprites().len());
    for shape in library.shapes() {
        let _ = writeln!(
            out,
            "  shape {:<16} {:>4} commands, {} layers",
            library.label(shape.char_id),
            shape.commands.len(),
            shape.layers().len()
        );
    }
    for sprite in library.sprites() {
        let _ = writeln!(
            out,
            "  sprite {:<24} {:>3} frames",
            library.sprite_display_name(sprite.sprite_id),
            sprite.len()
        );
    }
    for d in diagnostics {
        let _ = writeln!(out, "  warning: {d}");
    }
    out
}

pub fn inspect(input: &Path) -> CliResult {
    let (library, diagnostics) = load(input)?;
    print!("{}", summary(&library, &diagnostics));
    Ok(())
}

pub fn atlas(input: &Path, width: f64, cell_size: f64, output: Option<&Path>) -> CliResult {
    let (library, _) = load(input)?;
    let config = AtlasConfig {
        cell_size,
        ..AtlasConfig::default()
    };
    let layout = AtlasLayout::compute(library.shapes(), width, &config);
    let mut svg = SvgSurface::new(layout.width, layout.height);
    render_atlas(&mut svg, &library, &layout, &config);
    emit(&svg.finish(), output)
}

pub fn frame(
    input: &Path,
    id: u32,
    frame: usize,
    (width, height): (f64, f64),
    transforms: bool,
    output: Option<&Path>,
) -> CliResult {
    let (library, _) = load(input)?;
    let mut compositor = SceneCompositor::default();
    compositor.enable_transforms = transforms;
    if !compositor.select(&library, CharId(id)) {
        return Err(format!("no sprite or shape with id {id}").into());
    }
    let shown = compositor.set_frame(&library, frame);

    let mut svg = SvgSurface::new(width, height);
    let report = compositor.render(&mut svg, &library, width, height);
    log::info!(
        "frame {shown}/{}: {} instances, {} shapes",
        compositor.frame_count(&library),
        report.instances,
        report.shapes
    );
    for missing in &report.missing {
        log::warn!("unresolved charId {missing}");
    }
    emit(&svg.finish(), output)
}

pub fn shape(input: &Path, id: u32, normalize: Option<Size>) -> CliResult {
    let (library, _) = load(input)?;
    let shape = library
        .shape(CharId(id))
        .ok_or(SceneError::UnknownShape(CharId(id)))?;
    println!("{}", export_json(&shape.commands, normalize)?);
    Ok(())
}
