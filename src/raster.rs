use anyhow::{Context, Result};
use std::path::Path;
use tiny_skia::{Pixmap, Transform};

use crate::renderer::RenderedClock;

/// Rasterize the clock at `width` x `height` pixels.
pub fn rasterize(clock: &RenderedClock, width: u32, height: u32) -> Result<Pixmap> {
    let doc = clock.to_svg_document(width, height);
    let tree = resvg::usvg::Tree::from_str(&doc, &resvg::usvg::Options::default())
        .context("Failed to parse rendered SVG")?;
    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("Invalid raster size {}x{}", width, height))?;
    let svg_size = tree.size();
    let sx = width as f32 / svg_size.width();
    let sy = height as f32 / svg_size.height();
    resvg::render(&tree, Transform::from_scale(sx, sy), &mut pixmap.as_mut());
    Ok(pixmap)
}

pub fn save_png(clock: &RenderedClock, width: u32, height: u32, path: &Path) -> Result<()> {
    let pixmap = rasterize(clock, width, height)?;
    pixmap
        .save_png(path)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))?;
    log::info!("Wrote {}x{} preview to {}", width, height, path.display());
    Ok(())
}
