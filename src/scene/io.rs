use std::path::Path;

use anyhow::Context;

use crate::foundation::core::Color;
use crate::foundation::error::{StrataError, StrataResult};
use crate::surface::buffer::Surface;

/// Decode encoded image bytes into a straight-alpha float surface.
pub fn decode_image(bytes: &[u8]) -> StrataResult<Surface> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (w, h) = rgba.dimensions();
    let pixels = rgba.pixels().map(|p| Color::from_rgba8(p.0)).collect();
    Surface::from_pixels(w as usize, h as usize, pixels)
}

pub fn load_image(path: &Path) -> StrataResult<Surface> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Encode a surface as PNG, saturating channels into 8 bits.
pub fn encode_png(surface: &Surface) -> StrataResult<Vec<u8>> {
    let (w, h) = (surface.width() as u32, surface.height() as u32);
    let raw: Vec<u8> = surface.pixels().iter().flat_map(|c| c.to_rgba8()).collect();
    let img = image::RgbaImage::from_raw(w, h, raw)
        .ok_or_else(|| StrataError::validation(format!("{w}x{h} surface does not fit an image")))?;
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out.into_inner())
}

pub fn save_png(surface: &Surface, path: &Path) -> StrataResult<()> {
    let bytes = encode_png(surface)?;
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/io.rs"]
mod tests;
