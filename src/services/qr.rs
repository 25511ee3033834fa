use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use qrcode::{Color, EcLevel as SymbolEcLevel, QrCode};
use thiserror::Error;
use tracing::debug;

use crate::types::{EcLevel, QrConfig};

/// Raster quality hint carried alongside the encoder options. PNG output
/// is lossless, so it only shows up in diagnostics.
pub const RASTER_QUALITY: f32 = 0.92;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("QR symbol construction failed: {0}")]
    Symbol(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),

    #[error("invalid color literal: {0}")]
    Color(String),
}

fn symbol_ec_level(level: EcLevel) -> SymbolEcLevel {
    match level {
        EcLevel::L => SymbolEcLevel::L,
        EcLevel::M => SymbolEcLevel::M,
        EcLevel::Q => SymbolEcLevel::Q,
        EcLevel::H => SymbolEcLevel::H,
    }
}

fn parse_color(literal: &str) -> Result<Rgb<u8>, EncodeError> {
    let hex = literal
        .strip_prefix('#')
        .filter(|h| h.len() == 6)
        .ok_or_else(|| EncodeError::Color(literal.to_string()))?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| EncodeError::Color(literal.to_string()))
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

fn build_symbol(config: &QrConfig) -> Result<QrCode, EncodeError> {
    QrCode::with_error_correction_level(
        config.url.as_bytes(),
        symbol_ec_level(config.error_correction_level),
    )
    .map_err(EncodeError::from)
}

/// Renders the symbol onto an exactly `size`x`size` canvas. Each output
/// pixel is mapped back to the module grid (margin included), so the
/// requested width holds for any module count.
pub fn encode_png(config: &QrConfig) -> Result<Vec<u8>, EncodeError> {
    let code = build_symbol(config)?;
    let dark = parse_color(&config.dark_color)?;
    let light = parse_color(&config.light_color)?;

    let modules = code.width() as u32;
    let total = modules + 2 * config.margin;
    let size = config.size;

    let mut img = RgbImage::from_pixel(size, size, light);
    for py in 0..size {
        let my = (u64::from(py) * u64::from(total) / u64::from(size)) as i64
            - i64::from(config.margin);
        if my < 0 || my >= i64::from(modules) {
            continue;
        }
        for px in 0..size {
            let mx = (u64::from(px) * u64::from(total) / u64::from(size)) as i64
                - i64::from(config.margin);
            if mx < 0 || mx >= i64::from(modules) {
                continue;
            }
            if code[(mx as usize, my as usize)] == Color::Dark {
                img.put_pixel(px, py, dark);
            }
        }
    }

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(img.as_raw(), size, size, ExtendedColorType::Rgb8)?;
    debug!(
        "rendered {}x{} png (quality hint {})",
        size, size, RASTER_QUALITY
    );
    Ok(bytes)
}

pub fn encode_svg(config: &QrConfig) -> Result<String, EncodeError> {
    parse_color(&config.dark_color)?;
    parse_color(&config.light_color)?;
    let code = build_symbol(config)?;

    let modules = code.width() as u32;
    let total = modules + 2 * config.margin;

    let mut path = String::new();
    for y in 0..modules {
        for x in 0..modules {
            if code[(x as usize, y as usize)] == Color::Dark {
                path.push_str(&format!(
                    "M{} {}h1v1h-1z",
                    x + config.margin,
                    y + config.margin
                ));
            }
        }
    }

    Ok(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {total} {total}" width="{size}" height="{size}" shape-rendering="crispEdges"><rect width="{total}" height="{total}" fill="{light}"/><path d="{path}" fill="{dark}"/></svg>"#,
        size = config.size,
        light = config.light_color,
        dark = config.dark_color,
    ))
}

pub fn encode_data_url(config: &QrConfig) -> Result<String, EncodeError> {
    let png = encode_png(config)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}
