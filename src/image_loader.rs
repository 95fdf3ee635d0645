//! # Slide Image Decoding
//!
//! Turns encoded slide images (PNG from the rasterizer, or JPEG from storage)
//! into something the PDF assembler can embed. JPEG streams are kept as-is
//! and embedded with DCTDecode; PNG is decoded to RGB with a separate alpha
//! plane for the soft mask.

use std::io::Cursor;

use crate::error::{CarouselError, Result};

/// One decoded slide image.
#[derive(Debug, Clone)]
pub struct SlideImage {
    pub pixels: ImagePixels,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub enum ImagePixels {
    /// Untouched JPEG stream.
    Jpeg { data: Vec<u8>, color: JpegColor },
    /// width * height * 3 bytes, plus an alpha plane when any pixel is translucent.
    Rgb { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// Colour model of a JPEG stream, from its frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColor {
    Gray,
    Rgb,
    /// Adobe-written CMYK stores inverted components.
    Cmyk { inverted: bool },
}

/// Decode one slide image, sniffing the format from its magic bytes.
pub fn decode_slide_image(data: &[u8]) -> Result<SlideImage> {
    if data.starts_with(&[0xFF, 0xD8]) {
        read_jpeg(data)
    } else if data.starts_with(&[0x89, b'P', b'N', b'G']) {
        read_png(data)
    } else {
        Err(CarouselError::ImageError(format!(
            "unrecognized image data ({} bytes), expected PNG or JPEG",
            data.len()
        )))
    }
}

fn read_jpeg(data: &[u8]) -> Result<SlideImage> {
    let (width, height) = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| CarouselError::ImageError(format!("jpeg sniff failed: {}", e)))?
        .into_dimensions()
        .map_err(|e| CarouselError::ImageError(format!("jpeg header unreadable: {}", e)))?;

    Ok(SlideImage {
        pixels: ImagePixels::Jpeg {
            data: data.to_vec(),
            color: jpeg_color(data),
        },
        width,
        height,
    })
}

/// Colour model from the component count of the first start-of-frame
/// segment. An APP14 "Adobe" segment marks CMYK data as inverted.
fn jpeg_color(data: &[u8]) -> JpegColor {
    let mut adobe = false;
    let mut pos = 2;
    while pos + 3 < data.len() && data[pos] == 0xFF {
        let marker = data[pos + 1];
        if marker == 0xEE && data.get(pos + 4..pos + 9) == Some(&b"Adobe"[..]) {
            adobe = true;
        }
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            return match data.get(pos + 9) {
                Some(1) => JpegColor::Gray,
                Some(4) => JpegColor::Cmyk { inverted: adobe },
                _ => JpegColor::Rgb,
            };
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 2 + len;
    }
    JpegColor::Rgb
}

fn read_png(data: &[u8]) -> Result<SlideImage> {
    let rgba = image::load_from_memory_with_format(data, image::ImageFormat::Png)
        .map_err(|e| CarouselError::ImageError(format!("png decode failed: {}", e)))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let count = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(count * 3);
    let mut alpha = Vec::with_capacity(count);
    for px in rgba.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }
    let opaque = alpha.iter().all(|&a| a == 255);

    Ok(SlideImage {
        pixels: ImagePixels::Rgb {
            rgb,
            alpha: if opaque { None } else { Some(alpha) },
        },
        width,
        height,
    })
}
