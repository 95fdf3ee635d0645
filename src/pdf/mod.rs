//! # PDF Assembler
//!
//! Stitches rendered slide images into one multi-page PDF, one slide per
//! page, in input order. Every page is 1080×1350 points and the image is
//! stretched to cover it.
//!
//! The writer emits PDF 1.7 by hand. Per page it writes the image XObject
//! (plus a soft mask when the PNG has alpha), a tiny content stream that
//! paints it, and the page dictionary.
//!
//! ```text
//! %PDF-1.7
//! 1 0 obj Catalog     2 0 obj Pages
//! n 0 obj Image       n+1 0 obj Contents    n+2 0 obj Page   ...
//! xref / trailer / %%EOF
//! ```
//!
//! Assembly is all-or-nothing: every image is decoded before the first byte
//! is written, so a bad image yields an error and no partial document.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::config::Metadata;
use crate::error::{CarouselError, Result};
use crate::image_loader::{decode_slide_image, ImagePixels, JpegColor, SlideImage};
use crate::model::{CANVAS_HEIGHT, CANVAS_WIDTH};

const PRODUCER: &str = concat!("carousel ", env!("CARGO_PKG_VERSION"));

pub struct PdfWriter;

struct PdfBuilder {
    objects: Vec<PdfObject>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (objects are 1-indexed), 1 = Catalog, 2 = Pages
        Self {
            objects: (0..3).map(|_| PdfObject { data: Vec::new() }).collect(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::with_capacity(payload.len() + dict.len() + 32);
        let _ = write!(data, "<< {} /Length {} >>\nstream\n", dict, payload.len());
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Build a PDF with one page per encoded slide image.
    pub fn assemble(&self, images: &[Vec<u8>], metadata: &Metadata) -> Result<Vec<u8>> {
        if images.is_empty() {
            return Err(CarouselError::Precondition(
                "cannot assemble a PDF from zero slides".to_string(),
            ));
        }

        let decoded = images
            .iter()
            .enumerate()
            .map(|(i, bytes)| {
                decode_slide_image(bytes).map_err(|e| match e {
                    CarouselError::ImageError(msg) => {
                        CarouselError::ImageError(format!("slide {}: {}", i + 1, msg))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = PdfBuilder::new();
        let (page_w, page_h) = (CANVAS_WIDTH, CANVAS_HEIGHT);
        let mut page_ids = Vec::with_capacity(decoded.len());

        for image in &decoded {
            let image_id = Self::write_image_xobject(&mut builder, image);

            let content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", page_w, page_h);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let page = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                 /Contents {} 0 R /Resources << /XObject << /Im0 {} 0 R >> >> >>",
                page_w, page_h, content_id, image_id
            );
            page_ids.push(builder.push(page.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();
        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data =
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_ids.len()).into_bytes();

        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
        }
        let _ = write!(info, "/Producer ({}) >>", PRODUCER);
        let info_id = builder.push(info.into_bytes());

        log::debug!("assembled {} page pdf", page_ids.len());
        Ok(Self::serialize(&builder, info_id))
    }

    fn write_image_xobject(builder: &mut PdfBuilder, image: &SlideImage) -> usize {
        let (w, h) = (image.width, image.height);
        match &image.pixels {
            ImagePixels::Jpeg { data, color } => {
                let color_space = match color {
                    JpegColor::Gray => "/DeviceGray",
                    JpegColor::Rgb => "/DeviceRGB",
                    JpegColor::Cmyk { inverted: false } => "/DeviceCMYK",
                    JpegColor::Cmyk { inverted: true } => "/DeviceCMYK /Decode [1 0 1 0 1 0 1 0]",
                };
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace {} /BitsPerComponent 8 /Filter /DCTDecode",
                    w, h, color_space
                );
                builder.push_stream(&dict, data)
            }
            ImagePixels::Rgb { rgb, alpha } => {
                let smask = alpha.as_ref().map(|alpha| {
                    let dict = format!(
                        "/Type /XObject /Subtype /Image /Width {} /Height {} \
                         /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                        w, h
                    );
                    builder.push_stream(&dict, &compress_to_vec_zlib(alpha, 6))
                });
                let smask_ref = smask
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    w, h, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    fn serialize(builder: &PdfBuilder, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets = vec![0usize; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_id,
            xref_offset
        );
        output
    }
}

fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
