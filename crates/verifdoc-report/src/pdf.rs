// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF encoder: serialise laid-out pages and their decoded assets into a
// complete PDF with `printpdf` 0.8, and read the page content streams back
// out of the encoded bytes with `lopdf`.
//
// Only the built-in Helvetica faces are used, so no font data is embedded.
// Filled shapes (gauge track and fill) are drawn as stroked lines whose
// thickness equals the shape height. Image XObjects are named after their
// asset reference, so page streams never carry random identifiers.

use printpdf::{
    BuiltinFont, Line, LinePoint, Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt,
    RawImage, RawImageData, RawImageFormat, TextItem, XObject, XObjectId, XObjectTransform,
};
use tracing::{debug, info, instrument};
use verifdoc_core::error::{Result, VerifdocError};
use verifdoc_core::integrity::{hash_bytes, short_fingerprint};

use crate::embed::AssetStore;
use crate::page::{Color, DrawCommand, Font, Page, Point, STAMP_PADDING, STAMP_TEXT_SIZE};

/// Encodes pages into PDF bytes.
pub struct PdfEncoder {
    /// Title in the PDF /Info dictionary.
    title: String,
}

impl PdfEncoder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Build the PDF. Every image command must name an asset in `assets`.
    #[instrument(skip_all, fields(pages = pages.len(), assets = assets.len()))]
    pub fn encode(&self, pages: &[Page], assets: &AssetStore) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(VerifdocError::PdfError("no pages to encode".into()));
        }

        let mut doc = PdfDocument::new(&self.title);

        for (handle, image) in assets.iter() {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            doc.resources
                .xobjects
                .map
                .insert(xobject_id(handle.as_str()), XObject::Image(raw));
        }

        let pdf_pages = pages
            .iter()
            .map(|page| {
                let ops = page_ops(page, assets)?;
                Ok(PdfPage::new(pt_to_mm(page.width), pt_to_mm(page.height), ops))
            })
            .collect::<Result<Vec<_>>>()?;
        doc.with_pages(pdf_pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            debug!(warnings = warnings.len(), "printpdf reported warnings");
        }

        info!(bytes = bytes.len(), "report encoded");
        Ok(bytes)
    }
}

/// XObject name for an asset reference: `Im` followed by a digest prefix.
pub fn xobject_id(asset: &str) -> XObjectId {
    let digest = hash_bytes(asset.as_bytes());
    XObjectId(format!("Im{}", short_fingerprint(&digest)))
}

/// Content stream of every page of an encoded PDF, in page order.
pub fn page_streams(pdf: &[u8]) -> Result<Vec<Vec<u8>>> {
    let doc = lopdf::Document::load_mem(pdf)
        .map_err(|e| VerifdocError::PdfError(format!("failed to parse encoded PDF: {e}")))?;
    doc.get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            doc.get_page_content(page_id).map_err(|e| {
                VerifdocError::PdfError(format!("failed to read content of page {number}: {e}"))
            })
        })
        .collect()
}

fn page_ops(page: &Page, assets: &AssetStore) -> Result<Vec<Op>> {
    let mut ops = Vec::new();
    for command in &page.commands {
        match command {
            DrawCommand::Text {
                content,
                position,
                size,
                style,
            } => push_text(&mut ops, content, *position, *size, style.font(), style.color()),
            DrawCommand::Image {
                asset,
                position,
                width,
                height,
            } => {
                let image = assets.get_by_ref(asset).ok_or_else(|| {
                    VerifdocError::PdfError(format!(
                        "page {} references asset {asset} that was never embedded",
                        page.index + 1
                    ))
                })?;
                // At 72 dpi one pixel is one point, so the scale is points per pixel.
                ops.push(Op::UseXobject {
                    id: xobject_id(asset),
                    transform: XObjectTransform {
                        translate_x: Some(Pt(position.x)),
                        translate_y: Some(Pt(position.y)),
                        scale_x: Some(width / image.width() as f32),
                        scale_y: Some(height / image.height() as f32),
                        dpi: Some(72.0),
                        rotate: None,
                    },
                });
            }
            DrawCommand::Rule { position, length } => {
                stroke(&mut ops, Color::RULE, 1.0);
                ops.push(polyline(
                    &[*position, Point::new(position.x + length, position.y)],
                    false,
                ));
            }
            DrawCommand::StampBlock {
                position,
                width,
                height,
                lines,
            } => {
                stroke(&mut ops, Color::BRAND, 1.0);
                ops.push(rectangle(*position, *width, *height));
                let baselines = DrawCommand::stamp_baselines(*position, *height, lines.len());
                for (line, y) in lines.iter().zip(baselines) {
                    let origin = Point::new(position.x + STAMP_PADDING, y);
                    push_text(&mut ops, line, origin, STAMP_TEXT_SIZE, Font::Bold, Color::BRAND);
                }
            }
            DrawCommand::Gauge {
                position,
                width,
                height,
                fraction,
            } => {
                let mid = position.y + height / 2.0;
                stroke(&mut ops, Color::TRACK, *height);
                ops.push(polyline(
                    &[
                        Point::new(position.x, mid),
                        Point::new(position.x + width, mid),
                    ],
                    false,
                ));
                let filled = width * fraction.clamp(0.0, 1.0);
                if filled > 0.0 {
                    stroke(&mut ops, Color::BRAND, *height);
                    ops.push(polyline(
                        &[
                            Point::new(position.x, mid),
                            Point::new(position.x + filled, mid),
                        ],
                        false,
                    ));
                }
                stroke(&mut ops, Color::RULE, 1.0);
                ops.push(rectangle(*position, *width, *height));
            }
        }
    }
    Ok(ops)
}

fn push_text(ops: &mut Vec<Op>, content: &str, origin: Point, size: f32, font: Font, color: Color) {
    let font = builtin(font);
    ops.push(Op::SetFillColor {
        col: pdf_color(color),
    });
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: pdf_point(origin),
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(content.to_owned())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn stroke(ops: &mut Vec<Op>, color: Color, thickness: f32) {
    ops.push(Op::SetOutlineColor {
        col: pdf_color(color),
    });
    ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
}

fn polyline(points: &[Point], is_closed: bool) -> Op {
    Op::DrawLine {
        line: Line {
            points: points
                .iter()
                .map(|p| LinePoint {
                    p: pdf_point(*p),
                    bezier: false,
                })
                .collect(),
            is_closed,
        },
    }
}

fn rectangle(origin: Point, width: f32, height: f32) -> Op {
    polyline(
        &[
            origin,
            Point::new(origin.x + width, origin.y),
            Point::new(origin.x + width, origin.y + height),
            Point::new(origin.x, origin.y + height),
        ],
        true,
    )
}

fn builtin(font: Font) -> BuiltinFont {
    match font {
        Font::Regular => BuiltinFont::Helvetica,
        Font::Bold => BuiltinFont::HelveticaBold,
    }
}

fn pdf_color(color: Color) -> printpdf::Color {
    printpdf::Color::Rgb(printpdf::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
        icc_profile: None,
    })
}

fn pdf_point(point: Point) -> printpdf::Point {
    printpdf::Point {
        x: Pt(point.x),
        y: Pt(point.y),
    }
}

fn pt_to_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}
