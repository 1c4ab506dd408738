//! Content-stream operators for one composed block.

use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::Operation;
use lopdf::{dictionary, Object, Stream, StringFormat};
use tracing::warn;

use crate::forms::compositor::FormBlock;
use crate::forms::images::ResolvedImage;
use crate::forms::layout::text::AVERAGE_ADVANCE_EM;
use crate::forms::layout::{BoxContent, LayoutConstants, Rect};

use super::coords::PageFrame;

/// Resource name under which the stamping font is registered on each page.
pub const FONT_RESOURCE: &str = "BFHelv";

const CAP_HEIGHT_EM: f32 = 0.7;
const TEXT_INSET: f32 = 2.0;

/// Operators and image XObjects to add to a template page.
#[derive(Debug, Default)]
pub struct PageStamp {
    pub operations: Vec<Operation>,
    pub images: Vec<(String, Stream)>,
}

pub fn stamp_block(
    block: &FormBlock,
    frame: &PageFrame,
    constants: &LayoutConstants,
    page_number: u32,
) -> PageStamp {
    let mut stamp = PageStamp::default();
    stamp.operations.push(op("q", vec![]));
    stamp.operations.push(op("g", vec![real(0.0)]));
    stamp.operations.push(op("G", vec![real(0.0)]));

    block.root.walk(0.0, 0.0, &mut |node, rect| match &node.content {
        BoxContent::Container | BoxContent::CellRow => {}
        BoxContent::Heading { text } => {
            clipped_text(&mut stamp, frame, rect, text, constants.heading_font_size)
        }
        BoxContent::Label { text } | BoxContent::Caption { text } => {
            clipped_text(&mut stamp, frame, rect, text, constants.font_size)
        }
        BoxContent::Cell { glyph, border } => {
            bordered_box(&mut stamp, frame, rect, *border);
            if let Some(glyph) = glyph {
                centered_glyph(&mut stamp, frame, rect, *glyph, constants.font_size);
            }
        }
        BoxContent::Checkbox { checked, border } => {
            bordered_box(&mut stamp, frame, rect, *border);
            if *checked {
                cross(&mut stamp, frame, rect, *border);
            }
        }
        BoxContent::Paragraph { lines } => {
            let line_height = constants.line_height();
            for (index, line) in lines.iter().enumerate() {
                let line_rect = Rect::new(
                    rect.x,
                    rect.y + index as f32 * line_height,
                    rect.width,
                    line_height,
                );
                text_line(&mut stamp, frame, line_rect, line, constants.font_size);
            }
        }
        BoxContent::Image { image, placeholder } => {
            let embedded = match image {
                Some(image) => embed_image(&mut stamp, frame, rect, image)
                    .map_err(|reason| {
                        warn!(
                            page = page_number,
                            slot = node.key.as_deref().unwrap_or("image"),
                            %reason,
                            "image could not be embedded, stamping placeholder"
                        );
                    })
                    .is_ok(),
                None => false,
            };
            if !embedded {
                placeholder_box(&mut stamp, frame, rect, placeholder, constants.font_size);
            }
        }
    });

    stamp.operations.push(op("Q", vec![]));
    stamp
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

/// Latin-1 subset of WinAnsi; anything else is replaced with `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch as u32 {
            code @ 0x20..=0x7e | code @ 0xa0..=0xff => code as u8,
            _ => b'?',
        })
        .collect()
}

fn rect_operands(frame: &PageFrame, rect: Rect) -> Vec<Object> {
    frame.rect(rect).into_iter().map(real).collect()
}

fn bordered_box(stamp: &mut PageStamp, frame: &PageFrame, rect: Rect, border: f32) {
    if border <= 0.0 {
        return;
    }
    let inset = Rect::new(
        rect.x + border / 2.0,
        rect.y + border / 2.0,
        (rect.width - border).max(0.0),
        (rect.height - border).max(0.0),
    );
    stamp.operations.push(op("w", vec![real(frame.length(border))]));
    stamp.operations.push(op("re", rect_operands(frame, inset)));
    stamp.operations.push(op("S", vec![]));
}

fn cross(stamp: &mut PageStamp, frame: &PageFrame, rect: Rect, border: f32) {
    let inset = border + rect.width.min(rect.height) * 0.2;
    let (left, right) = (frame.x(rect.x + inset), frame.x(rect.right() - inset));
    let (top, bottom) = (frame.y(rect.y + inset), frame.y(rect.bottom() - inset));
    stamp.operations.extend([
        op("m", vec![real(left), real(top)]),
        op("l", vec![real(right), real(bottom)]),
        op("m", vec![real(left), real(bottom)]),
        op("l", vec![real(right), real(top)]),
        op("S", vec![]),
    ]);
}

fn show_text(stamp: &mut PageStamp, x: f32, baseline: f32, size: f32, text: &str) {
    stamp.operations.extend([
        op("BT", vec![]),
        op(
            "Tf",
            vec![Object::Name(FONT_RESOURCE.as_bytes().to_vec()), real(size)],
        ),
        op("Td", vec![real(x), real(baseline)]),
        op(
            "Tj",
            vec![Object::String(encode_text(text), StringFormat::Literal)],
        ),
        op("ET", vec![]),
    ]);
}

/// Baseline that vertically centers cap-height text in `rect`, in layout space.
fn centered_baseline(rect: Rect, font_size: f32) -> f32 {
    rect.y + (rect.height + font_size * CAP_HEIGHT_EM) / 2.0
}

fn text_line(stamp: &mut PageStamp, frame: &PageFrame, rect: Rect, text: &str, font_size: f32) {
    let baseline = frame.y(centered_baseline(rect, font_size));
    show_text(
        stamp,
        frame.x(rect.x),
        baseline,
        frame.length(font_size),
        text,
    );
}

fn clipped_text(stamp: &mut PageStamp, frame: &PageFrame, rect: Rect, text: &str, font_size: f32) {
    if text.is_empty() {
        return;
    }
    stamp.operations.push(op("q", vec![]));
    stamp.operations.push(op("re", rect_operands(frame, rect)));
    stamp.operations.push(op("W", vec![]));
    stamp.operations.push(op("n", vec![]));
    text_line(stamp, frame, rect, text, font_size);
    stamp.operations.push(op("Q", vec![]));
}

fn centered_glyph(stamp: &mut PageStamp, frame: &PageFrame, rect: Rect, glyph: char, size: f32) {
    let advance = size * AVERAGE_ADVANCE_EM;
    let x = rect.x + (rect.width - advance) / 2.0;
    let baseline = centered_baseline(rect, size);
    show_text(
        stamp,
        frame.x(x),
        frame.y(baseline),
        frame.length(size),
        &glyph.to_string(),
    );
}

fn placeholder_box(
    stamp: &mut PageStamp,
    frame: &PageFrame,
    rect: Rect,
    placeholder: &str,
    font_size: f32,
) {
    stamp.operations.push(op("q", vec![]));
    stamp.operations.push(op(
        "d",
        vec![Object::Array(vec![real(3.0), real(2.0)]), real(0.0)],
    ));
    bordered_box(stamp, frame, rect, 1.0);
    stamp.operations.push(op("Q", vec![]));
    let inner = Rect::new(
        rect.x + TEXT_INSET,
        rect.y,
        (rect.width - 2.0 * TEXT_INSET).max(0.0),
        rect.height,
    );
    clipped_text(stamp, frame, inner, placeholder, font_size);
}

/// Scale the image to fit inside `rect`, centered, keeping its aspect ratio.
fn place_image(
    stamp: &mut PageStamp,
    frame: &PageFrame,
    rect: Rect,
    name: &str,
    pixel_width: u32,
    pixel_height: u32,
) {
    let (iw, ih) = (pixel_width.max(1) as f32, pixel_height.max(1) as f32);
    let fit = (rect.width / iw).min(rect.height / ih);
    let (width, height) = (iw * fit, ih * fit);
    let placed = Rect::new(
        rect.x + (rect.width - width) / 2.0,
        rect.y + (rect.height - height) / 2.0,
        width,
        height,
    );
    let [x, y, w, h] = frame.rect(placed);
    stamp.operations.extend([
        op("q", vec![]),
        op(
            "cm",
            vec![real(w), real(0.0), real(0.0), real(h), real(x), real(y)],
        ),
        op("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        op("Q", vec![]),
    ]);
}

fn embed_image(
    stamp: &mut PageStamp,
    frame: &PageFrame,
    rect: Rect,
    image: &ResolvedImage,
) -> Result<(), String> {
    let (stream, width, height) = image_xobject(image)?;
    let name = format!("BFImg{}", stamp.images.len() + 1);
    place_image(stamp, frame, rect, &name, width, height);
    stamp.images.push((name, stream));
    Ok(())
}

/// Decode the image and wrap it as a Flate-compressed DeviceRGB XObject.
fn image_xobject(image: &ResolvedImage) -> Result<(Stream, u32, u32), String> {
    let decoded = image::load_from_memory(&image.bytes).map_err(|err| err.to_string())?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .map_err(|err| err.to_string())?;
    let compressed = encoder.finish().map_err(|err| err.to_string())?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(i64::from(width)),
        "Height" => Object::Integer(i64::from(height)),
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => Object::Integer(8),
        "Filter" => "FlateDecode",
    };
    Ok((Stream::new(dict, compressed), width, height))
}
