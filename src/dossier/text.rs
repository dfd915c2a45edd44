//! Stack count rendering with a built-in 5×7 pixel digit font

use image::{Rgba, RgbaImage};

use crate::dossier::layout::CANVAS_ICON_SIZE;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

/// Output pixels per font pixel
const GLYPH_SCALE: u32 = 3;

/// Horizontal advance between glyphs, in font pixels
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

const RIGHT_MARGIN: i64 = 4;
const BOTTOM_MARGIN: i64 = 2;

const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 180]);
const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Rows of each digit, most significant bit on the left
const DIGITS: [[u8; GLYPH_HEIGHT as usize]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
    [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
    [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
    [0b00011, 0b00101, 0b01001, 0b10001, 0b11111, 0b00001, 0b00001],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b10001, 0b00001, 0b00010, 0b00100, 0b00100, 0b00100],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
];

/// Width of `text` in output pixels
fn text_width(text: &str) -> u32 {
    let glyphs = text.chars().filter(char::is_ascii_digit).count() as u32;
    if glyphs == 0 {
        return 0;
    }
    (glyphs * GLYPH_ADVANCE - 1) * GLYPH_SCALE
}

/// Draw the stack count of the slot whose top-left corner is at
/// `(slot_x, slot_y)`. Counts of one or less are not drawn.
///
/// Returns whether anything was drawn.
pub fn draw_count(canvas: &mut RgbaImage, count: u32, slot_x: i64, slot_y: i64) -> bool {
    if count <= 1 {
        return false;
    }

    let text = count.to_string();
    let slot = i64::from(CANVAS_ICON_SIZE);
    let x = slot_x + slot - i64::from(text_width(&text)) - RIGHT_MARGIN;
    let y = slot_y + slot - i64::from(GLYPH_HEIGHT * GLYPH_SCALE) - BOTTOM_MARGIN;

    let offset = i64::from(GLYPH_SCALE);
    draw_text(canvas, &text, x + offset, y + offset, SHADOW);
    draw_text(canvas, &text, x, y, FOREGROUND);
    true
}

fn draw_text(canvas: &mut RgbaImage, text: &str, x: i64, y: i64, color: Rgba<u8>) {
    let advance = i64::from(GLYPH_ADVANCE * GLYPH_SCALE);
    let digits = text.chars().filter_map(|c| c.to_digit(10));

    for (i, digit) in digits.enumerate() {
        draw_glyph(canvas, &DIGITS[digit as usize], x + i as i64 * advance, y, color);
    }
}

fn draw_glyph(
    canvas: &mut RgbaImage,
    rows: &[u8; GLYPH_HEIGHT as usize],
    x: i64,
    y: i64,
    color: Rgba<u8>,
) {
    let scale = i64::from(GLYPH_SCALE);
    for (row, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            fill_cell(
                canvas,
                x + i64::from(col) * scale,
                y + row as i64 * scale,
                color,
            );
        }
    }
}

/// Blend one font pixel onto the canvas, clipped to its bounds
fn fill_cell(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let scale = i64::from(GLYPH_SCALE);
    for py in y..y + scale {
        for px in x..x + scale {
            if px < 0 || py < 0 || px >= i64::from(canvas.width()) || py >= i64::from(canvas.height())
            {
                continue;
            }
            blend_over(canvas.get_pixel_mut(px as u32, py as u32), color);
        }
    }
}

/// Source-over compositing; an opaque destination stays opaque
fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let src_a = f32::from(src.0[3]) / 255.0;
    let dst_a = f32::from(dst.0[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    let mut out = [0u8; 4];
    for (channel, value) in out.iter_mut().take(3).enumerate() {
        let src_c = f32::from(src.0[channel]);
        let dst_c = f32::from(dst.0[channel]);
        let mixed = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
        *value = mixed.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Rgba(out);
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: Rgba<u8> = Rgba([60, 60, 60, 255]);

    fn slot_canvas() -> RgbaImage {
        RgbaImage::from_pixel(64, 64, GRAY)
    }

    #[test]
    fn count_of_one_draws_nothing() {
        let mut canvas = slot_canvas();

        assert!(!draw_count(&mut canvas, 1, 0, 0));
        assert!(canvas.pixels().all(|p| *p == GRAY));
    }

    #[test]
    fn count_of_two_draws_shadow_and_foreground() {
        let mut canvas = slot_canvas();

        assert!(draw_count(&mut canvas, 2, 0, 0));

        // Black at alpha 180 over gray 60 leaves 60 * 75 / 255
        let shadow = Rgba([18, 18, 18, 255]);
        assert!(canvas.pixels().any(|p| *p == FOREGROUND));
        assert!(canvas.pixels().any(|p| *p == shadow));
        assert!(canvas.pixels().all(|p| p.0[3] == 255));
    }

    #[test]
    fn blend_over_transparent_pixel_takes_source() {
        let mut pixel = Rgba([0, 0, 0, 0]);

        blend_over(&mut pixel, SHADOW);

        assert_eq!(pixel, SHADOW);
    }

    #[test]
    fn count_is_right_aligned_in_bottom_right_corner() {
        let mut canvas = slot_canvas();

        draw_count(&mut canvas, 64, 0, 0);

        let lit: Vec<(u32, u32)> = canvas
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == FOREGROUND)
            .map(|(x, y, _)| (x, y))
            .collect();
        let right = lit.iter().map(|(x, _)| *x).max().unwrap();
        let left = lit.iter().map(|(x, _)| *x).min().unwrap();
        let bottom = lit.iter().map(|(_, y)| *y).max().unwrap();

        // Two glyphs: 11 font pixels wide, 7 tall
        assert_eq!(right, 64 - 4 - 1);
        assert_eq!(left, 64 - 4 - 33);
        assert_eq!(bottom, 64 - 2 - 1);
    }

    #[test]
    fn text_width_counts_glyph_spacing() {
        assert_eq!(text_width("2"), 15);
        assert_eq!(text_width("64"), 33);
        assert_eq!(text_width(""), 0);
    }
}
