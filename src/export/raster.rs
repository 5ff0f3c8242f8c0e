use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};

use crate::session::{Message, Role};

/// Capture resolution multiplier.
pub const OVERSAMPLE: u32 = 2;

// Layout in logical pixels; everything is multiplied by OVERSAMPLE at draw
// time.
const CANVAS_WIDTH: u32 = 640;
const MARGIN: u32 = 24;
const BUBBLE_PADDING: u32 = 12;
const BUBBLE_GAP: u32 = 16;
const BUBBLE_MAX_WIDTH: u32 = (CANVAS_WIDTH - 2 * MARGIN) * 4 / 5;
const GLYPH_SIZE: u32 = 8;
const LINE_HEIGHT: u32 = 12;
const WRAP_COLUMNS: usize = ((BUBBLE_MAX_WIDTH - 2 * BUBBLE_PADDING) / GLYPH_SIZE) as usize;

const BACKGROUND: Rgb<u8> = Rgb([249, 250, 251]);
const USER_BUBBLE: Rgb<u8> = Rgb([37, 99, 235]);
const USER_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const ASSISTANT_BUBBLE: Rgb<u8> = Rgb([255, 255, 255]);
const ASSISTANT_BORDER: Rgb<u8> = Rgb([229, 231, 235]);
const ASSISTANT_TEXT: Rgb<u8> = Rgb([17, 24, 39]);

/// Capture seam for the exporter: turns the transcript into a bitmap.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, messages: &[Message]) -> RgbImage;
}

/// Draws the transcript the way the chat screen lays it out: user messages
/// right-aligned in filled bubbles, assistant messages left-aligned in
/// bordered ones, oversampled for print sharpness. The 8×8 font's basic and
/// Latin-1 blocks cover the product's Portuguese text.
#[derive(Default)]
pub struct BubbleRasterizer;

struct Block {
    role: Role,
    lines: Vec<String>,
}

impl Rasterizer for BubbleRasterizer {
    fn rasterize(&self, messages: &[Message]) -> RgbImage {
        let blocks: Vec<Block> = messages
            .iter()
            .map(|message| Block {
                role: message.role,
                lines: wrap_content(&message.content),
            })
            .collect();

        let total_height = blocks.iter().map(block_height).sum::<u32>()
            + BUBBLE_GAP * blocks.len().saturating_sub(1) as u32
            + 2 * MARGIN;

        let mut image = RgbImage::from_pixel(
            CANVAS_WIDTH * OVERSAMPLE,
            total_height.max(1) * OVERSAMPLE,
            BACKGROUND,
        );

        let mut y = MARGIN;
        for block in &blocks {
            draw_block(&mut image, block, y);
            y += block_height(block) + BUBBLE_GAP;
        }
        image
    }
}

fn block_height(block: &Block) -> u32 {
    block.lines.len() as u32 * LINE_HEIGHT + 2 * BUBBLE_PADDING
}

fn draw_block(image: &mut RgbImage, block: &Block, top: u32) {
    let widest = block
        .lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0) as u32;
    let width = widest * GLYPH_SIZE + 2 * BUBBLE_PADDING;
    let height = block_height(block);
    let left = match block.role {
        Role::User => CANVAS_WIDTH - MARGIN - width,
        Role::Assistant => MARGIN,
    };

    let (fill, text) = match block.role {
        Role::User => (USER_BUBBLE, USER_TEXT),
        Role::Assistant => (ASSISTANT_BUBBLE, ASSISTANT_TEXT),
    };

    fill_rect(image, left, top, width, height, fill);
    if block.role == Role::Assistant {
        stroke_rect(image, left, top, width, height, ASSISTANT_BORDER);
    }

    for (row, line) in block.lines.iter().enumerate() {
        let line_top = top + BUBBLE_PADDING + row as u32 * LINE_HEIGHT;
        draw_line(image, line, left + BUBBLE_PADDING, line_top, text);
    }
}

fn draw_line(image: &mut RgbImage, text: &str, x: u32, y: u32, color: Rgb<u8>) {
    for (column, ch) in text.chars().enumerate() {
        draw_glyph(image, ch, x + column as u32 * GLYPH_SIZE, y, color);
    }
}

fn draw_glyph(image: &mut RgbImage, ch: char, x: u32, y: u32, color: Rgb<u8>) {
    // Bullet markers from formatted replies sit outside the basic and Latin-1
    // blocks; draw them as the Latin-1 middle dot instead of falling to '?'.
    let ch = match ch {
        '•' | '‣' | '∙' | '◦' => '·',
        _ => ch,
    };
    let glyph = BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8]);
    for (row, &bits) in glyph.iter().enumerate() {
        for col in 0..GLYPH_SIZE {
            if (bits >> col) & 1 != 0 {
                fill_rect(image, x + col, y + row as u32, 1, 1, color);
            }
        }
    }
}

fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y * OVERSAMPLE..(y + height) * OVERSAMPLE {
        for px in x * OVERSAMPLE..(x + width) * OVERSAMPLE {
            if px < image.width() && py < image.height() {
                image.put_pixel(px, py, color);
            }
        }
    }
}

fn stroke_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    fill_rect(image, x, y, width, 1, color);
    fill_rect(image, x, y + height - 1, width, 1, color);
    fill_rect(image, x, y, 1, height, color);
    fill_rect(image, x + width - 1, y, 1, height, color);
}

/// Splits message content into displayable lines: hard breaks on newlines,
/// word wrap at the bubble's column budget, oversized words chunked.
fn wrap_content(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in content.split('\n') {
        let mut current = String::new();
        let mut columns = 0usize;
        for word in paragraph.split_whitespace() {
            for piece in split_oversized(word) {
                let length = piece.chars().count();
                if columns > 0 && columns + 1 + length > WRAP_COLUMNS {
                    lines.push(std::mem::take(&mut current));
                    columns = 0;
                }
                if columns > 0 {
                    current.push(' ');
                    columns += 1;
                }
                current.push_str(&piece);
                columns += length;
            }
        }
        lines.push(current);
    }
    lines
}

fn split_oversized(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(WRAP_COLUMNS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
