//! Software drawing of HUD panels: a 3x5 bitmap font, rectangles and the
//! screen fade, all alpha-blended into an RGBA frame.

use crate::app::{HudAnchor, HudPanel, HudTone};

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
pub(crate) const TEXT_SCALE: i32 = 2;
pub(crate) const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub(crate) const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 3) * TEXT_SCALE;
const PANEL_PADDING: i32 = 8;
const SCREEN_MARGIN: i32 = 16;
const PANEL_GAP: i32 = 6;

const PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 210];
const PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

fn tone_color(tone: HudTone) -> [u8; 4] {
    match tone {
        HudTone::Primary => [244, 248, 252, 255],
        HudTone::Dim => [176, 198, 220, 255],
        HudTone::Warning => [255, 112, 92, 255],
        HudTone::Accent => [255, 214, 92, 255],
    }
}

/// Packs five 3-bit rows, top row in the high bits.
const fn pack(rows: [u16; 5]) -> u16 {
    (rows[0] << 12) | (rows[1] << 9) | (rows[2] << 6) | (rows[3] << 3) | rows[4]
}

const UNKNOWN_GLYPH: u16 = pack([0b110, 0b001, 0b010, 0b000, 0b010]);

fn glyph_bits(ch: char) -> u16 {
    match ch.to_ascii_uppercase() {
        ' ' => 0,
        'A' => pack([0b010, 0b101, 0b111, 0b101, 0b101]),
        'B' => pack([0b110, 0b101, 0b110, 0b101, 0b110]),
        'C' => pack([0b011, 0b100, 0b100, 0b100, 0b011]),
        'D' => pack([0b110, 0b101, 0b101, 0b101, 0b110]),
        'E' => pack([0b111, 0b100, 0b110, 0b100, 0b111]),
        'F' => pack([0b111, 0b100, 0b110, 0b100, 0b100]),
        'G' => pack([0b011, 0b100, 0b101, 0b101, 0b011]),
        'H' => pack([0b101, 0b101, 0b111, 0b101, 0b101]),
        'I' => pack([0b111, 0b010, 0b010, 0b010, 0b111]),
        'J' => pack([0b001, 0b001, 0b001, 0b101, 0b010]),
        'K' => pack([0b101, 0b101, 0b110, 0b101, 0b101]),
        'L' => pack([0b100, 0b100, 0b100, 0b100, 0b111]),
        'M' => pack([0b101, 0b111, 0b111, 0b101, 0b101]),
        'N' => pack([0b110, 0b101, 0b101, 0b101, 0b101]),
        'O' => pack([0b010, 0b101, 0b101, 0b101, 0b010]),
        'P' => pack([0b110, 0b101, 0b110, 0b100, 0b100]),
        'Q' => pack([0b010, 0b101, 0b101, 0b110, 0b011]),
        'R' => pack([0b110, 0b101, 0b110, 0b101, 0b101]),
        'S' => pack([0b011, 0b100, 0b010, 0b001, 0b110]),
        'T' => pack([0b111, 0b010, 0b010, 0b010, 0b010]),
        'U' => pack([0b101, 0b101, 0b101, 0b101, 0b111]),
        'V' => pack([0b101, 0b101, 0b101, 0b101, 0b010]),
        'W' => pack([0b101, 0b101, 0b111, 0b111, 0b101]),
        'X' => pack([0b101, 0b101, 0b010, 0b101, 0b101]),
        'Y' => pack([0b101, 0b101, 0b010, 0b010, 0b010]),
        'Z' => pack([0b111, 0b001, 0b010, 0b100, 0b111]),
        '0' => pack([0b111, 0b101, 0b101, 0b101, 0b111]),
        '1' => pack([0b010, 0b110, 0b010, 0b010, 0b111]),
        '2' => pack([0b110, 0b001, 0b010, 0b100, 0b111]),
        '3' => pack([0b110, 0b001, 0b010, 0b001, 0b110]),
        '4' => pack([0b101, 0b101, 0b111, 0b001, 0b001]),
        '5' => pack([0b111, 0b100, 0b110, 0b001, 0b110]),
        '6' => pack([0b011, 0b100, 0b111, 0b101, 0b111]),
        '7' => pack([0b111, 0b001, 0b010, 0b010, 0b010]),
        '8' => pack([0b111, 0b101, 0b111, 0b101, 0b111]),
        '9' => pack([0b111, 0b101, 0b111, 0b001, 0b110]),
        ':' => pack([0b000, 0b010, 0b000, 0b010, 0b000]),
        '.' => pack([0b000, 0b000, 0b000, 0b000, 0b010]),
        ',' => pack([0b000, 0b000, 0b000, 0b010, 0b100]),
        '!' => pack([0b010, 0b010, 0b010, 0b000, 0b010]),
        '?' => UNKNOWN_GLYPH,
        '-' => pack([0b000, 0b000, 0b111, 0b000, 0b000]),
        '+' => pack([0b000, 0b010, 0b111, 0b010, 0b000]),
        '=' => pack([0b000, 0b111, 0b000, 0b111, 0b000]),
        '_' => pack([0b000, 0b000, 0b000, 0b000, 0b111]),
        '/' => pack([0b001, 0b001, 0b010, 0b100, 0b100]),
        '\'' => pack([0b010, 0b010, 0b000, 0b000, 0b000]),
        '"' => pack([0b101, 0b101, 0b000, 0b000, 0b000]),
        '(' => pack([0b001, 0b010, 0b010, 0b010, 0b001]),
        ')' => pack([0b100, 0b010, 0b010, 0b010, 0b100]),
        '[' => pack([0b011, 0b010, 0b010, 0b010, 0b011]),
        ']' => pack([0b110, 0b010, 0b010, 0b010, 0b110]),
        '<' => pack([0b001, 0b010, 0b100, 0b010, 0b001]),
        '>' => pack([0b100, 0b010, 0b001, 0b010, 0b100]),
        '%' => pack([0b101, 0b001, 0b010, 0b100, 0b101]),
        '#' => pack([0b101, 0b111, 0b101, 0b111, 0b101]),
        '*' => pack([0b101, 0b010, 0b101, 0b000, 0b000]),
        '|' => pack([0b010, 0b010, 0b010, 0b010, 0b010]),
        _ => UNKNOWN_GLYPH,
    }
}

fn glyph_pixel_set(bits: u16, col: i32, row: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
    (bits >> shift) & 1 == 1
}

pub(crate) fn text_width_px(char_count: usize) -> i32 {
    char_count as i32 * GLYPH_ADVANCE
}

pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4], opacity: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let Some(offset) = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
            .and_then(|pixel| pixel.checked_mul(4))
        else {
            return;
        };
        let Some(pixel) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        let alpha = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        for channel in 0..3 {
            let blended = color[channel] as f32 * alpha + pixel[channel] as f32 * (1.0 - alpha);
            pixel[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        pixel[3] = 255;
    }

    pub(crate) fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: [u8; 4],
        opacity: f32,
    ) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = (x + rect_width).min(self.width as i32);
        let end_y = (y + rect_height).min(self.height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color, opacity);
            }
        }
    }

    pub(crate) fn rect_outline(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: [u8; 4],
        opacity: f32,
    ) {
        if rect_width <= 1 || rect_height <= 1 {
            return;
        }
        self.fill_rect(x, y, rect_width, 1, color, opacity);
        self.fill_rect(x, y + rect_height - 1, rect_width, 1, color, opacity);
        self.fill_rect(x, y, 1, rect_height, color, opacity);
        self.fill_rect(x + rect_width - 1, y, 1, rect_height, color, opacity);
    }

    pub(crate) fn draw_text(&mut self, mut x: i32, y: i32, text: &str, color: [u8; 4], opacity: f32) {
        for ch in text.chars() {
            let bits = glyph_bits(ch);
            if bits != 0 {
                self.draw_glyph(x, y, bits, color, opacity);
            }
            x += GLYPH_ADVANCE;
        }
    }

    fn draw_glyph(&mut self, x: i32, y: i32, bits: u16, color: [u8; 4], opacity: f32) {
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if glyph_pixel_set(bits, col, row) {
                    self.fill_rect(
                        x + col * TEXT_SCALE,
                        y + row * TEXT_SCALE,
                        TEXT_SCALE,
                        TEXT_SCALE,
                        color,
                        opacity,
                    );
                }
            }
        }
    }

    /// Darkens the whole frame toward black by `amount` in [0, 1].
    pub(crate) fn fade_to_black(&mut self, amount: f32) {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        if keep >= 1.0 {
            return;
        }
        for pixel in self.frame.chunks_exact_mut(4) {
            for channel in pixel.iter_mut().take(3) {
                *channel = (*channel as f32 * keep).round() as u8;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PanelRect {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

pub(crate) fn panel_size(panel: &HudPanel) -> (i32, i32) {
    let width = text_width_px(panel.longest_line_chars()) + PANEL_PADDING * 2;
    let height = panel.lines.len() as i32 * LINE_ADVANCE + PANEL_PADDING * 2 - TEXT_SCALE * 3;
    (width, height)
}

/// Places panels so that several sharing an anchor stack away from the
/// screen edge they are pinned to.
#[derive(Debug, Default)]
pub(crate) struct PanelLayout {
    top_left: i32,
    top_right: i32,
    top_center: i32,
    center: i32,
    bottom_center: i32,
}

impl PanelLayout {
    pub(crate) fn place(&mut self, panel: &HudPanel, screen: (u32, u32)) -> PanelRect {
        let (width, height) = panel_size(panel);
        let screen_w = screen.0 as i32;
        let screen_h = screen.1 as i32;
        let centered_x = (screen_w - width) / 2;
        let (x, y, cursor) = match panel.anchor {
            HudAnchor::TopLeft => (SCREEN_MARGIN, SCREEN_MARGIN + self.top_left, &mut self.top_left),
            HudAnchor::TopRight => (
                screen_w - width - SCREEN_MARGIN,
                SCREEN_MARGIN + self.top_right,
                &mut self.top_right,
            ),
            HudAnchor::TopCenter => (
                centered_x,
                SCREEN_MARGIN + self.top_center,
                &mut self.top_center,
            ),
            HudAnchor::Center => (
                centered_x,
                (screen_h - height) / 2 + self.center,
                &mut self.center,
            ),
            HudAnchor::BottomCenter => (
                centered_x,
                screen_h - height - SCREEN_MARGIN - self.bottom_center,
                &mut self.bottom_center,
            ),
        };
        *cursor += height + PANEL_GAP;
        PanelRect {
            x,
            y,
            width,
            height,
        }
    }
}

pub(crate) fn draw_hud_panel(canvas: &mut Canvas<'_>, panel: &HudPanel, rect: PanelRect) {
    let opacity = panel.opacity;
    canvas.fill_rect(rect.x, rect.y, rect.width, rect.height, PANEL_BG_COLOR, opacity);
    canvas.rect_outline(rect.x, rect.y, rect.width, rect.height, PANEL_BORDER_COLOR, opacity);
    let mut line_y = rect.y + PANEL_PADDING;
    for line in &panel.lines {
        canvas.draw_text(
            rect.x + PANEL_PADDING,
            line_y,
            &line.text,
            tone_color(line.tone),
            opacity,
        );
        line_y += LINE_ADVANCE;
    }
}
