use crate::types::{DrawOp, Style};

use super::font;

/// Large text drawn with the bitmap font.
#[derive(Debug, Clone)]
pub struct Header {
    pub text: String,
    pub x: u16,
    pub y: u16,
    pub style: Style,
    pub z_order: i32,
    /// Fill character for the glyph cells.
    pub ch: char,
}

impl Header {
    pub fn new(text: impl Into<String>, x: u16, y: u16, style: Style) -> Self {
        Header {
            text: text.into(),
            x,
            y,
            style,
            z_order: 0,
            ch: '█',
        }
    }

    pub fn width(&self) -> u16 {
        font::text_width(&self.text)
    }

    pub fn resolve(&self, ops: &mut Vec<DrawOp>) {
        let mut cursor_x = self.x;
        for ch in self.text.chars() {
            let Some(glyph) = font::glyph(font::fold(ch)) else {
                continue;
            };
            for (row, line) in glyph.iter().enumerate() {
                for (col, c) in line.chars().enumerate() {
                    if c != ' ' {
                        ops.push(DrawOp {
                            x: cursor_x + col as u16,
                            y: self.y + row as u16,
                            ch: self.ch,
                            style: self.style.clone(),
                            z_order: self.z_order,
                        });
                    }
                }
            }
            cursor_x += glyph[0].chars().count() as u16 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_filled_cells_only() {
        let mut ops = Vec::new();
        Header::new("I", 2, 3, Style::default()).resolve(&mut ops);
        // "###", " # ", " # ", " # ", "###"
        assert_eq!(ops.len(), 9);
        assert!(ops.iter().all(|o| o.ch == '█'));
        assert_eq!((ops[0].x, ops[0].y), (2, 3));
    }
}
