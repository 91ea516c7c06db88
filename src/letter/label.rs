use crate::types::{DrawOp, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Free text placed on the grid, optionally word-wrapped and framed.
#[derive(Debug, Clone, Default)]
pub struct Label {
    pub text: String,
    pub x: u16,
    pub y: u16,
    /// Wrap width; 0 disables wrapping.
    pub width: usize,
    /// Row limit; 0 means as many rows as the text needs.
    pub height: usize,
    pub align: Align,
    /// Draw a single-cell box one cell outside the text area.
    pub framed: bool,
    /// Border style; falls back to `style`.
    pub frame_style: Option<Style>,
    pub style: Style,
    pub z_order: i32,
}

fn draw_frame(ops: &mut Vec<DrawOp>, fx: u16, fy: u16, fw: usize, fh: usize, style: &Style, z_order: i32) {
    if fw < 2 || fh < 2 {
        return;
    }
    let fw = fw as u16;
    let fh = fh as u16;
    let z = z_order;

    ops.push(DrawOp { x: fx,          y: fy,          ch: '╭', style: style.clone(), z_order: z });
    ops.push(DrawOp { x: fx + fw - 1, y: fy,          ch: '╮', style: style.clone(), z_order: z });
    ops.push(DrawOp { x: fx,          y: fy + fh - 1, ch: '╰', style: style.clone(), z_order: z });
    ops.push(DrawOp { x: fx + fw - 1, y: fy + fh - 1, ch: '╯', style: style.clone(), z_order: z });
    for i in 1..fw - 1 {
        ops.push(DrawOp { x: fx + i, y: fy,          ch: '─', style: style.clone(), z_order: z });
        ops.push(DrawOp { x: fx + i, y: fy + fh - 1, ch: '─', style: style.clone(), z_order: z });
    }
    for j in 1..fh - 1 {
        ops.push(DrawOp { x: fx,          y: fy + j, ch: '│', style: style.clone(), z_order: z });
        ops.push(DrawOp { x: fx + fw - 1, y: fy + j, ch: '│', style: style.clone(), z_order: z });
    }
}

/// Wrap a single logical line to `w` columns, breaking at spaces.
///
/// The space at a break point is consumed so no row starts with a stray
/// space. A word longer than `w` is hard-broken. Rows are not padded.
pub fn wrap_text_line(line: &str, w: usize) -> Vec<Vec<char>> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() || w == 0 {
        return vec![chars];
    }
    let mut rows: Vec<Vec<char>> = Vec::new();
    let mut pos = 0usize;

    while pos < chars.len() {
        let remaining = &chars[pos..];
        if remaining.len() <= w {
            rows.push(remaining.to_vec());
            break;
        }

        let chunk = &remaining[..w];
        let (row_len, advance) = if remaining[w] == ' ' {
            (w, w + 1)
        } else {
            match chunk.iter().rposition(|&c| c == ' ') {
                Some(sp) if sp > 0 => (sp, sp + 1),
                _ => (w, w),
            }
        };
        rows.push(remaining[..row_len].to_vec());
        pos += advance;

        while pos < chars.len() && chars[pos] == ' ' {
            pos += 1;
        }
    }
    rows
}

/// Visual rows of `text` once wrapped to `w` (every `\n` starts a new row).
pub fn wrap_text(text: &str, w: usize) -> Vec<Vec<char>> {
    text.split('\n').flat_map(|line| wrap_text_line(line, w)).collect()
}

impl Label {
    pub fn new(text: impl Into<String>, x: u16, y: u16) -> Self {
        Label {
            text: text.into(),
            x,
            y,
            ..Default::default()
        }
    }

    pub fn wrap(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn framed(mut self, frame_style: Style) -> Self {
        self.framed = true;
        self.frame_style = Some(frame_style);
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn z(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn resolve(&self, ops: &mut Vec<DrawOp>) {
        let mut rows = wrap_text(&self.text, self.width);
        if self.height > 0 {
            rows.truncate(self.height);
            rows.resize(self.height, Vec::new());
        }

        let box_w = if self.width > 0 {
            self.width
        } else {
            rows.iter().map(Vec::len).max().unwrap_or(0)
        };
        let fill = self.style.bg.is_some() && self.width > 0;

        for (r, row_chars) in rows.iter().enumerate() {
            let offset = match self.align {
                Align::Left => 0,
                Align::Center => box_w.saturating_sub(row_chars.len()) / 2,
            };
            let emit_w = if fill { box_w } else { offset + row_chars.len() };
            for col in 0..emit_w {
                let ch = col
                    .checked_sub(offset)
                    .and_then(|i| row_chars.get(i))
                    .copied();
                let ch = match ch {
                    Some(ch) => ch,
                    None if fill => ' ',
                    None => continue,
                };
                ops.push(DrawOp {
                    x: self.x + col as u16,
                    y: self.y + r as u16,
                    ch,
                    style: self.style.clone(),
                    z_order: self.z_order,
                });
            }
        }

        if self.framed {
            let border_style = self.frame_style.as_ref().unwrap_or(&self.style);
            draw_frame(
                ops,
                self.x.saturating_sub(1),
                self.y.saturating_sub(1),
                box_w + 2,
                rows.len() + 2,
                border_style,
                self.z_order,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn rows(line: &str, w: usize) -> Vec<String> {
        wrap_text_line(line, w)
            .into_iter()
            .map(|r| r.into_iter().collect())
            .collect()
    }

    #[test]
    fn wraps_at_spaces() {
        assert_eq!(rows("la luna y el mar", 7), vec!["la luna", "y el", "mar"]);
    }

    #[test]
    fn hard_breaks_long_words() {
        assert_eq!(rows("inquebrantable", 5), vec!["inque", "brant", "able"]);
    }

    #[test]
    fn newlines_start_rows() {
        assert_eq!(wrap_text("a\n\nb", 10).len(), 3);
    }

    #[test]
    fn centered_rows_are_offset() {
        let mut ops = Vec::new();
        Label::new("ab", 10, 0).wrap(6).centered().resolve(&mut ops);
        let xs: Vec<u16> = ops.iter().map(|o| o.x).collect();
        assert_eq!(xs, vec![12, 13]);
    }

    #[test]
    fn background_fills_the_box() {
        let mut ops = Vec::new();
        Label::new("", 0, 0)
            .wrap(4)
            .height(2)
            .style(Style {
                bg: Some(Color::rgb(1, 1, 1)),
                ..Default::default()
            })
            .resolve(&mut ops);
        assert_eq!(ops.len(), 8);
    }

    #[test]
    fn frame_surrounds_text() {
        let mut ops = Vec::new();
        Label::new("hola", 1, 1).framed(Style::default()).resolve(&mut ops);
        assert!(ops.iter().any(|o| (o.x, o.y, o.ch) == (0, 0, '╭')));
        assert!(ops.iter().any(|o| (o.x, o.y, o.ch) == (5, 2, '╯')));
    }
}
