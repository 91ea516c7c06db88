//! Bitmap font for the large intro lettering.
//!
//! Each glyph is 5 rows tall with variable width; all rows of one glyph have
//! the same length. A non-space character marks a filled cell.

pub const GLYPH_HEIGHT: u16 = 5;

/// Return the bitmap for `ch`, or `None` if the font lacks it. Callers fold
/// letters to upper case first.
pub fn glyph(ch: char) -> Option<[&'static str; 5]> {
    let g = match ch {
        'A' => [" ### ", "#   #", "#####", "#   #", "#   #"],
        'B' => ["#### ", "#   #", "#### ", "#   #", "#### "],
        'C' => [" ### ", "#   #", "#    ", "#   #", " ### "],
        'D' => ["#### ", "#   #", "#   #", "#   #", "#### "],
        'E' => ["#####", "#    ", "###  ", "#    ", "#####"],
        'F' => ["#####", "#    ", "###  ", "#    ", "#    "],
        'G' => [" ### ", "#    ", "#  ##", "#   #", " ### "],
        'H' => ["#   #", "#   #", "#####", "#   #", "#   #"],
        'I' => ["###", " # ", " # ", " # ", "###"],
        'J' => ["  ###", "   # ", "   # ", "#  # ", " ##  "],
        'K' => ["#   #", "#  # ", "###  ", "#  # ", "#   #"],
        'L' => ["#    ", "#    ", "#    ", "#    ", "#####"],
        'M' => ["#   #", "## ##", "# # #", "#   #", "#   #"],
        'N' => ["#   #", "##  #", "# # #", "#  ##", "#   #"],
        'O' => [" ### ", "#   #", "#   #", "#   #", " ### "],
        'P' => ["#### ", "#   #", "#### ", "#    ", "#    "],
        'Q' => [" ### ", "#   #", "# # #", "#  # ", " ## #"],
        'R' => ["#### ", "#   #", "#### ", "#  # ", "#   #"],
        'S' => [" ####", "#    ", " ### ", "    #", "#### "],
        'T' => ["#####", "  #  ", "  #  ", "  #  ", "  #  "],
        'U' => ["#   #", "#   #", "#   #", "#   #", " ### "],
        'V' => ["#   #", "#   #", "#   #", " # # ", "  #  "],
        'W' => ["#   #", "#   #", "# # #", "## ##", "#   #"],
        'X' => ["#   #", " # # ", "  #  ", " # # ", "#   #"],
        'Y' => ["#   #", " # # ", "  #  ", "  #  ", "  #  "],
        'Z' => ["#####", "   # ", "  #  ", " #   ", "#####"],

        'Í' => ["  #", "###", " # ", " # ", "###"],
        '♥' => [" ## ## ", "#######", " ##### ", "  ###  ", "   #   "],
        ' ' => ["   ", "   ", "   ", "   ", "   "],
        '!' => ["#", "#", "#", " ", "#"],
        '.' => [" ", " ", " ", " ", "#"],

        _ => return None,
    };
    debug_assert!(
        g.iter().all(|row| row.len() == g[0].len()),
        "glyph '{ch}' has inconsistent row widths",
    );
    Some(g)
}

/// Fold a character onto the font's case.
pub fn fold(ch: char) -> char {
    match ch {
        'í' => 'Í',
        c => c.to_ascii_uppercase(),
    }
}

/// Rendered width of `text` in columns, including the 1-column gap between glyphs.
pub fn text_width(text: &str) -> u16 {
    let mut width: u16 = 0;
    let mut first = true;
    for ch in text.chars() {
        if let Some(g) = glyph(fold(ch)) {
            if !first {
                width += 1;
            }
            width += g[0].chars().count() as u16;
            first = false;
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_counts_gaps_between_glyphs() {
        // P(5) + gap + A(5)
        assert_eq!(text_width("pa"), 11);
        assert_eq!(text_width("♥"), 7);
        assert_eq!(text_width("~"), 0);
    }

    #[test]
    fn accented_i_is_folded() {
        assert_eq!(fold('í'), 'Í');
        assert!(glyph(fold('í')).is_some());
    }
}
