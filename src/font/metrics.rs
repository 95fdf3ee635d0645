//! Built-in Helvetica metrics.
//!
//! Widths are the Adobe AFM advance widths in 1/1000 em for printable ASCII
//! (0x20..=0x7E). They are the fallback whenever a kit names a family that
//! has not been registered, so layout still works on a bare server.

/// Advance widths for Helvetica, indexed by `byte - 0x20`.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Advance widths for Helvetica-Bold, indexed by `byte - 0x20`.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Metrics for one of the built-in faces.
#[derive(Debug, Clone, Copy)]
pub struct StandardFontMetrics {
    widths: &'static [u16; 95],
    /// Width for characters outside the table.
    default_width: u16,
    /// Ascender in 1/1000 em.
    pub ascender: i16,
    /// Descender in 1/1000 em (negative).
    pub descender: i16,
    /// Cap height in 1/1000 em.
    pub cap_height: i16,
}

pub(crate) const HELVETICA: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_WIDTHS,
    default_width: 556,
    ascender: 718,
    descender: -207,
    cap_height: 718,
};

pub(crate) const HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    widths: &HELVETICA_BOLD_WIDTHS,
    default_width: 611,
    ascender: 718,
    descender: -207,
    cap_height: 718,
};

impl StandardFontMetrics {
    /// Advance width of a character in 1/1000 em.
    pub fn char_units(&self, ch: char) -> u16 {
        match ch {
            ' '..='~' => self.widths[ch as usize - 0x20],
            '\u{2022}' => 350,
            '\u{00a0}' => self.widths[0],
            '\u{2013}' => 556,
            '\u{2014}' => 1000,
            '\u{2018}' | '\u{2019}' => 222,
            '\u{201c}' | '\u{201d}' => 333,
            '\u{2026}' => 1000,
            _ => self.default_width,
        }
    }

    /// Get the advance width of a character at `font_size`.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        self.char_units(ch) as f64 / 1000.0 * font_size
    }

    /// Measure a string at `font_size`.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_width() {
        assert!((HELVETICA.char_width(' ', 12.0) - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_table_alignment() {
        assert_eq!(HELVETICA.char_units('A'), 667);
        assert_eq!(HELVETICA.char_units('i'), 222);
        assert_eq!(HELVETICA.char_units('~'), 584);
        assert_eq!(HELVETICA_BOLD.char_units('A'), 722);
        assert_eq!(HELVETICA_BOLD.char_units('m'), 889);
        assert_eq!(HELVETICA_BOLD.char_units('~'), 584);
    }

    #[test]
    fn test_unknown_char_uses_default() {
        assert_eq!(HELVETICA.char_units('\u{4e2d}'), 556);
    }
}
