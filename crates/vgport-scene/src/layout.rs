//! Approximate text metrics for the headless canvas.
//!
//! There is no shaper here: every character advances by a fixed fraction of
//! the font size. That is enough to make wrapping and row placement
//! deterministic.

use vgport_script::TextRow;

/// Advance of one character, as a fraction of the font size.
pub const ADVANCE_RATIO: f32 = 0.6;

/// Row height, as a fraction of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub font_size: f32,
}

impl TextMetrics {
    pub fn advance(&self) -> f32 {
        self.font_size * ADVANCE_RATIO
    }

    pub fn line_height(&self) -> f32 {
        self.font_size * LINE_HEIGHT_RATIO
    }

    pub fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance()
    }
}

/// Break `text` into rows at newlines, then greedily between words so that
/// no row is wider than `max_width`. A single word wider than `max_width`
/// gets a row of its own.
pub fn break_rows(metrics: TextMetrics, text: &str, max_width: f32) -> Vec<TextRow> {
    let mut rows = Vec::new();
    let mut base = 0usize;

    for line in text.split('\n') {
        let mut row: Option<(usize, usize)> = None;
        for word in line.split_whitespace() {
            let start = word.as_ptr() as usize - line.as_ptr() as usize;
            let end = start + word.len();
            row = match row {
                Some((row_start, row_end))
                    if metrics.measure(&line[row_start..end]) > max_width =>
                {
                    rows.push(make_row(metrics, line, base, row_start, row_end));
                    Some((start, end))
                }
                Some((row_start, _)) => Some((row_start, end)),
                None => Some((start, end)),
            };
        }

        match row {
            Some((start, end)) => rows.push(make_row(metrics, line, base, start, end)),
            None => rows.push(TextRow {
                range: base..base,
                width: 0.0,
            }),
        }
        base += line.len() + 1;
    }

    rows
}

fn make_row(metrics: TextMetrics, line: &str, base: usize, start: usize, end: usize) -> TextRow {
    TextRow {
        range: base + start..base + end,
        width: metrics.measure(&line[start..end]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN: TextMetrics = TextMetrics { font_size: 10.0 };

    fn ranges(rows: &[TextRow]) -> Vec<std::ops::Range<usize>> {
        rows.iter().map(|row| row.range.clone()).collect()
    }

    #[test]
    fn short_text_is_one_row() {
        let rows = break_rows(TEN, "hello world", 1000.0);
        assert_eq!(ranges(&rows), vec![0..11]);
        assert!((rows[0].width - 66.0).abs() < 1e-3);
    }

    #[test]
    fn wraps_between_words() {
        let rows = break_rows(TEN, "aaa bbb ccc", 40.0);
        assert_eq!(ranges(&rows), vec![0..3, 4..7, 8..11]);
    }

    #[test]
    fn newlines_always_break() {
        let text = "ab\n\ncd";
        let rows = break_rows(TEN, text, 1000.0);
        assert_eq!(ranges(&rows), vec![0..2, 3..3, 4..6]);
        assert_eq!(&text[rows[2].range.clone()], "cd");
    }

    #[test]
    fn long_word_keeps_its_own_row() {
        let rows = break_rows(TEN, "x abcdefghij y", 30.0);
        assert_eq!(ranges(&rows), vec![0..1, 2..12, 13..14]);
    }

    #[test]
    fn multibyte_ranges_stay_on_char_boundaries() {
        let text = "héllo wörld";
        let rows = break_rows(TEN, text, 40.0);
        for row in &rows {
            assert!(text.get(row.range.clone()).is_some());
        }
        assert_eq!(rows.len(), 2);
    }
}
