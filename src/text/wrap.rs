use crate::foundation::core::Extent;
use crate::text::face::TextFace;

/// Result of wrapping one piece of dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_extents: Vec<Extent>,
    pub max_line_width: u32,
    pub total_height: u32,
}

impl WrappedText {
    /// Interior size of a balloon holding these lines.
    pub fn extent(&self) -> Extent {
        Extent::new(self.max_line_width, self.total_height)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Greedy word wrap under a pixel width.
///
/// Words are the pieces between single spaces. A line is committed as soon as adding the
/// next word would measure wider than `max_width`; a single word wider than `max_width`
/// is kept whole on its own line. There is always at least one line, possibly empty.
///
/// Lines are trimmed as they grow, so runs of spaces collapse: `"a  b"` wraps to `["a b"]`
/// and leading or trailing spaces are dropped. Rejoining the lines with single spaces gives
/// back the non-empty words in order.
pub fn wrap<F: TextFace + ?Sized>(
    text: &str,
    max_width: u32,
    face: &mut F,
    line_spacing: u32,
) -> WrappedText {
    let mut lines = Vec::new();
    let mut committed = String::new();
    let mut candidate = String::new();

    for word in text.split(' ') {
        candidate = join_trimmed(&candidate, word);
        let width = face.measure(&candidate, line_spacing).width;
        if width > max_width && !committed.is_empty() {
            lines.push(std::mem::take(&mut committed));
            candidate = word.to_string();
        }
        committed.clone_from(&candidate);
    }
    lines.push(candidate);

    let line_extents: Vec<Extent> = lines
        .iter()
        .map(|line| face.measure(line, line_spacing))
        .collect();
    let max_line_width = line_extents.iter().map(|e| e.width).max().unwrap_or(0);
    let total_height = line_extents.iter().map(|e| e.height).sum();

    WrappedText {
        lines,
        line_extents,
        max_line_width,
        total_height,
    }
}

fn join_trimmed(line: &str, word: &str) -> String {
    let mut out = String::with_capacity(line.len() + word.len() + 1);
    out.push_str(line);
    out.push(' ');
    out.push_str(word);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::face::BlockFace;

    fn unit_face() -> BlockFace {
        BlockFace::new(1, 14)
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let w = wrap("", 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec![String::new()]);
        assert_eq!(w.max_line_width, 0);
        assert_eq!(w.total_height, 14);
    }

    #[test]
    fn exact_fit_stays_on_one_line() {
        let text = format!("{} {}", "a".repeat(55), "b".repeat(55));
        let w = wrap(&text, 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec![text]);
        assert_eq!(w.max_line_width, 111);
    }

    #[test]
    fn one_pixel_over_breaks() {
        let text = format!("{} {}", "a".repeat(55), "b".repeat(56));
        let w = wrap(&text, 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec!["a".repeat(55), "b".repeat(56)]);
        assert_eq!(w.total_height, 28);
    }

    #[test]
    fn overflow_word_gets_its_own_line() {
        let long = "x".repeat(200);
        let text = format!("{long} next");
        let w = wrap(&text, 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec![long, "next".to_string()]);
        assert_eq!(w.line_extents[0].width, 200);
        assert_eq!(w.max_line_width, 200);
    }

    #[test]
    fn overflow_word_after_short_word_breaks_before_it() {
        let long = "x".repeat(200);
        let text = format!("hi {long} yo");
        let w = wrap(&text, 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec!["hi".to_string(), long, "yo".to_string()]);
    }

    #[test]
    fn rejoined_lines_reproduce_words() {
        let text = "the quick brown fox jumps over the lazy dog and keeps on running";
        let mut face = BlockFace::new(6, 14);
        let w = wrap(text, 60, &mut face, 2);
        assert!(w.lines.len() > 1);
        assert_eq!(w.lines.join(" "), text);
        for (line, extent) in w.lines.iter().zip(&w.line_extents) {
            assert!(extent.width <= 60 || !line.contains(' '));
        }
    }

    #[test]
    fn repeated_spaces_collapse_to_one() {
        let w = wrap("a  b", 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec!["a b".to_string()]);

        let w = wrap("  hi   there ", 111, &mut unit_face(), 2);
        assert_eq!(w.lines, vec!["hi there".to_string()]);
        assert_eq!(w.max_line_width, 8);
    }

    #[test]
    fn wrapping_is_deterministic() {
        let text = "one two three four five six seven";
        let a = wrap(text, 40, &mut BlockFace::new(5, 10), 0);
        let b = wrap(text, 40, &mut BlockFace::new(5, 10), 0);
        assert_eq!(a, b);
    }
}
