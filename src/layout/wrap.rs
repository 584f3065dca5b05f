use crate::fonts::{TextMetrics, TextStyle};

/// Extra space between wrapped lines, on top of the font size.
pub const LINE_GAP: f32 = 5.0;

/// Vertical advance of one wrapped line.
pub fn line_advance(style: TextStyle) -> f32 {
    style.size + LINE_GAP
}

/// Greedy, non-hyphenating word wrap over whitespace-delimited tokens.
///
/// A token is appended while `width(line + " " + token)` fits in `max_width`;
/// otherwise the line is emitted and the token starts the next one. A token
/// wider than `max_width` sits alone on its line and overflows.
pub fn wrap_words<M: TextMetrics + ?Sized>(
    text: &str,
    metrics: &M,
    style: TextStyle,
    max_width: f32,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for token in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(token);
            continue;
        }
        let candidate = format!("{line} {token}");
        if metrics.text_width(&candidate, style) > max_width {
            lines.push(std::mem::replace(&mut line, token.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Height taken by `text` once wrapped; zero for blank text.
pub fn wrapped_height<M: TextMetrics + ?Sized>(
    text: &str,
    metrics: &M,
    style: TextStyle,
    max_width: f32,
) -> f32 {
    wrap_words(text, metrics, style, max_width).len() as f32 * line_advance(style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::Monospace;

    const BODY: TextStyle = TextStyle::regular(14.0);

    #[test]
    fn packs_greedily() {
        // 7pt per char at 14pt: 10 chars fit in 70pt.
        let lines = wrap_words("aaa bbb ccc ddd", &Monospace, BODY, 70.0);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn exact_fit_stays_on_line() {
        // "aaaa bbbbb" is exactly 10 chars = 70pt.
        let lines = wrap_words("aaaa bbbbb c", &Monospace, BODY, 70.0);
        assert_eq!(lines, vec!["aaaa bbbbb", "c"]);
    }

    #[test]
    fn collapses_runs_of_whitespace() {
        let lines = wrap_words("  one \n\t two  ", &Monospace, BODY, 1000.0);
        assert_eq!(lines, vec!["one two"]);
    }

    #[test]
    fn overlong_token_gets_its_own_line() {
        let lines = wrap_words("hi supercalifragilistic yo", &Monospace, BODY, 35.0);
        assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
    }

    #[test]
    fn blank_text_has_no_lines() {
        assert!(wrap_words("   ", &Monospace, BODY, 100.0).is_empty());
        assert_eq!(wrapped_height("", &Monospace, BODY, 100.0), 0.0);
    }

    #[test]
    fn height_is_lines_times_advance() {
        let h = wrapped_height("aaa bbb ccc ddd", &Monospace, BODY, 70.0);
        assert_eq!(h, 2.0 * 19.0);
    }
}
