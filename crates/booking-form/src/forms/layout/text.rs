/// Average glyph advance, in ems, used to wrap the form's static paragraphs.
pub const AVERAGE_ADVANCE_EM: f32 = 0.5;

/// Line height multiplier applied to the body font size.
pub const LINE_HEIGHT_EM: f32 = 1.4;

/// How many characters of body text fit in `width` at `font_size`.
pub fn chars_per_line(width: f32, font_size: f32) -> usize {
    let advance = font_size * AVERAGE_ADVANCE_EM;
    if !(advance > 0.0) || !(width > 0.0) {
        return 1;
    }
    ((width / advance).floor() as usize).max(1)
}

/// Greedy word wrap. Words longer than a line are split at the line boundary.
pub fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }

        if word.is_empty() {
            continue;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };

        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }

    if current_len > 0 {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_words("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn splits_words_longer_than_a_line() {
        let lines = wrap_words("ab abcdefghij", 4);
        assert_eq!(lines, vec!["ab", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn blank_text_produces_no_lines() {
        assert!(wrap_words("   ", 10).is_empty());
    }

    #[test]
    fn chars_per_line_uses_half_em_advance() {
        assert_eq!(chars_per_line(100.0, 10.0), 20);
        assert_eq!(chars_per_line(0.0, 10.0), 1);
    }
}
