// @module: Greedy word wrapping for caption lines

/// Break `text` into display lines no wider than `max_width` characters.
///
/// Words are packed greedily in their original order. A word longer than
/// `max_width` gets a line of its own and is never split. A width of zero
/// disables wrapping: the whitespace-normalized text comes back as one line.
/// Empty or whitespace-only text yields no lines.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut words = text.split_whitespace();

    let Some(first) = words.next() else {
        return Vec::new();
    };

    if max_width == 0 {
        let mut line = first.to_string();
        for word in words {
            line.push(' ');
            line.push_str(word);
        }
        return vec![line];
    }

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut current_len = first.chars().count();

    for word in words {
        let word_len = word.chars().count();
        if current_len + 1 + word_len <= max_width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    lines.push(current);
    lines
}

/// Same as [`wrap_text`] for callers holding a signed width; `<= 0` means no wrapping.
pub fn wrap_text_signed(text: &str, max_width: i64) -> Vec<String> {
    let width = usize::try_from(max_width).unwrap_or(0);
    wrap_text(text, width)
}
