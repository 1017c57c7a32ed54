use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shorten `input` to at most `max` terminal columns, ending with `…` when cut.
pub fn truncate(input: &str, max: usize) -> String {
    if input.width() <= max {
        return input.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in input.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > max - 1 {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Pad `input` with spaces to `width` terminal columns.
pub fn pad(input: &str, width: usize) -> String {
    let used = input.width();
    let mut out = input.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_input() {
        assert_eq!(truncate("Work", 10), "Work");
    }

    #[test]
    fn truncate_counts_columns_not_bytes() {
        assert_eq!(truncate("Personal", 5), "Pers…");
        assert_eq!(truncate("仕事用プロフィール", 7), "仕事用…");
    }

    #[test]
    fn pad_fills_to_display_width() {
        assert_eq!(pad("ab", 4), "ab  ");
        assert_eq!(pad("仕事", 6), "仕事  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}
