//! String utilities for the domain layer.

/// Shorten `s` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut.
pub fn preview(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

/// Lowercase `s` and replace every character outside `[a-z0-9._-]` with `_`.
pub fn slug(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_input_untouched() {
        assert_eq!(preview("telephone", 20), "telephone");
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("Alexander Graham Bell", 10), "Alexander…");
        assert_eq!(preview("日本語テキスト", 4), "日本語…");
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Wikidata Facts"), "wikidata_facts");
        assert_eq!(slug("kg-01.prod"), "kg-01.prod");
    }
}
