/// Shorten `s` to at most `max_chars` characters for log output.
#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Trim `s` and replace every run of whitespace with a single `-`.
#[must_use]
pub fn hyphenate_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Applicant name as embedded in attachment filenames.
#[must_use]
pub fn filename_safe_name(full_name: &str) -> String {
    let hyphenated = hyphenate_whitespace(full_name);
    let cleaned: String = hyphenated
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '"' | '<' | '>' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .collect();

    if cleaned.is_empty() {
        "anonimo".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_untouched() {
        assert_eq!(truncate_with_ellipsis("hola", 10), "hola");
        assert_eq!(truncate_with_ellipsis("", 10), "");
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_with_ellipsis("Córdoba capital", 7), "Córdoba...");
        assert_eq!(truncate_with_ellipsis("año ñandú", 4), "año...");
    }

    #[test]
    fn truncate_zero_max_chars() {
        assert_eq!(truncate_with_ellipsis("hola", 0), "...");
    }

    #[test]
    fn whitespace_runs_collapse_to_one_hyphen() {
        assert_eq!(hyphenate_whitespace("Juana Pérez"), "Juana-Pérez");
        assert_eq!(hyphenate_whitespace("  María \t del  Carmen\n"), "María-del-Carmen");
        assert_eq!(hyphenate_whitespace(""), "");
    }

    #[test]
    fn filename_name_drops_path_separators() {
        assert_eq!(filename_safe_name("Juana Pérez"), "Juana-Pérez");
        assert_eq!(filename_safe_name("a/b\\c"), "abc");
        assert_eq!(filename_safe_name("   "), "anonimo");
    }
}
