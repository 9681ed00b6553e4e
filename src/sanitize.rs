//! Storage-safe name sanitization.
//!
//! Maps an arbitrary string (a folder path, a filename) to an identifier
//! containing only `[A-Za-z0-9_]`, with at most one preserved leading dot
//! (dotfile-style names) and a single-dot extension separator. Pure
//! function: identical input, identical output, no I/O.

/// Sanitize a name for use as a storage identifier.
///
/// Invalid characters are replaced with underscores, runs of underscores
/// collapse to one, and leading/trailing underscores are trimmed from the
/// name part. The extension (text after the last dot) keeps only
/// alphanumeric characters.
///
/// ```
/// use askdocs::sanitize::sanitize_name;
///
/// assert_eq!(sanitize_name("My File!.txt"), "My_File.txt");
/// assert_eq!(sanitize_name("file/with/slashes.doc"), "file_with_slashes.doc");
/// assert_eq!(sanitize_name(".gitignore"), ".gitignore");
/// ```
pub fn sanitize_name(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    // Preserve a single leading dot for dotfile-style names
    let (leading_dot, rest) = match input.strip_prefix('.') {
        Some(rest) => (".", rest),
        None => ("", input),
    };

    // Split into name and extension on the last dot
    let (name, extension) = match rest.rfind('.') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };

    // Replace invalid characters with underscores, collapsing runs.
    // Literal underscores participate in the collapse too.
    let mut name_out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            name_out.push(ch);
            prev_underscore = false;
        } else if !prev_underscore {
            name_out.push('_');
            prev_underscore = true;
        }
    }

    let ext_out: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    let mut out = String::with_capacity(input.len());
    out.push_str(leading_dot);
    out.push_str(name_out.trim_matches('_'));
    if !ext_out.is_empty() {
        out.push('.');
        out.push_str(&ext_out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `^\.?[A-Za-z0-9_]*(\.[A-Za-z0-9]+)?$` without pulling in a regex dep.
    fn matches_safe_pattern(s: &str) -> bool {
        let rest = s.strip_prefix('.').unwrap_or(s);
        let (name, ext) = match rest.rfind('.') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        let name_ok = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        let ext_ok = match ext {
            Some(e) => !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()),
            None => true,
        };
        name_ok && ext_ok
    }

    #[test]
    fn replaces_invalid_characters() {
        assert_eq!(sanitize_name("My File!.txt"), "My_File.txt");
        assert_eq!(sanitize_name("file with spaces.pdf"), "file_with_spaces.pdf");
        assert_eq!(sanitize_name("file/with/slashes.doc"), "file_with_slashes.doc");
    }

    #[test]
    fn preserves_leading_dot() {
        assert_eq!(sanitize_name(".gitignore"), ".gitignore");
        assert_eq!(sanitize_name(".env.local"), ".env.local");
    }

    #[test]
    fn collapses_underscore_runs() {
        assert_eq!(sanitize_name("a -- b.txt"), "a_b.txt");
        assert_eq!(sanitize_name("a__b"), "a_b");
    }

    #[test]
    fn trims_edge_underscores() {
        assert_eq!(sanitize_name("/home/user/my docs"), "home_user_my_docs");
        assert_eq!(sanitize_name("__padded__"), "padded");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn output_always_matches_safe_pattern() {
        let nasty = [
            "data",
            "data/sub folder",
            "über.pdf",
            "a..b..c",
            "!!!",
            "..hidden",
            "trailing.",
            "./relative/path",
            "C:\\Users\\docs",
            "emoji 🦀 name.txt",
        ];
        for input in nasty {
            let out = sanitize_name(input);
            assert!(
                matches_safe_pattern(&out),
                "sanitize_name({:?}) produced unsafe {:?}",
                input,
                out
            );
            assert!(!out.contains("__"), "consecutive underscores in {:?}", out);
        }
    }

    #[test]
    fn is_deterministic() {
        let input = "some/odd path (v2).txt";
        assert_eq!(sanitize_name(input), sanitize_name(input));
    }
}
