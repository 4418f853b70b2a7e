//! Filename and content-type helpers for uploaded files

/// Reduce a client-supplied filename to a safe single path segment
pub fn sanitize_filename(name: &str) -> String {
    // browsers on windows may send the full path
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Use the declared content type, or guess it from the extension
pub fn content_type_for(filename: &str, declared: Option<&str>) -> String {
    match declared {
        Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cover.png"), "cover.png");
        assert_eq!(sanitize_filename("My Cover (final).png"), "My_Cover__final_.png");
        assert_eq!(sanitize_filename("C:\\Users\\dj\\track.mp3"), "track.mp3");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename(""), "file");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.mp3", Some("audio/mpeg")), "audio/mpeg");
        assert_eq!(content_type_for("a.png", None), "image/png");
        assert_eq!(
            content_type_for("a.png", Some("application/octet-stream")),
            "image/png"
        );
        assert_eq!(content_type_for("noext", None), "application/octet-stream");
    }
}
