use uuid::Uuid;

const MAX_STEM_CHARS: usize = 80;

/// Collision-resistant filename: `{content_name}_{uuid}.{ext}` with spaces replaced.
pub fn generated_filename(content_name: &str, ext: &str) -> String {
    let stem = sanitize_name(content_name);
    let uid = Uuid::new_v4();
    format!("{stem}_{uid}.{ext}")
}

fn sanitize_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if c == ' ' || is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', '.'][..]);
    if cleaned.is_empty() {
        return "untitled".to_string();
    }

    // Collapse runs of underscores left by replaced characters.
    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars().take(MAX_STEM_CHARS) {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }
    if is_reserved_windows_name(&compacted) {
        compacted.push('_');
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
