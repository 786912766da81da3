use regex::Regex;
use std::sync::OnceLock;

// Tag grammar: "[TIP_ID:<integer>] " prefixed to the stored note. The note
// body may contain anything, including newlines.
fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[TIP_ID:(\d+)\] ").expect("tip tag regex"))
}

/// Prefix a tip id onto a user note for storage.
pub fn encode(tip_id: i64, note: &str) -> String {
    format!("[TIP_ID:{}] {}", tip_id, note)
}

/// Split a stored note into its persisted tip id (if any) and the
/// user-authored text.
pub fn decode(stored: &str) -> (Option<i64>, &str) {
    if let Some(caps) = tag_re().captures(stored) {
        let whole = caps.get(0).expect("whole match");
        // Ids too large for i64 mean a mangled tag; treat as plain text.
        if let Ok(id) = caps[1].parse::<i64>() {
            return (Some(id), &stored[whole.end()..]);
        }
    }
    (None, stored)
}

/// Drop any tag prefix, keeping only the user-authored text. Applied to
/// client-supplied notes so system state can never be forged from outside.
pub fn strip(stored: &str) -> &str {
    decode(stored).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let stored = encode(10, "slept badly, skipped gym");
        assert_eq!(stored, "[TIP_ID:10] slept badly, skipped gym");
        assert_eq!(decode(&stored), (Some(10), "slept badly, skipped gym"));
    }

    #[test]
    fn test_roundtrip_with_newlines() {
        let note = "first line\nsecond line\n";
        let stored = encode(42, note);
        assert_eq!(decode(&stored), (Some(42), note));
    }

    #[test]
    fn test_roundtrip_empty_note() {
        let stored = encode(7, "");
        assert_eq!(decode(&stored), (Some(7), ""));
    }

    #[test]
    fn test_untagged_note_passes_through() {
        assert_eq!(decode("just a note"), (None, "just a note"));
        assert_eq!(decode(""), (None, ""));
    }

    #[test]
    fn test_tag_must_be_a_prefix() {
        let note = "today: [TIP_ID:3] looked odd";
        assert_eq!(decode(note), (None, note));
    }

    #[test]
    fn test_malformed_tags_are_plain_text() {
        assert_eq!(decode("[TIP_ID:] note"), (None, "[TIP_ID:] note"));
        assert_eq!(decode("[TIP_ID:abc] note"), (None, "[TIP_ID:abc] note"));
        // Missing the trailing space after the bracket.
        assert_eq!(decode("[TIP_ID:5]note"), (None, "[TIP_ID:5]note"));
    }

    #[test]
    fn test_strip_removes_only_the_tag() {
        assert_eq!(strip("[TIP_ID:9] hello"), "hello");
        assert_eq!(strip("hello"), "hello");
    }
}
