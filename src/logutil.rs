//! Single-line previews of operator or player supplied text for log output.
//!
//! Settings files and chat lines can contain newlines, tabs and markup; previews keep
//! each log record on one line and cap its length.

use std::fmt::Write;

/// Default preview length, in characters.
pub const PREVIEW_CHARS: usize = 160;

/// Escape `s` for a single log line, truncated to [`PREVIEW_CHARS`].
pub fn preview(s: &str) -> String {
    preview_with(s, PREVIEW_CHARS)
}

/// Escape `s` for a single log line:
/// - `\n`, `\r`, `\t` and `\` become their escaped forms
/// - other control characters become `\xNN`
/// - anything past `max_chars` is replaced by a single `…`
pub fn preview_with(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= max_chars {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
