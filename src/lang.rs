//! Message keys, default English templates and positional template formatting.
//!
//! Templates use composite-format placeholders: `{0}` inserts the first argument,
//! `{{` and `}}` produce literal braces. A placeholder may carry an alignment,
//! `{0,8}` pads to the right edge of 8 columns and `{0,-8}` to the left edge. A format
//! suffix such as `{0:N0}` is accepted but ignored; arguments always render through
//! their `Display` impl.

use std::collections::BTreeMap;
use std::fmt::Display;

pub const NO_PERMISSION: &str = "NoPermission";
pub const CLEARED: &str = "Cleared";
pub const AUTHORIZED: &str = "Authorized";
pub const STILL_AUTHORIZED: &str = "StillAuthorized";

/// Locale the default templates are registered under, and the lookup fallback.
pub const DEFAULT_LOCALE: &str = "en";

/// Default templates registered at plugin load.
pub fn default_messages() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        (NO_PERMISSION, "You do not have permission to use this command"),
        (CLEARED, "You have successfully cleared the cupboard list"),
        (AUTHORIZED, "List of users also authorized on this cupboard:"),
        (
            STILL_AUTHORIZED,
            "List of users still authorized on this cupboard:",
        ),
    ])
}

/// Substitute positional `args` into `template`.
///
/// Returns a description of the problem when a placeholder is malformed or refers to an
/// argument that was not supplied.
pub fn format_template(template: &str, args: &[&dyn Display]) -> Result<String, String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' => {
                if matches!(chars.peek(), Some((_, '{'))) {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut index = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    index.push(c);
                }
                if !closed {
                    return Err(format!("unclosed placeholder at offset {}", pos));
                }
                let invalid = || format!("invalid placeholder {{{}}}", index);
                let field = index.split(':').next().unwrap_or_default();
                let (position, width) = match field.split_once(',') {
                    Some((position, width)) => {
                        let width: i64 = width.trim().parse().map_err(|_| invalid())?;
                        (position, width)
                    }
                    None => (field, 0),
                };
                let n: usize = position.trim().parse().map_err(|_| invalid())?;
                let arg = args.get(n).ok_or_else(|| {
                    format!(
                        "placeholder {{{}}} but only {} argument(s) supplied",
                        n,
                        args.len()
                    )
                })?;
                let pad = width.unsigned_abs() as usize;
                if width < 0 {
                    out.push_str(&format!("{:<pad$}", arg.to_string()));
                } else {
                    out.push_str(&format!("{:>pad$}", arg.to_string()));
                }
            }
            '}' => {
                if matches!(chars.peek(), Some((_, '}'))) {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(format!("unescaped '}}' at offset {}", pos));
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}
