use std::fmt::{Display, Write};

const DELIM: &str = "{}";
const ESCAPE: char = '\\';

/// Eagerly interpolates `{}` placeholders with positional arguments.
///
/// - each `{}` consumes the next argument;
/// - `\{}` renders a literal `{}` without consuming an argument;
/// - `\\{}` renders one backslash followed by the argument;
/// - surplus arguments are ignored, missing ones leave `{}` in place.
///
/// ```
/// use keystone::common::format_message;
///
/// assert_eq!(format_message("order {} not found", &[&42]), "order 42 not found");
/// assert_eq!(format_message("literal \\{}", &[&1]), "literal {}");
/// ```
pub fn format_message(pattern: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(pattern.len() + 16 * args.len());
    let mut rest = pattern;
    let mut args = args.iter();

    while let Some(found) = rest.find(DELIM) {
        let before = &rest[..found];
        if before.ends_with(ESCAPE) {
            let unescaped = &before[..before.len() - 1];
            if unescaped.ends_with(ESCAPE) {
                // `\\{}`: keep one backslash, substitute the argument.
                out.push_str(unescaped);
            } else {
                out.push_str(unescaped);
                out.push_str(DELIM);
                rest = &rest[found + DELIM.len()..];
                continue;
            }
        } else {
            out.push_str(before);
        }

        match args.next() {
            Some(arg) => {
                let _ = write!(out, "{arg}");
            }
            None => out.push_str(DELIM),
        }
        rest = &rest[found + DELIM.len()..];
    }

    out.push_str(rest);
    out
}
