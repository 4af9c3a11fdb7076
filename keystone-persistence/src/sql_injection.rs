use regex::Regex;
use std::sync::OnceLock;

fn syntax() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(insert|delete|update|select|create|drop|truncate|grant|alter|deny|revoke|call|execute|exec|declare|show|rename|set)\s+.*(into|from|set|where|table|database|view|index|on|cursor|procedure|trigger|for|password|union|and|or)|(select\s*\*\s*from\s+)|(and|or)\s+.*",
        )
        .expect("must be valid regex")
    })
}

fn comment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)'.*(or|union|--|#|/\*|;)").expect("must be valid regex"))
}

/// Whether `value` looks like an attempt to smuggle SQL into an identifier, such as a
/// sort column taken from the request.
pub fn check(value: &str) -> bool {
    let suspicious = comment().is_match(value) || syntax().is_match(value);
    if suspicious {
        tracing::warn!(value, "rejected SQL fragment");
    }
    suspicious
}
