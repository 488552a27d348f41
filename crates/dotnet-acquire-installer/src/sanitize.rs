//! Strips the current user's name out of text bound for logs/telemetry
//! (spec §4.7 "sanitized of the user name before telemetry").

/// Replaces every occurrence of `USER`/`USERNAME` (and, on POSIX, `HOME`'s
/// final path segment) in `text` with a placeholder.
pub fn sanitize_user_name(text: &str) -> String {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(user) = std::env::var("USER") {
        candidates.push(user);
    }
    if let Ok(user) = std::env::var("USERNAME") {
        candidates.push(user);
    }
    if let Some(home) = dirs::home_dir() {
        if let Some(leaf) = home.file_name().and_then(|n| n.to_str()) {
            candidates.push(leaf.to_string());
        }
    }

    candidates.retain(|c| c.len() >= 2);
    candidates.sort_by_key(|c| std::cmp::Reverse(c.len()));
    candidates.dedup();

    let mut out = text.to_string();
    for candidate in candidates {
        out = out.replace(&candidate, "<user>");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_user_env_var() {
        std::env::set_var("USER", "alicesmith");
        let sanitized = sanitize_user_name("failed to write to /home/alicesmith/.dotnet");
        std::env::remove_var("USER");
        assert_eq!(sanitized, "failed to write to /home/<user>/.dotnet");
    }

    #[test]
    fn leaves_unrelated_text_untouched() {
        std::env::remove_var("USER");
        std::env::remove_var("USERNAME");
        let sanitized = sanitize_user_name("plain error message");
        assert_eq!(sanitized, "plain error message");
    }
}
