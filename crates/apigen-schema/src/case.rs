//! Identifier casing shared by every emitter.
//!
//! Names are split into words at `_`, `-`, spaces, lower-to-upper
//! transitions and acronym boundaries (`HTTPMethod` -> `HTTP`, `Method`),
//! then rejoined in the target convention.

/// Split an identifier into its words.
pub fn words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `serverInfo` -> `server_info`
pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `session_id` -> `sessionId`
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(s).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `time_span` -> `TimeSpan`
pub fn to_pascal_case(s: &str) -> String {
    words(s).iter().map(|w| capitalize(w)).collect()
}

/// ASCII identifier valid in Python, TypeScript and OpenAPI component names.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words() {
        assert_eq!(words("serverInfo"), ["server", "Info"]);
        assert_eq!(words("download_ghost"), ["download", "ghost"]);
        assert_eq!(words("HTTPMethod"), ["HTTP", "Method"]);
        assert_eq!(words("check-access"), ["check", "access"]);
        assert_eq!(words("v0Api"), ["v0", "Api"]);
        assert!(words("__").is_empty());
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("serverInfo"), "server_info");
        assert_eq!(to_snake_case("IsoDateTime"), "iso_date_time");
        assert_eq!(to_snake_case("single_ghost"), "single_ghost");
        assert_eq!(to_snake_case("sessionId"), "session_id");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("session_id"), "sessionId");
        assert_eq!(to_camel_case("sessionId"), "sessionId");
        assert_eq!(to_camel_case("id"), "id");
        assert_eq!(to_camel_case("download_ghost"), "downloadGhost");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("time_span"), "TimeSpan");
        assert_eq!(to_pascal_case("TimeSpan"), "TimeSpan");
    }

    #[test]
    fn casings_round_trip() {
        for name in ["sessionId", "totalGhostDuration", "levelIdentifier"] {
            assert_eq!(to_camel_case(&to_snake_case(name)), name);
        }
        for name in ["session_id", "total_ghost_duration"] {
            assert_eq!(to_snake_case(&to_camel_case(name)), name);
        }
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("session_id"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
    }
}
