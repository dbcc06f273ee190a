use regex::Regex;
use thiserror::Error;

/// Sentinel that disables a filter axis
pub const MATCH_ALL: &str = "all";

/// Metacharacters that mark a pattern as a real regex rather than a glob
const REGEX_METACHARS: &[char] = &['^', '$', '(', ')', '[', ']', '{', '}', '|', '+', '\\'];

/// A message pattern, compiled once before any event is processed.
///
/// The sentinel `"all"` matches every message. Patterns carrying regex
/// metacharacters compile as regexes with substring semantics (`^ERROR.*`
/// works as written); anything else is treated as a shell glob where `*` and
/// `?` are wildcards, so a wildcard-free glob is an exact match.
#[derive(Clone, Debug)]
pub enum MessagePattern {
    Any,
    Compiled(Regex),
}

/// A pattern that failed to compile; fatal at configuration time.
#[derive(Debug, Error)]
#[error("invalid message pattern {pattern:?}")]
pub struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

impl MessagePattern {
    /// Compile a user-supplied pattern
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        if raw == MATCH_ALL {
            return Ok(Self::Any);
        }

        let source = if raw.contains(REGEX_METACHARS) {
            raw.to_string()
        } else {
            glob_to_regex(raw)
        };

        Regex::new(&source)
            .map(Self::Compiled)
            .map_err(|source| PatternError {
                pattern: raw.to_string(),
                source,
            })
    }

    /// Check a message against the pattern
    pub fn matches(&self, message: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Compiled(re) => re.is_match(message),
        }
    }

    /// Whether this pattern restricts anything
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Translate a shell glob into an anchored regex
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + 8);
    out.push('^');
    for c in glob.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_sentinel_matches_everything() {
        let pattern = MessagePattern::compile("all").unwrap();
        assert!(pattern.is_any());
        assert!(pattern.matches("anything at all"));
        assert!(pattern.matches(""));
    }

    #[test]
    fn test_glob_wildcards() {
        let pattern = MessagePattern::compile("*vmnic*").unwrap();
        assert!(pattern.matches("link down on vmnic3"));
        assert!(!pattern.matches("link down on eth0"));
    }

    #[test]
    fn test_glob_without_wildcards_is_exact() {
        let pattern = MessagePattern::compile("Powered on").unwrap();
        assert!(pattern.matches("Powered on"));
        assert!(!pattern.matches("VM Powered on today"));
    }

    #[test]
    fn test_glob_escapes_literal_dot() {
        let pattern = MessagePattern::compile("*.log").unwrap();
        assert!(pattern.matches("rotated audit.log"));
        assert!(!pattern.matches("rotated auditXlog"));
    }

    #[test]
    fn test_regex_passthrough() {
        let pattern = MessagePattern::compile("^ERROR.*").unwrap();
        assert!(pattern.matches("ERROR: disk full"));
        assert!(!pattern.matches("an ERROR happened"));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let err = MessagePattern::compile("^ERROR[").unwrap_err();
        assert!(err.to_string().contains("invalid message pattern"));
    }
}
