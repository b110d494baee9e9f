//! Val URI parsing (SPEC_FULL §11): turn a CLI-supplied `<val_uri>` argument
//! into the `(author, name, branch)` triple `clone`/`remix` need. Argument
//! parsing proper belongs to the CLI layer, not the core engine (§1) — this
//! is the minimal, swappable piece that bridges the two.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValUri {
    pub author: String,
    pub name: String,
    pub branch: Option<String>,
}

/// Accepts `author/name`, `author/name@branch`, or a full `https://www.val.town/x/author/name`
/// URL (with an optional `@branch`, `/branch/<name>` suffix is not handled here — the engine
/// resolves branches by id once the val is known).
pub fn parse_val_uri(input: &str) -> Result<ValUri, String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("val reference cannot be empty".to_string());
    }

    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .map(|rest| rest.splitn(2, '/').nth(1).unwrap_or(""))
        .unwrap_or(trimmed);

    let without_scheme = without_scheme.strip_prefix("x/").unwrap_or(without_scheme);

    let (path, branch) = match without_scheme.split_once('@') {
        Some((path, branch)) => (path, Some(branch.to_string())),
        None => (without_scheme, None),
    };

    let mut segments = path.trim_matches('/').splitn(2, '/');
    let author = segments.next().filter(|s| !s.is_empty());
    let name = segments.next().filter(|s| !s.is_empty());

    match (author, name) {
        (Some(author), Some(name)) => Ok(ValUri {
            author: author.to_string(),
            name: name.to_string(),
            branch,
        }),
        _ => Err(format!("'{input}' is not a valid val reference (expected author/name)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_author_slash_name() {
        let uri = parse_val_uri("alice/my-api").unwrap();
        assert_eq!(uri.author, "alice");
        assert_eq!(uri.name, "my-api");
        assert_eq!(uri.branch, None);
    }

    #[test]
    fn parses_branch_suffix() {
        let uri = parse_val_uri("alice/my-api@feature").unwrap();
        assert_eq!(uri.branch.as_deref(), Some("feature"));
    }

    #[test]
    fn parses_full_url() {
        let uri = parse_val_uri("https://www.val.town/x/alice/my-api").unwrap();
        assert_eq!(uri.author, "alice");
        assert_eq!(uri.name, "my-api");
    }

    #[test]
    fn rejects_missing_name() {
        assert!(parse_val_uri("alice").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_val_uri("   ").is_err());
    }
}
