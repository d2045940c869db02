/// Deterministic output locations for per-repository models
///
/// A repository identifier is normalized into a filename key, and the model file is
/// placed under `depth` nested directories named by growing prefixes of that key:
///
/// ```text
/// key "github.com&src-d&ast2vec", depth 3:
///   <root>/g/gi/git/source_github.com&src-d&ast2vec.asdf
/// ```
///
/// Identifiers that differ only in their scheme, a trailing `.git`, or `/` versus `&`
/// share a key and therefore a model file.
use crate::model::MODEL_NAME;
use std::path::{Path, PathBuf};

/// Extension of model files
pub const MODEL_FILE_EXTENSION: &str = "asdf";

/// Drop trailing whitespace and line-continuation backslashes
pub fn trim_identifier(identifier: &str) -> &str {
    identifier.trim_end_matches(|c: char| c.is_whitespace() || c == '\\')
}

/// Normalize a repository identifier into the key used in file and directory names
///
/// # Examples
///
/// ```
/// use repo2source::sharding::normalize_identifier;
///
/// assert_eq!(normalize_identifier("https://github.com/src-d/ast2vec.git\n"), "github.com&src-d&ast2vec");
/// assert_eq!(normalize_identifier("abc"), "abc");
/// ```
pub fn normalize_identifier(identifier: &str) -> String {
    let trimmed = trim_identifier(identifier);
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let without_scheme = match trimmed.rfind("://") {
        Some(pos) => &trimmed[pos + 3..],
        None => trimmed,
    };
    without_scheme.replace('/', "&")
}

/// Model file name for a normalized key
pub fn model_file_name(key: &str) -> String {
    format!("{}_{}.{}", MODEL_NAME, key, MODEL_FILE_EXTENSION)
}

/// Where the model for `identifier` lives under `output_root`
///
/// `depth` is capped by the key length: a three-character key yields at most three
/// directory levels.
pub fn sharded_path(identifier: &str, output_root: &Path, depth: usize) -> PathBuf {
    let key = normalize_identifier(identifier);

    let mut dir = output_root.to_path_buf();
    let mut prefix = String::new();
    for ch in key.chars().take(depth) {
        prefix.push(ch);
        dir.push(&prefix);
    }

    dir.join(model_file_name(&key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTIFIERS: &[&str] = &[
        "https://whatever.cite.com/cool/you.git",
        "whatever.cite.com/cool/you.git",
        "whatever.cite.com/cool/you\\\n",
        "whatever.cite.com/cool/you\n",
        "whatever.cite.com/cool/you",
        "whatever.cite.com/cool/you.git\n",
    ];

    #[test]
    fn test_normalize_all_forms_agree() {
        for identifier in IDENTIFIERS {
            assert_eq!(
                normalize_identifier(identifier),
                "whatever.cite.com&cool&you",
                "identifier {:?}",
                identifier
            );
        }
    }

    #[test]
    fn test_depth_zero() {
        let root = Path::new("/out");
        for identifier in IDENTIFIERS {
            assert_eq!(
                sharded_path(identifier, root, 0),
                root.join("source_whatever.cite.com&cool&you.asdf")
            );
        }
    }

    #[test]
    fn test_depth_one() {
        let root = Path::new("/out");
        for identifier in IDENTIFIERS {
            assert_eq!(
                sharded_path(identifier, root, 1),
                root.join("w/source_whatever.cite.com&cool&you.asdf")
            );
        }
    }

    #[test]
    fn test_depth_three() {
        let root = Path::new("/out");
        for identifier in IDENTIFIERS {
            assert_eq!(
                sharded_path(identifier, root, 3),
                root.join("w/wh/wha/source_whatever.cite.com&cool&you.asdf")
            );
        }
    }

    #[test]
    fn test_depth_capped_by_key_length() {
        let root = Path::new("/out");
        assert_eq!(
            sharded_path("abc", root, 10),
            root.join("a/ab/abc/source_abc.asdf")
        );
    }

    #[test]
    fn test_short_form_identifiers() {
        let root = Path::new("/r");
        for identifier in ["https://h/a/b.git", "h/a/b\\\n", "h/a/b.git\n"] {
            assert_eq!(sharded_path(identifier, root, 0), root.join("source_h&a&b.asdf"));
            assert_eq!(
                sharded_path(identifier, root, 3),
                root.join("h/h&/h&a/source_h&a&b.asdf")
            );
        }
    }

    #[test]
    fn test_shard_prefixes_are_characters_not_bytes() {
        let root = Path::new("/r");
        assert_eq!(
            sharded_path("проект", root, 2),
            root.join("п/пр/source_проект.asdf")
        );
    }

    #[test]
    fn test_deterministic() {
        let root = Path::new("/r");
        let first = sharded_path("git://example.org/team/repo.git", root, 4);
        let second = sharded_path("git://example.org/team/repo.git", root, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_scheme_and_separator_variants_collide() {
        assert_ne!(
            normalize_identifier("https://github.com/a/b"),
            normalize_identifier("https://gitlab.com/a/b")
        );
        assert_eq!(
            normalize_identifier("ssh://github.com/a/b"),
            normalize_identifier("github.com/a&b")
        );
    }

    #[test]
    fn test_trim_identifier() {
        assert_eq!(trim_identifier("repo \t\n"), "repo");
        assert_eq!(trim_identifier("repo\\\n"), "repo");
        assert_eq!(trim_identifier("/data/repo"), "/data/repo");
    }
}
