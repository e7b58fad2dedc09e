use regex::RegexBuilder;

use crate::error::FilterError;

const PACKAGE_PREFIX: &str = "package:";

/// Outcome of searching the installed packages
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PackageMatch {
    None,
    One(String),
    Many(Vec<String>),
}

/// Search a `pm list packages` listing with a case-insensitive pattern
///
/// The `package:` prefix is stripped from the returned names.
pub fn match_packages(listing: &[String], term: &str) -> Result<PackageMatch, FilterError> {
    let regex = RegexBuilder::new(term)
        .case_insensitive(true)
        .build()
        .map_err(|source| FilterError::InvalidPackageSearch {
            pattern: term.to_string(),
            source,
        })?;

    let mut names: Vec<String> = listing
        .iter()
        .map(|line| line.trim())
        .map(|line| line.strip_prefix(PACKAGE_PREFIX).unwrap_or(line))
        .filter(|name| !name.is_empty() && regex.is_match(name))
        .map(str::to_string)
        .collect();
    names.sort();
    names.dedup();

    Ok(match names.len() {
        0 => PackageMatch::None,
        1 => PackageMatch::One(names.remove(0)),
        _ => PackageMatch::Many(names),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<String> {
        [
            "package:com.example.app",
            "package:com.example.app.debug",
            "package:com.android.settings",
            "package:org.mozilla.firefox",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    #[test]
    fn test_single_match() {
        assert_eq!(
            match_packages(&listing(), "FIREFOX").unwrap(),
            PackageMatch::One("org.mozilla.firefox".to_string())
        );
    }

    #[test]
    fn test_many_matches_are_sorted() {
        assert_eq!(
            match_packages(&listing(), "example").unwrap(),
            PackageMatch::Many(vec![
                "com.example.app".to_string(),
                "com.example.app.debug".to_string(),
            ])
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_packages(&listing(), "chrome").unwrap(), PackageMatch::None);
        assert_eq!(match_packages(&[], "x").unwrap(), PackageMatch::None);
    }

    #[test]
    fn test_prefix_is_not_searched() {
        assert_eq!(match_packages(&listing(), "^package").unwrap(), PackageMatch::None);
        assert_eq!(
            match_packages(&listing(), "^org\\.").unwrap(),
            PackageMatch::One("org.mozilla.firefox".to_string())
        );
    }

    #[test]
    fn test_invalid_pattern() {
        let err = match_packages(&listing(), "[").unwrap_err();
        assert!(matches!(err, FilterError::InvalidPackageSearch { .. }));
    }
}
