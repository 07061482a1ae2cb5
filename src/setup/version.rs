//! Config file versioning.
//!
//! The first line of the config file records the solatran version that wrote it:
//! `config_version = "X.Y.Z"`. Comparing it with the running binary tells setup
//! whether the file needs migrating.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `major.minor.patch`
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl FromStr for SemanticVersion {
    type Err = anyhow::Error;

    fn from_str(version_str: &str) -> anyhow::Result<Self> {
        let mut parts = version_str.trim().split('.').map(str::parse::<u32>);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch)), None) => Ok(Self {
                major,
                minor,
                patch,
            }),
            _ => Err(anyhow!(
                "Invalid version format: '{version_str}'. Expected 'major.minor.patch'"
            )),
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn version_line_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    // Must be the first line and not commented out
    REGEX
        .get_or_init(|| Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#).ok())
        .as_ref()
}

/// Extracts the version from the first line of a config file's content.
fn read_config_version(content: &str) -> Option<String> {
    let first_line = content.lines().next()?;
    version_line_regex()?
        .captures(first_line)
        .map(|caps| caps[1].to_string())
}

/// Returns the version the config was written by if it is older than this
/// binary, or `None` if no migration is needed.
///
/// A config without a version line counts as a legacy config. A missing file
/// needs no migration; setup writes it from scratch.
///
/// # Errors
/// - If the file cannot be read
/// - If its version line is not `major.minor.patch`
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<Option<String>> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(config_path)?;
    let Some(config_version) = read_config_version(&content) else {
        return Ok(Some("unknown (legacy config)".to_string()));
    };

    let config_parsed: SemanticVersion = config_version.parse()?;
    let current_parsed: SemanticVersion = CURRENT_VERSION.parse()?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(Some(config_version)),
        Ordering::Equal => Ok(None),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {} is newer than app version {}",
                config_parsed,
                current_parsed
            );
            Ok(None)
        }
    }
}

/// Rewrites the first line of the config file as the current version,
/// preserving every other line.
///
/// # Errors
/// - If the file cannot be read or written
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    std::fs::write(config_path, with_version_line(&content))?;
    Ok(())
}

fn with_version_line(content: &str) -> String {
    let version_line = format!(r#"config_version = "{CURRENT_VERSION}""#);
    let rest: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with("config_version"))
        .collect();

    if rest.is_empty() {
        version_line
    } else {
        format!("{version_line}\n{}\n", rest.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_parse() {
        let v: SemanticVersion = "0.0.5".parse().unwrap();
        assert_eq!((v.major, v.minor, v.patch), (0, 0, 5));
        assert_eq!(v.to_string(), "0.0.5");
    }

    #[test]
    fn test_semantic_version_comparison() {
        let v1: SemanticVersion = "0.0.4".parse().unwrap();
        let v2: SemanticVersion = "0.0.5".parse().unwrap();
        let v3: SemanticVersion = "0.1.0".parse().unwrap();
        assert!(v1 < v2);
        assert!(v2 < v3);
    }

    #[test]
    fn test_invalid_version_format() {
        assert!("0.0".parse::<SemanticVersion>().is_err());
        assert!("0.0.5.1".parse::<SemanticVersion>().is_err());
        assert!("invalid".parse::<SemanticVersion>().is_err());
    }

    #[test]
    fn version_must_be_on_first_line() {
        assert_eq!(
            read_config_version("config_version = \"1.2.3\"\n[oauth]"),
            Some("1.2.3".to_string())
        );
        assert_eq!(read_config_version("# config_version = \"1.2.3\""), None);
        assert_eq!(read_config_version("[oauth]\nconfig_version = \"1.2.3\""), None);
    }

    #[test]
    fn version_line_replaces_existing_one() {
        let updated = with_version_line("[oauth]\nconfig_version = \"0.0.1\"\nclient_id = \"x\"");
        assert_eq!(
            updated,
            format!("config_version = \"{CURRENT_VERSION}\"\n[oauth]\nclient_id = \"x\"\n")
        );
    }

    #[test]
    fn legacy_config_needs_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solatran.toml");
        std::fs::write(&path, "[oauth]\n").unwrap();
        assert!(check_setup_needed(&path).unwrap().is_some());

        update_config_version(&path).unwrap();
        assert_eq!(check_setup_needed(&path).unwrap(), None);
    }
}
