//! Fallback credentials file support
//!
//! When the host supplies neither `login_user` nor `login_password`, the
//! plugin consults an optional INI-style file at `~/.mongodb.cnf` with a
//! `[client]` section holding `user` and `pass` keys. A missing or unusable
//! file is never an error: the connection simply proceeds unauthenticated.

use std::path::Path;
use tracing::debug;

/// Name of the credentials file under the invoking user's home directory
const MONGOCNF_FILE: &str = ".mongodb.cnf";

/// Section consulted in the credentials file
const CLIENT_SECTION: &str = "client";

/// A user/password pair loaded from the credentials file
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

// Manual impl so the password never lands in logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Loads credentials from the fixed home-directory path
///
/// Returns `None` when the home directory is unknown, the file is missing or
/// unreadable, or either key is absent.
pub fn load_default_credentials() -> Option<Credentials> {
    let home = std::env::var("HOME").ok()?;
    load_from(Path::new(&home).join(MONGOCNF_FILE))
}

/// Loads credentials from an explicit path
pub fn load_from(path: impl AsRef<Path>) -> Option<Credentials> {
    let path = path.as_ref();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(_) => {
            debug!("no credentials file at {}", path.display());
            return None;
        }
    };
    let creds = parse_mongocnf(&text);
    if creds.is_some() {
        debug!("loaded fallback credentials from {}", path.display());
    }
    creds
}

/// Parses the INI subset used by the credentials file
///
/// Recognized syntax: `[section]` headers, `key = value` / `key: value`
/// pairs, `#` and `;` comment lines. Only the `[client]` section is
/// consulted, and both `user` and `pass` must be present.
pub fn parse_mongocnf(text: &str) -> Option<Credentials> {
    let mut section = String::new();
    let mut user = None;
    let mut password = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = name.trim().to_string();
            continue;
        }
        if section != CLIENT_SECTION {
            continue;
        }
        let (key, value) = match line.split_once('=').or_else(|| line.split_once(':')) {
            Some((key, value)) => (key.trim(), value.trim()),
            None => continue,
        };
        match key {
            "user" => user = Some(value.to_string()),
            "pass" => password = Some(value.to_string()),
            _ => {}
        }
    }

    Some(Credentials {
        user: user?,
        password: password?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_well_formed() {
        let creds = parse_mongocnf("[client]\nuser = admin\npass = s3cret\n").unwrap();
        assert_eq!(creds.user, "admin");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn test_parse_colon_separator() {
        let creds = parse_mongocnf("[client]\nuser: admin\npass: s3cret\n").unwrap();
        assert_eq!(creds.user, "admin");
        assert_eq!(creds.password, "s3cret");
    }

    #[test]
    fn test_parse_missing_pass() {
        assert!(parse_mongocnf("[client]\nuser = admin\n").is_none());
    }

    #[test]
    fn test_parse_missing_user() {
        assert!(parse_mongocnf("[client]\npass = s3cret\n").is_none());
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_mongocnf("").is_none());
    }

    #[test]
    fn test_parse_wrong_section() {
        let text = "[server]\nuser = admin\npass = s3cret\n";
        assert!(parse_mongocnf(text).is_none());
    }

    #[test]
    fn test_parse_ignores_other_sections_and_comments() {
        let text = "\
# global defaults
[mysqld]
user = nobody

[client]
; login pair
user = backup
pass = p@ss=word
";
        let creds = parse_mongocnf(text).unwrap();
        assert_eq!(creds.user, "backup");
        // split_once keeps everything after the first separator
        assert_eq!(creds.password, "p@ss=word");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let creds = parse_mongocnf("  [ client ]\n  user =  admin  \n pass= x\n").unwrap();
        assert_eq!(creds.user, "admin");
        assert_eq!(creds.password, "x");
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(load_from("/nonexistent/.mongodb.cnf").is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[client]").unwrap();
        writeln!(file, "user = filed").unwrap();
        writeln!(file, "pass = fromdisk").unwrap();

        let creds = load_from(file.path()).unwrap();
        assert_eq!(creds.user, "filed");
        assert_eq!(creds.password, "fromdisk");
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            user: "admin".to_string(),
            password: "s3cret".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("s3cret"));
    }
}
