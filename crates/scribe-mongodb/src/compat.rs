//! Server/driver compatibility advisory
//!
//! A fixed table of known-bad server/driver pairings, checked right after
//! connecting and before the write. This is a pure advisory guard, not a
//! negotiated protocol: it only refuses combinations that are documented not
//! to work.

use scribe_common::{Result, ScribeError};
use semver::Version;

/// Version of the linked `mongodb` driver crate
pub const DRIVER_VERSION: &str = "3.1.0";

/// Drivers older than this are unsupported against any server
const MIN_DRIVER_VERSION: (u64, u64, u64) = (2, 0, 0);

/// Known-bad pairings: a server at or above the floor needs at least the
/// paired driver version.
const VERSION_FLOORS: &[((u64, u64, u64), (u64, u64, u64))] = &[
    ((8, 0, 0), (3, 0, 0)),
    ((7, 0, 0), (2, 6, 0)),
    ((6, 0, 0), (2, 3, 0)),
    ((5, 0, 0), (2, 1, 0)),
];

/// Checks the connected server's version against the linked driver
pub fn check_compatibility(server_version: &str) -> Result<()> {
    check_pair(server_version, DRIVER_VERSION)
}

fn check_pair(server_version: &str, driver_version: &str) -> Result<()> {
    let server = parse_version(server_version)?;
    let driver = parse_version(driver_version)?;

    let min_driver = version_of(MIN_DRIVER_VERSION);
    if driver < min_driver {
        return Err(ScribeError::IncompatibleVersion(format!(
            "driver {} is unsupported, {}+ is required",
            driver, min_driver
        )));
    }

    for (server_floor, driver_floor) in VERSION_FLOORS {
        let server_floor = version_of(*server_floor);
        let driver_floor = version_of(*driver_floor);
        if server >= server_floor && driver < driver_floor {
            return Err(ScribeError::IncompatibleVersion(format!(
                "server {} requires driver {}+ (driver is {})",
                server, driver_floor, driver
            )));
        }
    }

    Ok(())
}

fn version_of((major, minor, patch): (u64, u64, u64)) -> Version {
    Version::new(major, minor, patch)
}

/// Lenient version parse: takes the leading `major[.minor[.patch]]` digits
/// and ignores vendor suffixes like `-ent` or `-rc1`.
fn parse_version(raw: &str) -> Result<Version> {
    let lead: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut numbers = lead
        .split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>());

    match numbers.next() {
        Some(Ok(major)) => {
            let minor = match numbers.next() {
                Some(Ok(n)) => n,
                Some(Err(_)) => return Err(unrecognized(raw)),
                None => 0,
            };
            let patch = match numbers.next() {
                Some(Ok(n)) => n,
                Some(Err(_)) => return Err(unrecognized(raw)),
                None => 0,
            };
            Ok(Version::new(major, minor, patch))
        }
        _ => Err(unrecognized(raw)),
    }
}

fn unrecognized(raw: &str) -> ScribeError {
    ScribeError::IncompatibleVersion(format!("unrecognized server version '{}'", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_driver_accepts_supported_servers() {
        for server in ["5.0.15", "6.0.4", "7.0.12", "8.0.0"] {
            check_compatibility(server).unwrap();
        }
    }

    #[test]
    fn test_server_8_needs_driver_3() {
        check_pair("8.0.1", "3.0.0").unwrap();
        let err = check_pair("8.0.1", "2.8.2").unwrap_err();
        assert!(matches!(err, ScribeError::IncompatibleVersion(_)));
        assert!(err.to_string().contains("3.0.0+"));
    }

    #[test]
    fn test_server_7_needs_driver_2_6() {
        check_pair("7.0.0", "2.6.0").unwrap();
        assert!(check_pair("7.0.0", "2.5.9").is_err());
    }

    #[test]
    fn test_server_6_needs_driver_2_3() {
        check_pair("6.0.9", "2.3.0").unwrap();
        assert!(check_pair("6.0.9", "2.2.1").is_err());
    }

    #[test]
    fn test_server_5_needs_driver_2_1() {
        check_pair("5.0.0", "2.1.0").unwrap();
        assert!(check_pair("5.0.0", "2.0.0").is_err());
    }

    #[test]
    fn test_ancient_driver_always_rejected() {
        let err = check_pair("4.4.18", "1.2.5").unwrap_err();
        assert!(err.to_string().contains("unsupported"));
    }

    #[test]
    fn test_old_server_with_current_driver_passes() {
        check_pair("4.4.18", DRIVER_VERSION).unwrap();
    }

    #[test]
    fn test_lenient_parse_two_components() {
        assert_eq!(parse_version("4.4").unwrap(), Version::new(4, 4, 0));
    }

    #[test]
    fn test_lenient_parse_vendor_suffix() {
        assert_eq!(parse_version("5.0.15-ent").unwrap(), Version::new(5, 0, 15));
        assert_eq!(parse_version("8.0.0-rc1").unwrap(), Version::new(8, 0, 0));
    }

    #[test]
    fn test_unparseable_server_version() {
        let err = check_compatibility("not-a-version").unwrap_err();
        assert!(matches!(err, ScribeError::IncompatibleVersion(_)));
        assert!(err.to_string().contains("not-a-version"));
    }
}
