use std::path::PathBuf;

use crate::error::BridgeError;

/// The reserved implicit address: "use the ambient connection provided by the
/// execution environment". For the embedded driver that is an in-memory
/// database.
pub const IMPLICIT_URL: &str = "sqlite:default:connection";

/// Where a `SQLite` database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    /// In-memory database, private to the connection.
    Memory,
    /// File-backed database.
    File(PathBuf),
}

/// Parsed connection address for the `SQLite` driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    pub location: SqliteLocation,
}

impl SqliteConfig {
    /// Parse a `sqlite:<subprotocol>:<subname>` address.
    ///
    /// Accepted forms: `sqlite:default:connection` and `sqlite:memory:` for
    /// an in-memory database, `sqlite:file:<path>` for a file-backed one.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ConnectionError` for any other address.
    pub fn from_url(url: &str) -> Result<Self, BridgeError> {
        let rest = url.strip_prefix("sqlite:").ok_or_else(|| {
            BridgeError::ConnectionError(format!("not a sqlite url: '{url}'"))
        })?;

        let location = match rest {
            "default:connection" | "memory:" => SqliteLocation::Memory,
            _ => match rest.strip_prefix("file:") {
                Some(path) if !path.is_empty() => SqliteLocation::File(PathBuf::from(path)),
                _ => {
                    return Err(BridgeError::ConnectionError(format!(
                        "unsupported sqlite url: '{url}'"
                    )));
                }
            },
        };
        Ok(Self { location })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_and_memory_urls() {
        assert_eq!(
            SqliteConfig::from_url(IMPLICIT_URL).unwrap().location,
            SqliteLocation::Memory
        );
        assert_eq!(
            SqliteConfig::from_url("sqlite:memory:").unwrap().location,
            SqliteLocation::Memory
        );
    }

    #[test]
    fn file_url() {
        assert_eq!(
            SqliteConfig::from_url("sqlite:file:/tmp/t.db").unwrap().location,
            SqliteLocation::File(PathBuf::from("/tmp/t.db"))
        );
    }

    #[test]
    fn rejects_foreign_and_malformed_urls() {
        assert!(SqliteConfig::from_url("postgres:host:db").is_err());
        assert!(SqliteConfig::from_url("sqlite:file:").is_err());
        assert!(SqliteConfig::from_url("sqlite:tcp:localhost").is_err());
    }
}
