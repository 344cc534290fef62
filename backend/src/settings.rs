//! Server settings loaded via OrthoConfig.
//!
//! Values come from an optional configuration file, `SNAPTRACK_*`
//! environment variables and CLI flags, later layers overriding earlier
//! ones. Accessors apply defaults and validate formats so the bootstrap
//! sees typed values only.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use url::Url;

use crate::domain::DEFAULT_ROOM_CAPACITY;
use crate::outbound::images::{CloudinaryCredentials, DEFAULT_CLOUDINARY_API_BASE};
use crate::outbound::persistence::DEFAULT_POOL_SIZE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:10000";
/// Largest accepted request body, sized for profile picture uploads.
pub const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 5 * 1024 * 1024;

/// Errors raised while interpreting loaded settings.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A required value is missing.
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    /// A value is present but unusable.
    #[error("invalid value for {name}='{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SNAPTRACK")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Cloudinary cloud name.
    pub cloudinary_cloud_name: Option<String>,
    /// Cloudinary API key.
    pub cloudinary_api_key: Option<String>,
    /// Cloudinary API secret.
    pub cloudinary_api_secret: Option<String>,
    /// Override for the Cloudinary REST endpoint.
    pub cloudinary_api_base: Option<String>,
    /// Origin allow-list for WebSocket upgrades.
    #[serde(default, deserialize_with = "one_or_many")]
    pub ws_allowed_origins: Option<Vec<String>>,
    /// Maximum members per location room.
    #[ortho_config(default = DEFAULT_ROOM_CAPACITY)]
    pub room_capacity: usize,
    /// Maximum request body size in bytes.
    pub upload_limit_bytes: Option<usize>,
}

/// Accept a single string or a list. Comma-separated environment values
/// arrive as lists; a lone value arrives as a string.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
            OneOrMany::One(single) => vec![single],
            OneOrMany::Many(list) => list,
        }),
    )
}

impl ServerSettings {
    /// Address to bind, defaulting to `0.0.0.0:10000`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|error: std::net::AddrParseError| SettingsError::Invalid {
            name: "bind_addr",
            value: raw.to_owned(),
            reason: error.to_string(),
        })
    }

    /// Database URL; there is no default.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                name: "database_url",
            })
    }

    pub fn db_pool_size(&self) -> u32 {
        self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    /// Cloudinary credentials when all three parts are configured.
    pub fn cloudinary_credentials(&self) -> Option<CloudinaryCredentials> {
        CloudinaryCredentials::from_parts(
            self.cloudinary_cloud_name.clone(),
            self.cloudinary_api_key.clone(),
            self.cloudinary_api_secret.clone(),
        )
    }

    /// Cloudinary REST base, normalised to end with `/`.
    pub fn cloudinary_api_base(&self) -> Result<Url, SettingsError> {
        let raw = self
            .cloudinary_api_base
            .as_deref()
            .unwrap_or(DEFAULT_CLOUDINARY_API_BASE);
        let normalised = if raw.ends_with('/') {
            raw.to_owned()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalised).map_err(|error| SettingsError::Invalid {
            name: "cloudinary_api_base",
            value: raw.to_owned(),
            reason: error.to_string(),
        })
    }

    /// Parsed WebSocket Origin allow-list; empty means any origin.
    pub fn ws_allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        let Some(entries) = self.ws_allowed_origins.as_deref() else {
            return Ok(Vec::new());
        };
        entries
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                Url::parse(origin).map_err(|error| SettingsError::Invalid {
                    name: "ws_allowed_origins",
                    value: origin.to_owned(),
                    reason: error.to_string(),
                })
            })
            .collect()
    }

    pub fn room_capacity(&self) -> usize {
        self.room_capacity.max(1)
    }

    pub fn upload_limit_bytes(&self) -> usize {
        self.upload_limit_bytes
            .unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 10] = [
        "SNAPTRACK_BIND_ADDR",
        "SNAPTRACK_DATABASE_URL",
        "SNAPTRACK_DB_POOL_SIZE",
        "SNAPTRACK_CLOUDINARY_CLOUD_NAME",
        "SNAPTRACK_CLOUDINARY_API_KEY",
        "SNAPTRACK_CLOUDINARY_API_SECRET",
        "SNAPTRACK_CLOUDINARY_API_BASE",
        "SNAPTRACK_WS_ALLOWED_ORIGINS",
        "SNAPTRACK_ROOM_CAPACITY",
        "SNAPTRACK_UPLOAD_LIMIT_BYTES",
    ];

    fn cleared_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("snaptrack")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok("0.0.0.0:10000".parse().expect("socket addr"))
        );
        assert_eq!(
            settings.database_url(),
            Err(SettingsError::Missing {
                name: "database_url"
            })
        );
        assert_eq!(settings.db_pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.cloudinary_credentials().is_none());
        assert_eq!(settings.ws_allowed_origins(), Ok(Vec::new()));
        assert_eq!(settings.room_capacity(), 50);
        assert_eq!(settings.upload_limit_bytes(), 5 * 1024 * 1024);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("SNAPTRACK_BIND_ADDR", "127.0.0.1:8080"),
            ("SNAPTRACK_DATABASE_URL", "postgres://localhost/snaptrack"),
            ("SNAPTRACK_DB_POOL_SIZE", "4"),
            ("SNAPTRACK_CLOUDINARY_CLOUD_NAME", "demo"),
            ("SNAPTRACK_CLOUDINARY_API_KEY", "key"),
            ("SNAPTRACK_CLOUDINARY_API_SECRET", "secret"),
            (
                "SNAPTRACK_WS_ALLOWED_ORIGINS",
                "http://localhost:3000, https://app.example",
            ),
            ("SNAPTRACK_ROOM_CAPACITY", "3"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Ok("127.0.0.1:8080".parse().expect("socket addr"))
        );
        assert_eq!(
            settings.database_url(),
            Ok("postgres://localhost/snaptrack")
        );
        assert_eq!(settings.db_pool_size(), 4);
        assert_eq!(
            settings
                .cloudinary_credentials()
                .map(|creds| creds.cloud_name),
            Some("demo".to_owned())
        );
        let origins = settings.ws_allowed_origins().expect("origins parse");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[1].as_str(), "https://app.example/");
        assert_eq!(settings.room_capacity(), 3);
    }

    #[rstest]
    fn a_single_origin_is_accepted() {
        let _guard = lock_env(cleared_with(&[(
            "SNAPTRACK_WS_ALLOWED_ORIGINS",
            "https://app.example",
        )]));

        let origins = load_from_empty_args()
            .ws_allowed_origins()
            .expect("origin parses");
        let origins: Vec<_> = origins.iter().map(Url::as_str).collect();
        assert_eq!(origins, ["https://app.example/"]);
    }

    #[rstest]
    fn origin_entries_may_hold_several_urls() {
        let settings = ServerSettings {
            ws_allowed_origins: Some(vec![
                "http://a.example, http://b.example".to_owned(),
                "http://c.example".to_owned(),
            ]),
            ..blank()
        };
        let origins = settings.ws_allowed_origins().expect("origins parse");
        assert_eq!(origins.len(), 3);
    }

    fn blank() -> ServerSettings {
        ServerSettings {
            bind_addr: None,
            database_url: None,
            db_pool_size: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            cloudinary_api_base: None,
            ws_allowed_origins: None,
            room_capacity: DEFAULT_ROOM_CAPACITY,
            upload_limit_bytes: None,
        }
    }

    #[rstest]
    #[case("not-an-addr")]
    #[case("localhost")]
    fn invalid_bind_addr_is_reported(#[case] raw: &str) {
        let settings = ServerSettings {
            bind_addr: Some(raw.to_owned()),
            ..blank()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::Invalid {
                name: "bind_addr",
                ..
            })
        ));
    }

    #[rstest]
    fn invalid_origin_is_reported() {
        let settings = ServerSettings {
            ws_allowed_origins: Some(vec!["http://ok.example".to_owned(), "nope".to_owned()]),
            ..blank()
        };
        assert!(matches!(
            settings.ws_allowed_origins(),
            Err(SettingsError::Invalid { value, .. }) if value == "nope"
        ));
    }

    #[rstest]
    #[case(None, "https://api.cloudinary.com/v1_1/")]
    #[case(Some("http://127.0.0.1:9000/v1_1"), "http://127.0.0.1:9000/v1_1/")]
    fn cloudinary_base_gets_trailing_slash(#[case] raw: Option<&str>, #[case] expected: &str) {
        let settings = ServerSettings {
            cloudinary_api_base: raw.map(str::to_owned),
            ..blank()
        };
        assert_eq!(
            settings.cloudinary_api_base().expect("base parses").as_str(),
            expected
        );
    }

    #[rstest]
    fn zero_capacity_and_limit_are_clamped() {
        let settings = ServerSettings {
            room_capacity: 0,
            upload_limit_bytes: Some(0),
            ..blank()
        };
        assert_eq!(settings.room_capacity(), 1);
        assert_eq!(settings.upload_limit_bytes(), 1);
    }
}
