//! MongoDB connection management
//!
//! Connection options are assembled structurally through `ClientOptions`
//! (`ServerAddress` + `Credential`), never by concatenating a URI string, so
//! credentials containing `@`, `:`, `/` or `%` need no escaping. The
//! connection is verified with a ping before any write is attempted.

use bson::doc;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Database};
use scribe_common::{Result, ScribeError};
use std::time::Duration;
use tracing::{debug, info};

use crate::credentials::{self, Credentials};

/// Host used when the parameter record leaves `login_host` unset
pub const DEFAULT_HOST: &str = "localhost";

/// Port used when the parameter record leaves `login_port` unset
pub const DEFAULT_PORT: u16 = 27017;

/// Application name reported to the server
const APP_NAME: &str = "scribe";

// One task per process: fail fast instead of waiting out long driver defaults
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection parameters taken from the host's parameter record
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Database holding the login credentials (`Credential.source`)
    pub auth_database: Option<String>,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: None,
            password: None,
            auth_database: None,
        }
    }
}

// Manual impl so the password never lands in logs
impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth_database", &self.auth_database)
            .finish()
    }
}

impl ConnectionParams {
    /// Enforces the credential invariant before any connection attempt
    ///
    /// A complete user/password pair is used as given. An incomplete or
    /// absent pair falls back to `~/.mongodb.cnf`; a missing fallback is only
    /// an error when one half of the pair was supplied explicitly.
    pub fn resolve_credentials(&mut self) -> Result<()> {
        self.resolve_credentials_with(credentials::load_default_credentials())
    }

    fn resolve_credentials_with(&mut self, fallback: Option<Credentials>) -> Result<()> {
        match (self.user.is_some(), self.password.is_some()) {
            (true, true) => Ok(()),
            (false, false) => {
                if let Some(creds) = fallback {
                    debug!("using fallback credentials for user {}", creds.user);
                    self.user = Some(creds.user);
                    self.password = Some(creds.password);
                }
                Ok(())
            }
            (user_supplied, _) => {
                if let Some(creds) = fallback {
                    debug!("replacing partial login pair with fallback credentials");
                    self.user = Some(creds.user);
                    self.password = Some(creds.password);
                    return Ok(());
                }
                Err(ScribeError::Credential(
                    if user_supplied {
                        "login_user supplied without login_password"
                    } else {
                        "login_password supplied without login_user"
                    }
                    .to_string(),
                ))
            }
        }
    }

    /// True when a complete login pair is present
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.password.is_some()
    }
}

/// A ping-verified MongoDB connection
pub struct Connection {
    client: Client,
}

impl Connection {
    /// Connects to the server described by `params`
    ///
    /// Client construction failures surface as `Driver` errors (nothing was
    /// dialed yet); an unreachable server or rejected authentication
    /// surfaces as `Connection`.
    pub async fn establish(params: &ConnectionParams) -> Result<Self> {
        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: params.host.clone(),
            port: Some(params.port),
        }];
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        if let (Some(user), Some(password)) = (&params.user, &params.password) {
            options.credential = Some(
                Credential::builder()
                    .username(user.clone())
                    .password(password.clone())
                    .source(params.auth_database.clone())
                    .build(),
            );
        }

        let client =
            Client::with_options(options).map_err(|e| ScribeError::Driver(e.to_string()))?;

        let connection = Self { client };
        connection.ping().await?;
        info!(
            "connected to {}:{} ({})",
            params.host,
            params.port,
            if params.is_authenticated() {
                "authenticated"
            } else {
                "unauthenticated"
            }
        );
        Ok(connection)
    }

    /// Get a database handle by name
    pub fn database(&self, name: &str) -> Database {
        self.client.database(name)
    }

    /// Check that the server is reachable by pinging it
    pub async fn ping(&self) -> Result<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ScribeError::Connection(format!("unable to connect to database: {}", e)))?;
        Ok(())
    }

    /// Fetch the server version string via `buildInfo`
    ///
    /// Runs against `admin` and needs no authentication, so it can be used
    /// for the compatibility check right after connecting.
    pub async fn server_version(&self) -> Result<String> {
        let info = self
            .client
            .database("admin")
            .run_command(doc! { "buildInfo": 1 })
            .await
            .map_err(|e| ScribeError::Connection(format!("unable to read buildInfo: {}", e)))?;

        let version = info
            .get_str("version")
            .map_err(|e| ScribeError::Connection(format!("buildInfo without version: {}", e)))?;
        Ok(version.to_string())
    }
}
