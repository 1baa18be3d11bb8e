use crate::store::{Step, StoreError};
use mongodb::error::Error as MongoError;
use std::fmt;
use std::result::Result as StdResult;
use thiserror::Error;

/// Which side of the migration an endpoint plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// origin database, only read.
    Source,
    /// target database, cleared and written.
    Destination,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Source => f.write_str("source"),
            Role::Destination => f.write_str("destination"),
        }
    }
}

/// Errors raised while configuring or running a migration.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// destination uri is not configured.
    #[error("Destination mongodb uri is missing, set `{key}` in environment or `[dst] url` in config file")]
    MissingDestination {
        /// environment key which should hold the uri.
        key: &'static str,
    },
    /// config file can't be read.
    #[error("Read config file {path:?} failed")]
    ConfigRead {
        /// config file path.
        path: String,
        /// io error detail.
        #[source]
        detail: std::io::Error,
    },
    /// config file is not valid toml.
    #[error("Parse config file {path:?} failed")]
    ConfigParse {
        /// config file path.
        path: String,
        /// toml error detail.
        #[source]
        detail: toml::de::Error,
    },
    /// endpoint can't be reached.
    #[error("Connect to {role} mongodb failed, connection string: {uri:?}, detailed: {detail}")]
    ConnectError {
        /// which endpoint failed.
        role: Role,
        /// masked connection string.
        uri: String,
        /// driver error.
        #[source]
        detail: MongoError,
    },
    /// collections of source can't be listed.
    #[error("List source collections failed, detailed: {detail}")]
    ListError {
        /// store error.
        #[source]
        detail: StoreError,
    },
    /// one step of a collection copy failed.
    #[error("{step} collection {coll:?} failed, detailed: {detail}")]
    CollectionError {
        /// failed step.
        step: Step,
        /// collection name.
        coll: String,
        /// store error.
        #[source]
        detail: StoreError,
    },
}

impl MigrateError {
    /// true when the error is raised before any connection is made.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            MigrateError::MissingDestination { .. }
                | MigrateError::ConfigRead { .. }
                | MigrateError::ConfigParse { .. }
        )
    }
}

/// Result type of acadify migrate.
pub type Result<T> = StdResult<T, MigrateError>;
