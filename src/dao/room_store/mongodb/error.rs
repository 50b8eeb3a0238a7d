use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias of the MongoDB backend.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB room backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// Required environment variable is missing.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// Offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The client could not be built from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The database never answered the initial ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of pings sent.
        attempts: u32,
        /// Last driver error.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An index could not be created.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection name.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading rooms failed.
    #[error("failed to load rooms")]
    LoadRooms {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Writing a room failed.
    #[error("failed to save room `{room_no}`")]
    SaveRoom {
        /// Room number.
        room_no: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Replacing the room snapshot failed.
    #[error("failed to replace the room list")]
    ReplaceRooms {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An update targeted a room that has no document.
    #[error("room `{room_no}` does not exist")]
    MissingRoom {
        /// Requested room.
        room_no: String,
    },
    /// Reading or writing activity entries failed.
    #[error("failed to access the activity log")]
    Activity {
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
