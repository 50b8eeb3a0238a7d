//! Error types of the CouchDB room backend.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CouchDaoError`] failures.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while interacting with CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// Required environment variable is missing.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar {
        /// Variable name.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a database operation.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        /// Database name.
        database: String,
        /// Returned status.
        status: StatusCode,
    },
    /// A request could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        /// Request path relative to the database.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB returned an unexpected status code for a document endpoint.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus {
        /// Request path relative to the database.
        path: String,
        /// Returned status.
        status: StatusCode,
    },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        /// Request path relative to the database.
        path: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Decoding a JSON value into the expected document failed.
    #[error("failed to deserialize CouchDB document for `{path}`")]
    DeserializeValue {
        /// Request path relative to the database.
        path: String,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// A document could not be encoded to JSON.
    #[error("failed to encode CouchDB document `{path}`")]
    EncodeDocument {
        /// Document id.
        path: String,
        /// Underlying encoding error.
        #[source]
        source: serde_json::Error,
    },
    /// Some documents of a `_bulk_docs` request were refused.
    #[error("CouchDB refused {failed} document(s) of a bulk write")]
    BulkWrite {
        /// Number of refused documents.
        failed: usize,
    },
    /// An update targeted a room that has no document.
    #[error("room `{room_no}` does not exist")]
    MissingRoom {
        /// Requested room.
        room_no: String,
    },
}
