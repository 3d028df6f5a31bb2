//! Announcement Wire Protocol
//!
//! Defines the endpoint and the Data Transfer Objects exchanged between a
//! member and the coordinator. The bodies are serialized as JSON and carried
//! over the mutually-authenticated transport that fronts the coordinator;
//! that transport, not this module, is responsible for confidentiality,
//! integrity and for establishing who the caller is.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Protocol version carried in every request. Any mismatch fails the request.
pub const PROTOCOL_VERSION: u32 = 1;

/// Endpoint receiving announcements.
pub const ENDPOINT_ANNOUNCE: &str = "/announce";

/// Conventional listening port (the year the Faraday cage was invented).
pub const DEFAULT_PORT: u16 = 1836;

/// Header carrying the authenticated principal. The transport in front of
/// the coordinator (an mTLS terminator mapping the client certificate's
/// common name, typically) stamps this onto every forwarded request; the
/// coordinator does no re-authentication of its own.
pub const PRINCIPAL_HEADER: &str = "x-remote-principal";

/// One announcement: declares the caller's current public key and asks for
/// every roster change since `cursor`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceRequest {
    /// Must equal [`PROTOCOL_VERSION`].
    pub version: u32,
    /// The public key the caller currently advertises.
    pub key: String,
    /// Where the caller left off. Ignored when `server_instance` is stale,
    /// because the caller's cursor belongs to a coordinator that no longer
    /// exists.
    pub cursor: u64,
    /// A member the caller also wants resolved in this reply. Empty means
    /// none; absence from the reply means the member no longer exists.
    #[serde(default)]
    pub include_member: String,
    /// The coordinator instance the caller believes it is talking to. Empty
    /// on first contact.
    #[serde(default)]
    pub server_instance: String,
}

/// The coordinator's half of the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnounceResponse {
    /// Principal -> public key for every member revised since the request
    /// cursor, or the whole roster when a delta could not be served.
    pub current_cluster: HashMap<String, String>,
    /// The cursor to present on the next announcement.
    pub cursor: u64,
    /// Identity of this coordinator process.
    pub server_instance: String,
}
