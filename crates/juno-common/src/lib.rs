// Shared data types and protocol conventions used across crates.
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(String),
}

pub mod ids {
    // Strongly typed IDs to avoid mixing resource namespaces at compile time.
    use super::{Error, Result};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::str::FromStr;
    use uuid::Uuid;

    macro_rules! id_type {
        ($name:ident) => {
            #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
            pub struct $name(Uuid);

            impl $name {
                // Generate a new random ID for this namespace.
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }

                // Wrap an existing UUID when decoding from storage.
                pub fn from_uuid(uuid: Uuid) -> Self {
                    Self(uuid)
                }

                // Expose the underlying UUID for interoperability.
                pub fn as_uuid(&self) -> Uuid {
                    self.0
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $name {
                type Err = Error;

                fn from_str(input: &str) -> Result<Self> {
                    // Preserve the original input for clearer error messages.
                    let uuid =
                        Uuid::parse_str(input).map_err(|_| Error::InvalidId(input.into()))?;
                    Ok(Self(uuid))
                }
            }
        };
    }

    id_type!(ConnectionId);
    id_type!(ProducerId);
    id_type!(ConsumerId);
    id_type!(RecordId);
}

/// Probe-protocol conventions shared by the control-plane prober and the
/// transport-node responder.
///
/// Every transport node that hosts client sessions subscribes to
/// [`probe::CONNECTION_STATUS_SUBJECT`]. A probe carries a raw connection ID
/// as its payload and names a transient reply subject; a node replies on that
/// subject if one of its local connection names embeds the probed ID. The
/// reply payload content is irrelevant — receiving anything at all means the
/// connection is alive.
pub mod probe {
    use uuid::Uuid;

    /// Broadcast subject every session-hosting transport node listens on.
    pub const CONNECTION_STATUS_SUBJECT: &str = "$juno_connection_status";

    /// Payload sent back for a matching probe. Receivers ignore the content.
    pub const PROBE_REPLY_PAYLOAD: &[u8] = b"connection-exists";

    /// Separator between the connection ID and the client-chosen label in a
    /// transport-level connection name.
    pub const CONNECTION_NAME_SEPARATOR: &str = "::";

    /// Derive a fresh reply subject for a single probe of `subject`. The
    /// random token keeps concurrent probes from ever sharing a subject.
    pub fn reply_subject(subject: &str) -> String {
        format!("{}_reply{}", subject, Uuid::new_v4().simple())
    }

    /// Compose a transport-level connection name from an ID and a client label.
    pub fn connection_name(connection_id: &str, label: &str) -> String {
        format!("{connection_id}{CONNECTION_NAME_SEPARATOR}{label}")
    }

    /// Extract the connection-ID part of a transport-level connection name.
    /// Names without a separator are treated as a bare ID.
    pub fn connection_id_part(name: &str) -> &str {
        name.split_once(CONNECTION_NAME_SEPARATOR)
            .map(|(id, _)| id)
            .unwrap_or(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    pub max_payload_bytes: usize,
    pub max_subscriber_queue: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        // Defaults are conservative for local/dev usage.
        Self {
            max_payload_bytes: 1024 * 1024,
            max_subscriber_queue: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, LimitsConfig, ids::ConnectionId, probe};
    use std::str::FromStr;

    #[test]
    fn connection_id_round_trip() {
        // IDs should serialize and parse without loss.
        let id = ConnectionId::new();
        let parsed = ConnectionId::from_str(&id.to_string()).expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn connection_id_rejects_invalid_input() {
        let err = ConnectionId::from_str("not-a-uuid").expect_err("invalid");
        assert!(matches!(err, Error::InvalidId(s) if s == "not-a-uuid"));
    }

    #[test]
    fn reply_subjects_are_scoped_and_unique() {
        let first = probe::reply_subject(probe::CONNECTION_STATUS_SUBJECT);
        let second = probe::reply_subject(probe::CONNECTION_STATUS_SUBJECT);
        assert!(first.starts_with(probe::CONNECTION_STATUS_SUBJECT));
        assert_ne!(first, second);
    }

    #[test]
    fn connection_name_round_trip() {
        let id = ConnectionId::new();
        let name = probe::connection_name(&id.to_string(), "orders-service");
        assert_eq!(probe::connection_id_part(&name), id.to_string());
    }

    #[test]
    fn connection_id_part_handles_bare_ids() {
        assert_eq!(probe::connection_id_part("bare-id"), "bare-id");
    }

    #[test]
    fn limits_defaults_are_positive() {
        let limits = LimitsConfig::default();
        assert!(limits.max_payload_bytes > 0);
        assert!(limits.max_subscriber_queue > 0);
    }
}
