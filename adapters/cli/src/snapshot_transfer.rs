use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use grid_tactics_core::GameSnapshot;
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "tactics";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "tactics:v1";
/// Delimiter used to separate the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a match snapshot into a single-line transfer string.
pub(crate) fn encode_snapshot(snapshot: &GameSnapshot) -> Result<String, TransferError> {
    let json = serde_json::to_vec(snapshot).map_err(TransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}{FIELD_DELIMITER}{encoded}"))
}

/// Decodes a match snapshot from its transfer string.
pub(crate) fn decode_snapshot(value: &str) -> Result<GameSnapshot, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts
        .next()
        .filter(|domain| !domain.is_empty())
        .ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(TransferError::InvalidEncoding)?;
    serde_json::from_slice(&bytes).map_err(TransferError::InvalidPayload)
}

/// Errors that can occur while encoding or decoding snapshot transfer strings.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot string was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_tactics_core::{
        EntityId, EntityKind, EntitySnapshot, GameAction, MatchResult, TilePos, TurnPhase,
    };

    fn populated() -> GameSnapshot {
        GameSnapshot {
            entities: vec![
                EntitySnapshot {
                    id: EntityId::new(1),
                    kind: EntityKind::Player,
                    position: TilePos::new(2, 3),
                    health: Some(4),
                    max_health: Some(5),
                },
                EntitySnapshot {
                    id: EntityId::new(9),
                    kind: EntityKind::Npc,
                    position: TilePos::new(0, 0),
                    health: None,
                    max_health: None,
                },
            ],
            turn: TurnPhase::Player,
            result: MatchResult::Playing,
            action_log: vec![GameAction::Move {
                entity_id: EntityId::new(1),
                to: TilePos::new(2, 3),
            }],
        }
    }

    #[test]
    fn round_trip_empty_snapshot() {
        let snapshot = GameSnapshot::default();
        let encoded = encode_snapshot(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:")));

        let decoded = decode_snapshot(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn round_trip_populated_snapshot() {
        let snapshot = populated();
        let encoded = encode_snapshot(&snapshot).expect("snapshot encodes");
        assert!(!encoded.contains('\n'));

        let decoded = decode_snapshot(&format!("  {encoded}\n")).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn malformed_strings_are_rejected() {
        assert!(matches!(decode_snapshot("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode_snapshot(":v1:e30"),
            Err(TransferError::MissingPrefix)
        ));
        assert!(matches!(
            decode_snapshot("tactics"),
            Err(TransferError::MissingVersion)
        ));
        assert!(matches!(
            decode_snapshot("tactics:v1"),
            Err(TransferError::MissingPayload)
        ));
        assert!(matches!(
            decode_snapshot("maze:v1:e30"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode_snapshot("tactics:v2:e30"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode_snapshot("tactics:v1:***"),
            Err(TransferError::InvalidEncoding(_))
        ));
        // "e30" is the unpadded base64 of "{}", which lacks every snapshot field.
        assert!(matches!(
            decode_snapshot("tactics:v1:e30"),
            Err(TransferError::InvalidPayload(_))
        ));
    }
}
