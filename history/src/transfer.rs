//! Single-line encoding of a complete history, the unit of persistence.
//!
//! The blob is `ledger:v1:<payload>` where the payload is the unpadded base64
//! encoding of the history serialised as JSON. Decoding fails closed: any
//! blob that does not describe a consistent history is rejected.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use monopoly_ledger_core::{PlayerName, PropertyName, RosterError, HOTEL};
use thiserror::Error;

use crate::History;

const BLOB_DOMAIN: &str = "ledger";
const BLOB_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded payload.
pub const BLOB_HEADER: &str = "ledger:v1";

const FIELD_DELIMITER: char = ':';

/// Errors raised while decoding a history blob. Every variant means the
/// persisted state is corrupt and must not be used.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The blob was empty or contained only whitespace.
    #[error("history blob was empty")]
    EmptyPayload,
    /// The blob did not contain a version segment.
    #[error("history blob is missing the version")]
    MissingVersion,
    /// The blob did not contain a payload segment.
    #[error("history blob is missing the payload")]
    MissingPayload,
    /// The blob used an unexpected prefix.
    #[error("history prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The blob used an unsupported version.
    #[error("history version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode history payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload was not a serialised history.
    #[error("could not parse history payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    /// The history contained no entries.
    #[error("history contains no entries")]
    EmptyHistory,
    /// The pointer addressed an entry that does not exist.
    #[error("history pointer {pointer} is outside the {len} stored entries")]
    PointerOutOfRange {
        /// Stored pointer.
        pointer: usize,
        /// Number of stored entries.
        len: usize,
    },
    /// The stored roster is invalid.
    #[error("history roster is invalid: {0}")]
    InvalidRoster(#[from] RosterError),
    /// A snapshot lacks the account of a roster participant.
    #[error("entry {index} has no account for `{participant}`")]
    MissingAccount {
        /// Index of the offending entry.
        index: usize,
        /// Participant without an account.
        participant: PlayerName,
    },
    /// A holding violates the house or mortgage invariants.
    #[error("entry {index} holds `{property}` in an impossible state")]
    InvalidHolding {
        /// Index of the offending entry.
        index: usize,
        /// Property whose holding is invalid.
        property: PropertyName,
    },
    /// A property is held by more than one participant.
    #[error("entry {index} lists `{property}` under several owners")]
    SharedHolding {
        /// Index of the offending entry.
        index: usize,
        /// Property held more than once.
        property: PropertyName,
    },
    /// A holding refers to a property missing from the catalog.
    #[error("entry {index} holds `{property}`, which is not in the catalog")]
    UnknownProperty {
        /// Index of the offending entry.
        index: usize,
        /// Property missing from the catalog.
        property: PropertyName,
    },
}

/// Encodes the history into a single-line string.
#[must_use]
pub fn encode(history: &History) -> String {
    let json = serde_json::to_vec(history).expect("history serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!("{BLOB_HEADER}{FIELD_DELIMITER}{encoded}")
}

/// Decodes and validates a history from its string representation.
pub fn decode(value: &str) -> Result<History, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts.next().unwrap_or_default();
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != BLOB_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != BLOB_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let history: History = serde_json::from_slice(&bytes)?;
    validate(&history)?;
    Ok(history)
}

fn validate(history: &History) -> Result<(), TransferError> {
    if history.stack.is_empty() {
        return Err(TransferError::EmptyHistory);
    }
    if history.pointer >= history.stack.len() {
        return Err(TransferError::PointerOutOfRange {
            pointer: history.pointer,
            len: history.stack.len(),
        });
    }
    history.roster.validate()?;

    for (index, entry) in history.stack.iter().enumerate() {
        for participant in history.roster.participants() {
            if !entry.snapshot.contains(participant.as_str()) {
                return Err(TransferError::MissingAccount {
                    index,
                    participant: participant.clone(),
                });
            }
        }

        let mut seen = Vec::new();
        for (_, account) in entry.snapshot.accounts() {
            for (property, holding) in &account.holdings {
                if holding.houses > HOTEL || (holding.is_built() && holding.mortgaged) {
                    return Err(TransferError::InvalidHolding {
                        index,
                        property: property.clone(),
                    });
                }
                if seen.contains(&property) {
                    return Err(TransferError::SharedHolding {
                        index,
                        property: property.clone(),
                    });
                }
                seen.push(property);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_ledger_core::{GameSnapshot, PlayerAccount, PropertyHolding, Roster};

    fn history() -> History {
        let roster = Roster::new(vec![PlayerName::from("Sofia")], PlayerName::from("Bank"))
            .expect("valid roster");
        let mut snapshot = GameSnapshot::new();
        let mut sofia = PlayerAccount::with_money(1500);
        let _ = sofia
            .holdings
            .insert(PropertyName::from("Strand"), PropertyHolding::default());
        let _ = snapshot.insert(PlayerName::from("Sofia"), sofia);
        let _ = snapshot.insert(PlayerName::from("Bank"), PlayerAccount::with_money(19080));
        History::new(roster, snapshot)
    }

    fn encode_raw(json: &str) -> String {
        format!("{BLOB_HEADER}:{}", STANDARD_NO_PAD.encode(json))
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let mut original = history();
        let _ = original.commit(original.current().clone(), "again".to_owned());
        let _ = original.move_by(-1);

        let encoded = encode(&original);
        assert!(encoded.starts_with(&format!("{BLOB_HEADER}:")));

        let decoded = decode(&encoded).expect("blob decodes");
        assert_eq!(decoded, original);
        assert_eq!(encode(&decoded), encoded);
    }

    #[test]
    fn malformed_envelopes_are_rejected() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(decode("ledger"), Err(TransferError::MissingVersion)));
        assert!(matches!(decode("ledger:v1"), Err(TransferError::MissingPayload)));
        assert!(matches!(
            decode("game:v1:abc"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "game"
        ));
        assert!(matches!(
            decode("ledger:v9:abc"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v9"
        ));
        assert!(matches!(
            decode("ledger:v1:!!!"),
            Err(TransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            decode(&encode_raw("{\"pointer\":0}")),
            Err(TransferError::InvalidPayload(_))
        ));
    }

    #[test]
    fn inconsistent_histories_are_rejected() {
        let mut broken = history();
        broken.pointer = 3;
        assert!(matches!(
            decode(&encode(&broken)),
            Err(TransferError::PointerOutOfRange { pointer: 3, len: 1 })
        ));

        let mut broken = history();
        broken.stack.clear();
        assert!(matches!(
            decode(&encode(&broken)),
            Err(TransferError::EmptyHistory)
        ));

        let mut broken = history();
        let mut without_bank = GameSnapshot::new();
        if let Some(sofia) = broken.current().account("Sofia") {
            let _ = without_bank.insert(PlayerName::from("Sofia"), sofia.clone());
        }
        broken.stack[0].snapshot = without_bank;
        assert!(matches!(
            decode(&encode(&broken)),
            Err(TransferError::MissingAccount { index: 0, participant })
                if participant.as_str() == "Bank"
        ));
    }

    #[test]
    fn impossible_holdings_are_rejected() {
        let mut broken = history();
        if let Some(account) = broken.stack[0].snapshot.account_mut("Sofia") {
            let _ = account.holdings.insert(
                PropertyName::from("Strand"),
                PropertyHolding {
                    mortgaged: true,
                    houses: 2,
                },
            );
        }
        assert!(matches!(
            decode(&encode(&broken)),
            Err(TransferError::InvalidHolding { index: 0, .. })
        ));

        let mut shared = history();
        if let Some(bank) = shared.stack[0].snapshot.account_mut("Bank") {
            let _ = bank
                .holdings
                .insert(PropertyName::from("Strand"), PropertyHolding::default());
        }
        assert!(matches!(
            decode(&encode(&shared)),
            Err(TransferError::SharedHolding { index: 0, .. })
        ));
    }
}
