//! Binary serialization and deserialization of compiled rule tables.
//!
//! Compiling a table from DSL text is cheap, but deployments that ship a
//! fixed questionnaire can cache the compiled form next to the binary. The
//! format is a 32-byte fixed header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"CFRT"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! The format version must match exactly; the engine version is
//! informational. Decoded rules go through the same compilation pass as
//! freshly authored ones, so a tampered payload with a valid checksum still
//! cannot produce a cyclic or malformed table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{CompileError, Condition, Rule, RuleTable};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"CFRT";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`RuleTable`] to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule table: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("payload of {0} bytes exceeds the format limit")]
    PayloadTooLarge(usize),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`RuleTable`] from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a condform binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("metadata says {expected} rules but payload has {actual}")]
    RuleCountMismatch { expected: usize, actual: usize },

    #[error("validation failed: {0}")]
    Validation(#[from] CompileError),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedTable {
    metadata: TableMetadata,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableMetadata {
    rule_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    source: String,
    condition: SerializedCondition,
    targets: Vec<String>,
    indent: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedCondition {
    OneOf(Vec<String>),
    AtLeast(i64),
    Never,
}

impl From<&Condition> for SerializedCondition {
    fn from(condition: &Condition) -> Self {
        match condition {
            Condition::OneOf(values) => Self::OneOf(values.clone()),
            Condition::AtLeast(min) => Self::AtLeast(*min),
            Condition::Never => Self::Never,
        }
    }
}

impl From<SerializedRule> for Rule {
    fn from(rule: SerializedRule) -> Self {
        let (values, min_value) = match rule.condition {
            SerializedCondition::OneOf(values) => (Some(values), None),
            SerializedCondition::AtLeast(min) => (None, Some(min)),
            SerializedCondition::Never => (None, None),
        };
        Rule {
            source: rule.source,
            values,
            min_value,
            targets: rule.targets,
            indent: rule.indent,
        }
    }
}

fn table_to_serialized(table: &RuleTable, source_text: Option<&str>) -> SerializedTable {
    let source_digest = source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes());

    let rules = table
        .rules
        .iter()
        .map(|r| SerializedRule {
            source: r.source.to_string(),
            condition: SerializedCondition::from(&r.condition),
            targets: r.targets.iter().map(ToString::to_string).collect(),
            indent: r.indent,
        })
        .collect();

    SerializedTable {
        metadata: TableMetadata {
            rule_count: table.rules.len(),
            source_digest,
        },
        rules,
    }
}

fn serialized_to_table(ser: SerializedTable) -> Result<RuleTable, DeserializeError> {
    if ser.metadata.rule_count != ser.rules.len() {
        return Err(DeserializeError::RuleCountMismatch {
            expected: ser.metadata.rule_count,
            actual: ser.rules.len(),
        });
    }
    let rules: Vec<Rule> = ser.rules.into_iter().map(Rule::from).collect();
    Ok(crate::compile::compile(&rules)?)
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) -> Result<(), SerializeError> {
    let payload_len =
        u32::try_from(payload.len()).map_err(|_| SerializeError::PayloadTooLarge(payload.len()))?;
    let hash = blake3::hash(payload);

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash.as_bytes()[..16]);
    Ok(())
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

/// The BLAKE3 digest of the DSL text a serialized table was built from, if
/// one was recorded. Compare it with the hash of the current text to detect
/// a stale cache without recompiling.
///
/// # Errors
///
/// Returns [`DeserializeError`] on format or integrity failure.
pub fn source_digest(bytes: &[u8]) -> Result<Option<[u8; 32]>, DeserializeError> {
    let serialized = decode_payload(bytes)?;
    Ok(serialized.metadata.source_digest)
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(
    table: &RuleTable,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = table_to_serialized(table, source_text);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload)?;
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode_payload(bytes: &[u8]) -> Result<SerializedTable, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedTable, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    Ok(serialized)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RuleTable, DeserializeError> {
    serialized_to_table(decode_payload(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleTableBuilder;

    fn sample() -> RuleTable {
        RuleTableBuilder::new()
            .rule("entree_plain_pied", |r| {
                r.values(["False"])
                    .targets(["entree_marches", "entree_ascenseur"])
                    .indent(1)
            })
            .rule("accueil_chambre_nombre_accessibles", |r| {
                r.min_value(1).target("accueil_chambre_douche_siege")
            })
            .compile()
            .unwrap()
    }

    #[test]
    fn header_layout() {
        let payload = b"test payload data";
        let mut buf = Vec::new();
        write_header(&mut buf, payload).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);
        assert_eq!(&buf[0..4], MAGIC);

        let (format_version, payload_len, hash) = read_header(&buf).unwrap();
        assert_eq!(format_version, FORMAT_VERSION);
        assert_eq!(payload_len as usize, payload.len());
        assert_eq!(&hash, &blake3::hash(payload).as_bytes()[..16]);
    }

    #[test]
    fn header_bad_magic() {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(b"OORO");
        assert!(matches!(read_header(&buf), Err(DeserializeError::BadMagic)));
    }

    #[test]
    fn header_too_short() {
        assert!(matches!(
            read_header(&[0u8; 10]),
            Err(DeserializeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn decode_restores_table() {
        let table = sample();
        let bytes = encode(&table, None).unwrap();
        assert_eq!(decode(&bytes).unwrap(), table);
    }

    #[test]
    fn condition_maps_to_wire() {
        assert!(matches!(
            SerializedCondition::from(&Condition::AtLeast(3)),
            SerializedCondition::AtLeast(3)
        ));
        assert!(matches!(
            SerializedCondition::from(&Condition::Never),
            SerializedCondition::Never
        ));
    }

    #[test]
    fn digest_recorded_when_given() {
        let text = "rule a in [\"True\"]: b\n";
        let table = RuleTable::from_dsl(text).unwrap();
        let bytes = encode(&table, Some(text)).unwrap();
        assert_eq!(
            source_digest(&bytes).unwrap(),
            Some(*blake3::hash(text.as_bytes()).as_bytes())
        );

        let bytes = encode(&table, None).unwrap();
        assert_eq!(source_digest(&bytes).unwrap(), None);
    }

    #[test]
    fn rule_count_mismatch_rejected() {
        let mut ser = table_to_serialized(&sample(), None);
        ser.metadata.rule_count = 5;
        assert!(matches!(
            serialized_to_table(ser),
            Err(DeserializeError::RuleCountMismatch { expected: 5, actual: 2 })
        ));
    }

    #[test]
    fn cyclic_payload_rejected() {
        let ser = SerializedTable {
            metadata: TableMetadata {
                rule_count: 2,
                source_digest: None,
            },
            rules: vec![
                SerializedRule {
                    source: "a".into(),
                    condition: SerializedCondition::OneOf(vec!["True".into()]),
                    targets: vec!["b".into()],
                    indent: 0,
                },
                SerializedRule {
                    source: "b".into(),
                    condition: SerializedCondition::OneOf(vec!["True".into()]),
                    targets: vec!["a".into()],
                    indent: 0,
                },
            ],
        };
        assert!(matches!(
            serialized_to_table(ser),
            Err(DeserializeError::Validation(CompileError::CyclicDependency { .. }))
        ));
    }
}
