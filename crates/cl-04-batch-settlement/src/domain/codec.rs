//! # Canonical Batch Codec
//!
//! Payloads are bincode-encoded [`BatchPayload`] values and are identified
//! by the keccak256 of their exact bytes. Decoding rejects any byte string
//! that does not re-encode to itself, so one batch has exactly one encoding
//! and one hash.

use super::entities::{BatchPayload, SettlementBatch, WithdrawalBatch};
use super::errors::BatchError;
use cl_02_authentication::keccak256;
use shared_types::Hash;

/// A decoded payload together with the hash of its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    pub hash: Hash,
    pub payload: BatchPayload,
}

impl EncodedBatch {
    pub fn decode(bytes: &[u8]) -> Result<Self, BatchError> {
        let payload: BatchPayload =
            bincode::deserialize(bytes).map_err(|e| BatchError::Malformed(e.to_string()))?;

        let canonical = encode_payload(&payload)?;
        if canonical != bytes {
            return Err(BatchError::Malformed(format!(
                "non-canonical encoding ({} bytes, canonical {})",
                bytes.len(),
                canonical.len()
            )));
        }

        Ok(Self {
            hash: payload_hash(bytes),
            payload,
        })
    }

    pub fn into_settlement(self) -> Result<(Hash, SettlementBatch), BatchError> {
        match self.payload {
            BatchPayload::Settlement(batch) => Ok((self.hash, batch)),
            other => Err(BatchError::UnexpectedPayload {
                expected: "settlement",
                actual: other.kind(),
            }),
        }
    }

    pub fn into_withdrawals(self) -> Result<(Hash, WithdrawalBatch), BatchError> {
        match self.payload {
            BatchPayload::Withdrawals(batch) => Ok((self.hash, batch)),
            other => Err(BatchError::UnexpectedPayload {
                expected: "withdrawals",
                actual: other.kind(),
            }),
        }
    }
}

/// Canonical bytes of a payload.
pub fn encode_payload(payload: &BatchPayload) -> Result<Vec<u8>, BatchError> {
    bincode::serialize(payload).map_err(|e| BatchError::Malformed(e.to_string()))
}

/// Content hash of payload bytes.
pub fn payload_hash(bytes: &[u8]) -> Hash {
    keccak256(bytes)
}
