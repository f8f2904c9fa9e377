//! Attestation index wire types.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Query returning every attestation issued under a schema to a recipient.
pub const VILLAGER_QUERY: &str = r#"
query Attestations($where: AttestationWhereInput) {
  attestations(where: $where) {
    id
    attester
    recipient
    decodedDataJson
    timeCreated
    revoked
  }
}
"#;

/// Errors surfaced when the index cannot answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Transport failure, non-2xx status, or unparseable body.
    #[error("attestation index request failed")]
    Unsuccessful,

    /// The index answered but returned no data for the query.
    #[error("attestation index returned an empty payload")]
    NullPayload,
}

/// Filter applied to the attestation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttestationFilter {
    pub schema_id: B256,
    pub recipient: Address,
}

impl AttestationFilter {
    pub fn new(schema_id: B256, recipient: Address) -> Self {
        Self {
            schema_id,
            recipient,
        }
    }

    /// GraphQL variables for [`VILLAGER_QUERY`].
    ///
    /// The indexer stores checksummed recipients and compares exactly.
    pub fn to_variables(&self) -> Value {
        json!({
            "where": {
                "schemaId": { "equals": self.schema_id.to_string() },
                "recipient": { "equals": self.recipient.to_checksum(None) },
            }
        })
    }
}

/// One indexed attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationRecord {
    pub id: String,
    #[serde(default)]
    pub attester: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub decoded_data_json: String,
    #[serde(default)]
    pub time_created: u64,
    #[serde(default)]
    pub revoked: bool,
}

/// `data` member of the GraphQL response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttestationPayload {
    pub attestations: Vec<AttestationRecord>,
}

/// Result of one index query.
///
/// `success == false` and `response == None` are ordinary answers that the
/// caller must handle, not exceptional conditions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexQueryOutcome {
    pub success: bool,
    pub response: Option<AttestationPayload>,
}

impl IndexQueryOutcome {
    pub fn ok(payload: AttestationPayload) -> Self {
        Self {
            success: true,
            response: Some(payload),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            response: None,
        }
    }

    pub fn null_payload() -> Self {
        Self {
            success: true,
            response: None,
        }
    }

    /// Collapse into the payload or the matching error.
    pub fn into_result(self) -> Result<AttestationPayload, IndexError> {
        if !self.success {
            return Err(IndexError::Unsuccessful);
        }
        self.response.ok_or(IndexError::NullPayload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};

    #[test]
    fn test_variables_use_checksummed_recipient() {
        let filter = AttestationFilter::new(
            b256!("00000000000000000000000000000000000000000000000000000000000000aa"),
            address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266"),
        );
        let vars = filter.to_variables();
        assert_eq!(
            vars["where"]["recipient"]["equals"],
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(
            vars["where"]["schemaId"]["equals"],
            "0x00000000000000000000000000000000000000000000000000000000000000aa"
        );
    }

    #[test]
    fn test_outcome_into_result() {
        assert_eq!(IndexQueryOutcome::failed().into_result(), Err(IndexError::Unsuccessful));
        assert_eq!(
            IndexQueryOutcome::null_payload().into_result(),
            Err(IndexError::NullPayload)
        );
        let payload = IndexQueryOutcome::ok(AttestationPayload::default())
            .into_result()
            .unwrap();
        assert!(payload.attestations.is_empty());
    }

    #[test]
    fn test_record_parses_indexer_shape() {
        let record: AttestationRecord = serde_json::from_str(
            r#"{"id":"0x01","attester":"0xa","recipient":"0xb","decodedDataJson":"[]","timeCreated":1717000000,"revoked":false}"#,
        )
        .unwrap();
        assert_eq!(record.time_created, 1717000000);
        assert_eq!(record.decoded_data_json, "[]");
    }
}
