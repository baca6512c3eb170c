//! Endpoint DTOs.

use serde::{Deserialize, Serialize};
use shared_types::OwnershipRecord;

/// `POST /accounts` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAccountRequest {
    /// Account id, 32 bytes hex.
    pub id: String,
    /// Information (viewing) key, hex.
    pub information_key: String,
}

/// Success response for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status: 201 for a new account, 200 for a repeat registration.
    pub status: u16,
    /// Human-readable outcome.
    pub message: String,
}

impl ApiResponse {
    /// 201 Created.
    pub fn created() -> Self {
        Self {
            status: 201,
            message: "created".to_string(),
        }
    }

    /// 200 OK for an account that was already registered with this key.
    pub fn already_registered() -> Self {
        Self {
            status: 200,
            message: "already registered".to_string(),
        }
    }
}

/// `POST /notes` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNotesRequest {
    /// Account id, 32 bytes hex.
    pub id: String,
    /// Hex signature over `message`.
    pub signature: String,
    /// The signed message.
    pub message: String,
}

/// One ownership record as the query endpoint returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    /// Note id, hex.
    pub id: String,
    /// Block the note was placed in.
    pub block_num: u64,
    /// Owning account id, hex.
    pub owner: String,
    /// True for a spend marker.
    pub nullifier: bool,
}

impl From<OwnershipRecord> for NoteView {
    fn from(record: OwnershipRecord) -> Self {
        Self {
            id: record.note_id.to_hex(),
            block_num: record.block_number,
            owner: record.account_id.to_hex(),
            nullifier: record.is_nullifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{AccountId, NoteId};

    #[test]
    fn test_note_view_json_shape() {
        let view = NoteView::from(OwnershipRecord {
            account_id: AccountId::new([0xAA; 32]),
            note_id: NoteId::new([0x01; 32]),
            block_number: 3,
            is_nullifier: true,
        });
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["blockNum"], 3);
        assert_eq!(json["nullifier"], true);
        assert_eq!(json["owner"], "aa".repeat(32));
        assert_eq!(json["id"], "01".repeat(32));
    }

    #[test]
    fn test_register_request_reads_camel_case() {
        let req: RegisterAccountRequest =
            serde_json::from_str(r#"{ "id": "ab", "informationKey": "cd" }"#).unwrap();
        assert_eq!(req.information_key, "cd");
    }
}
