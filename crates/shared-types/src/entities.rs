//! # Core Domain Entities
//!
//! The ledger data model shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `NoteId`, `AccountId`, `ViewingKey`
//! - **Ledger**: `NoteKind`, `NoteRecord`, `Block`
//! - **Ownership**: `OwnershipRecord`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::ParseError;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte hash (BLAKE3 commitment or similar).
pub type Hash = [u8; 32];

/// Block number on the ledger. Numbering starts at 0 and has no gaps.
pub type BlockNumber = u64;

fn parse_hash(s: &str) -> Result<Hash, ParseError> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| ParseError::InvalidLength {
        expected: 32,
        actual: len,
    })
}

macro_rules! commitment_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        pub struct $name(pub Hash);

        impl $name {
            /// Wrap raw bytes.
            pub const fn new(bytes: Hash) -> Self {
                Self(bytes)
            }

            /// Parse from a (optionally `0x`-prefixed) hex string.
            pub fn from_hex(s: &str) -> Result<Self, ParseError> {
                parse_hash(s).map(Self)
            }

            /// Lowercase hex encoding without prefix.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &Hash {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}..)", stringify!($name), &self.to_hex()[..8])
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<Hash> for $name {
            fn from(bytes: Hash) -> Self {
                Self(bytes)
            }
        }
    };
}

commitment_id!(
    /// Commitment identifier of a note record. Globally unique across both
    /// note kinds.
    NoteId
);

commitment_id!(
    /// Commitment identifying a registered account.
    AccountId
);

/// Secret material that lets the ownership test recognize an account's notes.
///
/// Zeroized on drop. `Debug` never prints the key bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ViewingKey(Vec<u8>);

impl ViewingKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Parse from a (optionally `0x`-prefixed) hex string.
    pub fn from_hex(s: &str) -> Result<Self, ParseError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        hex::decode(s)
            .map(Self)
            .map_err(|e| ParseError::InvalidHex(e.to_string()))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for a zero-length key.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for ViewingKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for ViewingKey {}

impl fmt::Debug for ViewingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewingKey(<{} bytes redacted>)", self.0.len())
    }
}

// =============================================================================
// CLUSTER B: THE LEDGER
// =============================================================================

/// Kind of a note record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// An asset/state record created by a transaction.
    Data,
    /// A spend marker for a previously created note.
    Nullifier,
}

/// An opaque note placed on the ledger. Immutable once inside a block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Commitment identifier.
    pub id: NoteId,
    /// Ciphertext/commitment data. Only the ownership test interprets it.
    #[serde_as(as = "Bytes")]
    pub payload: Vec<u8>,
    /// Data or nullifier.
    pub kind: NoteKind,
}

impl NoteRecord {
    /// Create a data note.
    pub fn data(id: NoteId, payload: Vec<u8>) -> Self {
        Self {
            id,
            payload,
            kind: NoteKind::Data,
        }
    }

    /// Create a nullifier note.
    pub fn nullifier(id: NoteId, payload: Vec<u8>) -> Self {
        Self {
            id,
            payload,
            kind: NoteKind::Nullifier,
        }
    }

    /// True if this record is a spend marker.
    pub fn is_nullifier(&self) -> bool {
        self.kind == NoteKind::Nullifier
    }
}

/// One batch produced by one ledger submission.
///
/// Order inside `added_notes` and `removed_notes` carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block number (0-based, gapless).
    pub number: BlockNumber,
    /// Data notes created by the submission.
    pub added_notes: Vec<NoteRecord>,
    /// Nullifier notes emitted by the submission.
    pub removed_notes: Vec<NoteRecord>,
}

impl Block {
    /// Create a block.
    pub fn new(
        number: BlockNumber,
        added_notes: Vec<NoteRecord>,
        removed_notes: Vec<NoteRecord>,
    ) -> Self {
        Self {
            number,
            added_notes,
            removed_notes,
        }
    }

    /// Every note record in the block, data notes first.
    pub fn notes(&self) -> impl Iterator<Item = &NoteRecord> {
        self.added_notes.iter().chain(self.removed_notes.iter())
    }

    /// Total number of note records.
    pub fn note_count(&self) -> usize {
        self.added_notes.len() + self.removed_notes.len()
    }
}

// =============================================================================
// CLUSTER C: OWNERSHIP
// =============================================================================

/// Proof-of-scan that `note_id` in block `block_number` belongs to
/// `account_id`. One per (account, note) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// Owning account.
    pub account_id: AccountId,
    /// Matched note.
    pub note_id: NoteId,
    /// Block the note was placed in.
    pub block_number: BlockNumber,
    /// True when the matched note is a nullifier.
    pub is_nullifier: bool,
}

impl OwnershipRecord {
    /// Build the record for `note` matched in `block_number`.
    pub fn for_match(account_id: AccountId, note: &NoteRecord, block_number: BlockNumber) -> Self {
        Self {
            account_id,
            note_id: note.id,
            block_number,
            is_nullifier: note.is_nullifier(),
        }
    }
}
