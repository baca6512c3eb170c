//! Ed25519 request verification.
//!
//! The verifying key is derived from the account's information key, so only
//! a holder of that key can produce an accepted signature.

use crate::ports::RequestVerifier;
use shared_crypto::{verify_request, RequestSignature};
use shared_types::{AccountId, ViewingKey};
use tracing::debug;

/// Reference [`RequestVerifier`] built on `shared_crypto::verify_request`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519RequestVerifier;

impl RequestVerifier for Ed25519RequestVerifier {
    fn verify(&self, account: &AccountId, key: &ViewingKey, message: &[u8], signature: &[u8]) -> bool {
        let signature = match RequestSignature::from_slice(signature) {
            Ok(sig) => sig,
            Err(e) => {
                debug!("[th-05] Rejecting signature for {}: {}", account, e);
                return false;
            }
        };
        verify_request(key.as_bytes(), account.as_bytes(), message, &signature).is_ok()
    }
}
