//! CSRF protection
//!
//! Tokens are `<nonce>.<mac>` where `mac = HMAC-SHA256(secret, subject || "." || nonce)`.
//! They are bound to the admin subject, so a token lifted from one session is
//! useless in another.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

const NONCE_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Invalid CSRF signing key: {0}")]
    InvalidKey(String),
}

pub struct CsrfService {
    keyed: HmacSha256,
}

impl CsrfService {
    pub fn new(secret: String) -> Result<Self, CsrfError> {
        let keyed = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CsrfError::InvalidKey(e.to_string()))?;
        Ok(Self { keyed })
    }

    pub fn issue(&self, subject: &str) -> String {
        let mut nonce = [0u8; NONCE_BYTES];
        rand::rng().fill_bytes(&mut nonce);
        let nonce = hex::encode(nonce);
        let mac = self.signer(subject, &nonce).finalize().into_bytes();
        format!("{}.{}", nonce, hex::encode(mac))
    }

    pub fn validate(&self, subject: &str, token: &str) -> bool {
        let Some((nonce, mac)) = token.split_once('.') else {
            debug!("Malformed CSRF token");
            return false;
        };
        if nonce.len() != NONCE_BYTES * 2 {
            return false;
        }
        let Ok(submitted) = hex::decode(mac) else {
            debug!("CSRF token signature is not hex");
            return false;
        };
        self.signer(subject, nonce).verify_slice(&submitted).is_ok()
    }

    fn signer(&self, subject: &str, nonce: &str) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(subject.as_bytes());
        mac.update(b".");
        mac.update(nonce.as_bytes());
        mac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> CsrfService {
        CsrfService::new(secret.to_string()).unwrap()
    }

    #[test]
    fn test_token_round_trip() {
        let csrf = service("csrf-secret");
        let token = csrf.issue("editor");
        assert!(csrf.validate("editor", &token));
    }

    #[test]
    fn test_token_bound_to_subject() {
        let csrf = service("csrf-secret");
        let token = csrf.issue("editor");
        assert!(!csrf.validate("someone-else", &token));
    }

    #[test]
    fn test_token_bound_to_secret() {
        let token = service("csrf-secret").issue("editor");
        assert!(!service("rotated-secret").validate("editor", &token));
    }

    #[test]
    fn test_tampered_or_malformed_tokens() {
        let csrf = service("csrf-secret");
        let token = csrf.issue("editor");
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('0') { '1' } else { '0' });
        assert!(!csrf.validate("editor", &tampered));
        assert!(!csrf.validate("editor", "no-dot-here"));
        assert!(!csrf.validate("editor", ""));

        let (nonce, _) = token.split_once('.').unwrap();
        assert!(!csrf.validate("editor", &format!("{}.not-hex-at-all", nonce)));
        assert!(!csrf.validate("editor", &format!("{}.", nonce)));
    }

    #[test]
    fn test_signature_matches_keyed_hmac() {
        let csrf = service("csrf-secret");
        let token = csrf.issue("editor");
        let (nonce, mac) = token.split_once('.').unwrap();

        let mut expected = HmacSha256::new_from_slice(b"csrf-secret").unwrap();
        expected.update(format!("editor.{}", nonce).as_bytes());
        assert_eq!(mac, hex::encode(expected.finalize().into_bytes()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let csrf = service("csrf-secret");
        assert_ne!(csrf.issue("editor"), csrf.issue("editor"));
    }
}
