//! Temporary secrets and password hashing.
//!
//! Stored credentials are Argon2id PHC strings. Rows provisioned by the
//! legacy back-office may still hold plaintext, so `CredentialValue` tags
//! the two forms and verification reports when a matching legacy value must
//! be upgraded in place.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

pub(crate) const TEMP_PASSWORD_LENGTH: usize = 16;

const TEMP_PASSWORD_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

const PHC_ARGON2_PREFIX: &str = "$argon2";

/// Generate a temporary password for a freshly provisioned principal.
pub(crate) fn generate_temp_password() -> String {
    let mut rng = OsRng;
    (0..TEMP_PASSWORD_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..TEMP_PASSWORD_ALPHABET.len());
            TEMP_PASSWORD_ALPHABET[index] as char
        })
        .collect()
}

/// Mint a one-time registration token for first-admin provisioning.
///
/// The returned token only travels to the registrant; the database stores
/// its hash.
pub(crate) fn generate_registration_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to draw registration token bytes")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a registration token so the raw value never touches the database.
pub(crate) fn hash_registration_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Hash a password into an Argon2id PHC string.
pub(crate) fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verification outcome. `MatchNeedsRehash` means the stored value matched
/// but must be replaced with a hash before the flow completes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum CredentialCheck {
    Match,
    MatchNeedsRehash,
    Mismatch,
}

/// A stored credential, tagged by representation.
#[derive(Debug)]
pub(crate) enum CredentialValue<'a> {
    Hashed(&'a str),
    Legacy(&'a str),
}

impl<'a> CredentialValue<'a> {
    pub(crate) fn parse(stored: &'a str) -> Self {
        if stored.starts_with(PHC_ARGON2_PREFIX) {
            Self::Hashed(stored)
        } else {
            Self::Legacy(stored)
        }
    }

    /// Check a candidate password against the stored value.
    ///
    /// Legacy values compare by exact equality only. A hashed candidate never
    /// matches a hashed value, so a leaked hash is not a working password.
    pub(crate) fn verify(
        &self,
        candidate: &str,
    ) -> Result<CredentialCheck, argon2::password_hash::Error> {
        match self {
            Self::Hashed(phc) => {
                let parsed = PasswordHash::new(phc)?;
                match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
                    Ok(()) => Ok(CredentialCheck::Match),
                    Err(argon2::password_hash::Error::Password) => Ok(CredentialCheck::Mismatch),
                    Err(err) => Err(err),
                }
            }
            Self::Legacy(plaintext) => {
                if *plaintext == candidate {
                    Ok(CredentialCheck::MatchNeedsRehash)
                } else {
                    Ok(CredentialCheck::Mismatch)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_temp_password_shape() {
        let password = generate_temp_password();
        assert_eq!(password.len(), TEMP_PASSWORD_LENGTH);
        assert!(password
            .bytes()
            .all(|byte| TEMP_PASSWORD_ALPHABET.contains(&byte)));
    }

    #[test]
    fn test_temp_passwords_not_reused() {
        let mut seen = HashSet::new();
        for _ in 0..64 {
            assert!(seen.insert(generate_temp_password()));
        }
    }

    #[test]
    fn test_registration_token_is_url_safe() {
        let token = generate_registration_token().expect("token");
        let decoded = URL_SAFE_NO_PAD.decode(&token).expect("decode");
        assert_eq!(decoded.len(), 32);
        assert!(!token.contains('='));
        assert_ne!(token, generate_registration_token().expect("token"));
    }

    #[test]
    fn test_registration_token_hash_is_stable() {
        let token = generate_registration_token().expect("token");
        let hash = hash_registration_token(&token);
        assert_eq!(hash.len(), 32);
        assert_eq!(hash, hash_registration_token(&token));
        assert_ne!(hash, hash_registration_token("other-token"));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("NewPass123!").expect("hash");
        assert!(hash.starts_with("$argon2"));

        let value = CredentialValue::parse(&hash);
        assert!(matches!(value, CredentialValue::Hashed(_)));
        assert_eq!(value.verify("NewPass123!").expect("verify"), CredentialCheck::Match);
        assert_eq!(value.verify("wrong").expect("verify"), CredentialCheck::Mismatch);
    }

    #[test]
    fn test_legacy_value_matches_by_equality() {
        let value = CredentialValue::parse("PlainSecret99!");
        assert!(matches!(value, CredentialValue::Legacy(_)));
        assert_eq!(
            value.verify("PlainSecret99!").expect("verify"),
            CredentialCheck::MatchNeedsRehash
        );
        assert_eq!(value.verify("plainsecret99!").expect("verify"), CredentialCheck::Mismatch);
    }

    #[test]
    fn test_stored_hash_is_not_a_password() {
        let hash = hash_password("NewPass123!").expect("hash");
        let value = CredentialValue::parse(&hash);
        assert_eq!(value.verify(&hash).expect("verify"), CredentialCheck::Mismatch);
    }
}
