//! PIN hashing and webhook signatures.

use anyhow::anyhow;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use hmac::{Hmac, Mac};
use rand::RngExt;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use digitalcv_domain::cv::PIN_LEN;

use crate::error::CvServiceError;

type HmacSha256 = Hmac<Sha256>;

/// Random numeric PIN of [`PIN_LEN`] digits. Leading zeros are kept.
pub fn generate_pin() -> String {
    let mut rng = rand::rng();
    (0..PIN_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Hash a PIN into an Argon2id PHC string.
pub fn hash_pin(pin: &str) -> Result<String, CvServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(pin.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash pin: {e}"))?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is malformed.
pub fn verify_pin(pin: &str, pin_hash: &str) -> Result<bool, CvServiceError> {
    let parsed = PasswordHash::new(pin_hash).map_err(|e| anyhow!("invalid pin hash: {e}"))?;
    match Argon2::default().verify_password(pin.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verify pin: {e}").into()),
    }
}

/// The string the gateway signs: `{token}|{transaction_id}|{state}`.
fn signed_payload(correlation_token: &str, gateway_transaction_id: &str, state: &str) -> String {
    format!("{correlation_token}|{gateway_transaction_id}|{state}")
}

/// Lower-hex HMAC-SHA256 of the webhook's identifying fields.
pub fn sign_webhook(
    secret: &str,
    correlation_token: &str,
    gateway_transaction_id: &str,
    state: &str,
) -> Result<String, CvServiceError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| anyhow!("invalid webhook secret"))?;
    mac.update(signed_payload(correlation_token, gateway_transaction_id, state).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a webhook signature.
pub fn verify_webhook_signature(
    secret: &str,
    correlation_token: &str,
    gateway_transaction_id: &str,
    state: &str,
    signature: &str,
) -> Result<bool, CvServiceError> {
    let expected = sign_webhook(secret, correlation_token, gateway_transaction_id, state)?;
    let provided = signature.trim().to_ascii_lowercase();
    // Length is public (always 64 hex chars); only the content comparison
    // needs to be constant-time.
    if expected.len() != provided.len() {
        return Ok(false);
    }
    Ok(expected.as_bytes().ct_eq(provided.as_bytes()).into())
}
