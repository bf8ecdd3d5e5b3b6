use crate::core::jwk::CoreJsonCurveType;
use crate::core::{CoreJsonWebKey, CoreJsonWebKeyType};
use crate::types::jwk::JweContent;
use crate::{DecryptionError, JsonWebKey, SignatureVerificationError};

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::{Aead, KeyInit, Payload};

// Length of the GCM authentication tag (128 bits), the only size JWE permits.
const GCM_TAG_LEN: usize = 16;

fn rsa_public_key(key: &CoreJsonWebKey) -> Result<rsa::RsaPublicKey, String> {
    if *key.key_type() != CoreJsonWebKeyType::RSA {
        return Err("RSA key required".to_string());
    }
    let n = key
        .n
        .as_ref()
        .ok_or_else(|| "RSA modulus `n` is missing".to_string())?;
    let e = key
        .e
        .as_ref()
        .ok_or_else(|| "RSA exponent `e` is missing".to_string())?;
    rsa::RsaPublicKey::new(
        rsa::BigUint::from_bytes_be(n),
        rsa::BigUint::from_bytes_be(e),
    )
    .map_err(|err| format!("invalid RSA public key: {err}"))
}

pub fn verify_rsa_signature<S>(
    key: &CoreJsonWebKey,
    padding: S,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), SignatureVerificationError>
where
    S: rsa::traits::SignatureScheme,
{
    let public_key = rsa_public_key(key).map_err(SignatureVerificationError::InvalidKey)?;
    public_key
        .verify(padding, msg, signature)
        .map_err(|_| SignatureVerificationError::CryptoError("bad signature".to_string()))
}

pub fn verify_mac<M>(
    mut mac: M,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), SignatureVerificationError>
where
    M: hmac::Mac,
{
    mac.update(msg);
    mac.verify_slice(signature)
        .map_err(|_| SignatureVerificationError::CryptoError("bad HMAC".to_string()))
}

fn ec_coordinates(
    key: &CoreJsonWebKey,
    coordinate_len: usize,
) -> Result<(&[u8], &[u8]), SignatureVerificationError> {
    let x = key.x.as_ref().ok_or_else(|| {
        SignatureVerificationError::InvalidKey("EC `x` part is missing".to_string())
    })?;
    let y = key.y.as_ref().ok_or_else(|| {
        SignatureVerificationError::InvalidKey("EC `y` part is missing".to_string())
    })?;
    if x.len() != coordinate_len || y.len() != coordinate_len {
        return Err(SignatureVerificationError::InvalidKey(format!(
            "EC coordinates must be {coordinate_len} bytes long"
        )));
    }
    Ok((x.as_slice(), y.as_slice()))
}

/// According to RFC5480, Section-2.2 implementations of Elliptic Curve Cryptography MUST support
/// the uncompressed form, which JWKs express as separate `x` and `y` coordinates.
pub fn verify_ec_signature(
    key: &CoreJsonWebKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), SignatureVerificationError> {
    use p256::ecdsa::signature::Verifier;

    match key.crv {
        Some(CoreJsonCurveType::P256) => {
            let (x, y) = ec_coordinates(key, 32)?;
            let point = p256::EncodedPoint::from_affine_coordinates(
                p256::FieldBytes::from_slice(x),
                p256::FieldBytes::from_slice(y),
                false,
            );
            let verifying_key = p256::ecdsa::VerifyingKey::from_encoded_point(&point)
                .map_err(|err| SignatureVerificationError::InvalidKey(err.to_string()))?;
            let signature = p256::ecdsa::Signature::from_slice(signature).map_err(|_| {
                SignatureVerificationError::CryptoError("malformed signature".to_string())
            })?;
            verifying_key
                .verify(msg, &signature)
                .map_err(|_| SignatureVerificationError::CryptoError("bad signature".to_string()))
        }
        Some(CoreJsonCurveType::P384) => {
            let (x, y) = ec_coordinates(key, 48)?;
            let point = p384::EncodedPoint::from_affine_coordinates(
                p384::FieldBytes::from_slice(x),
                p384::FieldBytes::from_slice(y),
                false,
            );
            let verifying_key = p384::ecdsa::VerifyingKey::from_encoded_point(&point)
                .map_err(|err| SignatureVerificationError::InvalidKey(err.to_string()))?;
            let signature = p384::ecdsa::Signature::from_slice(signature).map_err(|_| {
                SignatureVerificationError::CryptoError("malformed signature".to_string())
            })?;
            verifying_key
                .verify(msg, &signature)
                .map_err(|_| SignatureVerificationError::CryptoError("bad signature".to_string()))
        }
        Some(CoreJsonCurveType::P521) => {
            let (x, y) = ec_coordinates(key, 66)?;
            let point = p521::EncodedPoint::from_affine_coordinates(
                p521::FieldBytes::from_slice(x),
                p521::FieldBytes::from_slice(y),
                false,
            );
            let verifying_key = p521::ecdsa::VerifyingKey::from_encoded_point(&point)
                .map_err(|err| SignatureVerificationError::InvalidKey(err.to_string()))?;
            let signature = p521::ecdsa::Signature::from_slice(signature).map_err(|_| {
                SignatureVerificationError::CryptoError("malformed signature".to_string())
            })?;
            verifying_key
                .verify(msg, &signature)
                .map_err(|_| SignatureVerificationError::CryptoError("bad signature".to_string()))
        }
        _ => Err(SignatureVerificationError::InvalidKey(
            "unsupported EC curve".to_string(),
        )),
    }
}

pub fn verify_ed_signature(
    key: &CoreJsonWebKey,
    msg: &[u8],
    signature: &[u8],
) -> Result<(), SignatureVerificationError> {
    use ed25519_dalek::Verifier;

    let x = key.x.as_ref().ok_or_else(|| {
        SignatureVerificationError::InvalidKey("OKP `x` part is missing".to_string())
    })?;
    let public_key_bytes: [u8; 32] = x.as_slice().try_into().map_err(|_| {
        SignatureVerificationError::InvalidKey("Ed25519 public key must be 32 bytes".to_string())
    })?;
    let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&public_key_bytes)
        .map_err(|err| SignatureVerificationError::InvalidKey(err.to_string()))?;
    let signature = ed25519_dalek::Signature::from_slice(signature).map_err(|_| {
        SignatureVerificationError::CryptoError("malformed signature".to_string())
    })?;
    verifying_key
        .verify(msg, &signature)
        .map_err(|_| SignatureVerificationError::CryptoError("bad signature".to_string()))
}

/// Decrypts AES-GCM content whose 96-bit IV, ciphertext and tag are carried as separate JWE
/// segments.
pub fn decrypt_aes_gcm<C>(key: &[u8], content: &JweContent<'_>) -> Result<Vec<u8>, DecryptionError>
where
    C: Aead + KeyInit,
{
    let cipher = C::new_from_slice(key).map_err(|_| {
        DecryptionError::InvalidKey("key length does not match content encryption".to_string())
    })?;
    if content.iv.len() != C::NonceSize::USIZE {
        return Err(DecryptionError::CryptoError(
            "invalid initialization vector length".to_string(),
        ));
    }
    if content.tag.len() != GCM_TAG_LEN {
        return Err(DecryptionError::CryptoError(
            "invalid authentication tag length".to_string(),
        ));
    }

    let mut sealed = Vec::with_capacity(content.ciphertext.len() + content.tag.len());
    sealed.extend_from_slice(content.ciphertext);
    sealed.extend_from_slice(content.tag);

    cipher
        .decrypt(
            aes_gcm::aead::Nonce::<C>::from_slice(content.iv),
            Payload {
                msg: &sealed,
                aad: content.aad,
            },
        )
        .map_err(|_| DecryptionError::CryptoError("authenticated decryption failed".to_string()))
}
