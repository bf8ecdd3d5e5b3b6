use crate::core::{
    crypto, CoreJweContentEncryptionAlgorithm, CoreJweKeyManagementAlgorithm,
    CoreJwsSigningAlgorithm,
};
use crate::helpers::{alg_name, deserialize_option_or_none, Base64UrlEncodedBytes};
use crate::types::jwk::JweContent;
use crate::types::jwks::{check_decryption_key_compatibility, check_key_compatibility};
use crate::{
    DecryptionError, JsonWebKey, JsonWebKeyId, JsonWebKeyType, JsonWebKeyUse,
    SignatureVerificationError,
};

use hmac::digest::KeyInit;
use hmac::Mac;
use serde::{Deserialize, Serialize};
use sha2::Digest;

use std::convert::Infallible;
use std::str::FromStr;

#[cfg(test)]
mod tests;

// Other than the 'kty' (key type) parameter, which must be present in all JWKs, Section 4 of RFC
// 7517 states that "member names used for representing key parameters for different keys types
// need not be distinct." A parameter we can't parse for this key type is therefore treated as
// absent rather than failing the whole key.
/// Public or symmetric key expressed as a JSON Web Key.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct CoreJsonWebKey {
    pub(crate) kty: CoreJsonWebKeyType,
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub(crate) use_: Option<CoreJsonWebKeyUse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kid: Option<JsonWebKeyId>,

    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) n: Option<Base64UrlEncodedBytes>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) e: Option<Base64UrlEncodedBytes>,

    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) crv: Option<CoreJsonCurveType>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) x: Option<Base64UrlEncodedBytes>,
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) y: Option<Base64UrlEncodedBytes>,

    // Private key material is never needed for verification; it's only parsed so that a JWK
    // carrying it round-trips.
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) d: Option<Base64UrlEncodedBytes>,

    // Symmetric keys: the client secret for HMAC, or a registered direct-encryption key.
    #[serde(
        default,
        deserialize_with = "deserialize_option_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) k: Option<Base64UrlEncodedBytes>,
}
impl CoreJsonWebKey {
    fn empty(kty: CoreJsonWebKeyType, use_: Option<CoreJsonWebKeyUse>) -> Self {
        Self {
            kty,
            use_,
            kid: None,
            n: None,
            e: None,
            crv: None,
            x: None,
            y: None,
            d: None,
            k: None,
        }
    }

    /// Instantiate a new RSA public key from the raw modulus (`n`) and public exponent (`e`),
    /// along with an optional (but recommended) key ID.
    ///
    /// The key ID is used for matching signed JSON Web Tokens with the keys used for verifying
    /// their signatures.
    pub fn new_rsa(n: Vec<u8>, e: Vec<u8>, kid: Option<JsonWebKeyId>) -> Self {
        Self {
            kid,
            n: Some(Base64UrlEncodedBytes::new(n)),
            e: Some(Base64UrlEncodedBytes::new(e)),
            ..Self::empty(CoreJsonWebKeyType::RSA, Some(CoreJsonWebKeyUse::Signature))
        }
    }

    /// Instantiate a new EC public key from the raw x (`x`) and y (`y`) coordinates,
    /// along with an optional (but recommended) key ID.
    pub fn new_ec(
        x: Vec<u8>,
        y: Vec<u8>,
        crv: CoreJsonCurveType,
        kid: Option<JsonWebKeyId>,
    ) -> Self {
        Self {
            kid,
            crv: Some(crv),
            x: Some(Base64UrlEncodedBytes::new(x)),
            y: Some(Base64UrlEncodedBytes::new(y)),
            ..Self::empty(
                CoreJsonWebKeyType::EllipticCurve,
                Some(CoreJsonWebKeyUse::Signature),
            )
        }
    }

    /// Instantiate a new Octet Key-Pair public key from the raw x (`x`) part of the curve,
    /// along with an optional (but recommended) key ID.
    pub fn new_okp(x: Vec<u8>, crv: CoreJsonCurveType, kid: Option<JsonWebKeyId>) -> Self {
        Self {
            kid,
            crv: Some(crv),
            x: Some(Base64UrlEncodedBytes::new(x)),
            ..Self::empty(
                CoreJsonWebKeyType::OctetKeyPair,
                Some(CoreJsonWebKeyUse::Signature),
            )
        }
    }

    /// Instantiate a new symmetric content encryption key for direct (`dir`) JWE decryption.
    pub fn new_encryption_key(key: Vec<u8>, kid: Option<JsonWebKeyId>) -> Self {
        Self {
            kid,
            k: Some(Base64UrlEncodedBytes::new(key)),
            ..Self::empty(
                CoreJsonWebKeyType::Symmetric,
                Some(CoreJsonWebKeyUse::Encryption),
            )
        }
    }

    fn symmetric_key(&self) -> Result<&[u8], String> {
        self.k
            .as_deref()
            .map(Vec::as_slice)
            .ok_or_else(|| "Symmetric key `k` is missing".to_string())
    }

    fn hmac<M>(&self) -> Result<M, SignatureVerificationError>
    where
        M: Mac + KeyInit,
    {
        let key = self
            .symmetric_key()
            .map_err(SignatureVerificationError::InvalidKey)?;
        <M as KeyInit>::new_from_slice(key)
            .map_err(|e| SignatureVerificationError::Other(format!("Could not create key: {}", e)))
    }

    fn require_curve(&self, crv: CoreJsonCurveType) -> Result<(), SignatureVerificationError> {
        if self.crv.as_ref() == Some(&crv) {
            Ok(())
        } else {
            Err(SignatureVerificationError::InvalidKey(
                "Key uses different CRV than JWT".to_string(),
            ))
        }
    }
}

fn digest<D>(message: &[u8]) -> Vec<u8>
where
    D: Digest,
{
    D::digest(message).to_vec()
}

impl JsonWebKey for CoreJsonWebKey {
    type KeyUse = CoreJsonWebKeyUse;
    type SigningAlgorithm = CoreJwsSigningAlgorithm;
    type KeyManagementAlgorithm = CoreJweKeyManagementAlgorithm;
    type ContentEncryptionAlgorithm = CoreJweContentEncryptionAlgorithm;

    fn key_id(&self) -> Option<&JsonWebKeyId> {
        self.kid.as_ref()
    }
    fn key_type(&self) -> &CoreJsonWebKeyType {
        &self.kty
    }
    fn key_use(&self) -> Option<&CoreJsonWebKeyUse> {
        self.use_.as_ref()
    }

    fn new_symmetric(key: Vec<u8>) -> Self {
        Self {
            k: Some(Base64UrlEncodedBytes::new(key)),
            ..Self::empty(CoreJsonWebKeyType::Symmetric, None)
        }
    }

    fn verify_signature(
        &self,
        signature_alg: &CoreJwsSigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureVerificationError> {
        check_key_compatibility(self, signature_alg)
            .map_err(|e| SignatureVerificationError::InvalidKey(e.to_owned()))?;

        match *signature_alg {
            CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256 => crypto::verify_rsa_signature(
                self,
                rsa::Pkcs1v15Sign::new::<sha2::Sha256>(),
                &digest::<sha2::Sha256>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha384 => crypto::verify_rsa_signature(
                self,
                rsa::Pkcs1v15Sign::new::<sha2::Sha384>(),
                &digest::<sha2::Sha384>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha512 => crypto::verify_rsa_signature(
                self,
                rsa::Pkcs1v15Sign::new::<sha2::Sha512>(),
                &digest::<sha2::Sha512>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::RsaSsaPssSha256 => crypto::verify_rsa_signature(
                self,
                rsa::Pss::new::<sha2::Sha256>(),
                &digest::<sha2::Sha256>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::RsaSsaPssSha384 => crypto::verify_rsa_signature(
                self,
                rsa::Pss::new::<sha2::Sha384>(),
                &digest::<sha2::Sha384>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::RsaSsaPssSha512 => crypto::verify_rsa_signature(
                self,
                rsa::Pss::new::<sha2::Sha512>(),
                &digest::<sha2::Sha512>(message),
                signature,
            ),
            CoreJwsSigningAlgorithm::HmacSha256 => {
                crypto::verify_mac(self.hmac::<hmac::Hmac<sha2::Sha256>>()?, message, signature)
            }
            CoreJwsSigningAlgorithm::HmacSha384 => {
                crypto::verify_mac(self.hmac::<hmac::Hmac<sha2::Sha384>>()?, message, signature)
            }
            CoreJwsSigningAlgorithm::HmacSha512 => {
                crypto::verify_mac(self.hmac::<hmac::Hmac<sha2::Sha512>>()?, message, signature)
            }
            CoreJwsSigningAlgorithm::EcdsaP256Sha256 => {
                self.require_curve(CoreJsonCurveType::P256)?;
                crypto::verify_ec_signature(self, message, signature)
            }
            CoreJwsSigningAlgorithm::EcdsaP384Sha384 => {
                self.require_curve(CoreJsonCurveType::P384)?;
                crypto::verify_ec_signature(self, message, signature)
            }
            CoreJwsSigningAlgorithm::EcdsaP521Sha512 => {
                self.require_curve(CoreJsonCurveType::P521)?;
                crypto::verify_ec_signature(self, message, signature)
            }
            CoreJwsSigningAlgorithm::EdDsa => {
                self.require_curve(CoreJsonCurveType::Ed25519)?;
                crypto::verify_ed_signature(self, message, signature)
            }
            ref other => Err(SignatureVerificationError::UnsupportedAlg(
                alg_name(other),
            )),
        }
    }

    fn decrypt(
        &self,
        key_alg: &CoreJweKeyManagementAlgorithm,
        content_alg: &CoreJweContentEncryptionAlgorithm,
        content: &JweContent<'_>,
    ) -> Result<Vec<u8>, DecryptionError> {
        check_decryption_key_compatibility(self, key_alg)
            .map_err(|e| DecryptionError::InvalidKey(e.to_owned()))?;

        if *key_alg != CoreJweKeyManagementAlgorithm::Direct {
            return Err(DecryptionError::UnsupportedAlg(
                alg_name(key_alg),
            ));
        }
        // With direct encryption the key itself is the CEK, so the JWE Encrypted Key segment must
        // be empty (RFC 7516, Section 5.1).
        if !content.encrypted_key.is_empty() {
            return Err(DecryptionError::CryptoError(
                "encrypted key must be empty for direct encryption".to_string(),
            ));
        }
        let key = self.symmetric_key().map_err(DecryptionError::InvalidKey)?;

        match *content_alg {
            CoreJweContentEncryptionAlgorithm::Aes128Gcm => {
                crypto::decrypt_aes_gcm::<aes_gcm::Aes128Gcm>(key, content)
            }
            CoreJweContentEncryptionAlgorithm::Aes256Gcm => {
                crypto::decrypt_aes_gcm::<aes_gcm::Aes256Gcm>(key, content)
            }
            ref other => Err(DecryptionError::UnsupportedAlg(
                alg_name(other),
            )),
        }
    }
}

/// Type of JSON Web Key.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum CoreJsonWebKeyType {
    /// Elliptic Curve Cryptography (ECC) key.
    #[serde(rename = "EC")]
    EllipticCurve,
    /// RSA key.
    #[serde(rename = "RSA")]
    RSA,
    /// EdDSA key.
    #[serde(rename = "OKP")]
    OctetKeyPair,
    /// Symmetric key.
    #[serde(rename = "oct")]
    Symmetric,
}
impl JsonWebKeyType for CoreJsonWebKeyType {}

/// Type of EC-Curve
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum CoreJsonCurveType {
    /// P-256 Curve
    #[serde(rename = "P-256")]
    P256,
    /// P-384 Curve
    #[serde(rename = "P-384")]
    P384,
    /// P-521 Curve
    #[serde(rename = "P-521")]
    P521,
    /// Ed25519 Curve
    #[serde(rename = "Ed25519")]
    Ed25519,
}

/// Usage restriction for a JSON Web key.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoreJsonWebKeyUse {
    /// Key may be used for digital signatures.
    Signature,

    /// Key may be used for encryption.
    Encryption,

    /// Fallback case for other key uses not understood by this library.
    Other(String),
}
impl FromStr for CoreJsonWebKeyUse {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "sig" => Self::Signature,
            "enc" => Self::Encryption,
            other => Self::Other(other.to_string()),
        })
    }
}
impl AsRef<str> for CoreJsonWebKeyUse {
    fn as_ref(&self) -> &str {
        match self {
            CoreJsonWebKeyUse::Signature => "sig",
            CoreJsonWebKeyUse::Encryption => "enc",
            CoreJsonWebKeyUse::Other(other) => other.as_str(),
        }
    }
}
impl JsonWebKeyUse for CoreJsonWebKeyUse {
    fn allows_signature(&self) -> bool {
        matches!(*self, CoreJsonWebKeyUse::Signature)
    }
    fn allows_encryption(&self) -> bool {
        matches!(*self, CoreJsonWebKeyUse::Encryption)
    }
}
serde_as_str!(CoreJsonWebKeyUse);
