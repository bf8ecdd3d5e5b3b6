//! Baseline OpenID Connect Core types: JOSE algorithms and JSON Web Keys.

use crate::{
    ClientInformation, ClientMetadata, IdTokenVerifier, JsonWebKeySet,
    JweContentEncryptionAlgorithm, JweKeyManagementAlgorithm, JwsAlgorithmFamily,
    JwsKeySelector, JweKeySelector, JwsSigningAlgorithm, ProviderMetadata,
};

use serde::{Deserialize, Serialize};

pub use crate::core::jwk::{
    CoreJsonCurveType, CoreJsonWebKey, CoreJsonWebKeyType, CoreJsonWebKeyUse,
};

mod crypto;

// Private purely for organizational reasons; exported publicly above.
mod jwk;

/// OpenID Connect Core client information (registration response).
pub type CoreClientInformation = ClientInformation<CoreJsonWebKey>;

/// OpenID Connect Core client metadata.
pub type CoreClientMetadata = ClientMetadata<CoreJsonWebKey>;

/// OpenID Connect Core ID token verifier.
pub type CoreIdTokenVerifier = IdTokenVerifier<CoreJsonWebKey>;

/// OpenID Connect Core JSON Web Key Set.
pub type CoreJsonWebKeySet = JsonWebKeySet<CoreJsonWebKey>;

/// OpenID Connect Core JWE key selector.
pub type CoreJweKeySelector = JweKeySelector<CoreJsonWebKey>;

/// OpenID Connect Core JWS key selector.
pub type CoreJwsKeySelector = JwsKeySelector<CoreJsonWebKey>;

/// OpenID Connect Core provider metadata.
pub type CoreProviderMetadata = ProviderMetadata<CoreJsonWebKey>;

///
/// OpenID Connect Core JWE encryption algorithms.
///
/// These algorithms represent the `enc` header parameter values for JSON Web Encryption.
/// The values are described in
/// [Section 5.1 of RFC 7518](https://tools.ietf.org/html/rfc7518#section-5.1).
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[non_exhaustive]
pub enum CoreJweContentEncryptionAlgorithm {
    /// AES-128 CBC HMAC SHA-256 authenticated encryption (currently unsupported).
    #[serde(rename = "A128CBC-HS256")]
    Aes128CbcHmacSha256,
    /// AES-192 CBC HMAC SHA-384 authenticated encryption (currently unsupported).
    #[serde(rename = "A192CBC-HS384")]
    Aes192CbcHmacSha384,
    /// AES-256 CBC HMAC SHA-512 authenticated encryption (currently unsupported).
    #[serde(rename = "A256CBC-HS512")]
    Aes256CbcHmacSha512,
    /// AES-128 GCM.
    #[serde(rename = "A128GCM")]
    Aes128Gcm,
    /// AES-192 GCM (currently unsupported).
    #[serde(rename = "A192GCM")]
    Aes192Gcm,
    /// AES-256 GCM.
    #[serde(rename = "A256GCM")]
    Aes256Gcm,
}
impl JweContentEncryptionAlgorithm for CoreJweContentEncryptionAlgorithm {}

///
/// OpenID Connect Core JWE key management algorithms.
///
/// These algorithms represent the `alg` header parameter values for JSON Web Encryption.
/// They are used to encrypt the Content Encryption Key (CEK) to produce the JWE Encrypted Key, or
/// to use key agreement to agree upon the CEK. The values are described in
/// [Section 4.1 of RFC 7518](https://tools.ietf.org/html/rfc7518#section-4.1).
///
/// Only direct encryption (`dir`) is currently supported for decryption.
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[non_exhaustive]
pub enum CoreJweKeyManagementAlgorithm {
    /// RSAES-PKCS1-V1_5.
    #[serde(rename = "RSA1_5")]
    RsaPkcs1V15,
    /// RSAES OAEP using default parameters.
    #[serde(rename = "RSA-OAEP")]
    RsaOaep,
    /// RSAES OAEP using SHA-256 and MGF1 with SHA-256.
    #[serde(rename = "RSA-OAEP-256")]
    RsaOaepSha256,
    /// AES-128 Key Wrap.
    #[serde(rename = "A128KW")]
    AesKeyWrap128,
    /// AES-192 Key Wrap.
    #[serde(rename = "A192KW")]
    AesKeyWrap192,
    /// AES-256 Key Wrap.
    #[serde(rename = "A256KW")]
    AesKeyWrap256,
    /// Direct use of a shared symmetric key as the Content Encryption Key (CEK).
    #[serde(rename = "dir")]
    Direct,
    /// Elliptic Curve Diffie-Hellman Ephemeral Static key agreement using Concat KDF.
    #[serde(rename = "ECDH-ES")]
    EcdhEs,
    /// ECDH-ES using Concat KDF and CEK wrapped with AES-128 Key Wrap.
    #[serde(rename = "ECDH-ES+A128KW")]
    EcdhEsAesKeyWrap128,
    /// ECDH-ES using Concat KDF and CEK wrapped with AES-192 Key Wrap.
    #[serde(rename = "ECDH-ES+A192KW")]
    EcdhEsAesKeyWrap192,
    /// ECDH-ES using Concat KDF and CEK wrapped with AES-256 Key Wrap.
    #[serde(rename = "ECDH-ES+A256KW")]
    EcdhEsAesKeyWrap256,
    /// Key wrapping with AES GCM using 128 bit key.
    #[serde(rename = "A128GCMKW")]
    Aes128Gcm,
    /// Key wrapping with AES GCM using 192 bit key.
    #[serde(rename = "A192GCMKW")]
    Aes192Gcm,
    /// Key wrapping with AES GCM using 256 bit key.
    #[serde(rename = "A256GCMKW")]
    Aes256Gcm,
    /// PBES2 with HMAC SHA-256 wrapped with AES-128 Key Wrap.
    #[serde(rename = "PBES2-HS256+A128KW")]
    PbEs2HmacSha256AesKeyWrap128,
    /// PBES2 with HMAC SHA-384 wrapped with AES-192 Key Wrap.
    #[serde(rename = "PBES2-HS384+A192KW")]
    PbEs2HmacSha384AesKeyWrap192,
    /// PBES2 with HMAC SHA-512 wrapped with AES-256 Key Wrap.
    #[serde(rename = "PBES2-HS512+A256KW")]
    PbEs2HmacSha512AesKeyWrap256,
}
impl JweKeyManagementAlgorithm for CoreJweKeyManagementAlgorithm {
    type KeyType = CoreJsonWebKeyType;

    fn key_type(&self) -> Option<CoreJsonWebKeyType> {
        match *self {
            CoreJweKeyManagementAlgorithm::RsaPkcs1V15
            | CoreJweKeyManagementAlgorithm::RsaOaep
            | CoreJweKeyManagementAlgorithm::RsaOaepSha256 => Some(CoreJsonWebKeyType::RSA),
            CoreJweKeyManagementAlgorithm::AesKeyWrap128
            | CoreJweKeyManagementAlgorithm::AesKeyWrap192
            | CoreJweKeyManagementAlgorithm::AesKeyWrap256
            | CoreJweKeyManagementAlgorithm::Direct
            | CoreJweKeyManagementAlgorithm::Aes128Gcm
            | CoreJweKeyManagementAlgorithm::Aes192Gcm
            | CoreJweKeyManagementAlgorithm::Aes256Gcm => Some(CoreJsonWebKeyType::Symmetric),
            CoreJweKeyManagementAlgorithm::EcdhEs
            | CoreJweKeyManagementAlgorithm::EcdhEsAesKeyWrap128
            | CoreJweKeyManagementAlgorithm::EcdhEsAesKeyWrap192
            | CoreJweKeyManagementAlgorithm::EcdhEsAesKeyWrap256 => {
                Some(CoreJsonWebKeyType::EllipticCurve)
            }
            // Password-based key derivation has no JWK representation.
            CoreJweKeyManagementAlgorithm::PbEs2HmacSha256AesKeyWrap128
            | CoreJweKeyManagementAlgorithm::PbEs2HmacSha384AesKeyWrap192
            | CoreJweKeyManagementAlgorithm::PbEs2HmacSha512AesKeyWrap256 => None,
        }
    }
}

///
/// OpenID Connect Core JWS signing algorithms.
///
/// These algorithms represent the `alg` header parameter values for JSON Web Signature.
/// They are used to digitally sign or create a MAC of the contents of the JWS Protected Header and
/// the JWS Payload. The values are described in
/// [Section 3.1 of RFC 7518](https://tools.ietf.org/html/rfc7518#section-3.1).
///
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[non_exhaustive]
pub enum CoreJwsSigningAlgorithm {
    /// HMAC using SHA-256.
    #[serde(rename = "HS256")]
    HmacSha256,
    /// HMAC using SHA-384.
    #[serde(rename = "HS384")]
    HmacSha384,
    /// HMAC using SHA-512.
    #[serde(rename = "HS512")]
    HmacSha512,
    /// RSA SSA PKCS#1 v1.5 using SHA-256.
    #[serde(rename = "RS256")]
    RsaSsaPkcs1V15Sha256,
    /// RSA SSA PKCS#1 v1.5 using SHA-384.
    #[serde(rename = "RS384")]
    RsaSsaPkcs1V15Sha384,
    /// RSA SSA PKCS#1 v1.5 using SHA-512.
    #[serde(rename = "RS512")]
    RsaSsaPkcs1V15Sha512,
    /// ECDSA using P-256 and SHA-256.
    #[serde(rename = "ES256")]
    EcdsaP256Sha256,
    /// ECDSA using P-384 and SHA-384.
    #[serde(rename = "ES384")]
    EcdsaP384Sha384,
    /// ECDSA using P-521 and SHA-512.
    #[serde(rename = "ES512")]
    EcdsaP521Sha512,
    /// RSA SSA-PSS using SHA-256 and MGF1 with SHA-256.
    #[serde(rename = "PS256")]
    RsaSsaPssSha256,
    /// RSA SSA-PSS using SHA-384 and MGF1 with SHA-384.
    #[serde(rename = "PS384")]
    RsaSsaPssSha384,
    /// RSA SSA-PSS using SHA-512 and MGF1 with SHA-512.
    #[serde(rename = "PS512")]
    RsaSsaPssSha512,
    /// EdDSA signature using the Ed25519 curve.
    #[serde(rename = "EdDSA")]
    EdDsa,
    ///
    /// No digital signature or MAC performed.
    ///
    /// # Security Warning
    ///
    /// This algorithm provides no security over the integrity of the JSON Web Token. Clients
    /// should be careful not to rely on unsigned JWT's for security purposes. See
    /// [Critical vulnerabilities in JSON Web Token libraries](
    ///     https://auth0.com/blog/critical-vulnerabilities-in-json-web-token-libraries/) for
    /// further discussion.
    ///
    #[serde(rename = "none")]
    None,
}
impl JwsSigningAlgorithm for CoreJwsSigningAlgorithm {
    type KeyType = CoreJsonWebKeyType;

    fn key_type(&self) -> Option<CoreJsonWebKeyType> {
        match *self {
            CoreJwsSigningAlgorithm::HmacSha256
            | CoreJwsSigningAlgorithm::HmacSha384
            | CoreJwsSigningAlgorithm::HmacSha512 => Some(CoreJsonWebKeyType::Symmetric),
            CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256
            | CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha384
            | CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha512
            | CoreJwsSigningAlgorithm::RsaSsaPssSha256
            | CoreJwsSigningAlgorithm::RsaSsaPssSha384
            | CoreJwsSigningAlgorithm::RsaSsaPssSha512 => Some(CoreJsonWebKeyType::RSA),
            CoreJwsSigningAlgorithm::EcdsaP256Sha256
            | CoreJwsSigningAlgorithm::EcdsaP384Sha384
            | CoreJwsSigningAlgorithm::EcdsaP521Sha512 => Some(CoreJsonWebKeyType::EllipticCurve),
            CoreJwsSigningAlgorithm::EdDsa => Some(CoreJsonWebKeyType::OctetKeyPair),
            CoreJwsSigningAlgorithm::None => None,
        }
    }

    fn family(&self) -> JwsAlgorithmFamily {
        match *self {
            CoreJwsSigningAlgorithm::None => JwsAlgorithmFamily::Unsecured,
            CoreJwsSigningAlgorithm::HmacSha256
            | CoreJwsSigningAlgorithm::HmacSha384
            | CoreJwsSigningAlgorithm::HmacSha512 => JwsAlgorithmFamily::SharedSecret,
            _ => JwsAlgorithmFamily::PublicKey,
        }
    }

    fn rsa_sha_256() -> Self {
        CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256
    }
}
