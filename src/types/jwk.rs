use crate::{DecryptionError, SignatureVerificationError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use std::fmt::Debug;
use std::hash::Hash;

new_type![
    /// ID of a JSON Web Key.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    JsonWebKeyId(String)
];

/// Segments of a compact JSON Web Encryption (JWE) token needed to decrypt its content.
#[derive(Clone, Copy, Debug)]
pub struct JweContent<'a> {
    /// ASCII bytes of the base64url-encoded protected header, used as additional authenticated
    /// data.
    pub aad: &'a [u8],
    /// Encrypted Content Encryption Key (empty for direct encryption).
    pub encrypted_key: &'a [u8],
    /// Initialization vector.
    pub iv: &'a [u8],
    /// Ciphertext.
    pub ciphertext: &'a [u8],
    /// Authentication tag.
    pub tag: &'a [u8],
}

/// JSON Web Key.
pub trait JsonWebKey: Clone + Debug + DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Allowed key usage.
    type KeyUse: JsonWebKeyUse;

    /// JSON Web Signature (JWS) algorithm.
    type SigningAlgorithm: JwsSigningAlgorithm;

    /// JSON Web Encryption (JWE) key management algorithm.
    type KeyManagementAlgorithm: JweKeyManagementAlgorithm<
        KeyType = <Self::SigningAlgorithm as JwsSigningAlgorithm>::KeyType,
    >;

    /// JSON Web Encryption (JWE) content encryption algorithm.
    type ContentEncryptionAlgorithm: JweContentEncryptionAlgorithm;

    /// Returns the key ID, or `None` if no key ID is specified.
    fn key_id(&self) -> Option<&JsonWebKeyId>;

    /// Returns the key type (e.g., RSA).
    fn key_type(&self) -> &<Self::SigningAlgorithm as JwsSigningAlgorithm>::KeyType;

    /// Returns the allowed key usage (e.g., signing or encryption), or `None` if no usage is
    /// specified.
    fn key_use(&self) -> Option<&Self::KeyUse>;

    /// Initializes a new symmetric key or shared signing secret from the specified raw bytes.
    fn new_symmetric(key: Vec<u8>) -> Self;

    /// Verifies the given `signature` using the given signature algorithm (`signature_alg`) over
    /// the given `message`.
    ///
    /// Returns `Ok` if the signature is valid, or an `Err` otherwise.
    fn verify_signature(
        &self,
        signature_alg: &Self::SigningAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureVerificationError>;

    /// Decrypts the given JWE `content` using this key, the key management algorithm
    /// (`key_alg`) and the content encryption algorithm (`content_alg`).
    ///
    /// Returns the plaintext if the content decrypts and authenticates, or an `Err` otherwise.
    fn decrypt(
        &self,
        key_alg: &Self::KeyManagementAlgorithm,
        content_alg: &Self::ContentEncryptionAlgorithm,
        content: &JweContent<'_>,
    ) -> Result<Vec<u8>, DecryptionError>;
}

/// Key type (e.g., RSA).
pub trait JsonWebKeyType:
    Clone + Debug + DeserializeOwned + PartialEq + Serialize + Send + Sync + 'static
{
}

/// Allowed key usage.
pub trait JsonWebKeyUse: Debug + DeserializeOwned + Serialize + Send + Sync + 'static {
    /// Returns true if the associated key may be used for digital signatures, or false otherwise.
    fn allows_signature(&self) -> bool;

    /// Returns true if the associated key may be used for encryption, or false otherwise.
    fn allows_encryption(&self) -> bool;
}

/// Family of a JSON Web Signature algorithm, which determines where verification keys come
/// from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JwsAlgorithmFamily {
    /// No signature (`none`).
    Unsecured,
    /// MAC keyed with a secret shared between the provider and the client (e.g., HS256).
    SharedSecret,
    /// Signature verified with the provider's public keys (RSA, EC, or EdDSA).
    PublicKey,
    /// Algorithm recognized but not supported for verification.
    Unsupported,
}

/// JSON Web Encryption (JWE) content encryption algorithm.
pub trait JweContentEncryptionAlgorithm:
    Clone + Debug + DeserializeOwned + Eq + Hash + PartialEq + Serialize + Send + Sync + 'static
{
}

/// JSON Web Encryption (JWE) key management algorithm.
pub trait JweKeyManagementAlgorithm:
    Clone + Debug + DeserializeOwned + Eq + Hash + PartialEq + Serialize + Send + Sync + 'static
{
    /// Key type (e.g., RSA).
    type KeyType: JsonWebKeyType;

    /// Returns the type of key required to use this key management algorithm, or `None` if the
    /// algorithm is unsupported.
    fn key_type(&self) -> Option<Self::KeyType>;
}

/// JSON Web Signature (JWS) algorithm.
pub trait JwsSigningAlgorithm:
    Clone + Debug + DeserializeOwned + Eq + Hash + PartialEq + Serialize + Send + Sync + 'static
{
    /// Key type (e.g., RSA).
    type KeyType: JsonWebKeyType;

    /// Returns the type of key required to use this signature algorithm, or `None` if this
    /// algorithm does not require a key.
    fn key_type(&self) -> Option<Self::KeyType>;

    /// Returns the family of this algorithm.
    fn family(&self) -> JwsAlgorithmFamily;

    /// Returns true if the signature algorithm uses a shared secret (symmetric key).
    fn uses_shared_secret(&self) -> bool {
        self.family() == JwsAlgorithmFamily::SharedSecret
    }

    /// Returns the RS256 algorithm.
    ///
    /// This is the default algorithm for OpenID Connect ID tokens and must be supported by all
    /// implementations.
    fn rsa_sha_256() -> Self;
}
