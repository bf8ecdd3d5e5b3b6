//! Binding of an expected JOSE algorithm to a source of keys.

use crate::helpers::alg_name;
use crate::jwt::{EncryptedToken, SignedToken};
use crate::{BadTokenError, ClientId, IssuerUrl, JsonWebKey, JsonWebKeyId, KeySource};

use log::debug;

use std::fmt::Display;
use std::sync::Arc;


/// Tries each candidate key in order, returning the result of the first attempt that succeeds.
///
/// Candidates after the first success are not tried, so the running time depends on the position
/// of the matching key.
pub(crate) fn first_success<K, T, E, F>(candidates: &[K], attempt: F) -> Option<T>
where
    K: JsonWebKey,
    E: Display,
    F: Fn(&K) -> Result<T, E>,
{
    candidates
        .iter()
        .find_map(|key| match attempt(key) {
            Ok(result) => Some(result),
            Err(err) => {
                debug!(
                    "candidate key (kid: {:?}) rejected: {}",
                    key.key_id().map(|kid| kid.as_str()),
                    err
                );
                None
            }
        })
}

/// Selects the keys for verifying JWS-protected ID tokens signed with one expected algorithm.
#[derive(Clone, Debug)]
pub struct JwsKeySelector<K>
where
    K: JsonWebKey,
{
    issuer: IssuerUrl,
    signing_alg: K::SigningAlgorithm,
    key_source: Arc<dyn KeySource<K>>,
}
impl<K> JwsKeySelector<K>
where
    K: JsonWebKey,
{
    /// Creates a selector that only accepts tokens signed by `issuer` with `signing_alg`, using
    /// keys from `key_source`.
    pub fn new(
        issuer: IssuerUrl,
        signing_alg: K::SigningAlgorithm,
        key_source: Arc<dyn KeySource<K>>,
    ) -> Self {
        Self {
            issuer,
            signing_alg,
            key_source,
        }
    }

    /// Returns the issuer whose keys this selector provides.
    pub fn expected_issuer(&self) -> &IssuerUrl {
        &self.issuer
    }

    /// Returns the only signature algorithm this selector accepts.
    pub fn signing_alg(&self) -> &K::SigningAlgorithm {
        &self.signing_alg
    }

    /// Returns the source of verification keys.
    pub fn key_source(&self) -> &Arc<dyn KeySource<K>> {
        &self.key_source
    }

    /// Returns the candidate keys for a token whose header declares `header_alg` and `key_id`.
    ///
    /// The declared algorithm is never trusted: a token declaring anything other than the
    /// expected algorithm is rejected without consulting the key source.
    pub fn select_keys(
        &self,
        header_alg: &K::SigningAlgorithm,
        key_id: Option<&JsonWebKeyId>,
    ) -> Result<Vec<K>, BadTokenError> {
        if *header_alg != self.signing_alg {
            return Err(BadTokenError::SignatureInvalid(format!(
                "expected signature algorithm `{}` (found `{}`)",
                alg_name(&self.signing_alg),
                alg_name(header_alg),
            )));
        }

        self.key_source
            .signature_keys(key_id, &self.signing_alg)
            .map_err(BadTokenError::KeySourceUnavailable)
    }

    pub(crate) fn verify_signature(&self, token: &SignedToken<K>) -> Result<(), BadTokenError> {
        let candidates = self.select_keys(&token.alg, token.header.kid.as_ref())?;
        debug!(
            "trying {} candidate signature key(s) for `{}`",
            candidates.len(),
            alg_name(&self.signing_alg)
        );

        first_success(&candidates, |key| {
            key.verify_signature(
                &self.signing_alg,
                token.signing_input.as_bytes(),
                &token.signature,
            )
        })
        .ok_or_else(|| {
            BadTokenError::SignatureInvalid(if candidates.is_empty() {
                "no matching verification key found".to_string()
            } else {
                "signature did not verify with any candidate key".to_string()
            })
        })
    }
}

/// Selects the client's own keys for decrypting JWE-protected ID tokens encrypted with one
/// expected key management algorithm and content encryption method.
#[derive(Clone, Debug)]
pub struct JweKeySelector<K>
where
    K: JsonWebKey,
{
    client_id: ClientId,
    key_alg: K::KeyManagementAlgorithm,
    content_alg: K::ContentEncryptionAlgorithm,
    key_source: Arc<dyn KeySource<K>>,
}
impl<K> JweKeySelector<K>
where
    K: JsonWebKey,
{
    /// Creates a selector that only accepts tokens encrypted for `client_id` with `key_alg` and
    /// `content_alg`, using keys from `key_source`.
    pub fn new(
        client_id: ClientId,
        key_alg: K::KeyManagementAlgorithm,
        content_alg: K::ContentEncryptionAlgorithm,
        key_source: Arc<dyn KeySource<K>>,
    ) -> Self {
        Self {
            client_id,
            key_alg,
            content_alg,
            key_source,
        }
    }

    /// Returns the client whose keys this selector provides.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the only key management algorithm this selector accepts.
    pub fn key_alg(&self) -> &K::KeyManagementAlgorithm {
        &self.key_alg
    }

    /// Returns the only content encryption algorithm this selector accepts.
    pub fn content_alg(&self) -> &K::ContentEncryptionAlgorithm {
        &self.content_alg
    }

    /// Returns the source of decryption keys.
    pub fn key_source(&self) -> &Arc<dyn KeySource<K>> {
        &self.key_source
    }

    /// Returns the candidate keys for a token whose header declares `header_key_alg`,
    /// `header_content_alg` and `key_id`.
    pub fn select_keys(
        &self,
        header_key_alg: &K::KeyManagementAlgorithm,
        header_content_alg: &K::ContentEncryptionAlgorithm,
        key_id: Option<&JsonWebKeyId>,
    ) -> Result<Vec<K>, BadTokenError> {
        if *header_key_alg != self.key_alg || *header_content_alg != self.content_alg {
            return Err(BadTokenError::DecryptionFailed(format!(
                "expected encryption `{}` / `{}` (found `{}` / `{}`)",
                alg_name(&self.key_alg),
                alg_name(&self.content_alg),
                alg_name(header_key_alg),
                alg_name(header_content_alg),
            )));
        }

        self.key_source
            .decryption_keys(key_id, &self.key_alg, &self.content_alg)
            .map_err(BadTokenError::KeySourceUnavailable)
    }

    pub(crate) fn decrypt(&self, token: &EncryptedToken<K>) -> Result<Vec<u8>, BadTokenError> {
        let candidates = self.select_keys(&token.alg, &token.enc, token.header.kid.as_ref())?;
        debug!(
            "trying {} candidate decryption key(s) for `{}` / `{}`",
            candidates.len(),
            alg_name(&self.key_alg),
            alg_name(&self.content_alg)
        );

        let content = token.content();
        first_success(&candidates, |key| {
            key.decrypt(&self.key_alg, &self.content_alg, &content)
        })
        .ok_or_else(|| {
            BadTokenError::DecryptionFailed(if candidates.is_empty() {
                "no matching decryption key found".to_string()
            } else {
                "content did not decrypt with any candidate key".to_string()
            })
        })
    }
}
