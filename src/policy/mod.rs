//! Resolution of the ID token protection expected from a provider, given the client's
//! registration.
//!
//! The client registers the algorithms it expects its ID tokens to be protected with, and the
//! provider advertises the algorithms it can produce. Resolution cross-checks the two once, at
//! configuration time, and binds each expected algorithm to a source of keys. There is no
//! negotiation or fallback: if the provider doesn't advertise what the client registered,
//! resolution fails.

use crate::helpers::alg_name;
use crate::{
    ClientInformation, ClientSecretKeySource, IdTokenVerifier, JsonWebKey, JweKeySelector,
    JwsAlgorithmFamily, JwsKeySelector, JwsSigningAlgorithm, KeySource, ProviderMetadata,
    RemoteJsonWebKeySet, SyncHttpClient,
};

use log::debug;
use thiserror::Error;

use std::sync::Arc;


/// Error resolving the ID token protection policy of a client registration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The client registration doesn't specify an ID token signature algorithm.
    #[error("Missing ID token signing algorithm: {0}")]
    MissingSigningAlgorithm(String),
    /// The provider doesn't advertise the algorithm or method the client registered.
    #[error("Unsupported by provider: {0}")]
    UnsupportedByProvider(String),
    /// No keys are available for the registered algorithm.
    #[error("Missing key source: {0}")]
    MissingKeySource(String),
    /// The registered algorithm is keyed with the client secret, but the client has none.
    #[error("Missing client secret: {0}")]
    MissingClientSecret(String),
    /// The registered algorithm has no verifier implementation.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    /// The client registration specifies an ID token encryption algorithm without a content
    /// encryption method.
    #[error("Missing ID token encryption method: {0}")]
    MissingEncryptionMethod(String),
}

/// Resolves the signature policy for ID tokens issued to `client_information` by the provider
/// described by `provider_metadata`.
///
/// Returns `Ok(None)` if the client registered `none`, in which case only unsecured ID tokens are
/// accepted. Signatures made with the provider's keys are verified using the client's registered
/// `jwks` or, failing that, the key set at its registered `jwks_uri`, fetched with `http_client`.
/// MACs are verified using the client secret.
pub fn resolve_signature_policy<K, C>(
    provider_metadata: &ProviderMetadata<K>,
    client_information: &ClientInformation<K>,
    http_client: C,
) -> Result<Option<JwsKeySelector<K>>, ConfigError>
where
    K: JsonWebKey,
    C: SyncHttpClient + Send + Sync + 'static,
{
    let client_metadata = client_information.metadata();
    let signing_alg = client_metadata
        .id_token_signed_response_alg()
        .ok_or_else(|| {
            ConfigError::MissingSigningAlgorithm(format!(
                "client `{}` has no registered `id_token_signed_response_alg`",
                **client_information.client_id()
            ))
        })?;

    if !provider_metadata
        .id_token_signing_alg_values_supported()
        .contains(signing_alg)
    {
        return Err(ConfigError::UnsupportedByProvider(format!(
            "the OpenID Provider doesn't support {} ID tokens",
            alg_name(signing_alg)
        )));
    }

    let issuer = provider_metadata.issuer().clone();
    let key_source: Arc<dyn KeySource<K>> = match signing_alg.family() {
        JwsAlgorithmFamily::Unsecured => {
            debug!("signature policy for {}: unsecured ID tokens", issuer);
            return Ok(None);
        }
        JwsAlgorithmFamily::PublicKey => {
            if let Some(jwks) = client_metadata.jwks() {
                debug!(
                    "signature policy for {}: {} with registered key set",
                    issuer,
                    alg_name(signing_alg)
                );
                Arc::new(jwks.clone())
            } else if let Some(jwks_uri) = client_metadata.jwks_uri() {
                debug!(
                    "signature policy for {}: {} with key set at {}",
                    issuer,
                    alg_name(signing_alg),
                    jwks_uri
                );
                Arc::new(RemoteJsonWebKeySet::<K, C>::new(
                    jwks_uri.clone(),
                    http_client,
                ))
            } else {
                return Err(ConfigError::MissingKeySource(format!(
                    "missing JWK set source for {} ID tokens",
                    alg_name(signing_alg)
                )));
            }
        }
        JwsAlgorithmFamily::SharedSecret => {
            let client_secret = client_information.client_secret().ok_or_else(|| {
                ConfigError::MissingClientSecret(format!(
                    "{} ID tokens are keyed with the client secret",
                    alg_name(signing_alg)
                ))
            })?;
            debug!(
                "signature policy for {}: {} with client secret",
                issuer,
                alg_name(signing_alg)
            );
            Arc::new(ClientSecretKeySource::new(client_secret.clone()))
        }
        JwsAlgorithmFamily::Unsupported => {
            return Err(ConfigError::UnsupportedAlgorithm(format!(
                "unsupported JWS algorithm {}",
                alg_name(signing_alg)
            )))
        }
    };

    Ok(Some(JwsKeySelector::new(
        issuer,
        signing_alg.clone(),
        key_source,
    )))
}

/// Resolves the encryption policy for ID tokens issued to `client_information` by the provider
/// described by `provider_metadata`.
///
/// Returns `Ok(None)` if the client didn't register an ID token encryption algorithm, in which
/// case encrypted ID tokens are rejected. Otherwise, tokens are decrypted with the client's own
/// keys from `decryption_keys`.
pub fn resolve_encryption_policy<K>(
    provider_metadata: &ProviderMetadata<K>,
    client_information: &ClientInformation<K>,
    decryption_keys: Option<Arc<dyn KeySource<K>>>,
) -> Result<Option<JweKeySelector<K>>, ConfigError>
where
    K: JsonWebKey,
{
    let client_metadata = client_information.metadata();
    let key_alg = match client_metadata.id_token_encrypted_response_alg() {
        Some(key_alg) => key_alg,
        None => {
            debug!(
                "encryption policy for {}: encrypted ID tokens not expected",
                provider_metadata.issuer()
            );
            return Ok(None);
        }
    };
    let content_alg = client_metadata
        .id_token_encrypted_response_enc()
        .ok_or_else(|| {
            ConfigError::MissingEncryptionMethod(format!(
                "client `{}` registered `id_token_encrypted_response_alg` {} without \
                 `id_token_encrypted_response_enc`",
                **client_information.client_id(),
                alg_name(key_alg)
            ))
        })?;

    let provider_supports_alg = provider_metadata
        .id_token_encryption_alg_values_supported()
        .map(|algs| algs.contains(key_alg))
        .unwrap_or(false);
    let provider_supports_enc = provider_metadata
        .id_token_encryption_enc_values_supported()
        .map(|encs| encs.contains(content_alg))
        .unwrap_or(false);
    if !provider_supports_alg || !provider_supports_enc {
        return Err(ConfigError::UnsupportedByProvider(format!(
            "the OpenID Provider doesn't support {} / {} ID tokens",
            alg_name(key_alg),
            alg_name(content_alg)
        )));
    }

    let key_source = decryption_keys.ok_or_else(|| {
        ConfigError::MissingKeySource(format!(
            "missing decryption key source for {} / {} ID tokens",
            alg_name(key_alg),
            alg_name(content_alg)
        ))
    })?;

    debug!(
        "encryption policy for {}: {} / {}",
        provider_metadata.issuer(),
        alg_name(key_alg),
        alg_name(content_alg)
    );
    Ok(Some(JweKeySelector::new(
        client_information.client_id().clone(),
        key_alg.clone(),
        content_alg.clone(),
        key_source,
    )))
}

impl<K> IdTokenVerifier<K>
where
    K: JsonWebKey,
{
    /// Initializes a verifier from the provider's metadata and the client's registration.
    ///
    /// Both the signature and encryption policies are resolved up front; see
    /// [`resolve_signature_policy`] and [`resolve_encryption_policy`]. `decryption_keys` holds the
    /// client's own keys and is only required if the client registered ID token encryption.
    pub fn from_registration<C>(
        provider_metadata: &ProviderMetadata<K>,
        client_information: &ClientInformation<K>,
        decryption_keys: Option<Arc<dyn KeySource<K>>>,
        http_client: C,
    ) -> Result<Self, ConfigError>
    where
        C: SyncHttpClient + Send + Sync + 'static,
    {
        let jws_key_selector =
            resolve_signature_policy(provider_metadata, client_information, http_client)?;
        let jwe_key_selector =
            resolve_encryption_policy(provider_metadata, client_information, decryption_keys)?;

        Ok(IdTokenVerifier::new(
            provider_metadata.issuer().clone(),
            client_information.client_id().clone(),
            jws_key_selector,
            jwe_key_selector,
        ))
    }
}
