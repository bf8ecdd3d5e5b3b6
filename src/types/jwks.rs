use crate::http_utils::{check_content_type, MIME_TYPE_JSON, MIME_TYPE_JWKS};
use crate::types::jwk::{
    JsonWebKey, JsonWebKeyId, JsonWebKeyUse, JweKeyManagementAlgorithm, JwsSigningAlgorithm,
};
use crate::{HttpRequest, HttpResponse, JsonWebKeySetUrl, SyncHttpClient};

use http::header::{HeaderValue, ACCEPT};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, VecSkipError};
use thiserror::Error;

/// Error retrieving a remote JSON Web Key Set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JsonWebKeySetError<RE>
where
    RE: std::error::Error + 'static,
{
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
    /// Failed to parse server response.
    #[error("Failed to parse server response")]
    Parse(#[source] serde_path_to_error::Error<serde_json::Error>),
    /// An error occurred while sending the request or receiving the response (e.g., network
    /// connectivity failed).
    #[error("Request failed")]
    Request(#[source] RE),
    /// Server returned an invalid response.
    #[error("Server returned invalid response: {2}")]
    Response(StatusCode, Vec<u8>, String),
}

/// JSON Web Key Set.
#[serde_as]
#[derive(Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct JsonWebKeySet<K>
where
    K: JsonWebKey,
{
    #[serde(bound = "K: JsonWebKey")]
    // Ignores invalid keys rather than failing, so that a key set containing a key type we
    // don't understand still yields the keys we do.
    #[serde_as(as = "VecSkipError<_>")]
    keys: Vec<K>,
}

/// Checks whether a JWK key can be used with a given signing algorithm.
pub(crate) fn check_key_compatibility<K>(
    key: &K,
    signing_algorithm: &K::SigningAlgorithm,
) -> Result<(), &'static str>
where
    K: JsonWebKey,
{
    // if this key isn't suitable for signing
    if let Some(use_) = key.key_use() {
        if !use_.allows_signature() {
            return Err("key usage not permitted for digital signatures");
        }
    }

    // if this key doesn't have the right key type
    if signing_algorithm.key_type().as_ref() != Some(key.key_type()) {
        return Err("key type does not match signature algorithm");
    }

    Ok(())
}

/// Checks whether a JWK key can be used with a given key management algorithm.
pub(crate) fn check_decryption_key_compatibility<K>(
    key: &K,
    key_alg: &K::KeyManagementAlgorithm,
) -> Result<(), &'static str>
where
    K: JsonWebKey,
{
    if let Some(use_) = key.key_use() {
        if !use_.allows_encryption() {
            return Err("key usage not permitted for encryption");
        }
    }

    if key_alg.key_type().as_ref() != Some(key.key_type()) {
        return Err("key type does not match key management algorithm");
    }

    Ok(())
}

fn key_id_matches<K>(key: &K, key_id: Option<&JsonWebKeyId>) -> bool
where
    K: JsonWebKey,
{
    // Either the JWT doesn't include a 'kid' (in which case any 'kid' is acceptable), or the
    // 'kid' matches the key's ID.
    match key_id {
        Some(kid) => key.key_id() == Some(kid),
        None => true,
    }
}

impl<K> JsonWebKeySet<K>
where
    K: JsonWebKey,
{
    /// Create a new JSON Web Key Set.
    pub fn new(keys: Vec<K>) -> Self {
        Self { keys }
    }

    /// Return a list of keys suitable for verifying a signature, given a key ID and signature
    /// algorithm.
    pub(crate) fn filter_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        signature_alg: &K::SigningAlgorithm,
    ) -> Vec<&K> {
        self.keys()
            .iter()
            .filter(|key| {
                key_id_matches(*key, key_id)
                    && check_key_compatibility(*key, signature_alg).is_ok()
            })
            .collect()
    }

    /// Return a list of keys suitable for decrypting a token, given a key ID and key management
    /// algorithm.
    pub(crate) fn filter_decryption_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        key_alg: &K::KeyManagementAlgorithm,
    ) -> Vec<&K> {
        self.keys()
            .iter()
            .filter(|key| {
                key_id_matches(*key, key_id)
                    && check_decryption_key_compatibility(*key, key_alg).is_ok()
            })
            .collect()
    }

    /// Returns true if any key in this set has the given key ID.
    pub(crate) fn contains_key_id(&self, key_id: &JsonWebKeyId) -> bool {
        self.keys.iter().any(|key| key.key_id() == Some(key_id))
    }

    /// Fetch a remote JSON Web Key Set from the specified `url` using the given `http_client`
    /// (e.g., `oauth2::reqwest::blocking::Client` or `oauth2::CurlHttpClient`).
    pub fn fetch<C>(
        url: &JsonWebKeySetUrl,
        http_client: &C,
    ) -> Result<Self, JsonWebKeySetError<<C as SyncHttpClient>::Error>>
    where
        C: SyncHttpClient,
    {
        http_client
            .call(Self::fetch_request(url).map_err(|err| {
                JsonWebKeySetError::Other(format!("failed to prepare request: {err}"))
            })?)
            .map_err(JsonWebKeySetError::Request)
            .and_then(Self::fetch_response)
    }

    fn fetch_request(url: &JsonWebKeySetUrl) -> Result<HttpRequest, http::Error> {
        http::Request::builder()
            .uri(url.to_string())
            .method(Method::GET)
            .header(ACCEPT, HeaderValue::from_static(MIME_TYPE_JSON))
            .body(Vec::new())
    }

    fn fetch_response<RE>(http_response: HttpResponse) -> Result<Self, JsonWebKeySetError<RE>>
    where
        RE: std::error::Error + 'static,
    {
        if http_response.status() != StatusCode::OK {
            return Err(JsonWebKeySetError::Response(
                http_response.status(),
                http_response.body().to_owned(),
                format!("HTTP status code {}", http_response.status()),
            ));
        }

        check_content_type(http_response.headers(), MIME_TYPE_JSON)
            .or_else(|err| {
                check_content_type(http_response.headers(), MIME_TYPE_JWKS).map_err(|_| err)
            })
            .map_err(|err_msg| {
                JsonWebKeySetError::Response(
                    http_response.status(),
                    http_response.body().to_owned(),
                    err_msg,
                )
            })?;

        serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(
            http_response.body(),
        ))
        .map_err(JsonWebKeySetError::Parse)
    }

    /// Return the keys in this JSON Web Key Set.
    pub fn keys(&self) -> &Vec<K> {
        &self.keys
    }
}
impl<K> Clone for JsonWebKeySet<K>
where
    K: JsonWebKey,
{
    fn clone(&self) -> Self {
        Self::new(self.keys.clone())
    }
}
impl<K> Default for JsonWebKeySet<K>
where
    K: JsonWebKey,
{
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
