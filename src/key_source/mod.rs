//! Sources of candidate keys for verifying and decrypting tokens.

use crate::types::jwks::JsonWebKeySetError;
use crate::{
    ClientSecret, JsonWebKey, JsonWebKeyId, JsonWebKeySet, JsonWebKeySetUrl, JwsSigningAlgorithm,
    SyncHttpClient,
};

use http::StatusCode;
use log::debug;
use thiserror::Error;

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};


/// Default time for which a fetched remote key set is used before being fetched again.
pub const DEFAULT_CACHE_LIFESPAN: Duration = Duration::from_secs(5 * 60);

/// Default minimum time between fetches triggered by an unknown key ID.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Error obtaining keys from a [`KeySource`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeySourceError {
    /// The request for the key set could not be completed (e.g., network connectivity failed).
    #[error("Failed to fetch key set: {0}")]
    Fetch(String),
    /// The key set endpoint returned an invalid response.
    #[error("Invalid key set response ({0}): {1}")]
    Response(StatusCode, String),
    /// The key set document could not be parsed.
    #[error("Failed to parse key set: {0}")]
    Parse(String),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}
impl<RE> From<JsonWebKeySetError<RE>> for KeySourceError
where
    RE: std::error::Error + 'static,
{
    fn from(err: JsonWebKeySetError<RE>) -> Self {
        match err {
            JsonWebKeySetError::Request(err) => KeySourceError::Fetch(err.to_string()),
            JsonWebKeySetError::Response(status, _, msg) => KeySourceError::Response(status, msg),
            JsonWebKeySetError::Parse(err) => KeySourceError::Parse(err.to_string()),
            JsonWebKeySetError::Other(msg) => KeySourceError::Other(msg),
        }
    }
}

/// Provider of candidate keys for a token.
///
/// Implementations return every key that could plausibly verify (or decrypt) a token with the
/// given key ID hint and algorithm, in the order in which they should be tried. Returning no keys
/// is not an error; the verifier rejects the token.
pub trait KeySource<K>: Debug + Send + Sync
where
    K: JsonWebKey,
{
    /// Returns candidate keys for verifying a signature made with `signature_alg`.
    fn signature_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        signature_alg: &K::SigningAlgorithm,
    ) -> Result<Vec<K>, KeySourceError>;

    /// Returns candidate keys for decrypting content protected with `key_alg` and `content_alg`.
    fn decryption_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        key_alg: &K::KeyManagementAlgorithm,
        content_alg: &K::ContentEncryptionAlgorithm,
    ) -> Result<Vec<K>, KeySourceError>;
}

impl<K> KeySource<K> for JsonWebKeySet<K>
where
    K: JsonWebKey,
{
    fn signature_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        signature_alg: &K::SigningAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        Ok(self
            .filter_keys(key_id, signature_alg)
            .into_iter()
            .cloned()
            .collect())
    }

    // The content encryption algorithm constrains the key length rather than the key type, so
    // keys of the wrong length fail when decrypting.
    fn decryption_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        key_alg: &K::KeyManagementAlgorithm,
        _content_alg: &K::ContentEncryptionAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        Ok(self
            .filter_decryption_keys(key_id, key_alg)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Shared secret registered for the client, used as the key for MAC-based signatures (e.g.,
/// `HS256`).
///
/// Per [Section 10.1](https://openid.net/specs/openid-connect-core-1_0.html#Signing) of OpenID
/// Connect Core 1.0, the octets of the UTF-8 representation of the `client_secret` are the MAC
/// key. Key ID hints are ignored.
#[derive(Clone, Debug)]
pub struct ClientSecretKeySource {
    client_secret: ClientSecret,
}
impl ClientSecretKeySource {
    /// Creates a key source backed by the given client secret.
    pub fn new(client_secret: ClientSecret) -> Self {
        Self { client_secret }
    }
}
impl<K> KeySource<K> for ClientSecretKeySource
where
    K: JsonWebKey,
{
    fn signature_keys(
        &self,
        _key_id: Option<&JsonWebKeyId>,
        signature_alg: &K::SigningAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        if !signature_alg.uses_shared_secret() {
            return Ok(Vec::new());
        }
        Ok(vec![K::new_symmetric(
            self.client_secret.secret().as_bytes().to_vec(),
        )])
    }

    fn decryption_keys(
        &self,
        _key_id: Option<&JsonWebKeyId>,
        _key_alg: &K::KeyManagementAlgorithm,
        _content_alg: &K::ContentEncryptionAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        Ok(Vec::new())
    }
}

struct CachedKeySet<K>
where
    K: JsonWebKey,
{
    keys: Arc<JsonWebKeySet<K>>,
    fetched_at: Instant,
}

/// JSON Web Key Set fetched from a remote URL and cached in memory.
///
/// The key set is fetched on first use and again once the cached copy is older than the cache
/// lifespan. A key ID that isn't in a fresh cached copy triggers one additional fetch, at most once
/// per refresh interval, to pick up keys rotated in by the provider.
///
/// Fetch failures are returned to the caller; no retries are attempted.
pub struct RemoteJsonWebKeySet<K, C>
where
    K: JsonWebKey,
    C: SyncHttpClient,
{
    url: JsonWebKeySetUrl,
    http_client: C,
    cache_lifespan: Duration,
    refresh_interval: Duration,
    cache: RwLock<Option<CachedKeySet<K>>>,
}
impl<K, C> RemoteJsonWebKeySet<K, C>
where
    K: JsonWebKey,
    C: SyncHttpClient,
{
    /// Creates a remote key set that fetches from `url` using `http_client`. Nothing is fetched
    /// until keys are first requested.
    pub fn new(url: JsonWebKeySetUrl, http_client: C) -> Self {
        Self {
            url,
            http_client,
            cache_lifespan: DEFAULT_CACHE_LIFESPAN,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            cache: RwLock::new(None),
        }
    }

    /// Sets how long a fetched key set is used before being fetched again.
    pub fn set_cache_lifespan(mut self, cache_lifespan: Duration) -> Self {
        self.cache_lifespan = cache_lifespan;
        self
    }

    /// Sets the minimum time between fetches triggered by an unknown key ID.
    pub fn set_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Returns the URL of the key set.
    pub fn url(&self) -> &JsonWebKeySetUrl {
        &self.url
    }

    fn cached(&self) -> Result<Option<(Arc<JsonWebKeySet<K>>, Instant)>, KeySourceError> {
        let cache = self
            .cache
            .read()
            .map_err(|_| KeySourceError::Other("key set cache lock poisoned".to_string()))?;
        Ok(cache
            .as_ref()
            .map(|cached| (cached.keys.clone(), cached.fetched_at)))
    }

    fn refresh(&self) -> Result<Arc<JsonWebKeySet<K>>, KeySourceError> {
        debug!("fetching JSON Web Key Set from {}", self.url);
        // The lock is only taken once the response is in hand.
        let keys = Arc::new(JsonWebKeySet::fetch(&self.url, &self.http_client)?);
        debug!("fetched {} key(s) from {}", keys.keys().len(), self.url);

        let mut cache = self
            .cache
            .write()
            .map_err(|_| KeySourceError::Other("key set cache lock poisoned".to_string()))?;
        *cache = Some(CachedKeySet {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    fn key_set(
        &self,
        key_id: Option<&JsonWebKeyId>,
    ) -> Result<Arc<JsonWebKeySet<K>>, KeySourceError> {
        let (keys, fetched_at) = match self.cached()? {
            Some(cached) => cached,
            None => return self.refresh(),
        };

        let age = fetched_at.elapsed();
        if age >= self.cache_lifespan {
            debug!("cached key set from {} expired", self.url);
            return self.refresh();
        }

        match key_id {
            Some(key_id) if !keys.contains_key_id(key_id) => {
                if age >= self.refresh_interval {
                    debug!(
                        "key ID `{}` not found in cached key set; refreshing {}",
                        **key_id, self.url
                    );
                    self.refresh()
                } else {
                    debug!(
                        "key ID `{}` not found in cached key set; refreshed too recently",
                        **key_id
                    );
                    Ok(keys)
                }
            }
            _ => Ok(keys),
        }
    }
}
impl<K, C> Debug for RemoteJsonWebKeySet<K, C>
where
    K: JsonWebKey,
    C: SyncHttpClient,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteJsonWebKeySet")
            .field("url", &self.url)
            .field("cache_lifespan", &self.cache_lifespan)
            .field("refresh_interval", &self.refresh_interval)
            .finish_non_exhaustive()
    }
}
impl<K, C> KeySource<K> for RemoteJsonWebKeySet<K, C>
where
    K: JsonWebKey,
    C: SyncHttpClient + Send + Sync,
{
    fn signature_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        signature_alg: &K::SigningAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        self.key_set(key_id)?.signature_keys(key_id, signature_alg)
    }

    fn decryption_keys(
        &self,
        key_id: Option<&JsonWebKeyId>,
        key_alg: &K::KeyManagementAlgorithm,
        content_alg: &K::ContentEncryptionAlgorithm,
    ) -> Result<Vec<K>, KeySourceError> {
        self.key_set(key_id)?
            .decryption_keys(key_id, key_alg, content_alg)
    }
}
