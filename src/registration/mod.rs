use crate::{ClientId, ClientSecret, JsonWebKey, JsonWebKeySet, JsonWebKeySetUrl};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;


/// Client metadata registered with the OpenID Connect Provider, as defined in
/// [OpenID Connect Dynamic Client Registration](
/// https://openid.net/specs/openid-connect-registration-1_0.html#ClientMetadata).
///
/// Only the members that govern ID token protection are modeled; every other member is retained
/// in [`additional_metadata`](ClientMetadata::additional_metadata).
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(bound(deserialize = "K: JsonWebKey"))]
pub struct ClientMetadata<K>
where
    K: JsonWebKey,
{
    jwks_uri: Option<JsonWebKeySetUrl>,
    jwks: Option<JsonWebKeySet<K>>,
    id_token_signed_response_alg: Option<K::SigningAlgorithm>,
    id_token_encrypted_response_alg: Option<K::KeyManagementAlgorithm>,
    id_token_encrypted_response_enc: Option<K::ContentEncryptionAlgorithm>,

    #[serde(flatten)]
    additional_metadata: Map<String, Value>,
}
impl<K> ClientMetadata<K>
where
    K: JsonWebKey,
{
    /// Instantiates new client metadata with no ID token protection configured.
    pub fn new() -> Self {
        Self {
            jwks_uri: None,
            jwks: None,
            id_token_signed_response_alg: None,
            id_token_encrypted_response_alg: None,
            id_token_encrypted_response_enc: None,
            additional_metadata: Map::new(),
        }
    }

    field_getters_setters![
        pub self [self] ["client metadata value"] {
            set_jwks_uri -> jwks_uri[Option<JsonWebKeySetUrl>],
            set_jwks -> jwks[Option<JsonWebKeySet<K>>],
            set_id_token_signed_response_alg
                -> id_token_signed_response_alg[Option<K::SigningAlgorithm>],
            set_id_token_encrypted_response_alg
                -> id_token_encrypted_response_alg[Option<K::KeyManagementAlgorithm>],
            set_id_token_encrypted_response_enc
                -> id_token_encrypted_response_enc[Option<K::ContentEncryptionAlgorithm>],
        }
    ];

    /// Returns the client metadata members that aren't modeled above.
    pub fn additional_metadata(&self) -> &Map<String, Value> {
        &self.additional_metadata
    }
}
impl<K> Default for ClientMetadata<K>
where
    K: JsonWebKey,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Client registration: the credentials issued to the client together with its registered
/// metadata.
///
/// Deserializes from a [Client Registration Response](
/// https://openid.net/specs/openid-connect-registration-1_0.html#RegistrationResponse).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClientInformation<K>
where
    K: JsonWebKey,
{
    client_id: ClientId,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    client_secret: Option<ClientSecret>,
    #[serde(bound = "K: JsonWebKey", flatten)]
    metadata: ClientMetadata<K>,
}
impl<K> ClientInformation<K>
where
    K: JsonWebKey,
{
    /// Instantiates new client information.
    pub fn new(
        client_id: ClientId,
        client_secret: Option<ClientSecret>,
        metadata: ClientMetadata<K>,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            metadata,
        }
    }

    field_getters_setters![
        pub self [self] ["client information value"] {
            set_client_id -> client_id[ClientId],
            set_client_secret -> client_secret[Option<ClientSecret>],
            set_metadata -> metadata[ClientMetadata<K>],
        }
    ];
}
