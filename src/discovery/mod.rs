use crate::{IssuerUrl, JsonWebKey, JsonWebKeySetUrl};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{serde_as, skip_serializing_none, VecSkipError};


/// Provider metadata as published by [OpenID Connect Discovery](
/// https://openid.net/specs/openid-connect-discovery-1_0.html#ProviderMetadata).
///
/// Only the members that govern ID token protection are modeled; every other member is retained
/// in [`additional_metadata`](ProviderMetadata::additional_metadata). Unrecognized algorithms in
/// the advertised lists are skipped rather than failing deserialization.
#[serde_as]
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata<K>
where
    K: JsonWebKey,
{
    issuer: IssuerUrl,
    jwks_uri: Option<JsonWebKeySetUrl>,
    #[serde(bound(deserialize = "K: JsonWebKey"))]
    #[serde_as(as = "VecSkipError<_>")]
    id_token_signing_alg_values_supported: Vec<K::SigningAlgorithm>,
    #[serde(bound(deserialize = "K: JsonWebKey"), default = "Option::default")]
    #[serde_as(as = "Option<VecSkipError<_>>")]
    id_token_encryption_alg_values_supported: Option<Vec<K::KeyManagementAlgorithm>>,
    #[serde(bound(deserialize = "K: JsonWebKey"), default = "Option::default")]
    #[serde_as(as = "Option<VecSkipError<_>>")]
    id_token_encryption_enc_values_supported: Option<Vec<K::ContentEncryptionAlgorithm>>,

    #[serde(flatten)]
    additional_metadata: Map<String, Value>,
}
impl<K> ProviderMetadata<K>
where
    K: JsonWebKey,
{
    /// Instantiates new provider metadata.
    pub fn new(
        issuer: IssuerUrl,
        id_token_signing_alg_values_supported: Vec<K::SigningAlgorithm>,
    ) -> Self {
        Self {
            issuer,
            jwks_uri: None,
            id_token_signing_alg_values_supported,
            id_token_encryption_alg_values_supported: None,
            id_token_encryption_enc_values_supported: None,
            additional_metadata: Map::new(),
        }
    }

    field_getters_setters![
        pub self [self] ["provider metadata value"] {
            set_issuer -> issuer[IssuerUrl],
            set_jwks_uri -> jwks_uri[Option<JsonWebKeySetUrl>],
            set_id_token_signing_alg_values_supported
                -> id_token_signing_alg_values_supported[Vec<K::SigningAlgorithm>],
            set_id_token_encryption_alg_values_supported
                -> id_token_encryption_alg_values_supported[Option<Vec<K::KeyManagementAlgorithm>>],
            set_id_token_encryption_enc_values_supported
                -> id_token_encryption_enc_values_supported[Option<Vec<K::ContentEncryptionAlgorithm>>],
        }
    ];

    /// Returns the provider metadata members that aren't modeled above.
    pub fn additional_metadata(&self) -> &Map<String, Value> {
        &self.additional_metadata
    }
}
