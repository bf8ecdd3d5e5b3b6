use crate::helpers::{
    deserialize_string_or_vec, serde_utc_seconds, serde_utc_seconds_opt, timestamp_to_utc,
    Timestamp,
};
use crate::{
    Audience, AuthenticationContextClass, AuthenticationMethodReference, ClientId, InternalError,
    IssuerUrl, Nonce, SubjectIdentifier,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;


/// Claims payload of a token whose protection has been verified but whose claims have not.
///
/// Values stay as tagged JSON until every claim check has passed.
#[derive(Clone, Debug, PartialEq)]
pub struct ClaimsSet(Map<String, Value>);
impl ClaimsSet {
    /// Wraps a JSON object of claims.
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Parses a token payload, which must be a JSON object.
    pub(crate) fn from_payload(payload: &[u8]) -> Result<Self, InternalError> {
        match serde_json::from_slice::<Value>(payload) {
            Ok(Value::Object(claims)) => Ok(Self(claims)),
            Ok(_) => Err(InternalError::MalformedClaims(
                "claims payload is not a JSON object".to_string(),
            )),
            Err(err) => Err(InternalError::MalformedClaims(format!(
                "claims payload is not valid JSON: {}",
                err
            ))),
        }
    }

    /// Returns the raw value of the named claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the named claim if it is a JSON string.
    pub fn string(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns the `aud` claim, which may be a single string or an array of strings.
    ///
    /// Returns `None` if the claim is missing or has any other shape.
    pub fn audiences(&self) -> Option<Vec<&str>> {
        match self.0.get("aud")? {
            Value::String(aud) => Some(vec![aud.as_str()]),
            Value::Array(entries) => entries.iter().map(Value::as_str).collect(),
            _ => None,
        }
    }

    /// Returns the named NumericDate claim (RFC 7519, Section 2).
    ///
    /// Returns `None` if the claim is missing or is not a valid timestamp.
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        let timestamp: Timestamp = serde_json::from_value(self.0.get(name)?.clone()).ok()?;
        timestamp_to_utc(&timestamp).ok()
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn into_id_token_claims(self) -> Result<IdTokenClaims, InternalError> {
        serde_path_to_error::deserialize(Value::Object(self.0))
            .map_err(|err| InternalError::MalformedClaims(err.to_string()))
    }
}

/// Verified ID token claims.
///
/// See [Section 2](https://openid.net/specs/openid-connect-core-1_0.html#IDToken) of OpenID
/// Connect Core 1.0. Instances are only produced by
/// [`IdTokenVerifier::verify`](crate::IdTokenVerifier::verify).
#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdTokenClaims {
    #[serde(rename = "iss")]
    issuer: IssuerUrl,
    #[serde(rename = "sub")]
    subject: SubjectIdentifier,
    // Always serialized as an array, which RFC 7519 permits for a single audience as well.
    #[serde(rename = "aud", deserialize_with = "deserialize_string_or_vec")]
    audiences: Vec<Audience>,
    #[serde(rename = "exp", with = "serde_utc_seconds")]
    expiration: DateTime<Utc>,
    #[serde(rename = "iat", with = "serde_utc_seconds")]
    issue_time: DateTime<Utc>,
    #[serde(default, with = "serde_utc_seconds_opt")]
    auth_time: Option<DateTime<Utc>>,
    #[serde(default)]
    nonce: Option<Nonce>,
    #[serde(default, rename = "acr")]
    auth_context_ref: Option<AuthenticationContextClass>,
    #[serde(default, rename = "amr")]
    auth_method_refs: Option<Vec<AuthenticationMethodReference>>,
    #[serde(default, rename = "azp")]
    authorized_party: Option<ClientId>,

    #[serde(flatten)]
    additional_claims: Map<String, Value>,
}
impl IdTokenClaims {
    field_getters![
        pub self [self] {
            issuer[IssuerUrl] ["iss"],
            subject[SubjectIdentifier] ["sub"],
            audiences[Vec<Audience>] ["aud"],
            expiration[DateTime<Utc>] ["exp"],
            issue_time[DateTime<Utc>] ["iat"],
            nonce[Option<Nonce>] ["nonce"],
            auth_context_ref[Option<AuthenticationContextClass>] ["acr"],
            auth_method_refs[Option<Vec<AuthenticationMethodReference>>] ["amr"],
            authorized_party[Option<ClientId>] ["azp"],
        }
    ];

    /// Returns the `auth_time` claim, if present.
    pub fn auth_time(&self) -> Option<DateTime<Utc>> {
        self.auth_time
    }

    /// Returns claims other than the ones with dedicated getters.
    pub fn additional_claims(&self) -> &Map<String, Value> {
        &self.additional_claims
    }
}
