//! Compact JOSE serialization: splitting a token into its protection state.

use crate::helpers::base64url_decode;
use crate::types::jwk::JweContent;
use crate::{
    InternalError, JsonWebKey, JsonWebKeyId, JweKeyManagementAlgorithm, JwsSigningAlgorithm,
};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};


/// Value of the JOSE header `alg` parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum JsonWebTokenAlgorithm<JK, JS>
where
    JK: JweKeyManagementAlgorithm,
    JS: JwsSigningAlgorithm,
{
    KeyManagement(JK),
    Signature(JS),
    /// No digital signature or MAC performed.
    None,
}
impl<'de, JK, JS> Deserialize<'de> for JsonWebTokenAlgorithm<JK, JS>
where
    JK: JweKeyManagementAlgorithm,
    JS: JwsSigningAlgorithm,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
        let s: String = serde_json::from_value(value.clone()).map_err(D::Error::custom)?;

        // NB: These comparisons are case-sensitive. Section 4.1.1 of RFC 7515 states: "The "alg"
        // value is a case-sensitive ASCII string containing a StringOrURI value."
        if s == "none" {
            Ok(JsonWebTokenAlgorithm::None)
        } else if let Ok(val) = serde_json::from_value::<JS>(value.clone()) {
            Ok(JsonWebTokenAlgorithm::Signature(val))
        } else if let Ok(val) = serde_json::from_value::<JK>(value) {
            Ok(JsonWebTokenAlgorithm::KeyManagement(val))
        } else {
            Err(D::Error::custom(format!(
                "unrecognized JSON Web Algorithm `{}`",
                s
            )))
        }
    }
}

/// JOSE header shared by JWS and JWE compact serializations.
#[derive(Clone, Debug, Deserialize)]
#[serde(bound = "K: JsonWebKey")]
pub(crate) struct JsonWebTokenHeader<K>
where
    K: JsonWebKey,
{
    pub alg: JsonWebTokenAlgorithm<K::KeyManagementAlgorithm, K::SigningAlgorithm>,
    #[serde(default)]
    pub enc: Option<K::ContentEncryptionAlgorithm>,
    // Additional critical header parameters that must be understood by this implementation. Since
    // we don't understand any such extensions, we reject any JWT with this value present.
    // See https://tools.ietf.org/html/rfc7515#section-4.1.11.
    #[serde(default)]
    pub crit: Option<Vec<String>>,
    #[serde(default)]
    pub cty: Option<String>,
    #[serde(default)]
    pub kid: Option<JsonWebKeyId>,
    #[serde(default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
}

/// Token whose header declares `"alg": "none"`.
#[derive(Clone, Debug)]
pub(crate) struct UnsecuredToken {
    pub payload: Vec<u8>,
}

/// JWS compact serialization.
#[derive(Clone, Debug)]
pub(crate) struct SignedToken<K>
where
    K: JsonWebKey,
{
    pub header: JsonWebTokenHeader<K>,
    pub alg: K::SigningAlgorithm,
    pub payload: Vec<u8>,
    /// ASCII `BASE64URL(header) || '.' || BASE64URL(payload)`.
    pub signing_input: String,
    pub signature: Vec<u8>,
}

/// JWE compact serialization.
#[derive(Clone, Debug)]
pub(crate) struct EncryptedToken<K>
where
    K: JsonWebKey,
{
    pub header: JsonWebTokenHeader<K>,
    pub alg: K::KeyManagementAlgorithm,
    pub enc: K::ContentEncryptionAlgorithm,
    protected: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}
impl<K> EncryptedToken<K>
where
    K: JsonWebKey,
{
    pub fn content(&self) -> JweContent<'_> {
        JweContent {
            aad: self.protected.as_bytes(),
            encrypted_key: &self.encrypted_key,
            iv: &self.iv,
            ciphertext: &self.ciphertext,
            tag: &self.tag,
        }
    }
}

/// A compact-serialized token, classified by its own structure.
#[derive(Clone, Debug)]
pub(crate) enum JsonWebToken<K>
where
    K: JsonWebKey,
{
    Unsecured(UnsecuredToken),
    Signed(SignedToken<K>),
    Encrypted(EncryptedToken<K>),
}
impl<K> JsonWebToken<K>
where
    K: JsonWebKey,
{
    /// Parses a compact serialization. Three segments are a JWS (or an unsecured JWT), five are a
    /// JWE; anything else is rejected.
    pub fn parse(token: &str) -> Result<Self, InternalError> {
        let parts = token.split('.').collect::<Vec<_>>();
        match parts.len() {
            3 => Self::parse_jws(parts[0], parts[1], parts[2]),
            5 => Self::parse_jwe(&parts),
            n => Err(InternalError::UnrecognizedTokenShape(format!(
                "found {} parts (expected 3 or 5)",
                n
            ))),
        }
    }

    fn parse_header(header_b64: &str) -> Result<JsonWebTokenHeader<K>, InternalError> {
        let header_json = decode_segment(header_b64, "header")?;
        let header: JsonWebTokenHeader<K> =
            serde_json::from_slice(&header_json).map_err(|err| {
                InternalError::UnrecognizedTokenShape(format!(
                    "Failed to parse header JSON: {}",
                    err
                ))
            })?;

        if header.crit.is_some() {
            // https://tools.ietf.org/html/rfc7515#appendix-E
            return Err(InternalError::UnrecognizedTokenShape(
                "critical JWT header fields are unsupported".to_string(),
            ));
        }
        Ok(header)
    }

    fn parse_jws(
        header_b64: &str,
        payload_b64: &str,
        signature_b64: &str,
    ) -> Result<Self, InternalError> {
        let header = Self::parse_header(header_b64)?;
        let payload = decode_segment(payload_b64, "payload")?;

        match header.alg.clone() {
            JsonWebTokenAlgorithm::None => {
                // RFC 7519, Section 6.1: an Unsecured JWS uses the empty string for its signature.
                if !signature_b64.is_empty() {
                    return Err(InternalError::UnrecognizedTokenShape(
                        "unsecured token must have an empty signature".to_string(),
                    ));
                }
                Ok(JsonWebToken::Unsecured(UnsecuredToken { payload }))
            }
            JsonWebTokenAlgorithm::Signature(alg) => {
                let signature = decode_segment(signature_b64, "signature")?;
                Ok(JsonWebToken::Signed(SignedToken {
                    header,
                    alg,
                    payload,
                    signing_input: format!("{}.{}", header_b64, payload_b64),
                    signature,
                }))
            }
            JsonWebTokenAlgorithm::KeyManagement(_) => Err(InternalError::UnrecognizedTokenShape(
                "JWE key management algorithm in a three-part token".to_string(),
            )),
        }
    }

    fn parse_jwe(parts: &[&str]) -> Result<Self, InternalError> {
        let header = Self::parse_header(parts[0])?;

        if header.zip.is_some() {
            return Err(InternalError::UnrecognizedTokenShape(
                "compressed JWE content is unsupported".to_string(),
            ));
        }
        let alg = match header.alg.clone() {
            JsonWebTokenAlgorithm::KeyManagement(alg) => alg,
            _ => {
                return Err(InternalError::UnrecognizedTokenShape(
                    "five-part token must use a JWE key management algorithm".to_string(),
                ))
            }
        };
        let enc = header.enc.clone().ok_or_else(|| {
            InternalError::UnrecognizedTokenShape("JWE header is missing `enc`".to_string())
        })?;

        Ok(JsonWebToken::Encrypted(EncryptedToken {
            alg,
            enc,
            protected: parts[0].to_string(),
            encrypted_key: decode_segment(parts[1], "encrypted key")?,
            iv: decode_segment(parts[2], "initialization vector")?,
            ciphertext: decode_segment(parts[3], "ciphertext")?,
            tag: decode_segment(parts[4], "authentication tag")?,
            header,
        }))
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, InternalError> {
    base64url_decode(segment).map_err(|err| {
        InternalError::UnrecognizedTokenShape(format!(
            "Invalid base64url {} encoding: {:?}",
            name, err
        ))
    })
}
