use crate::claims::{ClaimsSet, IdTokenClaims};
use crate::jwt::{EncryptedToken, JsonWebToken, SignedToken, UnsecuredToken};
use crate::{
    AuthenticationContextClass, ClientId, ClientSecret, ClientSecretKeySource, IssuerUrl,
    JsonWebKey, JsonWebKeySet, JsonWebKeySetUrl, JweKeySelector, JwsKeySelector, KeySourceError,
    Nonce, RemoteJsonWebKeySet, SyncHttpClient,
};

use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use thiserror::Error;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;


/// Error verifying a signature with a particular key.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SignatureVerificationError {
    /// Invalid signature for the supplied claims and signing key.
    #[error("Crypto error: {0}")]
    CryptoError(String),
    /// The supplied key cannot be used in this context. This may occur if the key type does not
    /// match the signature type (e.g., an RSA key used to validate an HMAC) or the JWK usage
    /// disallows signatures.
    #[error("Invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// Unsupported signature algorithm.
    #[error("Unsupported signature algorithm: {0}")]
    UnsupportedAlg(String),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}

/// Error decrypting JWE content with a particular key.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecryptionError {
    /// The content failed to decrypt or authenticate.
    #[error("Crypto error: {0}")]
    CryptoError(String),
    /// The supplied key cannot be used in this context (e.g., wrong key type or length, or the
    /// JWK usage disallows encryption).
    #[error("Invalid cryptographic key: {0}")]
    InvalidKey(String),
    /// Unsupported key management or content encryption algorithm.
    #[error("Unsupported encryption algorithm: {0}")]
    UnsupportedAlg(String),
    /// An unexpected error occurred.
    #[error("Other error: {0}")]
    Other(String),
}

/// The token's protection doesn't meet the verifier's requirements, or failed to verify.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BadTokenError {
    /// An unsecured token was presented to a verifier that requires signatures.
    #[error("Signature required: {0}")]
    SignatureRequired(String),
    /// A signed token was presented to a verifier without a JWS key selector.
    #[error("Signature verification not configured: {0}")]
    VerificationNotConfigured(String),
    /// The signature didn't verify with any candidate key.
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),
    /// An encrypted token was presented to a verifier without a JWE key selector.
    #[error("Decryption not configured: {0}")]
    DecryptionNotConfigured(String),
    /// The content didn't decrypt with any candidate key.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
    /// Candidate keys could not be obtained.
    #[error("Key source unavailable")]
    KeySourceUnavailable(#[source] KeySourceError),
}

/// A claim failed validation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClaimError {
    /// The `iss` claim is missing or doesn't match the expected issuer.
    #[error("Invalid issuer: {0}")]
    IssuerMismatch(String),
    /// The `aud` claim is missing or doesn't contain the client ID.
    #[error("Invalid audiences: {0}")]
    AudienceMismatch(String),
    /// Multiple audiences without an `azp` claim naming the client.
    #[error("Ambiguous audience: {0}")]
    AmbiguousAudience(String),
    /// The token has expired.
    #[error("Expired: {0}")]
    Expired(String),
    /// The `iat` claim is missing or in the future.
    #[error("Invalid issue time: {0}")]
    IssuedAtInvalid(String),
    /// The `nonce` claim doesn't match the expected nonce.
    #[error("Invalid nonce: {0}")]
    NonceMismatch(String),
    /// The `sub` claim is missing.
    #[error("Invalid subject: {0}")]
    MissingSubject(String),
    /// The authentication context class reference (`acr`) was rejected.
    #[error("Invalid authorization context class reference: {0}")]
    InvalidAuthContext(String),
    /// The authentication time (`auth_time`) was rejected.
    #[error("Invalid authentication time: {0}")]
    InvalidAuthTime(String),
}

/// The token couldn't be interpreted.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum InternalError {
    /// The token isn't a compact JWS or JWE this crate understands.
    #[error("Unrecognized token: {0}")]
    UnrecognizedTokenShape(String),
    /// The verified payload couldn't be interpreted as ID token claims.
    #[error("Malformed claims: {0}")]
    MalformedClaims(String),
}

/// Error returned by [`IdTokenVerifier::verify`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdTokenVerificationError {
    /// The token's protection is missing or invalid.
    #[error("Bad token: {0}")]
    BadToken(#[from] BadTokenError),
    /// A claim failed validation.
    #[error("Claims verification failed: {0}")]
    Claim(#[from] ClaimError),
    /// The token or its claims couldn't be interpreted.
    #[error("Token could not be processed: {0}")]
    Internal(#[from] InternalError),
}

/// Validates the claims of an ID token whose protection has already been verified.
///
/// The checks follow
/// [Section 3.1.3.7](https://openid.net/specs/openid-connect-core-1_0.html#IDTokenValidation)
/// of OpenID Connect Core 1.0 and run in a fixed order, returning the first failure.
#[derive(Clone, Debug)]
pub struct ClaimsValidator {
    issuer: IssuerUrl,
    client_id: ClientId,
    clock_skew: Duration,
}
impl ClaimsValidator {
    /// Creates a validator expecting tokens issued by `issuer` for `client_id`, with no clock
    /// skew tolerance.
    pub fn new(issuer: IssuerUrl, client_id: ClientId) -> Self {
        Self {
            issuer,
            client_id,
            clock_skew: Duration::zero(),
        }
    }

    /// Sets the tolerance applied to the `exp` and `iat` checks.
    pub fn set_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.clock_skew = clock_skew;
        self
    }

    /// Returns the clock skew tolerance.
    pub fn clock_skew(&self) -> Duration {
        self.clock_skew
    }

    /// Validates `claims` at time `now`. The `nonce` claim is only checked if `expected_nonce` is
    /// provided.
    pub fn validate(
        &self,
        claims: &ClaimsSet,
        expected_nonce: Option<&Nonce>,
        now: DateTime<Utc>,
    ) -> Result<(), ClaimError> {
        // The issuer must match exactly.
        match claims.string("iss") {
            Some(issuer) if issuer == self.issuer.as_str() => {}
            Some(issuer) => {
                return Err(ClaimError::IssuerMismatch(format!(
                    "expected `{}` (found `{}`)",
                    *self.issuer, issuer
                )))
            }
            None => {
                return Err(ClaimError::IssuerMismatch("missing issuer claim".to_string()))
            }
        }

        let audiences = claims
            .audiences()
            .ok_or_else(|| ClaimError::AudienceMismatch("missing audiences claim".to_string()))?;
        if !audiences.iter().any(|aud| *aud == self.client_id.as_str()) {
            return Err(ClaimError::AudienceMismatch(format!(
                "must contain `{}` (found audiences: {})",
                *self.client_id,
                audiences
                    .iter()
                    .map(|aud| format!("`{}`", aud))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        // An `azp` is only required to disambiguate multiple audiences.
        if audiences.len() > 1 {
            match claims.string("azp") {
                Some(azp) if azp == self.client_id.as_str() => {}
                Some(azp) => {
                    return Err(ClaimError::AmbiguousAudience(format!(
                        "authorized party must match client ID `{}` (found `{}`)",
                        *self.client_id, azp
                    )))
                }
                None => {
                    return Err(ClaimError::AmbiguousAudience(
                        "missing authorized party claim but multiple audiences found".to_string(),
                    ))
                }
            }
        }

        let expiration = claims
            .timestamp("exp")
            .ok_or_else(|| ClaimError::Expired("missing expiration claim".to_string()))?;
        // A deadline past the representable range is only reachable with a positive skew.
        let expired = match expiration.checked_add_signed(self.clock_skew) {
            Some(deadline) => now >= deadline,
            None => self.clock_skew < Duration::zero(),
        };
        if expired {
            return Err(ClaimError::Expired(format!(
                "ID token expired at {} (current time is {})",
                expiration, now
            )));
        }

        let issue_time = claims
            .timestamp("iat")
            .ok_or_else(|| ClaimError::IssuedAtInvalid("missing issue time claim".to_string()))?;
        let issued_in_future = match now.checked_add_signed(self.clock_skew) {
            Some(latest) => issue_time > latest,
            None => self.clock_skew < Duration::zero(),
        };
        if issued_in_future {
            return Err(ClaimError::IssuedAtInvalid(format!(
                "ID token issued in the future at {} (current time is {})",
                issue_time, now
            )));
        }

        if let Some(expected_nonce) = expected_nonce {
            match claims.string("nonce") {
                Some(nonce) if expected_nonce.matches(nonce) => {}
                Some(_) => {
                    return Err(ClaimError::NonceMismatch("nonce mismatch".to_string()))
                }
                None => {
                    return Err(ClaimError::NonceMismatch("missing nonce claim".to_string()))
                }
            }
        }

        if claims.string("sub").is_none() {
            return Err(ClaimError::MissingSubject("missing subject claim".to_string()));
        }

        Ok(())
    }
}

/// ID token verifier.
///
/// The verifier accepts a token in whichever protection state the token itself declares, and
/// requires that state to match its configuration:
///
/// | Token | Requires |
/// |---|---|
/// | Unsecured (`"alg": "none"`) | no JWS key selector |
/// | Signed (JWS) | a JWS key selector |
/// | Signed, then encrypted (JWE containing a JWS) | a JWE key selector and a JWS key selector |
///
/// A verifier is immutable once built and may be shared across threads.
#[derive(Clone)]
pub struct IdTokenVerifier<K>
where
    K: JsonWebKey,
{
    claims_validator: ClaimsValidator,
    jws_key_selector: Option<JwsKeySelector<K>>,
    jwe_key_selector: Option<JweKeySelector<K>>,
    acr_verifier_fn:
        Arc<dyn Fn(Option<&AuthenticationContextClass>) -> Result<(), String> + Send + Sync>,
    #[allow(clippy::type_complexity)]
    auth_time_verifier_fn: Arc<dyn Fn(Option<DateTime<Utc>>) -> Result<(), String> + Send + Sync>,
    time_fn: Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}
impl<K> IdTokenVerifier<K>
where
    K: JsonWebKey,
{
    /// Initializes a verifier from explicit key selectors.
    ///
    /// Without a JWS key selector the verifier accepts only unsecured tokens. Without a JWE key
    /// selector it rejects encrypted tokens.
    pub fn new(
        issuer: IssuerUrl,
        client_id: ClientId,
        jws_key_selector: Option<JwsKeySelector<K>>,
        jwe_key_selector: Option<JweKeySelector<K>>,
    ) -> Self {
        if jws_key_selector.is_none() {
            warn!(
                "ID token verifier for issuer {} accepts only unsecured tokens",
                issuer
            );
        }
        IdTokenVerifier {
            claims_validator: ClaimsValidator::new(issuer, client_id),
            jws_key_selector,
            jwe_key_selector,
            // By default, accept any authentication context class reference (acr claim).
            acr_verifier_fn: Arc::new(|_| Ok(())),
            auth_time_verifier_fn: Arc::new(|_| Ok(())),
            // By default, use the current system time.
            time_fn: Arc::new(Utc::now),
        }
    }

    /// Initializes a verifier that accepts only unsecured (`"alg": "none"`) ID tokens.
    ///
    /// # Security Warning
    ///
    /// Unsecured ID tokens may be subject to forgery. This is only appropriate when the token is
    /// received directly from the token endpoint over TLS, as described in
    /// [Section 3.1.3.7](https://openid.net/specs/openid-connect-core-1_0.html#IDTokenValidation).
    pub fn new_unsecured(issuer: IssuerUrl, client_id: ClientId) -> Self {
        Self::new(issuer, client_id, None, None)
    }

    /// Initializes a verifier for tokens signed with `signing_alg` by one of the keys in
    /// `key_set`.
    pub fn new_with_key_set(
        issuer: IssuerUrl,
        client_id: ClientId,
        signing_alg: K::SigningAlgorithm,
        key_set: JsonWebKeySet<K>,
    ) -> Self {
        let selector = JwsKeySelector::new(issuer.clone(), signing_alg, Arc::new(key_set));
        Self::new(issuer, client_id, Some(selector), None)
    }

    /// Initializes a verifier for tokens signed with `signing_alg` by one of the keys published
    /// at `key_set_url`, which is fetched with `http_client` and cached.
    pub fn new_with_key_set_url<C>(
        issuer: IssuerUrl,
        client_id: ClientId,
        signing_alg: K::SigningAlgorithm,
        key_set_url: JsonWebKeySetUrl,
        http_client: C,
    ) -> Self
    where
        C: SyncHttpClient + Send + Sync + 'static,
    {
        let key_source = RemoteJsonWebKeySet::<K, C>::new(key_set_url, http_client);
        let selector = JwsKeySelector::new(issuer.clone(), signing_alg, Arc::new(key_source));
        Self::new(issuer, client_id, Some(selector), None)
    }

    /// Initializes a verifier for tokens MACed with `signing_alg` (e.g., `HS256`) using the
    /// client secret as the key.
    pub fn new_with_client_secret(
        issuer: IssuerUrl,
        client_id: ClientId,
        signing_alg: K::SigningAlgorithm,
        client_secret: ClientSecret,
    ) -> Self {
        let selector = JwsKeySelector::new(
            issuer.clone(),
            signing_alg,
            Arc::new(ClientSecretKeySource::new(client_secret)),
        );
        Self::new(issuer, client_id, Some(selector), None)
    }

    /// Returns the expected issuer of ID tokens.
    pub fn expected_issuer(&self) -> &IssuerUrl {
        &self.claims_validator.issuer
    }

    /// Returns the client ID expected in the audience of ID tokens.
    pub fn client_id(&self) -> &ClientId {
        &self.claims_validator.client_id
    }

    /// Returns the JWS key selector, or `None` if only unsecured tokens are accepted.
    pub fn jws_key_selector(&self) -> Option<&JwsKeySelector<K>> {
        self.jws_key_selector.as_ref()
    }

    /// Returns the JWE key selector, or `None` if encrypted tokens are rejected.
    pub fn jwe_key_selector(&self) -> Option<&JweKeySelector<K>> {
        self.jwe_key_selector.as_ref()
    }

    /// Returns the validator applied to the claims of each token.
    pub fn claims_validator(&self) -> &ClaimsValidator {
        &self.claims_validator
    }

    /// Sets the tolerance applied to the `exp` and `iat` checks. Defaults to zero.
    pub fn set_clock_skew(mut self, clock_skew: Duration) -> Self {
        self.claims_validator = self.claims_validator.set_clock_skew(clock_skew);
        self
    }

    /// Specifies a function for returning the current time.
    ///
    /// This function is used for verifying the ID token expiration and issue times.
    pub fn set_time_fn<T>(mut self, time_fn: T) -> Self
    where
        T: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.time_fn = Arc::new(time_fn);
        self
    }

    /// Specifies a function for verifying the `acr` claim.
    ///
    /// The function should return `Ok(())` if the claim is valid, or a string describing the error
    /// otherwise.
    pub fn set_auth_context_verifier_fn<T>(mut self, acr_verifier_fn: T) -> Self
    where
        T: Fn(Option<&AuthenticationContextClass>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.acr_verifier_fn = Arc::new(acr_verifier_fn);
        self
    }

    /// Specifies a function for verifying the `auth_time` claim.
    ///
    /// The function should return `Ok(())` if the claim is valid, or a string describing the error
    /// otherwise.
    pub fn set_auth_time_verifier_fn<T>(mut self, auth_time_verifier_fn: T) -> Self
    where
        T: Fn(Option<DateTime<Utc>>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.auth_time_verifier_fn = Arc::new(auth_time_verifier_fn);
        self
    }

    /// Verifies a compact-serialized ID token and returns its claims.
    ///
    /// If `expected_nonce` is provided, the token must carry the same `nonce` claim. No claims
    /// are returned unless the token's protection and every claim check pass.
    pub fn verify(
        &self,
        token: &str,
        expected_nonce: Option<&Nonce>,
    ) -> Result<IdTokenClaims, IdTokenVerificationError> {
        let claims = match JsonWebToken::<K>::parse(token)? {
            JsonWebToken::Unsecured(unsecured) => self.unsecured_claims(unsecured)?,
            JsonWebToken::Signed(signed) => self.signed_claims(&signed)?,
            JsonWebToken::Encrypted(encrypted) => self.encrypted_claims(&encrypted)?,
        };

        self.verify_claims(&claims, expected_nonce)?;
        Ok(claims.into_id_token_claims()?)
    }

    fn unsecured_claims(
        &self,
        token: UnsecuredToken,
    ) -> Result<ClaimsSet, IdTokenVerificationError> {
        debug!("verifying unsecured ID token");
        if self.jws_key_selector.is_some() {
            return Err(BadTokenError::SignatureRequired(
                "unsecured ID token rejected; a signed ID token is expected".to_string(),
            )
            .into());
        }
        Ok(ClaimsSet::from_payload(&token.payload)?)
    }

    fn signed_claims(&self, token: &SignedToken<K>) -> Result<ClaimsSet, IdTokenVerificationError> {
        debug!(
            "verifying signed ID token (kid: {:?}, typ: {:?})",
            token.header.kid.as_ref().map(|kid| kid.as_str()),
            token.header.typ
        );
        let selector = self.jws_key_selector.as_ref().ok_or_else(|| {
            BadTokenError::VerificationNotConfigured(
                "verification of signed ID tokens is not configured".to_string(),
            )
        })?;
        selector.verify_signature(token)?;
        Ok(ClaimsSet::from_payload(&token.payload)?)
    }

    fn encrypted_claims(
        &self,
        token: &EncryptedToken<K>,
    ) -> Result<ClaimsSet, IdTokenVerificationError> {
        debug!(
            "verifying encrypted ID token (kid: {:?}, cty: {:?})",
            token.header.kid.as_ref().map(|kid| kid.as_str()),
            token.header.cty
        );
        let jwe_key_selector = self.jwe_key_selector.as_ref().ok_or_else(|| {
            BadTokenError::DecryptionNotConfigured(
                "decryption of ID tokens is not configured".to_string(),
            )
        })?;
        if self.jws_key_selector.is_none() {
            return Err(BadTokenError::VerificationNotConfigured(
                "verification of signed ID tokens is not configured".to_string(),
            )
            .into());
        }

        let plaintext = jwe_key_selector.decrypt(token)?;
        let nested = std::str::from_utf8(&plaintext).map_err(|_| {
            InternalError::UnrecognizedTokenShape("decrypted content is not UTF-8".to_string())
        })?;

        // OpenID Connect requires encrypted ID tokens to be signed first.
        match JsonWebToken::<K>::parse(nested)? {
            JsonWebToken::Signed(signed) => self.signed_claims(&signed),
            JsonWebToken::Unsecured(_) => Err(BadTokenError::SignatureRequired(
                "encrypted ID token does not contain a signed token".to_string(),
            )
            .into()),
            JsonWebToken::Encrypted(_) => Err(InternalError::UnrecognizedTokenShape(
                "nested encryption is unsupported".to_string(),
            )
            .into()),
        }
    }

    fn verify_claims(
        &self,
        claims: &ClaimsSet,
        expected_nonce: Option<&Nonce>,
    ) -> Result<(), ClaimError> {
        let now = (*self.time_fn)();
        self.claims_validator
            .validate(claims, expected_nonce, now)
            .map_err(|err| {
                debug!("ID token claims rejected: {}", err);
                err
            })?;

        // If the acr Claim was requested, the Client SHOULD check that the asserted Claim Value
        // is appropriate.
        let auth_context_ref = claims
            .string("acr")
            .map(|acr| AuthenticationContextClass::new(acr.to_string()));
        (*self.acr_verifier_fn)(auth_context_ref.as_ref())
            .map_err(ClaimError::InvalidAuthContext)?;

        // If the auth_time Claim was requested, the Client SHOULD check the auth_time Claim value
        // and request re-authentication if too much time has elapsed.
        (*self.auth_time_verifier_fn)(claims.timestamp("auth_time"))
            .map_err(ClaimError::InvalidAuthTime)?;

        Ok(())
    }
}
impl<K> Debug for IdTokenVerifier<K>
where
    K: JsonWebKey,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdTokenVerifier")
            .field("claims_validator", &self.claims_validator)
            .field("jws_key_selector", &self.jws_key_selector)
            .field("jwe_key_selector", &self.jwe_key_selector)
            .finish_non_exhaustive()
    }
}
