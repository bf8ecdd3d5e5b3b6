#![warn(missing_docs)]
#![allow(clippy::unreadable_literal, clippy::type_complexity)]
#![cfg_attr(test, allow(clippy::cognitive_complexity))]
//!
//! Verification of [OpenID Connect](https://openid.net/specs/openid-connect-core-1_0.html)
//! ID tokens on behalf of a Relying Party.
//!
//! An ID token reaches a client in one of three states: unsecured (`"alg": "none"`), signed
//! (a compact JWS), or signed and then encrypted (a compact JWE whose plaintext is a JWS). An
//! [`IdTokenVerifier`] accepts only the state its configuration calls for, verifies the token's
//! protection with keys chosen by a [`JwsKeySelector`] or [`JweKeySelector`], validates the
//! claims as described in
//! [Section 3.1.3.7](https://openid.net/specs/openid-connect-core-1_0.html#IDTokenValidation)
//! of OpenID Connect Core, and only then returns the [`IdTokenClaims`].
//!
//! # Configuring a verifier
//!
//! The expected protection normally follows from the client's registration. The client registers
//! the algorithms it expects (`id_token_signed_response_alg`, and optionally
//! `id_token_encrypted_response_alg` and `id_token_encrypted_response_enc`), and the provider
//! advertises the algorithms it supports in its discovery document.
//! [`IdTokenVerifier::from_registration`] cross-checks the two and binds each algorithm to a
//! [`KeySource`]:
//!
//! * signatures made with the provider's keys (RSA, EC, or EdDSA) are verified with the
//!   client's registered `jwks`, or with the key set at its `jwks_uri`, fetched on demand and
//!   cached by a [`RemoteJsonWebKeySet`];
//! * MACs (`HS256`, `HS384`, `HS512`) are verified with the client secret;
//! * encrypted tokens are decrypted with the client's own keys.
//!
//! ```rust,no_run
//! use openidconnect_idtoken::core::{
//!     CoreClientInformation, CoreIdTokenVerifier, CoreProviderMetadata,
//! };
//! use openidconnect_idtoken::{HttpRequest, HttpResponse, Nonce};
//!
//! # fn http_client(_: HttpRequest) -> Result<HttpResponse, std::io::Error> { unimplemented!() }
//! # fn run(
//! #     provider_metadata_json: &str,
//! #     client_information_json: &str,
//! #     id_token: &str,
//! # ) -> Result<(), anyhow::Error> {
//! let provider_metadata: CoreProviderMetadata = serde_json::from_str(provider_metadata_json)?;
//! let client_information: CoreClientInformation =
//!     serde_json::from_str(client_information_json)?;
//!
//! let verifier = CoreIdTokenVerifier::from_registration(
//!     &provider_metadata,
//!     &client_information,
//!     None,
//!     http_client,
//! )?;
//!
//! let nonce = Nonce::new("n-0S6_WzA2Mj".to_string());
//! let claims = verifier.verify(id_token, Some(&nonce))?;
//! println!("authenticated {}", claims.subject().as_str());
//! # Ok(())
//! # }
//! ```
//!
//! Verifiers may also be built directly, e.g. with
//! [`IdTokenVerifier::new_with_key_set_url`] or [`IdTokenVerifier::new_with_client_secret`].
//!
//! # HTTP clients
//!
//! Remote key sets are fetched with any [`SyncHttpClient`], including closures of the form
//! `Fn(HttpRequest) -> Result<HttpResponse, E>`. The `curl`, `reqwest-blocking` and `ureq`
//! features enable the corresponding clients provided by the `oauth2` crate (e.g.,
//! `reqwest::blocking::Client`).
//!
//! # Errors
//!
//! Configuration problems surface as a [`ConfigError`] from
//! [`IdTokenVerifier::from_registration`]. [`IdTokenVerifier::verify`] returns an
//! [`IdTokenVerificationError`], which separates tokens whose protection failed
//! ([`BadTokenError`]) from tokens whose claims were rejected ([`ClaimError`]) and tokens that
//! couldn't be interpreted at all ([`InternalError`]).
//!

pub use oauth2::{ClientId, ClientSecret, HttpRequest, HttpResponse, SyncHttpClient};

#[cfg(all(feature = "curl", not(target_arch = "wasm32")))]
pub use oauth2::{CurlHttpClient, CurlHttpClientError};

#[cfg(feature = "reqwest")]
pub use oauth2::reqwest;

#[cfg(feature = "ureq")]
pub use oauth2::ureq;

pub use crate::claims::{ClaimsSet, IdTokenClaims};
pub use crate::discovery::ProviderMetadata;
pub use crate::key_selector::{JweKeySelector, JwsKeySelector};
pub use crate::key_source::{
    ClientSecretKeySource, KeySource, KeySourceError, RemoteJsonWebKeySet,
    DEFAULT_CACHE_LIFESPAN, DEFAULT_REFRESH_INTERVAL,
};
pub use crate::policy::{resolve_encryption_policy, resolve_signature_policy, ConfigError};
pub use crate::registration::{ClientInformation, ClientMetadata};
pub use crate::types::jwk::{
    JsonWebKey, JsonWebKeyId, JsonWebKeyType, JsonWebKeyUse, JweContent,
    JweContentEncryptionAlgorithm, JweKeyManagementAlgorithm, JwsAlgorithmFamily,
    JwsSigningAlgorithm,
};
pub use crate::types::jwks::{JsonWebKeySet, JsonWebKeySetError};
pub use crate::types::{
    Audience, AuthenticationContextClass, AuthenticationMethodReference, IssuerUrl,
    JsonWebKeySetUrl, Nonce, SubjectIdentifier,
};
pub use crate::verification::{
    BadTokenError, ClaimError, ClaimsValidator, DecryptionError, IdTokenVerificationError,
    IdTokenVerifier, InternalError, SignatureVerificationError,
};

// Defined first since other modules need the macros, and definition order is significant for
// macros.
#[macro_use]
mod macros;

pub mod core;

mod claims;
mod discovery;
mod helpers;
mod http_utils;
mod jwt;
mod key_selector;
mod key_source;
mod policy;
mod registration;
mod types;
mod verification;
