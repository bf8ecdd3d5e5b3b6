use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub(crate) mod jwk;
pub(crate) mod jwks;


new_type![
    /// Audience claim value.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    Audience(String)
];

new_type![
    /// Set of authentication methods or procedures that are considered to be equivalent to each
    /// other in a particular context.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    AuthenticationContextClass(String)
];

new_type![
    /// Identifier for an authentication method (e.g., `password` or `totp`).
    ///
    /// Defining specific AMR identifiers is beyond the scope of
    /// [OpenID Connect Core](https://openid.net/specs/openid-connect-core-1_0.html#IDToken).
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    AuthenticationMethodReference(String)
];

new_url_type![
    /// URL of the OpenID Provider, used as the issuer identifier of its tokens.
    IssuerUrl
];

new_url_type![
    /// JSON Web Key Set URL.
    JsonWebKeySetUrl
];

new_secret_type![
    /// String value used to associate a client session with an ID token, and to mitigate replay
    /// attacks.
    #[derive(Deserialize, Serialize)]
    Nonce(String)
    impl {
        /// Compares this nonce against the nonce carried by a token.
        ///
        /// The comparison runs over fixed-length digests of both values so that its duration
        /// reveals nothing about the expected nonce.
        pub(crate) fn matches(&self, other: &str) -> bool {
            let expected = Sha256::digest(self.0.as_bytes());
            let found = Sha256::digest(other.as_bytes());
            expected.as_slice().ct_eq(found.as_slice()).into()
        }
    }
];

new_type![
    /// Unique identifier for the End-User at the issuer.
    #[derive(Deserialize, Hash, Ord, PartialOrd, Serialize)]
    SubjectIdentifier(String)
];
