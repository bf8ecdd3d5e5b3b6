use crate::core::jwk::CoreJsonCurveType;
use crate::core::{
    CoreJsonWebKey, CoreJsonWebKeySet, CoreJsonWebKeyType, CoreJsonWebKeyUse,
    CoreJweContentEncryptionAlgorithm, CoreJweKeyManagementAlgorithm, CoreJwsSigningAlgorithm,
};
use crate::helpers::{base64url_decode, Base64UrlEncodedBytes};
use crate::jwt::tests::{
    base64url, TEST_EC_PUB_KEY_P256, TEST_EC_PUB_KEY_P384, TEST_ED_PUB_KEY_ED25519,
    TEST_RSA_PUB_KEY,
};
use crate::types::jwk::JweContent;
use crate::{DecryptionError, JsonWebKey, JsonWebKeyId, SignatureVerificationError};

use pretty_assertions::assert_eq;

// Source: https://tools.ietf.org/html/rfc7520#section-4.1
const RFC7520_RS256_SIGNING_INPUT: &str =
    "eyJhbGciOiJSUzI1NiIsImtpZCI6ImJpbGJvLmJhZ2dpbnNAaG9iYml0b24uZX\
     hhbXBsZSJ9.\
     SXTigJlzIGEgZGFuZ2Vyb3VzIGJ1c2luZXNzLCBGcm9kbywgZ29pbmcgb3V0IH\
     lvdXIgZG9vci4gWW91IHN0ZXAgb250byB0aGUgcm9hZCwgYW5kIGlmIHlvdSBk\
     b24ndCBrZWVwIHlvdXIgZmVldCwgdGhlcmXigJlzIG5vIGtub3dpbmcgd2hlcm\
     UgeW91IG1pZ2h0IGJlIHN3ZXB0IG9mZiB0by4";

const RFC7520_RS256_SIGNATURE: &str =
    "MRjdkly7_-oTPTS3AXP41iQIGKa80A0ZmTuV5MEaHoxnW2e5CZ5NlKtainoFmK\
     ZopdHM1O2U4mwzJdQx996ivp83xuglII7PNDi84wnB-BDkoBwA78185hX-Es4J\
     IwmDLJK3lfWRa-XtL0RnltuYv746iYTh_qHRD68BNt1uSNCrUCTJDt5aAE6x8w\
     W1Kt9eRo4QPocSadnHXFxnt8Is9UzpERV0ePPQdLuW3IS_de3xyIrDaLGdjluP\
     xUAhb6L2aXic1U12podGU0KLUQSE_oI-ZnmKJ3F4uOZDnd6QZWJushZ41Axf_f\
     cIe8u9ipH84ogoree7vjbU5y18kDquDg";

#[test]
fn test_core_jwk_deserialization_rsa() {
    let key: CoreJsonWebKey =
        serde_json::from_str(TEST_RSA_PUB_KEY).expect("deserialization failed");
    assert_eq!(key.kty, CoreJsonWebKeyType::RSA);
    assert_eq!(key.use_, Some(CoreJsonWebKeyUse::Signature));
    assert_eq!(
        key.kid,
        Some(JsonWebKeyId::new(
            "bilbo.baggins@hobbiton.example".to_string()
        ))
    );
    assert_eq!(key.n.as_ref().map(|n| n.len()), Some(256));
    assert_eq!(key.e, Some(Base64UrlEncodedBytes::new(vec![1, 0, 1])));
    assert_eq!(key.k, None);
}

#[test]
fn test_core_jwk_deserialization_ec() {
    let json = "{
            \"kty\": \"EC\",
            \"use\": \"sig\",
            \"kid\": \"2011-04-29\",
            \"crv\": \"P-256\",
            \"x\": \"kXCGZIr3oI6sKbnT6rRsIdxFXw3_VbLk_cveajgqXk8\",
            \"y\": \"StDvKIgXqAxJ6DuebREh-1vgvZRW3dfrOxSIKzBtRI0\"
        }";

    let key: CoreJsonWebKey = serde_json::from_str(json).expect("deserialization failed");
    assert_eq!(key.kty, CoreJsonWebKeyType::EllipticCurve);
    assert_eq!(key.crv, Some(CoreJsonCurveType::P256));
    assert_eq!(
        key.x,
        Some(Base64UrlEncodedBytes::new(vec![
            0x91, 0x70, 0x86, 0x64, 0x8a, 0xf7, 0xa0, 0x8e, 0xac, 0x29, 0xb9, 0xd3, 0xea, 0xb4,
            0x6c, 0x21, 0xdc, 0x45, 0x5f, 0x0d, 0xff, 0x55, 0xb2, 0xe4, 0xfd, 0xcb, 0xde, 0x6a,
            0x38, 0x2a, 0x5e, 0x4f
        ]))
    );
}

#[test]
fn test_core_jwk_deserialization_ignores_alg_and_unknown_fields() {
    // Some providers publish a non-registered `alg` (e.g., "Ed25519") on OKP keys.
    let key: CoreJsonWebKey =
        serde_json::from_str(TEST_ED_PUB_KEY_ED25519).expect("deserialization failed");
    assert_eq!(key.kty, CoreJsonWebKeyType::OctetKeyPair);
    assert_eq!(key.crv, Some(CoreJsonCurveType::Ed25519));

    let key: CoreJsonWebKey =
        serde_json::from_str("{\"kty\":\"oct\",\"unrecognized\":1234,\"use\":\"wrap\"}")
            .expect("deserialization failed");
    assert_eq!(key.kty, CoreJsonWebKeyType::Symmetric);
    assert_eq!(key.use_, Some(CoreJsonWebKeyUse::Other("wrap".to_string())));
    assert_eq!(key.k, None);
}

#[test]
fn test_core_jwk_deserialization_dupe_fields() {
    // RFC 7517, Section 4: JWK parsers MUST either reject JWKs with duplicate member names or
    // keep only the lexically last one.
    let json = "{\
            \"kty\":\"oct\",
            \"k\":\"GawgguFyGrWKav7AX4VKUg\",
            \"k\":\"GawgguFyGrWKav7AX4VKVg\"
        }";

    assert!(serde_json::from_str::<CoreJsonWebKey>(json)
        .expect_err("deserialization must fail when duplicate fields are present")
        .to_string()
        .contains("duplicate field"));
}

#[test]
fn test_core_jwk_serialization() {
    let key = CoreJsonWebKey::new_encryption_key(
        vec![1, 2, 3],
        Some(JsonWebKeyId::new("enc-1".to_string())),
    );
    assert_eq!(
        serde_json::to_string(&key).unwrap(),
        "{\"kty\":\"oct\",\"use\":\"enc\",\"kid\":\"enc-1\",\"k\":\"AQID\"}"
    );
}

fn verify_signature(
    key: &CoreJsonWebKey,
    alg: &CoreJwsSigningAlgorithm,
    signing_input: &str,
    signature_base64: &str,
) {
    let signature = base64url_decode(signature_base64).expect("failed to base64url decode");
    key.verify_signature(alg, signing_input.as_bytes(), &signature)
        .expect("signature verification failed");
    match key
        .verify_signature(
            alg,
            (signing_input.to_string() + "foobar").as_bytes(),
            &signature,
        )
        .expect_err("signature verification should fail")
    {
        SignatureVerificationError::CryptoError(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

fn verify_invalid_signature(
    key: &CoreJsonWebKey,
    alg: &CoreJwsSigningAlgorithm,
    signing_input: &str,
    signature_base64: &str,
) {
    let signature = base64url_decode(signature_base64).expect("failed to base64url decode");
    match key
        .verify_signature(alg, signing_input.as_bytes(), &signature)
        .expect_err("signature verification should fail")
    {
        SignatureVerificationError::CryptoError(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }
}

fn expect_invalid_key(result: Result<(), SignatureVerificationError>, expected_msg: &str) {
    match result {
        Err(SignatureVerificationError::InvalidKey(msg)) => assert_eq!(msg, expected_msg),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_eddsa_verification() {
    let key_ed25519: CoreJsonWebKey =
        serde_json::from_str(TEST_ED_PUB_KEY_ED25519).expect("deserialization failed");
    let signing_input = "eyJhbGciOiJFZDI1NTE5IiwidHlwIjoiSldUIn0.eyJpc3MiOiJqb2UifQ";
    let signature_ed25519 =
        "Augr7UH6hUbWVN0PHqSD5U0bb8y9UOw_eef09ZS5d5haUar_qAto8gyLJxUhNF5wHPoXhdvSGowkPvjiKsEsCQ";
    let signature_ed25519_other =
        "xb4NH-q33sCaRXf1ZhnzQxd4o5ZkBWKd9vGibacqPMAblW_mIJLm9kGerqHX08SPoeDY-dYUmZQz9ls6csfvAw";
    let signature_ed448 = "xxXVMyaYYePdGfMOdU0nENuc70pKwP3vJuc_jBA0rCW-RtbvBLSsc0D9iCPzhrPmQ2X1nTjPkGiAXJ0_NslDBvy3sHu88N64YhnnYBWwwHttBU0jijn_ikbBUHzUwzGuasRFb1ESG_PwedhEcMi-YAwA";

    verify_signature(
        &key_ed25519,
        &CoreJwsSigningAlgorithm::EdDsa,
        signing_input,
        signature_ed25519,
    );
    verify_invalid_signature(
        &key_ed25519,
        &CoreJwsSigningAlgorithm::EdDsa,
        signing_input,
        signature_ed448,
    );
    verify_invalid_signature(
        &key_ed25519,
        &CoreJwsSigningAlgorithm::EdDsa,
        signing_input,
        signature_ed25519_other,
    );

    expect_invalid_key(
        key_ed25519.verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP256Sha256,
            signing_input.as_bytes(),
            signature_ed25519.as_bytes(),
        ),
        "key type does not match signature algorithm",
    );
}

#[test]
fn test_ecdsa_verification() {
    let key_p256: CoreJsonWebKey =
        serde_json::from_str(TEST_EC_PUB_KEY_P256).expect("deserialization failed");
    let key_p384: CoreJsonWebKey =
        serde_json::from_str(TEST_EC_PUB_KEY_P384).expect("deserialization failed");
    let signature_p256 =
        "EnKCtAHhzhqxV2GTr1VEurse2kQ7oHpFoVqM66sYGlmahDRGSlfrVAsGCzdLv66OS2Qf1zt6OPHX-5ZAkMgzlA";
    let signature_p384 = "B_9oDAabMasZ2Yt_cnAS21owaN0uWSInQBPxTqqiM3N3XjkksBRMGqguJLV5WoSMcvqgXwHTTQtbHGuh0Uf4g6LEr7XtO1T2KCttQR27d5YbvVZdORrzCm0Nsm1zkV-i";

    verify_signature(
        &key_p256,
        &CoreJwsSigningAlgorithm::EcdsaP256Sha256,
        RFC7520_RS256_SIGNING_INPUT,
        signature_p256,
    );
    verify_invalid_signature(
        &key_p256,
        &CoreJwsSigningAlgorithm::EcdsaP256Sha256,
        RFC7520_RS256_SIGNING_INPUT,
        signature_p384,
    );
    expect_invalid_key(
        key_p256.verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP384Sha384,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            signature_p256.as_bytes(),
        ),
        "Key uses different CRV than JWT",
    );

    verify_signature(
        &key_p384,
        &CoreJwsSigningAlgorithm::EcdsaP384Sha384,
        RFC7520_RS256_SIGNING_INPUT,
        signature_p384,
    );
    verify_invalid_signature(
        &key_p384,
        &CoreJwsSigningAlgorithm::EcdsaP384Sha384,
        RFC7520_RS256_SIGNING_INPUT,
        signature_p256,
    );
    expect_invalid_key(
        key_p384.verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP256Sha256,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            signature_p384.as_bytes(),
        ),
        "Key uses different CRV than JWT",
    );
}

#[test]
fn test_ecdsa_p521_verification() {
    use p521::ecdsa::signature::Signer;

    // Any scalar below the group order; the leading zero byte keeps it in range.
    let mut secret = [0x5a; 66];
    secret[0] = 0;
    let signing_key = p521::ecdsa::SigningKey::from_slice(&secret).expect("invalid scalar");
    let point = p521::ecdsa::VerifyingKey::from(&signing_key).to_encoded_point(false);
    let key_p521: CoreJsonWebKey = serde_json::from_value(serde_json::json!({
        "kty": "EC",
        "use": "sig",
        "crv": "P-521",
        "x": Base64UrlEncodedBytes::new(point.x().expect("x coordinate").to_vec()),
        "y": Base64UrlEncodedBytes::new(point.y().expect("y coordinate").to_vec()),
    }))
    .expect("deserialization failed");

    let signature: p521::ecdsa::Signature =
        signing_key.sign(RFC7520_RS256_SIGNING_INPUT.as_bytes());
    let signature_p521 = base64url(&signature.to_bytes());
    verify_signature(
        &key_p521,
        &CoreJwsSigningAlgorithm::EcdsaP521Sha512,
        RFC7520_RS256_SIGNING_INPUT,
        &signature_p521,
    );

    let key_p256: CoreJsonWebKey =
        serde_json::from_str(TEST_EC_PUB_KEY_P256).expect("deserialization failed");
    expect_invalid_key(
        key_p256.verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP521Sha512,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            &signature.to_bytes(),
        ),
        "Key uses different CRV than JWT",
    );
    expect_invalid_key(
        key_p521.verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP384Sha384,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            &signature.to_bytes(),
        ),
        "Key uses different CRV than JWT",
    );
}

#[test]
fn test_rsa_pkcs1_verification() {
    let key: CoreJsonWebKey =
        serde_json::from_str(TEST_RSA_PUB_KEY).expect("deserialization failed");

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256,
        RFC7520_RS256_SIGNING_INPUT,
        RFC7520_RS256_SIGNATURE,
    );

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha384,
        RFC7520_RS256_SIGNING_INPUT,
        "dgTHNAePceEDFodrPybExGb2aF4fHb4bRpb_4bgYHq78fUdHFCScg0bZP51zjB\
         joH-4fr0P7Y8-Sns0GuXRy_itY2Yh0mEdXVn6HwZVOGIVRAuBkY0cAgSXGKU40\
         1G-GhamiNyNDfN2bwHftPPvCdsChtsLeAUvhWUKSLgIfT-jvMr9iZ5d0SQrUvv\
         G1ReEoBDyKUzqGQehO3CNGJ-QkI8p-fBTa2KHQxct6cU5_anSXCd-kC2rtEQS9\
         E8AcMFLA2Bv9IXsURBRU_bwMgxTG8c6ATDJM8k-zJSSP5a44EFKHUtH1xspYFo\
         KV6Za-frCV8kcFCILMf-4ATlj5Z62o1A",
    );

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha512,
        RFC7520_RS256_SIGNING_INPUT,
        "hIRFVu3hlbIM9Xt2V9xldCoF_94BEDg-6kVetoceakgD-9hicX0BnOI3YxR-JQ\
         0to4saNEdGP1ulvanfa5uK3PnltQr1sJ1l1x_TPNh8vdvZ5WmAtkQcZvRiK580\
         hliHV1l65yLyGH4ckDicOg5VF4BASkBw6sUO_LCB8pMJotK5jQxDbNkPmSGbFV\
         nzVXXy6QI_r6nqmguo5DMFlPeploS-aQ7ArfYqR3gKEp3l5gWWKn86lwVKRGjv\
         zeRMf3ubhKxvHUyU8cE5p1VPpOzTJ3cPwUe68s24Ehf2jpgZIIXb9XQv4L0Unf\
         GAXTBY7Rszx9LvGByoFx3eOpbMvtLQxA",
    );

    match key
        .verify_signature(
            &CoreJwsSigningAlgorithm::EcdsaP256Sha256,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            &Vec::new(),
        )
        .expect_err("signature verification should fail")
    {
        SignatureVerificationError::InvalidKey(_) => {}
        other => panic!("unexpected error: {:?}", other),
    }

    // An encryption-only key must not verify signatures.
    let mut enc_key = key.clone();
    enc_key.use_ = Some(CoreJsonWebKeyUse::Encryption);
    expect_invalid_key(
        enc_key.verify_signature(
            &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256,
            RFC7520_RS256_SIGNING_INPUT.as_bytes(),
            &Vec::new(),
        ),
        "key usage not permitted for digital signatures",
    );

    // Key without usage specified should work.
    let mut nousage_key = key;
    nousage_key.use_ = None;
    verify_signature(
        &nousage_key,
        &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256,
        RFC7520_RS256_SIGNING_INPUT,
        RFC7520_RS256_SIGNATURE,
    );
}

#[test]
fn test_rsa_pss_verification() {
    let key: CoreJsonWebKey =
        serde_json::from_str(TEST_RSA_PUB_KEY).expect("deserialization failed");
    // Source: https://tools.ietf.org/html/rfc7520#section-4.2
    let pss_signing_input =
        "eyJhbGciOiJQUzM4NCIsImtpZCI6ImJpbGJvLmJhZ2dpbnNAaG9iYml0b24uZXhhbXBsZSJ9.\
         SXTigJlzIGEgZGFuZ2Vyb3VzIGJ1c2luZXNzLCBGcm9kbywgZ29pbmcgb3V0IH\
         lvdXIgZG9vci4gWW91IHN0ZXAgb250byB0aGUgcm9hZCwgYW5kIGlmIHlvdSBk\
         b24ndCBrZWVwIHlvdXIgZmVldCwgdGhlcmXigJlzIG5vIGtub3dpbmcgd2hlcm\
         UgeW91IG1pZ2h0IGJlIHN3ZXB0IG9mZiB0by4";

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPssSha256,
        pss_signing_input,
        "Y62we_hs07d0qJ2cT_QpbrodwDhPK9rEpNX2b3GqLHFM18YtDlPCr40Xf_yLIosIrt\
         mMP4NgDSCkn2qOcRJBD8zrHumER4JIkGZbRIwU8gYms8xKX2HaveK9vrOjbHoWLjOU\
         nyNpprYUFGdRZ6oebT61bqU2CZrJG_GcqR87W8FOn7kqrCPI7B8oNHgliMke49hOpz\
         mluL20BKN5Mb3O42nwgmiONZK0Pjm2GTIAYRUvNQ741aCWVJ3rnWvo99qWhe86ap_H\
         v40SUSaMwJig5AqC-wHIzYaYU0PlQbi83Dgw7Zft9kL2dGB0vMWY_h2HDgZU0teAcK\
         SkhyH8ZDRyYQ",
    );

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPssSha384,
        pss_signing_input,
        "cu22eBqkYDKgIlTpzDXGvaFfz6WGoz7fUDcfT0kkOy42miAh2qyBzk1xEsnk2I\
         pN6-tPid6VrklHkqsGqDqHCdP6O8TTB5dDDItllVo6_1OLPpcbUrhiUSMxbbXU\
         vdvWXzg-UD8biiReQFlfz28zGWVsdiNAUf8ZnyPEgVFn442ZdNqiVJRmBqrYRX\
         e8P_ijQ7p8Vdz0TTrxUeT3lm8d9shnr2lfJT8ImUjvAA2Xez2Mlp8cBE5awDzT\
         0qI0n6uiP1aCN_2_jLAeQTlqRHtfa64QQSUmFAAjVKPbByi7xho0uTOcbH510a\
         6GYmJUAfmWjwZ6oD4ifKo8DYM-X72Eaw",
    );

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::RsaSsaPssSha512,
        pss_signing_input,
        "G8vtysTFbSXht_PU6NdXeYDOSIQhxcp6zFWuvtx2NCtgsm-J22CKqlapp1zjPkXTo4\
         xrYlIgFjQVQZ9Cr7KWJXK7qYUkdfJNkB1E96EQR32ocx_9RQDS_eQNlGWjoDRduD9z\
         2hKs-S0EhOy39wUeUYbcKA1MpkW71hUPI56Ou5kzclNbe22slB4mYd6Mx0dLOeFDF2\
         C7ZUDxso-cHMh4hU2E8vlp-TZUf9eqAri9T1F_pjRF8WNBj-vrqwy3bCROgIslYA8u\
         c_FEXn6fZ21up5mU9vg5_LdeBoSh4Idmz8HLn5rpVd57AsQ2PbLMsKXcpVUhwP_ID1\
         7zsAFuCEFJqA",
    );
}

#[test]
fn test_hmac_verification() {
    let key_json = "{
            \"kty\": \"oct\",
            \"kid\": \"018c0ae5-4d9b-471b-bfd6-eef314bc7037\",
            \"use\": \"sig\",
            \"k\": \"hJtXIZ2uSN5kbQfbtTNWbpdmhkV8FJG-Onbc6mxCcYg\"
        }";

    let key: CoreJsonWebKey = serde_json::from_str(key_json).expect("deserialization failed");
    // Source: https://tools.ietf.org/html/rfc7520#section-4.4
    let signing_input = "eyJhbGciOiJIUzI1NiIsImtpZCI6IjAxOGMwYWU1LTRkOWItNDcxYi1iZmQ2LW\
                         VlZjMxNGJjNzAzNyJ9.\
                         SXTigJlzIGEgZGFuZ2Vyb3VzIGJ1c2luZXNzLCBGcm9kbywgZ29pbmcgb3V0IH\
                         lvdXIgZG9vci4gWW91IHN0ZXAgb250byB0aGUgcm9hZCwgYW5kIGlmIHlvdSBk\
                         b24ndCBrZWVwIHlvdXIgZmVldCwgdGhlcmXigJlzIG5vIGtub3dpbmcgd2hlcm\
                         UgeW91IG1pZ2h0IGJlIHN3ZXB0IG9mZiB0by4";

    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::HmacSha256,
        signing_input,
        "s0h6KThzkfBBBkLspW1h84VsJZFTsPPqMDA7g1Md7p0",
    );
    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::HmacSha384,
        signing_input,
        "O1jhTTHkuaiubwDZoIBLv6zjEarXHc22NNu05IdYh_yzIKGYXJQcaI2WnF4BCq7j",
    );
    verify_signature(
        &key,
        &CoreJwsSigningAlgorithm::HmacSha512,
        signing_input,
        "rdWYqzXuAJp4OW-exqIwrO8HJJQDYu0_fkTIUBHmyHMFJ0pVe7fjP7QtE7BaX-7FN5\
         YiyiM11MwIEAxzxBj6qw",
    );

    // A truncated MAC must be rejected rather than compared as a prefix.
    verify_invalid_signature(
        &key,
        &CoreJwsSigningAlgorithm::HmacSha256,
        signing_input,
        "s0h6KThzkfBBBkLspW1h84VsJZFTsPPq",
    );

    // The client secret becomes an HMAC key without `use` or `kid`.
    let secret_key = CoreJsonWebKey::new_symmetric(
        base64url_decode("hJtXIZ2uSN5kbQfbtTNWbpdmhkV8FJG-Onbc6mxCcYg").unwrap(),
    );
    verify_signature(
        &secret_key,
        &CoreJwsSigningAlgorithm::HmacSha256,
        signing_input,
        "s0h6KThzkfBBBkLspW1h84VsJZFTsPPqMDA7g1Md7p0",
    );
}

// Generated independently with a reference AES-GCM implementation.
const TEST_DIR_A128GCM_KEY: &str = "AAECAwQFBgcICQoLDA0ODw";
const TEST_DIR_A128GCM_PROTECTED: &str = "eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0";
const TEST_DIR_A128GCM_IV: &str = "ZGVmZ2hpamtsbW5v";
const TEST_DIR_A128GCM_CIPHERTEXT: &str =
    "Tgorha9wzZ-7TT536OpEihDhFov3xbEzkwrf9NnSnoCakj1Qq3NJ_v00QiLq52Rlruk9GvBnJkGt73U0o_BL";
const TEST_DIR_A128GCM_TAG: &str = "ZBv3PPWtZj0ew89y-3Dd2g";

struct DecodedJwe {
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}
impl DecodedJwe {
    fn new() -> Self {
        Self {
            iv: base64url_decode(TEST_DIR_A128GCM_IV).unwrap(),
            ciphertext: base64url_decode(TEST_DIR_A128GCM_CIPHERTEXT).unwrap(),
            tag: base64url_decode(TEST_DIR_A128GCM_TAG).unwrap(),
        }
    }

    fn content(&self) -> JweContent<'_> {
        JweContent {
            aad: TEST_DIR_A128GCM_PROTECTED.as_bytes(),
            encrypted_key: &[],
            iv: &self.iv,
            ciphertext: &self.ciphertext,
            tag: &self.tag,
        }
    }
}

#[test]
fn test_direct_aes_gcm_decryption() {
    let key = CoreJsonWebKey::new_encryption_key(
        base64url_decode(TEST_DIR_A128GCM_KEY).unwrap(),
        None,
    );
    let jwe = DecodedJwe::new();

    let plaintext = key
        .decrypt(
            &CoreJweKeyManagementAlgorithm::Direct,
            &CoreJweContentEncryptionAlgorithm::Aes128Gcm,
            &jwe.content(),
        )
        .expect("decryption should succeed");
    assert_eq!(
        String::from_utf8(plaintext).unwrap(),
        "The true sign of intelligence is not knowledge but imagination."
    );

    // Tampering with the authenticated header must fail.
    let mut content = jwe.content();
    content.aad = b"eyJhbGciOiJkaXIiLCJlbmMiOiJBMjU2R0NNIn0";
    match key.decrypt(
        &CoreJweKeyManagementAlgorithm::Direct,
        &CoreJweContentEncryptionAlgorithm::Aes128Gcm,
        &content,
    ) {
        Err(DecryptionError::CryptoError(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    // A 128-bit key can't be used with A256GCM.
    match key.decrypt(
        &CoreJweKeyManagementAlgorithm::Direct,
        &CoreJweContentEncryptionAlgorithm::Aes256Gcm,
        &jwe.content(),
    ) {
        Err(DecryptionError::InvalidKey(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_decryption_unsupported_and_incompatible() {
    let key = CoreJsonWebKey::new_encryption_key(
        base64url_decode(TEST_DIR_A128GCM_KEY).unwrap(),
        None,
    );
    let jwe = DecodedJwe::new();

    match key.decrypt(
        &CoreJweKeyManagementAlgorithm::AesKeyWrap128,
        &CoreJweContentEncryptionAlgorithm::Aes128Gcm,
        &jwe.content(),
    ) {
        Err(DecryptionError::UnsupportedAlg(alg)) => assert_eq!(alg, "A128KW"),
        other => panic!("unexpected result: {:?}", other),
    }

    match key.decrypt(
        &CoreJweKeyManagementAlgorithm::Direct,
        &CoreJweContentEncryptionAlgorithm::Aes128CbcHmacSha256,
        &jwe.content(),
    ) {
        Err(DecryptionError::UnsupportedAlg(alg)) => assert_eq!(alg, "A128CBC-HS256"),
        other => panic!("unexpected result: {:?}", other),
    }

    let mut content = jwe.content();
    content.encrypted_key = b"unexpected";
    match key.decrypt(
        &CoreJweKeyManagementAlgorithm::Direct,
        &CoreJweContentEncryptionAlgorithm::Aes128Gcm,
        &content,
    ) {
        Err(DecryptionError::CryptoError(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    // Signing keys are never used for decryption.
    let mut sig_key = key;
    sig_key.use_ = Some(CoreJsonWebKeyUse::Signature);
    match sig_key.decrypt(
        &CoreJweKeyManagementAlgorithm::Direct,
        &CoreJweContentEncryptionAlgorithm::Aes128Gcm,
        &jwe.content(),
    ) {
        Err(DecryptionError::InvalidKey(msg)) => {
            assert_eq!(msg, "key usage not permitted for encryption")
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

// JsonWebKeySet ignores unsupported keys during deserialization so that clients can use providers
// that publish unsupported keys as long as they only use supported ones to sign tokens.
#[test]
fn test_jwks_unsupported_key() {
    let jwks_json = "{
            \"keys\": [
                {
                    \"kty\": \"RSA\",
                    \"use\": \"sig\",
                    \"kid\": \"2011-04-29\",
                    \"n\": \"0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhD\
                             R1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6C\
                             f0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1\
                             n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1\
                             jF44-csFCur-kEgU8awapJzKnqDKgw\",
                    \"e\": \"AQAB\"
                },
                {
                    \"kty\": \"MAGIC\",
                    \"use\": \"sig\",
                    \"kid\": \"2040-01-01\",
                    \"magic\": \"magic\"
                },
                {
                    \"kty\": \"EC\",
                    \"use\": \"sig\",
                    \"kid\": \"2011-05-01\",
                    \"crv\": \"P-256\",
                    \"x\": \"kXCGZIr3oI6sKbnT6rRsIdxFXw3_VbLk_cveajgqXk8\",
                    \"y\": \"StDvKIgXqAxJ6DuebREh-1vgvZRW3dfrOxSIKzBtRI0\"
                }
            ]
        }";
    let jwks = serde_json::from_str::<CoreJsonWebKeySet>(jwks_json)
        .expect("deserialization should succeed");

    assert_eq!(jwks.keys().len(), 2);
    assert_eq!(jwks.keys()[0].kty, CoreJsonWebKeyType::RSA);
    assert_eq!(jwks.keys()[1].kty, CoreJsonWebKeyType::EllipticCurve);
    assert_eq!(
        jwks.keys()[1].kid,
        Some(JsonWebKeyId::new("2011-05-01".to_string()))
    );
}

#[test]
fn test_jwks_filter_keys() {
    let rsa_key: CoreJsonWebKey = serde_json::from_str(TEST_RSA_PUB_KEY).unwrap();
    let ec_key: CoreJsonWebKey = serde_json::from_str(TEST_EC_PUB_KEY_P256).unwrap();
    let anonymous_rsa_key = CoreJsonWebKey {
        kid: None,
        ..rsa_key.clone()
    };
    let enc_key = CoreJsonWebKey::new_encryption_key(
        vec![0; 16],
        Some(JsonWebKeyId::new("enc".to_string())),
    );
    let jwks = CoreJsonWebKeySet::new(vec![
        rsa_key.clone(),
        ec_key.clone(),
        anonymous_rsa_key.clone(),
        enc_key.clone(),
    ]);
    let bilbo = JsonWebKeyId::new("bilbo.baggins@hobbiton.example".to_string());

    assert_eq!(
        jwks.filter_keys(Some(&bilbo), &CoreJwsSigningAlgorithm::RsaSsaPkcs1V15Sha256),
        vec![&rsa_key]
    );
    assert_eq!(
        jwks.filter_keys(Some(&bilbo), &CoreJwsSigningAlgorithm::EcdsaP256Sha256),
        vec![&ec_key]
    );
    // Without a `kid`, every compatible key is a candidate, in publication order.
    assert_eq!(
        jwks.filter_keys(None, &CoreJwsSigningAlgorithm::RsaSsaPssSha256),
        vec![&rsa_key, &anonymous_rsa_key]
    );
    assert!(jwks
        .filter_keys(None, &CoreJwsSigningAlgorithm::HmacSha256)
        .is_empty());

    assert_eq!(
        jwks.filter_decryption_keys(None, &CoreJweKeyManagementAlgorithm::Direct),
        vec![&enc_key]
    );
    assert!(jwks
        .filter_decryption_keys(Some(&bilbo), &CoreJweKeyManagementAlgorithm::Direct)
        .is_empty());
    assert!(jwks.contains_key_id(&bilbo));
    assert!(!jwks.contains_key_id(&JsonWebKeyId::new("missing".to_string())));
}
