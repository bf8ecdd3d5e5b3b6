use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::from_value;

use std::fmt::{Display, Formatter};

pub(crate) fn deserialize_string_or_vec<'de, T, D>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match from_value::<Vec<T>>(value.clone()) {
        Ok(val) => Ok(val),
        Err(_) => {
            let single_val: T = from_value(value).map_err(Error::custom)?;
            Ok(vec![single_val])
        }
    }
}

// Attempt to deserialize the value; if the value is null or an error occurs, return None.
// JWK members are loosely specified, and extensions may overload the names used by other key
// types, so a member we can't parse is treated as absent rather than as a fatal error.
pub(crate) fn deserialize_option_or_none<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match from_value::<Option<T>>(value) {
        Ok(val) => Ok(val),
        Err(_) => Ok(None),
    }
}

/// Timestamp as seconds since the unix epoch, or optionally an ISO 8601 string.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub(crate) enum Timestamp {
    Seconds(serde_json::Number),
    #[cfg(feature = "accept-rfc3339-timestamps")]
    Rfc3339(String),
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        match self {
            Timestamp::Seconds(seconds) => Display::fmt(seconds, f),
            #[cfg(feature = "accept-rfc3339-timestamps")]
            Timestamp::Rfc3339(iso) => Display::fmt(iso, f),
        }
    }
}

pub(crate) fn timestamp_to_utc(timestamp: &Timestamp) -> Result<DateTime<Utc>, ()> {
    match timestamp {
        Timestamp::Seconds(seconds) => {
            let (secs, nsecs) = if seconds.is_i64() {
                (seconds.as_i64().ok_or(())?, 0u32)
            } else {
                let secs_f64 = seconds.as_f64().ok_or(())?;
                let secs = secs_f64.floor();
                (
                    secs as i64,
                    ((secs_f64 - secs) * 1_000_000_000.).floor() as u32,
                )
            };
            Utc.timestamp_opt(secs, nsecs).single().ok_or(())
        }
        #[cfg(feature = "accept-rfc3339-timestamps")]
        Timestamp::Rfc3339(iso) => {
            let datetime = DateTime::parse_from_rfc3339(iso).map_err(|_| ())?;
            Ok(datetime.into())
        }
    }
}

// Seconds may arrive as floating-point values; round down to the nearest second when emitting.
pub(crate) fn utc_to_seconds(utc: &DateTime<Utc>) -> Timestamp {
    Timestamp::Seconds(utc.timestamp().into())
}

pub(crate) mod serde_utc_seconds {
    use crate::helpers::{timestamp_to_utc, utc_to_seconds, Timestamp};

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds: Timestamp = Deserialize::deserialize(deserializer)?;
        timestamp_to_utc(&seconds).map_err(|_| {
            serde::de::Error::custom(format!(
                "failed to parse `{}` as UTC datetime (in seconds)",
                seconds
            ))
        })
    }

    pub fn serialize<S>(v: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        utc_to_seconds(v).serialize(serializer)
    }
}

pub(crate) mod serde_utc_seconds_opt {
    use crate::helpers::{timestamp_to_utc, utc_to_seconds, Timestamp};

    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds: Option<Timestamp> = Deserialize::deserialize(deserializer)?;
        seconds
            .map(|sec| {
                timestamp_to_utc(&sec).map_err(|_| {
                    serde::de::Error::custom(format!(
                        "failed to parse `{}` as UTC datetime (in seconds)",
                        sec
                    ))
                })
            })
            .transpose()
    }

    pub fn serialize<S>(v: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        v.map(|sec| utc_to_seconds(&sec)).serialize(serializer)
    }
}

// Renders a JOSE algorithm by its registered name (e.g., `RS256`).
pub(crate) fn alg_name<A>(alg: &A) -> String
where
    A: std::fmt::Debug + Serialize,
{
    serde_plain::to_string(alg).unwrap_or_else(|_| format!("{:?}", alg))
}

pub(crate) fn base64url_decode(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    BASE64_URL_SAFE_NO_PAD.decode(encoded)
}

new_type![
    /// Raw bytes serialized as an unpadded base64url string.
    #[derive(Deserialize, Hash, Serialize)]
    Base64UrlEncodedBytes(
        #[serde(with = "serde_base64url_byte_array")]
        Vec<u8>
    )
];

mod serde_base64url_byte_array {
    use base64::prelude::BASE64_URL_SAFE_NO_PAD;
    use base64::Engine;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{from_value, Value};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Value = Deserialize::deserialize(deserializer)?;
        let base64_encoded: String = from_value(value).map_err(D::Error::custom)?;

        BASE64_URL_SAFE_NO_PAD
            .decode(&base64_encoded)
            .map_err(|err| {
                D::Error::custom(format!(
                    "invalid base64url encoding `{}`: {:?}",
                    base64_encoded, err
                ))
            })
    }

    pub fn serialize<S>(v: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let base64_encoded = BASE64_URL_SAFE_NO_PAD.encode(v);
        serializer.serialize_str(&base64_encoded)
    }
}
