/// Wraps a value in a strongly-typed newtype.
///
/// Mirrors the `new_type!` macro from the `oauth2` crate, which isn't part of that crate's stable
/// public interface.
macro_rules! new_type {
    // Convenience pattern without an impl.
    (
        $(#[$attr:meta])*
        $name:ident(
            $(#[$type_attr:meta])*
            $type:ty
        )
    ) => {
        new_type![
            @new_type $(#[$attr])*,
            $name(
                $(#[$type_attr])*
                $type
            ),
            concat!(
                "Create a new `",
                stringify!($name),
                "` to wrap the given `",
                stringify!($type),
                "`."
            ),
            impl {}
        ];
    };
    // Main entry point with an impl.
    (
        $(#[$attr:meta])*
        $name:ident(
            $(#[$type_attr:meta])*
            $type:ty
        )
        impl {
            $($item:tt)*
        }
    ) => {
        new_type![
            @new_type $(#[$attr])*,
            $name(
                $(#[$type_attr])*
                $type
            ),
            concat!(
                "Create a new `",
                stringify!($name),
                "` to wrap the given `",
                stringify!($type),
                "`."
            ),
            impl {
                $($item)*
            }
        ];
    };
    // Actual implementation, after stringifying the #[doc] attr.
    (
        @new_type $(#[$attr:meta])*,
        $name:ident(
            $(#[$type_attr:meta])*
            $type:ty
        ),
        $new_doc:expr,
        impl {
            $($item:tt)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(
            $(#[$type_attr])*
            $type
        );
        impl $name {
            $($item)*

            #[doc = $new_doc]
            pub const fn new(s: $type) -> Self {
                $name(s)
            }

            /// Consumes the wrapper and returns the inner value.
            pub fn into_inner(self) -> $type {
                self.0
            }
        }
        impl std::ops::Deref for $name {
            type Target = $type;
            fn deref(&self) -> &$type {
                &self.0
            }
        }
        impl From<$name> for $type {
            fn from(s: $name) -> $type {
                s.0
            }
        }
    }
}

/// Wraps a secret value whose `Debug` output is redacted.
macro_rules! new_secret_type {
    (
        $(#[$attr:meta])*
        $name:ident($type:ty)
    ) => {
        new_secret_type![
            $(#[$attr])*
            $name($type)
            impl {}
        ];
    };
    (
        $(#[$attr:meta])*
        $name:ident($type:ty)
        impl {
            $($item:tt)*
        }
    ) => {
        new_secret_type![
            $(#[$attr])*,
            $name($type),
            concat!(
                "Create a new `",
                stringify!($name),
                "` to wrap the given `",
                stringify!($type),
                "`."
            ),
            concat!("Get the secret contained within this `", stringify!($name), "`."),
            impl {
                $($item)*
            }
        ];
    };
    (
        $(#[$attr:meta])*,
        $name:ident($type:ty),
        $new_doc:expr,
        $secret_doc:expr,
        impl {
            $($item:tt)*
        }
    ) => {
        $(
            #[$attr]
        )*
        #[derive(Clone)]
        pub struct $name($type);
        impl $name {
            $($item)*

            #[doc = $new_doc]
            pub fn new(s: $type) -> Self {
                $name(s)
            }
            #[doc = $secret_doc]
            ///
            /// # Security Warning
            ///
            /// Leaking this value may compromise the security of the authentication flow.
            pub fn secret(&self) -> &$type {
                &self.0
            }
        }
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
                write!(f, concat!(stringify!($name), "([redacted])"))
            }
        }
    };
}

/// Wraps a URL while preserving the exact string it was parsed from.
///
/// Issuer identifiers are compared as strings, and `url::Url` normalizes its input (e.g., by
/// appending a trailing `/` to bare origins), so the original string is kept alongside.
macro_rules! new_url_type {
    // Convenience pattern without an impl.
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        new_url_type![
            @new_url_type $(#[$attr])*,
            $name,
            concat!("Create a new `", stringify!($name), "` from a `String` to wrap a URL."),
            concat!("Create a new `", stringify!($name), "` from a `Url` to wrap a URL."),
            concat!("Return this `", stringify!($name), "` as a parsed `Url`."),
            impl {}
        ];
    };
    // Actual implementation, after stringifying the #[doc] attr.
    (
        @new_url_type $(#[$attr:meta])*,
        $name:ident,
        $new_doc:expr,
        $from_url_doc:expr,
        $url_doc:expr,
        impl {
            $($item:tt)*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone)]
        pub struct $name(url::Url, String);
        impl $name {
            #[doc = $new_doc]
            pub fn new(url: String) -> Result<Self, url::ParseError> {
                Ok($name(url::Url::parse(&url)?, url))
            }
            #[doc = $from_url_doc]
            pub fn from_url(url: url::Url) -> Self {
                let s = url.to_string();
                Self(url, s)
            }
            #[doc = $url_doc]
            pub fn url(&self) -> &url::Url {
                &self.0
            }
            $($item)*
        }
        impl std::ops::Deref for $name {
            type Target = String;
            fn deref(&self) -> &String {
                &self.1
            }
        }
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
                let mut debug_trait_builder = f.debug_tuple(stringify!($name));
                debug_trait_builder.field(&self.1);
                debug_trait_builder.finish()
            }
        }
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
                write!(f, "{}", self.1)
            }
        }
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                struct UrlVisitor;
                impl<'de> serde::de::Visitor<'de> for UrlVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        formatter: &mut std::fmt::Formatter
                    ) -> std::fmt::Result {
                        formatter.write_str(stringify!($name))
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $name::new(v.to_string()).map_err(E::custom)
                    }
                }
                deserializer.deserialize_str(UrlVisitor {})
            }
        }
        impl serde::Serialize for $name {
            fn serialize<SE>(&self, serializer: SE) -> Result<SE::Ok, SE::Error>
            where
                SE: serde::Serializer,
            {
                serializer.serialize_str(&self.1)
            }
        }
        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&(self.1), state);
            }
        }
        impl PartialEq for $name {
            fn eq(&self, other: &$name) -> bool {
                self.1 == other.1
            }
        }
        impl Eq for $name {}
    };
}

/// Implements `Deserialize` and `Serialize` for an enum through its `FromStr` and `AsRef<str>`
/// implementations.
macro_rules! serde_as_str {
    ($name:ident) => {
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::de::Deserializer<'de>,
            {
                let variant_str = <String as serde::Deserialize>::deserialize(deserializer)?;
                variant_str
                    .parse::<$name>()
                    .map_err(serde::de::Error::custom)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<SE>(&self, serializer: SE) -> Result<SE::Ok, SE::Error>
            where
                SE: serde::Serializer,
            {
                serializer.serialize_str(self.as_ref())
            }
        }
    };
}

/// Generates getters for struct fields. `Option<T>` fields are returned as `Option<&T>`.
macro_rules! field_getters {
    (@case $self:ident [$zero:expr] $field:ident Option < $type:ty > [$claim:expr]) => {
        #[doc = concat!("Returns the `", $claim, "` claim, if present.")]
        pub fn $field(&$self) -> Option<&$type> {
            $zero.$field.as_ref()
        }
    };
    (@case $self:ident [$zero:expr] $field:ident $type:ty [$claim:expr]) => {
        #[doc = concat!("Returns the `", $claim, "` claim.")]
        pub fn $field(&$self) -> &$type {
            &$zero.$field
        }
    };
    (
        pub $self:ident [$zero:expr] {
            $(
                $field:ident[$($entry:tt)+] [$claim:expr],
            )+
        }
    ) => {
        $(
            field_getters![@case $self [$zero] $field $($entry)+ [$claim]];
        )+
    };
}

/// Generates getters and consuming setters for metadata fields. `Option<T>` fields are returned
/// as `Option<&T>`.
macro_rules! field_getters_setters {
    (@case $self:ident [$zero:expr] [$doc:expr] $setter:ident $field:ident Option < $type:ty >) => {
        #[doc = concat!("Returns the `", stringify!($field), "` ", $doc, ", if present.")]
        pub fn $field(&$self) -> Option<&$type> {
            $zero.$field.as_ref()
        }
        #[doc = concat!("Sets the `", stringify!($field), "` ", $doc, ".")]
        pub fn $setter(mut $self, $field: Option<$type>) -> Self {
            $zero.$field = $field;
            $self
        }
    };
    (@case $self:ident [$zero:expr] [$doc:expr] $setter:ident $field:ident $type:ty) => {
        #[doc = concat!("Returns the `", stringify!($field), "` ", $doc, ".")]
        pub fn $field(&$self) -> &$type {
            &$zero.$field
        }
        #[doc = concat!("Sets the `", stringify!($field), "` ", $doc, ".")]
        pub fn $setter(mut $self, $field: $type) -> Self {
            $zero.$field = $field;
            $self
        }
    };
    (
        pub $self:ident [$zero:expr] [$doc:expr] {
            $(
                $setter:ident -> $field:ident[$($entry:tt)+],
            )+
        }
    ) => {
        $(
            field_getters_setters![@case $self [$zero] [$doc] $setter $field $($entry)+];
        )+
    };
}
