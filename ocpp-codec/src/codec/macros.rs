//! Declarative generators for enumerations, value objects, payloads and
//! actions.
//!
//! Every OCPP message type follows the same pattern: a table of JSON
//! properties, each mandatory, optional or set-valued, converted with the
//! property type's [`JsonCodec`](crate::codec::JsonCodec) impl. The macros
//! below turn such a table into the struct and its codec so that adding an
//! action is a matter of listing its fields.
//!
//! ## Field table syntax
//!
//! ```text
//! <kind> <rust_field>: <Type> = "<jsonKey>",
//! ```
//!
//! | kind | Rust type | parse | serialize |
//! |------|-----------|-------|-----------|
//! | `mandatory` | `T` | key required | always emitted |
//! | `optional` | `Option<T>` | `None` when absent | emitted when `Some` |
//! | `set` | `BTreeSet<T>` | non-empty array required | always emitted |
//! | `optional_set` | `BTreeSet<T>` | empty when absent | emitted when non-empty |
//!
//! ## Usage
//!
//! ```
//! use ocpp_codec::{ocpp_enum, ocpp_object};
//!
//! ocpp_enum! {
//!     /// Light colour.
//!     pub enum Colour: "colour" {
//!         Red => "Red",
//!         Green => "Green",
//!     }
//! }
//!
//! ocpp_object! {
//!     /// Lamp state.
//!     pub struct Lamp: "lamp" {
//!         mandatory id: i32 = "id",
//!         optional colour: Colour = "colour",
//!     }
//! }
//! ```

/// Generate a closed enumeration with case-insensitive token parsing.
#[macro_export]
macro_rules! ocpp_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical wire token.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }

            /// Case-insensitive lookup against the token vocabulary.
            pub fn from_token(token: &str) -> ::std::option::Option<Self> {
                $(
                    if token.eq_ignore_ascii_case($token) {
                        return ::std::option::Option::Some($name::$variant);
                    }
                )+
                ::std::option::Option::None
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::ParseError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                Self::from_token(s).ok_or_else(|| $crate::error::ParseError::UnknownEnumValue {
                    label: $label,
                    token: s.to_string(),
                })
            }
        }

        impl $crate::codec::JsonCodec for $name {
            const LABEL: &'static str = $label;

            fn from_json(
                json: &$crate::__serde_json::Value,
                hooks: &$crate::codec::CodecHooks,
            ) -> ::std::result::Result<Self, $crate::error::ParseError> {
                let json = hooks.prepare(Self::LABEL, json);
                let token = json.as_str().ok_or($crate::error::ParseError::WrongType {
                    expected: "string",
                    found: $crate::error::json_type_name(&json),
                })?;
                token.parse()
            }

            fn to_json(&self, hooks: &$crate::codec::CodecHooks) -> $crate::__serde_json::Value {
                hooks.finish(
                    Self::LABEL,
                    $crate::__serde_json::Value::String(self.as_str().to_string()),
                )
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ocpp_field_type {
    (mandatory $ty:ty) => { $ty };
    (optional $ty:ty) => { ::std::option::Option<$ty> };
    (set $ty:ty) => { ::std::collections::BTreeSet<$ty> };
    (optional_set $ty:ty) => { ::std::collections::BTreeSet<$ty> };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ocpp_parse_field {
    (mandatory $ty:ty, $obj:expr, $key:expr, $hooks:expr) => {
        <$crate::__serde_json::Map<::std::string::String, $crate::__serde_json::Value>
            as $crate::codec::JsonObjectExt>::mandatory::<$ty>($obj, $key, $hooks)
    };
    (optional $ty:ty, $obj:expr, $key:expr, $hooks:expr) => {
        <$crate::__serde_json::Map<::std::string::String, $crate::__serde_json::Value>
            as $crate::codec::JsonObjectExt>::optional::<$ty>($obj, $key, $hooks)
    };
    (set $ty:ty, $obj:expr, $key:expr, $hooks:expr) => {
        <$crate::__serde_json::Map<::std::string::String, $crate::__serde_json::Value>
            as $crate::codec::JsonObjectExt>::mandatory_set::<$ty>($obj, $key, $hooks)
    };
    (optional_set $ty:ty, $obj:expr, $key:expr, $hooks:expr) => {
        <$crate::__serde_json::Map<::std::string::String, $crate::__serde_json::Value>
            as $crate::codec::JsonObjectExt>::optional_set::<$ty>($obj, $key, $hooks)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __ocpp_write_field {
    (mandatory $ty:ty, $out:expr, $key:expr, $value:expr) => {
        $out.mandatory::<$ty>($key, $value);
    };
    (optional $ty:ty, $out:expr, $key:expr, $value:expr) => {
        $out.optional::<$ty>($key, ($value).as_ref());
    };
    (set $ty:ty, $out:expr, $key:expr, $value:expr) => {
        $out.set::<$ty>($key, $value);
    };
    (optional_set $ty:ty, $out:expr, $key:expr, $value:expr) => {
        $out.set::<$ty>($key, $value);
    };
}

/// Generate a value object with an optional `customData` property.
///
/// Unknown properties are rejected; `customData` content is kept as is.
#[macro_export]
macro_rules! ocpp_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $label:literal {
            $( $(#[$fmeta:meta])* $kind:ident $field:ident : $ty:ty = $key:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name {
            $( $(#[$fmeta])* pub $field: $crate::__ocpp_field_type!($kind $ty), )*
            pub custom_data: ::std::option::Option<$crate::types::CustomData>,
        }

        impl $name {
            /// Properties this object accepts.
            pub const KEYS: &'static [&'static str] = &[$($key,)* "customData"];
        }

        impl $crate::codec::JsonCodec for $name {
            const LABEL: &'static str = $label;

            fn from_json(
                json: &$crate::__serde_json::Value,
                hooks: &$crate::codec::CodecHooks,
            ) -> ::std::result::Result<Self, $crate::error::ParseError> {
                use $crate::codec::JsonObjectExt as _;

                let json = hooks.prepare(Self::LABEL, json);
                let obj = $crate::codec::expect_object(&json)?;
                obj.reject_unknown(Self::KEYS)?;

                Ok(Self {
                    $( $field: $crate::__ocpp_parse_field!($kind $ty, obj, $key, hooks)?, )*
                    custom_data: obj.optional("customData", hooks)?,
                })
            }

            fn to_json(&self, hooks: &$crate::codec::CodecHooks) -> $crate::__serde_json::Value {
                let mut out = $crate::codec::JsonWriter::new(hooks);
                $( $crate::__ocpp_write_field!($kind $ty, out, $key, &self.$field); )*
                out.optional("customData", self.custom_data.as_ref());
                out.finish(Self::LABEL)
            }
        }
    };
}

/// Generate the payload of a request or response.
///
/// `customData` and `signatures` belong to the envelope and are handled by
/// [`Request`](crate::envelope::Request) and
/// [`Response`](crate::envelope::Response).
#[macro_export]
macro_rules! ocpp_payload {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $( $(#[$fmeta:meta])* $kind:ident $field:ident : $ty:ty = $key:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        $vis struct $name {
            $( $(#[$fmeta])* pub $field: $crate::__ocpp_field_type!($kind $ty), )*
        }

        impl $crate::envelope::Payload for $name {
            const KEYS: &'static [&'static str] = &[$($key),*];

            fn parse_fields(
                obj: &$crate::__serde_json::Map<::std::string::String, $crate::__serde_json::Value>,
                hooks: &$crate::codec::CodecHooks,
            ) -> ::std::result::Result<Self, $crate::error::ParseError> {
                let _ = (&obj, &hooks);
                Ok(Self {
                    $( $field: $crate::__ocpp_parse_field!($kind $ty, obj, $key, hooks)?, )*
                })
            }

            fn write_fields(&self, out: &mut $crate::codec::JsonWriter<'_>) {
                let _ = &out;
                $( $crate::__ocpp_write_field!($kind $ty, out, $key, &self.$field); )*
            }
        }
    };
}

/// Bind an action name to its request and response payloads.
#[macro_export]
macro_rules! ocpp_action {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident = $action:literal {
            request: $req:ty,
            response: $resp:ty $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::envelope::Action for $name {
            const NAME: &'static str = $action;
            const REQUEST_LABEL: &'static str = concat!($action, "Request");
            const RESPONSE_LABEL: &'static str = concat!($action, "Response");
            type Request = $req;
            type Response = $resp;
        }
    };
}
