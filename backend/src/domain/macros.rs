//! Helper macro for closed sets of lowercase labels stored as text columns.

/// Define a fieldless enum with a lowercase wire/database form.
///
/// Generates `as_str`, `ALL`, `Display` and a `FromStr` whose error is a
/// [`FieldError::InvalidFormat`](crate::domain::FieldError) for `$field`.
macro_rules! define_text_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident ($field:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $text:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted value.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Lowercase label used on the wire and in storage.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::domain::FieldError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    _ => Err($crate::domain::FieldError::InvalidFormat {
                        field: $field,
                        reason: concat!("must be one of: ", $($text, " "),+),
                    }),
                }
            }
        }
    };
}

pub(crate) use define_text_enum;
