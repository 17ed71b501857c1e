//! Helper macro generating port error enums with snake_case constructors.
//!
//! Each variant gets a constructor named after it whose fields accept
//! `impl Into<T>`, so adapters can write `AssetRepositoryError::query("...")`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum LedgerPortError {
            Unreachable { message: String } => "ledger unreachable: {message}",
            Stale { attempts: u32 } => "stale after {attempts} attempts",
            Rejected { message: String, attempts: u32 } => "rejected: {message} ({attempts})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = LedgerPortError::unreachable("timeout");
        assert_eq!(err.to_string(), "ledger unreachable: timeout");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = LedgerPortError::stale(3_u32);
        assert_eq!(err.to_string(), "stale after 3 attempts");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = LedgerPortError::rejected("duplicate", 2_u32);
        assert_eq!(
            err,
            LedgerPortError::Rejected {
                message: "duplicate".to_owned(),
                attempts: 2
            }
        );
    }
}
