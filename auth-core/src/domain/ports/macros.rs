//! `define_port_error!` builds adapter-facing error enums.
//!
//! Each variant is either a bare marker or carries a single detail field.
//! The macro derives `thiserror::Error` from the per-variant message and adds
//! a snake_case constructor, taking `impl Into<_>` for the detail.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $field:ident : $ty:ty }) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($field: impl Into<$ty>) -> Self {
                Self::$variant { $field: $field.into() }
            }
        }
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $field:ident : $ty:ty } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                #[allow(missing_docs, reason = "the variant message describes its detail")]
                $variant $( { $field: $ty } )?,
            )*
        }

        impl $name {
            $( define_port_error!(@ctor $variant $( { $field : $ty } )?); )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum LedgerError {
            Locked => "ledger is locked",
            Rejected { reason: String } => "ledger rejected the write: {reason}",
            Behind { lag: u32 } => "ledger replica is {lag} entries behind",
        }
    }

    #[test]
    fn marker_variants_get_nullary_constructors() {
        assert_eq!(LedgerError::locked(), LedgerError::Locked);
        assert_eq!(LedgerError::locked().to_string(), "ledger is locked");
    }

    #[test]
    fn detail_constructors_convert_into_the_field_type() {
        let err = LedgerError::rejected("duplicate key");
        assert_eq!(
            err,
            LedgerError::Rejected {
                reason: "duplicate key".to_owned()
            }
        );
        assert_eq!(err.to_string(), "ledger rejected the write: duplicate key");
    }

    #[test]
    fn non_string_details_keep_their_type() {
        assert_eq!(
            LedgerError::behind(7_u32).to_string(),
            "ledger replica is 7 entries behind"
        );
    }
}
