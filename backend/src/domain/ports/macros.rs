//! Defines helper macros for generating domain port error enums.

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
    //! Constructor shapes generated for port errors.

    use rstest::rstest;

    define_port_error! {
        /// Errors a dispatch store could raise.
        pub enum DispatchStoreError {
            /// The store cannot be reached.
            Offline => "dispatch store offline",
            /// The phone number already belongs to another workshop.
            DuplicatePhone { phone: String } => "phone already registered: {phone}",
            /// Compare-and-swap lost against a newer revision.
            StaleRevision { expected: u32 } => "stale revision, expected {expected}",
            /// Query failed on a given table.
            Query { table: String, message: String } => "{table}: {message}",
        }
    }

    #[rstest]
    #[case(
        DispatchStoreError::duplicate_phone("9876543210"),
        "phone already registered: 9876543210"
    )]
    #[case(DispatchStoreError::stale_revision(3_u32), "stale revision, expected 3")]
    #[case(
        DispatchStoreError::query("service_requests", String::from("deadlock")),
        "service_requests: deadlock"
    )]
    fn constructors_convert_field_arguments(
        #[case] error: DispatchStoreError,
        #[case] rendered: &str,
    ) {
        assert_eq!(error.to_string(), rendered);
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        let error = DispatchStoreError::offline();
        assert_eq!(error, DispatchStoreError::Offline);
        assert_eq!(error.to_string(), "dispatch store offline");
    }
}
