//! `define_port_error!`: declares a port error enum with `thiserror`
//! messages and a snake_case constructor per variant.

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
    define_port_error! {
        /// Errors used only by these tests.
        pub enum ArchivePortError {
            Offline => "archive offline",
            Missing { key: String } => "archive entry {key} missing",
            Quota { used: u64 } => "archive quota exceeded at {used} bytes",
            Rejected { key: String, status: u16 } => "archive rejected {key} with {status}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ArchivePortError::offline().to_string(), "archive offline");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = ArchivePortError::missing("avatar.png");
        assert_eq!(err, ArchivePortError::Missing { key: "avatar.png".into() });
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        assert_eq!(
            ArchivePortError::quota(4_096_u64).to_string(),
            "archive quota exceeded at 4096 bytes"
        );
    }

    #[test]
    fn mixed_fields_render_in_order() {
        let err = ArchivePortError::rejected("a", 409_u16);
        assert_eq!(err.to_string(), "archive rejected a with 409");
    }
}
