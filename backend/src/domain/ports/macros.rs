//! `define_port_error!` declares the failure enum of a driven port.
//!
//! Each variant names its display message and the domain [`Error`] it turns
//! into, so services propagate adapter failures with `?` or
//! `.map_err(Error::from)`. Constructors are generated in snake case and take
//! `impl Into<_>` for every field.
//!
//! ```ignore
//! define_port_error! {
//!     pub enum UserPersistenceError {
//!         Connection { message: String } => "connection failed: {message}"
//!             as Error::service_unavailable,
//!         DuplicateEmail { email: String } => "email already registered: {email}"
//!             as |_| Error::from(ValidationErrors::email_taken()),
//!     }
//! }
//! ```
//!
//! [`Error`]: crate::domain::Error

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
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )?
                    => $message:literal as $into_domain:expr
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

        impl From<$name> for $crate::domain::Error {
            fn from(error: $name) -> Self {
                let text = error.to_string();
                match error {
                    $(
                        $name::$variant $( { $($field: _),* } )? => ($into_domain)(text),
                    )*
                }
            }
        }
    };
}

pub(crate) use define_port_error;
