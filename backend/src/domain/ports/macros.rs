//! Helper macro for declaring port error enums.
//!
//! Each variant gets a `#[error(...)]` message and a snake_case constructor
//! whose parameters accept anything convertible into the field type, so
//! adapters can write `ProductRepositoryError::query("boom")`.

macro_rules! define_port_error {
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
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            #[doc = concat!("Construct [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use crate::domain::ProductId;

    define_port_error! {
        pub enum SampleStoreError {
            Unavailable => "store unavailable",
            Query { message: String } => "query failed: {message}",
            Missing { product_id: ProductId } => "product {product_id} missing",
            Short { product_id: ProductId, available: i32 } =>
                "product {product_id} has only {available}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SampleStoreError::unavailable().to_string(), "store unavailable");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = SampleStoreError::query("syntax error");
        assert_eq!(err.to_string(), "query failed: syntax error");
    }

    #[test]
    fn typed_fields_keep_their_type() {
        let err = SampleStoreError::missing(ProductId::new(4));
        assert_eq!(
            err,
            SampleStoreError::Missing {
                product_id: ProductId::new(4)
            }
        );
    }

    #[test]
    fn mixed_fields_render_in_message() {
        let err = SampleStoreError::short(ProductId::new(2), 1_i32);
        assert_eq!(err.to_string(), "product 2 has only 1");
    }
}
