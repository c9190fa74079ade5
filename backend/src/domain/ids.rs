//! Surrogate identifiers for persisted aggregates.
//!
//! Each identifier wraps the `BIGSERIAL` key assigned by the store. Distinct
//! newtypes keep a product id from being passed where an order id belongs.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// The raw store key.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_id! {
    /// Identifier of a catalogue product.
    ProductId
}

define_id! {
    /// Identifier of an order header.
    OrderId
}

define_id! {
    /// Identifier of a single order line.
    OrderLineId
}

define_id! {
    /// Identifier of a user account.
    UserId
}

define_id! {
    /// Identifier of a stored notification.
    NotificationId
}
