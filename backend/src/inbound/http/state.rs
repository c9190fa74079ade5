//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they can be exercised with mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    NotificationInbox, OrderCommand, OrderQuery, ProductCatalogue, UserDirectory,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub orders: Arc<dyn OrderCommand>,
    pub orders_query: Arc<dyn OrderQuery>,
    pub products: Arc<dyn ProductCatalogue>,
    pub users: Arc<dyn UserDirectory>,
    pub notifications: Arc<dyn NotificationInbox>,
}
