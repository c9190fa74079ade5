//! Test helpers for inbound HTTP handlers.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::ports::{
    MockNotificationInbox, MockOrderCommand, MockOrderQuery, MockProductCatalogue,
    MockUserDirectory,
};
use crate::inbound::http::routes::configure_api;
use crate::inbound::http::state::HttpState;

/// One mock per driving port; set expectations, then build the app.
#[derive(Default)]
pub struct MockPorts {
    pub orders: MockOrderCommand,
    pub orders_query: MockOrderQuery,
    pub products: MockProductCatalogue,
    pub users: MockUserDirectory,
    pub notifications: MockNotificationInbox,
}

impl MockPorts {
    /// Freeze the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            orders: Arc::new(self.orders),
            orders_query: Arc::new(self.orders_query),
            products: Arc::new(self.products),
            users: Arc::new(self.users),
            notifications: Arc::new(self.notifications),
        }
    }

    /// Build an app serving every `/api/v1` route over these mocks.
    pub fn into_app(
        self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.into_state()))
            .service(web::scope("/api/v1").configure(configure_api))
    }
}
