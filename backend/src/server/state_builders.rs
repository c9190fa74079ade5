//! Builders wiring domain services onto the configured storage adapters.

use std::sync::Arc;

use inventory::domain::ports::{
    NotificationRepository, OrderStore, ProductRepository, StockIngestion, UserRepository,
};
use inventory::domain::{
    NotificationService, OrderService, ProductService, SensorIngestionService, UserService,
};
use inventory::inbound::http::state::HttpState;
use inventory::inbound::telemetry::TelemetryHandler;
use inventory::outbound::InMemoryInventory;
use inventory::outbound::persistence::{
    DieselNotificationRepository, DieselOrderStore, DieselProductRepository,
    DieselUserRepository,
};

use super::ServerConfig;

/// Everything the inbound adapters need.
#[derive(Clone)]
pub struct AppServices {
    pub http: HttpState,
    pub telemetry: TelemetryHandler,
}

fn wire<P, O, U, N>(
    products: Arc<P>,
    orders: Arc<O>,
    users: Arc<U>,
    notifications: Arc<N>,
    config: &ServerConfig,
) -> AppServices
where
    P: ProductRepository + 'static,
    O: OrderStore + 'static,
    U: UserRepository + 'static,
    N: NotificationRepository + 'static,
{
    let order_service = Arc::new(OrderService::new(orders));
    let ingestion: Arc<dyn StockIngestion> = Arc::new(
        SensorIngestionService::new(products.clone(), users.clone(), notifications.clone())
            .with_threshold(config.low_stock_threshold),
    );
    AppServices {
        http: HttpState {
            orders: order_service.clone(),
            orders_query: order_service,
            products: Arc::new(ProductService::new(products)),
            users: Arc::new(UserService::new(users)),
            notifications: Arc::new(NotificationService::new(notifications)),
        },
        telemetry: TelemetryHandler::new(ingestion, config.telemetry_topic.clone()),
    }
}

/// Use the Diesel adapters when a pool is configured, otherwise one shared
/// in-memory store.
pub fn build_services(config: &ServerConfig) -> AppServices {
    match &config.db_pool {
        Some(pool) => wire(
            Arc::new(DieselProductRepository::new(pool.clone())),
            Arc::new(DieselOrderStore::new(pool.clone()).with_lock_timeout(config.lock_timeout)),
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselNotificationRepository::new(pool.clone())),
            config,
        ),
        None => {
            let store = Arc::new(InMemoryInventory::new(config.lock_timeout));
            wire(store.clone(), store.clone(), store.clone(), store, config)
        }
    }
}
