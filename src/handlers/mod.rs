pub mod common;
pub mod dashboard;
pub mod employees;
pub mod inventory;
pub mod invoices;
pub mod materials;
pub mod messages;
pub mod suppliers;
pub mod users;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    analytics::AnalyticsService, employees::EmployeeService, inventory::InventoryService,
    invoices::InvoiceService, materials::MaterialService, messages::MessageService,
    suppliers::SupplierService, users::UserService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub materials: Arc<MaterialService>,
    pub suppliers: Arc<SupplierService>,
    pub inventory: Arc<InventoryService>,
    pub invoices: Arc<InvoiceService>,
    pub messages: Arc<MessageService>,
    pub users: Arc<UserService>,
    pub employees: Arc<EmployeeService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            materials: Arc::new(MaterialService::new(db_pool.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone(), event_sender.clone())),
            inventory: Arc::new(InventoryService::new(db_pool.clone(), event_sender.clone())),
            invoices: Arc::new(InvoiceService::new(db_pool.clone(), event_sender.clone())),
            messages: Arc::new(MessageService::new(db_pool.clone(), event_sender.clone())),
            users: Arc::new(UserService::new(
                db_pool.clone(),
                event_sender.clone(),
                auth_service,
            )),
            employees: Arc::new(EmployeeService::new(db_pool.clone(), event_sender)),
            analytics: Arc::new(AnalyticsService::new(db_pool)),
        }
    }
}
