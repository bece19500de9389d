use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = r#"
# Stockroom back office API

Materials, suppliers, inventory batches, import/export invoices, an inbox for supplier offers
and customer requests, employees and user accounts for a single organization.

## Stock movements

- Recording an inventory batch adds its quantity to the material's `currentStock`.
- An `IMPORT` invoice adds each line's quantity and records one batch per line.
- An `EXPORT` invoice subtracts each line's quantity.

Each of these writes is applied in one database transaction.

## Authentication

`POST /api/login` returns a session token. Send it back as:

```
Authorization: Bearer <token>
```

Whether a token is mandatory for the other endpoints depends on deployment configuration.

## Errors

```json
{
  "error": "Bad Request",
  "message": "Validation error: name must not be empty",
  "field": "name",
  "request_id": "3f1c0c9e-8e55-4f0e-bb3c-6b8b1c1c2f10",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Sign-in and session"),
        (name = "users", description = "User accounts"),
        (name = "materials", description = "Stock-keeping units"),
        (name = "suppliers", description = "Supplier directory"),
        (name = "inventory", description = "Received batches and stock rollups"),
        (name = "invoices", description = "Import and export invoices"),
        (name = "dashboard", description = "Aggregated figures"),
        (name = "messages", description = "Supplier offers and customer requests"),
        (name = "employees", description = "Staff records")
    ),
    paths(
        // Auth & users
        crate::handlers::users::login,
        crate::handlers::users::current_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::create_user,

        // Materials
        crate::handlers::materials::list_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::create_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,

        // Suppliers
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::create_supplier,

        // Inventory
        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::create_inventory,
        crate::handlers::inventory::inventory_summary,

        // Invoices
        crate::handlers::invoices::list_invoices,
        crate::handlers::invoices::get_invoice,
        crate::handlers::invoices::create_invoice,

        // Dashboard
        crate::handlers::dashboard::get_dashboard,

        // Messages
        crate::handlers::messages::list_messages,
        crate::handlers::messages::create_message,
        crate::handlers::messages::update_message_status,

        // Employees
        crate::handlers::employees::list_employees,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::get_employee_by_user,
    ),
    components(
        schemas(
            crate::entities::user::UserRole,
            crate::entities::inventory_item::BatchStatus,
            crate::entities::invoice::InvoiceType,
            crate::entities::invoice::InvoiceStatus,
            crate::entities::message::MessageType,
            crate::entities::message::MessageStatus,
            crate::services::invoices::InvoiceLineInput,
            crate::services::invoices::InvoiceLineView,
            crate::services::analytics::MaterialStockRow,
            crate::services::analytics::FinancialReport,
            crate::services::analytics::MonthlyFigures,
            crate::services::analytics::WeeklyFigures,
            crate::services::analytics::CompositionEntry,

            // Error types
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "Bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        for path in [
            "/api/login",
            "/api/materials/{id}",
            "/api/invoices",
            "/api/dashboard",
            "/api/employees/by-user/{userId}",
        ] {
            assert!(json.contains(path), "missing {path}");
        }
        assert!(json.contains("ErrorResponse"));
        assert!(json.contains("\"Bearer\""));
    }
}
