//! Demo data for a fresh database. Everything goes through the services so stock side effects,
//! password hashing and validation match what the HTTP API does.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    entities::{
        inventory_item::BatchStatus,
        invoice::{InvoiceStatus, InvoiceType},
        message::{MessageStatus, MessageType},
        user::UserRole,
    },
    errors::ServiceError,
    handlers::AppServices,
    services::{
        employees::CreateEmployeeInput,
        inventory::RecordBatchInput,
        invoices::{CreateInvoiceInput, InvoiceLineInput},
        materials::CreateMaterialInput,
        messages::CreateMessageInput,
        suppliers::CreateSupplierInput,
        users::CreateUserInput,
    },
};

/// Password given to every seeded account.
pub const DEMO_PASSWORD: &str = "changeme";

/// Counts of what a seeding run created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub skipped: bool,
    pub users: usize,
    pub materials: usize,
    pub suppliers: usize,
    pub batches: usize,
    pub messages: usize,
    pub employees: usize,
    pub invoices: usize,
}

/// `day` of the month `months_back` months before `today`, at midnight UTC. Days past the end of
/// the target month clamp to its first day.
pub fn month_date(today: NaiveDate, months_back: u32, day: u32) -> DateTime<Utc> {
    let first = today.with_day(1).unwrap_or(today);
    let month_start = first
        .checked_sub_months(Months::new(months_back))
        .unwrap_or(first);
    let date = month_start.with_day(day).unwrap_or(month_start);
    date.and_time(NaiveTime::default()).and_utc()
}

/// Seeds the demo organization. Does nothing when any user exists unless `force` is set; a
/// forced run reuses demo accounts and employee records that already exist and adds the rest
/// of the data again.
#[instrument(skip(services))]
pub async fn run(
    services: &AppServices,
    today: NaiveDate,
    force: bool,
) -> Result<SeedSummary, ServiceError> {
    if !force && services.users.has_users().await? {
        info!("users already present; skipping seed");
        return Ok(SeedSummary {
            skipped: true,
            ..Default::default()
        });
    }

    let mut summary = SeedSummary::default();

    // Users
    let accounts = [
        ("manh", "Manh Nguyen", UserRole::Admin),
        ("tri", "Tri Tran", UserRole::Employee),
        ("nam", "Nam Le", UserRole::Employee),
        ("tien", "Tien Pham", UserRole::Manager),
        ("kiet", "Kiet Vo", UserRole::Employee),
    ];
    let mut users = Vec::with_capacity(accounts.len());
    for (username, full_name, role) in accounts {
        // a forced run keeps accounts that are already there
        if let Some(existing) = services.users.get_by_username(username).await? {
            users.push(existing);
            continue;
        }
        let user = services
            .users
            .create_user(CreateUserInput {
                username: username.to_string(),
                password: DEMO_PASSWORD.to_string(),
                full_name: full_name.to_string(),
                role: Some(role),
                email: Some(format!("{username}@example.com")),
            })
            .await?;
        users.push(user);
        summary.users += 1;
    }

    // Materials
    let catalog = [
        ("Cashew milk", 500, 1000, "Pure cashew milk"),
        ("Almond milk", 300, 500, "Unsweetened almond milk"),
        ("Walnut milk", 200, 300, "Roasted walnut milk"),
        ("Pistachio milk", 250, 400, "Pistachio blend"),
        ("Soy milk", 1000, 2000, "Organic soy milk"),
        ("Oat milk", 800, 1500, "Barista oat milk"),
    ];
    let mut materials = Vec::with_capacity(catalog.len());
    for (name, min_stock, current_stock, description) in catalog {
        let material = services
            .materials
            .create_material(CreateMaterialInput {
                name: name.to_string(),
                kind: Some("Nut milk".to_string()),
                unit: Some("ml".to_string()),
                min_stock: Some(min_stock),
                current_stock: Some(current_stock),
                description: Some(description.to_string()),
                image_url: None,
            })
            .await?;
        materials.push(material);
    }
    summary.materials = materials.len();

    // Suppliers
    let hat_viet = services
        .suppliers
        .create_supplier(CreateSupplierInput {
            name: "Hat Viet Co., Ltd".to_string(),
            phone: Some("0901234567".to_string()),
            email: Some("hatviet@example.com".to_string()),
            contact: Some("Nguyen Van A".to_string()),
            address: Some("Binh Phuoc".to_string()),
            note: None,
            rating: Some(5),
        })
        .await?;
    let green_farm = services
        .suppliers
        .create_supplier(CreateSupplierInput {
            name: "Green Farm Cooperative".to_string(),
            phone: Some("0912345678".to_string()),
            email: Some("greenfarm@example.com".to_string()),
            contact: Some("Tran Thi B".to_string()),
            address: Some("Dong Nai".to_string()),
            note: None,
            rating: Some(4),
        })
        .await?;
    summary.suppliers = 2;

    // (material index, supplier, quantity, price, received, expires in days, status, code)
    let today_at_midnight = month_date(today, 0, today.day());
    let day = |months_back, day_of_month| month_date(today, months_back, day_of_month);
    let batches = [
        (0, hat_viet.id, 1000, 150_000, today_at_midnight, 60, BatchStatus::Fresh, "HD-001"),
        (1, green_farm.id, 500, 280_000, today_at_midnight, 45, BatchStatus::Fresh, "HN-001"),
        (0, hat_viet.id, 200, 155_000, day(0, 2), 90, BatchStatus::Fresh, "HD-002"),
        (1, green_farm.id, 300, 285_000, day(0, 4), 20, BatchStatus::Fresh, "HN-002"),
        (2, hat_viet.id, 150, 180_000, day(1, 10), 10, BatchStatus::Warning, "OC-001"),
        (0, hat_viet.id, 500, 148_000, day(2, 5), -1, BatchStatus::Expired, "HD-OLD"),
    ];
    for (index, supplier_id, quantity, price, date, expires_in_days, status, code) in batches {
        services
            .inventory
            .record_batch(RecordBatchInput {
                material_id: Some(materials[index].id),
                supplier_id: Some(supplier_id),
                quantity,
                price,
                date: Some(date),
                expiry: Some(today_at_midnight + chrono::Duration::days(expires_in_days)),
                status: Some(status),
                batch_code: Some(code.to_string()),
                note: None,
            })
            .await?;
        summary.batches += 1;
    }

    // Messages
    let inbox = [
        (
            "Hat Viet Co., Ltd",
            "We have 200 ml of cashew milk available, would you like to order?",
            MessageType::SupplierOffer,
            json!({ "materialId": materials[0].id, "quantity": 200, "price": 150000 }),
        ),
        (
            "Green Milk Agency",
            "We would like to buy 100 packs of cashew milk, is it in stock?",
            MessageType::CustomerRequest,
            json!({ "materialId": materials[0].id, "quantity": 100, "price": 200000 }),
        ),
    ];
    for (from_name, content, kind, metadata) in inbox {
        services
            .messages
            .create_message(CreateMessageInput {
                from_name: from_name.to_string(),
                content: content.to_string(),
                kind,
                metadata: Some(metadata),
                status: Some(MessageStatus::Unread),
            })
            .await?;
        summary.messages += 1;
    }

    // Employees
    let staff = [
        (0, 20_000_000, "Office hours", "100%"),
        (1, 10_000_000, "Morning (8h-12h)", "95%"),
    ];
    for (index, salary, shift, performance) in staff {
        match services.employees.get_by_user(users[index].id).await {
            Ok(_) => continue,
            Err(ServiceError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
        services
            .employees
            .create_employee(CreateEmployeeInput {
                user_id: users[index].id,
                salary: Some(salary),
                shift: Some(shift.to_string()),
                performance: Some(performance.to_string()),
            })
            .await?;
        summary.employees += 1;
    }

    // Invoices spread over the last six months for the dashboard charts
    let history = [
        (InvoiceType::Import, hat_viet.name.as_str(), 15_000_000, "IMP-001", 5, 15),
        (InvoiceType::Export, "Walk-in customer", 500_000, "EXP-001", 5, 20),
        (InvoiceType::Export, "Agency A", 12_000_000, "EXP-002", 4, 10),
        (InvoiceType::Import, green_farm.name.as_str(), 8_000_000, "IMP-002", 4, 15),
        (InvoiceType::Export, "Supermarket B", 25_000_000, "EXP-003", 3, 5),
        (InvoiceType::Import, hat_viet.name.as_str(), 32_000_000, "IMP-004", 1, 15),
        (InvoiceType::Export, "Can Tho Agency", 15_000_000, "EXP-006", 1, 20),
        (InvoiceType::Export, "Highland Coffee", 18_000_000, "EXP-004", 0, 8),
    ];
    for (kind, partner, total, number, months_back, day) in history {
        services
            .invoices
            .create_invoice(CreateInvoiceInput {
                kind,
                date: Some(month_date(today, months_back, day)),
                partner_name: Some(partner.to_string()),
                total: Some(total),
                status: Some(InvoiceStatus::Completed),
                note: None,
                invoice_number: Some(number.to_string()),
                items: Vec::new(),
            })
            .await?;
        summary.invoices += 1;
    }

    // Two itemized invoices so the current month carries real stock movements
    services
        .invoices
        .create_invoice(CreateInvoiceInput {
            kind: InvoiceType::Import,
            date: Some(month_date(today, 0, 5)),
            partner_name: Some(green_farm.name.clone()),
            total: None,
            status: Some(InvoiceStatus::Completed),
            note: Some("Monthly restock".to_string()),
            invoice_number: Some("IMP-003".to_string()),
            items: vec![
                InvoiceLineInput {
                    material_id: Some(materials[4].id),
                    quantity: 400,
                    price: 40_000,
                },
                InvoiceLineInput {
                    material_id: Some(materials[5].id),
                    quantity: 300,
                    price: 55_000,
                },
            ],
        })
        .await?;
    services
        .invoices
        .create_invoice(CreateInvoiceInput {
            kind: InvoiceType::Export,
            date: Some(month_date(today, 0, 12)),
            partner_name: Some("The Coffee House".to_string()),
            total: None,
            status: Some(InvoiceStatus::Completed),
            note: None,
            invoice_number: Some("EXP-005".to_string()),
            items: vec![InvoiceLineInput {
                material_id: Some(materials[0].id),
                quantity: 100,
                price: 200_000,
            }],
        })
        .await?;
    summary.invoices += 2;

    info!(?summary, "demo data seeded");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_date_walks_back_across_years() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 20).unwrap();
        let date = month_date(today, 3, 15);
        assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2023, 11, 15).unwrap());
    }

    #[test]
    fn month_date_clamps_invalid_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let date = month_date(today, 1, 30);
        assert_eq!(date.date_naive(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
