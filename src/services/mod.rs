// Stock movement primitive shared by batches and invoices
pub mod stock;

// Catalog and partners
pub mod materials;
pub mod suppliers;

// Stock-affecting documents
pub mod inventory;
pub mod invoices;

// Inbox and people
pub mod employees;
pub mod messages;
pub mod users;

// Dashboard and reports
pub mod analytics;
