pub mod employee;
pub mod inventory_item;
pub mod invoice;
pub mod invoice_item;
pub mod material;
pub mod message;
pub mod supplier;
pub mod user;
