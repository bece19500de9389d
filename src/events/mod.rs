use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::{invoice::InvoiceType, message::MessageStatus};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends after a commit. A closed or full channel is logged and otherwise ignored,
    /// the write it describes has already happened.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "domain event dropped");
        }
    }
}

// Things that happened in the back office, emitted after the owning transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Materials
    MaterialCreated(i32),
    MaterialUpdated(i32),
    MaterialDeleted(i32),
    StockAdjusted {
        material_id: i32,
        delta: i64,
    },

    // Inventory
    BatchRecorded {
        batch_id: i32,
        material_id: Option<i32>,
        quantity: i64,
    },

    // Invoices
    InvoiceCreated {
        invoice_id: i32,
        kind: InvoiceType,
        total: i64,
        item_count: usize,
    },

    SupplierCreated(i32),

    // Inbox
    MessageReceived(i32),
    MessageStatusChanged {
        message_id: i32,
        status: MessageStatus,
    },

    // People
    UserCreated(i32),
    EmployeeCreated {
        employee_id: i32,
        user_id: i32,
    },
}

impl Event {
    /// Short label used as the `event` field in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::MaterialCreated(_) => "material_created",
            Event::MaterialUpdated(_) => "material_updated",
            Event::MaterialDeleted(_) => "material_deleted",
            Event::StockAdjusted { .. } => "stock_adjusted",
            Event::BatchRecorded { .. } => "batch_recorded",
            Event::InvoiceCreated { .. } => "invoice_created",
            Event::SupplierCreated(_) => "supplier_created",
            Event::MessageReceived(_) => "message_received",
            Event::MessageStatusChanged { .. } => "message_status_changed",
            Event::UserCreated(_) => "user_created",
            Event::EmployeeCreated { .. } => "employee_created",
        }
    }
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockAdjusted { material_id, delta } => {
                info!(event = event.name(), material_id, delta, "stock moved");
                metrics::counter!("stockroom.stock.adjustments", 1);
            }
            Event::InvoiceCreated {
                invoice_id,
                kind,
                total,
                item_count,
            } => {
                info!(
                    event = event.name(),
                    invoice_id,
                    kind = kind.as_str(),
                    total,
                    item_count,
                    "invoice recorded"
                );
                metrics::counter!("stockroom.invoices.created", 1, "type" => kind.as_str());
            }
            Event::BatchRecorded {
                batch_id,
                material_id,
                quantity,
            } => {
                info!(
                    event = event.name(),
                    batch_id,
                    material_id = ?material_id,
                    quantity,
                    "inventory batch recorded"
                );
            }
            other => {
                info!(event = other.name(), payload = ?other, "domain event");
            }
        }
    }

    info!("Event channel closed, stopping event processing loop");
}
