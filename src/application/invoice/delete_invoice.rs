use std::sync::Arc;
use uuid::Uuid;

use super::outcome::{ActionOutcome, FormState};
use crate::domain::invoice::{InvoiceError, InvoiceService};

pub const DELETE_DATABASE_MESSAGE: &str = "Database Error: Failed to Delete Invoice.";
pub const DELETE_NOT_FOUND_MESSAGE: &str = "Invoice not found. Failed to Delete Invoice.";

#[derive(Debug)]
pub struct DeleteInvoiceCommand {
  pub invoice_id: Uuid,
}

pub struct DeleteInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl DeleteInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  /// Delete is triggered from the listing itself, so success does not
  /// redirect: it returns an empty state after revalidating the listing.
  pub async fn execute(&self, command: DeleteInvoiceCommand) -> ActionOutcome {
    let invoice_id = command.invoice_id;

    match self.invoice_service.delete_invoice(invoice_id).await {
      Ok(()) => tracing::info!(%invoice_id, "Invoice deleted"),
      Err(InvoiceError::InvoiceNotFound(_)) => {
        tracing::warn!(%invoice_id, "Delete requested for unknown invoice");
        return ActionOutcome::State(FormState::message(DELETE_NOT_FOUND_MESSAGE));
      }
      Err(e) => {
        tracing::error!("Failed to delete invoice {}: {}", invoice_id, e);
        return ActionOutcome::State(FormState::message(DELETE_DATABASE_MESSAGE));
      }
    }

    self.invoice_service.revalidate_listing().await;
    ActionOutcome::State(FormState::default())
  }
}
