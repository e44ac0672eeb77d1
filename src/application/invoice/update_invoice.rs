use std::sync::Arc;
use uuid::Uuid;

use super::outcome::{ActionOutcome, FormState};
use crate::domain::invoice::{INVOICES_PATH, InvoiceForm, InvoiceService};

pub const UPDATE_VALIDATION_MESSAGE: &str = "Missing Fields. Failed to Update Invoice.";
pub const UPDATE_DATABASE_MESSAGE: &str = "Database Error: Failed to Update Invoice.";

#[derive(Debug)]
pub struct UpdateInvoiceCommand {
  pub invoice_id: Uuid,
  pub previous_state: FormState,
  pub form: InvoiceForm,
}

pub struct UpdateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl UpdateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: UpdateInvoiceCommand) -> ActionOutcome {
    let invoice_id = command.invoice_id;
    tracing::debug!(
      %invoice_id,
      form = ?command.form,
      retry = !command.previous_state.is_empty(),
      "Update invoice submitted"
    );

    let data = match command.form.parse() {
      Ok(data) => data,
      Err(errors) => {
        tracing::debug!(%invoice_id, fields = ?errors.fields(), "Update invoice rejected by validation");
        return ActionOutcome::State(FormState::invalid(errors, UPDATE_VALIDATION_MESSAGE));
      }
    };

    match self.invoice_service.update_invoice(invoice_id, data).await {
      // An id that matches nothing is still treated as a successful update.
      Ok(0) => tracing::debug!(%invoice_id, "Update matched no invoice"),
      Ok(_) => tracing::info!(%invoice_id, "Invoice updated"),
      Err(e) => {
        tracing::error!("Failed to update invoice {}: {}", invoice_id, e);
        return ActionOutcome::State(FormState::message(UPDATE_DATABASE_MESSAGE));
      }
    }

    self.invoice_service.revalidate_listing().await;
    ActionOutcome::redirect(INVOICES_PATH)
  }
}
