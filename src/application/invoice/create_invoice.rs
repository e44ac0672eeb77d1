use std::sync::Arc;

use super::outcome::{ActionOutcome, FormState};
use crate::domain::invoice::{INVOICES_PATH, InvoiceForm, InvoiceService};

pub const CREATE_VALIDATION_MESSAGE: &str = "Missing Fields. Failed to Create Invoice";
pub const CREATE_DATABASE_MESSAGE: &str = "Database Error: Failed to Create Invoice.";

#[derive(Debug, Default)]
pub struct CreateInvoiceCommand {
  /// State returned by the previous submission of this form, if any.
  pub previous_state: FormState,
  pub form: InvoiceForm,
}

pub struct CreateInvoiceUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl CreateInvoiceUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(&self, command: CreateInvoiceCommand) -> ActionOutcome {
    tracing::debug!(
      form = ?command.form,
      retry = !command.previous_state.is_empty(),
      "Create invoice submitted"
    );

    let data = match command.form.parse() {
      Ok(data) => data,
      Err(errors) => {
        tracing::debug!(fields = ?errors.fields(), "Create invoice rejected by validation");
        return ActionOutcome::State(FormState::invalid(errors, CREATE_VALIDATION_MESSAGE));
      }
    };

    match self.invoice_service.create_invoice(data).await {
      Ok(invoice) => {
        tracing::info!(invoice_id = %invoice.id, amount = invoice.amount, "Invoice created");
      }
      Err(e) => {
        tracing::error!("Failed to create invoice: {}", e);
        return ActionOutcome::State(FormState::message(CREATE_DATABASE_MESSAGE));
      }
    }

    self.invoice_service.revalidate_listing().await;
    ActionOutcome::redirect(INVOICES_PATH)
  }
}
