use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::outcome::FormState;
use crate::domain::invoice::{Customer, InvoiceError, InvoiceForm, InvoiceService};

#[derive(Debug)]
pub struct GetInvoiceForEditCommand {
  pub invoice_id: Uuid,
}

/// Everything the edit page needs: the stored invoice as form values plus
/// the customer drop-down.
#[derive(Debug, Serialize)]
pub struct InvoiceEditResponse {
  pub invoice_id: Uuid,
  pub form: InvoiceForm,
  pub customers: Vec<Customer>,
  pub state: FormState,
}

pub struct GetInvoiceForEditUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl GetInvoiceForEditUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: GetInvoiceForEditCommand,
  ) -> Result<InvoiceEditResponse, InvoiceError> {
    let invoice = self.invoice_service.get_invoice(command.invoice_id).await?;
    let customers = self.invoice_service.list_customers().await?;

    let amount = invoice
      .amount_in_major_units()
      .map(|a| a.to_string())
      .unwrap_or_default();

    Ok(InvoiceEditResponse {
      invoice_id: invoice.id,
      form: InvoiceForm::new(invoice.customer_id.value(), &amount, invoice.status.as_str()),
      customers,
      state: FormState::default(),
    })
  }
}
