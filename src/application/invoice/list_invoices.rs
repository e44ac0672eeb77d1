use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::invoice::{InvoiceError, InvoiceService, format_currency};

#[derive(Debug, Deserialize)]
pub struct ListInvoicesCommand {
  pub query: Option<String>,
  pub page: i64,
  pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct InvoiceListItemDto {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub name: String,
  pub email: String,
  pub image_url: Option<String>,
  pub amount: String,
  pub status: String,
  pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ListInvoicesResponse {
  pub invoices: Vec<InvoiceListItemDto>,
  pub query: String,
  pub current_page: i64,
  pub total_pages: i64,
}

pub struct ListInvoicesUseCase {
  invoice_service: Arc<InvoiceService>,
}

impl ListInvoicesUseCase {
  pub fn new(invoice_service: Arc<InvoiceService>) -> Self {
    Self { invoice_service }
  }

  pub async fn execute(
    &self,
    command: ListInvoicesCommand,
  ) -> Result<ListInvoicesResponse, InvoiceError> {
    let query = command.query.unwrap_or_default();
    let page = self
      .invoice_service
      .list_invoices(Some(query.clone()), command.page, command.page_size)
      .await?;

    let invoices = page
      .invoices
      .into_iter()
      .map(|i| InvoiceListItemDto {
        id: i.id,
        customer_id: i.customer_id,
        name: i.name,
        email: i.email,
        image_url: i.image_url,
        amount: format_currency(i.amount),
        status: i.status.as_str().to_string(),
        date: i.date,
      })
      .collect();

    Ok(ListInvoicesResponse {
      invoices,
      query,
      current_page: page.current_page,
      total_pages: page.total_pages,
    })
  }
}
