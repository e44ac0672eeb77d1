use std::sync::Arc;
use uuid::Uuid;

use super::entities::{Customer, Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
use super::errors::InvoiceError;
use super::form::ValidatedInvoice;
use super::ports::{CustomerRepository, InvoiceQuery, InvoiceRepository, PageCache};

/// Route of the invoice listing page. Actions revalidate and redirect here.
pub const INVOICES_PATH: &str = "/dashboard/invoices";

pub struct InvoiceServiceDependencies {
  pub invoice_repo: Arc<dyn InvoiceRepository>,
  pub customer_repo: Arc<dyn CustomerRepository>,
  pub page_cache: Arc<dyn PageCache>,
}

/// One page of the invoice listing.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoicePage {
  pub invoices: Vec<InvoiceSummary>,
  pub total_pages: i64,
  pub current_page: i64,
}

pub struct InvoiceService {
  invoice_repo: Arc<dyn InvoiceRepository>,
  customer_repo: Arc<dyn CustomerRepository>,
  page_cache: Arc<dyn PageCache>,
}

impl InvoiceService {
  pub fn new(deps: InvoiceServiceDependencies) -> Self {
    Self {
      invoice_repo: deps.invoice_repo,
      customer_repo: deps.customer_repo,
      page_cache: deps.page_cache,
    }
  }

  // Invoice writes
  pub async fn create_invoice(&self, data: ValidatedInvoice) -> Result<Invoice, InvoiceError> {
    let invoice = NewInvoice::new(data.customer_id, data.amount, data.status);
    self.invoice_repo.insert(invoice).await
  }

  /// Returns the number of rows matched. Zero is not an error.
  pub async fn update_invoice(
    &self,
    invoice_id: Uuid,
    data: ValidatedInvoice,
  ) -> Result<u64, InvoiceError> {
    let changes = InvoiceChanges::new(data.customer_id, data.amount, data.status);
    self.invoice_repo.update(invoice_id, changes).await
  }

  pub async fn delete_invoice(&self, invoice_id: Uuid) -> Result<(), InvoiceError> {
    let removed = self.invoice_repo.delete(invoice_id).await?;
    if removed == 0 {
      return Err(InvoiceError::InvoiceNotFound(invoice_id));
    }
    Ok(())
  }

  /// Mark every cached rendering of the listing stale. A cache outage only
  /// costs freshness, so it is logged and swallowed.
  pub async fn revalidate_listing(&self) {
    if let Err(e) = self.page_cache.revalidate(INVOICES_PATH).await {
      tracing::warn!("Failed to revalidate {}: {}", INVOICES_PATH, e);
    }
  }

  // Reads
  pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Invoice, InvoiceError> {
    self
      .invoice_repo
      .find_by_id(invoice_id)
      .await?
      .ok_or(InvoiceError::InvoiceNotFound(invoice_id))
  }

  pub async fn list_invoices(
    &self,
    search: Option<String>,
    page: i64,
    page_size: i64,
  ) -> Result<InvoicePage, InvoiceError> {
    let page_size = page_size.max(1);
    let search = search
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty());

    let total = self.invoice_repo.count(search.as_deref()).await?;
    let total_pages = ((total + page_size - 1) / page_size).max(1);
    let current_page = page.clamp(1, total_pages);

    let invoices = self
      .invoice_repo
      .search(&InvoiceQuery {
        search,
        limit: page_size,
        offset: (current_page - 1) * page_size,
      })
      .await?;

    Ok(InvoicePage {
      invoices,
      total_pages,
      current_page,
    })
  }

  pub async fn list_customers(&self) -> Result<Vec<Customer>, InvoiceError> {
    self.customer_repo.find_all().await
  }
}
