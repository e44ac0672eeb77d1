use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Amount, CustomerId, InvoiceStatus};

// Invoice - a persisted row of the `invoices` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
  pub id: Uuid,
  pub customer_id: CustomerId,
  /// Amount in minor units (cents)
  pub amount: i64,
  pub status: InvoiceStatus,
  pub date: NaiveDate,
}

impl Invoice {
  pub fn amount_in_major_units(&self) -> Option<Amount> {
    Amount::from_minor_units(self.amount).ok()
  }
}

/// Values for an INSERT. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
  pub customer_id: CustomerId,
  pub amount: i64,
  pub status: InvoiceStatus,
  pub date: NaiveDate,
}

impl NewInvoice {
  /// Stamp a new invoice with today's UTC calendar date.
  pub fn new(customer_id: CustomerId, amount: Amount, status: InvoiceStatus) -> Self {
    Self {
      customer_id,
      amount: amount.to_minor_units(),
      status,
      date: Utc::now().date_naive(),
    }
  }
}

/// Values for an UPDATE. `date` is not editable.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceChanges {
  pub customer_id: CustomerId,
  pub amount: i64,
  pub status: InvoiceStatus,
}

impl InvoiceChanges {
  pub fn new(customer_id: CustomerId, amount: Amount, status: InvoiceStatus) -> Self {
    Self {
      customer_id,
      amount: amount.to_minor_units(),
      status,
    }
  }
}

// Customer - read-only reference data for the invoice forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub image_url: Option<String>,
}

/// One row of the invoice listing, joined with its customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub name: String,
  pub email: String,
  pub image_url: Option<String>,
  pub amount: i64,
  pub status: InvoiceStatus,
  pub date: NaiveDate,
}
