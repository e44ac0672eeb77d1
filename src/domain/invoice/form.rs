//! Declarative schema for the invoice create/edit form.
//!
//! `InvoiceForm` is what the browser posts: every field is optional so that a
//! missing input is reported as a field error instead of a decoding failure.
//! `InvoiceForm::parse` is the single entry point: it either yields typed
//! values or a [`FieldErrors`] map keyed by form field name.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

use super::value_objects::{Amount, CustomerId, InvoiceStatus, ValueObjectError};

pub const CUSTOMER_REQUIRED: &str = "Please select a customer.";
pub const AMOUNT_GREATER_THAN_ZERO: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_PRECISION: &str = "Please enter an amount with at most two decimal places.";
pub const AMOUNT_TOO_LARGE: &str = "Please enter a smaller amount.";
pub const STATUS_REQUIRED: &str = "Please select an invoice status.";

/// Form field names in the order they appear on the page.
pub const FIELD_ORDER: [&str; 3] = ["customer_id", "amount", "status"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
pub struct InvoiceForm {
  #[serde(default)]
  #[validate(
    required(message = "Please select a customer."),
    custom(function = "validate_customer_id")
  )]
  pub customer_id: Option<String>,

  #[serde(default)]
  #[validate(
    required(message = "Please enter an amount greater than $0."),
    custom(function = "validate_amount")
  )]
  pub amount: Option<String>,

  #[serde(default)]
  #[validate(
    required(message = "Please select an invoice status."),
    custom(function = "validate_status")
  )]
  pub status: Option<String>,
}

/// Typed result of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
  pub customer_id: CustomerId,
  pub amount: Amount,
  pub status: InvoiceStatus,
}

impl InvoiceForm {
  pub fn new(customer_id: &str, amount: &str, status: &str) -> Self {
    Self {
      customer_id: Some(customer_id.to_string()),
      amount: Some(amount.to_string()),
      status: Some(status.to_string()),
    }
  }

  /// Validate the submitted fields and convert them into domain values.
  pub fn parse(&self) -> Result<ValidatedInvoice, FieldErrors> {
    self.validate()?;

    // `validate` has already accepted every field, so conversion failures
    // here can only come from a schema/value-object mismatch.
    let customer_id = self
      .customer_id
      .clone()
      .ok_or_else(|| FieldErrors::single("customer_id", CUSTOMER_REQUIRED))
      .and_then(|v| {
        CustomerId::new(v).map_err(|_| FieldErrors::single("customer_id", CUSTOMER_REQUIRED))
      })?;
    let amount = self
      .amount
      .as_deref()
      .ok_or_else(|| FieldErrors::single("amount", AMOUNT_GREATER_THAN_ZERO))
      .and_then(|v| Amount::parse(v).map_err(|e| FieldErrors::single("amount", amount_message(&e))))?;
    let status = self
      .status
      .as_deref()
      .ok_or_else(|| FieldErrors::single("status", STATUS_REQUIRED))
      .and_then(|v| {
        InvoiceStatus::from_str(v).map_err(|_| FieldErrors::single("status", STATUS_REQUIRED))
      })?;

    Ok(ValidatedInvoice {
      customer_id,
      amount,
      status,
    })
  }
}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
  ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn validate_customer_id(value: &str) -> Result<(), ValidationError> {
  CustomerId::new(value.to_string())
    .map(|_| ())
    .map_err(|_| with_message("customer_id", CUSTOMER_REQUIRED))
}

fn validate_amount(value: &str) -> Result<(), ValidationError> {
  Amount::parse(value)
    .map(|_| ())
    .map_err(|e| with_message("amount", amount_message(&e)))
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
  InvoiceStatus::from_str(value)
    .map(|_| ())
    .map_err(|_| with_message("status", STATUS_REQUIRED))
}

fn amount_message(error: &ValueObjectError) -> &'static str {
  match error {
    ValueObjectError::AmountTooPrecise => AMOUNT_PRECISION,
    ValueObjectError::AmountTooLarge => AMOUNT_TOO_LARGE,
    _ => AMOUNT_GREATER_THAN_ZERO,
  }
}

/// Mapping from form field name to its ordered validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn single(field: &str, message: &str) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: &str) {
    self
      .0
      .entry(field.to_string())
      .or_default()
      .push(message.to_string());
  }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn contains(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// Field names with errors, in form order.
  pub fn fields(&self) -> Vec<&str> {
    FIELD_ORDER
      .iter()
      .copied()
      .filter(|f| self.contains(f))
      .chain(
        self
          .0
          .keys()
          .map(String::as_str)
          .filter(|k| !FIELD_ORDER.contains(k)),
      )
      .collect()
  }
}

impl From<ValidationErrors> for FieldErrors {
  fn from(errors: ValidationErrors) -> Self {
    let mut field_errors = FieldErrors::new();
    for (field, errors) in errors.field_errors() {
      for error in errors {
        let message = error
          .message
          .as_ref()
          .map(|m| m.to_string())
          .unwrap_or_else(|| format!("Invalid field: {}", field));
        field_errors.add(&field, &message);
      }
    }
    field_errors
  }
}
