use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueObjectError {
  #[error("Invalid customer id: {0}")]
  InvalidCustomerId(String),
  #[error("Amount is not a number: {0}")]
  AmountNotANumber(String),
  #[error("Amount must be greater than zero")]
  AmountNotPositive,
  #[error("Amount cannot have more than 2 decimal places")]
  AmountTooPrecise,
  #[error("Amount is too large")]
  AmountTooLarge,
  #[error("Invalid invoice status: {0}")]
  InvalidStatus(String),
}

// Customer reference - opaque, chosen from the customer drop-down
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerId(String);

impl CustomerId {
  pub fn new(value: String) -> Result<Self, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      return Err(ValueObjectError::InvalidCustomerId(
        "Customer id cannot be empty".to_string(),
      ));
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn value(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CustomerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

// Invoice Status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
  Pending,
  Paid,
}

impl InvoiceStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      InvoiceStatus::Pending => "pending",
      InvoiceStatus::Paid => "paid",
    }
  }
}

impl FromStr for InvoiceStatus {
  type Err = ValueObjectError;

  // Exact match: the form posts the lowercase value of a radio button.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(InvoiceStatus::Pending),
      "paid" => Ok(InvoiceStatus::Paid),
      _ => Err(ValueObjectError::InvalidStatus(format!(
        "Unknown status: {}",
        s
      ))),
    }
  }
}

impl fmt::Display for InvoiceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Minor units per major currency unit (cents per dollar).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

const MAX_FRACTION_DIGITS: u32 = 2;

/// Invoice amount in major units (dollars), strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
  pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
    if value <= Decimal::ZERO {
      return Err(ValueObjectError::AmountNotPositive);
    }
    if value.normalize().scale() > MAX_FRACTION_DIGITS {
      return Err(ValueObjectError::AmountTooPrecise);
    }
    // Reject anything whose cent value would not fit the column.
    if value
      .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
      .and_then(|cents| i64::try_from(cents).ok())
      .is_none()
    {
      return Err(ValueObjectError::AmountTooLarge);
    }
    Ok(Self(value))
  }

  /// Coerce raw form input the way a browser number field is read:
  /// surrounding whitespace is ignored and an empty value counts as zero.
  /// Digit separators (`1_000`) are not numbers.
  pub fn parse(raw: &str) -> Result<Self, ValueObjectError> {
    let trimmed = raw.trim();
    let value = if trimmed.is_empty() {
      Decimal::ZERO
    } else if trimmed.contains('_') {
      return Err(ValueObjectError::AmountNotANumber(trimmed.to_string()));
    } else {
      Decimal::from_str(trimmed)
        .map_err(|_| ValueObjectError::AmountNotANumber(trimmed.to_string()))?
    };
    Self::new(value)
  }

  /// Build an amount back from a stored cent value.
  pub fn from_minor_units(cents: i64) -> Result<Self, ValueObjectError> {
    Self::new(Decimal::new(cents, MAX_FRACTION_DIGITS))
  }

  pub fn value(&self) -> Decimal {
    self.0
  }

  pub fn to_minor_units(&self) -> i64 {
    // Bounds and precision were checked in `new`.
    i64::try_from(self.0 * Decimal::from(MINOR_UNITS_PER_MAJOR)).unwrap_or(i64::MAX)
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:.2}", self.0)
  }
}

/// Render a cent value as `$1,234.56` for the listing page.
pub fn format_currency(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  let dollars = (abs / MINOR_UNITS_PER_MAJOR as u64).to_string();
  let remainder = abs % MINOR_UNITS_PER_MAJOR as u64;

  let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
  for (i, ch) in dollars.chars().enumerate() {
    if i > 0 && (dollars.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }

  format!("{}${}.{:02}", sign, grouped, remainder)
}
