use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::invoice::{
  CustomerId, Invoice, InvoiceChanges, InvoiceStatus, InvoiceSummary, NewInvoice,
  errors::InvoiceError,
  ports::{InvoiceQuery, InvoiceRepository},
};

#[derive(Debug, FromRow)]
struct InvoiceRow {
  id: Uuid,
  customer_id: String,
  amount: i64,
  status: String,
  date: NaiveDate,
}

impl TryFrom<InvoiceRow> for Invoice {
  type Error = InvoiceError;

  fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
    Ok(Invoice {
      id: row.id,
      customer_id: CustomerId::new(row.customer_id)?,
      amount: row.amount,
      status: InvoiceStatus::from_str(&row.status)?,
      date: row.date,
    })
  }
}

#[derive(Debug, FromRow)]
struct InvoiceSummaryRow {
  id: Uuid,
  customer_id: Uuid,
  name: String,
  email: String,
  image_url: Option<String>,
  amount: i64,
  status: String,
  date: NaiveDate,
}

impl TryFrom<InvoiceSummaryRow> for InvoiceSummary {
  type Error = InvoiceError;

  fn try_from(row: InvoiceSummaryRow) -> Result<Self, Self::Error> {
    Ok(InvoiceSummary {
      id: row.id,
      customer_id: row.customer_id,
      name: row.name,
      email: row.email,
      image_url: row.image_url,
      amount: row.amount,
      status: InvoiceStatus::from_str(&row.status)?,
      date: row.date,
    })
  }
}

/// Turn free-text search into an ILIKE pattern, escaping wildcards.
fn like_pattern(search: Option<&str>) -> Option<String> {
  search.map(|s| {
    let escaped = s
      .replace('\\', "\\\\")
      .replace('%', "\\%")
      .replace('_', "\\_");
    format!("%{}%", escaped)
  })
}

pub struct PostgresInvoiceRepository {
  pool: PgPool,
}

impl PostgresInvoiceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl InvoiceRepository for PostgresInvoiceRepository {
  async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            RETURNING id, customer_id::text AS customer_id, amount, status, date
            "#,
    )
    .bind(invoice.customer_id.value())
    .bind(invoice.amount)
    .bind(invoice.status.as_str())
    .bind(invoice.date)
    .fetch_one(&self.pool)
    .await?;

    row.try_into()
  }

  async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<u64, InvoiceError> {
    let result = sqlx::query(
      r#"
            UPDATE invoices
            SET customer_id = $2::uuid, amount = $3, status = $4
            WHERE id = $1
            "#,
    )
    .bind(id)
    .bind(changes.customer_id.value())
    .bind(changes.amount)
    .bind(changes.status.as_str())
    .execute(&self.pool)
    .await?;

    Ok(result.rows_affected())
  }

  async fn delete(&self, id: Uuid) -> Result<u64, InvoiceError> {
    let result = sqlx::query(
      r#"
      DELETE FROM invoices
      WHERE id = $1
      "#,
    )
    .bind(id)
    .execute(&self.pool)
    .await?;

    Ok(result.rows_affected())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    let row = sqlx::query_as::<_, InvoiceRow>(
      r#"
            SELECT id, customer_id::text AS customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            "#,
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;

    row.map(|r| r.try_into()).transpose()
  }

  async fn search(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    let rows = sqlx::query_as::<_, InvoiceSummaryRow>(
      r#"
            SELECT invoices.id, invoices.customer_id, customers.name, customers.email,
                   customers.image_url, invoices.amount, invoices.status, invoices.date
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE $1::text IS NULL
               OR customers.name ILIKE $1
               OR customers.email ILIKE $1
               OR invoices.amount::text ILIKE $1
               OR invoices.date::text ILIKE $1
               OR invoices.status ILIKE $1
            ORDER BY invoices.date DESC, invoices.id
            LIMIT $2 OFFSET $3
            "#,
    )
    .bind(like_pattern(query.search.as_deref()))
    .bind(query.limit)
    .bind(query.offset)
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(|r| r.try_into()).collect()
  }

  async fn count(&self, search: Option<&str>) -> Result<i64, InvoiceError> {
    let count = sqlx::query_scalar::<_, i64>(
      r#"
            SELECT COUNT(*)
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            WHERE $1::text IS NULL
               OR customers.name ILIKE $1
               OR customers.email ILIKE $1
               OR invoices.amount::text ILIKE $1
               OR invoices.date::text ILIKE $1
               OR invoices.status ILIKE $1
            "#,
    )
    .bind(like_pattern(search))
    .fetch_one(&self.pool)
    .await?;

    Ok(count)
  }
}
