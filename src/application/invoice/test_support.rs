//! Recording fakes for the invoice ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::domain::invoice::{
  CacheError, Customer, CustomerRepository, Invoice, InvoiceChanges, InvoiceError, InvoiceQuery,
  InvoiceRepository, InvoiceService, InvoiceServiceDependencies, InvoiceSummary, NewInvoice,
  PageCache,
  ports::{key_belongs_to_path, path_of},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Insert(NewInvoice),
  Update(Uuid, InvoiceChanges),
  Delete(Uuid),
  Revalidate(String),
}

/// Shared, ordered log of port calls.
#[derive(Default)]
pub struct Recorder {
  calls: Mutex<Vec<Call>>,
}

impl Recorder {
  pub fn record(&self, call: Call) {
    self.calls.lock().unwrap().push(call);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn writes(&self) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|c| !matches!(c, Call::Revalidate(_)))
      .collect()
  }
}

pub struct FakeInvoiceRepository {
  recorder: Arc<Recorder>,
  rows: Mutex<Vec<Invoice>>,
  fail: bool,
}

impl FakeInvoiceRepository {
  pub fn new(recorder: Arc<Recorder>) -> Self {
    Self {
      recorder,
      rows: Mutex::new(Vec::new()),
      fail: false,
    }
  }

  pub fn failing(recorder: Arc<Recorder>) -> Self {
    Self {
      fail: true,
      ..Self::new(recorder)
    }
  }

  pub fn with_rows(self, rows: Vec<Invoice>) -> Self {
    *self.rows.lock().unwrap() = rows;
    self
  }

  pub fn rows(&self) -> Vec<Invoice> {
    self.rows.lock().unwrap().clone()
  }

  fn check(&self) -> Result<(), InvoiceError> {
    if self.fail {
      return Err(InvoiceError::Database(sqlx::Error::PoolTimedOut));
    }
    Ok(())
  }

  fn summary(invoice: &Invoice) -> InvoiceSummary {
    InvoiceSummary {
      id: invoice.id,
      customer_id: Uuid::nil(),
      name: invoice.customer_id.value().to_string(),
      email: format!("{}@example.com", invoice.customer_id.value()),
      image_url: None,
      amount: invoice.amount,
      status: invoice.status,
      date: invoice.date,
    }
  }

  fn matching(&self, search: Option<&str>) -> Vec<Invoice> {
    let needle = search.map(str::to_lowercase);
    self
      .rows()
      .into_iter()
      .filter(|i| match &needle {
        Some(n) => {
          i.customer_id.value().to_lowercase().contains(n) || i.status.as_str().contains(n)
        }
        None => true,
      })
      .collect()
  }
}

#[async_trait]
impl InvoiceRepository for FakeInvoiceRepository {
  async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
    self.recorder.record(Call::Insert(invoice.clone()));
    self.check()?;
    let row = Invoice {
      id: Uuid::new_v4(),
      customer_id: invoice.customer_id,
      amount: invoice.amount,
      status: invoice.status,
      date: invoice.date,
    };
    self.rows.lock().unwrap().push(row.clone());
    Ok(row)
  }

  async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<u64, InvoiceError> {
    self.recorder.record(Call::Update(id, changes.clone()));
    self.check()?;
    let mut rows = self.rows.lock().unwrap();
    let mut matched = 0;
    for row in rows.iter_mut().filter(|r| r.id == id) {
      row.customer_id = changes.customer_id.clone();
      row.amount = changes.amount;
      row.status = changes.status;
      matched += 1;
    }
    Ok(matched)
  }

  async fn delete(&self, id: Uuid) -> Result<u64, InvoiceError> {
    self.recorder.record(Call::Delete(id));
    self.check()?;
    let mut rows = self.rows.lock().unwrap();
    let before = rows.len();
    rows.retain(|r| r.id != id);
    Ok((before - rows.len()) as u64)
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
    self.check()?;
    Ok(self.rows().into_iter().find(|r| r.id == id))
  }

  async fn search(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceSummary>, InvoiceError> {
    self.check()?;
    Ok(
      self
        .matching(query.search.as_deref())
        .iter()
        .skip(query.offset as usize)
        .take(query.limit as usize)
        .map(Self::summary)
        .collect(),
    )
  }

  async fn count(&self, search: Option<&str>) -> Result<i64, InvoiceError> {
    self.check()?;
    Ok(self.matching(search).len() as i64)
  }
}

pub struct FakeCustomerRepository {
  customers: Vec<Customer>,
}

impl FakeCustomerRepository {
  pub fn new(customers: Vec<Customer>) -> Self {
    Self { customers }
  }
}

#[async_trait]
impl CustomerRepository for FakeCustomerRepository {
  async fn find_all(&self) -> Result<Vec<Customer>, InvoiceError> {
    Ok(self.customers.clone())
  }
}

pub struct FakePageCache {
  recorder: Arc<Recorder>,
  entries: Mutex<HashMap<String, String>>,
  generations: Mutex<HashMap<String, u64>>,
  fail: bool,
}

impl FakePageCache {
  pub fn new(recorder: Arc<Recorder>) -> Self {
    Self {
      recorder,
      entries: Mutex::new(HashMap::new()),
      generations: Mutex::new(HashMap::new()),
      fail: false,
    }
  }

  pub fn failing(recorder: Arc<Recorder>) -> Self {
    Self {
      fail: true,
      ..Self::new(recorder)
    }
  }
}

#[async_trait]
impl PageCache for FakePageCache {
  async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
    if self.fail {
      return Err(CacheError::Backend("unavailable".to_string()));
    }
    Ok(self.entries.lock().unwrap().get(key).cloned())
  }

  async fn generation(&self, path: &str) -> Result<u64, CacheError> {
    if self.fail {
      return Err(CacheError::Backend("unavailable".to_string()));
    }
    Ok(self.generations.lock().unwrap().get(path).copied().unwrap_or(0))
  }

  async fn put(&self, key: &str, html: String, generation: u64) -> Result<bool, CacheError> {
    if self.fail {
      return Err(CacheError::Backend("unavailable".to_string()));
    }
    let generations = self.generations.lock().unwrap();
    let current = generations.get(path_of(key)).copied().unwrap_or(0);
    if current != generation {
      return Ok(false);
    }
    self.entries.lock().unwrap().insert(key.to_string(), html);
    Ok(true)
  }

  async fn revalidate(&self, path: &str) -> Result<(), CacheError> {
    self.recorder.record(Call::Revalidate(path.to_string()));
    if self.fail {
      return Err(CacheError::Backend("unavailable".to_string()));
    }
    *self
      .generations
      .lock()
      .unwrap()
      .entry(path.to_string())
      .or_insert(0) += 1;
    self
      .entries
      .lock()
      .unwrap()
      .retain(|key, _| !key_belongs_to_path(key, path));
    Ok(())
  }
}

pub fn customer(name: &str) -> Customer {
  Customer {
    id: Uuid::new_v4(),
    name: name.to_string(),
    email: format!("{}@example.com", name.to_lowercase()),
    image_url: None,
  }
}

/// Wire an `InvoiceService` around the given fakes.
pub fn service(
  invoice_repo: Arc<FakeInvoiceRepository>,
  page_cache: Arc<FakePageCache>,
) -> Arc<InvoiceService> {
  Arc::new(InvoiceService::new(InvoiceServiceDependencies {
    invoice_repo,
    customer_repo: Arc::new(FakeCustomerRepository::new(vec![
      customer("Evil Rabbit"),
      customer("Lee Robinson"),
    ])),
    page_cache,
  }))
}
