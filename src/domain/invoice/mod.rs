pub mod entities;
pub mod errors;
pub mod form;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Customer, Invoice, InvoiceChanges, InvoiceSummary, NewInvoice};
pub use errors::{CacheError, InvoiceError};
pub use form::{FieldErrors, InvoiceForm, ValidatedInvoice};
pub use ports::{CustomerRepository, InvoiceQuery, InvoiceRepository, PageCache};
pub use value_objects::{
  Amount, CustomerId, InvoiceStatus, ValueObjectError, format_currency,
};
pub use services::{INVOICES_PATH, InvoicePage, InvoiceService, InvoiceServiceDependencies};
