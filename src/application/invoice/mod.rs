pub mod create_invoice;
pub mod delete_invoice;
pub mod get_invoice;
pub mod list_customers;
pub mod list_invoices;
pub mod outcome;
pub mod update_invoice;

#[cfg(test)]
pub(crate) mod test_support;

pub use create_invoice::{
  CREATE_DATABASE_MESSAGE, CREATE_VALIDATION_MESSAGE, CreateInvoiceCommand, CreateInvoiceUseCase,
};
pub use delete_invoice::{
  DELETE_DATABASE_MESSAGE, DELETE_NOT_FOUND_MESSAGE, DeleteInvoiceCommand, DeleteInvoiceUseCase,
};
pub use get_invoice::{GetInvoiceForEditCommand, GetInvoiceForEditUseCase, InvoiceEditResponse};
pub use list_customers::{CustomerDto, ListCustomersResponse, ListCustomersUseCase};
pub use list_invoices::{
  InvoiceListItemDto, ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase,
};
pub use outcome::{ActionOutcome, FormState};
pub use update_invoice::{
  UPDATE_DATABASE_MESSAGE, UPDATE_VALIDATION_MESSAGE, UpdateInvoiceCommand, UpdateInvoiceUseCase,
};
