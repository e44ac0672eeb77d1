use actix_web::web;
use std::sync::Arc;

use crate::application::invoice::{
  CreateInvoiceUseCase, DeleteInvoiceUseCase, GetInvoiceForEditUseCase, ListCustomersUseCase,
  ListInvoicesUseCase, UpdateInvoiceUseCase,
};
use crate::domain::invoice::{INVOICES_PATH, PageCache};
use crate::infrastructure::config::ListingConfig;

use super::handlers::{invoices_web, pages};
use super::templates::TemplateEngine;

/// Everything the invoice dashboard routes pull from app data
#[derive(Clone)]
pub struct InvoiceRouteDependencies {
  pub templates: TemplateEngine,
  pub page_cache: Arc<dyn PageCache>,
  pub listing: ListingConfig,
  pub list_invoices_use_case: Arc<ListInvoicesUseCase>,
  pub list_customers_use_case: Arc<ListCustomersUseCase>,
  pub get_invoice_use_case: Arc<GetInvoiceForEditUseCase>,
  pub create_invoice_use_case: Arc<CreateInvoiceUseCase>,
  pub update_invoice_use_case: Arc<UpdateInvoiceUseCase>,
  pub delete_invoice_use_case: Arc<DeleteInvoiceUseCase>,
}

/// Configure site-level routes
///
/// - GET / - Redirect to the invoice listing
/// - GET /health - Liveness check
pub fn configure_web_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(pages::index))
    .route("/health", web::get().to(pages::health));
}

/// Configure invoice dashboard routes
///
/// Mounts the invoice pages and form actions under `/dashboard/invoices`.
///
/// # Routes
///
/// - GET / - Paginated listing, served from the page cache when possible
/// - GET /create - Create form
/// - POST /create - Create action
/// - GET /{id}/edit - Edit form
/// - POST /{id}/edit - Update action
/// - DELETE /{id} - Delete action
///
/// # Example
///
/// ```no_run
/// use actix_web::App;
/// # use invoice_dashboard::adapters::http::routes::{
/// #   InvoiceRouteDependencies, configure_invoice_routes,
/// # };
///
/// # fn example(deps: InvoiceRouteDependencies) {
/// let app = App::new().configure(|cfg| configure_invoice_routes(cfg, deps));
/// # }
/// ```
pub fn configure_invoice_routes(cfg: &mut web::ServiceConfig, deps: InvoiceRouteDependencies) {
  cfg.service(
    web::scope(INVOICES_PATH)
      .app_data(web::Data::new(deps.templates))
      .app_data(web::Data::new(deps.page_cache))
      .app_data(web::Data::new(deps.listing))
      .app_data(web::Data::new(deps.list_invoices_use_case))
      .app_data(web::Data::new(deps.list_customers_use_case))
      .app_data(web::Data::new(deps.get_invoice_use_case))
      .app_data(web::Data::new(deps.create_invoice_use_case))
      .app_data(web::Data::new(deps.update_invoice_use_case))
      .app_data(web::Data::new(deps.delete_invoice_use_case))
      .route("", web::get().to(invoices_web::invoices_page))
      .route("/create", web::get().to(invoices_web::invoice_create_page))
      .route(
        "/create",
        web::post().to(invoices_web::create_invoice_submit),
      )
      .route("/{id}/edit", web::get().to(invoices_web::invoice_edit_page))
      .route(
        "/{id}/edit",
        web::post().to(invoices_web::update_invoice_submit),
      )
      .route("/{id}", web::delete().to(invoices_web::delete_invoice)),
  );
}
