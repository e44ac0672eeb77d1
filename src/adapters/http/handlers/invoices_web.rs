use actix_web::{
  HttpRequest, HttpResponse,
  http::header::{self, ContentType},
  web,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::adapters::http::{dtos::ListingQuery, errors::ApiError, templates::TemplateEngine};
use crate::application::invoice::{
  ActionOutcome, CreateInvoiceCommand, CreateInvoiceUseCase, DeleteInvoiceCommand,
  DeleteInvoiceUseCase, FormState, GetInvoiceForEditCommand, GetInvoiceForEditUseCase,
  ListCustomersUseCase, ListInvoicesCommand, ListInvoicesUseCase, UpdateInvoiceCommand,
  UpdateInvoiceUseCase,
};
use crate::domain::invoice::{InvoiceForm, PageCache};
use crate::infrastructure::config::ListingConfig;

const CREATE_TEMPLATE: &str = "pages/invoice_create.html.tera";
const EDIT_TEMPLATE: &str = "pages/invoice_edit.html.tera";

fn html(body: String) -> HttpResponse {
  HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

fn render_form<C: Serialize>(
  templates: &TemplateEngine,
  template: &str,
  invoice_id: Option<Uuid>,
  form: &InvoiceForm,
  customers: &C,
  state: &FormState,
) -> Result<String, ApiError> {
  let mut context = tera::Context::new();
  context.insert("invoice_id", &invoice_id);
  context.insert("form", form);
  context.insert("customers", customers);
  context.insert("state", state);
  context.insert("errors", &state.errors.clone().unwrap_or_default());

  Ok(templates.render(template, &context)?)
}

/// Turn a form action outcome into a response. A redirect becomes `303 See
/// Other`; a state re-renders the form with the submitted values.
async fn respond_to_form(
  outcome: ActionOutcome,
  templates: &TemplateEngine,
  template: &str,
  invoice_id: Option<Uuid>,
  form: &InvoiceForm,
  list_customers_use_case: &ListCustomersUseCase,
) -> Result<HttpResponse, ApiError> {
  match outcome {
    ActionOutcome::Redirect { path } => Ok(
      HttpResponse::SeeOther()
        .insert_header((header::LOCATION, path))
        .finish(),
    ),
    ActionOutcome::State(state) => {
      let customers = list_customers_use_case.execute().await?.customers;
      let body = render_form(templates, template, invoice_id, form, &customers, &state)?;
      Ok(
        HttpResponse::UnprocessableEntity()
          .content_type(ContentType::html())
          .body(body),
      )
    }
  }
}

// GET /dashboard/invoices - Paginated, searchable listing
pub async fn invoices_page(
  req: HttpRequest,
  query: web::Query<ListingQuery>,
  templates: web::Data<TemplateEngine>,
  list_invoices_use_case: web::Data<Arc<ListInvoicesUseCase>>,
  page_cache: web::Data<Arc<dyn PageCache>>,
  listing: web::Data<ListingConfig>,
) -> Result<HttpResponse, ApiError> {
  let key = query.cache_key(req.path());

  match page_cache.get(&key).await {
    Ok(Some(body)) => {
      tracing::debug!(key = %key, "Page cache hit");
      return Ok(html(body));
    }
    Ok(None) => {}
    Err(e) => tracing::warn!("Page cache read failed for {}: {}", key, e),
  }

  // Read before the data so a write landing mid-render drops this page.
  let generation = match page_cache.generation(req.path()).await {
    Ok(generation) => Some(generation),
    Err(e) => {
      tracing::warn!("Page cache generation read failed for {}: {}", key, e);
      None
    }
  };

  let response = list_invoices_use_case
    .execute(ListInvoicesCommand {
      query: query.search(),
      page: query.page(),
      page_size: listing.page_size,
    })
    .await?;

  let mut context = tera::Context::new();
  context.insert("invoices", &response.invoices);
  context.insert("query", &response.query);
  context.insert("current_page", &response.current_page);
  context.insert("total_pages", &response.total_pages);

  let body = templates.render("pages/invoices.html.tera", &context)?;

  if let Some(generation) = generation {
    match page_cache.put(&key, body.clone(), generation).await {
      Ok(true) => {}
      Ok(false) => tracing::debug!(key = %key, "Listing changed while rendering, not cached"),
      Err(e) => tracing::warn!("Page cache write failed for {}: {}", key, e),
    }
  }

  Ok(html(body))
}

// GET /dashboard/invoices/create - Show invoice creation form
pub async fn invoice_create_page(
  templates: web::Data<TemplateEngine>,
  list_customers_use_case: web::Data<Arc<ListCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let customers = list_customers_use_case.execute().await?.customers;
  let body = render_form(
    &templates,
    CREATE_TEMPLATE,
    None,
    &InvoiceForm::default(),
    &customers,
    &FormState::default(),
  )?;

  Ok(html(body))
}

// POST /dashboard/invoices/create - Create a new invoice
pub async fn create_invoice_submit(
  form: web::Form<InvoiceForm>,
  templates: web::Data<TemplateEngine>,
  create_invoice_use_case: web::Data<Arc<CreateInvoiceUseCase>>,
  list_customers_use_case: web::Data<Arc<ListCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let form = form.into_inner();

  let outcome = create_invoice_use_case
    .execute(CreateInvoiceCommand {
      previous_state: FormState::default(),
      form: form.clone(),
    })
    .await;

  respond_to_form(
    outcome,
    &templates,
    CREATE_TEMPLATE,
    None,
    &form,
    &list_customers_use_case,
  )
  .await
}

// GET /dashboard/invoices/{id}/edit - Show invoice edit form
pub async fn invoice_edit_page(
  path: web::Path<Uuid>,
  templates: web::Data<TemplateEngine>,
  get_invoice_use_case: web::Data<Arc<GetInvoiceForEditUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let response = get_invoice_use_case
    .execute(GetInvoiceForEditCommand {
      invoice_id: path.into_inner(),
    })
    .await?;

  let body = render_form(
    &templates,
    EDIT_TEMPLATE,
    Some(response.invoice_id),
    &response.form,
    &response.customers,
    &response.state,
  )?;

  Ok(html(body))
}

// POST /dashboard/invoices/{id}/edit - Update an invoice
pub async fn update_invoice_submit(
  path: web::Path<Uuid>,
  form: web::Form<InvoiceForm>,
  templates: web::Data<TemplateEngine>,
  update_invoice_use_case: web::Data<Arc<UpdateInvoiceUseCase>>,
  list_customers_use_case: web::Data<Arc<ListCustomersUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let invoice_id = path.into_inner();
  let form = form.into_inner();

  let outcome = update_invoice_use_case
    .execute(UpdateInvoiceCommand {
      invoice_id,
      previous_state: FormState::default(),
      form: form.clone(),
    })
    .await;

  respond_to_form(
    outcome,
    &templates,
    EDIT_TEMPLATE,
    Some(invoice_id),
    &form,
    &list_customers_use_case,
  )
  .await
}

// DELETE /dashboard/invoices/{id} - Delete an invoice
pub async fn delete_invoice(
  path: web::Path<Uuid>,
  templates: web::Data<TemplateEngine>,
  delete_invoice_use_case: web::Data<Arc<DeleteInvoiceUseCase>>,
) -> Result<HttpResponse, ApiError> {
  let outcome = delete_invoice_use_case
    .execute(DeleteInvoiceCommand {
      invoice_id: path.into_inner(),
    })
    .await;

  match outcome {
    ActionOutcome::State(FormState {
      message: Some(message),
      ..
    }) => {
      let mut context = tera::Context::new();
      context.insert("message", &message);
      let body = templates.render("partials/form_message.html.tera", &context)?;

      Ok(
        HttpResponse::UnprocessableEntity()
          .content_type(ContentType::html())
          .body(body),
      )
    }
    ActionOutcome::State(_) => Ok(
      HttpResponse::Ok()
        .insert_header(("HX-Refresh", "true"))
        .finish(),
    ),
    ActionOutcome::Redirect { path } => Ok(
      HttpResponse::Ok()
        .insert_header(("HX-Redirect", path))
        .finish(),
    ),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::adapters::http::routes::{InvoiceRouteDependencies, configure_invoice_routes};
  use crate::application::invoice::test_support::{
    Call, FakeCustomerRepository, FakeInvoiceRepository, Recorder, customer,
  };
  use crate::application::invoice::{CREATE_VALIDATION_MESSAGE, DELETE_NOT_FOUND_MESSAGE};
  use crate::domain::invoice::{
    CustomerId, Invoice, InvoiceChanges, InvoiceError, InvoiceQuery, InvoiceRepository,
    InvoiceService, InvoiceServiceDependencies, InvoiceStatus, InvoiceSummary, NewInvoice, form,
  };
  use crate::infrastructure::cache::InMemoryPageCache;
  use actix_web::{App, http::StatusCode, test};
  use async_trait::async_trait;
  use chrono::Utc;
  use tokio::sync::Notify;

  struct Harness {
    recorder: Arc<Recorder>,
    repo: Arc<FakeInvoiceRepository>,
    cache: Arc<InMemoryPageCache>,
    deps: InvoiceRouteDependencies,
  }

  fn invoice(customer_id: &str, amount: i64) -> Invoice {
    Invoice {
      id: Uuid::new_v4(),
      customer_id: CustomerId::new(customer_id.to_string()).unwrap(),
      amount,
      status: InvoiceStatus::Pending,
      date: Utc::now().date_naive(),
    }
  }

  fn harness(rows: Vec<Invoice>) -> Harness {
    let recorder = Arc::new(Recorder::default());
    let repo = Arc::new(FakeInvoiceRepository::new(recorder.clone()).with_rows(rows));
    let cache = Arc::new(InMemoryPageCache::new(None));
    let deps = route_dependencies(repo.clone(), cache.clone());

    Harness {
      recorder,
      repo,
      cache,
      deps,
    }
  }

  fn route_dependencies(
    invoice_repo: Arc<dyn InvoiceRepository>,
    page_cache: Arc<dyn PageCache>,
  ) -> InvoiceRouteDependencies {
    let service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
      invoice_repo,
      customer_repo: Arc::new(FakeCustomerRepository::new(vec![
        customer("Evil Rabbit"),
        customer("Lee Robinson"),
      ])),
      page_cache: page_cache.clone(),
    }));

    InvoiceRouteDependencies {
      templates: TemplateEngine::new().expect("Failed to load templates"),
      page_cache,
      listing: ListingConfig::default(),
      list_invoices_use_case: Arc::new(ListInvoicesUseCase::new(service.clone())),
      list_customers_use_case: Arc::new(ListCustomersUseCase::new(service.clone())),
      get_invoice_use_case: Arc::new(GetInvoiceForEditUseCase::new(service.clone())),
      create_invoice_use_case: Arc::new(CreateInvoiceUseCase::new(service.clone())),
      update_invoice_use_case: Arc::new(UpdateInvoiceUseCase::new(service.clone())),
      delete_invoice_use_case: Arc::new(DeleteInvoiceUseCase::new(service)),
    }
  }

  /// Repository whose `search` holds its rows until released, so a write can
  /// land between the read and the cache store.
  struct SlowSearchRepository {
    inner: FakeInvoiceRepository,
    searching: Arc<Notify>,
    release: Arc<Notify>,
  }

  #[async_trait]
  impl InvoiceRepository for SlowSearchRepository {
    async fn insert(&self, invoice: NewInvoice) -> Result<Invoice, InvoiceError> {
      self.inner.insert(invoice).await
    }

    async fn update(&self, id: Uuid, changes: InvoiceChanges) -> Result<u64, InvoiceError> {
      self.inner.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<u64, InvoiceError> {
      self.inner.delete(id).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoiceError> {
      self.inner.find_by_id(id).await
    }

    async fn search(&self, query: &InvoiceQuery) -> Result<Vec<InvoiceSummary>, InvoiceError> {
      let rows = self.inner.search(query).await?;
      self.searching.notify_one();
      self.release.notified().await;
      Ok(rows)
    }

    async fn count(&self, search: Option<&str>) -> Result<i64, InvoiceError> {
      self.inner.count(search).await
    }
  }

  fn body_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).to_string()
  }

  #[actix_web::test]
  async fn test_listing_is_cached_until_create_revalidates() {
    let h = harness(vec![invoice("acme", 1050)]);
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::get().uri("/dashboard/invoices").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("acme"));
    assert!(body.contains("$10.50"));
    assert_eq!(h.cache.len(), 1);

    let req = test::TestRequest::post()
      .uri("/dashboard/invoices/create")
      .set_form([("customer_id", "globex"), ("amount", "12"), ("status", "paid")])
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(
      resp.headers().get(header::LOCATION).unwrap(),
      "/dashboard/invoices"
    );
    assert!(h.cache.is_empty());
    assert_eq!(h.repo.rows().len(), 2);
  }

  #[actix_web::test]
  async fn test_create_during_listing_render_is_not_hidden_by_cache() {
    let searching = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let repo = Arc::new(SlowSearchRepository {
      inner: FakeInvoiceRepository::new(Arc::new(Recorder::default()))
        .with_rows(vec![invoice("acme", 1050)]),
      searching: searching.clone(),
      release: release.clone(),
    });
    let deps = route_dependencies(repo, Arc::new(InMemoryPageCache::new(None)));
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, deps)))
        .await;

    let listing = test::call_service(
      &app,
      test::TestRequest::get().uri("/dashboard/invoices").to_request(),
    );
    let create = async {
      searching.notified().await;
      let req = test::TestRequest::post()
        .uri("/dashboard/invoices/create")
        .set_form([("customer_id", "globex"), ("amount", "12"), ("status", "paid")])
        .to_request();
      let resp = test::call_service(&app, req).await;
      release.notify_one();
      resp
    };
    let (stale, created) = futures_util::join!(listing, create);
    assert_eq!(stale.status(), StatusCode::OK);
    assert_eq!(created.status(), StatusCode::SEE_OTHER);

    // The next listing searches again; let it through straight away.
    release.notify_one();
    let req = test::TestRequest::get().uri("/dashboard/invoices").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("globex"));
  }

  #[actix_web::test]
  async fn test_invalid_create_rerenders_form() {
    let h = harness(Vec::new());
    let recorder = h.recorder.clone();
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::post()
      .uri("/dashboard/invoices/create")
      .set_form([("customer_id", "globex"), ("amount", "0")])
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains(CREATE_VALIDATION_MESSAGE));
    assert!(body.contains(form::AMOUNT_GREATER_THAN_ZERO));
    assert!(body.contains(form::STATUS_REQUIRED));
    assert!(recorder.calls().is_empty());
  }

  #[actix_web::test]
  async fn test_edit_page_shows_stored_values() {
    let stored = invoice("acme", 1050);
    let id = stored.id;
    let h = harness(vec![stored]);
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::get()
      .uri(&format!("/dashboard/invoices/{}/edit", id))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains("10.50"));
    assert!(body.contains(&format!("/dashboard/invoices/{}/edit", id)));
  }

  #[actix_web::test]
  async fn test_edit_page_unknown_invoice_is_not_found() {
    let h = harness(Vec::new());
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::get()
      .uri(&format!("/dashboard/invoices/{}/edit", Uuid::new_v4()))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn test_update_redirects_to_listing() {
    let stored = invoice("acme", 1050);
    let id = stored.id;
    let h = harness(vec![stored]);
    let repo = h.repo.clone();
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::post()
      .uri(&format!("/dashboard/invoices/{}/edit", id))
      .set_form([("customer_id", "acme"), ("amount", "20.00"), ("status", "paid")])
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let row = &repo.rows()[0];
    assert_eq!(row.amount, 2000);
    assert_eq!(row.status, InvoiceStatus::Paid);
  }

  #[actix_web::test]
  async fn test_delete_refreshes_page() {
    let stored = invoice("acme", 1050);
    let id = stored.id;
    let h = harness(vec![stored]);
    let recorder = h.recorder.clone();
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::delete()
      .uri(&format!("/dashboard/invoices/{}", id))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("HX-Refresh").unwrap(), "true");
    assert_eq!(recorder.writes(), vec![Call::Delete(id)]);
  }

  #[actix_web::test]
  async fn test_delete_unknown_invoice_renders_message() {
    let h = harness(Vec::new());
    let app =
      test::init_service(App::new().configure(move |cfg| configure_invoice_routes(cfg, h.deps)))
        .await;

    let req = test::TestRequest::delete()
      .uri(&format!("/dashboard/invoices/{}", Uuid::new_v4()))
      .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.headers().get("HX-Refresh").is_none());
    let body = body_text(&test::read_body(resp).await);
    assert!(body.contains(DELETE_NOT_FOUND_MESSAGE));
  }
}
