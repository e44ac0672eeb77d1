use actix_files as fs;
use actix_web::{App, HttpServer, middleware::Logger};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use invoice_dashboard::{
  adapters::http::{
    InvoiceRouteDependencies, RequestIdMiddleware, TemplateEngine, configure_invoice_routes,
    configure_web_routes,
  },
  application::invoice::{
    CreateInvoiceUseCase, DeleteInvoiceUseCase, GetInvoiceForEditUseCase, ListCustomersUseCase,
    ListInvoicesUseCase, UpdateInvoiceUseCase,
  },
  domain::invoice::{InvoiceService, InvoiceServiceDependencies, PageCache},
  infrastructure::{
    cache::{InMemoryPageCache, RedisPageCache},
    config::{CacheBackendKind, CacheConfig, Config},
    persistence::postgres::{PostgresCustomerRepository, PostgresInvoiceRepository},
  },
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Initialize environment variables from .env file
  dotenvy::dotenv().ok();

  // Initialize tracing subscriber for logging
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoice_dashboard=debug,actix_web=info".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  tracing::info!("Starting invoice dashboard");

  // Load configuration
  let config = Config::load().context("Failed to load configuration")?;
  tracing::info!("Configuration loaded successfully");

  // Set up database connection pool with timeout
  tracing::info!("Connecting to database");

  let db_pool = tokio::time::timeout(
    Duration::from_secs(config.database.connect_timeout_seconds),
    PgPoolOptions::new()
      .max_connections(config.database.max_connections)
      .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_seconds))
      .connect(&config.database.url),
  )
  .await
  .with_context(|| {
    format!(
      "Database connection timed out after {} seconds. Is PostgreSQL running?",
      config.database.connect_timeout_seconds
    )
  })?
  .context("Could not connect to database")?;

  tracing::info!("Database connection pool created");

  // Run database migrations
  tracing::info!("Running database migrations");
  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("Failed to run database migrations")?;
  tracing::info!("Database migrations completed");

  let page_cache = build_page_cache(&config.cache).await?;

  // Initialize repositories
  let invoice_repo = Arc::new(PostgresInvoiceRepository::new(db_pool.clone()));
  let customer_repo = Arc::new(PostgresCustomerRepository::new(db_pool.clone()));

  // Initialize domain service
  let invoice_service = Arc::new(InvoiceService::new(InvoiceServiceDependencies {
    invoice_repo,
    customer_repo,
    page_cache: page_cache.clone(),
  }));

  // Initialize use cases
  let list_invoices_use_case = Arc::new(ListInvoicesUseCase::new(invoice_service.clone()));
  let list_customers_use_case = Arc::new(ListCustomersUseCase::new(invoice_service.clone()));
  let get_invoice_use_case = Arc::new(GetInvoiceForEditUseCase::new(invoice_service.clone()));
  let create_invoice_use_case = Arc::new(CreateInvoiceUseCase::new(invoice_service.clone()));
  let update_invoice_use_case = Arc::new(UpdateInvoiceUseCase::new(invoice_service.clone()));
  let delete_invoice_use_case = Arc::new(DeleteInvoiceUseCase::new(invoice_service));

  // Initialize template engine
  let templates = TemplateEngine::from_glob(&config.server.templates)
    .with_context(|| format!("Failed to load templates from {}", config.server.templates))?;

  let route_deps = InvoiceRouteDependencies {
    templates,
    page_cache,
    listing: config.listing.clone(),
    list_invoices_use_case,
    list_customers_use_case,
    get_invoice_use_case,
    create_invoice_use_case,
    update_invoice_use_case,
    delete_invoice_use_case,
  };

  let server_host = config.server.host.clone();
  let server_port = config.server.port;

  tracing::info!("Starting HTTP server on {}:{}", server_host, server_port);

  HttpServer::new(move || {
    let route_deps = route_deps.clone();
    App::new()
      // Add request ID middleware
      .wrap(RequestIdMiddleware::new())
      // Add logging middleware
      .wrap(Logger::default())
      .configure(configure_web_routes)
      .configure(move |cfg| configure_invoice_routes(cfg, route_deps))
      // Static files
      .service(fs::Files::new("/static", "./static"))
  })
  .bind((server_host.as_str(), server_port))
  .with_context(|| format!("Failed to bind {}:{}", server_host, server_port))?
  .run()
  .await?;

  Ok(())
}

/// Pick the page cache backend named in the configuration
async fn build_page_cache(config: &CacheConfig) -> anyhow::Result<Arc<dyn PageCache>> {
  match config.backend {
    CacheBackendKind::Memory => {
      tracing::info!("Using in-memory page cache (ttl {}s)", config.ttl_seconds);
      Ok(Arc::new(InMemoryPageCache::new(Some(Duration::from_secs(
        config.ttl_seconds,
      )))))
    }
    CacheBackendKind::Redis => {
      let url = config
        .redis_url
        .clone()
        .context("cache.redis_url is required when cache.backend = \"redis\"")?;

      tracing::info!("Connecting to Redis page cache");

      let redis_client = redis::Client::open(url).context("Invalid Redis URL")?;

      let redis_conn = tokio::time::timeout(
        Duration::from_secs(config.connect_timeout_seconds),
        redis_client.get_connection_manager(),
      )
      .await
      .with_context(|| {
        format!(
          "Redis connection timed out after {} seconds. Is Redis running?",
          config.connect_timeout_seconds
        )
      })?
      .context("Could not connect to Redis page cache")?;

      tracing::info!("Redis connection established");
      Ok(Arc::new(RedisPageCache::new(redis_conn, config.ttl_seconds)))
    }
  }
}
