//! # Application State
//!
//! Shared state for the Axum application: configuration, the course catalog,
//! the store handle and every service built on top of them.
//!
//! Dependencies are resolved once at startup. Whatever is missing (database,
//! gateway, mail) is wired in its degraded form rather than failing.

use crate::config::{AppConfig, StoreBackend};
use academy_core::{
    AdminGuard, ConfirmationDispatcher, CourseCatalog, DemoFallback, GuardConfig, LogNotifier,
    MeetingLinkRegistry, MemoryStore, OrderService, PaymentVerifier, RegistrationDesk,
    SharedGateway, SharedNotifier, StoreHandle,
};
use academy_mail::MailRelayNotifier;
use academy_mongo::MongoStore;
use academy_razorpay::RazorpayGateway;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<CourseCatalog>,
    pub store: StoreHandle,
    pub gateway: Option<SharedGateway>,
    pub notifier: SharedNotifier,
    pub orders: OrderService,
    pub verifier: PaymentVerifier,
    pub meetings: MeetingLinkRegistry,
    pub guard: AdminGuard,
    pub desk: RegistrationDesk,
}

impl AppState {
    /// Build services over already-resolved dependencies
    pub fn from_parts(
        config: AppConfig,
        catalog: CourseCatalog,
        store: StoreHandle,
        gateway: Option<SharedGateway>,
        notifier: SharedNotifier,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let dispatcher =
            ConfirmationDispatcher::new(notifier.clone(), store.clone(), catalog.clone());
        let guard = AdminGuard::new(
            store.clone(),
            notifier.clone(),
            GuardConfig::new(config.jwt_secret.clone(), config.frontend_url.clone()),
        );

        Self {
            orders: OrderService::new(
                store.clone(),
                gateway.clone(),
                catalog.clone(),
                DemoFallback::default(),
            ),
            verifier: PaymentVerifier::new(
                store.clone(),
                gateway.clone(),
                catalog.clone(),
                dispatcher,
            ),
            meetings: MeetingLinkRegistry::new(store.clone(), catalog.clone()),
            desk: RegistrationDesk::new(store.clone(), catalog.clone()),
            guard,
            config: Arc::new(config),
            catalog,
            store,
            gateway,
            notifier,
        }
    }

    /// Resolve every dependency from configuration
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        if config.jwt_secret_generated {
            warn!("JWT_SECRET not set; using a random secret, sessions will not survive restarts");
        }

        let catalog = load_course_catalog(config.catalog_path.as_deref())?;
        let store = connect_store(&config).await;
        let gateway = init_gateway();
        let notifier = init_notifier();

        let state = Self::from_parts(config, catalog, store, gateway, notifier);
        state.seed_admin().await;
        Ok(state)
    }

    async fn seed_admin(&self) {
        let (Some(email), Some(password)) = (&self.config.admin_email, &self.config.admin_password)
        else {
            return;
        };
        if self.store.get().is_none() {
            warn!("ADMIN_EMAIL set but store unavailable; admin not seeded");
            return;
        }
        if let Err(e) = self.guard.ensure_admin(email, password).await {
            error!("Failed to seed admin account: {}", e);
        }
    }
}

async fn connect_store(config: &AppConfig) -> StoreHandle {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            StoreHandle::connected(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongo => {
            let Some(uri) = config.mongodb_uri.as_deref() else {
                warn!("MONGODB_URI not set; running in demo mode");
                return StoreHandle::unavailable("MONGODB_URI not set");
            };
            match MongoStore::connect(uri, &config.mongodb_database).await {
                Ok(store) => StoreHandle::connected(Arc::new(store)),
                Err(e) => {
                    error!("MongoDB connection failed: {}; running in demo mode", e);
                    StoreHandle::unavailable(e.to_string())
                }
            }
        }
    }
}

fn init_gateway() -> Option<SharedGateway> {
    match RazorpayGateway::from_env() {
        Ok(Some(gateway)) => {
            info!(
                "Razorpay configured ({} mode)",
                if gateway.config().is_test_mode() { "test" } else { "live" }
            );
            Some(Arc::new(gateway))
        }
        Ok(None) => {
            warn!("Razorpay credentials not set; orders will use demo mode");
            None
        }
        Err(e) => {
            error!("Razorpay configuration invalid: {}; orders will use demo mode", e);
            None
        }
    }
}

fn init_notifier() -> SharedNotifier {
    match MailRelayNotifier::from_env() {
        Ok(Some(relay)) => {
            info!("Mail relay configured");
            Arc::new(relay)
        }
        Ok(None) => {
            warn!("Mail relay not configured; emails will be logged only");
            Arc::new(LogNotifier)
        }
        Err(e) => {
            error!("Mail configuration invalid: {}; emails will be logged only", e);
            Arc::new(LogNotifier)
        }
    }
}

/// Load the course catalog: explicit path, then `config/courses.toml`, then built-in
fn load_course_catalog(explicit: Option<&Path>) -> anyhow::Result<CourseCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        return parse_catalog(&content, &path.display().to_string());
    }

    let config_paths = [
        "config/courses.toml",
        "../config/courses.toml",
        "../../config/courses.toml",
    ];
    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_catalog(&content, path);
        }
    }

    info!("No course catalog file found, using built-in catalog");
    Ok(CourseCatalog::builtin())
}

fn parse_catalog(content: &str, source: &str) -> anyhow::Result<CourseCatalog> {
    let catalog = CourseCatalog::from_toml(content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", source, e))?;
    info!("Loaded {} courses from {}", catalog.courses.len(), source);
    Ok(catalog)
}
