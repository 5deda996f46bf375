// crates/vmp-server/src/state.rs
// ============================================================================
// Module: Application State
// Description: The shared, cloneable handle every axum handler extracts.
// Purpose: Build the store, storage gateway, and every domain service exactly
//          once at startup, then hand out cheap Arc clones per request.
// Dependencies: vmp-core, vmp-authz, vmp-storage, vmp-store-sqlite, vmp-domain
// ============================================================================

use std::sync::Arc;

use chrono::Duration;
use vmp_authz::SessionPrincipalResolver;
use vmp_core::clock::SystemClock;
use vmp_core::Clock;
use vmp_domain::CaseEngine;
use vmp_domain::EvidenceService;
use vmp_domain::HeuristicInvoiceNumberClassifier;
use vmp_domain::IngestService;
use vmp_domain::MessagingService;
use vmp_domain::NotificationService;
use vmp_domain::SessionService;
use vmp_domain::TenantService;
use vmp_storage::InMemoryStorageGateway;
use vmp_storage::S3StorageGateway;
use vmp_storage::StorageGateway;
use vmp_store_sqlite::Store;

use crate::config::ServerConfig;

/// Everything a route handler needs, bundled once at startup.
///
/// `axum::extract::State` clones this per request; every field is an `Arc`
/// so cloning is cheap and every service shares the one [`Store`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub clock: Arc<dyn Clock>,
    pub storage: Arc<dyn StorageGateway>,
    pub resolver: Arc<SessionPrincipalResolver>,
    pub tenants: Arc<TenantService>,
    pub sessions: Arc<SessionService>,
    pub cases: Arc<CaseEngine>,
    pub messaging: Arc<MessagingService>,
    pub evidence: Arc<EvidenceService>,
    pub notifications: Arc<NotificationService>,
    pub ingest: Arc<IngestService>,
    pub base_url: String,
    pub storage_url_ttl_seconds: u64,
}

impl AppState {
    /// Opens the configured store and wires every service against it.
    ///
    /// Picks [`S3StorageGateway`] when `config.storage_bucket` is set,
    /// falling back to [`InMemoryStorageGateway`] otherwise -- the same
    /// fallback an integration test or a first local run relies on.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`vmp_store_sqlite::SqliteStoreError`] when
    /// the database cannot be opened or migrated.
    pub async fn build(config: &ServerConfig) -> Result<Self, vmp_store_sqlite::SqliteStoreError> {
        let store = Arc::new(if config.db_url == ":memory:" { Store::open_in_memory()? } else { Store::open(&config.db_url)? });
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let storage: Arc<dyn StorageGateway> = match (&config.storage_bucket, &config.storage_region) {
            (Some(bucket), Some(region)) => Arc::new(S3StorageGateway::from_region(region.clone(), bucket.clone()).await),
            _ => Arc::new(InMemoryStorageGateway::new()),
        };

        let resolver = Arc::new(SessionPrincipalResolver::new(
            Arc::clone(&store) as Arc<dyn vmp_authz::SessionStore>,
            Arc::clone(&store) as Arc<dyn vmp_authz::UserStore>,
            Arc::clone(&clock),
        ));

        let tenants = Arc::new(TenantService::new(Arc::clone(&store), Arc::clone(&clock)));
        let sessions = Arc::new(SessionService::new(Arc::clone(&store), Arc::clone(&clock), Duration::hours(config.session_ttl_hours)));
        let cases = Arc::new(CaseEngine::new(Arc::clone(&store), Arc::clone(&clock)));
        let classifier: Arc<dyn vmp_domain::MessageClassifier> = Arc::new(HeuristicInvoiceNumberClassifier);
        let messaging = Arc::new(MessagingService::new(Arc::clone(&store), Arc::clone(&clock), classifier));
        let evidence = Arc::new(EvidenceService::new(Arc::clone(&store), Arc::clone(&clock), Arc::clone(&storage), Arc::clone(&cases)));
        let notifications = Arc::new(NotificationService::new(Arc::clone(&store), Arc::clone(&clock)));
        let ingest = Arc::new(IngestService::new(Arc::clone(&store), Arc::clone(&clock)));

        Ok(Self {
            store,
            clock,
            storage,
            resolver,
            tenants,
            sessions,
            cases,
            messaging,
            evidence,
            notifications,
            ingest,
            base_url: config.base_url.clone(),
            storage_url_ttl_seconds: config.storage_url_ttl_seconds,
        })
    }
}
