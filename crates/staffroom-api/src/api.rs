//! The client facade: one object owning the HTTP client, the cache store,
//! the session store and every bound endpoint.

use staffroom_auth::SessionStore;
use staffroom_cache::CacheStore;
use staffroom_config::ClientConfig;
use staffroom_core::{CurrentUser, LoginRequest, Result, SignupRequest};
use staffroom_http::HttpClient;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::endpoints::applications::ApplicationEndpoints;
use crate::endpoints::auth::AuthEndpoints;
use crate::endpoints::content::ContentEndpoints;
use crate::endpoints::jobs::JobEndpoints;
use crate::endpoints::notifications::NotificationEndpoints;
use crate::endpoints::pipeline::PipelineEndpoints;
use crate::endpoints::profile::ProfileEndpoints;
use crate::handle::Binder;
use crate::registry::Registry;

/// The assembled client data layer.
///
/// Construction binds the whole endpoint catalog against one shared HTTP
/// client and cache store; a duplicate endpoint name anywhere in the catalog
/// fails construction. The facade also owns the process's session store and
/// the boot/login/logout orchestration around it.
pub struct Api {
    http: Arc<HttpClient>,
    store: Arc<CacheStore>,
    registry: Arc<Registry>,
    session: Arc<SessionStore>,
    pub auth: AuthEndpoints,
    pub jobs: JobEndpoints,
    pub applications: ApplicationEndpoints,
    pub pipeline: PipelineEndpoints,
    pub profile: ProfileEndpoints,
    pub notifications: NotificationEndpoints,
    pub content: ContentEndpoints,
}

impl Api {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Arc::new(HttpClient::new(&config)?);
        let store = Arc::new(CacheStore::new(config.cache_grace));
        let registry = Arc::new(Registry::new());
        let session = Arc::new(SessionStore::new());

        let bind = Binder {
            http: http.clone(),
            store: store.clone(),
            registry: registry.clone(),
        };

        let auth = AuthEndpoints::register(&bind)?;
        let jobs = JobEndpoints::register(&bind)?;
        let applications = ApplicationEndpoints::register(&bind)?;
        let pipeline = PipelineEndpoints::register(&bind)?;
        let profile = ProfileEndpoints::register(&bind)?;
        let notifications =
            NotificationEndpoints::register(&bind, config.notifications_poll_interval)?;
        let content = ContentEndpoints::register(&bind)?;

        info!(
            endpoints = registry.len(),
            base_url = %config.base_url,
            "endpoint catalog registered"
        );

        Ok(Self {
            http,
            store,
            registry,
            session,
            auth,
            jobs,
            applications,
            pipeline,
            profile,
            notifications,
            content,
        })
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    // ========================================================================
    // Session orchestration
    // ========================================================================

    /// Resolve the boot-time session by asking the backend who the stored
    /// cookie belongs to.
    ///
    /// The session stays `Pending` until this returns. A 401 simply means
    /// nobody is logged in; any other failure is logged and also resolves to
    /// logged-out, so the app never hangs on the probe.
    pub async fn boot_session(&self) {
        match self.auth.current_user.fetch(&()).await {
            Ok(user) => self.session.set_credentials(user),
            Err(e) if e.is_unauthorized() => {
                debug!("boot probe found no active session");
                self.session.log_out();
            }
            Err(e) => {
                warn!(error = %e, "boot probe failed, treating as logged out");
                self.session.log_out();
            }
        }
    }

    /// Run the login mutation and install the returned user as the session.
    pub async fn login(&self, credentials: LoginRequest) -> Result<CurrentUser> {
        let user = self.auth.login.run(&credentials).await?;
        self.session.set_credentials(user.clone());
        Ok(user)
    }

    /// Run the signup mutation and install the returned user as the session.
    pub async fn signup(&self, signup: SignupRequest) -> Result<CurrentUser> {
        let user = self.auth.signup.run(&signup).await?;
        self.session.set_credentials(user.clone());
        Ok(user)
    }

    /// Log out: session and cache are gone before any network happens, so
    /// the UI can redirect immediately and no previous-session data can be
    /// served. The backend call that clears the cookie is best-effort.
    pub async fn logout(&self) {
        self.session.log_out();
        self.store.clear();
        if let Err(e) = self.auth.logout.run(&()).await {
            debug!(error = %e, "logout request failed, session cleared anyway");
        }
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("endpoints", &self.registry.len())
            .field("store", &self.store)
            .finish()
    }
}
