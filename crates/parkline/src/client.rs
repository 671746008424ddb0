//! `ParklineClient` builder and the account operations.
//!
//! This is the entry point for embedding the client engine. It ties
//! together all the layers: session, gateway, guard, reservations, and
//! the notifier, and wires the 401 reaction between them.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use parkline_api::{
    ApiError, AuthResponse, ChangePasswordRequest, LoginRequest,
    MessageResponse, ProfileResponse, ProfileUpdate, RegisterRequest, Role,
    Severity, User,
};
use parkline_gateway::{Gateway, GatewayConfig, SessionObserver};
use parkline_guard::Decision;
use parkline_reservations::ReservationController;
use parkline_session::{
    CredentialCell, Identity, JsonFileStore, SessionManager, SessionStore,
    SessionView,
};
use tokio::sync::mpsc;

use crate::admin::Admin;
use crate::notify::Notifier;
use crate::ParklineError;

/// Redirect-chasing cap in [`ParklineClient::navigate`]. The guard's
/// targets are always allowed for the view that produced them, so two
/// hops is the realistic maximum; the cap guards the loop anyway.
const MAX_REDIRECT_HOPS: u32 = 8;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and assembling a [`ParklineClient`].
///
/// # Example
///
/// ```rust,no_run
/// use parkline::ParklineClient;
///
/// let client = ParklineClient::builder()
///     .base_url("https://parkline.example.com/api")
///     .build();
/// ```
pub struct ParklineClientBuilder {
    config: GatewayConfig,
    store: Option<Box<dyn SessionStore>>,
}

impl ParklineClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            store: None,
        }
    }

    /// Sets the root URL of the remote API.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Sets the per-request deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Sets the session store. Defaults to the JSON file in the
    /// platform data directory.
    pub fn store(mut self, store: Box<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Assembles the client: restores any persisted session, arms the
    /// gateway with the shared credential cell, and installs the 401
    /// reaction.
    pub fn build(self) -> ParklineClient {
        let cell = CredentialCell::new();
        let store = self
            .store
            .unwrap_or_else(|| Box::new(JsonFileStore::open_default()));

        let session = Arc::new(SessionManager::open(store, cell.clone()));
        let gateway = Arc::new(Gateway::new(self.config.clone(), cell));
        let notifier = Notifier::new();
        let reservations = Arc::new(ReservationController::new(
            Arc::clone(&gateway),
            notifier.clone(),
        ));

        let (redirect_tx, redirect_rx) = mpsc::unbounded_channel();
        gateway.set_observer(Arc::new(SessionWatch {
            session: Arc::clone(&session),
            reservations: Arc::clone(&reservations),
            redirects: redirect_tx,
            login_path: self.config.login_path.clone(),
        }));

        ParklineClient {
            session,
            gateway,
            reservations,
            notifier,
            redirects: Mutex::new(Some(redirect_rx)),
        }
    }
}

impl Default for ParklineClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// The 401 reaction
// ---------------------------------------------------------------------------

/// Receives the gateway's unauthorized notifications and turns them
/// into session/state changes. Installed once at build time.
struct SessionWatch {
    session: Arc<SessionManager>,
    reservations: Arc<ReservationController<Notifier>>,
    redirects: mpsc::UnboundedSender<String>,
    login_path: String,
}

impl SessionObserver for SessionWatch {
    fn session_invalidated(&self) {
        tracing::info!("credential rejected, clearing session");
        self.session.clear();
        self.reservations.reset();
    }

    fn login_required(&self) {
        // Receiver may already be dropped by an embedder that ignores
        // forced redirects; that is their choice.
        let _ = self.redirects.send(self.login_path.clone());
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The assembled Parkline client engine.
///
/// One instance per signed-in surface. All handles it exposes are
/// shareable; operations take `&self`.
pub struct ParklineClient {
    session: Arc<SessionManager>,
    gateway: Arc<Gateway>,
    reservations: Arc<ReservationController<Notifier>>,
    notifier: Notifier,
    redirects: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl ParklineClient {
    /// Creates a new builder.
    pub fn builder() -> ParklineClientBuilder {
        ParklineClientBuilder::new()
    }

    // --- Account operations ------------------------------------------------

    /// Signs in. On success the session is established (and persisted)
    /// before this returns, so the credential is armed for every
    /// subsequent request.
    ///
    /// Returns the role the server confirmed, which callers feed to
    /// [`navigate`](Self::navigate) to land on the right home surface.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<Role, ParklineError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            user_type: role,
        };

        let auth: AuthResponse = match self.gateway.post("/auth/login", &request).await {
            Ok(auth) => auth,
            Err(err) => return Err(self.failure(err, "Login failed")),
        };

        self.session.establish(Identity {
            credential: auth.access_token,
            user: auth.user,
            role: auth.user_type,
        })?;

        self.notifier.show("Login successful!", Severity::Success);
        Ok(auth.user_type)
    }

    /// Creates an account and signs it in. Registration issues a
    /// credential just like login, so the new user lands in an
    /// established session and can be routed straight to their home.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Role, ParklineError> {
        let auth: AuthResponse = match self.gateway.post("/auth/register", request).await {
            Ok(auth) => auth,
            Err(err) => return Err(self.failure(err, "Registration failed")),
        };

        let role = auth.user_type;
        self.session.establish(Identity {
            credential: auth.access_token,
            user: auth.user,
            role,
        })?;

        let message = auth
            .message
            .as_deref()
            .unwrap_or("Registration successful!");
        self.notifier.show(message, Severity::Success);
        Ok(role)
    }

    /// Signs out. Purely local: the bearer credential is simply
    /// forgotten, along with everything cached under it.
    pub fn logout(&self) {
        self.session.clear();
        self.reservations.reset();
        self.notifier.show("Logged out successfully", Severity::Info);
    }

    /// Confirms a restored session against the server. Call once at
    /// startup, after [`build`](ParklineClientBuilder::build) and
    /// before trusting [`session_view`](Self::session_view).
    ///
    /// Fail-closed: if the server rejects the credential or cannot be
    /// reached, the restored session is cleared.
    pub async fn revalidate(&self) {
        self.session.revalidate(self.gateway.as_ref()).await;
    }

    /// Updates the signed-in profile. The server's copy of the user
    /// record replaces the cached one.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ParklineError> {
        let result: Result<ProfileResponse, ApiError> =
            self.gateway.put("/user/profile", update).await;

        match result {
            Ok(response) => {
                self.session.update_user(response.user.clone());
                let message = response
                    .message
                    .as_deref()
                    .unwrap_or("Profile updated successfully!");
                self.notifier.show(message, Severity::Success);
                Ok(response.user)
            }
            Err(err) => Err(self.failure(err, "Failed to update profile")),
        }
    }

    /// Changes the password. The session stays established; the server
    /// does not rotate the credential on a password change.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<(), ParklineError> {
        let result: Result<MessageResponse, ApiError> =
            self.gateway.post("/auth/change-password", request).await;

        match result {
            Ok(response) => {
                let message = response
                    .message
                    .as_deref()
                    .unwrap_or("Password changed successfully!");
                self.notifier.show(message, Severity::Success);
                Ok(())
            }
            Err(err) => Err(self.failure(err, "Failed to change password")),
        }
    }

    // --- Navigation --------------------------------------------------------

    /// Navigates to `path`, chasing guard redirects until a surface is
    /// allowed, and commits the destination as the current location.
    ///
    /// Returns the path actually landed on; callers render that, not
    /// the path they asked for.
    pub fn navigate(&self, path: &str) -> String {
        let view = self.session.view();
        let mut destination = path.to_string();

        for _ in 0..MAX_REDIRECT_HOPS {
            match parkline_guard::decide(&destination, &view) {
                Decision::Allow => break,
                Decision::Redirect(target) => destination = target.to_string(),
            }
        }

        self.gateway.set_location(&destination);
        tracing::debug!(requested = path, landed = %destination, "navigated");
        destination
    }

    /// Takes the receiver for forced redirects: paths the engine needs
    /// the embedder to move to (the login surface after a 401). Yields
    /// `None` after the first call; there is one receiver.
    pub fn forced_redirects(&self) -> Option<mpsc::UnboundedReceiver<String>> {
        self.redirects.lock().take()
    }

    // --- Handles -------------------------------------------------------------

    /// A routing-grade snapshot of the session.
    pub fn session_view(&self) -> SessionView {
        self.session.view()
    }

    /// The signed-in profile, if any.
    pub fn user(&self) -> Option<User> {
        self.session.user()
    }

    /// The session manager, for subscriptions.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The reservation operations and cache.
    pub fn reservations(&self) -> &ReservationController<Notifier> {
        &self.reservations
    }

    /// The alert slot.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The administration surface. Usable only under an admin session;
    /// the server answers 403 otherwise.
    pub fn admin(&self) -> Admin {
        Admin::new(Arc::clone(&self.gateway), self.notifier.clone())
    }

    fn failure(&self, err: ApiError, fallback: &str) -> ParklineError {
        self.notifier
            .show(err.user_message(fallback), Severity::Danger);
        err.into()
    }
}
