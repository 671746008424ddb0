//! The gateway implementation over `reqwest`.

use std::sync::Arc;

use parking_lot::RwLock;
use parkline_api::{ApiError, ErrorBody, MeResponse, User};
use parkline_session::{CredentialCell, IdentityProbe};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{GatewayConfig, SessionObserver};

/// The client's single HTTP choke point.
///
/// One `reqwest::Client` serves every request, so connections are
/// pooled across the whole client. The gateway is shared behind `Arc`
/// and all interior state is lock-protected.
pub struct Gateway {
    client: reqwest::Client,
    config: GatewayConfig,

    /// Read on every outbound request. Armed and disarmed by the
    /// session manager; the gateway never writes it.
    credential: CredentialCell,

    /// Where the user currently is, as last committed by navigation.
    /// Consulted only to decide whether a 401 needs a redirect.
    location: RwLock<String>,

    /// Installed by the facade after construction. `None` until then;
    /// a 401 before installation still classifies, it just has nobody
    /// to tell.
    observer: RwLock<Option<Arc<dyn SessionObserver>>>,
}

impl Gateway {
    /// Creates a gateway over the given config and credential slot.
    pub fn new(config: GatewayConfig, credential: CredentialCell) -> Self {
        let login_path = config.login_path.clone();
        Self {
            client: reqwest::Client::new(),
            config,
            credential,
            location: RwLock::new(login_path),
            observer: RwLock::new(None),
        }
    }

    /// Installs the observer for unauthorized reactions.
    pub fn set_observer(&self, observer: Arc<dyn SessionObserver>) {
        *self.observer.write() = Some(observer);
    }

    /// Records the user's current surface. Called by navigation after
    /// every committed route change.
    pub fn set_location(&self, path: &str) {
        *self.location.write() = path.to_string();
    }

    /// The last committed surface path.
    pub fn location(&self) -> String {
        self.location.read().clone()
    }

    // --- Typed verbs -------------------------------------------------------

    /// `GET path`, decoding the body as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)).await
    }

    /// `GET path?key=value&...`, decoding the body as `T`.
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path).query(query)).await
    }

    /// `POST path` with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::POST, path).json(body)).await
    }

    /// `POST path` with no body. Used for state transitions addressed
    /// entirely by the path, e.g. parking a reservation.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::POST, path)).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::PUT, path).json(body)).await
    }

    /// `DELETE path`, decoding the body as `T`.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, path)).await
    }

    // --- Plumbing -----------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.config.base_url);
        let mut builder = self
            .client
            .request(method, url)
            .timeout(self.config.timeout);

        if let Some(credential) = self.credential.get() {
            builder = builder.bearer_auth(credential);
        }

        builder
    }

    /// Sends the request and classifies the outcome.
    ///
    /// Success means a 2xx status AND a body that decodes as `T`; a 2xx
    /// with an alien body is [`ApiError::Decode`], not a success with
    /// defaults. Failures read the server's `{ "error": ... }` envelope
    /// when present so alerts can carry the server's wording.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|err| ApiError::Network {
            message: err.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|err| ApiError::Decode {
                message: err.to_string(),
            });
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|raw| serde_json::from_str::<ErrorBody>(&raw).ok())
            .and_then(|body| body.error);

        let error = ApiError::from_status(status.as_u16(), message);
        tracing::debug!(status = status.as_u16(), error = %error, "request failed");

        if error.is_unauthorized() {
            self.handle_unauthorized();
        }

        Err(error)
    }

    /// The global 401 reaction: invalidate the session, and move the
    /// user to the login surface unless they are already on it.
    fn handle_unauthorized(&self) {
        let observer = self.observer.read().clone();
        let Some(observer) = observer else {
            tracing::warn!("credential rejected before an observer was installed");
            return;
        };

        observer.session_invalidated();

        let at_login = *self.location.read() == self.config.login_path;
        if at_login {
            tracing::debug!("credential rejected on the login surface, no redirect");
        } else {
            observer.login_required();
        }
    }
}

/// The gateway is also the session layer's revalidation probe: "who does
/// the armed credential belong to" is one authenticated GET.
impl IdentityProbe for Gateway {
    async fn check_identity(&self) -> Result<User, ApiError> {
        let me: MeResponse = self.get("/auth/me").await?;
        Ok(me.user)
    }
}
