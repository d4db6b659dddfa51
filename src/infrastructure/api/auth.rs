//! Explicit login and logout, the only session writes besides refresh.
use tracing::{info, instrument, warn};

use super::client::ApiClient;
use super::errors::ApiError;
use super::request::ApiRequest;
use crate::domain::models::{Credentials, Session, TokenResponse};

impl ApiClient {
    /// Exchange credentials for an access token and store it.
    ///
    /// Goes straight to the transport: a 401 here means bad credentials and
    /// must not trigger a refresh.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let request = ApiRequest::post(self.login_path.clone()).json(credentials)?;
        let response = self.dispatch(&request, None).await?;
        let token: TokenResponse = Self::read_response(response).await?.json()?;

        let session = self.session.replace_token(token.access_token).await;
        self.save_cookies().await;
        info!(generation = session.generation, "logged in");
        Ok(session)
    }

    /// Tell the backend to revoke the refresh cookie, then drop the session.
    ///
    /// The local session is cleared even when the backend call fails, and no
    /// expiry notification is emitted.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Session {
        let seen = self.session.snapshot().await;
        let request = ApiRequest::post(self.logout_path.clone());
        match self.dispatch(&request, seen.access_token.as_deref()).await {
            Ok(response) => {
                if let Err(e) = Self::read_response(response).await {
                    warn!(error = %e, "backend rejected logout");
                }
            }
            Err(e) => warn!(error = %e, "logout request failed"),
        }

        let session = self.session.clear().await;
        info!("logged out");
        session
    }
}
