use crate::auth::{CognitoClient, TokenVerifier};
use crate::config::Config;
use crate::mail::Mailer;
use crate::media::MediaStore;
use crate::rate_limit::RateLimiter;
use folio_core::content::Content;
use std::sync::Arc;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub content: Content,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Absent when the hosted login flow is not configured.
    pub identity: Option<CognitoClient>,
    pub media: MediaStore,
    pub mailer: Arc<dyn Mailer>,
    pub limiter: RateLimiter,
    pub config: Arc<Config>,
}
