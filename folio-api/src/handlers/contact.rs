use super::{ok, JsonResult};
use crate::error::ApiError;
use crate::extract::{ClientIp, JsonBody};
use crate::metrics::{record_contact, record_rate_limited};
use crate::state::AppState;
use axum::extract::State;
use folio_core::validation::ContactInput;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

const SENT_MESSAGE: &str = "Your message has been sent successfully.";

#[derive(Debug, Serialize)]
pub struct Sent {
    pub success: bool,
    pub message: &'static str,
}

fn sent() -> Sent {
    Sent {
        success: true,
        message: SENT_MESSAGE,
    }
}

/// Public contact form. Spam gets the same reply as a real message.
pub async fn submit(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    JsonBody(input): JsonBody<ContactInput>,
) -> JsonResult<Sent> {
    if input.is_spam() {
        debug!("Dropping contact submission with filled honeypot from {}", ip);
        record_contact(true);
        return Ok(ok(sent()));
    }

    let limits = &state.config.limits;
    let decision = state.limiter.check(
        &format!("contact:{ip}"),
        limits.contact_requests,
        Duration::from_secs(limits.contact_window_secs),
    );
    if !decision.success {
        record_rate_limited("contact");
        return Err(ApiError::rate_limited(
            "Too many messages sent. Please try again in a few minutes.",
        ));
    }

    let message = state.content.messages.submit(input).await?;
    record_contact(false);
    info!("Accepted contact message {} from {}", message.id, ip);

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send_contact_notification(&message).await {
            error!("Failed to send contact notification email: {}", e);
        }
    });

    Ok(ok(sent()))
}
