//! Request pipeline.
//!
//! Every remote call funnels through here: stamp the envelope with the
//! current auth context, serialize and (usually) encrypt the body, dispatch
//! over the transport, decrypt/parse the response, classify failures, and
//! transparently replay the call once after re-authenticating when the
//! server reports stale credentials.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::catalog;
use crate::config::{API_PATH, DeviceProfile};
use crate::crypto::BodyCipher;
use crate::envelope::RequestEnvelope;
use crate::event::{EventBus, Notification};
use crate::session::SessionManager;
use crate::transport::Transport;
use crate::{Error, Result};

/// Stateless wire-level dispatch: envelope in, parsed result payload out.
///
/// Shared by the pipeline and the login chain (which must bypass the
/// authenticated gate).
pub(crate) struct Dispatcher {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) cipher: Arc<dyn BodyCipher>,
}

impl Dispatcher {
    /// Issue one call. Injects `userAuthToken` and `syncTime` from the
    /// stamped envelope into the body; call sites never set those
    /// parameters themselves.
    pub(crate) async fn call(
        &self,
        env: &RequestEnvelope,
        profile: &DeviceProfile,
    ) -> Result<Value> {
        let url = build_url(env, profile)?;

        let mut body = env.params.clone();
        if let Some(token) = &env.user_auth_token {
            body.insert("userAuthToken".to_string(), Value::from(token.clone()));
        }
        if let Some(sync_time) = env.sync_time {
            body.insert("syncTime".to_string(), Value::from(sync_time));
        }

        let mut bytes = serde_json::to_vec(&Value::Object(body))?;
        if env.encrypted {
            bytes = self.cipher.encrypt(&bytes, profile.encrypt_key)?;
        }

        debug!(
            method = %env.method,
            tls = env.use_tls,
            encrypted = env.encrypted,
            "TX: request"
        );

        let response = self.transport.post(url.as_str(), bytes).await?;
        let text = std::str::from_utf8(&response)
            .map_err(|_| Error::InvalidResponse("response is not UTF-8".to_string()))?;
        let value: Value = serde_json::from_str(text)?;

        match value.get("stat").and_then(Value::as_str) {
            Some("ok") => {
                debug!(method = %env.method, "RX: ok");
                Ok(value.get("result").cloned().unwrap_or(Value::Null))
            }
            Some("fail") => {
                let code = value.get("code").and_then(Value::as_u64).unwrap_or(0) as u32;
                let message = value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| catalog::lookup(code).0.to_string());
                let class = catalog::classify(code);
                warn!(method = %env.method, code, %message, ?class, "RX: server rejected call");
                Err(Error::Api {
                    code,
                    message,
                    class,
                })
            }
            _ => Err(Error::InvalidResponse(
                "missing status discriminator".to_string(),
            )),
        }
    }
}

/// `scheme://host/path?method=..&partner_id=..&auth_token=..&user_id=..`
/// with the auth token URL-escaped by the query serializer.
fn build_url(env: &RequestEnvelope, profile: &DeviceProfile) -> Result<Url> {
    let scheme = if env.use_tls { "https" } else { "http" };
    let mut url = Url::parse(&format!("{scheme}://{}{API_PATH}", profile.host))
        .map_err(|e| Error::Protocol(format!("bad endpoint URL: {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("method", &env.method);
        if let Some(partner_id) = &env.partner_id {
            query.append_pair("partner_id", partner_id);
        }
        if let Some(auth_token) = &env.auth_token {
            query.append_pair("auth_token", auth_token);
        }
        if let Some(user_id) = &env.user_id {
            query.append_pair("user_id", user_id);
        }
    }

    Ok(url)
}

/// Turns envelopes into completed calls, owning the authenticated gate and
/// the retry-once-on-stale-credentials policy.
pub(crate) struct Pipeline {
    dispatcher: Dispatcher,
    session: Arc<Mutex<SessionManager>>,
    events: EventBus,
}

impl Pipeline {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        cipher: Arc<dyn BodyCipher>,
        session: SessionManager,
        events: EventBus,
    ) -> Self {
        Self {
            dispatcher: Dispatcher { transport, cipher },
            session: Arc::new(Mutex::new(session)),
            events,
        }
    }

    /// Run the login chain if the session is not authenticated yet.
    pub(crate) async fn ensure_authenticated(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        if !session.is_authenticated() {
            session.login(&self.dispatcher).await?;
            self.events.publish(Notification::Authenticated);
        }
        Ok(())
    }

    /// Clear the session and notify listeners.
    pub(crate) async fn logout(&self) {
        let mut session = self.session.lock().await;
        session.logout();
        self.events.publish(Notification::LoggedOut);
    }

    /// Submit one envelope.
    ///
    /// Exactly one of {Ok(result), Err(failure)} per submitted envelope. An
    /// auth-invalid rejection triggers one re-authentication cycle and one
    /// resubmission of a freshly stamped copy; a second consecutive auth
    /// failure surfaces to the caller.
    pub(crate) async fn submit(&self, env: RequestEnvelope) -> Result<Value> {
        let (stamped, epoch, profile) = {
            let mut session = self.session.lock().await;
            if !session.is_authenticated() {
                session.login(&self.dispatcher).await?;
                self.events.publish(Notification::Authenticated);
            }
            (
                session.stamp(&env),
                session.token_epoch(),
                session.profile().clone(),
            )
        };

        match self.dispatcher.call(&stamped, &profile).await {
            Err(e) if e.is_auth_invalid() => {
                debug!(method = %env.method, "stale credentials, re-authenticating once");
                let (restamped, profile) = {
                    let mut session = self.session.lock().await;
                    // Another in-flight call may have re-authenticated while
                    // we waited for the lock; only re-login if the tokens we
                    // failed with are still the current ones.
                    if session.token_epoch() == epoch {
                        session.reauthenticate(&self.dispatcher).await?;
                        self.events.publish(Notification::Authenticated);
                    }
                    (session.stamp(&env), session.profile().clone())
                };
                self.dispatcher.call(&restamped, &profile).await
            }
            other => other,
        }
    }
}
