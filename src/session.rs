//! Authentication state machine.
//!
//! The session walks `Anonymous -> PartnerAuthenticated -> UserAuthenticated
//! -> SubscriptionResolved`. Partner login identifies the client software
//! and seeds the [`SyncClock`]; user login identifies the listener account;
//! the subscription probe decides whether the restricted device profile must
//! be swapped for the full one (which restarts the chain once, under an
//! explicit iteration guard).
//!
//! [`SessionManager`] is the sole authority on "are we authenticated". All
//! of its state is mutated behind the pipeline's session lock.

use serde_json::Value;
use tracing::{debug, info};

use crate::clock::SyncClock;
use crate::config::{API_VERSION, Credentials, DeviceProfile};
use crate::envelope::RequestEnvelope;
use crate::pipeline::Dispatcher;
use crate::{Error, Result};

/// Owns the token state and the three-stage login negotiation.
pub struct SessionManager {
    profile: DeviceProfile,
    credentials: Credentials,
    clock: SyncClock,
    partner_id: Option<String>,
    partner_auth_token: Option<String>,
    user_auth_token: Option<String>,
    user_id: Option<String>,
    /// Unknown until first queried, cached until logout.
    is_subscriber: Option<bool>,
    /// Set only once the subscriber-tier decision is finalized.
    subscription_resolved: bool,
    /// Bumped on every completed login and on logout. Lets concurrent
    /// stale-token completions detect that someone else already
    /// re-authenticated.
    token_epoch: u64,
}

impl SessionManager {
    pub fn new(profile: DeviceProfile, credentials: Credentials) -> Self {
        Self {
            profile,
            credentials,
            clock: SyncClock::new(),
            partner_id: None,
            partner_auth_token: None,
            user_auth_token: None,
            user_id: None,
            is_subscriber: None,
            subscription_resolved: false,
            token_epoch: 0,
        }
    }

    /// True only once the full chain has completed, including the
    /// subscriber-tier decision. A user token alone is not sufficient: the
    /// device profile might still need to switch.
    pub fn is_authenticated(&self) -> bool {
        self.user_auth_token.is_some() && self.subscription_resolved
    }

    /// The active client identity.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub(crate) fn token_epoch(&self) -> u64 {
        self.token_epoch
    }

    /// Fill a fresh copy of `env` with the current auth context and a fresh
    /// sync timestamp. Always a copy: the retry path must never share a
    /// mutable envelope with the original caller.
    pub(crate) fn stamp(&self, env: &RequestEnvelope) -> RequestEnvelope {
        let mut stamped = env.clone();
        stamped.partner_id = self.partner_id.clone();
        stamped.user_id = self.user_id.clone();
        stamped.user_auth_token = self.user_auth_token.clone();
        stamped.auth_token = self
            .user_auth_token
            .clone()
            .or_else(|| self.partner_auth_token.clone());
        stamped.sync_time = self.clock.has_base().then(|| self.clock.now());
        stamped
    }

    /// Run the full login chain: partner login, user login, subscription
    /// probe, and at most one device-profile switch.
    ///
    /// The switch is guarded by profile identity, not by the subscriber
    /// flag, so it cannot loop even if the server reports "subscriber"
    /// under both profiles.
    pub(crate) async fn login(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        for attempt in 0..2u8 {
            self.partner_login(dispatcher).await?;
            self.user_login(dispatcher).await?;

            if self.is_subscriber.is_none() {
                self.resolve_subscriber(dispatcher).await?;
            }

            if self.is_subscriber == Some(true) && !self.profile.is_full() {
                info!(
                    from = self.profile.name,
                    "subscriber account, switching to full device profile"
                );
                self.reset_tokens();
                self.profile = DeviceProfile::desktop();
                continue;
            }

            self.subscription_resolved = true;
            self.token_epoch += 1;
            debug!(attempt, profile = self.profile.name, "login chain complete");
            return Ok(());
        }

        // Unreachable while the profile-identity guard holds; kept as a hard
        // stop against a non-converging switch.
        Err(Error::Auth(
            "device profile switch did not converge".to_string(),
        ))
    }

    /// Drop tokens and re-run the login chain. Used by the pipeline when a
    /// call comes back with stale credentials; keeps the cached subscriber
    /// flag so the probe is not re-issued.
    pub(crate) async fn reauthenticate(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        debug!("re-authenticating with fresh tokens");
        self.reset_tokens();
        self.login(dispatcher).await
    }

    /// Explicit logout: clears all session fields including the cached
    /// subscription flag.
    pub fn logout(&mut self) {
        self.reset_tokens();
        self.is_subscriber = None;
        self.token_epoch += 1;
    }

    fn reset_tokens(&mut self) {
        self.partner_id = None;
        self.partner_auth_token = None;
        self.user_auth_token = None;
        self.user_id = None;
        self.subscription_resolved = false;
        self.clock.reset();
    }

    /// Anonymous -> PartnerAuthenticated. TLS, plaintext body; the response
    /// carries the encrypted sync-time blob that seeds the clock.
    async fn partner_login(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        let env = RequestEnvelope::new("auth.partnerLogin")
            .param("username", self.profile.partner_username)
            .param("password", self.profile.partner_password)
            .param("deviceModel", self.profile.device_model)
            .param("version", API_VERSION)
            .param("includeUrls", true)
            .secure_plain_body();

        let result = dispatcher.call(&env, &self.profile).await?;

        let partner_id = str_field(&result, "partnerId")?;
        let partner_token = str_field(&result, "partnerAuthToken")?;
        let sync_blob = str_field(&result, "syncTime")?;
        let server_time = self.decrypt_sync_time(dispatcher, &sync_blob)?;

        self.clock.record_base(server_time);
        self.partner_id = Some(partner_id);
        self.partner_auth_token = Some(partner_token);
        debug!("partner login complete");
        Ok(())
    }

    /// PartnerAuthenticated -> UserAuthenticated.
    async fn user_login(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        let partner_token = self
            .partner_auth_token
            .clone()
            .ok_or_else(|| Error::Auth("user login without partner session".to_string()))?;

        let env = RequestEnvelope::new("auth.userLogin")
            .param("loginType", "user")
            .param("username", self.credentials.username.clone())
            .param("password", self.credentials.password.clone())
            .param("partnerAuthToken", partner_token)
            .secure();
        let env = self.stamp(&env);

        let result = dispatcher.call(&env, &self.profile).await?;

        self.user_auth_token = Some(str_field(&result, "userAuthToken")?);
        self.user_id = Some(str_field(&result, "userId")?);
        debug!(user_id = ?self.user_id, "user login complete");
        Ok(())
    }

    /// UserAuthenticated -> subscriber flag cached. An account that cannot
    /// subscribe any further is already a subscriber.
    async fn resolve_subscriber(&mut self, dispatcher: &Dispatcher) -> Result<()> {
        let env = self.stamp(&RequestEnvelope::new("user.canSubscribe").secure());
        let result = dispatcher.call(&env, &self.profile).await?;

        let can_subscribe = result
            .get("canSubscribe")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::InvalidResponse("missing canSubscribe".to_string()))?;
        self.is_subscriber = Some(!can_subscribe);
        debug!(is_subscriber = !can_subscribe, "subscription probe complete");
        Ok(())
    }

    /// The sync-time blob decrypts to four garbage bytes followed by ASCII
    /// epoch seconds.
    fn decrypt_sync_time(&self, dispatcher: &Dispatcher, blob: &str) -> Result<u64> {
        let plain = dispatcher
            .cipher
            .decrypt(blob.as_bytes(), self.profile.decrypt_key)?;
        if plain.len() <= 4 {
            return Err(Error::InvalidResponse("sync time blob too short".to_string()));
        }
        let digits = std::str::from_utf8(&plain[4..])
            .map_err(|_| Error::InvalidResponse("sync time is not ASCII".to_string()))?;
        digits
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::InvalidResponse("sync time is not a number".to_string()))
    }
}

fn str_field(result: &Value, key: &str) -> Result<String> {
    result
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidResponse(format!("missing field: {key}")))
}
