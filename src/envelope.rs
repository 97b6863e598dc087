//! The unit of one outbound remote call.

use serde_json::{Map, Value};

/// One outbound call: method name, parameter map, auth context and wire
/// flags.
///
/// Envelopes are copyable values. A retried call is always a *fresh stamped
/// copy* with an updated token and timestamp, never the same object reused,
/// so the original caller and the retry path cannot race on shared state.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    /// Remote method name, e.g. `station.getPlaylist`.
    pub method: String,
    /// Caller-supplied parameters. The pipeline injects `userAuthToken` and
    /// `syncTime` at dispatch time; call sites never set those.
    pub params: Map<String, Value>,
    /// Partner id for the URL query.
    pub partner_id: Option<String>,
    /// Auth token for the URL query (user token once logged in, partner
    /// token during the login chain). URL-escaped on dispatch.
    pub auth_token: Option<String>,
    /// User id for the URL query.
    pub user_id: Option<String>,
    /// User auth token injected into the body.
    pub user_auth_token: Option<String>,
    /// Server-estimated timestamp injected into the body.
    pub sync_time: Option<u64>,
    /// `https` when set, plain `http` otherwise. Most domain calls run over
    /// plaintext per the original protocol; the login chain does not.
    pub use_tls: bool,
    /// Whether the serialized body is run through the payload cipher.
    pub encrypted: bool,
}

impl RequestEnvelope {
    /// New envelope with the default domain-call wire flags: plaintext HTTP,
    /// encrypted body.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: Map::new(),
            partner_id: None,
            auth_token: None,
            user_id: None,
            user_auth_token: None,
            sync_time: None,
            use_tls: false,
            encrypted: true,
        }
    }

    /// Add a body parameter.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Switch to the login-chain wire flags: TLS with an encrypted body.
    pub fn secure(mut self) -> Self {
        self.use_tls = true;
        self.encrypted = true;
        self
    }

    /// TLS with a plaintext body. Only the partner login uses this: its
    /// *response* carries the encrypted sync-time blob, but its body is sent
    /// in the clear.
    pub fn secure_plain_body(mut self) -> Self {
        self.use_tls = true;
        self.encrypted = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_plaintext_http_encrypted_body() {
        let env = RequestEnvelope::new("user.getStationList");
        assert!(!env.use_tls);
        assert!(env.encrypted);
        assert!(env.params.is_empty());
    }

    #[test]
    fn params_accumulate() {
        let env = RequestEnvelope::new("station.getPlaylist")
            .param("stationToken", "tok123")
            .param("includeTrackLength", true);
        assert_eq!(env.params["stationToken"], "tok123");
        assert_eq!(env.params["includeTrackLength"], true);
    }

    #[test]
    fn secure_flags() {
        let login = RequestEnvelope::new("auth.userLogin").secure();
        assert!(login.use_tls && login.encrypted);

        let partner = RequestEnvelope::new("auth.partnerLogin").secure_plain_body();
        assert!(partner.use_tls && !partner.encrypted);
    }
}
