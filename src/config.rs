//! Device profiles and account credentials.
//!
//! The service identifies the *client software* (partner) separately from
//! the *listener account*. A [`DeviceProfile`] bundles the partner identity:
//! device model, API host, partner credentials and the two Blowfish keys
//! used to obscure request/response payloads. Subscriber accounts must be
//! served under the full desktop profile; free accounts use the restricted
//! mobile profile.

/// Wire endpoint path, shared by all profiles.
pub const API_PATH: &str = "/services/json/";

/// JSON protocol version sent at partner login.
pub const API_VERSION: &str = "5";

/// Immutable client identity presented to the service.
///
/// Replaced wholesale when the session manager switches to the full profile
/// for a subscriber account; never mutated field-by-field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Short identifier used for profile-identity comparison.
    pub name: &'static str,
    /// Device model reported at partner login.
    pub device_model: &'static str,
    /// API hostname.
    pub host: &'static str,
    /// Partner account username.
    pub partner_username: &'static str,
    /// Partner account password.
    pub partner_password: &'static str,
    /// Blowfish key for outgoing bodies.
    pub encrypt_key: &'static [u8],
    /// Blowfish key for encrypted response blobs (sync time).
    pub decrypt_key: &'static [u8],
}

impl DeviceProfile {
    /// Restricted mobile profile. Default identity for new sessions; free
    /// accounts stay on it.
    pub fn android() -> Self {
        Self {
            name: "android",
            device_model: "android-generic",
            host: "tuner.pandora.com",
            partner_username: "android",
            partner_password: "AC7IBG09A3DTSYM4R41UJWL07VLN8JI7",
            encrypt_key: b"6#26FRL$ZWD",
            decrypt_key: b"R=U!LH$O2B#",
        }
    }

    /// Full-featured desktop profile, required for subscriber accounts.
    pub fn desktop() -> Self {
        Self {
            name: "desktop",
            device_model: "D01",
            host: "internal-tuner.pandora.com",
            partner_username: "pandora one",
            partner_password: "TVCKIBGS9AO9TSYLNNFUML0743LH82D",
            encrypt_key: b"2%3WCL*JU$MP]4",
            decrypt_key: b"U#IO$RZPAB%VX2",
        }
    }

    /// Whether this is already the full-featured profile. Guards the
    /// subscriber profile-switch loop: the switch must never re-trigger once
    /// the full profile is active, regardless of what the server reports.
    pub fn is_full(&self) -> bool {
        self.name == Self::desktop().name
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::android()
    }
}

/// Listener account credentials, consumed on (re-)authentication.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_distinct_identities() {
        assert_ne!(DeviceProfile::android(), DeviceProfile::desktop());
        assert!(!DeviceProfile::android().is_full());
        assert!(DeviceProfile::desktop().is_full());
    }

    #[test]
    fn default_is_restricted_profile() {
        assert_eq!(DeviceProfile::default().name, "android");
    }
}
