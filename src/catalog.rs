//! Protocol error code catalog.
//!
//! The server reports failures as numeric codes in two disjoint ranges:
//! 0–15 for infrastructure-level errors and 1000–1037 for domain errors.
//! Each known code maps to a human-readable message and a classification
//! that drives the pipeline's retry policy. Codes outside both ranges are
//! [`ErrorClass::Unknown`], never a fault.

/// How a server-reported error code should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Server-side hiccup; the call may succeed later, but is not retried
    /// automatically.
    TransientServer,
    /// The client sent invalid parameters. Never retried.
    BadRequest,
    /// Expired/invalid/missing token or stale sync time. Fixed by one
    /// re-authentication cycle.
    AuthInvalid,
    /// Maintenance mode, unsupported version, licensing restrictions.
    /// Surfaced immediately, never retried.
    Unrecoverable,
    /// Code outside both known ranges.
    Unknown,
}

/// Look up the catalog entry for a protocol error code.
///
/// Returns `(message, class)`. Unmapped codes yield a generic message and
/// [`ErrorClass::Unknown`].
pub fn lookup(code: u32) -> (&'static str, ErrorClass) {
    use ErrorClass::*;

    match code {
        // Infrastructure errors (0-15).
        0 => ("internal server error", TransientServer),
        1 => ("system is in maintenance mode", Unrecoverable),
        2 => ("url parameter missing: method", BadRequest),
        3 => ("url parameter missing: auth token", AuthInvalid),
        4 => ("url parameter missing: partner id", BadRequest),
        5 => ("url parameter missing: user id", BadRequest),
        6 => ("secure protocol required", BadRequest),
        7 => ("certificate required", BadRequest),
        8 => ("parameter type mismatch", BadRequest),
        9 => ("parameter missing", BadRequest),
        10 => ("parameter value invalid", BadRequest),
        11 => ("wrong user credentials", AuthInvalid),
        12 => ("unsupported client version", Unrecoverable),
        13 => ("sync time out of date", AuthInvalid),
        14 => ("unknown method name", BadRequest),
        15 => ("wrong protocol", BadRequest),

        // Domain errors (1000-1037).
        1000 => ("system is in read-only mode", TransientServer),
        1001 => ("invalid auth token", AuthInvalid),
        1002 => ("invalid partner or user login", AuthInvalid),
        1003 => ("listener not authorized, subscription expired", Unrecoverable),
        1004 => ("user not authorized", Unrecoverable),
        1005 => ("station limit reached", BadRequest),
        1006 => ("station does not exist", BadRequest),
        1007 => ("complimentary period already in use", Unrecoverable),
        1008 => ("call not allowed", BadRequest),
        1009 => ("device not found", BadRequest),
        1010 => ("partner not authorized", Unrecoverable),
        1011 => ("invalid username", BadRequest),
        1012 => ("invalid password", BadRequest),
        1013 => ("username already exists", BadRequest),
        1014 => ("device already associated to account", BadRequest),
        1015 => ("upgrade device model invalid", BadRequest),
        1016 => ("explicit pin incorrect", BadRequest),
        1017 => ("explicit pin malformed", BadRequest),
        1018 => ("device model invalid", BadRequest),
        1019 => ("zip code invalid", BadRequest),
        1020 => ("birth year invalid", BadRequest),
        1021 => ("birth year too young", Unrecoverable),
        1022 => ("invalid country code", BadRequest),
        1023 => ("invalid gender", BadRequest),
        1024 => ("device disabled", Unrecoverable),
        1025 => ("daily trial limit reached", Unrecoverable),
        1026 => ("invalid sponsor", BadRequest),
        1027 => ("user already used trial", Unrecoverable),
        1028 => ("playlist exceeded max size", BadRequest),
        1029 => ("remote command not allowed", BadRequest),
        1030 => ("station name too long", BadRequest),
        1031 => ("station name contains invalid characters", BadRequest),
        1032 => ("seed limit reached", BadRequest),
        1033 => ("seed does not exist", BadRequest),
        1034 => ("feedback does not exist", BadRequest),
        1035 => ("quickmix not editable", BadRequest),
        1036 => ("content not available in listener country", Unrecoverable),
        1037 => ("ad token expired", TransientServer),

        _ => ("unknown error code", Unknown),
    }
}

/// Classification for a protocol error code.
pub fn classify(code: u32) -> ErrorClass {
    lookup(code).1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_11_is_wrong_credentials() {
        let (message, class) = lookup(11);
        assert_eq!(message, "wrong user credentials");
        assert_eq!(class, ErrorClass::AuthInvalid);
    }

    #[test]
    fn code_1001_is_invalid_auth_token() {
        let (message, class) = lookup(1001);
        assert_eq!(message, "invalid auth token");
        assert_eq!(class, ErrorClass::AuthInvalid);
    }

    #[test]
    fn maintenance_is_unrecoverable() {
        assert_eq!(classify(1), ErrorClass::Unrecoverable);
        assert_eq!(classify(1036), ErrorClass::Unrecoverable);
    }

    #[test]
    fn codes_outside_both_ranges_are_unknown() {
        assert_eq!(classify(16), ErrorClass::Unknown);
        assert_eq!(classify(999), ErrorClass::Unknown);
        assert_eq!(classify(1038), ErrorClass::Unknown);
        assert_eq!(classify(u32::MAX), ErrorClass::Unknown);
    }

    #[test]
    fn range_boundaries_are_mapped() {
        assert_eq!(classify(0), ErrorClass::TransientServer);
        assert_eq!(classify(15), ErrorClass::BadRequest);
        assert_eq!(classify(1000), ErrorClass::TransientServer);
        assert_eq!(classify(1037), ErrorClass::TransientServer);
    }
}
