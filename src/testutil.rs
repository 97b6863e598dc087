//! Shared test doubles: scripted transport and identity cipher.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use url::Url;

use crate::Result;
use crate::crypto::BodyCipher;
use crate::transport::Transport;

/// Identity cipher so scripted bodies and responses stay readable JSON.
pub(crate) struct NoopCipher;

impl BodyCipher for NoopCipher {
    fn encrypt(&self, data: &[u8], _key: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decrypt(&self, data: &[u8], _key: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

/// In-memory transport answering from a script and recording every call.
///
/// The script receives the method name and how many times that method has
/// been called before (0 for the first call).
pub(crate) struct ScriptedTransport {
    calls: Mutex<Vec<(String, String, Value)>>,
    script: Box<dyn Fn(&str, usize) -> Value + Send + Sync>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        script: impl Fn(&str, usize) -> Value + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            script: Box::new(script),
        })
    }

    /// Method names in call order.
    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _, _)| m.clone()).collect()
    }

    /// Full request URLs in call order.
    pub(crate) fn urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, u, _)| u.clone()).collect()
    }

    /// Decoded body of the most recent call.
    pub(crate) fn last_body(&self) -> Value {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, b)| b.clone())
            .expect("no calls recorded")
    }

    /// Decoded bodies of every call to `method`, in order.
    pub(crate) fn bodies_for(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| m == method)
            .map(|(_, _, b)| b.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let parsed = Url::parse(url).expect("valid request URL");
        let method = parsed
            .query_pairs()
            .find(|(k, _)| k == "method")
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();
        let body_json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

        let n = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.iter().filter(|(m, _, _)| *m == method).count();
            calls.push((method.clone(), url.to_string(), body_json));
            n
        };

        Ok(serde_json::to_vec(&(self.script)(&method, n)).expect("serialize response"))
    }
}

/// A successful protocol response wrapping `result`.
pub(crate) fn ok(result: Value) -> Value {
    json!({"stat": "ok", "result": result})
}

/// A failed protocol response with the given error code.
pub(crate) fn fail(code: u32) -> Value {
    json!({"stat": "fail", "code": code, "message": "scripted failure"})
}

/// Standard happy-path responses for the login chain, `None` for anything
/// else. The sync-time blob decrypts (identity cipher) to four garbage
/// digits plus epoch seconds; the user token carries the call index so
/// re-login tests can tell tokens apart.
pub(crate) fn login_ok(method: &str, n: usize) -> Option<Value> {
    match method {
        "auth.partnerLogin" => Some(ok(json!({
            "partnerId": "42",
            "partnerAuthToken": "PTOK",
            "syncTime": "00001700000000",
        }))),
        "auth.userLogin" => Some(ok(json!({
            "userAuthToken": format!("UTOK{n}"),
            "userId": "u1",
        }))),
        "user.canSubscribe" => Some(ok(json!({"canSubscribe": true}))),
        _ => None,
    }
}
