use http::HeaderMap;
use http::header::{COOKIE, HeaderValue};
use serde_json::{Map, Value, json};
use signet::{
    Config, CookieOptions, CookieSink, MaxAge, Request, Response, Result, Session,
    SessionBackend, SessionStore,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const SECRET: &str = "s3cr3t";

pub fn create_test_config(secret: &str) -> Arc<Config> {
    Arc::new(Config::new(secret).unwrap())
}

/// Builds the next request from the cookies a response set, the way a
/// browser would.
pub fn follow_up_request(response: &Response) -> Request {
    let pairs: Vec<String> = response
        .set_cookie_headers()
        .into_iter()
        .filter_map(|header| header.split(';').next())
        .filter(|pair| !pair.ends_with('='))
        .map(str::to_string)
        .collect();

    let mut headers = HeaderMap::new();
    if !pairs.is_empty() {
        headers.insert(COOKIE, HeaderValue::from_str(&pairs.join("; ")).unwrap());
    }
    Request::from_headers(&headers)
}

/// Server-side backend keeping session data in memory and only a signed
/// session id in the cookie.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, Map<String, Value>>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryBackend {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

const SID_KEY: &str = "_sid";

impl SessionBackend for MemoryBackend {
    fn load(&self, store: &SessionStore, key: &str, _options: &CookieOptions) -> Session {
        let sid = store
            .get_secure_cookie(key, MaxAge::Configured)
            .and_then(|v| v.get("sid").and_then(Value::as_str).map(str::to_string));

        let records = self.records.lock().unwrap();
        match sid.and_then(|sid| records.get(&sid)) {
            Some(data) => Session::from_map(data.clone()),
            None => Session::new(),
        }
    }

    fn save(
        &self,
        session: &Session,
        response: &mut dyn CookieSink,
        store: &SessionStore,
        key: &str,
        options: &CookieOptions,
    ) -> Result<()> {
        if !session.is_modified() {
            return Ok(());
        }

        let sid = match session.get(SID_KEY).and_then(Value::as_str) {
            Some(sid) => sid.to_string(),
            None => self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
        };
        let mut data = session.as_map().clone();
        data.insert(SID_KEY.to_string(), json!(sid));
        self.records.lock().unwrap().insert(sid.clone(), data);

        let Value::Object(cookie) = json!({ "sid": sid }) else {
            unreachable!()
        };
        store.set_secure_cookie(response, key, &cookie, &options.into())
    }
}
