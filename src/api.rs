// API client module: a small blocking HTTP client that talks to a
// Sticky Notes paste service (see http://sayakb.github.io/sticky-notes/).
// Every call is synchronous; the tool runs one operation per invocation
// and blocks until the service answers.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;

/// Client for the Sticky Notes JSON API. Holds a reqwest blocking client,
/// the normalized site URL, the derived API base URL and the table of
/// expiration values the service supports.
///
/// The expire table is fetched eagerly at construction because `create`
/// cannot assemble a request without it; a client that fails to fetch it
/// is never handed to the caller.
pub struct StickyClient {
    client: Client,
    site: String,
    url: String,
    expire_values: Vec<i64>,
}

/// Full record for a single paste as returned by `/show/{id}`.
/// Author, title and project are optional on the wire; language is present
/// for every paste the service stores.
#[derive(Deserialize, Debug)]
pub struct PasteDetail {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub language: String,
    pub timestamp: Value,
}

/// Shape of the `result` object every endpoint returns. Exactly one tag
/// decides how a response is handled, checked in this priority order:
/// `error` beats everything (a result carrying both an error and other
/// keys is an error), then `values`, `pastes`, `id`, and finally the raw
/// result for anything unrecognized.
#[derive(Debug)]
pub enum Envelope {
    Error(String),
    Values(Vec<Value>),
    Pastes(Vec<String>),
    Id(String),
    Other(Value),
}

impl Envelope {
    pub fn classify(result: &Value) -> Envelope {
        if let Some(err) = result.get("error") {
            return Envelope::Error(text_of(err));
        }
        if let Some(values) = result.get("values").and_then(Value::as_array) {
            return Envelope::Values(values.clone());
        }
        if let Some(pastes) = result.get("pastes").and_then(Value::as_array) {
            return Envelope::Pastes(pastes.iter().map(text_of).collect());
        }
        if let Some(id) = result.get("id") {
            return Envelope::Id(text_of(id));
        }
        Envelope::Other(result.clone())
    }
}

/// Renders a JSON leaf as plain text: strings lose their quotes, anything
/// else keeps its JSON form. Ids and error messages arrive as strings but
/// the service is not strict about it.
pub(crate) fn text_of(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Prefix `http://` when the site was given without a scheme, so bare
/// hostnames like `paste.example.org` work as-is.
pub fn normalize_site(site: &str) -> String {
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_string()
    } else {
        format!("http://{}", site)
    }
}

/// Pick the table entry closest to `minutes * 60`. Ties go to the first
/// closest entry in table order; the table is small, so a stable linear
/// scan beats sorting it. `minutes <= 0` means "never expire", which the
/// service encodes as 0 without consulting the table. An empty table
/// (never the case inside a constructed client) passes the converted
/// seconds through unchanged.
pub fn nearest_expire(table: &[i64], minutes: i64) -> i64 {
    if minutes <= 0 {
        return 0;
    }
    let seconds = minutes * 60;
    let Some(&first) = table.first() else {
        return seconds;
    };
    let mut best = first;
    for &candidate in &table[1..] {
        if (candidate - seconds).abs() < (best - seconds).abs() {
            best = candidate;
        }
    }
    best
}

/// Accepts expire values as JSON numbers or numeric strings; the service
/// has returned both shapes across versions.
fn value_as_seconds(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

impl StickyClient {
    /// Create a client for `site` and fetch the expire table. Fails when
    /// the HTTP client cannot be built, the expire fetch fails, the
    /// service reports an error, or the table comes back empty.
    pub fn new(site: &str) -> Result<Self> {
        let site = normalize_site(site);
        let url = format!("{}/api/json", site);
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let mut sticky = StickyClient {
            client,
            site,
            url,
            expire_values: Vec::new(),
        };
        sticky.expire_values = sticky.fetch_expire_values()?;
        Ok(sticky)
    }

    /// The normalized site URL, used to build user-facing paste URLs.
    pub fn site(&self) -> &str {
        &self.site
    }

    fn fetch_expire_values(&self) -> Result<Vec<i64>> {
        let result = self.parameter("expire")?;
        match Envelope::classify(&result) {
            Envelope::Values(values) => {
                let table: Vec<i64> = values.iter().filter_map(value_as_seconds).collect();
                if table.is_empty() {
                    bail!("Service returned no expire values");
                }
                Ok(table)
            }
            Envelope::Error(msg) => bail!("Failed to fetch expire values: {}", msg),
            _ => bail!("Unexpected response for the expire parameter"),
        }
    }

    /// GET `/parameter/{name}` and return the `result` object.
    pub fn parameter(&self, name: &str) -> Result<Value> {
        self.get(&format!("/parameter/{}", name))
    }

    /// GET `/list/all` and return the `result` object.
    pub fn list_all(&self) -> Result<Value> {
        self.get("/list/all")
    }

    /// GET `/show/{id}` and return the `result` object.
    pub fn show(&self, id: &str) -> Result<Value> {
        self.get(&format!("/show/{}", id))
    }

    /// POST `/create` with a form-encoded parameter set and return the
    /// `result` object.
    pub fn create(&self, params: &[(&str, String)]) -> Result<Value> {
        let uri = format!("{}/create", self.url);
        let res = self
            .client
            .post(&uri)
            .form(params)
            .send()
            .with_context(|| format!("Failed to send request to {}", uri))?;
        extract_result(res, &uri)
    }

    /// Snap a requested expiration to the nearest service-supported value.
    pub fn nearest_expire(&self, minutes: i64) -> i64 {
        nearest_expire(&self.expire_values, minutes)
    }

    fn get(&self, endpoint: &str) -> Result<Value> {
        let uri = format!("{}{}", self.url, endpoint);
        let res = self
            .client
            .get(&uri)
            .send()
            .with_context(|| format!("Failed to send request to {}", uri))?;
        extract_result(res, &uri)
    }
}

/// Parse a response body as JSON and pull out its top-level `result`
/// object. A non-JSON body or a missing `result` is a transport-level
/// fault and propagates as a fatal error.
fn extract_result(res: reqwest::blocking::Response, uri: &str) -> Result<Value> {
    let body: Value = res
        .json()
        .with_context(|| format!("Response from {} is not JSON", uri))?;
    body.get("result")
        .cloned()
        .with_context(|| format!("Response from {} has no 'result' object", uri))
}
