// FSAPI HTTP client
//
// Wraps `reqwest::Client` with FSAPI URL construction, session handling,
// and response-document decoding. Device operations (power, volume,
// presets, etc.) are inherent methods in `endpoints.rs`; this module keeps
// to transport and protocol mechanics.
//
// Nothing here returns `Err` to the caller once the client exists. A
// sleeping, unplugged or misbehaving radio degrades to a status plus
// missing values, which is what a poll loop wants.

use std::collections::BTreeMap;
use std::str::FromStr;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, trace};
use url::Url;
use xmltree::Element;

use crate::device::DeviceAddress;
use crate::error::Error;
use crate::status::Status;
use crate::transport::{SettleDelays, TransportConfig};
use crate::xml;

/// Characters left as-is in query values. Matches what the firmware's
/// own web UI sends, with `/` kept literal.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// How much of an unparseable body ends up in the debug log.
const BODY_PREVIEW_CHARS: usize = 100;

// ── Response types ──────────────────────────────────────────────────

/// A decoded device reply: the parsed document (if any) plus the raw
/// body text for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub document: Option<Element>,
    pub raw: String,
}

impl RawResponse {
    fn empty() -> Self {
        Self::default()
    }

    /// Status carried by the document. See [`xml::document_status`].
    pub fn status(&self) -> Status {
        xml::document_status(self.document.as_ref())
    }
}

/// Result of reading one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceValue {
    pub path: String,
    pub value: Option<String>,
    pub status: Status,
}

impl DeviceValue {
    fn without_value(path: &str, status: Status) -> Self {
        Self {
            path: path.to_owned(),
            value: None,
            status,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// `true` only when the value is exactly `"1"`.
    pub fn is_on(&self) -> bool {
        self.value.as_deref() == Some("1")
    }

    /// Parse the value, treating absent or malformed text as `None`.
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        self.value.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

/// One entry of an FSAPI list (presets, valid modes, EQ presets...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub key: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl ListItem {
    /// Decode an `<item key="..">` element. Items without a key are
    /// dropped.
    fn from_element(item: &Element) -> Option<Self> {
        let Some(key) = item.attributes.get("key") else {
            debug!("skipping list item without key attribute");
            return None;
        };

        let fields = xml::child_elements(item)
            .filter(|child| child.name == "field")
            .filter_map(|field| {
                let name = field.attributes.get("name")?;
                let value = xml::first_typed_text(field, xml::TYPED_FIELD_TAGS)?;
                Some((name.clone(), value))
            })
            .collect();

        Some(Self {
            key: key.clone(),
            fields,
        })
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for one FSAPI device.
///
/// Holds at most one session id at a time. The session is created lazily
/// on first use and dropped whenever the device reports it expired.
pub struct FsapiClient {
    http: reqwest::Client,
    address: DeviceAddress,
    base_url: Url,
    pin: SecretString,
    session: Mutex<Option<String>>,
    settle: SettleDelays,
}

impl FsapiClient {
    /// Create a client with its own HTTP connection pool.
    pub fn new(
        address: DeviceAddress,
        pin: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, address, pin)
    }

    /// Create a client on top of an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        address: DeviceAddress,
        pin: SecretString,
    ) -> Result<Self, Error> {
        let base_url = address.base_url()?;
        Ok(Self {
            http,
            address,
            base_url,
            pin,
            session: Mutex::new(None),
            settle: SettleDelays::default(),
        })
    }

    /// Override the settle delays used by mode switches and preset reads.
    pub fn with_settle_delays(mut self, settle: SettleDelays) -> Self {
        self.settle = settle;
        self
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn settle(&self) -> SettleDelays {
        self.settle
    }

    // ── Raw requests ────────────────────────────────────────────────

    /// Issue `GET {base}/{path}?{query}` and decode the reply.
    ///
    /// Never fails. Non-200 answers and empty bodies yield no document and
    /// no text; an unparseable body yields no document but keeps the text.
    pub async fn request(&self, path: &str, query: &[(&str, &str)]) -> RawResponse {
        let url = match self.endpoint_url(path, query) {
            Ok(url) => url,
            Err(e) => {
                error!(path, error = %e, "cannot build FSAPI request URL");
                return RawResponse::empty();
            }
        };

        let body = match self.fetch(url).await {
            Ok(body) => body,
            Err(e) if e.is_transient() => {
                debug!(device = %self.address, path, error = %e, "FSAPI request failed");
                return RawResponse::empty();
            }
            Err(e) => {
                error!(device = %self.address, path, error = %e, "unexpected FSAPI request error");
                return RawResponse::empty();
            }
        };

        match xml::parse_document(&body) {
            Ok(document) => RawResponse {
                document: Some(document),
                raw: body,
            },
            Err(e) => {
                let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
                debug!(path, error = %e, body = %preview, "unparseable FSAPI response");
                RawResponse {
                    document: None,
                    raw: body,
                }
            }
        }
    }

    async fn fetch(&self, url: Url) -> Result<String, Error> {
        trace!(path = url.path(), "GET");
        // reqwest errors carry the URL, which carries the PIN.
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(reqwest::Error::without_url)?;
        if body.trim().is_empty() {
            return Err(Error::EmptyBody);
        }
        Ok(body)
    }

    fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut full = format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'));
        for (i, (key, value)) in query.iter().enumerate() {
            full.push(if i == 0 { '?' } else { '&' });
            full.push_str(key);
            full.push('=');
            full.extend(utf8_percent_encode(value, QUERY_VALUE));
        }
        Ok(Url::parse(&full)?)
    }

    // ── Session management ──────────────────────────────────────────

    /// Make sure a session id is held, creating one if needed.
    ///
    /// Makes no request when a session already exists.
    pub async fn ensure_session(&self) -> bool {
        self.session().await.is_some()
    }

    /// Drop any held session and open a fresh one.
    pub async fn create_session(&self) -> Option<String> {
        let mut guard = self.session.lock().await;
        *guard = self.open_session().await;
        guard.clone()
    }

    /// Forget the held session id. The next operation opens a new one.
    pub async fn invalidate_session(&self) {
        *self.session.lock().await = None;
    }

    /// The held session id, if any. Never touches the network.
    pub async fn session_id(&self) -> Option<String> {
        self.session.lock().await.clone()
    }

    /// Release the client's session. The device has no logout call, so
    /// this only forgets the id.
    pub async fn close(&self) {
        self.invalidate_session().await;
        debug!(device = %self.address, "FSAPI client closed");
    }

    async fn session(&self) -> Option<String> {
        let mut guard = self.session.lock().await;
        if let Some(sid) = guard.as_ref() {
            return Some(sid.clone());
        }
        let sid = self.open_session().await?;
        *guard = Some(sid.clone());
        Some(sid)
    }

    async fn open_session(&self) -> Option<String> {
        let resp = self
            .request("CREATE_SESSION", &[("pin", self.pin.expose_secret())])
            .await;
        let status = resp.status();

        if status.is_ok() {
            if let Some(sid) = resp
                .document
                .as_ref()
                .and_then(|doc| xml::child_text(doc, "sessionId"))
            {
                debug!(device = %self.address, "FSAPI session created");
                return Some(sid);
            }
        }

        error!(device = %self.address, %status, "failed to create FSAPI session");
        None
    }

    /// Clear `stale` if it is still the held session. A concurrent caller
    /// may already have replaced it.
    async fn forget_session(&self, stale: &str) {
        let mut guard = self.session.lock().await;
        if guard.as_deref() == Some(stale) {
            *guard = None;
        }
    }

    // ── Protocol operations ─────────────────────────────────────────

    /// Read one node.
    ///
    /// An expired session is dropped but the read is not retried; the
    /// next call opens a fresh session.
    pub async fn get_value(&self, path: &str) -> DeviceValue {
        let Some(sid) = self.session().await else {
            return DeviceValue::without_value(path, Status::NoSession);
        };

        let resp = self
            .request(
                &format!("GET/{path}"),
                &[("pin", self.pin.expose_secret()), ("sid", &sid)],
            )
            .await;
        let status = resp.status();
        if status.is_session_expired() {
            debug!(path, %status, "session expired during read");
            self.forget_session(&sid).await;
        }

        let value = resp
            .document
            .as_ref()
            .and_then(|doc| xml::find_descendant(doc, "value"))
            .and_then(xml::value_text);

        DeviceValue {
            path: path.to_owned(),
            value,
            status,
        }
    }

    /// Write one node.
    ///
    /// On `FS_SESSION_TIMEOUT` or `FS_INVALID_SID` the session is recreated
    /// and the write retried exactly once.
    pub async fn set_value(&self, path: &str, value: &str) -> Status {
        let Some(sid) = self.session().await else {
            return Status::NoSession;
        };

        let status = self.write(path, value, &sid).await;
        if !status.is_session_expired() {
            return status;
        }

        debug!(path, %status, "session expired during write, retrying once");
        self.forget_session(&sid).await;
        let Some(fresh) = self.session().await else {
            return status;
        };

        let retried = self.write(path, value, &fresh).await;
        if retried.is_session_expired() {
            self.forget_session(&fresh).await;
        }
        retried
    }

    async fn write(&self, path: &str, value: &str, sid: &str) -> Status {
        self.request(
            &format!("SET/{path}"),
            &[
                ("pin", self.pin.expose_secret()),
                ("sid", sid),
                ("value", value),
            ],
        )
        .await
        .status()
    }

    /// Read up to `max_items` entries of a list node from its start.
    ///
    /// Any failure yields an empty list.
    pub async fn list_get_next(&self, path: &str, max_items: u32) -> Vec<ListItem> {
        let Some(sid) = self.session().await else {
            return Vec::new();
        };

        let max_items = max_items.to_string();
        let resp = self
            .request(
                &format!("LIST_GET_NEXT/{path}/-1"),
                &[
                    ("pin", self.pin.expose_secret()),
                    ("sid", &sid),
                    ("maxItems", &max_items),
                ],
            )
            .await;

        let status = resp.status();
        if status.is_session_expired() {
            debug!(path, %status, "session expired during list read");
            self.forget_session(&sid).await;
        }

        let Some(document) = resp.document else {
            return Vec::new();
        };

        let items: Vec<ListItem> = xml::find_descendants(&document, "item")
            .into_iter()
            .filter_map(ListItem::from_element)
            .collect();
        trace!(path, %status, count = items.len(), "list read");
        items
    }
}

impl std::fmt::Debug for FsapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsapiClient")
            .field("address", &self.address)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
