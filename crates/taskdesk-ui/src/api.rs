//! Browser glue for the core traits: cookie settings, the address bar and
//! file downloads.

use gloo::file::{Blob, ObjectUrl};
use taskdesk_core::config::{SettingsError, SettingsStorage};
use taskdesk_core::export::ExportFile;
use taskdesk_core::url_state::QueryLocation;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlDocument};

const COOKIE_MAX_AGE_SECS: u32 = 60 * 60 * 24 * 365;

fn html_document() -> Option<HtmlDocument> {
    web_sys::window()?.document()?.dyn_into::<HtmlDocument>().ok()
}

/// Settings persisted as first-party cookies.
#[derive(Debug, Default, Clone, Copy)]
pub struct CookieStorage;

impl CookieStorage {
    fn write(&self, key: &str, raw_cookie: String) -> Result<(), SettingsError> {
        let document = html_document().ok_or_else(|| SettingsError::Storage {
            key: key.to_string(),
            reason: "document is not available".to_string(),
        })?;
        document.set_cookie(&raw_cookie).map_err(|err| SettingsError::Storage {
            key: key.to_string(),
            reason: format!("{err:?}"),
        })
    }
}

impl SettingsStorage for CookieStorage {
    fn get(&self, key: &str) -> Option<String> {
        let cookies = html_document()?.cookie().ok()?;
        cookies.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            if name != key {
                return None;
            }
            js_sys::decode_uri_component(value).ok().and_then(|decoded| decoded.as_string())
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let encoded: String = js_sys::encode_uri_component(value).into();
        self.write(key, format!("{key}={encoded}; path=/; max-age={COOKIE_MAX_AGE_SECS}; SameSite=Lax"))
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.write(key, format!("{key}=; path=/; max-age=0; SameSite=Lax"))
    }
}

/// The address bar; query changes replace the current history entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserLocation;

impl QueryLocation for BrowserLocation {
    fn query(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default()
    }

    fn replace_query(&self, query: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let path = location.pathname().unwrap_or_default();
        let hash = location.hash().unwrap_or_default();
        let next = if query.is_empty() {
            format!("{path}{hash}")
        } else {
            format!("{path}?{query}{hash}")
        };
        let result = window
            .history()
            .and_then(|history| history.replace_state_with_url(&JsValue::NULL, "", Some(&next)));
        if let Err(err) = result {
            tracing::warn!(error = ?err, "failed to rewrite the query string");
        }
    }
}

/// Saves `file` through a temporary object URL.
pub fn download(file: &ExportFile) {
    let blob = Blob::new_with_options(file.bytes.as_slice(), Some(file.mime_type));
    let url = ObjectUrl::from(blob);

    let anchor = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.create_element("a").ok())
        .and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok());
    let Some(anchor) = anchor else {
        tracing::error!(file = file.file_name, "cannot create download link");
        return;
    };

    anchor.set_href(&url);
    anchor.set_download(file.file_name);
    anchor.click();
    tracing::info!(file = file.file_name, bytes = file.bytes.len(), "download started");
}

pub fn focus_element(id: &str) {
    let element = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(id))
        .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok());
    if let Some(element) = element {
        let _ = element.focus();
    }
}
