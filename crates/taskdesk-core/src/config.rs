use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Context;
use thiserror::Error;
use tracing::{
  info,
  warn
};
use url::Url;

use crate::i18n::Locale;

/// Persisted client setting holding the
/// API base URL.
pub const API_BASE_URL_KEY: &str =
  "apiBaseUrl";
pub const LOCALE_KEY: &str =
  "TASKDESK_LOCALE";
pub const FALLBACK_API_BASE_URL: &str =
  "http://localhost:3000";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
  #[error(
    "invalid API base URL {value:?}: \
     {reason}"
  )]
  InvalidUrl {
    value:  String,
    reason: String
  },
  #[error(
    "unsupported URL scheme {0:?}; \
     expected http or https"
  )]
  UnsupportedScheme(String),
  #[error(
    "failed to persist setting {key}: \
     {reason}"
  )]
  Storage {
    key:    String,
    reason: String
  }
}

/// Where user-editable settings live
/// between sessions.
pub trait SettingsStorage {
  fn get(&self, key: &str)
  -> Option<String>;

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), SettingsError>;

  fn remove(
    &self,
    key: &str
  ) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
  values: RefCell<HashMap<String, String>>
}

impl SettingsStorage for MemoryStorage {
  fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.values.borrow().get(key).cloned()
  }

  fn set(
    &self,
    key: &str,
    value: &str
  ) -> Result<(), SettingsError> {
    self.values.borrow_mut().insert(
      key.to_string(),
      value.to_string()
    );
    Ok(())
  }

  fn remove(
    &self,
    key: &str
  ) -> Result<(), SettingsError> {
    self.values.borrow_mut().remove(key);
    Ok(())
  }
}

/// Layered settings: built-in defaults,
/// then the bundled `taskdesk.toml`, then
/// the build environment, then explicit
/// overrides. Persisted user settings win
/// over all of them and are read on every
/// lookup.
pub struct Config {
  map:     HashMap<String, String>,
  storage: Rc<dyn SettingsStorage>
}

impl std::fmt::Debug for Config {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>
  ) -> std::fmt::Result {
    f.debug_struct("Config")
      .field("map", &self.map)
      .finish_non_exhaustive()
  }
}

impl Config {
  #[tracing::instrument(skip(
    storage, bundled
  ))]
  pub fn load(
    storage: Rc<dyn SettingsStorage>,
    bundled: Option<&str>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config {
      map: HashMap::new(),
      storage
    };

    cfg.map.insert(
      "api.base_url".to_string(),
      FALLBACK_API_BASE_URL.to_string()
    );
    cfg.map.insert(
      "locale".to_string(),
      Locale::En.code().to_string()
    );
    cfg.map.insert(
      "table.page_size".to_string(),
      "10".to_string()
    );

    if let Some(text) = bundled {
      cfg.load_toml(text).context(
        "failed to parse bundled \
         taskdesk.toml"
      )?;
    }

    if let Some(base_url) =
      option_env!("TASKDESK_API_BASE_URL")
    {
      info!(base_url, "using build-time API base URL");
      cfg.map.insert(
        "api.base_url".to_string(),
        base_url.to_string()
      );
    }

    Ok(cfg)
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn get_u64(
    &self,
    key: &str
  ) -> Option<u64> {
    self
      .map
      .get(key)
      .and_then(|v| v.trim().parse().ok())
  }

  /// Base URL for the next request.
  pub fn api_base_url(&self) -> String {
    match self
      .storage
      .get(API_BASE_URL_KEY)
    {
      | Some(value)
        if !value.trim().is_empty() =>
      {
        value
      }
      | _ => {
        self
          .get("api.base_url")
          .unwrap_or_else(|| {
            FALLBACK_API_BASE_URL
              .to_string()
          })
      }
    }
  }

  #[tracing::instrument(skip(self))]
  pub fn set_api_base_url(
    &self,
    raw: &str
  ) -> Result<String, SettingsError> {
    let normalized =
      normalize_base_url(raw)?;
    self.storage.set(
      API_BASE_URL_KEY,
      &normalized
    )?;
    info!(base_url = %normalized, "API base URL updated");
    Ok(normalized)
  }

  pub fn clear_api_base_url(
    &self
  ) -> Result<(), SettingsError> {
    self.storage.remove(API_BASE_URL_KEY)
  }

  pub fn locale(&self) -> Locale {
    self
      .storage
      .get(LOCALE_KEY)
      .or_else(|| self.get("locale"))
      .and_then(|code| {
        Locale::parse(&code)
      })
      .unwrap_or_default()
  }

  pub fn set_locale(
    &self,
    locale: Locale
  ) -> Result<(), SettingsError> {
    self
      .storage
      .set(LOCALE_KEY, locale.code())
  }

  pub fn default_page_size(&self) -> u64 {
    self
      .get_u64("table.page_size")
      .filter(|size| *size > 0)
      .unwrap_or(10)
  }

  fn load_toml(
    &mut self,
    text: &str
  ) -> anyhow::Result<()> {
    let table: toml::Table =
      toml::from_str(text)?;
    flatten_into(
      &mut self.map,
      "",
      &table
    );
    Ok(())
  }
}

fn flatten_into(
  map: &mut HashMap<String, String>,
  prefix: &str,
  table: &toml::Table
) {
  for (key, value) in table {
    let path = if prefix.is_empty() {
      key.clone()
    } else {
      format!("{prefix}.{key}")
    };
    match value {
      | toml::Value::Table(inner) => {
        flatten_into(map, &path, inner)
      }
      | toml::Value::String(text) => {
        map.insert(path, text.clone());
      }
      | toml::Value::Integer(n) => {
        map.insert(path, n.to_string());
      }
      | toml::Value::Boolean(flag) => {
        map.insert(path, flag.to_string());
      }
      | other => {
        warn!(key = %path, value = %other, "ignoring unsupported config value");
      }
    }
  }
}

/// Accepts absolute http(s) URLs and
/// strips trailing slashes.
pub fn normalize_base_url(
  raw: &str
) -> Result<String, SettingsError> {
  let trimmed = raw.trim();
  let parsed = Url::parse(trimmed)
    .map_err(|err| {
      SettingsError::InvalidUrl {
        value:  trimmed.to_string(),
        reason: err.to_string()
      }
    })?;
  match parsed.scheme() {
    | "http" | "https" => {}
    | other => {
      return Err(
        SettingsError::UnsupportedScheme(
          other.to_string()
        )
      );
    }
  }
  Ok(
    trimmed
      .trim_end_matches('/')
      .to_string()
  )
}

/// Joins base and path with exactly one
/// slash between them.
pub fn join_url(
  base: &str,
  path: &str
) -> String {
  let base = base.trim_end_matches('/');
  let path = path.trim_start_matches('/');
  if path.is_empty() {
    return base.to_string();
  }
  format!("{base}/{path}")
}
