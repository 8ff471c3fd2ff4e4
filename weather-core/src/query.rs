use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};
use thiserror::Error;

/// OpenWeather "current weather" endpoint.
pub const OPENWEATHER_CURRENT_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Location looked up before the user has typed anything.
pub const DEFAULT_LOCATION: &str = "London,GB";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Search query is empty. Type a city or country, e.g. \"Paris\" or \"London,GB\".")]
    EmptyQuery,
}

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A non-empty, trimmed search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static inputs shared by every composed request.
#[derive(Debug, Clone)]
pub struct QueryDefaults {
    pub base_url: Url,
    pub api_key: String,
    pub units: Units,
}

impl QueryDefaults {
    pub fn openweather(api_key: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: Url::parse(OPENWEATHER_CURRENT_URL)?,
            api_key: api_key.into(),
            units: Units::default(),
        })
    }
}

/// One fully described network call. Fields are private so a target
/// cannot be altered after it is built; a new search builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTarget {
    url: Url,
    method: Method,
    payload: Option<serde_json::Value>,
}

impl RequestTarget {
    pub fn new(method: Method, url: Url, payload: Option<serde_json::Value>) -> Self {
        Self { url, method, payload }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url, None)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.payload.as_ref()
    }

    /// Host and path only, safe to log (the query string carries the API key).
    pub fn redacted(&self) -> String {
        format!("{} {}{}", self.method.as_str(), self.url.host_str().unwrap_or(""), self.url.path())
    }
}

/// Build the GET target for `query`: `<base>?q=..&units=..&appid=..`.
pub fn compose(query: &Query, defaults: &QueryDefaults) -> RequestTarget {
    let mut url = defaults.base_url.clone();
    url.query_pairs_mut()
        .append_pair("q", query.as_str())
        .append_pair("units", defaults.units.as_str())
        .append_pair("appid", &defaults.api_key);

    RequestTarget::get(url)
}
