//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Query composition (free text -> request target)
//! - The request lifecycle behind a search box (one request in flight,
//!   superseded attempts discarded, transient error visibility)
//! - The OpenWeather payload and its display view
//!
//! It is used by `weather-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod model;
pub mod query;
pub mod search;

pub use config::Config;
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use lifecycle::{RequestError, RequestManager, RequestState, Snapshot};
pub use model::{Condition, CurrentWeather, WeatherReport};
pub use query::{Method, Query, QueryDefaults, RequestTarget, Units, ValidationError, compose};
pub use search::{WeatherFetcher, WeatherSearch};
