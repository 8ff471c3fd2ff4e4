use tracing::{debug, info};

use crate::{
    config::Config,
    fetch::{Fetcher, HttpFetcher},
    lifecycle::RequestManager,
    model::CurrentWeather,
    query::{Query, QueryDefaults, ValidationError, compose},
};

pub type WeatherFetcher = HttpFetcher<CurrentWeather>;

/// Ties the search box to the request lifecycle: validated input is composed
/// into a target and handed to the manager; invalid input goes nowhere.
pub struct WeatherSearch<F: Fetcher = WeatherFetcher> {
    defaults: QueryDefaults,
    manager: RequestManager<F>,
}

impl WeatherSearch<WeatherFetcher> {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let defaults = config.query_defaults()?;
        let manager = RequestManager::new(WeatherFetcher::new()).with_error_window(config.error_window());
        Ok(Self::new(defaults, manager))
    }
}

impl<F: Fetcher> WeatherSearch<F> {
    pub fn new(defaults: QueryDefaults, manager: RequestManager<F>) -> Self {
        Self { defaults, manager }
    }

    /// Issue the initial lookup for `default_location`; the search is
    /// `Loading` from here on instead of sitting `Idle`.
    pub fn start(&mut self, default_location: &str) -> Result<(), ValidationError> {
        info!(location = default_location, "starting with default location");
        self.submit(default_location)
    }

    /// Validate `input` and, if it is a real query, start fetching it.
    pub fn submit(&mut self, input: &str) -> Result<(), ValidationError> {
        let query = Query::parse(input).inspect_err(|_| debug!("empty query rejected"))?;
        self.manager.observe(compose(&query, &self.defaults));
        Ok(())
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    pub fn manager(&self) -> &RequestManager<F> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut RequestManager<F> {
        &mut self.manager
    }
}
