use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenWeather `/data/2.5/weather` payload. Third-party data, so every
/// field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sys: Option<OwSys>,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub main: Option<OwMain>,
    /// Meters.
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub wind: Option<OwWind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwSys {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwWeather {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwMain {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Condition group used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Condition {
    #[default]
    Clouds,
    Haze,
    Rain,
    Clear,
    Drizzle,
    Snow,
    Thunder,
}

impl Condition {
    /// Unknown groups fall back to clouds.
    pub fn classify(main: Option<&str>) -> Self {
        match main.unwrap_or_default() {
            "Clouds" => Condition::Clouds,
            "Haze" => Condition::Haze,
            "Rain" => Condition::Rain,
            "Clear" => Condition::Clear,
            "Drizzle" => Condition::Drizzle,
            "Snow" => Condition::Snow,
            "Thunder" | "Thunderstorm" => Condition::Thunder,
            _ => Condition::Clouds,
        }
    }
}

/// Display-ready view of a [`CurrentWeather`] payload.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub condition: Condition,
    pub description: String,
    pub temperature: Option<i64>,
    pub feels_like: Option<i64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub visibility_km: Option<f64>,
}

impl From<&CurrentWeather> for WeatherReport {
    fn from(cw: &CurrentWeather) -> Self {
        let first = cw.weather.first();
        let main = cw.main.as_ref();

        let location = match (cw.name.as_deref(), cw.sys.as_ref().and_then(|s| s.country.as_deref())) {
            (Some(name), Some(country)) => format!("{name}, {country}"),
            (Some(name), None) => name.to_string(),
            (None, Some(country)) => country.to_string(),
            (None, None) => "Unknown location".to_string(),
        };

        Self {
            location,
            condition: Condition::classify(first.and_then(|w| w.main.as_deref())),
            description: first
                .and_then(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            temperature: main.and_then(|m| m.temp).map(whole_degrees),
            feels_like: main.and_then(|m| m.feels_like).map(whole_degrees),
            humidity_pct: main.and_then(|m| m.humidity),
            wind_speed_mps: cw.wind.as_ref().and_then(|w| w.speed),
            visibility_km: cw.visibility.map(|m| m / 1000.0),
        }
    }
}

impl WeatherReport {
    pub fn temperature_text(&self) -> String {
        or_dash(self.temperature)
    }

    pub fn feels_like_text(&self) -> String {
        or_dash(self.feels_like)
    }

    /// e.g. `70%`
    pub fn humidity_text(&self) -> String {
        self.humidity_pct.map_or_else(dash, |h| format!("{h}%"))
    }

    /// e.g. `3.1m/s`
    pub fn wind_text(&self) -> String {
        self.wind_speed_mps.map_or_else(dash, |w| format!("{w}m/s"))
    }

    /// e.g. `10Km`
    pub fn visibility_text(&self) -> String {
        self.visibility_km.map_or_else(dash, |v| format!("{v}Km"))
    }
}

/// Drops the fractional part, rounding toward zero (15.9 -> 15, -3.7 -> -3).
fn whole_degrees(value: f64) -> i64 {
    value.trunc() as i64
}

fn or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(dash, |v| v.to_string())
}

fn dash() -> String {
    "-".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "name": "London",
        "sys": { "country": "GB", "sunrise": 1 },
        "main": { "temp": 15.4, "feels_like": 14.1, "humidity": 70, "pressure": 1012 },
        "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
        "visibility": 10000,
        "wind": { "speed": 3.1, "deg": 200 },
        "cod": 200
    }"#;

    #[test]
    fn london_payload_renders_expected_fields() {
        let cw: CurrentWeather = serde_json::from_str(LONDON).unwrap();
        let report = WeatherReport::from(&cw);

        assert_eq!(report.location, "London, GB");
        assert_eq!(report.condition, Condition::Rain);
        assert_eq!(report.description, "light rain");
        assert_eq!(report.temperature_text(), "15");
        assert_eq!(report.feels_like_text(), "14");
        assert_eq!(report.visibility_text(), "10Km");
        assert_eq!(report.humidity_text(), "70%");
        assert_eq!(report.wind_text(), "3.1m/s");
    }

    #[test]
    fn partial_payload_still_decodes() {
        let cw: CurrentWeather = serde_json::from_str(r#"{"name":"Atlantis"}"#).unwrap();
        let report = WeatherReport::from(&cw);

        assert_eq!(report.location, "Atlantis");
        assert_eq!(report.condition, Condition::Clouds);
        assert_eq!(report.description, "Unknown");
        assert_eq!(report.temperature_text(), "-");
        assert_eq!(report.humidity_text(), "-");
        assert_eq!(report.wind_text(), "-");
        assert_eq!(report.visibility_text(), "-");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(serde_json::from_str::<CurrentWeather>("[1,2,3]").is_err());
    }

    #[test]
    fn temperatures_truncate_toward_zero() {
        assert_eq!(whole_degrees(15.9), 15);
        assert_eq!(whole_degrees(-3.7), -3);
        assert_eq!(whole_degrees(0.2), 0);
    }

    #[test]
    fn fractional_visibility_is_kept() {
        let cw = CurrentWeather { visibility: Some(9500.0), ..Default::default() };
        assert_eq!(WeatherReport::from(&cw).visibility_text(), "9.5Km");
    }

    #[test]
    fn condition_classification() {
        assert_eq!(Condition::classify(Some("Clear")), Condition::Clear);
        assert_eq!(Condition::classify(Some("Haze")), Condition::Haze);
        assert_eq!(Condition::classify(Some("Drizzle")), Condition::Drizzle);
        assert_eq!(Condition::classify(Some("Snow")), Condition::Snow);
        assert_eq!(Condition::classify(Some("Thunderstorm")), Condition::Thunder);
        assert_eq!(Condition::classify(Some("Mist")), Condition::Clouds);
        assert_eq!(Condition::classify(None), Condition::Clouds);
    }
}
