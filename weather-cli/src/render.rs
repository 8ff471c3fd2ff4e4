use chrono::{Datelike, NaiveDate, Utc};
use weather_core::{Condition, CurrentWeather, RequestState, Snapshot, ValidationError, WeatherReport};

pub fn print_snapshot(snap: &Snapshot<CurrentWeather>) {
    print!("{}", format_snapshot(snap, Utc::now().date_naive()));
}

/// Stand-in for the search box shake: a short hint, nothing is sent.
pub fn print_validation(err: &ValidationError) {
    eprintln!("  ~~ {err}");
}

pub fn format_snapshot(snap: &Snapshot<CurrentWeather>, today: NaiveDate) -> String {
    match &snap.state {
        RequestState::Idle => String::new(),
        RequestState::Loading => "Loading...\n".to_string(),
        RequestState::Succeeded(data) => format_card(&WeatherReport::from(data), today),
        RequestState::Failed(err) => {
            let marker = if snap.error_visible { "!!" } else { "  " };
            format!("{marker} Error: {}\n   id: {}\n", err.message(), err.id())
        }
    }
}

fn format_card(report: &WeatherReport, today: NaiveDate) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}  {}\n", icon(report.condition), report.location));
    out.push_str(&format!("    {}\n\n", format_date(today)));
    out.push_str(&format!("    {} °C\n", report.temperature_text()));
    out.push_str(&format!("    {}\n\n", capitalize(&report.description)));
    out.push_str(&format!(
        "    Visibility {:<10} Feels like {} °C\n",
        report.visibility_text(),
        report.feels_like_text()
    ));
    out.push_str(&format!(
        "    Humidity   {:<10} Wind {}\n",
        report.humidity_text(),
        report.wind_text()
    ));

    out
}

fn icon(condition: Condition) -> &'static str {
    match condition {
        Condition::Clouds => "☁",
        Condition::Haze => "🌫",
        Condition::Rain => "🌧",
        Condition::Clear => "☀",
        Condition::Drizzle => "🌦",
        Condition::Snow => "❄",
        Condition::Thunder => "⛈",
    }
}

/// `d/m/yyyy`, no zero padding.
fn format_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.day(), date.month(), date.year())
}

/// Uppercase the first letter of every word.
fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::RequestError;

    fn london() -> CurrentWeather {
        serde_json::from_str(
            r#"{"name":"London","sys":{"country":"GB"},
                "main":{"temp":15.4,"feels_like":14.1,"humidity":70},
                "weather":[{"main":"Rain","description":"light rain"}],
                "visibility":10000,"wind":{"speed":3.1}}"#,
        )
        .unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
    }

    #[test]
    fn card_shows_all_fields() {
        let snap = Snapshot { attempt: 1, state: RequestState::Succeeded(london()), error_visible: false };
        let out = format_snapshot(&snap, day());

        assert!(out.contains("🌧  London, GB"));
        assert!(out.contains("7/3/2024"));
        assert!(out.contains("15 °C"));
        assert!(out.contains("Light Rain"));
        assert!(out.contains("10Km"));
        assert!(out.contains("Feels like 14 °C"));
        assert!(out.contains("70%"));
        assert!(out.contains("Wind 3.1m/s"));
    }

    #[test]
    fn visible_error_is_highlighted() {
        let err = RequestError::new("Request failed with status 404 Not Found: city not found");
        let mut snap: Snapshot<CurrentWeather> =
            Snapshot { attempt: 2, state: RequestState::Failed(err.clone()), error_visible: true };

        let out = format_snapshot(&snap, day());
        assert!(out.starts_with("!! Error: Request failed with status 404"));
        assert!(out.contains(&err.id().to_string()));

        snap.error_visible = false;
        assert!(format_snapshot(&snap, day()).starts_with("   Error:"));
    }

    #[test]
    fn loading_and_idle() {
        let loading: Snapshot<CurrentWeather> =
            Snapshot { attempt: 1, state: RequestState::Loading, error_visible: false };
        assert_eq!(format_snapshot(&loading, day()), "Loading...\n");

        let idle: Snapshot<CurrentWeather> =
            Snapshot { attempt: 0, state: RequestState::Idle, error_visible: false };
        assert!(format_snapshot(&idle, day()).is_empty());
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("overcast clouds"), "Overcast Clouds");
        assert_eq!(capitalize(""), "");
    }
}
