use crate::client::{Coordinates, ServiceError, Weather, WeatherService, WeatherType};
use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder};
use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

use std::time::Duration;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

pub struct OpenMeteoClient {
    city: String,
    http_client: Client,
}

impl OpenMeteoClient {
    pub fn new(city: String, timeout: Duration) -> Result<OpenMeteoClient, ServiceError> {
        Ok(OpenMeteoClient {
            city,
            http_client: ClientBuilder::new().gzip(true).timeout(timeout).build()?,
        })
    }

    /// Get the current conditions and today's sun times straight from the API
    fn get_from_api(&self, coordinates: &Coordinates) -> Result<OpenMeteoResponse, ServiceError> {
        let req = self
            .http_client
            .get(FORECAST_URL)
            .query(&[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
                ("daily", "sunrise,sunset".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
                ("temperature_unit", "celsius".to_string()),
            ])
            .build()?;
        let url = req.url().clone();
        info!("Calling OpenMeteo: {url}");
        let res = self.http_client.execute(req)?;
        match res.status() {
            StatusCode::OK => Ok(res.json()?),
            status => Err(ServiceError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// Convert an API response into a Weather reading for `city`
fn to_weather(city: &str, response: OpenMeteoResponse) -> Result<Weather, ServiceError> {
    let code = response.current.weather_code;
    let weather_type = weather_type_from_code(code)
        .ok_or_else(|| ServiceError::BadResponse(format!("unknown weather code {code}")))?;
    let sunrise = first_time(&response.daily.sunrise, "sunrise")?;
    let sunset = first_time(&response.daily.sunset, "sunset")?;

    Ok(Weather {
        city: city.to_string(),
        temperature: response.current.temperature_2m.round() as i32,
        weather_type,
        sunrise,
        sunset,
    })
}

impl WeatherService for OpenMeteoClient {
    fn get_weather(&mut self, coordinates: &Coordinates) -> Result<Weather, ServiceError> {
        let response = self.get_from_api(coordinates)?;
        debug!(
            "OpenMeteo answered for timezone {} in {}ms",
            response.timezone, response.generationtime_ms
        );
        to_weather(&self.city, response)
    }
}

/// Map a WMO weather interpretation code onto the coarse weather types we report
fn weather_type_from_code(code: u16) -> Option<WeatherType> {
    match code {
        0 | 1 => Some(WeatherType::Clear),
        2 | 3 => Some(WeatherType::Clouds),
        45 | 48 => Some(WeatherType::Fog),
        51..=57 => Some(WeatherType::Drizzle),
        61..=67 | 80..=82 => Some(WeatherType::Rain),
        71..=77 | 85 | 86 => Some(WeatherType::Snow),
        95..=99 => Some(WeatherType::Thunderstorm),
        _ => None,
    }
}

/// Parse the first entry of a daily time series, ie `2024-03-01T06:42`
fn first_time(values: &[String], field: &str) -> Result<PrimitiveDateTime, ServiceError> {
    let raw = values
        .first()
        .ok_or_else(|| ServiceError::BadResponse(format!("no {field} in daily data")))?;
    PrimitiveDateTime::parse(raw, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        .map_err(|err| ServiceError::BadResponse(format!("invalid {field} {raw:?}: {err}")))
}

/// API responses consist of a UTF-8-encoded, JSON-formatted object.  Only the fields we read are
/// modelled; the rest are ignored.
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    generationtime_ms: f32,
    timezone: String,
    current: Current,
    daily: Daily,
}

#[derive(Debug, Deserialize)]
struct Current {
    temperature_2m: f32,
    weather_code: u16,
}

#[derive(Debug, Deserialize)]
struct Daily {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const RESPONSE: &str = r#"{
        "latitude": 55.75,
        "longitude": 37.625,
        "generationtime_ms": 0.05,
        "utc_offset_seconds": 10800,
        "timezone": "Europe/Moscow",
        "timezone_abbreviation": "MSK",
        "elevation": 140.0,
        "current_units": {"time": "iso8601", "interval": "seconds", "temperature_2m": "°C", "weather_code": "wmo code"},
        "current": {"time": "2024-03-01T14:00", "interval": 900, "temperature_2m": 9.6, "weather_code": 63},
        "daily_units": {"time": "iso8601", "sunrise": "iso8601", "sunset": "iso8601"},
        "daily": {"time": ["2024-03-01"], "sunrise": ["2024-03-01T07:21"], "sunset": ["2024-03-01T18:05"]}
    }"#;

    #[test]
    fn test_to_weather() {
        let response: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        let weather = to_weather("Moscow", response).unwrap();

        assert_eq!(
            weather,
            Weather {
                city: "Moscow".to_string(),
                temperature: 10,
                weather_type: WeatherType::Rain,
                sunrise: datetime!(2024-03-01 07:21),
                sunset: datetime!(2024-03-01 18:05),
            }
        );
    }

    #[test]
    fn test_to_weather_unknown_code() {
        let mut response: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        response.current.weather_code = 42;

        match to_weather("Moscow", response) {
            Err(ServiceError::BadResponse(msg)) => assert!(msg.contains("42")),
            other => panic!("Expected bad response, got {other:?}"),
        }
    }

    #[test]
    fn test_to_weather_missing_sun_times() {
        let mut response: OpenMeteoResponse = serde_json::from_str(RESPONSE).unwrap();
        response.daily.sunset.clear();

        match to_weather("Moscow", response) {
            Err(ServiceError::BadResponse(msg)) => assert!(msg.contains("sunset")),
            other => panic!("Expected bad response, got {other:?}"),
        }
    }

    #[test]
    fn test_weather_type_from_code() {
        assert_eq!(weather_type_from_code(0), Some(WeatherType::Clear));
        assert_eq!(weather_type_from_code(3), Some(WeatherType::Clouds));
        assert_eq!(weather_type_from_code(48), Some(WeatherType::Fog));
        assert_eq!(weather_type_from_code(55), Some(WeatherType::Drizzle));
        assert_eq!(weather_type_from_code(81), Some(WeatherType::Rain));
        assert_eq!(weather_type_from_code(86), Some(WeatherType::Snow));
        assert_eq!(weather_type_from_code(99), Some(WeatherType::Thunderstorm));
        assert_eq!(weather_type_from_code(100), None);
    }
}
