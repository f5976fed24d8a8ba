pub mod open_meteo;

use reqwest::StatusCode;
use time::PrimitiveDateTime;

use std::fmt;

pub trait WeatherService {
    fn get_weather(&mut self, coordinates: &Coordinates) -> Result<Weather, ServiceError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f32,
    pub longitude: f32,
}

/// A single reading of the current weather at a location
#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    /// Human-readable name of the place the reading is for
    pub city: String,
    /// Air temperature in whole degrees Celsius
    pub temperature: i32,
    pub weather_type: WeatherType,
    /// Sunrise in the location's local time
    pub sunrise: PrimitiveDateTime,
    /// Sunset in the location's local time
    pub sunset: PrimitiveDateTime,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WeatherType {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Fog,
    Clear,
    Clouds,
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeatherType::Thunderstorm => "Thunderstorm",
            WeatherType::Drizzle => "Drizzle",
            WeatherType::Rain => "Rain",
            WeatherType::Snow => "Snow",
            WeatherType::Fog => "Fog",
            WeatherType::Clear => "Clear",
            WeatherType::Clouds => "Clouds",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather API returned status {status} for URL {url}")]
    Status { status: StatusCode, url: String },
    #[error("unexpected weather API response: {0}")]
    BadResponse(String),
}
