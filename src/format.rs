use crate::client::Weather;

use time::PrimitiveDateTime;

/// Render a weather reading as the display text shown to the user and kept in the history.
pub fn format_weather(weather: &Weather) -> String {
    format!(
        "{}, temperature {}°C, {}\nSunrise: {}\nSunset: {}\n",
        weather.city,
        format_temperature(weather.temperature),
        weather.weather_type,
        format_clock_time(&weather.sunrise),
        format_clock_time(&weather.sunset),
    )
}

fn format_temperature(degrees: i32) -> String {
    if degrees > 0 {
        format!("+{degrees}")
    } else {
        degrees.to_string()
    }
}

fn format_clock_time(ts: &PrimitiveDateTime) -> String {
    format!("{:02}:{:02}", ts.hour(), ts.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WeatherType;
    use time::macros::datetime;

    fn weather(temperature: i32, weather_type: WeatherType) -> Weather {
        Weather {
            city: "Moscow".to_string(),
            temperature,
            weather_type,
            sunrise: datetime!(2024-03-01 07:21),
            sunset: datetime!(2024-03-01 18:05),
        }
    }

    #[test]
    fn test_format_weather() {
        assert_eq!(
            format_weather(&weather(10, WeatherType::Rain)),
            "Moscow, temperature +10°C, Rain\nSunrise: 07:21\nSunset: 18:05\n"
        );
    }

    #[test]
    fn test_format_temperature_sign() {
        assert_eq!(format_temperature(10), "+10");
        assert_eq!(format_temperature(0), "0");
        assert_eq!(format_temperature(-3), "-3");
    }

    #[test]
    fn test_format_weather_below_zero() {
        let text = format_weather(&weather(-12, WeatherType::Snow));
        assert!(text.starts_with("Moscow, temperature -12°C, Snow\n"));
    }
}
