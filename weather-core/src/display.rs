//! Text rendering of a [`WeatherRecord`] for terminal or label output.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use crate::model::WeatherRecord;

/// `"London, GB"`
pub fn location_line(record: &WeatherRecord) -> String {
    format!("{}, {}", record.location_name, record.country_code)
}

/// Current temperature with its unit, then `(max° | min°)` on a second line.
pub fn temperature_line(record: &WeatherRecord) -> String {
    format!(
        "{}°{}\n({}° | {}°)",
        record.temp,
        record.units.temperature_symbol(),
        record.temp_max,
        record.temp_min,
    )
}

pub fn feels_like_line(record: &WeatherRecord) -> String {
    let symbol = record.units.temperature_symbol();
    format!("Feels like {}°{symbol}", record.feels_like)
}

pub fn humidity_line(record: &WeatherRecord) -> String {
    format!("Humidity {}%", record.humidity_pct)
}

/// Wind in km/h, two decimals.
pub fn wind_line(record: &WeatherRecord) -> String {
    format!("Wind {:.2} km/h", record.wind_speed_kmh)
}

/// `"Clouds (broken clouds)"`
pub fn condition_line(record: &WeatherRecord) -> String {
    let main = &record.condition_main;
    format!("{main} ({})", record.condition_description)
}

/// Location of the icon image for this record inside `icon_dir`.
pub fn icon_path(record: &WeatherRecord, icon_dir: &Path) -> PathBuf {
    icon_dir.join(format!("{}.png", record.icon_id))
}

/// Full multi-line rendering, in display order.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a>(pub &'a WeatherRecord);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        writeln!(f, "{}", location_line(record))?;
        writeln!(f, "{}", temperature_line(record))?;
        writeln!(f, "{}", feels_like_line(record))?;
        writeln!(f, "{}", condition_line(record))?;
        writeln!(f, "{}", humidity_line(record))?;
        write!(f, "{}", wind_line(record))
    }
}
