//! Human-facing rendering of link events.

use owo_colors::OwoColorize;
use time::macros::format_description;

use feedflow_link::{FeedLevel, Thresholds, WaterTempLevel};
use feedflow_types::{Reading, StatusEvent, StatusKind};

/// One line per telemetry sample, with banded coloring.
pub fn reading_line(reading: &Reading, thresholds: &Thresholds) -> String {
    let (temp_level, feed_level) = thresholds.evaluate_reading(reading);

    let time = reading
        .captured_at
        .and_then(|at| {
            at.format(format_description!("[hour]:[minute]:[second]"))
                .ok()
        })
        .unwrap_or_else(|| "--:--:--".to_string());

    let temp = format!("{:.1} °C", reading.temperature_c);
    let temp = match temp_level {
        WaterTempLevel::Optimal => temp.green().to_string(),
        WaterTempLevel::AboveOptimal => temp.yellow().to_string(),
        WaterTempLevel::Critical => temp.red().to_string(),
        WaterTempLevel::TooCold => temp.blue().to_string(),
    };

    let hopper = format!("{:.2} kg", reading.weight_kg);
    let hopper = match feed_level {
        FeedLevel::Sufficient => hopper.green().to_string(),
        FeedLevel::RefillSoon => hopper.yellow().to_string(),
        FeedLevel::Critical => hopper.red().to_string(),
    };

    let feeding = if reading.feeding_active {
        "  FEEDING".bold().to_string()
    } else {
        String::new()
    };

    format!(
        "{time}  water {temp} ({})  hopper {hopper} ({})  servo {:>3}°{feeding}",
        temp_level.description(),
        feed_level.description(),
        reading.servo_position,
    )
}

/// One line per status token.
pub fn status_line(status: &StatusEvent) -> String {
    let rendered = match status.kind() {
        StatusKind::FeedingStarted => status.code.cyan().to_string(),
        StatusKind::FeedingDone => status.code.green().to_string(),
        StatusKind::FeedTimeout => status.code.red().to_string(),
        _ => status.code.clone(),
    };
    format!("-- {rendered}")
}
