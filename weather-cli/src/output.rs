use weather_core::{NotificationSurface, WeatherSnapshot};

/// Lines shown for a snapshot; nothing when there is no snapshot.
///
/// Humidity is carried in the snapshot but not displayed.
pub fn render(snapshot: Option<&WeatherSnapshot>) -> Vec<String> {
    let Some(s) = snapshot else {
        return Vec::new();
    };

    vec![
        format!("Temperature: {}°C", s.temperature_celsius),
        format!("Conditions: {}", s.conditions),
        format!("Wind Speed: {} m/s", s.wind_speed_mps),
    ]
}

pub fn print_snapshot(snapshot: Option<&WeatherSnapshot>) {
    for line in render(snapshot) {
        println!("{line}");
    }
}

/// Reports failed searches on stderr.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl NotificationSurface for TerminalNotifier {
    fn alert(&self, title: &str, message: &str) {
        eprintln!("{title}: {message}");
    }
}
