use std::cell::RefCell;

use tempo_core::{LocationError, WeatherError, WeatherModel, WeatherObserver};

/// Prints lookup results and remembers whether the lookup failed.
#[derive(Debug, Default)]
pub struct TerminalObserver {
    failure: RefCell<Option<String>>,
}

impl TerminalObserver {
    /// Turn a reported failure into the process exit status.
    pub fn finish(self) -> anyhow::Result<()> {
        match self.failure.into_inner() {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(()),
        }
    }
}

impl WeatherObserver for TerminalObserver {
    fn on_weather_updated(&self, model: WeatherModel) {
        println!("{}", render(&model));
    }

    fn on_error(&self, error: WeatherError) {
        eprintln!("Ooops! Something went wrong, please try again.");
        if let WeatherError::Location(LocationError::PermissionDenied) = error {
            eprintln!("Open the system settings to allow location access.");
        }
        *self.failure.borrow_mut() = Some(error.to_string());
    }
}

pub fn render(model: &WeatherModel) -> String {
    format!(
        "{}\n{}  {}  [{}]",
        model.city_name,
        model.temperature_label(),
        model.condition_description,
        model.category(),
    )
}
