/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What to look up. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl WeatherQuery {
    pub fn city(name: impl Into<String>) -> Self {
        WeatherQuery::City(name.into())
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        WeatherQuery::Coordinates(Coordinates::new(latitude, longitude))
    }
}

/// Display-ready current conditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherModel {
    pub city_name: String,
    pub temperature_celsius: i32,
    pub condition_id: u32,
    pub condition_description: String,
}

impl WeatherModel {
    pub fn category(&self) -> ConditionCategory {
        ConditionCategory::from_condition_id(self.condition_id)
    }

    pub fn icon_name(&self) -> &'static str {
        self.category().icon_name()
    }

    pub fn background_name(&self) -> &'static str {
        self.category().background_name()
    }

    /// Temperature as shown to the user, e.g. `21°C`.
    pub fn temperature_label(&self) -> String {
        format!("{}°C", self.temperature_celsius)
    }
}

/// Coarse weather category derived from the provider's condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionCategory {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clouds,
    Clear,
}

impl ConditionCategory {
    pub fn from_condition_id(id: u32) -> Self {
        match id {
            200..=232 => ConditionCategory::Thunderstorm,
            300..=321 => ConditionCategory::Drizzle,
            500..=531 => ConditionCategory::Rain,
            600..=622 => ConditionCategory::Snow,
            701..=781 => ConditionCategory::Atmosphere,
            801..=804 => ConditionCategory::Clouds,
            _ => ConditionCategory::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.background_name()
    }

    /// Name of the icon asset for this category.
    pub fn icon_name(&self) -> &'static str {
        match self {
            ConditionCategory::Thunderstorm => "imThunderstorm",
            ConditionCategory::Drizzle => "imDrizzle",
            ConditionCategory::Rain => "imRain",
            ConditionCategory::Snow => "imSnow",
            ConditionCategory::Atmosphere => "imAtmosphere",
            ConditionCategory::Clouds => "imClouds",
            ConditionCategory::Clear => "imClear",
        }
    }

    /// Name of the background asset for this category.
    pub fn background_name(&self) -> &'static str {
        match self {
            ConditionCategory::Thunderstorm => "Thunderstorm",
            ConditionCategory::Drizzle => "Drizzle",
            ConditionCategory::Rain => "Rain",
            ConditionCategory::Snow => "Snow",
            ConditionCategory::Atmosphere => "Atmosphere",
            ConditionCategory::Clouds => "Clouds",
            ConditionCategory::Clear => "Clear",
        }
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds half away from zero, so `-0.5` becomes `-1`.
pub fn round_temperature(celsius: f64) -> i32 {
    celsius.round() as i32
}
