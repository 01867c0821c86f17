/// User agent string for HTTP requests
pub const USER_AGENT: &str = "mcp-agro-weather-server/0.1.0";

/// OpenWeatherMap API base URL
pub const OPENWEATHERMAP_API_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// City used when neither the caller nor the configuration names one
pub const DEFAULT_CITY: &str = "Plovdiv";

/// Crop used when neither the caller nor the configuration names one
pub const DEFAULT_CROP: &str = "maize";

/// Upper bound on the number of daily summary rows
pub const MAX_SUMMARY_DAYS: usize = 7;

/// Visibility assumed when a sample omits it, in meters
pub const DEFAULT_VISIBILITY_M: f64 = 10_000.0;
