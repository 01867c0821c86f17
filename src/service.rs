use reqwest::Client;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::error::{AgroError, AgroResult};
use crate::formatters::{format_crops, format_normals, format_report};
use crate::models::{ForecastResponse, GetAgroReportRequest, GetClimateNormalsRequest, OutputFormat};
use crate::reference::{find_crop, Month, CROPS, PLOVDIV_NORMALS};
use crate::report::{build_report, ReportOptions};

/// Main agro weather service that handles MCP requests
#[derive(Clone)]
pub struct AgroWeather {
    client: Arc<Client>,
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

impl AgroWeather {
    /// Creates a new service instance
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        })
    }

    /// Makes an HTTP GET request and deserializes the JSON response
    async fn make_request<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> AgroResult<T> {
        let response = self.client.get(url).query(query).send().await?;

        if !response.status().is_success() {
            return Err(AgroError::SourceUnavailable(format!(
                "Request failed with status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AgroError::InvalidPayload(e.to_string()))
    }

    /// Fetches the 5 day / 3 hour forecast for a city from OpenWeatherMap
    async fn fetch_forecast(&self, city: &str) -> AgroResult<ForecastResponse> {
        let api_key = self.config.api_key().ok_or(AgroError::MissingApiKey)?;
        let url = format!("{}/forecast", self.config.openweathermap.api_base);

        tracing::info!("Fetching forecast for {}", city);
        self.make_request::<ForecastResponse>(
            &url,
            &[("q", city), ("appid", api_key), ("units", "metric")],
        )
        .await
    }
}

/// Fills a report request from configuration defaults.
///
/// An explicit base temperature wins over the crop's; otherwise the crop
/// must be known.
pub fn resolve_options(
    request: &GetAgroReportRequest,
    config: &Config,
    current_month: Month,
) -> AgroResult<ReportOptions> {
    let city = request
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(&config.defaults.city)
        .to_string();

    let month = request
        .month
        .clone()
        .unwrap_or_else(|| current_month.name().to_string());

    let (crop, base_temperature) = match request.base_temperature {
        Some(base) => (request.crop.clone(), base),
        None => {
            let name = request.crop.as_deref().unwrap_or(&config.defaults.crop);
            let profile = find_crop(name)?;
            (Some(profile.name.to_string()), profile.base_temp)
        }
    };

    let mut thresholds = config.thresholds.clone();
    if let Some(frost) = request.frost_threshold {
        thresholds.frost_alarm = frost;
    }
    if let Some(tolerance) = request.tolerance {
        thresholds.rainfall_tolerance = tolerance;
    }

    Ok(ReportOptions {
        city,
        month,
        crop,
        base_temperature,
        thresholds,
    })
}

fn current_month() -> Month {
    use chrono::Datelike;
    Month::from_number(chrono::Local::now().month()).unwrap_or(Month::January)
}

#[tool_handler]
impl ServerHandler for AgroWeather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-agro-weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Agronomic weather service powered by the OpenWeatherMap 5 day forecast. \
                Summarizes the forecast per day, accumulates growing degree days for a crop, \
                and raises frost, heat, spraying, rain and climate-normal advisories."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl AgroWeather {
    /// Builds the daily summary, GDD and advisories for a city
    #[tool(description = "Get a daily forecast summary with growing degree days and farm advisories (frost, heat stress, spraying windows, rain outlook, comparison with climate normals) for a city. All parameters are optional: city (e.g. 'Plovdiv'), month for the normals comparison (e.g. 'May', defaults to the current month), crop (see list_crops) or base_temperature in °C, frost_threshold in °C (default 2.0), tolerance ('dashboard' or 'farmer'), format ('text' or 'json').")]
    async fn get_agro_report(
        &self,
        Parameters(request): Parameters<GetAgroReportRequest>,
    ) -> Result<CallToolResult, McpError> {
        let options = resolve_options(&request, &self.config, current_month())?;
        tracing::info!(
            "Building agro report for {} (month {}, base {}\u{00b0}C)",
            options.city,
            options.month,
            options.base_temperature
        );

        let payload = self.fetch_forecast(&options.city).await?;
        let report = build_report(&payload, &options, &PLOVDIV_NORMALS);

        let output = match request.format.unwrap_or_default() {
            OutputFormat::Text => format_report(&report),
            OutputFormat::Json => serde_json::to_string_pretty(&report).map_err(|e| {
                McpError::internal_error(format!("Failed to serialize report: {}", e), None)
            })?,
        };

        Ok(CallToolResult::success(vec![Content::text(output)]))
    }

    /// Lists monthly climate normals
    #[tool(description = "Get the monthly climate normals (average temperature, rainy days, frost days) used for comparisons. Provide a month name (e.g. 'March') or omit it to list all months.")]
    async fn get_climate_normals(
        &self,
        Parameters(request): Parameters<GetClimateNormalsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("Getting climate normals for {:?}", request.month);

        let formatted = match request.month.as_deref() {
            Some(month) => format_normals([PLOVDIV_NORMALS.lookup(month)?]),
            None => format_normals(PLOVDIV_NORMALS.iter()),
        };

        Ok(CallToolResult::success(vec![Content::text(formatted)]))
    }

    /// Lists supported crops
    #[tool(description = "List the supported crops and their growing degree day base temperatures.")]
    async fn list_crops(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("Listing crops");
        Ok(CallToolResult::success(vec![Content::text(format_crops(CROPS))]))
    }
}
