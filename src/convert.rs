//! Document-conversion proxy.
//!
//! A thin pass-through to the external conversion service. The only logic
//! of our own is a reachability pre-probe (the converter fetches the
//! document itself, so a URL only resolvable from this host is a guaranteed
//! failure) and conversion-mode selection from the file extension. Failures
//! are surfaced directly; there are no retries.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::tokens::WhiteboardConfig;

/// Timeout for the HEAD reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for calls to the conversion API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the converter should process a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Page-by-page images
    Static,
    /// Animated slides (ppt/pptx)
    Dynamic,
}

impl ConversionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionMode::Static => "static",
            ConversionMode::Dynamic => "dynamic",
        }
    }

    /// Pick a mode from the file extension: slide decks convert
    /// dynamically, everything else statically.
    pub fn for_file(file_name: &str) -> Self {
        let ext = file_name
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "ppt" | "pptx" => ConversionMode::Dynamic,
            _ => ConversionMode::Static,
        }
    }

    fn from_override(param: &str) -> Option<Self> {
        match param {
            "static" => Some(ConversionMode::Static),
            "dynamic" => Some(ConversionMode::Dynamic),
            _ => None,
        }
    }
}

/// Caller-supplied conversion overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Mode override (`static` or `dynamic`)
    #[serde(rename = "type")]
    pub mode: Option<String>,
    pub scale: Option<f64>,
    pub output_format: Option<String>,
}

/// A successfully submitted conversion task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedConversion {
    pub task_uuid: String,
    #[serde(rename = "type")]
    pub mode: ConversionMode,
}

/// Errors from the conversion proxy.
#[derive(Debug)]
pub enum ConvertError {
    /// Whiteboard credentials absent; nothing can be submitted
    Unconfigured,
    /// The document URL does not parse
    InvalidUrl(String),
    /// The document URL points at a loopback host the converter cannot reach
    LocalUrl(String),
    /// The reachability probe failed
    Unreachable(String),
    /// The external API answered with a non-success status
    Upstream { status: u16, detail: String },
    /// The external API could not be reached at all
    Transport(reqwest::Error),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::Unconfigured => write!(f, "Whiteboard credentials are not configured"),
            ConvertError::InvalidUrl(url) => write!(f, "Invalid document URL: {}", url),
            ConvertError::LocalUrl(host) => write!(
                f,
                "Document URL host '{}' is local to this machine; the conversion service \
                 cannot reach it. Serve the file from a publicly resolvable URL",
                host
            ),
            ConvertError::Unreachable(detail) => write!(
                f,
                "Document URL is not reachable ({}). The conversion service must be able \
                 to download it",
                detail
            ),
            ConvertError::Upstream { status, detail } => {
                write!(f, "Conversion service error (status {}): {}", status, detail)
            }
            ConvertError::Transport(e) => write!(f, "Conversion service unreachable: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Return the loopback host of a URL, if it has one.
fn loopback_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let is_loopback = match url.host()? {
        url::Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
        url::Host::Ipv4(ip) => ip.is_loopback(),
        url::Host::Ipv6(ip) => ip.is_loopback(),
    };
    is_loopback.then(|| host.to_string())
}

/// Client for the external conversion API.
pub struct ConversionClient {
    http: reqwest::Client,
    api_base: String,
    credentials: WhiteboardConfig,
}

impl ConversionClient {
    pub fn new(api_base: &str, credentials: WhiteboardConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/services/conversion/tasks", self.api_base)
    }

    fn api_token(&self) -> Result<String, ConvertError> {
        self.credentials
            .api_token()
            .map_err(|_| ConvertError::Unconfigured)
    }

    /// Submit a conversion task for `file_url`. Checks that the URL is
    /// plausibly reachable from the outside before contacting the service.
    pub async fn start(
        &self,
        file_url: &str,
        file_name: &str,
        options: &ConversionOptions,
    ) -> Result<StartedConversion, ConvertError> {
        let token = self.api_token()?;

        let url = Url::parse(file_url)
            .map_err(|_| ConvertError::InvalidUrl(file_url.to_string()))?;
        if let Some(host) = loopback_host(&url) {
            return Err(ConvertError::LocalUrl(host));
        }

        let probe = self
            .http
            .head(file_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ConvertError::Unreachable(e.to_string()))?;
        if !probe.status().is_success() {
            return Err(ConvertError::Unreachable(format!(
                "HEAD returned {}",
                probe.status()
            )));
        }

        let mode = options
            .mode
            .as_deref()
            .and_then(ConversionMode::from_override)
            .unwrap_or_else(|| ConversionMode::for_file(file_name));

        let mut body = serde_json::json!({
            "resource": file_url,
            "type": mode.as_str(),
        });
        if mode == ConversionMode::Static {
            body["scale"] = serde_json::json!(options.scale.unwrap_or(1.2));
            body["outputFormat"] =
                serde_json::json!(options.output_format.as_deref().unwrap_or("png"));
        }

        let response = self
            .http
            .post(self.tasks_url())
            .header("token", token)
            .json(&body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(ConvertError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConvertError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let payload: serde_json::Value =
            response.json().await.map_err(ConvertError::Transport)?;
        let task_uuid = payload
            .get("uuid")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(StartedConversion { task_uuid, mode })
    }

    /// Query the status of a conversion task and relay the upstream payload
    /// verbatim.
    pub async fn poll(&self, task_uuid: &str) -> Result<serde_json::Value, ConvertError> {
        let token = self.api_token()?;

        let response = self
            .http
            .get(format!("{}/{}", self.tasks_url(), task_uuid))
            .header("token", token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(ConvertError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ConvertError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        response.json().await.map_err(ConvertError::Transport)
    }
}
