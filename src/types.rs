use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::validator::{
    validate_absolute_url, validate_ec_level, validate_hex_color, validate_output_format,
};

pub const DEFAULT_SIZE: u32 = 300;
pub const DEFAULT_MARGIN: u32 = 4;
pub const DEFAULT_DARK_COLOR: &str = "#000000";
pub const DEFAULT_LIGHT_COLOR: &str = "#ffffff";

/// Generation request as received over the wire. Everything except `url`
/// is optional; omitted fields pick up their documented default during
/// [`QrRequest::into_config`]. A field that is present but invalid is a
/// hard failure, never silently defaulted.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QrRequest {
    #[serde(default)]
    #[validate(custom(function = validate_absolute_url))]
    pub url: String,

    #[validate(custom(function = validate_output_format))]
    pub format: Option<String>,

    #[validate(range(min = 100, max = 2000))]
    pub size: Option<u32>,

    #[validate(custom(function = validate_hex_color))]
    pub dark_color: Option<String>,

    #[validate(custom(function = validate_hex_color))]
    pub light_color: Option<String>,

    #[validate(custom(function = validate_ec_level))]
    pub error_correction_level: Option<String>,

    #[validate(range(min = 0, max = 10))]
    pub margin: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Svg,
    DataUrl,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
            OutputFormat::DataUrl => "dataURL",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            "dataURL" => Ok(OutputFormat::DataUrl),
            _ => {
                let mut err = ValidationError::new("invalid_format");
                err.message = Some("must be one of png, svg, dataURL".into());
                err.add_param("value".into(), &value);
                Err(err)
            }
        }
    }
}

/// QR symbol redundancy tier, low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcLevel {
    L,
    M,
    Q,
    H,
}

impl std::str::FromStr for EcLevel {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "L" => Ok(EcLevel::L),
            "M" => Ok(EcLevel::M),
            "Q" => Ok(EcLevel::Q),
            "H" => Ok(EcLevel::H),
            _ => {
                let mut err = ValidationError::new("invalid_error_correction_level");
                err.message = Some("must be one of L, M, Q, H".into());
                err.add_param("value".into(), &value);
                Err(err)
            }
        }
    }
}

/// Fully-defaulted generation parameters. Only produced by
/// [`QrRequest::into_config`], so every field is present and in range.
#[derive(Debug, Clone, PartialEq)]
pub struct QrConfig {
    pub url: String,
    pub format: OutputFormat,
    pub size: u32,
    pub dark_color: String,
    pub light_color: String,
    pub error_correction_level: EcLevel,
    pub margin: u32,
}

impl QrRequest {
    /// Validates the raw request and fills in defaults. Pure; collects
    /// every failing field rather than stopping at the first.
    pub fn into_config(self) -> Result<QrConfig, ValidationErrors> {
        self.validate()?;

        let format = match self.format.as_deref() {
            Some(raw) => raw.parse().map_err(|e| field_errors("format", e))?,
            None => OutputFormat::Png,
        };
        let error_correction_level = match self.error_correction_level.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|e| field_errors("error_correction_level", e))?,
            None => EcLevel::M,
        };

        Ok(QrConfig {
            url: self.url,
            format,
            size: self.size.unwrap_or(DEFAULT_SIZE),
            dark_color: self
                .dark_color
                .unwrap_or_else(|| DEFAULT_DARK_COLOR.to_string()),
            light_color: self
                .light_color
                .unwrap_or_else(|| DEFAULT_LIGHT_COLOR.to_string()),
            error_correction_level,
            margin: self.margin.unwrap_or(DEFAULT_MARGIN),
        })
    }
}

fn field_errors(field: &'static str, error: ValidationError) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field.into(), error);
    errors
}

#[derive(Debug, Serialize)]
pub struct DataUrlResponse {
    pub success: bool,
    #[serde(rename = "dataURL")]
    pub data_url: String,
}
