/// Error types for the Aero-Cast core library
use thiserror::Error;

/// Main error type for data loading and parsing
#[derive(Error, Debug)]
pub enum AeroError {
    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse GeoJSON data
    #[error("Failed to parse GeoJSON: {0}")]
    GeoJsonParse(#[from] geojson::Error),

    /// GeoJSON parsed but carries no usable features
    #[error("GeoJSON document has no features")]
    EmptyGeoJson,

    /// Fetch returned a non-success status
    #[error("Fetch of {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Network or transport failure
    #[error("Fetch of {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    /// Failed to decode a response body
    #[error("Failed to decode {0}")]
    Decode(String),

    /// Timestamp text does not match `YYYY-MM-DDTHH:00:00`
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Year-month text does not match `YYYY-MM`
    #[error("Invalid year-month: {0}")]
    InvalidYearMonth(String),
}

/// Type alias for Results using AeroError
pub type Result<T> = std::result::Result<T, AeroError>;
