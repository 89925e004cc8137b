//! Unified error type for the filament tracker.
//!
//! Lookup and validation failures carry enough context to be shown to a user
//! directly. Store failures are passed through unchanged.

use thiserror::Error;

/// Errors produced by the core, configuration and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A required field was missing or a value was out of range
    #[error("Validation error: {message}")]
    Validation {
        /// Which rule was violated
        message: String,
    },

    /// A gram amount was negative, NaN or infinite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No filament exists with the given id
    #[error("Filament not found: {id}")]
    FilamentNotFound {
        /// Requested filament id
        id: i64,
    },

    /// No spool exists with the given id
    #[error("Spool not found: {id}")]
    SpoolNotFound {
        /// Requested spool id
        id: i64,
    },

    /// No brand exists with the given id
    #[error("Brand not found: {id}")]
    BrandNotFound {
        /// Requested brand id
        id: i64,
    },

    /// No reusable spool body exists with the given id
    #[error("Reusable spool not found: {id}")]
    ReusableSpoolNotFound {
        /// Requested container id
        id: i64,
    },

    /// Usage was recorded against a filament without any usable spool
    #[error("No stock available for filament {filament_id}")]
    NoStockAvailable {
        /// Filament the usage was recorded against
        filament_id: i64,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// CSV reading or writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable missing
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting into a string buffer failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Returns true for the "referenced entity does not exist" family.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FilamentNotFound { .. }
                | Self::SpoolNotFound { .. }
                | Self::BrandNotFound { .. }
                | Self::ReusableSpoolNotFound { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
