// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the navigation core

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Detector-related errors
    Detector(DetectorError),
    /// Store persistence errors
    Store(StoreError),
    /// Configuration errors
    Config(String),
    /// Image loading or conversion errors
    Image(String),
    /// Generic error with message
    Other(String),
}

/// Detector-specific errors
#[derive(Debug, Clone)]
pub enum DetectorError {
    /// The detection module failed to load
    ModuleLoadFailed(String),
    /// A call was issued before the readiness signal
    NotReady,
    /// The worker channel is closed (worker thread exited)
    WorkerGone,
}

/// Store persistence errors
#[derive(Debug, Clone)]
pub enum StoreError {
    /// Underlying filesystem error
    Io(String),
    /// Stored payload could not be parsed
    Parse(String),
    /// No usable data directory could be resolved
    NoDataDir,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Detector(e) => write!(f, "Detector error: {}", e),
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DetectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorError::ModuleLoadFailed(msg) => write!(f, "Module load failed: {}", msg),
            DetectorError::NotReady => write!(f, "Detector is not ready"),
            DetectorError::WorkerGone => write!(f, "Detector worker has shut down"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(msg) => write!(f, "I/O error: {}", msg),
            StoreError::Parse(msg) => write!(f, "Parse error: {}", msg),
            StoreError::NoDataDir => write!(f, "No data directory available"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DetectorError {}
impl std::error::Error for StoreError {}

impl From<DetectorError> for AppError {
    fn from(e: DetectorError) -> Self {
        AppError::Detector(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}
