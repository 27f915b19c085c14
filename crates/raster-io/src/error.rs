//! Error types for the raster I/O seam.

use thiserror::Error;

/// Errors surfaced by raster drivers, aligned views, and scratch stores.
#[derive(Error, Debug)]
pub enum RasterIoError {
    #[error("failed to open raster source: {0}")]
    Open(String),

    #[error("failed to read raster data: {0}")]
    Read(String),

    #[error("failed to build aligned view: {0}")]
    Warp(String),

    #[error("coordinate transform failed: {0}")]
    Transform(String),

    #[error("scratch resource error: {0}")]
    Scratch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Escape hatch for driver backends wrapping third-party errors.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RasterIoError {
    /// Create an Open error.
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open(msg.into())
    }

    /// Create a Read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Create a Warp error.
    pub fn warp(msg: impl Into<String>) -> Self {
        Self::Warp(msg.into())
    }

    /// Create a Transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create a Scratch error.
    pub fn scratch(msg: impl Into<String>) -> Self {
        Self::Scratch(msg.into())
    }
}

/// Result type for raster I/O operations.
pub type Result<T> = std::result::Result<T, RasterIoError>;
