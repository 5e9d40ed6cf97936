//! Error types for the bonsai crate

use thiserror::Error;

use crate::care::CareError;
use crate::dna::{Species, Stage};

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Species table has no entry for {0:?}")]
    MissingSpecies(Species),

    #[error("Stage table has no entry for {0:?}")]
    MissingStage(Stage),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Care action rejected: {0}")]
    Care(#[from] CareError),
}
