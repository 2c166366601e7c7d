//! Captioning service boundary.
//!
//! The batch processor only sees [`CaptionService`]; the HTTP details of the
//! local model live in [`OllamaClient`].

mod client;
mod retry;

use std::path::Path;
use async_trait::async_trait;
use crate::utils::ServiceError;

pub use client::{CaptionConfig, OllamaClient};
pub use retry::RetryPolicy;

/// Something that turns an image into a text description.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Describes the image at `image`. May be slow and may fail transiently.
    async fn describe(&self, image: &Path) -> Result<String, ServiceError>;
}
