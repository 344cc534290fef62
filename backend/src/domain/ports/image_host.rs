//! Port for the external image hosting service.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image host adapters.
    pub enum ImageHostError {
        /// No credentials were configured for the host.
        NotConfigured => "image host is not configured",
        /// The host answered but refused the request.
        Rejected { message: String } => "image host rejected the request: {message}",
        /// The host could not be reached or answered garbage.
        Transport { message: String } => "image host request failed: {message}",
    }
}

/// Raw image handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub folder: String,
}

/// Location of an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedImage {
    pub url: String,
    pub public_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Upload `image` and return its public location.
    async fn upload(&self, image: ImageUpload) -> Result<HostedImage, ImageHostError>;

    /// Remove a previously uploaded image.
    async fn destroy(&self, public_id: &str) -> Result<(), ImageHostError>;

    /// Derive the public id of an image from its hosted URL.
    fn public_id_from_url(&self, url: &str) -> Option<String>;
}
