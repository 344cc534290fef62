//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use snaptrack::domain::DEFAULT_ROOM_CAPACITY;
use snaptrack::outbound::images::{CloudinaryCredentials, DEFAULT_CLOUDINARY_API_BASE};
use snaptrack::outbound::persistence::DbPool;
use snaptrack::outbound::security::TokenSecret;
use snaptrack::settings::DEFAULT_UPLOAD_LIMIT_BYTES;
use url::Url;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) token_secret: TokenSecret,
    pub(crate) cloudinary: Option<CloudinaryCredentials>,
    pub(crate) cloudinary_api_base: Option<Url>,
    pub(crate) ws_allowed_origins: Vec<Url>,
    pub(crate) room_capacity: usize,
    pub(crate) upload_limit_bytes: usize,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Configuration with image uploads disabled, any WebSocket origin
    /// accepted and default room and body limits.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, token_secret: TokenSecret) -> Self {
        Self {
            bind_addr,
            db_pool,
            token_secret,
            cloudinary: None,
            cloudinary_api_base: None,
            ws_allowed_origins: Vec::new(),
            room_capacity: DEFAULT_ROOM_CAPACITY,
            upload_limit_bytes: DEFAULT_UPLOAD_LIMIT_BYTES,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach Cloudinary credentials and the REST base they are used against.
    #[must_use]
    pub fn with_cloudinary(
        mut self,
        credentials: Option<CloudinaryCredentials>,
        api_base: Url,
    ) -> Self {
        self.cloudinary = credentials;
        self.cloudinary_api_base = Some(api_base);
        self
    }

    /// Restrict WebSocket upgrades to the listed origins.
    #[must_use]
    pub fn with_ws_allowed_origins(mut self, origins: Vec<Url>) -> Self {
        self.ws_allowed_origins = origins;
        self
    }

    #[must_use]
    pub fn with_room_capacity(mut self, capacity: usize) -> Self {
        self.room_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit_bytes = bytes.max(1);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub(crate) fn cloudinary_api_base(&self) -> Result<Url, url::ParseError> {
        match &self.cloudinary_api_base {
            Some(base) => Ok(base.clone()),
            None => Url::parse(DEFAULT_CLOUDINARY_API_BASE),
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
