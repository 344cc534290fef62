//! Image hosting adapters.
//!
//! This module provides a thin HTTP implementation of the `ImageHost` port
//! against the Cloudinary REST API.

mod cloudinary;

pub use cloudinary::{CloudinaryCredentials, CloudinaryImageHost, DEFAULT_CLOUDINARY_API_BASE};
