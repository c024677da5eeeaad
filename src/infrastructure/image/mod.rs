//! Image handling infrastructure.
//!
//! This module provides:
//! - Remote image download over HTTP
//! - Decoding and rescaling with the `image` crate

pub mod fetcher;
pub mod scaler;

pub use fetcher::HttpImageFetcher;
pub use scaler::ImageCrateScaler;
