//! Signed, time-limited download links for private Cloudinary assets.
//!
//! ```ignore
//! use media::{CloudinaryConfig, CloudinarySigner, DownloadRequest, UrlSigner};
//! use core_config::FromEnv;
//!
//! let signer = CloudinarySigner::new(CloudinaryConfig::from_env()?);
//! let url = signer.signed_download_url(&DownloadRequest::video("lessons/opener"))?;
//! ```

pub mod cloudinary;
pub mod config;
pub mod error;

pub use cloudinary::{CloudinarySigner, DownloadRequest, UrlSigner};
pub use config::{CloudinaryConfig, SignatureAlgorithm};
pub use error::{MediaError, MediaResult};
