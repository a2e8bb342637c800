//! helmcurve-data: Loading and downloading HELM result files.
//!
//! Holds the task catalog, the on-disk data store that feeds
//! `helmcurve-core`, configuration, and the downloader for the public HELM
//! benchmark outputs.

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod store;

pub use catalog::{default_catalog, TaskCatalog, TaskSpec};
pub use config::{load_config, load_config_from, HelmcurveConfig};
pub use download::{DownloadSummary, Downloader};
pub use error::DataError;
pub use store::{load_model_params, DataStore};
