pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{
    animator::{NullAnimator, RecordingAnimator},
    emailjs::{DryRunSubmitter, EmailJsClient},
    theme_store::{FileThemeStore, MemoryThemeStore},
};
pub use app::{EventScript, Page, PageSnapshot};
pub use config::SiteConfig;
pub use crate::core::cards::{CardCoordinator, CardId, CardState, ExpansionView};
pub use domain::document::{Document, ElementSpec, NodeId};
pub use domain::model::{Theme, UiEvent};
pub use utils::error::{PortfolioError, Result};
