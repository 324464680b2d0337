pub mod chat;
pub mod config;
pub mod desktop;
pub mod logger;
pub mod submission;

pub use chat::{ChatSnapshot, ContactChat, TurnOutcome};
pub use config::Config;
pub use desktop::{Catalog, Desktop, DesktopHandle, DesktopSnapshot};

use anyhow::Context;
use std::sync::Arc;

use crate::logger::Logger;
use crate::submission::HttpFormSubmitter;

/// Both controllers of one page visit.
pub struct Session {
    pub chat: ContactChat,
    pub desktop: DesktopHandle,
}

/// Wires the chat to the configured form endpoint and starts the desktop
/// tick task. Must be called from within a tokio runtime.
pub fn build_session(
    config: &Config,
    catalog: Arc<Catalog>,
    logger: Logger,
) -> anyhow::Result<Session> {
    let submitter = HttpFormSubmitter::from_config(&config.contact, logger.clone())
        .context("failed to build the contact form HTTP client")?;
    let chat = ContactChat::new(config.contact.clone(), Arc::new(submitter), logger.clone());
    let desktop = Desktop::new(catalog, &config.desktop, logger);
    Ok(Session {
        chat,
        desktop: DesktopHandle::spawn(desktop, config.desktop.tick_interval),
    })
}
