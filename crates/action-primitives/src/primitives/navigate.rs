//! Navigate primitive - History moves followed by a bounded settle delay

use crate::{errors::ActionError, session::BrowserSession, waiting::settle};
use std::time::Duration;
use tracing::{debug, info};

/// Load `url` and give the remote page `delay` to render.
pub async fn navigate_and_settle(
    session: &dyn BrowserSession,
    url: &str,
    delay: Duration,
) -> Result<(), ActionError> {
    info!(url, "Navigating");
    session.navigate(url).await?;
    settle(delay).await;
    Ok(())
}

/// Step back in history and give the remote page `delay` to render.
pub async fn go_back_and_settle(
    session: &dyn BrowserSession,
    delay: Duration,
) -> Result<(), ActionError> {
    debug!("Navigating back");
    session.go_back().await?;
    settle(delay).await;
    Ok(())
}
