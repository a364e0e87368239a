//! Completion finalizer: confirm the finished lecture and release its tab.

use std::time::Duration;

use tracing::{info, warn};

use super::FINISH_BUTTON_XPATH;
use crate::notify::Notifier;
use crate::retry::{self, RetryPolicy};
use crate::session::{Selector, Session};
use crate::{Error, Result};

const ALERT_POLL: Duration = Duration::from_secs(1);
const ALERT_ATTEMPTS: u32 = 30;

/// Click the lecture's finish control and accept the confirmation dialog.
///
/// When the dialog never shows up, the tab is force-closed instead and the
/// lecture is still treated as finished; a diagnostic screenshot goes to the
/// notifier. Both paths end with the main tab active again.
pub async fn finalize<S: Session, N: Notifier>(
    session: &S,
    notifier: &N,
    main_window: &S::Window,
) -> Result<()> {
    session.leave_frame().await?;

    let finish = session.find(&Selector::xpath(FINISH_BUTTON_XPATH)).await?;
    session.click(&finish).await?;

    match await_confirmation(session).await {
        Ok(()) => info!("confirmation dialog accepted"),
        Err(Error::Timeout(_)) => {
            warn!("no confirmation dialog when finishing the lecture");
            let screenshot = session.screenshot().await?;
            if let Err(e) = notifier
                .send_image(
                    "No confirmation dialog appeared after finishing; closing the player tab.",
                    &screenshot,
                )
                .await
            {
                warn!(error = %e, "failed to deliver finish-timeout report");
            }
            session.close_window().await?;
        }
        Err(e) => return Err(e),
    }

    session.switch_to_window(main_window).await
}

async fn await_confirmation<S: Session>(session: &S) -> Result<()> {
    let policy = RetryPolicy::bounded(ALERT_POLL, ALERT_ATTEMPTS);
    retry::transient(&policy, || async move { session.accept_alert().await })
        .await
        .map_err(|e| {
            if e.is_transient() {
                Error::Timeout("confirmation dialog did not appear".into())
            } else {
                e
            }
        })
}
