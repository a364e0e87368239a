//! Playback control: start the player, force maximum speed, and wait for the
//! lecture to report itself finished.
//!
//! The player widget initializes asynchronously inside its frame with no
//! "ready" signal, so both startup phases poll until they succeed.

use std::time::Duration;

use tracing::{debug, info};

use super::{
    FASTEST_SPEED_ID, PLAYER_FRAME_ID, PLAYER_SURFACE_ID, PLAYING_OVERLAY_ID, PLAY_CONTROL_ID,
    POSITION_XPATH, RESUME_CONTROL_ID, SPEED_MENU_ID, TOTAL_TIME_XPATH,
};
use crate::retry::{self, RetryPolicy};
use crate::session::{Selector, Session};
use crate::{Error, Result};

/// Fixed settle delay after the player tab opens.
const PLAYER_SETTLE: Duration = Duration::from_secs(3);
/// Poll interval while waiting for the player frame/widgets.
const WIDGET_POLL: Duration = Duration::from_secs(1);

/// Bring the freshly opened lecture tab into a playing state at maximum
/// speed. Must be called right after switching into the spawned tab.
pub async fn start_and_maximize_speed<S: Session>(session: &S) -> Result<()> {
    tokio::time::sleep(PLAYER_SETTLE).await;
    acquire_playing(session).await?;
    force_fastest_speed(session).await?;
    info!("playback running at maximum speed");
    Ok(())
}

/// Phase A: enter the player frame and poke it until playback actually
/// starts. Leaves the session inside the frame context on success.
async fn acquire_playing<S: Session>(session: &S) -> Result<()> {
    let policy = RetryPolicy::unbounded(WIDGET_POLL);
    retry::transient(&policy, || async move {
        // A failed attempt may have left us inside the frame; start clean.
        session.leave_frame().await?;

        let frame = session.find(&Selector::id(PLAYER_FRAME_ID)).await?;
        session.enter_frame(&frame).await?;

        // Both continue/play triggers are idempotent and only sometimes
        // present; a missing control is not an error.
        if let Some(resume) = session.try_find(&Selector::id(RESUME_CONTROL_ID)).await? {
            let _ = session.click(&resume).await;
        }
        if let Some(play) = session.try_find(&Selector::id(PLAY_CONTROL_ID)).await? {
            let _ = session.click(&play).await;
        }

        if is_playing(session).await? {
            Ok(())
        } else {
            debug!("player not running yet");
            Err(Error::NotFound("playing-state indicator".into()))
        }
    })
    .await
}

/// The intro overlay is hidden once real playback starts.
async fn is_playing<S: Session>(session: &S) -> Result<bool> {
    match session.try_find(&Selector::id(PLAYING_OVERLAY_ID)).await? {
        Some(overlay) => Ok(session.css_value(&overlay, "display").await? == "none"),
        None => Ok(false),
    }
}

/// Phase B: open the speed menu and pick the fastest option. The menu renders
/// lazily, so the whole hover-open-select sequence retries until it completes
/// without error.
async fn force_fastest_speed<S: Session>(session: &S) -> Result<()> {
    let policy = RetryPolicy::unbounded(WIDGET_POLL);
    retry::any(&policy, || async move {
        let surface = session.find(&Selector::id(PLAYER_SURFACE_ID)).await?;
        session.hover(&surface).await?;
        let menu = session.find(&Selector::id(SPEED_MENU_ID)).await?;
        session.click(&menu).await?;
        let fastest = session.find(&Selector::id(FASTEST_SPEED_ID)).await?;
        session.click(&fastest).await?;
        Ok(())
    })
    .await
}

/// Poll the control bar until the current position reaches the total
/// duration. Sleeps a third of the remaining time between samples, so the
/// watcher re-samples increasingly often as the video approaches its end and
/// never sleeps past it.
///
/// A malformed clock text (e.g. a transient blank render) is not recovered
/// here; it propagates to the top-level retry policy.
pub async fn await_completion<S: Session>(session: &S) -> Result<()> {
    loop {
        let total_el = session.find(&Selector::xpath(TOTAL_TIME_XPATH)).await?;
        let total = parse_clock(&session.text(&total_el).await?)?;
        let position_el = session.find(&Selector::xpath(POSITION_XPATH)).await?;
        let position = parse_clock(&session.text(&position_el).await?)?;

        if position >= total {
            info!("lecture playback complete");
            return Ok(());
        }
        let delay = poll_delay(total, position);
        debug!(?position, ?total, ?delay, "waiting for completion");
        tokio::time::sleep(delay).await;
    }
}

/// A third of the remaining playback time.
pub fn poll_delay(total: Duration, position: Duration) -> Duration {
    total.saturating_sub(position) / 3
}

/// Parse a control-bar clock text, either `MM:SS` or `H:MM:SS`.
pub fn parse_clock(text: &str) -> Result<Duration> {
    let invalid = || Error::Parse(format!("invalid clock text: {text:?}"));
    let parts = text
        .trim()
        .split(':')
        .map(|p| p.parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<u64>>>()?;
    let seconds = match parts[..] {
        [m, s] => m * 60 + s,
        [h, m, s] => h * 3600 + m * 60 + s,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_minutes_seconds() {
        assert_eq!(parse_clock("10:00").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_clock("01:30").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_clock(" 0:05 ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_parse_clock_with_hours() {
        assert_eq!(parse_clock("1:02:03").unwrap(), Duration::from_secs(3723));
    }

    #[test]
    fn test_parse_clock_rejects_garbage() {
        assert!(matches!(parse_clock(""), Err(Error::Parse(_))));
        assert!(matches!(parse_clock("soon"), Err(Error::Parse(_))));
        assert!(matches!(parse_clock("12"), Err(Error::Parse(_))));
        assert!(matches!(parse_clock("1:2:3:4"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_poll_delay_is_a_third_of_remaining() {
        let total = parse_clock("10:00").unwrap();
        let position = parse_clock("01:00").unwrap();
        assert_eq!(poll_delay(total, position), Duration::from_secs(180));
    }

    #[test]
    fn test_poll_delay_saturates_at_zero() {
        let total = parse_clock("10:00").unwrap();
        let position = parse_clock("10:30").unwrap();
        assert_eq!(poll_delay(total, position), Duration::ZERO);
    }
}
