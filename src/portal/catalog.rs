//! Catalog scanner: materializes the progress page's subject/lecture tree.
//!
//! Scanning is read-only except for one required click per subject: the
//! lecture rows only exist in the DOM once the subject's toggle has expanded
//! them.

use std::time::Duration;

use tracing::debug;

use super::model::{Lecture, Subject};
use super::{
    LECTURE_LIST_CLASS, LECTURE_ROW_CLASS, LECTURE_STATE_CLASS, LECTURE_TITLE_CLASS,
    PROGRESS_BADGE_CLASS, PROGRESS_VALUE_CLASS, STATE_BASE_CLASS, STATE_DONE_CLASS,
    SUBJECT_BODY_CLASS, SUBJECT_INFO_CLASS, SUBJECT_ITEM_CLASS, SUBJECT_TOGGLE_CLASS,
    WAITING_MARKER_CLASS,
};
use crate::notify::{report_anomaly, Notifier};
use crate::session::{Selector, Session};
use crate::{Error, Result};

/// Grace period for the expanded lecture rows to render.
const EXPAND_SETTLE: Duration = Duration::from_secs(1);

/// Walk the progress tree under `root` and materialize it, in on-page order.
pub async fn scan<S: Session, N: Notifier>(
    session: &S,
    notifier: &N,
    root: &S::Handle,
) -> Result<Vec<Subject<S::Handle>>> {
    let mut subjects = Vec::new();
    for subject_el in session
        .find_all_in(root, &Selector::class(SUBJECT_ITEM_CLASS))
        .await?
    {
        subjects.push(scan_subject(session, notifier, &subject_el).await?);
    }
    debug!(subjects = subjects.len(), "catalog scanned");
    Ok(subjects)
}

async fn scan_subject<S: Session, N: Notifier>(
    session: &S,
    notifier: &N,
    subject_el: &S::Handle,
) -> Result<Subject<S::Handle>> {
    let info = session
        .find_in(subject_el, &Selector::class(SUBJECT_INFO_CLASS))
        .await?;
    let toggle = session
        .find_in(&info, &Selector::class(SUBJECT_TOGGLE_CLASS))
        .await?;
    let title = session.text(&toggle).await?;

    let badge = session
        .find_in(&info, &Selector::class(PROGRESS_BADGE_CLASS))
        .await?;
    let value = session
        .find_in(&badge, &Selector::class(PROGRESS_VALUE_CLASS))
        .await?;
    let raw_progress = session.text(&value).await?;
    let progress = match raw_progress.trim().parse::<f32>() {
        Ok(v) => v,
        Err(_) => {
            report_anomaly(
                notifier,
                &format!(
                    "Unparseable progress value {raw_progress:?} for subject {title:?}; assuming 0."
                ),
            )
            .await;
            0.0
        }
    };

    // The lecture rows are only queryable after expanding the subject.
    session.click(&toggle).await?;
    tokio::time::sleep(EXPAND_SETTLE).await;

    let body = session
        .find_in(subject_el, &Selector::class(SUBJECT_BODY_CLASS))
        .await?;
    let list = session
        .find_in(&body, &Selector::class(LECTURE_LIST_CLASS))
        .await?;

    let mut lectures = Vec::new();
    for row in session
        .find_all_in(&list, &Selector::class(LECTURE_ROW_CLASS))
        .await?
    {
        lectures.push(scan_lecture(session, notifier, &row).await?);
    }

    Ok(Subject {
        title,
        progress,
        lectures,
    })
}

async fn scan_lecture<S: Session, N: Notifier>(
    session: &S,
    notifier: &N,
    row: &S::Handle,
) -> Result<Lecture<S::Handle>> {
    let title_el = session
        .find_in(row, &Selector::class(LECTURE_TITLE_CLASS))
        .await?;
    let title = session.text(&title_el).await?;

    let anchor = match session
        .find_in(row, &Selector::class(LECTURE_STATE_CLASS))
        .await
    {
        Ok(state) => session.find_in(&state, &Selector::tag("a")).await,
        Err(e) => Err(e),
    };
    let anchor = match anchor {
        Ok(anchor) => anchor,
        Err(e @ Error::NotFound(_)) => {
            // No state anchor: either the lecture is still locked behind the
            // waiting badge, or the markup no longer matches our assumptions.
            return if session
                .try_find_in(row, &Selector::class(WAITING_MARKER_CLASS))
                .await?
                .is_some()
            {
                Ok(Lecture {
                    title,
                    has_done: false,
                    action: None,
                })
            } else {
                Err(e)
            };
        }
        Err(e) => return Err(e),
    };

    let raw_classes = session.attribute(&anchor, "class").await?.unwrap_or_default();
    let classes: Vec<&str> = raw_classes.split_whitespace().collect();
    if !classes.contains(&STATE_BASE_CLASS) {
        report_anomaly(
            notifier,
            &format!("Unexpected completion markers {raw_classes:?} on lecture {title:?}."),
        )
        .await;
    }

    Ok(Lecture {
        title,
        has_done: classes.contains(&STATE_DONE_CLASS),
        action: Some(title_el),
    })
}
