//! Top-level orchestration: login, scan, then drive every incomplete lecture
//! through playback, completion, and finalization.

use std::fmt::Write as _;
use std::time::Duration;

use tracing::{error, info, warn};

use super::model::Subject;
use super::{auth, catalog, finish, player, PROGRESS_ROOT_CLASS};
use crate::config::Config;
use crate::notify::Notifier;
use crate::retry::{self, RetryPolicy};
use crate::session::{get_added_window_handle, Selector, Session};
use crate::{Error, Result};

const WINDOW_POLL: Duration = Duration::from_secs(1);
const WINDOW_ATTEMPTS: u32 = 30;

/// Outcome of one full pass over the catalog.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub subjects: usize,
    pub lectures_watched: usize,
}

/// Drives a browser session through complete runs.
pub struct Runner<'a, S, N> {
    session: &'a S,
    notifier: &'a N,
    config: &'a Config,
}

impl<'a, S: Session, N: Notifier> Runner<'a, S, N> {
    pub fn new(session: &'a S, notifier: &'a N, config: &'a Config) -> Self {
        Self {
            session,
            notifier,
            config,
        }
    }

    /// One full pass: login, scan the catalog, and play every lecture that is
    /// startable and not yet done. Lectures within a subject are sequentially
    /// gated: the first non-startable lecture ends that subject's pass.
    pub async fn run_once(&self) -> Result<RunSummary> {
        auth::login(self.session, self.config).await?;
        let main_window = self.session.current_window().await?;

        let root = self.open_progress_page().await?;
        let subjects = catalog::scan(self.session, self.notifier, &root).await?;

        let mut summary = RunSummary {
            subjects: subjects.len(),
            ..Default::default()
        };
        for subject in &subjects {
            info!(subject = %subject.title, progress = subject.progress as f64, "processing subject");
            for lecture in &subject.lectures {
                if lecture.has_done {
                    continue;
                }
                let Some(action) = &lecture.action else {
                    info!(
                        lecture = %lecture.title,
                        "lecture not yet available, skipping the rest of the subject"
                    );
                    break;
                };
                self.watch_lecture(&lecture.title, action, &main_window)
                    .await?;
                summary.lectures_watched += 1;
            }
        }
        info!(
            subjects = summary.subjects,
            lectures = summary.lectures_watched,
            "pass complete"
        );
        Ok(summary)
    }

    /// One pass with its outcome mirrored to the notifier: the scheduled
    /// variant, re-invoked externally on the next cycle.
    pub async fn run_scheduled(&self) -> Result<RunSummary> {
        match self.run_once().await {
            Ok(summary) => {
                self.send_best_effort("No lectures currently available.").await;
                Ok(summary)
            }
            Err(e) => {
                self.report_failure(&e).await;
                Err(e)
            }
        }
    }

    /// Continuous variant: run pass after pass, restarting the whole run from
    /// login on any failure.
    pub async fn run_forever(&self) {
        loop {
            if let Err(e) = self.run_scheduled().await {
                error!(error = %e, "run failed, will restart");
            }
            tokio::time::sleep(self.config.cycle_delay).await;
        }
    }

    /// Scan-only pass that sends a summary of incomplete subjects instead of
    /// watching anything.
    pub async fn run_report(&self) -> Result<()> {
        auth::login(self.session, self.config).await?;
        self.session.navigate(&self.config.urls.lecture).await?;
        let root = self
            .session
            .find(&Selector::class(PROGRESS_ROOT_CLASS))
            .await?;
        let subjects = catalog::scan(self.session, self.notifier, &root).await?;
        self.notifier
            .send_text(&not_completed_report(&subjects))
            .await
    }

    /// Open the progress page, snapshot it to the notifier, and return a
    /// handle to the progress root.
    async fn open_progress_page(&self) -> Result<S::Handle> {
        self.session.navigate(&self.config.urls.lecture).await?;
        let root = self
            .session
            .find(&Selector::class(PROGRESS_ROOT_CLASS))
            .await?;
        self.notifier.send_text("Current lecture progress.").await?;
        let snapshot = self.session.screenshot_of(&root).await?;
        self.notifier.send_image("lecture progress", &snapshot).await?;
        Ok(root)
    }

    async fn watch_lecture(
        &self,
        title: &str,
        action: &S::Handle,
        main_window: &S::Window,
    ) -> Result<()> {
        info!(lecture = %title, "starting lecture");
        self.notifier
            .send_text(&format!("Starting lecture: {title}"))
            .await?;

        self.session.click(action).await?;
        let spawned = self.await_spawned_window(main_window).await?;
        self.session.switch_to_window(&spawned).await?;

        player::start_and_maximize_speed(self.session).await?;
        player::await_completion(self.session).await?;
        finish::finalize(self.session, self.notifier, main_window).await?;

        self.notifier
            .send_text(&format!("Finished lecture: {title}"))
            .await?;
        Ok(())
    }

    /// Wait for the tab spawned by the lecture click: the window handle that
    /// is not the main tab.
    async fn await_spawned_window(&self, main_window: &S::Window) -> Result<S::Window> {
        let policy = RetryPolicy::bounded(WINDOW_POLL, WINDOW_ATTEMPTS);
        retry::transient(&policy, || async move {
            let handles = self.session.windows().await?;
            get_added_window_handle(&handles, main_window)
                .ok_or_else(|| Error::NotFound("spawned lecture tab".into()))
        })
        .await
        .map_err(|e| {
            if e.is_transient() {
                Error::Timeout("lecture tab did not open".into())
            } else {
                e
            }
        })
    }

    async fn report_failure(&self, error: &Error) {
        error!(error = %error, "run failed");
        self.send_best_effort(&format!("Run failed: {error}")).await;
        match self.session.screenshot().await {
            Ok(png) => {
                if let Err(e) = self.notifier.send_image("failure screenshot", &png).await {
                    warn!(error = %e, "failed to deliver failure screenshot");
                }
            }
            Err(e) => warn!(error = %e, "failed to capture failure screenshot"),
        }
    }

    async fn send_best_effort(&self, text: &str) {
        if let Err(e) = self.notifier.send_text(text).await {
            warn!(error = %e, "failed to deliver notification");
        }
    }
}

/// Summary of subjects that still have incomplete lectures.
pub fn not_completed_report<H>(subjects: &[Subject<H>]) -> String {
    let mut out = String::new();
    for subject in subjects.iter().filter(|s| !s.is_completed()) {
        let _ = writeln!(out, "- {}: {:.2}%", subject.title, subject.progress);
        for lecture in subject.lectures.iter().filter(|l| !l.has_done) {
            let state = if lecture.action.is_some() {
                ""
            } else {
                " (not yet available)"
            };
            let _ = writeln!(out, "  - {}{state}", lecture.title);
        }
    }
    if out.is_empty() {
        "All subjects are complete.".to_string()
    } else {
        format!("Subjects with incomplete lectures:\n{}", out.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::model::Lecture;

    fn subject(title: &str, progress: f32, lectures: Vec<Lecture<u32>>) -> Subject<u32> {
        Subject {
            title: title.to_string(),
            progress,
            lectures,
        }
    }

    fn lecture(title: &str, has_done: bool, startable: bool) -> Lecture<u32> {
        Lecture {
            title: title.to_string(),
            has_done,
            action: startable.then_some(0),
        }
    }

    #[test]
    fn test_report_lists_incomplete_subjects_only() {
        let subjects = vec![
            subject("Algebra", 100.0, vec![lecture("1", true, true)]),
            subject(
                "Operating Systems",
                66.6,
                vec![
                    lecture("Processes", true, true),
                    lecture("Scheduling", false, true),
                    lecture("Deadlocks", false, false),
                ],
            ),
        ];
        let report = not_completed_report(&subjects);
        assert_eq!(
            report,
            "Subjects with incomplete lectures:\n\
             - Operating Systems: 66.60%\n\
             \x20 - Scheduling\n\
             \x20 - Deadlocks (not yet available)"
        );
    }

    #[test]
    fn test_report_when_everything_is_done() {
        let subjects = vec![subject("Algebra", 100.0, vec![lecture("1", true, true)])];
        assert_eq!(not_completed_report(&subjects), "All subjects are complete.");
    }
}
