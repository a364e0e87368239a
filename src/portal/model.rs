//! Data model for one pass over the progress page.
//!
//! Both entities are constructed fresh each run by the catalog scanner, read
//! during one traversal, and discarded at end of run. Nothing persists between
//! runs; a restarted process re-derives the same data from the live page.

/// One course on the progress page.
#[derive(Debug, Clone)]
pub struct Subject<H> {
    pub title: String,
    /// Percent complete as reported by the portal. Advisory only; control flow
    /// never depends on it, and parse failures default to `0.0`.
    pub progress: f32,
    /// Lectures in on-page order, which is also the traversal order.
    pub lectures: Vec<Lecture<H>>,
}

impl<H> Subject<H> {
    /// True once every lecture carries the portal's completion marker.
    pub fn is_completed(&self) -> bool {
        self.lectures.iter().all(|l| l.has_done)
    }
}

/// One playable unit within a subject.
#[derive(Debug, Clone)]
pub struct Lecture<H> {
    pub title: String,
    /// True iff the portal's own completion marker is present. A done lecture
    /// is never started again.
    pub has_done: bool,
    /// The clickable control that starts this lecture. `None` means the
    /// lecture exists but cannot be started yet (locked/waiting), which also
    /// gates every later lecture in the subject.
    pub action: Option<H>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(title: &str, has_done: bool, startable: bool) -> Lecture<u32> {
        Lecture {
            title: title.to_string(),
            has_done,
            action: startable.then_some(0),
        }
    }

    #[test]
    fn test_subject_completed() {
        let subject = Subject {
            title: "Operating Systems".to_string(),
            progress: 100.0,
            lectures: vec![lecture("1", true, true), lecture("2", true, true)],
        };
        assert!(subject.is_completed());
    }

    #[test]
    fn test_subject_with_pending_lecture() {
        let subject = Subject {
            title: "Operating Systems".to_string(),
            progress: 50.0,
            lectures: vec![lecture("1", true, true), lecture("2", false, true)],
        };
        assert!(!subject.is_completed());
    }

    #[test]
    fn test_subject_with_waiting_lecture() {
        let subject = Subject {
            title: "Operating Systems".to_string(),
            progress: 50.0,
            lectures: vec![lecture("1", true, true), lecture("2", false, false)],
        };
        assert!(!subject.is_completed());
    }

    #[test]
    fn test_empty_subject_counts_as_completed() {
        let subject: Subject<u32> = Subject {
            title: "Seminar".to_string(),
            progress: 0.0,
            lectures: vec![],
        };
        assert!(subject.is_completed());
    }
}
