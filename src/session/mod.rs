//! Browser control surface consumed by the engine.
//!
//! The engine never talks to a WebDriver client directly; everything goes
//! through the [`Session`] trait so tests can substitute a scripted fake.
//! Handles are short-lived values scoped to one locate-use cycle: a retry loop
//! must re-resolve its selector instead of reusing a handle that may have gone
//! stale when the page re-rendered.

pub mod webdriver;

use std::fmt;

use async_trait::async_trait;

use crate::{Error, Result};

/// A logical element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
    XPath(String),
    Css(String),
}

impl Selector {
    pub fn id(value: impl Into<String>) -> Self {
        Self::Id(value.into())
    }

    pub fn class(value: impl Into<String>) -> Self {
        Self::Class(value.into())
    }

    pub fn tag(value: impl Into<String>) -> Self {
        Self::Tag(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::XPath(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::Css(value.into())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(v) => write!(f, "id={v}"),
            Selector::Class(v) => write!(f, "class={v}"),
            Selector::Tag(v) => write!(f, "tag={v}"),
            Selector::XPath(v) => write!(f, "xpath={v}"),
            Selector::Css(v) => write!(f, "css={v}"),
        }
    }
}

/// One live browser session: a set of tabs, one of which is active, plus an
/// optional frame context inside the active tab.
///
/// All calls are round trips to the controlled browser and block until they
/// return. Absence surfaces as [`Error::NotFound`], invalidated handles as
/// [`Error::Stale`]; both are distinct from driver-level failures.
#[async_trait]
pub trait Session: Send + Sync {
    /// Opaque reference to a located element.
    type Handle: Clone + Send + Sync;
    /// Identity of a browser tab/window.
    type Window: Clone + PartialEq + Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;
    async fn current_url(&self) -> Result<String>;

    /// Resolve a selector against the current document/frame context.
    async fn find(&self, selector: &Selector) -> Result<Self::Handle>;
    /// Resolve a selector under a previously located element.
    async fn find_in(&self, scope: &Self::Handle, selector: &Selector) -> Result<Self::Handle>;
    async fn find_all_in(
        &self,
        scope: &Self::Handle,
        selector: &Selector,
    ) -> Result<Vec<Self::Handle>>;

    async fn click(&self, handle: &Self::Handle) -> Result<()>;
    async fn send_keys(&self, handle: &Self::Handle, text: &str) -> Result<()>;
    /// Submit the form the element belongs to (an Enter keystroke).
    async fn submit(&self, handle: &Self::Handle) -> Result<()>;
    async fn text(&self, handle: &Self::Handle) -> Result<String>;
    async fn attribute(&self, handle: &Self::Handle, name: &str) -> Result<Option<String>>;
    async fn css_value(&self, handle: &Self::Handle, property: &str) -> Result<String>;
    async fn hover(&self, handle: &Self::Handle) -> Result<()>;

    /// Switch the document context into an embedded frame.
    async fn enter_frame(&self, handle: &Self::Handle) -> Result<()>;
    /// Switch back to the tab's top-level document. Idempotent.
    async fn leave_frame(&self) -> Result<()>;

    async fn current_window(&self) -> Result<Self::Window>;
    async fn windows(&self) -> Result<Vec<Self::Window>>;
    async fn switch_to_window(&self, window: &Self::Window) -> Result<()>;
    /// Close the active tab. The caller must switch to another tab afterwards.
    async fn close_window(&self) -> Result<()>;

    /// Full-viewport PNG of the active tab.
    async fn screenshot(&self) -> Result<Vec<u8>>;
    /// PNG of a single element.
    async fn screenshot_of(&self, handle: &Self::Handle) -> Result<Vec<u8>>;

    /// Accept the native confirmation dialog. `NotFound` when none is open.
    async fn accept_alert(&self) -> Result<()>;

    /// Like [`Session::find`], but absence is a value rather than an error.
    async fn try_find(&self, selector: &Selector) -> Result<Option<Self::Handle>> {
        absent_to_none(self.find(selector).await)
    }

    /// Like [`Session::find_in`], but absence is a value rather than an error.
    async fn try_find_in(
        &self,
        scope: &Self::Handle,
        selector: &Selector,
    ) -> Result<Option<Self::Handle>> {
        absent_to_none(self.find_in(scope, selector).await)
    }
}

fn absent_to_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(handle) => Ok(Some(handle)),
        Err(Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The window handle that is not the main tab, i.e. the tab spawned by the
/// last lecture click. `None` when no extra tab exists yet.
pub fn get_added_window_handle<W: Clone + PartialEq>(handles: &[W], main: &W) -> Option<W> {
    handles.iter().find(|h| *h != main).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::id("player0").to_string(), "id=player0");
        assert_eq!(
            Selector::class("lecture-progress").to_string(),
            "class=lecture-progress"
        );
        assert_eq!(Selector::tag("a").to_string(), "tag=a");
    }

    #[test]
    fn test_added_window_handle() {
        let handles = vec!["A".to_string(), "B".to_string()];
        let main = "A".to_string();
        assert_eq!(get_added_window_handle(&handles, &main), Some("B".into()));
    }

    #[test]
    fn test_added_window_handle_none_spawned() {
        let handles = vec!["A".to_string()];
        let main = "A".to_string();
        assert_eq!(get_added_window_handle(&handles, &main), None);
    }

    #[test]
    fn test_absent_to_none() {
        assert_eq!(absent_to_none(Ok(1)).unwrap(), Some(1));
        assert_eq!(
            absent_to_none::<i32>(Err(Error::NotFound("a".into()))).unwrap(),
            None
        );
        assert!(absent_to_none::<i32>(Err(Error::Stale("a".into()))).is_err());
    }
}
