//! [`Session`] implementation backed by a remote WebDriver endpoint.

use async_trait::async_trait;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use thirtyfour::{Key, WindowHandle};
use tracing::debug;

use super::{Selector, Session};
use crate::{Error, Result};

/// Chrome launch arguments matching the portal's supported browser profile.
const CHROME_ARGS: &[&str] = &[
    "--window-size=1920,1080",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
];

/// A Chrome session driven over the WebDriver wire protocol.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl WebDriverSession {
    /// Connect to a remote WebDriver endpoint and open a fresh Chrome session.
    pub async fn connect(endpoint: &str, headless: bool) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in CHROME_ARGS {
            caps.add_arg(arg)?;
        }
        if headless {
            caps.add_arg("--headless")?;
        }

        debug!(endpoint, headless, "connecting to webdriver");
        let driver = WebDriver::new(endpoint, caps).await?;
        Ok(Self { driver })
    }

    /// End the browser session, closing every tab.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }
}

fn to_by(selector: &Selector) -> By {
    match selector {
        Selector::Id(v) => By::Id(v.as_str()),
        Selector::Class(v) => By::ClassName(v.as_str()),
        Selector::Tag(v) => By::Tag(v.as_str()),
        Selector::XPath(v) => By::XPath(v.as_str()),
        Selector::Css(v) => By::Css(v.as_str()),
    }
}

/// Fold driver errors into the engine's taxonomy; `what` names the subject of
/// the failed call for the error message.
fn classify(error: WebDriverError, what: &str) -> Error {
    match error {
        WebDriverError::NoSuchElement(_)
        | WebDriverError::NoSuchAlert(_)
        | WebDriverError::NoSuchWindow(_) => Error::NotFound(what.to_string()),
        WebDriverError::StaleElementReference(_) => Error::Stale(what.to_string()),
        other => Error::Driver(other),
    }
}

#[async_trait]
impl Session for WebDriverSession {
    type Handle = WebElement;
    type Window = WindowHandle;

    async fn navigate(&self, url: &str) -> Result<()> {
        Ok(self.driver.goto(url).await?)
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn find(&self, selector: &Selector) -> Result<WebElement> {
        self.driver
            .find(to_by(selector))
            .await
            .map_err(|e| classify(e, &selector.to_string()))
    }

    async fn find_in(&self, scope: &WebElement, selector: &Selector) -> Result<WebElement> {
        scope
            .find(to_by(selector))
            .await
            .map_err(|e| classify(e, &selector.to_string()))
    }

    async fn find_all_in(
        &self,
        scope: &WebElement,
        selector: &Selector,
    ) -> Result<Vec<WebElement>> {
        scope
            .find_all(to_by(selector))
            .await
            .map_err(|e| classify(e, &selector.to_string()))
    }

    async fn click(&self, handle: &WebElement) -> Result<()> {
        handle.click().await.map_err(|e| classify(e, "click target"))
    }

    async fn send_keys(&self, handle: &WebElement, text: &str) -> Result<()> {
        handle
            .send_keys(text)
            .await
            .map_err(|e| classify(e, "input field"))
    }

    async fn submit(&self, handle: &WebElement) -> Result<()> {
        handle
            .send_keys(Key::Enter + "")
            .await
            .map_err(|e| classify(e, "input field"))
    }

    async fn text(&self, handle: &WebElement) -> Result<String> {
        handle.text().await.map_err(|e| classify(e, "element text"))
    }

    async fn attribute(&self, handle: &WebElement, name: &str) -> Result<Option<String>> {
        handle.attr(name).await.map_err(|e| classify(e, name))
    }

    async fn css_value(&self, handle: &WebElement, property: &str) -> Result<String> {
        handle
            .css_value(property)
            .await
            .map_err(|e| classify(e, property))
    }

    async fn hover(&self, handle: &WebElement) -> Result<()> {
        self.driver
            .action_chain()
            .move_to_element_center(handle)
            .perform()
            .await
            .map_err(|e| classify(e, "hover target"))
    }

    async fn enter_frame(&self, handle: &WebElement) -> Result<()> {
        handle
            .clone()
            .enter_frame()
            .await
            .map_err(|e| classify(e, "frame"))
    }

    async fn leave_frame(&self) -> Result<()> {
        Ok(self.driver.enter_default_frame().await?)
    }

    async fn current_window(&self) -> Result<WindowHandle> {
        Ok(self.driver.window().await?)
    }

    async fn windows(&self) -> Result<Vec<WindowHandle>> {
        Ok(self.driver.windows().await?)
    }

    async fn switch_to_window(&self, window: &WindowHandle) -> Result<()> {
        self.driver
            .switch_to_window(window.clone())
            .await
            .map_err(|e| classify(e, "window"))
    }

    async fn close_window(&self) -> Result<()> {
        Ok(self.driver.close_window().await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.driver.screenshot_as_png().await?)
    }

    async fn screenshot_of(&self, handle: &WebElement) -> Result<Vec<u8>> {
        handle
            .screenshot_as_png()
            .await
            .map_err(|e| classify(e, "screenshot target"))
    }

    async fn accept_alert(&self) -> Result<()> {
        self.driver
            .accept_alert()
            .await
            .map_err(|e| classify(e, "confirmation dialog"))
    }
}
