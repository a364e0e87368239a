//! Portal login.

use tracing::{debug, info};

use super::{LOGIN_ID_FIELD, LOGIN_PW_FIELD};
use crate::config::Config;
use crate::session::{Selector, Session};
use crate::{Error, Result};

/// Navigate to the portal and sign in if the portal bounced us to the login
/// page. The post-login landing URL is a structural precondition: if it does
/// not hold, the engine must not continue.
pub async fn login<S: Session>(session: &S, config: &Config) -> Result<()> {
    session.navigate(&config.urls.main).await?;

    if session.current_url().await?.starts_with(&config.urls.login) {
        debug!("redirected to login page, submitting credentials");
        let id_field = session.find(&Selector::id(LOGIN_ID_FIELD)).await?;
        session.send_keys(&id_field, &config.univ_id).await?;
        let pw_field = session.find(&Selector::id(LOGIN_PW_FIELD)).await?;
        session.send_keys(&pw_field, &config.univ_pw).await?;
        session.submit(&pw_field).await?;
    }

    let landed = session.current_url().await?;
    if landed != config.urls.landing {
        return Err(Error::Precondition(format!(
            "expected to land on {} after login, got {landed}",
            config.urls.landing
        )));
    }

    info!("logged in");
    Ok(())
}
