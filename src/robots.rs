//! robots.txt rules for a single origin

use crate::crawlers::fetcher::Fetcher;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use texting_robots::Robot;
use url::Url;

/// Rules from one robots.txt file that apply to our user agent
///
/// Without a parsed file every URL is allowed.
#[derive(Clone, Default)]
pub struct RobotsPolicy {
    robot: Option<Arc<Robot>>,
}

impl fmt::Debug for RobotsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotsPolicy")
            .field("parsed", &self.robot.is_some())
            .finish()
    }
}

impl RobotsPolicy {
    /// Policy that allows every path
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Parse robots.txt content for `user_agent`
    ///
    /// Content that cannot be parsed allows everything.
    pub fn parse(content: &str, user_agent: &str) -> Self {
        match Robot::new(product_token(user_agent), content.as_bytes()) {
            Ok(robot) => Self {
                robot: Some(Arc::new(robot)),
            },
            Err(e) => {
                ::log::debug!("Ignoring unparsable robots.txt: {}", e);
                Self::allow_all()
            }
        }
    }

    pub fn is_allowed(&self, url: &Url) -> bool {
        self.robot
            .as_ref()
            .is_none_or(|robot| robot.allowed(url.as_str()))
    }

    /// Fetch `/robots.txt` for the origin of `url`; anything but a readable file allows all
    pub async fn fetch<F: Fetcher + ?Sized>(
        fetcher: &F,
        url: &Url,
        user_agent: &str,
        timeout: Duration,
    ) -> Self {
        let Ok(robots_url) = url.join("/robots.txt") else {
            return Self::allow_all();
        };
        match fetcher.get(&robots_url, timeout).await {
            Ok(document) => Self::parse(&document.body, user_agent),
            Err(e) => {
                ::log::debug!("No usable robots.txt at {}: {}", robots_url, e);
                Self::allow_all()
            }
        }
    }
}

/// The bot name robots.txt groups refer to, e.g. `YourBot` for
/// `Mozilla/5.0 (compatible; YourBot/1.0)`
fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c.is_whitespace() || matches!(c, ';' | '(' | ')'))
        .filter(|token| !token.is_empty())
        .last()
        .map(|token| token.split('/').next().unwrap_or(token))
        .unwrap_or(user_agent)
}
