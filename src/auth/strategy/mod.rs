//! Authentication strategies.

mod action;
mod app;
mod basic;
mod env;
mod oauth_app;
mod routes;
mod token;
mod traits;

use std::fmt;
use std::str::FromStr;

pub use action::ActionStrategy;
pub use app::AppStrategy;
pub use basic::BasicStrategy;
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use oauth_app::OAuthAppStrategy;
pub use routes::{requires_app_auth, requires_client_auth};
pub use token::TokenStrategy;
pub use traits::AuthStrategy;

use crate::Error;

/// Closed set of supported mechanisms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Token,
    Basic,
    OAuthApp,
    App,
    Action,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::Token,
        StrategyKind::Basic,
        StrategyKind::OAuthApp,
        StrategyKind::App,
        StrategyKind::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Token => "token",
            StrategyKind::Basic => "basic",
            StrategyKind::OAuthApp => "oauth-app",
            StrategyKind::App => "app",
            StrategyKind::Action => "action",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                Error::configuration(
                    None,
                    format!(
                        "unknown strategy '{}', expected one of: token, basic, oauth-app, app, action",
                        s
                    ),
                )
            })
    }
}
