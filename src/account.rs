//! Account resolution: who the session belongs to, and which store serves it.
//!
//! The account is resolved through a chain:
//!
//! 1. `--account <id>`: explicit per-command override
//! 2. `QM_ACCOUNT` env var: process/session level
//! 3. `account` in `~/.quartermaster/config.toml`
//!
//! When none yields a value, or `--guest` is passed, the session is a guest
//! session backed by the local guest store.

use std::env;

use crate::storage::GUEST_USER_ID;

/// The resolved session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,

    /// Selects the account store over the guest store.
    pub signed_in: bool,
}

impl Session {
    pub fn guest() -> Self {
        Self {
            user_id: GUEST_USER_ID.to_string(),
            signed_in: false,
        }
    }
}

/// Resolve the session from the flag, `QM_ACCOUNT`, and the configured account.
pub fn resolve_session(explicit: Option<&str>, guest: bool, configured: Option<&str>) -> Session {
    let from_env = env::var("QM_ACCOUNT").ok();
    resolve(explicit, guest, from_env.as_deref(), configured)
}

fn resolve(
    explicit: Option<&str>,
    guest: bool,
    from_env: Option<&str>,
    configured: Option<&str>,
) -> Session {
    if guest {
        return Session::guest();
    }
    [explicit, from_env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map_or_else(Session::guest, |id| Session {
            user_id: id.to_string(),
            signed_in: true,
        })
}
