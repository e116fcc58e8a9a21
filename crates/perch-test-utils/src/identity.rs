// SPDX-FileCopyrightText: 2026 Perch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static identity provider for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use perch_core::{Credentials, IdentityProvider, PerchError, UserId};

/// Identity provider yielding fixed credentials, with an injectable auth
/// failure for exercising the surfaced-not-retried contract.
pub struct StaticIdentity {
    credentials: Credentials,
    fail: AtomicBool,
}

impl StaticIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            credentials: Credentials {
                bearer_token: format!("test-token-{user_id}"),
                user_id: UserId(user_id),
            },
            fail: AtomicBool::new(false),
        }
    }

    /// Make subsequent credential lookups fail with an auth error.
    pub fn fail_auth(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn credentials(&self) -> Result<Credentials, PerchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PerchError::Auth("injected credential failure".into()));
        }
        Ok(self.credentials.clone())
    }
}
