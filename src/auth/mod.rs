// Copyright 2025 Mysurian
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.

//! Identity provider seam.
//!
//! The application delegates sign-in to an external provider; the core only
//! needs the current principal and change notifications. [`StaticProvider`]
//! is the in-process implementation used by tests and local development.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::core::{AuthError, Principal};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Interactive sign-in. `Ok(None)` means the user dismissed the prompt.
    async fn sign_in(&self) -> Result<Option<Principal>, AuthError>;

    fn current_principal(&self) -> Option<Principal>;

    /// Change notifications on sign-in/out.
    fn watch(&self) -> watch::Receiver<Option<Principal>>;
}

/// Provider backed by a settable principal slot.
pub struct StaticProvider {
    state: watch::Sender<Option<Principal>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    pub fn with_principal(principal: Principal) -> Self {
        let (state, _) = watch::channel(Some(principal));
        Self { state }
    }

    pub fn set_principal(&self, principal: Option<Principal>) {
        let _ = self.state.send(principal);
    }
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn sign_in(&self) -> Result<Option<Principal>, AuthError> {
        // Nothing interactive here: signing in yields whatever principal the
        // slot holds, None standing in for a dismissed popup.
        Ok(self.state.borrow().clone())
    }

    fn current_principal(&self) -> Option<Principal> {
        self.state.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<Principal>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: "u1".to_string(),
            display_name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn sign_out_notifies_watchers() {
        let provider = StaticProvider::with_principal(principal());
        let mut rx = provider.watch();
        assert!(provider.current_principal().is_some());

        provider.set_principal(None);
        rx.changed().await.unwrap();
        assert!(rx.borrow().is_none());
        assert!(provider.current_principal().is_none());
    }
}
