//! Per-session state passed explicitly to every handler.
//!
//! Each transition consumes the current state and returns the next one.

pub mod access;

pub use access::{AccessDecision, DenialReason, Registration, UserDirectory, UserStatus};

use uuid::Uuid;

use crate::{
    core::services::Period,
    errors::{LedgerError, Result},
    ledger::{Owner, RecordId},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    session_id: Uuid,
    user: Option<Owner>,
    editing: Option<RecordId>,
    form_generation: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user: None,
            editing: None,
            form_generation: 0,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn user(&self) -> Option<&Owner> {
        self.user.as_ref()
    }

    pub fn editing(&self) -> Option<RecordId> {
        self.editing
    }

    /// Bumped whenever the entry form must be cleared.
    pub fn form_generation(&self) -> u64 {
        self.form_generation
    }

    pub fn login(self, user: Owner) -> Self {
        Self {
            user: Some(user),
            editing: None,
            ..self
        }
    }

    pub fn logout(self) -> Self {
        Self {
            user: None,
            editing: None,
            form_generation: self.form_generation + 1,
            ..self
        }
    }

    pub fn begin_edit(self, id: RecordId) -> Self {
        Self {
            editing: Some(id),
            ..self
        }
    }

    pub fn finish_edit(self) -> Self {
        Self {
            editing: None,
            form_generation: self.form_generation + 1,
            ..self
        }
    }

    pub fn reset_form(self) -> Self {
        Self {
            form_generation: self.form_generation + 1,
            ..self
        }
    }

    /// Drops the edit reference if it points at `id`, e.g. after `NotFound` or a delete.
    pub fn clear_stale(self, id: RecordId) -> Self {
        if self.editing == Some(id) {
            self.finish_edit()
        } else {
            self
        }
    }

    pub fn context(&self, period: Period) -> Result<RequestContext<'_>> {
        let user = self
            .user
            .as_ref()
            .ok_or_else(|| LedgerError::Access("log in first".into()))?;
        Ok(RequestContext { user, period })
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// What one handler call needs to know about its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext<'a> {
    pub user: &'a Owner,
    pub period: Period,
}
