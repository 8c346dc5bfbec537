// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-level control surface exposed by the dispatcher.

use crate::types::SessionId;

/// Cancellation of queued and not-yet-started work, per session or globally.
///
/// Cancellation is best-effort and non-preemptive: in-flight work always
/// runs to completion. Implemented by the dispatcher and consumed by
/// management plugins (session reset commands).
pub trait SessionControl: Send + Sync {
    /// Discards queued contexts and cancels not-yet-started tasks for one
    /// session. A no-op for unknown or idle sessions.
    fn cancel_session(&self, session_id: &SessionId);

    /// [`Self::cancel_session`] applied to every known session.
    fn cancel_all_sessions(&self);
}
