// SPDX-FileCopyrightText: 2026 Palaver Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend event normalization.

use crate::error::PalaverError;
use crate::types::Message;

/// Converts a backend-specific raw event into the canonical [`Message`].
///
/// One normalizer exists per backend; the raw event type is whatever the
/// backend's inbound feed produces.
pub trait MessageNormalizer: Send + Sync {
    type Raw;

    fn normalize(&self, raw: Self::Raw) -> Result<Message, PalaverError>;
}
