// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing metadata for effects

/// Gives an effect a stable name and loggable fields for its span.
pub trait TracedEffect {
    fn name(&self) -> &'static str;

    fn fields(&self) -> Vec<(&'static str, String)>;
}
