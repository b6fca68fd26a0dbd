// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only conversation transcript.
//!
//! Entries are numbered in the order the orchestrator observed them, which
//! is not necessarily the order the transport produced them.

use serde::{Deserialize, Serialize};

pub const SESSION_STARTED: &str = "Session started";
pub const SESSION_ENDED: &str = "Session ended";
pub const CONVERSATION_ERROR: &str = "Conversation error occurred";
pub const START_FAILED: &str = "Failed to start session";
pub const END_FAILED: &str = "Failed to end session";
pub const SEND_FAILED: &str = "Failed to send message";
pub const SEND_REJECTED: &str = "Cannot send message: no active session";

/// Who an entry is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    Agent,
}

/// Presentation hint for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Speech from the user or the agent
    Message,
    /// Session lifecycle notice
    Notice,
    /// Something went wrong
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub sequence: u64,
    pub origin: Origin,
    pub kind: EntryKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its sequence number (starting at 1).
    pub fn append(&mut self, origin: Origin, kind: EntryKind, text: impl Into<String>) -> u64 {
        let sequence = self.entries.last().map_or(1, |e| e.sequence + 1);
        self.entries.push(TranscriptEntry {
            sequence,
            origin,
            kind,
            text: text.into(),
        });
        sequence
    }

    pub fn user(&mut self, text: impl Into<String>) -> u64 {
        self.append(Origin::User, EntryKind::Message, text)
    }

    pub fn agent(&mut self, text: impl Into<String>) -> u64 {
        self.append(Origin::Agent, EntryKind::Message, text)
    }

    pub fn notice(&mut self, text: impl Into<String>) -> u64 {
        self.append(Origin::Agent, EntryKind::Notice, text)
    }

    pub fn warning(&mut self, text: impl Into<String>) -> u64 {
        self.append(Origin::Agent, EntryKind::Warning, text)
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Entries with a sequence number greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[TranscriptEntry] {
        let start = self.entries.partition_point(|e| e.sequence <= sequence);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
