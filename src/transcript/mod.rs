//! Incremental transcript assembly
//!
//! Speech engines re-deliver the entire result sequence from session start
//! on every callback, re-sending entries that were already finalized. The
//! buffer's index gate is the only thing standing between that behavior and
//! duplicated output: entries below `last_processed_index` are skipped,
//! final entries advance the gate, interim entries are only ever replaced.

use tracing::debug;

/// Monotonically growing transcript for one recognition session
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    /// Concatenation of all finalized segments, each followed by one space.
    /// Append-only within a session.
    accumulated_final: String,

    /// Index of the first result entry not yet finalized. Never decreases
    /// within a session; reset to 0 only when a new session starts.
    last_processed_index: usize,

    /// Latest provisional segment, replaced wholesale on every update
    interim_text: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result entry into the buffer.
    ///
    /// `index` is the entry's position in the engine's cumulative result
    /// sequence. Returns whether the preview text changed.
    pub fn apply(&mut self, index: usize, text: &str, is_final: bool) -> bool {
        if index < self.last_processed_index {
            // Already finalized; the engine is re-sending it
            return false;
        }

        if is_final {
            self.accumulated_final.push_str(text);
            self.accumulated_final.push(' ');
            self.last_processed_index = index + 1;
            // The finalized entry supersedes whatever interim text previewed it
            self.interim_text.clear();
            debug!(
                "Finalized segment {} ({} chars total)",
                index,
                self.accumulated_final.len()
            );
            true
        } else {
            let changed = self.interim_text != text;
            if changed {
                self.interim_text.clear();
                self.interim_text.push_str(text);
            }
            changed
        }
    }

    /// Live display text: finalized transcript plus the current interim tail
    pub fn preview(&self) -> String {
        format!("{}{}", self.accumulated_final, self.interim_text)
    }

    /// Finalized transcript only
    pub fn accumulated_final(&self) -> &str {
        &self.accumulated_final
    }

    pub fn last_processed_index(&self) -> usize {
        self.last_processed_index
    }

    pub fn interim_text(&self) -> &str {
        &self.interim_text
    }

    /// Number of finalized segments so far
    pub fn finalized_segments(&self) -> usize {
        self.last_processed_index
    }

    /// Clear everything. Called only at session start.
    pub fn reset(&mut self) {
        self.accumulated_final.clear();
        self.last_processed_index = 0;
        self.interim_text.clear();
    }
}
