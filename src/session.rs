//! Per-Interaction Fill Session
//!
//! Everything captured at the originating focus event and carried through
//! prompt, decrypt and fill. Exactly one session exists at a time; a new
//! qualifying focus event replaces it wholesale.

use crate::backend::ResumeHandle;
use crate::events::FieldHandle;
use crate::store::CredentialEntry;

/// Progress of the active session. No session at all is the hidden state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// The selection prompt is on screen.
    Showing,
    /// A decrypt request has been dispatched to the backend.
    AwaitingDecrypt,
    /// The backend asked for a human-interaction round trip; waiting for the
    /// originating app's window to return.
    AwaitingUserInteraction,
}

#[derive(Debug)]
pub(crate) struct FillSession {
    /// Field that originated the request; invalid once focus moves on.
    pub field: FieldHandle,
    /// Host app identity, used to recognize the window-return event after an
    /// interaction round trip.
    pub app_identity: String,
    /// Matched leaves in discovery order; the first is the fill target.
    pub candidates: Vec<CredentialEntry>,
    pub state: PromptState,
    /// Round-trip token from the backend, held for the suspension.
    pub resume: Option<ResumeHandle>,
    /// Set when the transient interaction surface reported success.
    pub interaction_done: bool,
    /// Identifies this session's decrypt requests; completions carrying any
    /// other value are stale.
    pub seq: u64,
}

/// Ciphertext snapshot handed to the decryption backend.
#[derive(Debug)]
pub struct DecryptRequest {
    pub seq: u64,
    pub ciphertext: Vec<u8>,
}
