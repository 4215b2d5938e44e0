//! Decryption Backend Capability
//!
//! The engine never decrypts anything itself. An out-of-process service
//! implements decrypt-and-verify; one request yields exactly one of three
//! outcomes, and the interaction-required outcome suspends the fill until a
//! host-provided transient surface has carried the resume handle back to the
//! backend.

use async_trait::async_trait;
use std::fmt;
use zeroize::Zeroizing;

/// Token identifying a pending human-interaction round trip with the backend
/// (e.g. a key unlock). Carried inside the suspended session and handed to
/// the [`InteractionHost`]; never shared across sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeHandle(String);

impl ResumeHandle {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of a decrypt-and-verify request.
pub enum DecryptOutcome {
    /// Plaintext recovered and verified. Zeroized on drop.
    Success(Zeroizing<Vec<u8>>),
    /// The user must complete an out-of-band step before a retry can succeed.
    InteractionRequired(ResumeHandle),
    /// The backend rejected the request.
    Failure { code: i64, message: String },
}

impl fmt::Debug for DecryptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(_) => f.write_str("Success(<redacted>)"),
            Self::InteractionRequired(handle) => {
                f.debug_tuple("InteractionRequired").field(handle).finish()
            }
            Self::Failure { code, message } => f
                .debug_struct("Failure")
                .field("code", code)
                .field("message", message)
                .finish(),
        }
    }
}

/// Asynchronous decrypt-and-verify capability of the external service.
#[async_trait]
pub trait DecryptBackend: Send + Sync {
    async fn decrypt_and_verify(&self, ciphertext: &[u8]) -> DecryptOutcome;

    /// Identity of the backend's own UI, so its windows never trigger
    /// matching against themselves.
    fn ui_identity(&self) -> &str;
}

/// Host-provided transient surface whose sole job is to carry a
/// [`ResumeHandle`] to the backend's interaction UI and then return control
/// to the engine via [`crate::engine::AutofillEngine::notify_interaction_complete`].
pub trait InteractionHost: Send + Sync {
    fn launch(&self, handle: ResumeHandle);
}
