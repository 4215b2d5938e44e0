//! Matching-and-Fill Orchestration
//!
//! Consumes the platform's accessibility event stream, matches the focused
//! application against the credential store, and drives the selection prompt,
//! the asynchronous decrypt round trip and the fill side effect. One event is
//! handled to completion at a time; the decrypt round trip is the only thing
//! that may suspend a session across event boundaries.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::backend::{DecryptBackend, DecryptOutcome, InteractionHost, ResumeHandle};
use crate::error::{PassfillError, Result};
use crate::events::{EventKind, PlatformCapabilities, UiEvent};
use crate::fill::{scrub_clipboard, Clipboard, FieldDriver};
use crate::matcher::find_candidates;
use crate::prompt::{PromptModel, PromptPresenter};
use crate::session::{DecryptRequest, FillSession, PromptState};
use crate::store::CredentialSource;

/// Inputs accepted by [`AutofillEngine::run`].
#[derive(Debug)]
pub enum EngineCommand {
    /// An event from the platform's accessibility stream.
    Event(UiEvent),
    /// The user confirmed the fill action on the selection prompt.
    ConfirmFill,
    /// The user dismissed the selection prompt.
    CancelPrompt,
    /// The user picked the settings action on the selection prompt.
    OpenSettings,
    /// The transient interaction surface returned successfully.
    InteractionComplete,
}

/// Options consumed from configuration at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions {
    /// Scrub the clipboard with the extra numbered writes after the decoy.
    pub aggressive_clipboard_clear: bool,
}

/// The matching-and-fill engine.
pub struct AutofillEngine {
    store: Arc<dyn CredentialSource>,
    backend: Arc<dyn DecryptBackend>,
    fields: Arc<dyn FieldDriver>,
    clipboard: Arc<dyn Clipboard>,
    prompt: Arc<dyn PromptPresenter>,
    interaction: Arc<dyn InteractionHost>,
    caps: PlatformCapabilities,
    options: FillOptions,
    session: Option<FillSession>,
    /// Set when the engine refocused the field itself; the echoed focus
    /// event must not start a new matching pass.
    suppress_next_focus: bool,
    next_seq: u64,
}

impl AutofillEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn CredentialSource>,
        backend: Arc<dyn DecryptBackend>,
        fields: Arc<dyn FieldDriver>,
        clipboard: Arc<dyn Clipboard>,
        prompt: Arc<dyn PromptPresenter>,
        interaction: Arc<dyn InteractionHost>,
        caps: PlatformCapabilities,
        options: FillOptions,
    ) -> Self {
        Self {
            store,
            backend,
            fields,
            clipboard,
            prompt,
            interaction,
            caps,
            options,
            session: None,
            suppress_next_focus: false,
            next_seq: 0,
        }
    }

    /// Progress of the active session; `None` while idle.
    pub fn prompt_state(&self) -> Option<PromptState> {
        self.session.as_ref().map(|s| s.state)
    }

    /// Resume handle of a suspended interaction round trip, if one is pending.
    pub fn pending_interaction(&self) -> Option<&ResumeHandle> {
        self.session.as_ref().and_then(|s| s.resume.as_ref())
    }

    /// Route one accessibility event. Returns a decrypt request when the
    /// event resumed a suspended fill.
    pub fn handle_event(&mut self, event: &UiEvent) -> Result<Option<DecryptRequest>> {
        // returning to the source app after the backend's interaction screen
        if event.kind == EventKind::WindowStateChanged {
            let resuming = self.session.as_ref().is_some_and(|s| {
                s.state == PromptState::AwaitingUserInteraction
                    && s.interaction_done
                    && s.app_identity == event.app_identity
            });
            if resuming {
                if let Some(session) = self.session.as_mut() {
                    session.interaction_done = false;
                    session.resume = None;
                }
                info!(app = %event.app_identity, "interaction round trip finished, retrying decrypt");
                return self.dispatch_decrypt();
            }
        }

        let qualifying = event.is_password
            && self.caps.password_focus_events
            && event.app_identity != self.backend.ui_identity();

        if !qualifying {
            // a stale prompt must not outlive navigation away from the
            // field; the on-screen keyboard appearing is not navigation
            let keyboard_window =
                event.kind == EventKind::WindowStateChanged && event.from_input_method;
            if !keyboard_window {
                self.dismiss_prompt();
            }
            return Ok(None);
        }

        if self.prompt_showing() {
            // the click that follows the already-handled focus event
            if event.kind == EventKind::Clicked {
                return Ok(None);
            }
            self.dismiss_prompt();
        }

        if self.suppress_next_focus {
            self.suppress_next_focus = false;
            debug!("ignoring echo of our own refocus action");
            return Ok(None);
        }

        let Some(field) = event.field.clone() else {
            debug!("password focus event without a source field");
            return Ok(None);
        };

        let candidates = match find_candidates(self.store.as_ref(), &event.app_label, None) {
            Ok(candidates) => candidates,
            Err(PassfillError::ConfigurationRequired) => {
                self.prompt.request_store_configuration();
                return Err(PassfillError::ConfigurationRequired);
            }
            Err(e) => return Err(e),
        };

        if candidates.is_empty() {
            debug!(app = %event.app_label, "no matching credentials");
            return Ok(None);
        }

        self.next_seq += 1;
        let title = candidates[0].label.clone();
        self.session = Some(FillSession {
            field,
            app_identity: event.app_identity.clone(),
            candidates,
            state: PromptState::Showing,
            resume: None,
            interaction_done: false,
            seq: self.next_seq,
        });
        self.prompt.render(&PromptModel::Selection { title });
        Ok(None)
    }

    /// Fill action on the selection prompt. Returns the decrypt request to
    /// dispatch, or `None` when no prompt was on screen.
    pub fn confirm_fill(&mut self) -> Result<Option<DecryptRequest>> {
        if !self.prompt_showing() {
            debug!("fill confirmed with no selection prompt on screen");
            return Ok(None);
        }
        // the confirm consumes the prompt
        self.prompt.render(&PromptModel::Hidden);
        self.dispatch_decrypt()
    }

    /// Cancel action on the selection prompt. Unconditional and immediate;
    /// an already-dispatched decrypt request is not cancelled and its late
    /// completion is discarded by the sequence guard.
    pub fn cancel_prompt(&mut self) {
        self.dismiss_prompt();
    }

    /// Settings action on the selection prompt. Dismisses it; the
    /// configuration surface itself belongs to the embedding service.
    pub fn open_settings(&mut self) {
        self.dismiss_prompt();
    }

    /// Called by the host when the transient interaction surface finished
    /// successfully. The decrypt retry happens on the next window-return
    /// event of the originating app.
    pub fn notify_interaction_complete(&mut self) {
        if let Some(session) = self.session.as_mut() {
            if session.state == PromptState::AwaitingUserInteraction {
                session.interaction_done = true;
            }
        }
    }

    /// Apply a decrypt outcome. Completions whose sequence number no longer
    /// matches the live session are dropped.
    pub fn complete_decrypt(&mut self, seq: u64, outcome: DecryptOutcome) -> Result<()> {
        let live = self
            .session
            .as_ref()
            .is_some_and(|s| s.seq == seq && s.state == PromptState::AwaitingDecrypt);
        if !live {
            debug!(seq, "decrypt completion for a replaced session, discarding");
            return Ok(());
        }

        match outcome {
            DecryptOutcome::Success(plaintext) => {
                self.apply_fill(plaintext);
                Ok(())
            }
            DecryptOutcome::InteractionRequired(handle) => {
                info!("backend requires user interaction before decrypting");
                if let Some(session) = self.session.as_mut() {
                    session.state = PromptState::AwaitingUserInteraction;
                    session.interaction_done = false;
                    session.resume = Some(handle.clone());
                }
                self.interaction.launch(handle);
                Ok(())
            }
            DecryptOutcome::Failure { code, message } => {
                self.prompt.show_error(&message);
                self.session = None;
                Err(PassfillError::DecryptionFailed { code, message })
            }
        }
    }

    /// Read the first candidate's ciphertext and mark the session as
    /// awaiting the backend.
    fn dispatch_decrypt(&mut self) -> Result<Option<DecryptRequest>> {
        let (seq, location) = match self.session.as_ref() {
            Some(session) => match session.candidates.first() {
                Some(entry) => (session.seq, entry.location.clone()),
                None => {
                    self.session = None;
                    return Ok(None);
                }
            },
            None => return Ok(None),
        };

        let ciphertext = match self.store.read_ciphertext(&location) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(location = %location.display(), "could not read ciphertext, abandoning fill");
                self.session = None;
                return Err(e);
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.state = PromptState::AwaitingDecrypt;
        }
        Ok(Some(DecryptRequest { seq, ciphertext }))
    }

    /// Write line 0 of the plaintext into the originating field. Consumes
    /// the session either way.
    fn apply_fill(&mut self, plaintext: Zeroizing<Vec<u8>>) {
        let Some(session) = self.session.take() else {
            return;
        };

        let text = match std::str::from_utf8(&plaintext) {
            Ok(text) => text,
            Err(e) => {
                error!("decrypted payload is not valid UTF-8: {e}");
                return;
            }
        };
        // line 0 is the credential value; the rest is metadata
        let value = SecretString::from(text.lines().next().unwrap_or_default().to_owned());

        // take focus back before injecting; the echoed focus event is ours
        self.suppress_next_focus = self.fields.refocus(&session.field);

        if self.caps.direct_text_injection {
            if !self.fields.set_text(&session.field, &value) {
                warn!("field rejected direct text injection");
            }
        } else {
            self.clipboard.write(value.expose_secret());
            if !self.fields.perform_paste(&session.field) {
                warn!("paste action failed");
            }
            scrub_clipboard(
                self.clipboard.as_ref(),
                self.options.aggressive_clipboard_clear,
            );
        }

        info!("fill complete");
    }

    fn dismiss_prompt(&mut self) {
        if self.prompt_showing() {
            self.prompt.render(&PromptModel::Hidden);
            self.session = None;
        }
    }

    fn prompt_showing(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.state == PromptState::Showing)
    }

    /// Drive the engine from a command stream until the sender side closes.
    /// Decrypt requests are spawned on the runtime and their completions are
    /// fed back between commands, so each command is still handled atomically.
    pub async fn run(mut self, mut commands: mpsc::Receiver<EngineCommand>) {
        let (result_tx, mut results) = mpsc::channel::<(u64, DecryptOutcome)>(4);

        loop {
            let dispatched = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some((seq, outcome)) = results.recv() => {
                    if let Err(e) = self.complete_decrypt(seq, outcome) {
                        error!("fill attempt failed: {e}");
                    }
                    None
                }
            };

            if let Some(request) = dispatched {
                let backend = Arc::clone(&self.backend);
                let tx = result_tx.clone();
                tokio::spawn(async move {
                    let outcome = backend.decrypt_and_verify(&request.ciphertext).await;
                    let _ = tx.send((request.seq, outcome)).await;
                });
            }
        }

        info!("autofill engine stopped");
    }

    fn handle_command(&mut self, command: EngineCommand) -> Option<DecryptRequest> {
        let result = match command {
            EngineCommand::Event(event) => self.handle_event(&event),
            EngineCommand::ConfirmFill => self.confirm_fill(),
            EngineCommand::CancelPrompt => {
                self.cancel_prompt();
                Ok(None)
            }
            EngineCommand::OpenSettings => {
                self.open_settings();
                Ok(None)
            }
            EngineCommand::InteractionComplete => {
                self.notify_interaction_complete();
                Ok(None)
            }
        };

        match result {
            Ok(request) => request,
            Err(e) if e.is_recoverable() => {
                warn!("autofill attempt abandoned: {e}");
                None
            }
            Err(e) => {
                error!("autofill attempt failed: {e}");
                None
            }
        }
    }
}
