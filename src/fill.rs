//! Field Injection and Clipboard Fallback
//!
//! Platform seams for writing a credential into the focused field. Direct
//! text injection is preferred; platforms without it stage the value on the
//! clipboard, paste, and then scrub the clipboard. A secret written to the
//! clipboard is always overwritten on the same control path before the fill
//! step returns.

use crate::events::FieldHandle;
use secrecy::SecretString;

/// Field I/O provided by the platform's accessibility bridge.
pub trait FieldDriver: Send + Sync {
    /// Inject `value` directly as the field's text. `false` when the field
    /// rejected the action.
    fn set_text(&self, field: &FieldHandle, value: &SecretString) -> bool;

    /// Trigger a paste action on the field.
    fn perform_paste(&self, field: &FieldHandle) -> bool;

    /// Return focus to the field. `false` when the node is gone.
    fn refocus(&self, field: &FieldHandle) -> bool;
}

/// Shared system clipboard.
pub trait Clipboard: Send + Sync {
    fn write(&self, text: &str);
}

/// Staged over the secret as soon as the paste has fired.
pub(crate) const CLIPBOARD_DECOY: &str = "MyPasswordIsDaBest!";

/// Extra numbered overwrites when aggressive clearing is on, pushing the
/// secret out of bounded clipboard histories.
pub(crate) const AGGRESSIVE_CLEAR_WRITES: usize = 19;

/// Scrub the clipboard after a secret write: always the decoy, plus the
/// numbered throwaway values when `aggressive` is set.
pub(crate) fn scrub_clipboard(clipboard: &dyn Clipboard, aggressive: bool) {
    clipboard.write(CLIPBOARD_DECOY);
    if aggressive {
        for i in 0..AGGRESSIVE_CLEAR_WRITES {
            clipboard.write(&i.to_string());
        }
    }
}
