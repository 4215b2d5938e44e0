//! Candidate Matching
//!
//! Maps the focused application's label to credential entries by recursive
//! case-insensitive substring containment over the store tree.

use crate::error::Result;
use crate::store::{CredentialEntry, CredentialSource, EntryKind};
use std::path::Path;
use tracing::debug;

/// Collect the leaf entries matching `target_label`, in depth-first order.
///
/// A category is never a candidate itself: a category whose own label matches
/// opens its whole subtree instead, so the match surfaces as its descendant
/// leaves. A leaf otherwise matches on its own label. An empty target matches
/// every leaf. The first returned entry is the default fill target.
pub fn find_candidates(
    source: &dyn CredentialSource,
    target_label: &str,
    root: Option<&Path>,
) -> Result<Vec<CredentialEntry>> {
    let needle = target_label.to_lowercase();
    let mut matches = Vec::new();
    collect(source, &needle, root, &mut matches)?;
    debug!(
        target = target_label,
        candidates = matches.len(),
        "credential matching pass finished"
    );
    Ok(matches)
}

fn collect(
    source: &dyn CredentialSource,
    needle: &str,
    dir: Option<&Path>,
    out: &mut Vec<CredentialEntry>,
) -> Result<()> {
    for entry in source.list(dir)? {
        match entry.kind {
            EntryKind::Category => {
                let sub_needle = if entry.label.to_lowercase().contains(needle) {
                    ""
                } else {
                    needle
                };
                collect(source, sub_needle, Some(&entry.location), out)?;
            }
            EntryKind::Leaf => {
                if entry.label.to_lowercase().contains(needle) {
                    out.push(entry);
                }
            }
        }
    }
    Ok(())
}
