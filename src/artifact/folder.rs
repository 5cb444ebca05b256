//! Folder-name sanitization and collision-safe renaming.

use std::path::Path;

use tracing::{debug, warn};

use super::ApplyOutcome;

/// Derives the on-disk folder name for a matched catalog title.
///
/// Every character that is not alphanumeric becomes a space, runs of
/// whitespace collapse to a single space, and the result is trimmed.
/// Unicode letters and digits survive, so accented titles keep their
/// accents.
#[must_use]
pub fn sanitize_folder_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renames `item_dir` in place to the sanitized form of `title`.
///
/// The rename is skipped when the sanitized name is empty, when a sibling
/// with that exact name already exists (the item directory itself included,
/// which is what makes re-runs idempotent), or when the filesystem refuses
/// the rename. A skip never fails the item; subsequent artifact steps keep
/// using the original directory.
pub(crate) async fn rename_to_title(item_dir: &Path, title: &str) -> ApplyOutcome {
    let target_name = sanitize_folder_name(title);
    if target_name.is_empty() {
        debug!(
            dir = %item_dir.display(),
            "sanitized folder name is empty, keeping current name"
        );
        return ApplyOutcome::Skipped;
    }

    let Some(parent) = item_dir.parent() else {
        debug!(
            dir = %item_dir.display(),
            "item directory has no parent, keeping current name"
        );
        return ApplyOutcome::Skipped;
    };

    let target = parent.join(&target_name);
    if target == item_dir {
        debug!(
            dir = %item_dir.display(),
            "directory already carries the catalog title"
        );
        return ApplyOutcome::Skipped;
    }
    if target.exists() {
        debug!(
            from = %item_dir.display(),
            to = %target.display(),
            "target folder name already taken, keeping current name"
        );
        return ApplyOutcome::Skipped;
    }

    match tokio::fs::rename(item_dir, &target).await {
        Ok(()) => {
            debug!(
                from = %item_dir.display(),
                to = %target.display(),
                "item directory renamed"
            );
            ApplyOutcome::RenamedTo(target)
        }
        Err(e) => {
            warn!(
                from = %item_dir.display(),
                to = %target.display(),
                error = %e,
                "rename failed, keeping current name"
            );
            ApplyOutcome::Skipped
        }
    }
}
