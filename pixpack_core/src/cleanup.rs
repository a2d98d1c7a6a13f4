use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, warn};

/// Delete `path`, logging instead of failing. Returns whether it was removed.
pub fn remove_best_effort(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("removed {}", path.display());
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("{} was already gone", path.display());
            false
        }
        Err(e) => {
            warn!("could not remove {}: {}", path.display(), e);
            false
        }
    }
}
