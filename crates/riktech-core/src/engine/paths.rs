// Where RikTech keeps its files on disk.

use crate::atoms::constants::{DATA_DIR_NAME, SESSIONS_DIR};
use std::path::{Path, PathBuf};

/// `<platform data dir>/riktech`, or `./data` when the platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn sessions_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSIONS_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dir_is_named_for_the_app() {
        let d = default_data_dir();
        assert!(d.ends_with(DATA_DIR_NAME) || d.ends_with("data"));
    }

    #[test]
    fn test_sessions_dir_nests_under_data_dir() {
        assert_eq!(sessions_dir(Path::new("/tmp/rt")), PathBuf::from("/tmp/rt/sessions"));
    }
}
