// Native file pickers
//
// The GUI only talks to the FilePicker trait so the browse flow can be tested
// without opening real dialogs.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Source of user-chosen paths
#[cfg_attr(test, mockall::automock)]
pub trait FilePicker {
    /// Ask for an existing input file
    fn choose_input(&self) -> Option<Utf8PathBuf>;

    /// Ask where to save the output, suggesting `default_extension` (e.g. `mp4`)
    fn choose_save_path(&self, default_extension: &str) -> Option<Utf8PathBuf>;
}

/// Picker backed by the platform's native dialogs (`rfd`)
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeFilePicker;

impl FilePicker for NativeFilePicker {
    fn choose_input(&self) -> Option<Utf8PathBuf> {
        let picked = rfd::FileDialog::new()
            .set_title("Select File")
            .add_filter("All Files", &["*"])
            .pick_file();

        picked.and_then(to_utf8)
    }

    fn choose_save_path(&self, default_extension: &str) -> Option<Utf8PathBuf> {
        let mut dialog = rfd::FileDialog::new().set_title("Save As");
        if !default_extension.is_empty() {
            dialog = dialog.add_filter(default_extension.to_uppercase(), &[default_extension]);
        }

        dialog
            .save_file()
            .and_then(to_utf8)
            .map(|path| with_default_extension(path, default_extension))
    }
}

fn to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::try_from(path)
        .map_err(|e| {
            tracing::error!("Failed to convert path to UTF-8: {}", e);
            e
        })
        .ok()
}

/// Append `extension` when `path` has none
pub fn with_default_extension(mut path: Utf8PathBuf, extension: &str) -> Utf8PathBuf {
    let extension = extension.trim_start_matches('.');
    if path.extension().is_none() && !extension.is_empty() {
        path.set_extension(extension);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extension_added_when_missing() {
        assert_eq!(
            with_default_extension(Utf8PathBuf::from("/out/holiday"), "mp4"),
            Utf8PathBuf::from("/out/holiday.mp4")
        );
    }

    #[test]
    fn test_existing_extension_is_kept() {
        assert_eq!(
            with_default_extension(Utf8PathBuf::from("/out/holiday.mkv"), "mp4"),
            Utf8PathBuf::from("/out/holiday.mkv")
        );
    }

    #[test]
    fn test_empty_or_dotted_extension() {
        assert_eq!(
            with_default_extension(Utf8PathBuf::from("clip"), ""),
            Utf8PathBuf::from("clip")
        );
        assert_eq!(
            with_default_extension(Utf8PathBuf::from("clip"), ".wav"),
            Utf8PathBuf::from("clip.wav")
        );
    }

    proptest! {
        #[test]
        fn prop_result_always_has_an_extension(stem in "[a-zA-Z0-9_ ]{1,16}", ext in "[a-z0-9]{1,5}") {
            let path = with_default_extension(Utf8PathBuf::from(format!("/out/{stem}")), &ext);
            prop_assert!(path.extension().is_some());
            prop_assert_eq!(path.file_stem(), Some(stem.as_str()));
        }
    }
}
