//! Saving the generated image to disk.

use crate::imagen::GeneratedImage;

/// Filename base used when the prompt yields nothing usable.
pub const DEFAULT_FILENAME: &str = "character-fusion";

/// Derives a filename base from the prompt: the first 30 characters,
/// each non-alphanumeric replaced with `_`, lower-cased. Falls back to
/// [`DEFAULT_FILENAME`] when no alphanumeric character survives.
pub fn filename_for_prompt(prompt: &str) -> String {
    let base: String = prompt
        .chars()
        .take(30)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if base.contains(|c: char| c.is_ascii_alphanumeric()) {
        base
    } else {
        DEFAULT_FILENAME.to_string()
    }
}

/// Opens a native save dialog pre-filled with the prompt-derived name,
/// writes the PNG, and opens the saved file. Cancelling the dialog is a
/// no-op.
pub fn save_image(prompt: &str, image: &GeneratedImage) {
    let filename = format!("{}.png", filename_for_prompt(prompt));

    if let Some(path) = rfd::FileDialog::new().set_file_name(&filename).save_file() {
        match std::fs::write(&path, image.png_bytes()) {
            Ok(()) => {
                tracing::info!("image saved to {}", path.display());
                let _ = opener::open(&path);
            }
            Err(e) => tracing::warn!("failed to save image to {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_non_alphanumerics_and_lowercases() {
        assert_eq!(filename_for_prompt("Buzzwing!!! 123"), "buzzwing____123");
    }

    #[test]
    fn test_truncates_to_thirty_characters_before_sanitizing() {
        let prompt = "A brave and curious little wasp named Buzzwing";
        let derived = filename_for_prompt(prompt);
        assert_eq!(derived, "a_brave_and_curious_little_was");
        assert_eq!(derived.chars().count(), 30);
    }

    #[test]
    fn test_empty_prompt_uses_default() {
        assert_eq!(filename_for_prompt(""), DEFAULT_FILENAME);
    }

    #[test]
    fn test_fully_non_alphanumeric_prompt_uses_default() {
        assert_eq!(filename_for_prompt("!!! ???"), DEFAULT_FILENAME);
    }

    #[test]
    fn test_plain_alphanumeric_prompt_passes_through() {
        assert_eq!(filename_for_prompt("wasp42"), "wasp42");
    }

    #[test]
    fn test_non_ascii_characters_are_replaced() {
        assert_eq!(filename_for_prompt("héro"), "h_ro");
    }
}
