use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Broad category of an output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// Output formats offered in the format dropdown, in display order.
///
/// Keys are upper-case format names (`MP4`); the lower-cased name doubles as the
/// file extension handed to the save dialog. The list is configuration only: the
/// converter never checks that ffmpeg can actually produce a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatCatalog(IndexMap<String, MediaKind>);

impl FormatCatalog {
    /// The formats shipped with the application
    pub fn builtin() -> Self {
        let formats = [
            ("MP4", MediaKind::Video),
            ("MP3", MediaKind::Audio),
            ("GIF", MediaKind::Image),
            ("AVI", MediaKind::Video),
            ("MOV", MediaKind::Video),
            ("WAV", MediaKind::Audio),
            ("FLV", MediaKind::Video),
            ("MKV", MediaKind::Video),
            ("WEBM", MediaKind::Video),
            ("AAC", MediaKind::Audio),
            ("OGG", MediaKind::Audio),
        ];

        Self(
            formats
                .into_iter()
                .map(|(name, kind)| (name.to_string(), kind))
                .collect(),
        )
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Case-insensitive lookup
    pub fn kind(&self, name: &str) -> Option<MediaKind> {
        self.0
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, kind)| *kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// File extension for a format name (`WEBM` → `webm`)
    pub fn extension_for(name: &str) -> String {
        name.trim().trim_start_matches('.').to_lowercase()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order_is_preserved() {
        let catalog = FormatCatalog::builtin();
        let names: Vec<&str> = catalog.names().collect();

        assert_eq!(
            names,
            vec!["MP4", "MP3", "GIF", "AVI", "MOV", "WAV", "FLV", "MKV", "WEBM", "AAC", "OGG"]
        );
        assert_eq!(catalog.len(), 11);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = FormatCatalog::builtin();
        assert_eq!(catalog.kind("mp3"), Some(MediaKind::Audio));
        assert_eq!(catalog.kind("Gif"), Some(MediaKind::Image));
        assert!(!catalog.contains("EXE"));
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(FormatCatalog::extension_for("WEBM"), "webm");
        assert_eq!(FormatCatalog::extension_for(".Mp4"), "mp4");
    }

    #[test]
    fn test_yaml_round_trip_keeps_order() {
        let yaml = "OGG: audio\nMKV: video\n";
        let catalog: FormatCatalog = serde_yaml_ng::from_str(yaml).unwrap();

        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["OGG", "MKV"]);
        assert_eq!(serde_yaml_ng::to_string(&catalog).unwrap(), yaml);
    }
}
