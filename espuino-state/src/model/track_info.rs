//! Track metadata type

use serde::{Deserialize, Serialize};

/// Metadata for the track the device is currently on
///
/// ESPuino only reports a track number and a file-derived title. Artist and
/// album are kept so observers see a complete media description, but nothing
/// on the device populates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Position in the current playlist (1-based)
    pub number: Option<u32>,
    /// Track title
    pub title: Option<String>,
    /// Artist name
    pub artist: Option<String>,
    /// Album name
    pub album: Option<String>,
}

impl TrackInfo {
    /// Create a new empty TrackInfo
    pub fn new() -> Self {
        Self::default()
    }

    /// Create TrackInfo with a title
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Check if track info has any meaningful content
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
    }

    /// Clear every field, returning whether anything was set
    pub fn clear(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        *self = Self::default();
        true
    }

    /// Human-readable one-liner for logs
    pub fn display(&self) -> String {
        match (self.number, self.title.as_deref()) {
            (Some(n), Some(title)) => format!("#{} {}", n, title),
            (None, Some(title)) => title.to_string(),
            (Some(n), None) => format!("#{}", n),
            (None, None) => "<none>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let info = TrackInfo::new();
        assert!(info.title.is_none());
        assert!(info.is_empty());
    }

    #[test]
    fn test_with_title() {
        let info = TrackInfo::with_title("Test Song");
        assert_eq!(info.title, Some("Test Song".to_string()));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_clear_reports_change_once() {
        let mut info = TrackInfo {
            number: Some(3),
            title: Some("Song".to_string()),
            ..Default::default()
        };
        assert!(info.clear());
        assert!(info.is_empty());
        assert!(!info.clear());
    }

    #[test]
    fn test_display() {
        let mut info = TrackInfo::with_title("Song");
        assert_eq!(info.display(), "Song");
        info.number = Some(2);
        assert_eq!(info.display(), "#2 Song");
        assert_eq!(TrackInfo::new().display(), "<none>");
    }
}
