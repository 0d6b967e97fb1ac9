// ── Now-playing metadata ──

use serde::Serialize;

/// `netRemote.play.info.*` as read in one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    pub station_name: Option<String>,
    pub station_text: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub graphic_uri: Option<String>,
}

impl NowPlaying {
    /// Title shown for the current item: the station or track name.
    pub fn title(&self) -> Option<&str> {
        self.station_name.as_deref()
    }

    /// The artist node when the source provides one, else the scrolling
    /// station text. Most radio stations only fill the latter.
    pub fn media_artist(&self) -> Option<&str> {
        self.artist
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .or(self.station_text.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.station_name.is_none()
            && self.station_text.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.graphic_uri.is_none()
    }
}
