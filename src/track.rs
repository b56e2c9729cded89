//! Generated track records.

/// Immutable descriptor of one generated song.
///
/// `id` is the identity: list key and controller arena key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub url: String,
    pub lyrics: Option<String>,
}

impl TrackRecord {
    /// Lyrics with surrounding whitespace removed, if any are left.
    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Build the artist line shown under a generated song, e.g.
/// `"AI Generated • Synthwave"`.
pub fn artist_line(artist: &str, genre: &str) -> String {
    match genre.trim() {
        "" => artist.to_string(),
        g => format!("{} • {}", artist.trim(), g),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_line_joins_artist_and_genre() {
        assert_eq!(artist_line("AI Generated", "Pop"), "AI Generated • Pop");
        assert_eq!(artist_line(" AI Generated ", "  Rock "), "AI Generated • Rock");
        assert_eq!(artist_line("AI Generated", "   "), "AI Generated");
    }

    #[test]
    fn blank_lyrics_are_treated_as_absent() {
        let mut t = TrackRecord {
            id: "1".into(),
            title: "Song".into(),
            artist: "AI Generated".into(),
            genre: "Pop".into(),
            url: "/tmp/a.wav".into(),
            lyrics: Some("  \n ".into()),
        };
        assert_eq!(t.lyrics(), None);
        t.lyrics = Some(" la la \n".into());
        assert_eq!(t.lyrics(), Some("la la"));
    }
}
