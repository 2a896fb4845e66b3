use chrono::NaiveDate;

/// Board side shown at the bottom of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    White,
    Black,
}

impl Orientation {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim();
        if normalized.eq_ignore_ascii_case("white") || normalized.eq_ignore_ascii_case("w") {
            Some(Self::White)
        } else if normalized.eq_ignore_ascii_case("black") || normalized.eq_ignore_ascii_case("b") {
            Some(Self::Black)
        } else {
            None
        }
    }
}

/// Tag pairs of the loaded game.
#[derive(Debug, Clone, Default)]
pub struct GameHeaders {
    pub event: Option<String>,
    pub site: Option<String>,
    pub date: Option<NaiveDate>,
    pub round: Option<String>,
    pub white: Option<String>,
    pub black: Option<String>,
    pub result: Option<String>,

    // Opening info
    pub eco: Option<String>,
    pub opening: Option<String>,
    pub annotator: Option<String>,

    // Study export extras (lichess)
    pub chapter: Option<String>,
    pub orientation: Option<Orientation>,

    /// Custom start position, as written in the `FEN` tag.
    pub fen: Option<String>,

    /// Non-fatal header conversion and movetext problems, `"; "`-joined.
    pub diagnostics: Option<String>,
}

impl GameHeaders {
    /// Short human title: chapter, then opening, then event.
    pub fn title(&self) -> Option<&str> {
        self.chapter
            .as_deref()
            .or(self.opening.as_deref())
            .or(self.event.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_parse() {
        assert_eq!(Orientation::parse("black"), Some(Orientation::Black));
        assert_eq!(Orientation::parse(" White "), Some(Orientation::White));
        assert_eq!(Orientation::parse("b"), Some(Orientation::Black));
        assert_eq!(Orientation::parse("purple"), None);
    }

    #[test]
    fn test_title_precedence() {
        let mut headers = GameHeaders {
            event: Some("Study".to_string()),
            ..GameHeaders::default()
        };
        assert_eq!(headers.title(), Some("Study"));

        headers.opening = Some("Sicilian Defense".to_string());
        assert_eq!(headers.title(), Some("Sicilian Defense"));

        headers.chapter = Some("Chapter 1".to_string());
        assert_eq!(headers.title(), Some("Chapter 1"));
    }
}
