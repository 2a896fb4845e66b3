use super::reader::CompressionMode;
use super::types::Orientation;

pub const DEFAULT_SOURCE: &str = "repertoires/repertoire.pgn";

/// Startup settings. There are no flags; the front end uses the defaults and
/// embedders adjust them with the chained setters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path or glob pattern of the repertoire file.
    pub source: String,
    /// Which game of a multi-game file to load.
    pub game_index: usize,
    /// Overrides the extension-based guess when set.
    pub compression: Option<CompressionMode>,
    /// Overrides the `Orientation` tag when set.
    pub orientation: Option<Orientation>,
    /// Answer each accepted typed move with a random reply from the tree.
    pub autoplay_reply: bool,
    /// Fixed seed for the reply picker; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            game_index: 0,
            compression: None,
            orientation: None,
            autoplay_reply: false,
            seed: None,
        }
    }
}

impl Config {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_game_index(mut self, game_index: usize) -> Self {
        self.game_index = game_index;
        self
    }

    pub fn with_compression(mut self, compression: CompressionMode) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_autoplay_reply(mut self, autoplay_reply: bool) -> Self {
        self.autoplay_reply = autoplay_reply;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
