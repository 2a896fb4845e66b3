use super::board::BoardPosition;
use super::config::Config;
use super::error::RepertoireError;
use super::navigator::{Navigator, TypedMove};
use super::reader;
use super::tree::GameTree;
use super::types::Orientation;

/// One user action, as relayed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Back,
    Forward,
    End,
    /// Show the stored continuations from the current node.
    Candidates,
    /// Free text from the move field; empty asks for a random reply.
    Typed(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "<<" => Self::Start,
            "<" => Self::Back,
            ">" => Self::Forward,
            ">>" => Self::End,
            "?" => Self::Candidates,
            text => Self::Typed(text.to_string()),
        }
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub board: BoardPosition,
    pub message: Option<String>,
}

/// Application state built once at startup and handed to the front end.
pub struct App {
    navigator: Navigator,
    orientation: Orientation,
    autoplay_reply: bool,
}

impl App {
    pub fn new(tree: GameTree, config: &Config) -> Self {
        let orientation = config
            .orientation
            .or(tree.headers().orientation)
            .unwrap_or_default();

        let navigator = match config.seed {
            Some(seed) => Navigator::with_seed(tree, seed),
            None => Navigator::new(tree),
        };

        Self {
            navigator,
            orientation,
            autoplay_reply: config.autoplay_reply,
        }
    }

    /// Load the configured repertoire; missing or malformed files are fatal.
    pub fn load(config: &Config) -> Result<Self, RepertoireError> {
        let tree = reader::load(config)?;
        Ok(Self::new(tree, config))
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn board(&self) -> BoardPosition {
        self.navigator.board()
    }

    pub fn dispatch(&mut self, command: Command) -> Feedback {
        let message = match command {
            Command::Start => {
                self.navigator.to_start();
                None
            }
            Command::Back => {
                self.navigator.step_back();
                None
            }
            Command::Forward => {
                self.navigator.step_forward_mainline();
                None
            }
            Command::End => {
                self.navigator.to_end();
                None
            }
            Command::Candidates => Some(self.describe_candidates()),
            Command::Typed(text) => self.typed(&text),
        };

        Feedback {
            board: self.navigator.board(),
            message,
        }
    }

    fn typed(&mut self, text: &str) -> Option<String> {
        match self.navigator.apply_typed_move(text) {
            Ok(TypedMove::Played(_)) if self.autoplay_reply => {
                match self.navigator.step_forward_random() {
                    Some(reply) => {
                        let label = self.navigator.tree().move_label(reply)?;
                        Some(format!("Reply: {}", label))
                    }
                    None => Some("End of line".to_string()),
                }
            }
            Ok(TypedMove::Played(_)) => None,
            Ok(TypedMove::RandomReply(reply)) => {
                let label = self.navigator.tree().move_label(reply)?;
                Some(format!("Reply: {}", label))
            }
            Ok(TypedMove::NoReply) => Some("End of line".to_string()),
            Err(err) => {
                log::debug!("Rejected typed move: {}", err);
                Some(err.to_string())
            }
        }
    }

    fn describe_candidates(&self) -> String {
        let candidates = self.navigator.candidates();
        if candidates.is_empty() {
            "No stored continuations".to_string()
        } else {
            format!("Continuations: {}", candidates.join(", "))
        }
    }
}
