use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct ErrorAccumulator(Option<String>);

impl ErrorAccumulator {
    pub fn push(&mut self, msg: &str) {
        match &mut self.0 {
            Some(existing) => {
                existing.push_str("; ");
                existing.push_str(msg);
            }
            None => {
                self.0 = Some(msg.to_string());
            }
        }
    }

    pub fn take(&mut self) -> Option<String> {
        self.0.take()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }
}

/// Fatal conditions while loading a repertoire.
#[derive(Debug)]
pub enum RepertoireError {
    /// The source file (or every match of a source pattern) is missing.
    NotFound { path: String },
    /// The file exists but could not be read or decoded as game notation.
    Parse {
        path: PathBuf,
        game_index: usize,
        message: String,
    },
}

impl RepertoireError {
    pub(crate) fn parse(
        path: impl Into<PathBuf>,
        game_index: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            game_index,
            message: message.into(),
        }
    }

    pub(crate) fn from_io(path: impl Into<PathBuf>, game_index: usize, err: io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.display().to_string(),
            }
        } else {
            Self::parse(path, game_index, err.to_string())
        }
    }
}

impl fmt::Display for RepertoireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "Repertoire file not found: '{}'", path),
            Self::Parse {
                path,
                game_index,
                message,
            } => write!(
                f,
                "Failed to parse '{}' (game_index={}): {}",
                path.display(),
                game_index,
                message
            ),
        }
    }
}

impl Error for RepertoireError {}

/// Recoverable rejection of typed move text. The cursor never moves when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// Not a move: unparseable, illegal or ambiguous in the current position.
    Format { input: String, reason: String },
    /// A legal move that the loaded tree has no line for.
    UnrecognizedVariation { san: String },
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format { input, reason } => {
                write!(f, "'{}' is not a move here: {}", input, reason)
            }
            Self::UnrecognizedVariation { san } => {
                write!(f, "{} is legal but not part of this repertoire", san)
            }
        }
    }
}

impl Error for MoveError {}
