mod annotation;
mod app;
mod board;
mod config;
mod error;
pub mod logging;
mod navigator;
mod reader;
mod tree;
mod types;
mod visitor;

pub use annotation::{Annotation, CommentCommand, parse_comment};
pub use app::{App, Command, Feedback};
pub use board::{BoardPosition, position_fen, renderable, replay};
pub use config::{Config, DEFAULT_SOURCE};
pub use error::{ErrorAccumulator, MoveError, RepertoireError};
pub use navigator::{Navigator, TypedMove};
pub use reader::{CompressionMode, load, read_tree, resolve_source};
pub use tree::{GameTree, Mainline, MoveNode, NodeId, PlayedMove};
pub use types::{GameHeaders, Orientation};
pub use visitor::TreeBuilder;
