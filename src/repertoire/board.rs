use super::annotation::{Annotation, parse_comment};
use super::tree::{GameTree, NodeId};
use super::types::Orientation;

use shakmaty::fen::Fen;
use shakmaty::san::SanError;
use shakmaty::{Board, Chess, Color, EnPassantMode, File, Position, Rank, Square};
use std::fmt::Write;

/// Snapshot of one node, everything a presentation layer needs to draw it.
#[derive(Debug, Clone)]
pub struct BoardPosition {
    pub fen: String,
    pub board: Board,
    pub side_to_move: Color,
    pub fullmove: u32,
    pub ply: u32,
    /// `"2... Nc6"` style label of the move that led here.
    pub last_move: Option<String>,
    pub in_check: bool,
    /// Comment written before the move, at the head of a variation.
    pub starting_annotation: Option<Annotation>,
    pub annotation: Option<Annotation>,
    /// Number of continuations stored in the tree.
    pub continuations: usize,
}

pub fn position_fen(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal);
    fen.to_string()
}

fn non_empty_annotation(raw: &str) -> Option<Annotation> {
    Some(parse_comment(raw)).filter(|annotation| !annotation.is_empty())
}

pub fn renderable(tree: &GameTree, id: NodeId) -> BoardPosition {
    let node = tree.node(id);
    let pos = node.position();

    BoardPosition {
        fen: position_fen(pos),
        board: pos.board().clone(),
        side_to_move: pos.turn(),
        fullmove: pos.fullmoves().get(),
        ply: node.ply(),
        last_move: tree.move_label(id),
        in_check: pos.is_check(),
        starting_annotation: node.starting_comment().and_then(non_empty_annotation),
        annotation: node.comment().and_then(non_empty_annotation),
        continuations: node.children().len(),
    }
}

/// Rebuild the position at `id` by replaying the recorded SANs from the
/// start position, without touching the cached node positions.
pub fn replay(tree: &GameTree, id: NodeId) -> Result<Chess, SanError> {
    let mut pos = tree.start_position().clone();
    for san in tree.line_to(id) {
        let m = san.san.to_move(&pos)?;
        pos.play_unchecked(m);
    }
    Ok(pos)
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

impl BoardPosition {
    /// 8x8 text diagram, uppercase for White, `.` for empty squares.
    pub fn diagram(&self, orientation: Orientation) -> String {
        let (ranks, files): (Vec<Rank>, Vec<File>) = match orientation {
            Orientation::White => (
                Rank::ALL.iter().rev().copied().collect(),
                File::ALL.to_vec(),
            ),
            Orientation::Black => (
                Rank::ALL.to_vec(),
                File::ALL.iter().rev().copied().collect(),
            ),
        };

        let mut out = String::with_capacity(256);
        out.push_str("  +-----------------+\n");
        for rank in &ranks {
            let _ = write!(out, "{} |", rank.char());
            for file in &files {
                let square = Square::from_coords(*file, *rank);
                let glyph = self.board.piece_at(square).map_or('.', |p| p.char());
                out.push(' ');
                out.push(glyph);
            }
            out.push_str(" |\n");
        }
        out.push_str("  +-----------------+\n   ");
        for file in &files {
            out.push(' ');
            out.push(file.char());
        }
        out.push('\n');
        out
    }

    pub fn to_json(&self) -> String {
        let annotation_json = |a: &Annotation| {
            let commands: Vec<serde_json::Value> = a
                .commands
                .iter()
                .map(|c| serde_json::json!({ "name": c.name, "value": c.value }))
                .collect();
            serde_json::json!({ "text": a.text, "commands": commands })
        };
        let starting_annotation = self.starting_annotation.as_ref().map(annotation_json);
        let annotation = self.annotation.as_ref().map(annotation_json);

        serde_json::json!({
            "fen": self.fen,
            "side_to_move": color_name(self.side_to_move),
            "fullmove": self.fullmove,
            "ply": self.ply,
            "last_move": self.last_move,
            "in_check": self.in_check,
            "starting_annotation": starting_annotation,
            "annotation": annotation,
            "continuations": self.continuations,
        })
        .to_string()
    }
}
