use super::error::ErrorAccumulator;
use super::tree::{GameTree, NodeId};
use super::types::{GameHeaders, Orientation};

use chrono::{Datelike, NaiveDate};
use pgn_reader::{Nag, Outcome, RawComment, RawTag, SanPlus, Skip, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess};
use std::mem;
use std::ops::ControlFlow;

/// Tag values collected before movetext starts. First value wins.
#[derive(Default)]
pub struct HeaderFields {
    event: String,
    site: String,
    date: String,
    round: String,
    white: String,
    black: String,
    result: String,
    eco: String,
    opening: String,
    annotator: String,
    chapter: String,
    orientation: String,
    fen: String,
    seen_tags: bool,
}

impl HeaderFields {
    fn opt_take(field: &mut String) -> Option<String> {
        if field.is_empty() {
            None
        } else {
            Some(mem::take(field))
        }
    }

    fn set_known_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        self.seen_tags = true;
        let slot: &mut String = match key {
            b"Event" => &mut self.event,
            b"Site" => &mut self.site,
            b"Date" => &mut self.date,
            b"Round" => &mut self.round,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"Result" => &mut self.result,
            b"ECO" => &mut self.eco,
            b"Opening" => &mut self.opening,
            b"Annotator" => &mut self.annotator,
            b"ChapterName" => &mut self.chapter,
            b"Orientation" => &mut self.orientation,
            b"FEN" => &mut self.fen,
            _ => return,
        };

        if !slot.is_empty() {
            return;
        }

        let bytes = value.as_bytes();
        if bytes.is_empty() {
            return;
        }

        *slot = String::from_utf8_lossy(bytes).into_owned();
    }

    fn into_headers(mut self) -> GameHeaders {
        let mut diagnostics = ErrorAccumulator::default();

        let date = parse_date_field(&self.date, &mut diagnostics);
        let orientation = match HeaderFields::opt_take(&mut self.orientation) {
            Some(raw) => {
                let parsed = Orientation::parse(&raw);
                if parsed.is_none() {
                    diagnostics.push(&format!("Conversion error: Orientation='{}'", raw));
                }
                parsed
            }
            None => None,
        };

        GameHeaders {
            event: HeaderFields::opt_take(&mut self.event),
            site: HeaderFields::opt_take(&mut self.site),
            date,
            round: HeaderFields::opt_take(&mut self.round),
            white: HeaderFields::opt_take(&mut self.white),
            black: HeaderFields::opt_take(&mut self.black),
            result: HeaderFields::opt_take(&mut self.result),
            eco: HeaderFields::opt_take(&mut self.eco),
            opening: HeaderFields::opt_take(&mut self.opening),
            annotator: HeaderFields::opt_take(&mut self.annotator),
            chapter: HeaderFields::opt_take(&mut self.chapter),
            orientation,
            fen: HeaderFields::opt_take(&mut self.fen),
            diagnostics: diagnostics.take(),
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_day_next_month = if month == 12 {
        let next_year = year.checked_add(1)?;
        NaiveDate::from_ymd_opt(next_year, 1, 1)?
    } else {
        let next_month = month.checked_add(1)?;
        NaiveDate::from_ymd_opt(year, next_month, 1)?
    };

    first_day_next_month.pred_opt().map(|d| d.day())
}

/// `YYYY.MM.DD` with `??` placeholders. Unknown month/day fall back to 1,
/// an unknown year means no date, an overlong day is clamped to the month.
fn parse_date_field(raw: &str, diagnostics: &mut ErrorAccumulator) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let norm = s.replace('.', "-");
    let parts: Vec<&str> = norm.split('-').collect();
    if parts.len() != 3 {
        diagnostics.push(&format!("Conversion error: Date='{}'", s));
        return None;
    }

    if parts[0].contains('?') {
        return None;
    }

    let field = |part: &str| -> Option<u32> {
        if part.contains('?') {
            Some(1)
        } else {
            part.parse::<u32>().ok()
        }
    };

    let (Ok(year), Some(month), Some(day)) =
        (parts[0].parse::<i32>(), field(parts[1]), field(parts[2]))
    else {
        diagnostics.push(&format!("Conversion error: Date='{}'", s));
        return None;
    };

    let Some(last_day) = last_day_of_month(year, month) else {
        diagnostics.push(&format!(
            "Conversion error: Date='{}' (chrono: input is out of range)",
            s
        ));
        return None;
    };

    let date = NaiveDate::from_ymd_opt(year, month, day.clamp(1, last_day));
    if date.is_none() {
        diagnostics.push(&format!(
            "Conversion error: Date='{}' (chrono: input is out of range)",
            s
        ));
    }
    date
}

/// Movetext under construction: the tree plus the insertion point.
pub struct TreeCursor {
    tree: GameTree,
    current: NodeId,
    variation_stack: Vec<NodeId>,
    at_variation_start: bool,
    starting_comment: Option<String>,
    outcome: Option<String>,
    seen_tags: bool,
    stray_closes: usize,
}

impl TreeCursor {
    fn new(tree: GameTree, seen_tags: bool) -> Self {
        Self {
            tree,
            current: NodeId::ROOT,
            variation_stack: Vec::new(),
            at_variation_start: false,
            starting_comment: None,
            outcome: None,
            seen_tags,
            stray_closes: 0,
        }
    }
}

fn normalize_comment(raw: RawComment<'_>) -> String {
    let text = String::from_utf8_lossy(raw.as_bytes());
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn append_comment(slot: &mut Option<String>, text: String) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(&text);
        }
        None => *slot = Some(text),
    }
}

/// Builds a [`GameTree`] with all variations, comments and NAGs of one game.
///
/// Each SAN is resolved against the position of its parent node, so an
/// illegal or ambiguous move ends the game with an error message instead of
/// producing an inconsistent tree.
#[derive(Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl Visitor for TreeBuilder {
    type Tags = HeaderFields;
    type Movetext = TreeCursor;
    type Output = Result<GameTree, String>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(HeaderFields::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.set_known_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let seen_tags = tags.seen_tags;
        let headers = tags.into_headers();

        let start = match headers.fen.as_deref() {
            None => Chess::default(),
            Some(raw) => {
                let parsed = raw
                    .parse::<Fen>()
                    .map_err(|e| format!("invalid FEN tag '{}': {}", raw, e))
                    .and_then(|fen| {
                        fen.into_position::<Chess>(CastlingMode::Standard)
                            .map_err(|e| format!("illegal FEN position '{}': {}", raw, e))
                    });
                match parsed {
                    Ok(pos) => pos,
                    Err(msg) => return ControlFlow::Break(Err(msg)),
                }
            }
        };

        ControlFlow::Continue(TreeCursor::new(GameTree::new(headers, start), seen_tags))
    }

    fn begin_variation(
        &mut self,
        movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        // A variation replaces the last move, so it needs one to branch from.
        let Some(parent) = movetext.tree.node(movetext.current).parent() else {
            log::warn!("Skipping variation without a preceding move");
            return ControlFlow::Continue(Skip(true));
        };

        movetext.variation_stack.push(movetext.current);
        movetext.current = parent;
        movetext.at_variation_start = true;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, movetext: &mut Self::Movetext) -> ControlFlow<Self::Output> {
        match movetext.variation_stack.pop() {
            Some(resume) => movetext.current = resume,
            None => movetext.stray_closes += 1,
        }
        movetext.at_variation_start = false;
        movetext.starting_comment = None;
        ControlFlow::Continue(())
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san: SanPlus) -> ControlFlow<Self::Output> {
        let parent = movetext.current;
        let position = movetext.tree.node(parent).position();

        let mv = match san.san.to_move(position) {
            Ok(mv) => mv,
            Err(e) => {
                let ply = movetext.tree.node(parent).ply() + 1;
                return ControlFlow::Break(Err(format!(
                    "move '{}' at ply {} is not playable: {}",
                    san, ply, e
                )));
            }
        };

        let child = movetext.tree.add_child(parent, san, mv);
        if let Some(comment) = movetext.starting_comment.take() {
            append_comment(&mut movetext.tree.node_mut(child).starting_comment, comment);
        }
        movetext.current = child;
        movetext.at_variation_start = false;
        ControlFlow::Continue(())
    }

    fn nag(&mut self, movetext: &mut Self::Movetext, nag: Nag) -> ControlFlow<Self::Output> {
        if movetext.current != NodeId::ROOT && !movetext.at_variation_start {
            movetext.tree.node_mut(movetext.current).nags.push(nag.0);
        }
        ControlFlow::Continue(())
    }

    fn comment(
        &mut self,
        movetext: &mut Self::Movetext,
        comment: RawComment<'_>,
    ) -> ControlFlow<Self::Output> {
        let text = normalize_comment(comment);
        if text.is_empty() {
            return ControlFlow::Continue(());
        }

        if movetext.at_variation_start {
            append_comment(&mut movetext.starting_comment, text);
        } else {
            let current = movetext.current;
            append_comment(&mut movetext.tree.node_mut(current).comment, text);
        }
        ControlFlow::Continue(())
    }

    fn outcome(
        &mut self,
        movetext: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        movetext.outcome = Some(outcome.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        let TreeCursor {
            mut tree,
            outcome,
            seen_tags,
            variation_stack,
            stray_closes,
            ..
        } = movetext;

        if tree.is_empty() && !seen_tags && outcome.is_none() {
            return Err("no game notation found".to_string());
        }

        let headers = tree.headers_mut();
        if headers.result.is_none() {
            headers.result = outcome;
        }

        // Unbalanced parentheses still load; the tree is kept as far as it was read.
        let mut issues = ErrorAccumulator::default();
        if let Some(existing) = headers.diagnostics.take() {
            issues.push(&existing);
        }
        if !variation_stack.is_empty() {
            issues.push(&format!(
                "Unbalanced movetext: {} unclosed variation(s)",
                variation_stack.len()
            ));
        }
        if stray_closes > 0 {
            issues.push(&format!("Unbalanced movetext: {} unmatched ')'", stray_closes));
        }
        headers.diagnostics = issues.take();

        Ok(tree)
    }
}

/// Consumes a game without building anything.
#[derive(Default)]
pub struct GameSkipper;

impl Visitor for GameSkipper {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn san(&mut self, _: &mut Self::Movetext, _: SanPlus) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {}
}
