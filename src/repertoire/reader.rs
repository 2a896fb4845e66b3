use super::config::Config;
use super::error::RepertoireError;
use super::tree::GameTree;
use super::visitor::{GameSkipper, TreeBuilder};

use pgn_reader::Reader;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Zstd,
}

impl CompressionMode {
    /// `.zst` means zstd, anything else is read as plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }
}

fn is_pattern(source: &str) -> bool {
    source.contains('*') || source.contains('?') || source.contains('[')
}

/// Turn the configured source into one concrete path. A glob pattern picks
/// its first match in lexicographic order.
pub fn resolve_source(source: &str) -> Result<PathBuf, RepertoireError> {
    if !is_pattern(source) {
        return Ok(PathBuf::from(source));
    }

    let entries = glob::glob(source).map_err(|e| {
        RepertoireError::parse(source, 0, format!("invalid source pattern: {}", e))
    })?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|entry| entry.ok()).collect();
    paths.sort();

    if paths.len() > 1 {
        log::warn!(
            "Source pattern '{}' matched {} files; using '{}'",
            source,
            paths.len(),
            paths[0].display()
        );
    }

    paths
        .into_iter()
        .next()
        .ok_or_else(|| RepertoireError::NotFound {
            path: source.to_string(),
        })
}

fn open_input_stream(
    path: &Path,
    compression: CompressionMode,
    game_index: usize,
) -> Result<PgnInput, RepertoireError> {
    let file = File::open(path).map_err(|e| RepertoireError::from_io(path, game_index, e))?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|e| {
                RepertoireError::parse(
                    path,
                    game_index,
                    format!("failed to initialize zstd decoder: {}", e),
                )
            }),
    }
}

fn parser_stage_error(
    path: &Path,
    game_index: usize,
    stage: &str,
    err: io::Error,
) -> RepertoireError {
    let message = format!("parser-stage error: stage={}; error={}", stage, err);
    log::warn!("{} ('{}', game_index={})", message, path.display(), game_index);
    RepertoireError::parse(path, game_index, message)
}

/// Build the tree of game number `game_index` (zero-based) from `input`.
/// `path` only labels errors.
pub fn read_tree<R: Read>(
    input: R,
    path: &Path,
    game_index: usize,
) -> Result<GameTree, RepertoireError> {
    // pgn-reader buffers internally; no BufReader on top.
    let mut reader = Reader::new(input);

    for skipped in 0..game_index {
        match reader.read_game(&mut GameSkipper) {
            Ok(Some(())) => {}
            Ok(None) => {
                return Err(RepertoireError::parse(
                    path,
                    game_index,
                    format!("no game at index {} (file has {})", game_index, skipped),
                ));
            }
            Err(e) => return Err(parser_stage_error(path, skipped, "skip_game", e)),
        }
    }

    match reader.read_game(&mut TreeBuilder::new()) {
        Ok(Some(Ok(tree))) => {
            log::debug!(
                "Loaded game {} from '{}': {} nodes",
                game_index,
                path.display(),
                tree.len()
            );
            Ok(tree)
        }
        Ok(Some(Err(message))) => Err(RepertoireError::parse(path, game_index, message)),
        Ok(None) => Err(RepertoireError::parse(
            path,
            game_index,
            format!("no game at index {}", game_index),
        )),
        Err(e) => Err(parser_stage_error(path, game_index, "read_game", e)),
    }
}

/// Resolve, open and parse the configured repertoire.
pub fn load(config: &Config) -> Result<GameTree, RepertoireError> {
    let path = resolve_source(&config.source)?;
    let compression = config
        .compression
        .unwrap_or_else(|| CompressionMode::from_path(&path));

    log::info!(
        "Loading repertoire '{}' (compression={:?}, game_index={})",
        path.display(),
        compression,
        config.game_index
    );

    let input = open_input_stream(&path, compression, config.game_index)?;
    let tree = read_tree(input, &path, config.game_index)?;

    if let Some(diagnostics) = tree.headers().diagnostics.as_deref() {
        log::warn!("Issues in '{}': {}", path.display(), diagnostics);
    }

    Ok(tree)
}

impl GameTree {
    /// Load the first game of the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RepertoireError> {
        let source = path.as_ref().display().to_string();
        load(&Config::default().with_source(source))
    }

    /// Parse the first game of in-memory PGN text.
    pub fn from_pgn(text: &str) -> Result<Self, RepertoireError> {
        read_tree(text.as_bytes(), Path::new("<memory>"), 0)
    }
}
