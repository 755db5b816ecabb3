//! Directory-backed level source reading character-grid maps.

use std::{error::Error, fmt, fs, io, path::PathBuf};

use switchback_core::{BlockKind, ItemKind, LevelId, LevelLayout, MobKind, Spawn, SpawnKind};
use switchback_system_level_flow::{LevelFlowError, LevelSource};

/// Loads level layouts from map files stored under one directory.
///
/// A level identifier doubles as the file name, so `level1.txt` resolves to
/// `<root>/level1.txt`.
#[derive(Clone, Debug)]
pub(crate) struct DirectoryLevels {
    root: PathBuf,
}

impl DirectoryLevels {
    /// Creates a source rooted at the given directory.
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl LevelSource for DirectoryLevels {
    fn load(&mut self, level: &LevelId) -> Result<LevelLayout, LevelFlowError> {
        let path = self.root.join(level.as_str());
        let text = fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LevelFlowError::LevelNotFound {
                level: level.clone(),
            },
            _ => LevelFlowError::LevelUnavailable {
                level: level.clone(),
                reason: source.to_string(),
            },
        })?;
        parse_map(&text).map_err(|source| LevelFlowError::LevelUnavailable {
            level: level.clone(),
            reason: source.to_string(),
        })
    }
}

/// Parses a character-grid map into a level layout.
///
/// Row 0 is the top line; a space leaves the cell empty. Ragged lines are
/// allowed and the widest one sets the column count.
pub(crate) fn parse_map(text: &str) -> Result<LevelLayout, MapError> {
    let mut spawns = Vec::new();
    let mut columns = 0u32;
    let mut rows = 0u32;
    for line in text.lines() {
        let mut column = 0u32;
        for tile in line.chars() {
            if tile != ' ' {
                let kind = tile_kind(tile).ok_or(MapError::UnknownTile {
                    line: rows + 1,
                    column: column + 1,
                    tile,
                })?;
                spawns.push(Spawn::new(kind, column, rows));
            }
            column += 1;
        }
        columns = columns.max(column);
        rows += 1;
    }
    if rows == 0 {
        return Err(MapError::Empty);
    }
    Ok(LevelLayout::new(columns, rows, spawns))
}

/// Entity a map character places, if the character has a meaning.
fn tile_kind(tile: char) -> Option<SpawnKind> {
    match tile {
        '#' => Some(SpawnKind::Block(BlockKind::Brick)),
        '%' => Some(SpawnKind::Block(BlockKind::BrickBase)),
        '^' => Some(SpawnKind::Block(BlockKind::Cube)),
        'b' => Some(SpawnKind::Block(BlockKind::Bounce)),
        'S' => Some(SpawnKind::Block(BlockKind::Switch)),
        'I' => Some(SpawnKind::Block(BlockKind::Flag)),
        '=' => Some(SpawnKind::Block(BlockKind::Tunnel)),
        '?' => Some(SpawnKind::Block(BlockKind::Mystery { drop: None })),
        '$' => Some(SpawnKind::Block(BlockKind::Mystery {
            drop: Some(ItemKind::Coin),
        })),
        'C' => Some(SpawnKind::Item(ItemKind::Coin)),
        '*' => Some(SpawnKind::Item(ItemKind::Star)),
        '&' => Some(SpawnKind::Mob(MobKind::Cloud)),
        '@' => Some(SpawnKind::Mob(MobKind::Mushroom)),
        _ => None,
    }
}

/// Errors that can occur while parsing a level map.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum MapError {
    /// The map contained no rows at all.
    Empty,
    /// The map used a character with no tile meaning.
    UnknownTile {
        /// One-based line of the offending character.
        line: u32,
        /// One-based column of the offending character.
        column: u32,
        /// The character itself.
        tile: char,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "level map is empty"),
            Self::UnknownTile { line, column, tile } => {
                write!(f, "unknown tile '{tile}' at line {line}, column {column}")
            }
        }
    }
}

impl Error for MapError {}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    #[test]
    fn every_tile_character_maps_to_its_spawn() {
        let layout = parse_map("#%^b\nSI=?\n$C*\n&@\n").expect("map should parse");

        assert_eq!(layout.columns(), 4, "widest line sets the column count");
        assert_eq!(layout.rows(), 4);
        let spawns = layout.spawns();
        assert_eq!(spawns.len(), 13);
        assert_eq!(
            spawns[0],
            Spawn::new(SpawnKind::Block(BlockKind::Brick), 0, 0)
        );
        assert_eq!(
            spawns[4],
            Spawn::new(SpawnKind::Block(BlockKind::Switch), 0, 1)
        );
        assert_eq!(
            spawns[7],
            Spawn::new(SpawnKind::Block(BlockKind::Mystery { drop: None }), 3, 1)
        );
        assert_eq!(
            spawns[8],
            Spawn::new(
                SpawnKind::Block(BlockKind::Mystery {
                    drop: Some(ItemKind::Coin)
                }),
                0,
                2
            )
        );
        assert_eq!(spawns[10], Spawn::new(SpawnKind::Item(ItemKind::Star), 2, 2));
        assert_eq!(spawns[12], Spawn::new(SpawnKind::Mob(MobKind::Mushroom), 1, 3));
    }

    #[test]
    fn spaces_leave_cells_empty() {
        let layout = parse_map("  C\n%%%\n").expect("map should parse");

        assert_eq!(layout.columns(), 3);
        assert_eq!(layout.rows(), 2);
        assert_eq!(layout.spawns().len(), 4);
        assert_eq!(
            layout.spawns()[0],
            Spawn::new(SpawnKind::Item(ItemKind::Coin), 2, 0)
        );
    }

    #[test]
    fn unknown_characters_report_their_position() {
        let error = parse_map("%%%\n %x\n").expect_err("an unknown tile should fail");
        assert_eq!(
            error,
            MapError::UnknownTile {
                line: 2,
                column: 3,
                tile: 'x',
            }
        );
    }

    #[test]
    fn an_empty_map_is_rejected() {
        assert_eq!(parse_map(""), Err(MapError::Empty));
    }

    #[test]
    fn a_missing_level_file_is_not_found() {
        let root = scratch_root("missing");
        let mut source = DirectoryLevels::new(&root);

        let error = source
            .load(&LevelId::new("absent.txt"))
            .expect_err("a missing file should not load");
        assert!(matches!(error, LevelFlowError::LevelNotFound { level } if level == LevelId::new("absent.txt")));

        cleanup(&root);
    }

    #[test]
    fn a_bad_map_reports_the_level_unavailable() {
        let root = scratch_root("bad-map");
        std::fs::write(root.join("glitch.txt"), "%Z%\n").expect("fixture should be writable");
        let mut source = DirectoryLevels::new(&root);

        let error = source
            .load(&LevelId::new("glitch.txt"))
            .expect_err("an unreadable map should not load");
        match error {
            LevelFlowError::LevelUnavailable { level, reason } => {
                assert_eq!(level, LevelId::new("glitch.txt"));
                assert!(reason.contains("unknown tile 'Z'"), "reason was: {reason}");
            }
            other => panic!("expected LevelUnavailable, got {other:?}"),
        }

        cleanup(&root);
    }

    fn scratch_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "switchback-levels-{tag}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).expect("scratch dir should be creatable");
        root
    }

    fn cleanup(root: &Path) {
        let _ = std::fs::remove_dir_all(root);
    }
}
