use std::str::FromStr;

use bastion_core::DefenseKind;
use thiserror::Error;

const KIND_DELIMITER: char = '@';
const COORDINATE_DELIMITER: char = ',';

/// A defense purchase requested on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    /// Type of defense to buy.
    pub(crate) kind: DefenseKind,
    /// Column of the upper-left footprint tile.
    pub(crate) column: i32,
    /// Row of the upper-left footprint tile.
    pub(crate) row: i32,
}

/// Errors raised while parsing a `kind@column,row` placement.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum LayoutError {
    /// The value lacks the `@` separator.
    #[error("expected KIND@COLUMN,ROW, got `{0}`")]
    MissingSeparator(String),
    /// The defense name is not purchasable.
    #[error("unknown defense `{0}`; expected cannon, sniper or wall")]
    UnknownKind(String),
    /// The coordinates are not two comma-separated integers.
    #[error("invalid coordinates `{0}`")]
    InvalidCoordinates(String),
}

impl FromStr for Placement {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, coordinates) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or_else(|| LayoutError::MissingSeparator(trimmed.to_owned()))?;
        let kind = parse_kind(kind)?;
        let (column, row) = coordinates
            .split_once(COORDINATE_DELIMITER)
            .and_then(|(column, row)| {
                Some((column.trim().parse().ok()?, row.trim().parse().ok()?))
            })
            .ok_or_else(|| LayoutError::InvalidCoordinates(coordinates.to_owned()))?;

        Ok(Self { kind, column, row })
    }
}

fn parse_kind(name: &str) -> Result<DefenseKind, LayoutError> {
    let name = name.trim();
    DefenseKind::PURCHASABLE
        .into_iter()
        .find(|kind| kind_name(*kind).eq_ignore_ascii_case(name))
        .ok_or_else(|| LayoutError::UnknownKind(name.to_owned()))
}

pub(crate) const fn kind_name(kind: DefenseKind) -> &'static str {
    match kind {
        DefenseKind::MainTower => "main tower",
        DefenseKind::Cannon => "cannon",
        DefenseKind::Sniper => "sniper",
        DefenseKind::Wall => "wall",
    }
}
