use std::num::ParseIntError;
use std::str::FromStr;

use bevy::prelude::*;
use clap::Parser;
use hexgrove::terrain::{TerrainConfig, TerrainSettings};
use thiserror::Error;

use crate::viewer::{Demo, ViewerOptions};

/// Command line of the viewer.
#[derive(Parser, Debug)]
#[command(name = "hexgrove-viewer", version, about = "Live hex terrain and branch mesh viewer")]
pub struct Args {
    /// Which generators to spawn.
    #[arg(long, value_enum, default_value_t = Demo::All)]
    pub demo: Demo,
    /// Terrain grid side length.
    #[arg(long, default_value_t = hexgrove::terrain::cell_buffer::DEFAULT_GRID_SIZE)]
    pub size: usize,
    /// Initial cells as `col,row=code` entries separated by `;`.
    #[arg(long)]
    pub cells: Option<CellList>,
    /// Horizontal subdivisions of each terrain wall.
    #[arg(long, default_value_t = 1)]
    pub loops: u32,
    /// Also build the terrain collision mesh.
    #[arg(long)]
    pub collider: bool,
    /// Skip caps of fully enclosed cells.
    #[arg(long)]
    pub cull_caps: bool,
    /// Noise displacement amplitude as `x,y,z`.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    pub displacement: Option<Vec3>,
}

impl Args {
    /// Splits the arguments into the terrain plugin config and viewer options.
    pub fn into_configs(self) -> (TerrainConfig, ViewerOptions) {
        let settings = TerrainSettings {
            lateral_loops: self.loops,
            generate_collider: self.collider,
            cull_inside_caps: self.cull_caps,
            displacement: self.displacement.unwrap_or(Vec3::ZERO),
            ..default()
        };
        let options = ViewerOptions {
            demo: self.demo,
            cells: self.cells.map(|list| list.0),
        };
        (
            TerrainConfig {
                size: self.size,
                settings,
            },
            options,
        )
    }
}

/// Why a `--cells` argument was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellListError {
    /// Entry without `=` between coordinate and code.
    #[error("cell entry `{0}` is missing `=`")]
    MissingEquals(String),
    /// Coordinate without `,` between column and row.
    #[error("cell coordinate `{0}` is missing `,`")]
    MissingComma(String),
    /// A column, row or code that is not an integer.
    #[error("`{value}` is not an integer: {source}")]
    BadInteger {
        /// Offending text.
        value: String,
        /// Underlying parse failure.
        source: ParseIntError,
    },
    /// Code that does not fit in a byte.
    #[error("cell code {0} is outside 0..=255")]
    CodeOutOfRange(i64),
}

/// Parsed `--cells` value: offset coordinates with their codes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellList(pub Vec<(IVec2, u8)>);

fn parse_int<T: FromStr<Err = ParseIntError>>(text: &str) -> Result<T, CellListError> {
    let text = text.trim();
    text.parse().map_err(|source| CellListError::BadInteger {
        value: text.to_owned(),
        source,
    })
}

impl FromStr for CellList {
    type Err = CellListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::new();
        for entry in s.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (coord, code) = entry
                .split_once('=')
                .ok_or_else(|| CellListError::MissingEquals(entry.to_owned()))?;
            let (col, row) = coord
                .split_once(',')
                .ok_or_else(|| CellListError::MissingComma(coord.trim().to_owned()))?;
            let code: i64 = parse_int(code)?;
            let code = u8::try_from(code).map_err(|_| CellListError::CodeOutOfRange(code))?;
            cells.push((IVec2::new(parse_int(col)?, parse_int(row)?), code));
        }
        Ok(Self(cells))
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("`{p}`: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {} components", parts.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── CellList ───────────────────────────────────────────────────

    #[test]
    fn parses_entries() {
        let list: CellList = "0,0=1; 3,-2=3;10,4=255;".parse().unwrap();
        assert_eq!(
            list.0,
            vec![
                (IVec2::new(0, 0), 1),
                (IVec2::new(3, -2), 3),
                (IVec2::new(10, 4), 255)
            ]
        );
    }

    #[test]
    fn empty_list_is_valid() {
        assert_eq!("".parse::<CellList>().unwrap(), CellList::default());
        assert_eq!(" ; ".parse::<CellList>().unwrap(), CellList::default());
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!(
            "1,2".parse::<CellList>(),
            Err(CellListError::MissingEquals("1,2".into()))
        );
        assert_eq!(
            "12=1".parse::<CellList>(),
            Err(CellListError::MissingComma("12".into()))
        );
        assert!(matches!(
            "a,2=1".parse::<CellList>(),
            Err(CellListError::BadInteger { value, .. }) if value == "a"
        ));
        assert_eq!(
            "1,2=256".parse::<CellList>(),
            Err(CellListError::CodeOutOfRange(256))
        );
        assert_eq!(
            "1,2=-1".parse::<CellList>(),
            Err(CellListError::CodeOutOfRange(-1))
        );
    }

    // ── Args ───────────────────────────────────────────────────────

    #[test]
    fn displacement_needs_three_components() {
        assert_eq!(parse_vec3("0.1, -0.2,0"), Ok(Vec3::new(0.1, -0.2, 0.0)));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,x,2").is_err());
    }

    #[test]
    fn args_fill_terrain_config() {
        let args = Args::parse_from([
            "hexgrove-viewer",
            "--size",
            "8",
            "--loops",
            "3",
            "--collider",
            "--cells",
            "1,1=2",
            "--displacement",
            "-0.1,0,0.2",
        ]);
        let (terrain, options) = args.into_configs();
        assert_eq!(terrain.size, 8);
        assert_eq!(terrain.settings.lateral_loops, 3);
        assert!(terrain.settings.generate_collider);
        assert!(!terrain.settings.cull_inside_caps);
        assert_eq!(terrain.settings.displacement, Vec3::new(-0.1, 0.0, 0.2));
        assert_eq!(options.demo, Demo::All);
        assert_eq!(options.cells, Some(vec![(IVec2::new(1, 1), 2)]));
    }
}
