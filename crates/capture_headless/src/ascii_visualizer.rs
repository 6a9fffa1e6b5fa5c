//! ASCII board visualizer for quick terminal review.
//!
//! One character per tile:
//!
//! - `A` / `B`: a living unit of that faction stands here (A wins if both)
//! - `1` / `2`: tile owned by faction A / B
//! - `.`: neutral tile

use std::fmt::Write as _;

use capture_core::factions::{FactionId, Factions};
use capture_core::grid::{Grid, TileOwner};
use capture_core::math::Position;
use capture_core::simulation::Simulation;

/// ASCII visualization configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Frame the board with a border and header.
    pub show_border: bool,
    /// Show tile and unit counts below the board.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_border: true,
            show_legend: true,
            use_color: true,
        }
    }
}

impl AsciiConfig {
    /// Bare projection: rows of tile characters and nothing else.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            show_border: false,
            show_legend: false,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[34m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GRAY: &str = "\x1b[90m";
}

fn faction_color(faction: FactionId) -> &'static str {
    match faction {
        FactionId::A => colors::BLUE,
        FactionId::B => colors::YELLOW,
    }
}

/// Character for one tile.
#[must_use]
pub fn tile_char(grid: &Grid, factions: &Factions, pos: Position) -> char {
    for faction in factions.iter() {
        if faction.alive_units().any(|u| u.position() == pos) {
            return match faction.id() {
                FactionId::A => 'A',
                FactionId::B => 'B',
            };
        }
    }
    match grid.tile(pos).map(|t| t.owner()) {
        Some(TileOwner::Faction(FactionId::A)) => '1',
        Some(TileOwner::Faction(FactionId::B)) => '2',
        Some(TileOwner::Neutral) | None => '.',
    }
}

/// Which faction colors a character, if any.
fn char_faction(ch: char) -> Option<FactionId> {
    match ch {
        'A' | '1' => Some(FactionId::A),
        'B' | '2' => Some(FactionId::B),
        _ => None,
    }
}

/// The bare projection, one line per row, rows top to bottom.
#[must_use]
pub fn render_grid(grid: &Grid, factions: &Factions) -> String {
    let mut lines = Vec::with_capacity(grid.height() as usize);
    for y in 0..grid.height() as i32 {
        let row: String = (0..grid.width() as i32)
            .map(|x| tile_char(grid, factions, Position::new(x, y)))
            .collect();
        lines.push(row);
    }
    lines.join("\n")
}

/// Render a simulation's board.
pub fn render_ascii(sim: &Simulation, config: &AsciiConfig) -> String {
    let grid = sim.grid();
    let factions = sim.factions();
    let width = grid.width() as usize;
    let mut output = String::new();

    let (bold, reset) = if config.use_color {
        (colors::BOLD, colors::RESET)
    } else {
        ("", "")
    };

    if config.show_border {
        let _ = writeln!(
            output,
            "{bold}Turn {}/{} | Level {}{reset}",
            sim.turn(),
            sim.max_turns(),
            sim.config().level
        );
        output.push('+');
        output.push_str(&"-".repeat(width));
        output.push_str("+\n");
    }

    for y in 0..grid.height() as i32 {
        if config.show_border {
            output.push('|');
        }
        for x in 0..grid.width() as i32 {
            let ch = tile_char(grid, factions, Position::new(x, y));
            if config.use_color {
                let color = match char_faction(ch) {
                    Some(faction) if ch.is_ascii_alphabetic() => {
                        output.push_str(colors::BOLD);
                        faction_color(faction)
                    }
                    Some(faction) => faction_color(faction),
                    None => colors::GRAY,
                };
                output.push_str(color);
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
        }
        if config.show_border {
            output.push('|');
        }
        output.push('\n');
    }

    if config.show_border {
        output.push('+');
        output.push_str(&"-".repeat(width));
        output.push_str("+\n");
    }

    if config.show_legend {
        let tally = grid.tally();
        output.push_str("A/B=unit 1/2=owned .=neutral\n");
        for faction in factions.iter() {
            let (color, reset) = if config.use_color {
                (faction_color(faction.id()), colors::RESET)
            } else {
                ("", "")
            };
            let _ = writeln!(
                output,
                "{color}{}{reset}: {} tiles, {}/{} units",
                faction.name(),
                tally.owned_by(faction.id()),
                faction.alive_count(),
                faction.units().len()
            );
        }
        let _ = writeln!(output, "Neutral: {} tiles", tally.neutral);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture_core::config::SimulationConfig;
    use capture_test_utils::fixtures::{level_one_config, simulation as sim, skirmish_config};

    #[test]
    fn test_initial_board() {
        let sim = sim(SimulationConfig::new(1).with_grid(5, 3));
        let rendered = render_grid(sim.grid(), sim.factions());
        assert_eq!(rendered, ".....\nA...B\n.....");
    }

    #[test]
    fn test_owned_tiles_after_units_leave() {
        let mut sim = sim(level_one_config().with_grid(5, 3));
        sim.step();
        let rendered = render_grid(sim.grid(), sim.factions());
        // Both rosters stepped off their bases toward each other.
        assert_eq!(rendered, ".....\n1A.B2\n.....");
    }

    #[test]
    fn test_units_drawn_over_owned_tiles() {
        let mut sim = sim(level_one_config().with_grid(3, 1));
        // A steps to (1,0); B is then adjacent and attacks from its base.
        sim.step();
        assert_eq!(render_grid(sim.grid(), sim.factions()), "1AB");
    }

    #[test]
    fn test_plain_render_matches_grid() {
        let sim = sim(SimulationConfig::default());
        let plain = render_ascii(&sim, &AsciiConfig::plain());
        assert_eq!(plain.trim_end(), render_grid(sim.grid(), sim.factions()));
    }

    #[test]
    fn test_legend_and_border() {
        let sim = sim(SimulationConfig::new(15));
        let config = AsciiConfig {
            use_color: false,
            ..AsciiConfig::default()
        };
        let rendered = render_ascii(&sim, &config);
        assert!(rendered.starts_with("Turn 0/330 | Level 15\n+----------+\n"));
        assert!(rendered.contains("Faction A: 1 tiles, 4/4 units"));
        assert!(rendered.contains("Neutral: 78 tiles"));
        assert!(!rendered.contains('\x1b'));
    }

    #[test]
    fn test_skirmish_board_shape() {
        let sim = sim(skirmish_config(10, 0));
        let rendered = render_grid(sim.grid(), sim.factions());
        assert_eq!(rendered, "....\nA..B\n....");
    }

    #[test]
    fn test_color_output() {
        let sim = sim(SimulationConfig::default());
        let rendered = render_ascii(&sim, &AsciiConfig::default());
        assert!(rendered.contains(colors::BLUE));
        assert!(rendered.contains(colors::YELLOW));
    }
}
