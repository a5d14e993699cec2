use crate::coordinate::row_label;
use crate::game::{Field, Tile, FIELD_HEIGHT, FIELD_WIDTH};

pub const MINE_GLYPH: char = '*';
pub const FLAG_GLYPH: char = '+';
pub const HIDDEN_GLYPH: char = ' ';

/// How much of the field a player is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Playing,
    /// Every mine is shown; flags survive only on a won game.
    GameOver { won: bool },
}

/// Renders the field as display lines, each terminated by a line feed:
/// the column header, a rule, then one labelled row per grid row.
pub fn render(field: &Field, view: View) -> Vec<String> {
    let header: Vec<String> = (1..=FIELD_WIDTH).map(|column| column.to_string()).collect();

    let mut lines = Vec::with_capacity(FIELD_HEIGHT + 2);
    lines.push(format!("    {}\n", header.join(" ")));
    lines.push(format!("{}\n", "-".repeat(4 + FIELD_WIDTH * 2 - 1)));

    for y in 0..FIELD_HEIGHT {
        let glyphs: Vec<String> = (0..FIELD_WIDTH)
            .map(|x| field.tile(x, y).map_or(HIDDEN_GLYPH, |tile| glyph(tile, view)).to_string())
            .collect();
        lines.push(format!("{} | {}\n", row_label(y), glyphs.join(" ")));
    }

    lines
}

fn glyph(tile: &Tile, view: View) -> char {
    match view {
        View::GameOver { won } if tile.has_mine => {
            if won && tile.has_flag {
                FLAG_GLYPH
            } else {
                MINE_GLYPH
            }
        }
        _ if !tile.revealed => HIDDEN_GLYPH,
        _ if tile.has_flag => FLAG_GLYPH,
        _ if tile.has_mine => MINE_GLYPH,
        _ => char::from(b'0' + tile.adjacent_mines),
    }
}
