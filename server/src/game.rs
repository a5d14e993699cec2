use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const FIELD_WIDTH: usize = 9;
pub const FIELD_HEIGHT: usize = 9;
pub const NUM_MINES: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub revealed: bool,
    pub has_mine: bool,
    pub has_flag: bool,
    pub adjacent_mines: u8,
}

/// What a call to [`Field::reveal`] uncovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Out of bounds or already revealed; nothing changed.
    Ignored,
    Safe,
    Mine,
}

/// A 9x9 minefield owned by a single session.
///
/// Mines are placed once when the field is built and never move.
/// `mines_remaining` only drops when a mine is flagged, so the field is
/// cleared exactly when every mine carries a flag.
#[derive(Debug, Clone, Default)]
pub struct Field {
    tiles: [[Tile; FIELD_HEIGHT]; FIELD_WIDTH],
    mines_remaining: usize,
}

impl Field {
    /// Places `NUM_MINES` mines on distinct tiles chosen by `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut mines = Vec::with_capacity(NUM_MINES);

        // Keep drawing until we land on a tile that has no mine yet
        while mines.len() < NUM_MINES {
            let position = (rng.gen_range(0..FIELD_WIDTH), rng.gen_range(0..FIELD_HEIGHT));
            if !mines.contains(&position) {
                mines.push(position);
            }
        }

        Self::with_mines(&mines)
    }

    /// Builds a field with mines at exactly the given positions.
    ///
    /// Duplicates and out-of-bounds positions are skipped.
    pub fn with_mines(mines: &[(usize, usize)]) -> Self {
        let mut field = Self::default();

        for &(x, y) in mines {
            if in_bounds(x, y) && !field.tiles[x][y].has_mine {
                field.tiles[x][y].has_mine = true;
                field.mines_remaining += 1;
            }
        }

        for x in 0..FIELD_WIDTH {
            for y in 0..FIELD_HEIGHT {
                let count = neighbours(x, y)
                    .filter(|&(nx, ny)| field.tiles[nx][ny].has_mine)
                    .count();
                field.tiles[x][y].adjacent_mines = count as u8;
            }
        }

        field
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<&Tile> {
        self.tiles.get(x).and_then(|column| column.get(y))
    }

    pub fn mines_remaining(&self) -> usize {
        self.mines_remaining
    }

    pub fn is_cleared(&self) -> bool {
        self.mines_remaining == 0
    }

    pub fn mine_positions(&self) -> Vec<(usize, usize)> {
        self.positions()
            .filter(|&(x, y)| self.tiles[x][y].has_mine)
            .collect()
    }

    pub fn revealed_count(&self) -> usize {
        self.positions()
            .filter(|&(x, y)| self.tiles[x][y].revealed)
            .count()
    }

    /// Reveals a tile, flooding outwards across zero-adjacency tiles.
    ///
    /// The flood stops at any tile touching a mine and at the grid edge.
    pub fn reveal(&mut self, x: usize, y: usize) -> RevealOutcome {
        match self.tile(x, y) {
            Some(tile) if !tile.revealed => {}
            _ => return RevealOutcome::Ignored,
        }

        let outcome = if self.tiles[x][y].has_mine {
            RevealOutcome::Mine
        } else {
            RevealOutcome::Safe
        };

        let mut pending = vec![(x, y)];
        while let Some((cx, cy)) = pending.pop() {
            let tile = &mut self.tiles[cx][cy];
            if tile.revealed {
                continue;
            }
            tile.revealed = true;

            if tile.adjacent_mines == 0 && !tile.has_mine {
                pending.extend(neighbours(cx, cy).filter(|&(nx, ny)| !self.tiles[nx][ny].revealed));
            }
        }

        outcome
    }

    /// Flags (defuses) a mine. Fails without touching the field unless the
    /// tile is unrevealed and actually holds a mine.
    pub fn flag(&mut self, x: usize, y: usize) -> bool {
        match self.tile(x, y) {
            Some(tile) if !tile.revealed && tile.has_mine => {}
            _ => return false,
        }

        let tile = &mut self.tiles[x][y];
        tile.revealed = true;
        tile.has_flag = true;
        self.mines_remaining -= 1;
        true
    }

    fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        (0..FIELD_WIDTH).flat_map(|x| (0..FIELD_HEIGHT).map(move |y| (x, y)))
    }
}

/// RNG for one connection's fields. With a server seed every connection gets
/// a reproducible sequence of layouts; without one, layouts come from entropy.
pub fn field_rng(seed: Option<u64>, connection_id: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(connection_id)),
        None => StdRng::from_entropy(),
    }
}

fn in_bounds(x: usize, y: usize) -> bool {
    x < FIELD_WIDTH && y < FIELD_HEIGHT
}

fn neighbours(x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> {
    (-1isize..=1)
        .flat_map(|dx| (-1isize..=1).map(move |dy| (dx, dy)))
        .filter(|&offset| offset != (0, 0))
        .filter_map(move |(dx, dy)| {
            let nx = x.checked_add_signed(dx)?;
            let ny = y.checked_add_signed(dy)?;
            in_bounds(nx, ny).then_some((nx, ny))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_wall(x: usize) -> Vec<(usize, usize)> {
        (0..FIELD_HEIGHT).map(|y| (x, y)).collect()
    }

    #[test]
    fn test_generate_places_unique_mines() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let field = Field::generate(&mut rng);

            assert_eq!(field.mine_positions().len(), NUM_MINES);
            assert_eq!(field.mines_remaining(), NUM_MINES);
        }
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let a = Field::generate(&mut field_rng(Some(42), 1));
        let b = Field::generate(&mut field_rng(Some(42), 1));
        assert_eq!(a.mine_positions(), b.mine_positions());
    }

    #[test]
    fn test_adjacency_counts() {
        let field = Field::with_mines(&[(0, 0), (2, 0)]);

        assert_eq!(field.tile(1, 0).unwrap().adjacent_mines, 2);
        assert_eq!(field.tile(1, 1).unwrap().adjacent_mines, 2);
        assert_eq!(field.tile(0, 1).unwrap().adjacent_mines, 1);
        assert_eq!(field.tile(4, 4).unwrap().adjacent_mines, 0);
    }

    #[test]
    fn test_with_mines_skips_duplicates_and_out_of_bounds() {
        let field = Field::with_mines(&[(1, 1), (1, 1), (9, 0), (0, 9)]);
        assert_eq!(field.mines_remaining(), 1);
    }

    #[test]
    fn test_reveal_numbered_tile_does_not_flood() {
        let mut field = Field::with_mines(&[(0, 0)]);

        assert_eq!(field.reveal(1, 1), RevealOutcome::Safe);
        assert_eq!(field.revealed_count(), 1);
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let mut field = Field::with_mines(&[(0, 0)]);

        assert_eq!(field.reveal(1, 0), RevealOutcome::Safe);
        let snapshot = field.clone();
        assert_eq!(field.reveal(1, 0), RevealOutcome::Ignored);

        for x in 0..FIELD_WIDTH {
            for y in 0..FIELD_HEIGHT {
                assert_eq!(field.tile(x, y), snapshot.tile(x, y));
            }
        }
    }

    #[test]
    fn test_flood_fill_reveals_zero_region_and_border() {
        let mut field = Field::with_mines(&[(8, 8)]);

        assert_eq!(field.reveal(0, 0), RevealOutcome::Safe);

        assert_eq!(field.revealed_count(), FIELD_WIDTH * FIELD_HEIGHT - 1);
        assert!(!field.tile(8, 8).unwrap().revealed);
        assert!(field.tile(7, 7).unwrap().revealed);
    }

    #[test]
    fn test_flood_fill_stops_at_mine_wall() {
        let mut field = Field::with_mines(&column_wall(4));

        field.reveal(0, 4);

        for x in 0..FIELD_WIDTH {
            for y in 0..FIELD_HEIGHT {
                let revealed = field.tile(x, y).unwrap().revealed;
                assert_eq!(revealed, x <= 3, "tile ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_reveal_mine_reports_loss() {
        let mut field = Field::with_mines(&[(3, 3)]);

        assert_eq!(field.reveal(3, 3), RevealOutcome::Mine);
        assert_eq!(field.revealed_count(), 1);
    }

    #[test]
    fn test_reveal_out_of_bounds_is_ignored() {
        let mut field = Field::with_mines(&[(3, 3)]);
        assert_eq!(field.reveal(FIELD_WIDTH, 0), RevealOutcome::Ignored);
        assert_eq!(field.reveal(0, FIELD_HEIGHT), RevealOutcome::Ignored);
        assert_eq!(field.revealed_count(), 0);
    }

    #[test]
    fn test_flag_only_succeeds_on_hidden_mine() {
        let mut field = Field::with_mines(&[(2, 2), (5, 5)]);

        let before = field.clone();
        assert!(!field.flag(0, 0));
        assert_eq!(field.revealed_count(), before.revealed_count());
        assert_eq!(field.mines_remaining(), 2);

        assert!(field.flag(2, 2));
        assert_eq!(field.mines_remaining(), 1);
        let tile = field.tile(2, 2).unwrap();
        assert!(tile.has_flag && tile.revealed);

        assert!(!field.flag(2, 2));
        assert_eq!(field.mines_remaining(), 1);
    }

    #[test]
    fn test_flagged_mine_cannot_be_revealed() {
        let mut field = Field::with_mines(&[(2, 2)]);
        field.flag(2, 2);
        assert_eq!(field.reveal(2, 2), RevealOutcome::Ignored);
    }

    #[test]
    fn test_cleared_iff_every_mine_flagged() {
        let mut field = Field::generate(&mut StdRng::seed_from_u64(7));
        let mines = field.mine_positions();

        for (i, &(x, y)) in mines.iter().enumerate() {
            assert!(!field.is_cleared());
            assert!(field.flag(x, y));
            assert_eq!(field.mines_remaining(), mines.len() - i - 1);
        }

        assert!(field.is_cleared());
        assert!(mines
            .iter()
            .all(|&(x, y)| field.tile(x, y).unwrap().has_flag));
    }
}
