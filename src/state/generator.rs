//! Random board generation.

use rand::Rng;

use super::board::{Board, Position, EMPTY};

pub const MIN_WIDTH: usize = 20;
pub const MAX_WIDTH: usize = 60;
pub const MIN_HEIGHT: usize = 10;
pub const MAX_HEIGHT: usize = 30;
pub const MIN_TILE_TYPES: u8 = 2;
pub const MAX_TILE_TYPES: u8 = 6;

/// Cells left for the ordered sweep once random placement stops.
const SWEEP_THRESHOLD: usize = 100;

/// Fills boards with uniformly random tile types.
///
/// Generation runs in two phases: random cells are picked and filled until
/// at most [`SWEEP_THRESHOLD`] cells remain, then the rest are filled in a
/// column-by-column sweep. Picks that land on a filled cell are skipped, so
/// the placement order is not uniform. That shape is kept as-is; only "full
/// board, every value in range" is guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGenerator {
    width: usize,
    height: usize,
    num_tile_types: u8,
}

impl GridGenerator {
    /// Create a generator. Callers clamp dimensions first; out-of-range
    /// values are clamped here as well.
    pub fn new(width: usize, height: usize, num_tile_types: u8) -> Self {
        Self {
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: height.clamp(MIN_HEIGHT, MAX_HEIGHT),
            num_tile_types: num_tile_types.clamp(MIN_TILE_TYPES, MAX_TILE_TYPES),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn num_tile_types(&self) -> u8 {
        self.num_tile_types
    }

    /// Generate a fully populated board.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        let mut board = Board::empty(self.width, self.height);

        let mut unfilled = self.width * self.height;
        while unfilled > SWEEP_THRESHOLD {
            let pos = Position::new(
                rng.random_range(0..self.height),
                rng.random_range(0..self.width),
            );
            if board.get(pos) == Some(EMPTY) {
                board.set(pos, self.random_tile(rng));
                unfilled -= 1;
            }
        }

        for col in 0..self.width {
            for row in 0..self.height {
                let pos = Position::new(row, col);
                if board.get(pos) == Some(EMPTY) {
                    board.set(pos, self.random_tile(rng));
                }
            }
        }

        tracing::debug!(
            width = self.width,
            height = self.height,
            tile_types = self.num_tile_types,
            "generated board"
        );
        board
    }

    fn random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> u8 {
        rng.random_range(0..self.num_tile_types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_board_fully_filled_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for (w, h, t) in [(20, 10, 2), (40, 20, 4), (60, 30, 6), (23, 17, 5)] {
            let board = GridGenerator::new(w, h, t).generate(&mut rng);
            assert_eq!(board.width(), w);
            assert_eq!(board.height(), h);
            assert_eq!(board.remaining(), w * h);
            assert!(board.values_within(t));
        }
    }

    #[test]
    fn test_inputs_are_clamped() {
        let generator = GridGenerator::new(5, 500, 9);
        assert_eq!(generator.width(), MIN_WIDTH);
        assert_eq!(generator.height(), MAX_HEIGHT);
        assert_eq!(generator.num_tile_types(), MAX_TILE_TYPES);

        let board = generator.generate(&mut StdRng::seed_from_u64(1));
        assert_eq!(board.width(), MIN_WIDTH);
        assert_eq!(board.height(), MAX_HEIGHT);
    }

    #[test]
    fn test_same_seed_same_board() {
        let generator = GridGenerator::new(40, 20, 4);
        let a = generator.generate(&mut StdRng::seed_from_u64(99));
        let b = generator.generate(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_tile_type_appears() {
        // 800 cells over 4 types; a missing type would mean a broken range
        let board = GridGenerator::new(40, 20, 4).generate(&mut StdRng::seed_from_u64(3));
        assert!(board.tile_counts(4).iter().all(|n| *n > 0));
    }
}
