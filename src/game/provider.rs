use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::piece::PieceKind;
use crate::error::GameError;

// ============================================================================
// Piece Provider Trait
// ============================================================================

/// Source of piece kinds for the lookahead slot.
pub trait PieceProvider {
    fn next_piece(&mut self) -> PieceKind;
}

/// Uniform draw over the seven kinds.
pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.gen_range(0..PieceKind::ALL.len())]
    }
}

/// Replays a fixed order of kinds, wrapping around at the end.
pub struct SequencePieceProvider {
    pieces: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(pieces: Vec<PieceKind>) -> Result<Self, GameError> {
        if pieces.is_empty() {
            return Err(GameError::EmptySequence);
        }
        Ok(Self { pieces, index: 0 })
    }

    /// Parses a string of kind letters such as `"IJLOSTZ"`.
    pub fn parse(letters: &str) -> Result<Self, GameError> {
        let pieces = letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(PieceKind::from_char)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pieces)
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> PieceKind {
        let piece = self.pieces[self.index % self.pieces.len()];
        self.index += 1;
        piece
    }
}
