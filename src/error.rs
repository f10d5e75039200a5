use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GameError {
    #[error("rotation index {0} is outside 0..=3")]
    InvalidRotation(u8),

    #[error("piece index {0} does not name one of the 7 piece kinds")]
    UnknownPieceIndex(usize),

    #[error("'{0}' is not a piece kind (expected one of I, J, L, O, S, T, Z)")]
    UnknownPieceName(char),

    #[error("board width {width} must be even and between {min} and {max} grid units")]
    InvalidWidth { width: usize, min: usize, max: usize },

    #[error("board depth {depth} must be even and between {min} and {max} grid units")]
    InvalidDepth { depth: usize, min: usize, max: usize },

    #[error("gravity tick interval must be non-zero")]
    ZeroTickInterval,

    #[error("piece sequence must name at least one piece")]
    EmptySequence,
}
