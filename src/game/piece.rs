use crate::error::GameError;

// ============================================================================
// Units
// ============================================================================

/// Grid units per logical cell edge. Every block of a piece covers a
/// `CELL x CELL` square of the playfield.
pub const CELL: i16 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

// ============================================================================
// Piece Kind
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    pub fn from_index(index: usize) -> Result<Self, GameError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(GameError::UnknownPieceIndex(index))
    }

    pub fn from_char(c: char) -> Result<Self, GameError> {
        match c.to_ascii_uppercase() {
            'I' => Ok(PieceKind::I),
            'J' => Ok(PieceKind::J),
            'L' => Ok(PieceKind::L),
            'O' => Ok(PieceKind::O),
            'S' => Ok(PieceKind::S),
            'T' => Ok(PieceKind::T),
            'Z' => Ok(PieceKind::Z),
            _ => Err(GameError::UnknownPieceName(c)),
        }
    }

    /// The O piece looks the same in every orientation and is never turned.
    pub fn rotates(self) -> bool {
        self != PieceKind::O
    }

    pub fn geometry(self, rotation: Rotation) -> Geometry {
        Geometry::from_offsets(SHAPES[self as usize][rotation.index() as usize])
    }
}

// ============================================================================
// Rotation
// ============================================================================

/// Clockwise quarter turns from the spawn orientation, always in `0..=3`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Rotation = Rotation(0);

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    pub fn prev(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }

    pub fn is_vertical(self) -> bool {
        self.0 % 2 == 1
    }

    /// Horizontal anchor shift applied when turning *into* this rotation.
    ///
    /// Entering an odd rotation pushes the anchor one cell right, entering an
    /// even one pulls it back, so four turns leave the anchor where it began.
    pub fn kick_x(self) -> i16 {
        if self.is_vertical() {
            CELL
        } else {
            -CELL
        }
    }
}

impl TryFrom<u8> for Rotation {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < 4 {
            Ok(Rotation(value))
        } else {
            Err(GameError::InvalidRotation(value))
        }
    }
}

// ============================================================================
// Geometry Table
// ============================================================================

type Shape = [(i16, i16); 4];

/// Block offsets in grid units, indexed by `[kind][rotation]`.
///
/// Each offset is the top-left unit of one `CELL x CELL` block, relative to
/// the piece anchor. Every rotation is the clockwise turn of the previous one.
#[rustfmt::skip]
const SHAPES: [[Shape; 4]; 7] = [
    // I
    [
        [(0, 0), (2, 0), (4, 0), (6, 0)],
        [(0, 0), (0, 2), (0, 4), (0, 6)],
        [(0, 0), (2, 0), (4, 0), (6, 0)],
        [(0, 0), (0, 2), (0, 4), (0, 6)],
    ],
    // J
    [
        [(0, 0), (0, 2), (2, 2), (4, 2)],
        [(0, 0), (0, 2), (0, 4), (2, 0)],
        [(0, 0), (2, 0), (4, 0), (4, 2)],
        [(0, 4), (2, 0), (2, 2), (2, 4)],
    ],
    // L
    [
        [(0, 2), (2, 2), (4, 2), (4, 0)],
        [(0, 0), (0, 2), (0, 4), (2, 4)],
        [(0, 0), (0, 2), (2, 0), (4, 0)],
        [(0, 0), (2, 0), (2, 2), (2, 4)],
    ],
    // O
    [
        [(0, 0), (0, 2), (2, 0), (2, 2)],
        [(0, 0), (0, 2), (2, 0), (2, 2)],
        [(0, 0), (0, 2), (2, 0), (2, 2)],
        [(0, 0), (0, 2), (2, 0), (2, 2)],
    ],
    // S
    [
        [(0, 2), (2, 0), (2, 2), (4, 0)],
        [(0, 0), (0, 2), (2, 2), (2, 4)],
        [(0, 2), (2, 0), (2, 2), (4, 0)],
        [(0, 0), (0, 2), (2, 2), (2, 4)],
    ],
    // T
    [
        [(0, 2), (2, 0), (2, 2), (4, 2)],
        [(0, 0), (0, 2), (0, 4), (2, 2)],
        [(0, 0), (2, 0), (4, 0), (2, 2)],
        [(0, 2), (2, 0), (2, 2), (2, 4)],
    ],
    // Z
    [
        [(0, 0), (2, 0), (2, 2), (4, 2)],
        [(0, 2), (0, 4), (2, 2), (2, 0)],
        [(0, 0), (2, 0), (2, 2), (4, 2)],
        [(0, 2), (0, 4), (2, 2), (2, 0)],
    ],
];

/// Block offsets of one (kind, rotation) pair plus the bounding box they span.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Geometry {
    pub offsets: [(i16, i16); 4],
    pub width: i16,
    pub height: i16,
}

impl Geometry {
    fn from_offsets(offsets: Shape) -> Self {
        let max_x = offsets.iter().map(|&(dx, _)| dx).max().unwrap_or(0);
        let max_y = offsets.iter().map(|&(_, dy)| dy).max().unwrap_or(0);
        Self {
            offsets,
            width: max_x + CELL,
            height: max_y + CELL,
        }
    }
}

// ============================================================================
// Active Piece
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Tetromino {
    pub kind: PieceKind,
    pub position: Position,
    pub rotation: Rotation,
}

impl Tetromino {
    pub fn new_at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            kind,
            position: Position { x, y },
            rotation: Rotation::SPAWN,
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.kind.geometry(self.rotation)
    }

    /// Top-left grid unit of each of the four blocks.
    pub fn blocks(&self) -> [Position; 4] {
        self.geometry().offsets.map(|(dx, dy)| Position {
            x: self.position.x.saturating_add(dx),
            y: self.position.y.saturating_add(dy),
        })
    }

    /// Every grid unit the piece covers, four per block.
    pub fn cells(&self) -> impl Iterator<Item = Position> {
        self.blocks().into_iter().flat_map(|block| {
            (0..CELL).flat_map(move |dy| {
                (0..CELL).map(move |dx| Position {
                    x: block.x.saturating_add(dx),
                    y: block.y.saturating_add(dy),
                })
            })
        })
    }

    pub fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            position: Position {
                x: self.position.x.saturating_add(dx),
                y: self.position.y.saturating_add(dy),
            },
            ..*self
        }
    }

    /// Next clockwise rotation with the anchor compensation already applied.
    pub fn rotated(&self) -> Self {
        let rotation = self.rotation.next();
        Self {
            rotation,
            position: Position {
                x: self.position.x.saturating_add(rotation.kick_x()),
                y: self.position.y,
            },
            kind: self.kind,
        }
    }
}
