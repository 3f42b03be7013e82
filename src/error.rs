use std::fmt;

/// Reasons a request can be rejected. Rules violations (`OutOfBounds`,
/// `Occupied`, `Suicide`, `KoViolation`) are distinguishable from turn and
/// phase violations (`OutOfTurn`, `WrongStage`, `GameEnded`); a rejected call
/// never mutates any game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoError {
    OutOfBounds,
    Occupied,
    Suicide,
    KoViolation,
    OutOfTurn,
    WrongStage,
    GameEnded,
}

impl fmt::Display for GoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoError::OutOfBounds => write!(f, "out of bounds"),
            GoError::Occupied => write!(f, "point is occupied"),
            GoError::Suicide => write!(f, "suicide"),
            GoError::KoViolation => write!(f, "ko violation"),
            GoError::OutOfTurn => write!(f, "out of turn"),
            GoError::WrongStage => write!(f, "wrong game stage"),
            GoError::GameEnded => write!(f, "game has ended"),
        }
    }
}

impl std::error::Error for GoError {}
