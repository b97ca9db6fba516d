use crate::character::CharacterId;
use crate::combat::actions::ActionKind;
use crate::grid::Cell;
use std::fmt;

/// Main error type for the grid-skirmish combat engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Error related to match setup or configuration
    Setup(SetupError),
    /// Error related to movement validation or application
    Movement(MovementError),
    /// Error related to action validation or execution
    Action(ActionError),
}

/// Errors raised while assembling a match.
///
/// These indicate a collaborator bug (bad configuration, empty roster) and are
/// surfaced explicitly rather than silently ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// A roster was constructed with no characters
    EmptyRoster,
    /// Character ids must match their roster slots
    IdMismatch { expected: CharacterId, found: CharacterId },
    /// The grid does not have enough free cells for the requested spawn
    NotEnoughCells { needed: usize, available: usize },
    /// A spawn position is outside the grid or already occupied
    InvalidSpawnCell(Cell),
    /// An archetype template document failed to parse
    MalformedTemplates(String),
}

/// Errors related to movement requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementError {
    /// The actor has no budget entry (its turn never started)
    UnknownActor(CharacterId),
    /// The actor does not hold the current turn
    OutOfTurn(CharacterId),
    /// The actor's movement budget is exhausted
    NoBudget,
    /// Dead actors cannot move
    ActorDead,
    /// The destination is outside the grid or occupied
    DestinationBlocked(Cell),
    /// Single-step movement only accepts orthogonally adjacent cells
    NotAdjacent(Cell),
    /// No path within the remaining budget
    NoPath,
}

/// Errors related to combat actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The actor id is not in the roster
    UnknownActor(CharacterId),
    /// The actor does not hold the current turn
    OutOfTurn(CharacterId),
    /// Dead actors cannot act
    ActorDead,
    /// The actor already acted this turn
    AlreadyActed,
    /// The action kind requires a target but none was given
    MissingTarget(ActionKind),
    /// The target id is not in the roster
    UnknownTarget(CharacterId),
    /// The target is dead
    TargetDead(CharacterId),
    /// The action is not usable here (stats, range or health constraints)
    NotUsable(ActionKind),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Setup(err) => write!(f, "Setup error: {}", err),
            EngineError::Movement(err) => write!(f, "Movement error: {}", err),
            EngineError::Action(err) => write!(f, "Action error: {}", err),
        }
    }
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::EmptyRoster => write!(f, "Roster has no characters"),
            SetupError::IdMismatch { expected, found } => {
                write!(f, "Character id {} found in slot {}", found, expected)
            }
            SetupError::NotEnoughCells { needed, available } => {
                write!(f, "Need {} free cells but only {} available", needed, available)
            }
            SetupError::InvalidSpawnCell(cell) => write!(f, "Invalid spawn cell {}", cell),
            SetupError::MalformedTemplates(details) => {
                write!(f, "Malformed template data: {}", details)
            }
        }
    }
}

impl fmt::Display for MovementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementError::UnknownActor(id) => write!(f, "No movement entry for {}", id),
            MovementError::OutOfTurn(id) => write!(f, "It is not {}'s turn", id),
            MovementError::NoBudget => write!(f, "Movement budget exhausted"),
            MovementError::ActorDead => write!(f, "Dead actors cannot move"),
            MovementError::DestinationBlocked(cell) => {
                write!(f, "Destination {} is blocked", cell)
            }
            MovementError::NotAdjacent(cell) => {
                write!(f, "Cell {} is not orthogonally adjacent", cell)
            }
            MovementError::NoPath => write!(f, "No path within remaining budget"),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::UnknownActor(id) => write!(f, "Unknown actor: {}", id),
            ActionError::OutOfTurn(id) => write!(f, "It is not {}'s turn", id),
            ActionError::ActorDead => write!(f, "Dead actors cannot act"),
            ActionError::AlreadyActed => write!(f, "Actor already acted this turn"),
            ActionError::MissingTarget(kind) => {
                write!(f, "{} requires a target", kind.display_name())
            }
            ActionError::UnknownTarget(id) => write!(f, "Unknown target: {}", id),
            ActionError::TargetDead(id) => write!(f, "Target {} is dead", id),
            ActionError::NotUsable(kind) => {
                write!(f, "{} is not usable here", kind.display_name())
            }
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for SetupError {}
impl std::error::Error for MovementError {}
impl std::error::Error for ActionError {}

impl From<SetupError> for EngineError {
    fn from(err: SetupError) -> Self {
        EngineError::Setup(err)
    }
}

impl From<MovementError> for EngineError {
    fn from(err: MovementError) -> Self {
        EngineError::Movement(err)
    }
}

impl From<ActionError> for EngineError {
    fn from(err: ActionError) -> Self {
        EngineError::Action(err)
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Type alias for Results using SetupError
pub type SetupResult<T> = Result<T, SetupError>;
