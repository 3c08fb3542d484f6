use crate::battle::state::GameState;
use thiserror::Error;

/// Main error type for the battle engine.
#[derive(Debug, Error)]
pub enum BattleError {
    #[error(transparent)]
    InvalidAction(#[from] InvalidActionError),
    #[error(transparent)]
    InvalidRoster(#[from] InvalidRosterError),
    #[error(transparent)]
    Data(#[from] DataError),
}

/// An action was submitted that the battle cannot accept right now.
///
/// Nothing in the battle changes when one of these is returned, so a front end
/// can simply prompt again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidActionError {
    #[error("invalid player index: {0}")]
    InvalidPlayerIndex(usize),
    #[error("the battle is over")]
    BattleOver,
    #[error("player {player_index} cannot act in state {state:?}")]
    NotExpectingAction {
        player_index: usize,
        state: GameState,
    },
    #[error("player {0} already submitted an action this turn")]
    AlreadySubmitted(usize),
    #[error("the active Pokemon has fainted and must be switched out")]
    MustSwitch,
    #[error("invalid move index: {0}")]
    InvalidMoveIndex(usize),
    #[error("move {0} has no uses left")]
    NoUsesLeft(String),
    #[error("invalid team index: {0}")]
    InvalidTeamIndex(usize),
    #[error("cannot switch to a fainted Pokemon")]
    TargetFainted,
    #[error("that Pokemon is already active")]
    AlreadyActive,
    #[error("item {0} is not in the inventory")]
    ItemNotInInventory(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("not every required action has been submitted")]
    ActionsPending,
}

/// A roster that cannot take part in a battle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRosterError {
    #[error("{trainer} has an empty roster")]
    Empty { trainer: String },
    #[error("{trainer} has {size} Pokemon, the limit is {max}")]
    TooLarge {
        trainer: String,
        size: usize,
        max: usize,
    },
    #[error("{pokemon} knows {count} moves, the limit is {max}")]
    TooManyMoves {
        pokemon: String,
        count: usize,
        max: usize,
    },
    #[error("{pokemon} knows unknown move {move_name}")]
    UnknownMove { pokemon: String, move_name: String },
    #[error("every Pokemon on {trainer}'s roster has fainted")]
    AllFainted { trainer: String },
}

/// Errors from loading or looking up game data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse data: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("unknown species: {0}")]
    UnknownSpecies(String),
    #[error("unknown move: {0}")]
    UnknownMove(String),
    #[error("unknown item: {0}")]
    UnknownItem(String),
    #[error("unknown trainer: {0}")]
    UnknownTrainer(String),
    #[error("invalid entry {name}: {reason}")]
    InvalidEntry { name: String, reason: String },
}

pub type BattleResult<T> = Result<T, BattleError>;

pub type DataResult<T> = Result<T, DataError>;
