use crate::player::{PlayerAction, Trainer};
use rand::Rng;
use schema::StatModifier;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Copy)]
pub enum GameState {
    WaitingForActions,
    TurnInProgress,
    WaitingForPlayer1Replacement, // Player 1 needs to send out a new Pokemon after faint
    WaitingForPlayer2Replacement, // Player 2 needs to send out a new Pokemon after faint
    WaitingForBothReplacements,   // Both players need to send out new Pokemon after faints
    Player1Win,
    Player2Win,
    Draw,
    Escaped,  // A trainer ran from a wild Pokemon
    Captured, // A trainer caught the wild Pokemon
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameState::Player1Win
                | GameState::Player2Win
                | GameState::Draw
                | GameState::Escaped
                | GameState::Captured
        )
    }

    pub fn is_replacement_phase(self) -> bool {
        matches!(
            self,
            GameState::WaitingForPlayer1Replacement
                | GameState::WaitingForPlayer2Replacement
                | GameState::WaitingForBothReplacements
        )
    }

    pub fn winner(self) -> Option<usize> {
        match self {
            GameState::Player1Win => Some(0),
            GameState::Player2Win => Some(1),
            _ => None,
        }
    }

    /// The players who must submit an action before the battle can move on.
    pub fn players_to_act(self) -> &'static [usize] {
        match self {
            GameState::WaitingForActions | GameState::WaitingForBothReplacements => &[0, 1],
            GameState::WaitingForPlayer1Replacement => &[0],
            GameState::WaitingForPlayer2Replacement => &[1],
            _ => &[],
        }
    }

    pub fn must_replace(self, player_index: usize) -> bool {
        match self {
            GameState::WaitingForPlayer1Replacement => player_index == 0,
            GameState::WaitingForPlayer2Replacement => player_index == 1,
            GameState::WaitingForBothReplacements => true,
            _ => false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BattleType {
    #[default]
    Trainer,
    Wild,
}

impl fmt::Display for BattleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleType::Trainer => write!(f, "Trainer"),
            BattleType::Wild => write!(f, "Wild"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn Management
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded,

    // Pokemon Actions
    PokemonSwitched {
        player_index: usize,
        old_pokemon: String,
        new_pokemon: String,
    },
    MoveUsed {
        player_index: usize,
        pokemon: String,
        move_used: String,
    },
    MoveMissed {
        attacker: String,
        defender: String,
        move_used: String,
    },
    DamageDealt {
        target: String,
        damage: u16,
        remaining_hp: u16,
    },
    PokemonHealed {
        target: String,
        amount: u16,
        new_hp: u16,
    },
    PokemonFainted {
        player_index: usize,
        pokemon: String,
    },
    AttackTypeEffectiveness {
        multiplier: f64,
    },
    NothingHappened,

    // Stat Changes
    Buffed {
        target: String,
        modifier: StatModifier,
        rounds: u8,
    },
    Debuffed {
        target: String,
        modifier: StatModifier,
        rounds: u8,
    },
    ModifiersExpired {
        target: String,
        count: usize,
    },

    // Progression
    ExperienceGained {
        player_index: usize,
        pokemon: String,
        amount: u32,
    },
    LevelUp {
        player_index: usize,
        pokemon: String,
        new_level: u8,
    },

    // Items, catching and fleeing
    ItemUsed {
        player_index: usize,
        item: String,
    },
    CatchNotAllowed {
        player_index: usize,
    },
    CatchFailed {
        pokemon: String,
    },
    TeamFull {
        player_index: usize,
    },
    PokemonCaught {
        player_index: usize,
        pokemon: String,
    },
    FleeFailed {
        player_index: usize,
    },
    Escaped {
        player_index: usize,
    },

    // Action Failures
    ActionFailed {
        player_index: usize,
        reason: ActionFailureReason,
    },

    // Battle End
    PlayerDefeated {
        player_index: usize,
    },
    BattleEnded {
        winner: Option<usize>,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable string using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, battle_state: &BattleState) -> Option<String> {
        match self {
            // === Turn Management Events ===
            BattleEvent::TurnStarted { turn_number } => {
                Some(format!("=== Turn {} ===", turn_number))
            }
            BattleEvent::TurnEnded => None,

            // === Pokemon Switching Events ===
            BattleEvent::PokemonSwitched {
                player_index,
                old_pokemon,
                new_pokemon,
            } => {
                let player_name = battle_state.display_name(*player_index);
                Some(format!(
                    "{} recalled {} and sent out {}!",
                    player_name, old_pokemon, new_pokemon
                ))
            }

            // === Move Events ===
            BattleEvent::MoveUsed {
                player_index,
                pokemon,
                move_used,
            } => Some(format!(
                "{} used {}!",
                battle_state.pokemon_label(*player_index, pokemon),
                move_used
            )),
            BattleEvent::MoveMissed { attacker, .. } => {
                Some(format!("{}'s attack missed!", attacker))
            }
            BattleEvent::NothingHappened => Some("But nothing happened!".to_string()),

            // === Damage and Healing Events ===
            BattleEvent::DamageDealt { target, damage, .. } => {
                Some(format!("{} took {} damage!", target, damage))
            }
            BattleEvent::PokemonHealed { target, amount, .. } => {
                Some(format!("{} recovered {} HP!", target, amount))
            }
            BattleEvent::PokemonFainted {
                player_index,
                pokemon,
            } => Some(format!(
                "{} fainted!",
                battle_state.pokemon_label(*player_index, pokemon)
            )),

            // === Type Effectiveness Events ===
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => Some("It's super effective!".to_string()),
                m if m < 1.0 && m > 0.0 => Some("It's not very effective...".to_string()),
                m if m == 0.0 => Some("It had no effect!".to_string()),
                _ => None, // Normal effectiveness, no message
            },

            // === Stat Change Events ===
            BattleEvent::Buffed { target, rounds, .. } => Some(format!(
                "{}'s stats rose for {} {}!",
                target,
                rounds,
                Self::rounds_word(*rounds)
            )),
            BattleEvent::Debuffed { target, rounds, .. } => Some(format!(
                "{}'s stats fell for {} {}!",
                target,
                rounds,
                Self::rounds_word(*rounds)
            )),
            BattleEvent::ModifiersExpired { target, .. } => {
                Some(format!("{}'s stat changes wore off.", target))
            }

            // === Progression Events ===
            BattleEvent::ExperienceGained {
                pokemon, amount, ..
            } => Some(format!("{} gained {} experience!", pokemon, amount)),
            BattleEvent::LevelUp {
                pokemon, new_level, ..
            } => Some(format!("{} grew to level {}!", pokemon, new_level)),

            // === Item Events ===
            BattleEvent::ItemUsed { player_index, item } => Some(format!(
                "{} used a {}!",
                battle_state.display_name(*player_index),
                item
            )),
            BattleEvent::CatchNotAllowed { .. } => {
                Some("The trainer blocked the ball! Don't be a thief!".to_string())
            }
            BattleEvent::CatchFailed { pokemon } => {
                Some(format!("Oh no! The wild {} broke free!", pokemon))
            }
            BattleEvent::TeamFull { player_index } => Some(format!(
                "{} has no room for another Pokemon!",
                battle_state.display_name(*player_index)
            )),
            BattleEvent::PokemonCaught { pokemon, .. } => {
                Some(format!("Gotcha! The wild {} was caught!", pokemon))
            }
            BattleEvent::FleeFailed { .. } => {
                Some("No! There's no running from a trainer battle!".to_string())
            }
            BattleEvent::Escaped { .. } => Some("Got away safely!".to_string()),

            // === Action Failure Events ===
            BattleEvent::ActionFailed {
                player_index,
                reason,
            } => Some(format!(
                "{} {}",
                battle_state.display_name(*player_index),
                Self::format_action_failure_reason(reason)
            )),

            // === Battle End Events ===
            BattleEvent::PlayerDefeated { player_index } => Some(format!(
                "{} is out of usable Pokémon!",
                battle_state.display_name(*player_index)
            )),
            BattleEvent::BattleEnded { winner } => match winner {
                Some(index) => Some(format!(
                    "{} has won the battle!",
                    battle_state.display_name(*index)
                )),
                None if battle_state.game_state == GameState::Draw => {
                    Some("The battle ended in a draw!".to_string())
                }
                None => None,
            },
        }
    }

    // --- Private Helper Functions ---

    fn rounds_word(rounds: u8) -> &'static str {
        if rounds == 1 {
            "round"
        } else {
            "rounds"
        }
    }

    fn format_action_failure_reason(reason: &ActionFailureReason) -> String {
        match reason {
            ActionFailureReason::PokemonFainted => {
                "can't act, its Pokemon has fainted.".to_string()
            }
            ActionFailureReason::NoEnemyPresent => "has no target. But it failed!".to_string(),
            ActionFailureReason::NoUsesRemaining => {
                "tried a move with no uses left. But it failed!".to_string()
            }
            ActionFailureReason::NoItemRemaining => "has none of that item left!".to_string(),
            ActionFailureReason::InvalidSwitch => "couldn't switch Pokemon!".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionFailureReason {
    PokemonFainted, // The acting Pokemon fainted earlier in the turn
    NoEnemyPresent, // The opponent's active Pokemon fainted before an offensive move
    NoUsesRemaining,
    NoItemRemaining,
    InvalidSwitch,
}

/// Event bus for collecting and managing battle events.
///
/// ```rust,ignore
/// let messages = event_bus.messages(&battle_state); // Human-readable lines
/// println!("{}", event_bus);                         // Debug dump via Display
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// Formatted text for every non-silent event, in order.
    pub fn messages(&self, battle_state: &BattleState) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| event.format(battle_state))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl fmt::Display for EventBus {
    /// Shows debug format of all events.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// Pre-drawn random outcomes (1..=100) for one turn.
///
/// Lower is better: a check with chance `p` succeeds when the outcome is at most `p * 100`.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
}

/// Outcomes drawn per turn; far more than any turn consumes.
pub const OUTCOMES_PER_TURN: usize = 100;

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        let outcomes = (0..OUTCOMES_PER_TURN)
            .map(|_| rng.random_range(1..=100))
            .collect();
        Self { outcomes, index: 0 }
    }

    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.outcomes.is_empty() {
            log::warn!("TurnRng has no outcomes for '{}', using 100", reason);
            return 100;
        }
        if self.index >= self.outcomes.len() {
            log::warn!(
                "TurnRng exhausted after {} outcomes while drawing for '{}', wrapping around",
                self.outcomes.len(),
                reason
            );
            self.index = 0;
        }
        let outcome = self.outcomes[self.index];
        log::trace!("[RNG] Consumed {} for: {}", outcome, reason);
        self.index += 1;
        outcome
    }

    /// Draws an outcome and reports whether it falls within `chance` (0.0 to 1.0).
    pub fn roll(&mut self, chance: f64, reason: &str) -> bool {
        let outcome = self.next_outcome(reason);
        (outcome as f64) <= chance * 100.0
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BattleState {
    pub players: [Trainer; 2],
    pub battle_type: BattleType,
    pub turn_number: u32,
    pub game_state: GameState,
    pub action_queue: [Option<PlayerAction>; 2],
    // Player indices in the order their queued actions were submitted
    pub submission_order: Vec<usize>,
    // Set when the wild Pokemon was caught, to the catching player
    pub captured_by: Option<usize>,
}

impl BattleState {
    pub fn new(player1: Trainer, player2: Trainer) -> Self {
        Self {
            players: [player1, player2],
            battle_type: BattleType::Trainer,
            turn_number: 1,
            game_state: GameState::WaitingForActions,
            action_queue: [None, None],
            submission_order: Vec::new(),
            captured_by: None,
        }
    }

    pub fn with_battle_type(mut self, battle_type: BattleType) -> Self {
        self.battle_type = battle_type;
        self
    }

    pub fn queue_action(&mut self, player_index: usize, action: PlayerAction) {
        self.action_queue[player_index] = Some(action);
        self.submission_order.retain(|&index| index != player_index);
        self.submission_order.push(player_index);
    }

    pub fn clear_action_queue(&mut self) {
        self.action_queue = [None, None];
        self.submission_order.clear();
    }

    /// Rank of `player_index` in submission order; unsubmitted players sort last.
    pub fn submission_rank(&self, player_index: usize) -> usize {
        self.submission_order
            .iter()
            .position(|&index| index == player_index)
            .unwrap_or(usize::MAX)
    }

    /// Trainer name for messages. The nameless opponent of a wild battle reads as "The wild Pokemon".
    pub fn display_name(&self, player_index: usize) -> String {
        match self.players.get(player_index) {
            Some(trainer) if !trainer.name.is_empty() => trainer.name.clone(),
            _ => "The wild Pokemon".to_string(),
        }
    }

    fn pokemon_label(&self, player_index: usize, pokemon: &str) -> String {
        match self.players.get(player_index) {
            Some(trainer) if !trainer.name.is_empty() => format!("{}'s {}", trainer.name, pokemon),
            _ => format!("The wild {}", pokemon),
        }
    }
}
