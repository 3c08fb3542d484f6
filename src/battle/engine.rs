use crate::battle::calculators::{
    calculate_attack_outcome, calculate_flee_outcome, calculate_item_outcome,
};
use crate::battle::commands::{execute_command_batch, BattleCommand, PlayerTarget};
use crate::battle::state::{
    ActionFailureReason, BattleEvent, BattleState, EventBus, GameState, TurnRng,
};
use crate::errors::InvalidActionError;
use crate::player::{PlayerAction, Trainer};
use schema::DataTable;
use std::cmp::{Ordering, Reverse};
use std::collections::VecDeque;

/// Internal action types for the action stack
/// These represent atomic actions that can be executed during battle resolution
#[derive(Debug, Clone, PartialEq)]
pub enum BattleAction {
    /// Player runs from the battle
    Flee { player_index: usize },

    /// Player switches to a different Pokemon
    Switch {
        player_index: usize,
        target_pokemon_index: usize,
    },

    /// Player uses an item from their inventory
    UseItem { player_index: usize, item: String },

    /// The active Pokemon uses the move in `move_index`
    Attack {
        attacker_index: usize,
        move_index: usize,
    },
}

impl BattleAction {
    fn from_player_action(player_index: usize, action: &PlayerAction) -> Self {
        match action {
            PlayerAction::Flee => BattleAction::Flee { player_index },
            PlayerAction::SwitchPokemon { team_index } => BattleAction::Switch {
                player_index,
                target_pokemon_index: *team_index,
            },
            PlayerAction::UseItem { item } => BattleAction::UseItem {
                player_index,
                item: item.clone(),
            },
            PlayerAction::UseMove { move_index } => BattleAction::Attack {
                attacker_index: player_index,
                move_index: *move_index,
            },
        }
    }
}

/// Action stack for managing battle action execution
#[derive(Debug, Default)]
pub struct ActionStack {
    actions: VecDeque<BattleAction>,
}

impl ActionStack {
    pub fn new() -> Self {
        Self {
            actions: VecDeque::new(),
        }
    }

    pub fn push_back(&mut self, action: BattleAction) {
        self.actions.push_back(action);
    }

    pub fn pop_front(&mut self) -> Option<BattleAction> {
        self.actions.pop_front()
    }
}

/// Validates a player action against the current battle state.
/// Checks the game state, move uses and bounds, switch targets and inventory.
pub fn validate_player_action(
    battle_state: &BattleState,
    data: &DataTable,
    player_index: usize,
    action: &PlayerAction,
) -> Result<(), InvalidActionError> {
    if player_index >= 2 {
        return Err(InvalidActionError::InvalidPlayerIndex(player_index));
    }
    if battle_state.game_state.is_terminal() {
        return Err(InvalidActionError::BattleOver);
    }
    if !battle_state
        .game_state
        .players_to_act()
        .contains(&player_index)
    {
        return Err(InvalidActionError::NotExpectingAction {
            player_index,
            state: battle_state.game_state,
        });
    }
    if battle_state.action_queue[player_index].is_some() {
        return Err(InvalidActionError::AlreadySubmitted(player_index));
    }

    let player = &battle_state.players[player_index];
    let must_switch =
        battle_state.game_state.must_replace(player_index) || player.active_is_fainted();
    if must_switch && !action.is_switch() {
        return Err(InvalidActionError::MustSwitch);
    }

    validate_action_details(player, data, action)
}

fn validate_action_details(
    player: &Trainer,
    data: &DataTable,
    action: &PlayerAction,
) -> Result<(), InvalidActionError> {
    match action {
        PlayerAction::UseMove { move_index } => {
            let move_instance = player
                .active_pokemon()
                .and_then(|pokemon| pokemon.get_move(*move_index))
                .ok_or(InvalidActionError::InvalidMoveIndex(*move_index))?;
            if !move_instance.is_usable() {
                return Err(InvalidActionError::NoUsesLeft(move_instance.name.clone()));
            }
        }
        PlayerAction::SwitchPokemon { team_index } => {
            let target = player
                .team
                .get(*team_index)
                .ok_or(InvalidActionError::InvalidTeamIndex(*team_index))?;
            if target.is_fainted() {
                return Err(InvalidActionError::TargetFainted);
            }
            if *team_index == player.active_pokemon_index {
                return Err(InvalidActionError::AlreadyActive);
            }
        }
        PlayerAction::UseItem { item } => {
            if data.item(item).is_none() {
                return Err(InvalidActionError::UnknownItem(item.clone()));
            }
            if player.item_count(item) == 0 {
                return Err(InvalidActionError::ItemNotInInventory(item.clone()));
            }
        }
        PlayerAction::Flee => {}
    }
    Ok(())
}

/// Every action `validate_player_action` would accept for this player right now.
pub fn get_valid_actions(
    state: &BattleState,
    data: &DataTable,
    player_index: usize,
) -> Vec<PlayerAction> {
    let Some(player) = state.players.get(player_index) else {
        return Vec::new();
    };

    let mut candidates = player.get_valid_moves();
    candidates.extend(player.get_valid_switches());
    candidates.extend(
        player
            .inventory
            .keys()
            .map(|item| PlayerAction::UseItem { item: item.clone() }),
    );
    candidates.push(PlayerAction::Flee);

    candidates
        .into_iter()
        .filter(|action| validate_player_action(state, data, player_index, action).is_ok())
        .collect()
}

/// Check if battle is ready for turn resolution (every expected player has provided an action)
pub fn ready_for_turn_resolution(battle_state: &BattleState) -> bool {
    let players = battle_state.game_state.players_to_act();
    !players.is_empty()
        && players
            .iter()
            .all(|&index| battle_state.action_queue[index].is_some())
}

/// Main entry point for turn resolution
/// Takes a battle state and RNG oracle, executes one complete turn
/// Returns EventBus containing all events that occurred during the turn
pub fn resolve_turn(battle_state: &mut BattleState, data: &DataTable, mut rng: TurnRng) -> EventBus {
    let mut bus = EventBus::new();

    if battle_state.game_state.is_replacement_phase() {
        // Handle forced replacements without turn progression
        resolve_replacement_phase(battle_state, data, &mut bus, &mut rng);
        return bus;
    }

    // 1. Initialization
    initialize_turn(battle_state, &mut bus);

    // 2. Build initial action stack from player actions
    let mut action_stack = build_initial_action_stack(battle_state, data);

    // 3. Execute actions from stack until empty or the battle ends
    while let Some(action) = action_stack.pop_front() {
        execute_battle_action(action, battle_state, data, &mut bus, &mut rng);

        if battle_state.game_state == GameState::TurnInProgress
            && battle_state
                .players
                .iter()
                .any(|player| !player.has_non_fainted_pokemon())
        {
            check_win_conditions(battle_state, &mut bus);
        }

        if battle_state.game_state != GameState::TurnInProgress {
            break;
        }
    }

    // 4. End-of-Turn Phase (only if battle is still ongoing)
    if battle_state.game_state == GameState::TurnInProgress {
        execute_end_turn_phase(battle_state, &mut bus);
    }

    // 5. Cleanup & Finalization
    finalize_turn(battle_state, &mut bus);

    bus
}

/// Handle forced replacement phase without turn progression
fn resolve_replacement_phase(
    battle_state: &mut BattleState,
    data: &DataTable,
    bus: &mut EventBus,
    rng: &mut TurnRng,
) {
    let mut action_stack = build_initial_action_stack(battle_state, data);

    while let Some(action) = action_stack.pop_front() {
        // Only switches are accepted during a replacement phase
        if matches!(action, BattleAction::Switch { .. }) {
            execute_battle_action(action, battle_state, data, bus, rng);
        }
    }

    check_win_conditions(battle_state, bus);

    let mut commands = Vec::new();
    if !battle_state.game_state.is_terminal() {
        commands.push(BattleCommand::SetGameState(GameState::WaitingForActions));
    }
    commands.push(BattleCommand::ClearActionQueue);
    run_commands(commands, battle_state, bus);

    // A replacement that did not happen leaves the phase open
    if !battle_state.game_state.is_terminal() {
        check_for_pending_replacements(battle_state, bus);
    }
}

fn initialize_turn(battle_state: &mut BattleState, bus: &mut EventBus) {
    run_commands(
        vec![BattleCommand::SetGameState(GameState::TurnInProgress)],
        battle_state,
        bus,
    );
    bus.push(BattleEvent::TurnStarted {
        turn_number: battle_state.turn_number,
    });
}

/// Build initial action stack from player actions in priority order
fn build_initial_action_stack(battle_state: &BattleState, data: &DataTable) -> ActionStack {
    let queued: Vec<(usize, PlayerAction)> = battle_state
        .action_queue
        .iter()
        .enumerate()
        .filter_map(|(player_index, action)| {
            action.as_ref().map(|action| (player_index, action.clone()))
        })
        .collect();

    let mut stack = ActionStack::new();
    for (player_index, action) in determine_action_order(battle_state, data, &queued) {
        stack.push_back(BattleAction::from_player_action(player_index, &action));
    }
    stack
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ActionPriority {
    action_priority: i8, // Flee: 10, Switch: 6, Item: 4, Move: 0
    move_priority: i8,   // Only relevant for moves
}

fn calculate_action_priority(
    player_index: usize,
    action: &PlayerAction,
    battle_state: &BattleState,
    data: &DataTable,
) -> ActionPriority {
    match action {
        PlayerAction::Flee => ActionPriority {
            action_priority: 10,
            move_priority: 0,
        },
        PlayerAction::SwitchPokemon { .. } => ActionPriority {
            action_priority: 6,
            move_priority: 0,
        },
        PlayerAction::UseItem { .. } => ActionPriority {
            action_priority: 4,
            move_priority: 0,
        },
        PlayerAction::UseMove { move_index } => {
            let move_priority = battle_state.players[player_index]
                .active_pokemon()
                .and_then(|pokemon| pokemon.get_move(*move_index))
                .and_then(|instance| data.move_data(&instance.name))
                .map_or(0, |move_data| move_data.priority);
            ActionPriority {
                action_priority: 0,
                move_priority,
            }
        }
    }
}

/// Orders actions by tier, then move priority (both higher first), then submission order.
pub fn determine_action_order(
    battle_state: &BattleState,
    data: &DataTable,
    actions: &[(usize, PlayerAction)],
) -> Vec<(usize, PlayerAction)> {
    let mut prioritized: Vec<_> = actions
        .iter()
        .map(|(player_index, action)| {
            let priority = calculate_action_priority(*player_index, action, battle_state, data);
            let rank = battle_state.submission_rank(*player_index);
            (Reverse(priority), rank, *player_index, action.clone())
        })
        .collect();

    prioritized.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    log::debug!(
        "Action order for turn {}: {:?}",
        battle_state.turn_number,
        prioritized
            .iter()
            .map(|(_, _, player_index, action)| (player_index, action.to_string()))
            .collect::<Vec<_>>()
    );

    prioritized
        .into_iter()
        .map(|(_, _, player_index, action)| (player_index, action))
        .collect()
}

/// Execute a single battle action
pub fn execute_battle_action(
    action: BattleAction,
    battle_state: &mut BattleState,
    data: &DataTable,
    bus: &mut EventBus,
    rng: &mut TurnRng,
) {
    let commands = match action {
        BattleAction::Flee { player_index } => {
            if battle_state.players[player_index].active_is_fainted() {
                vec![action_failed(player_index, ActionFailureReason::PokemonFainted)]
            } else {
                calculate_flee_outcome(battle_state, player_index)
            }
        }
        BattleAction::Switch {
            player_index,
            target_pokemon_index,
        } => {
            // Switching away from a fainted Pokemon is allowed, switching to one is not
            if battle_state.players[player_index].can_switch_to(target_pokemon_index) {
                vec![BattleCommand::SwitchPokemon {
                    target: PlayerTarget::from_index(player_index),
                    new_pokemon_index: target_pokemon_index,
                }]
            } else {
                vec![action_failed(player_index, ActionFailureReason::InvalidSwitch)]
            }
        }
        BattleAction::UseItem { player_index, item } => {
            calculate_item_outcome(battle_state, data, player_index, &item, rng)
        }
        BattleAction::Attack {
            attacker_index,
            move_index,
        } => calculate_attack_outcome(battle_state, data, attacker_index, move_index, rng),
    };

    run_commands(commands, battle_state, bus);
}

fn action_failed(player_index: usize, reason: ActionFailureReason) -> BattleCommand {
    BattleCommand::EmitEvent(BattleEvent::ActionFailed {
        player_index,
        reason,
    })
}

fn run_commands(commands: Vec<BattleCommand>, battle_state: &mut BattleState, bus: &mut EventBus) {
    if let Err(e) = execute_command_batch(commands, battle_state, bus) {
        log::error!("Error executing battle commands: {}", e);
    }
}

/// Every stat modifier on every Pokemon ticks down one round.
pub fn execute_end_turn_phase(battle_state: &mut BattleState, bus: &mut EventBus) {
    for (player_index, player) in battle_state.players.iter_mut().enumerate() {
        for pokemon in player.team.iter_mut() {
            let was_fainted = pokemon.is_fainted();
            let expired = pokemon.tick_modifiers();
            if expired > 0 {
                bus.push(BattleEvent::ModifiersExpired {
                    target: pokemon.name.clone(),
                    count: expired,
                });
            }
            // Expiring a health buff can take the last of a Pokemon's health with it
            if !was_fainted && pokemon.is_fainted() {
                bus.push(BattleEvent::PokemonFainted {
                    player_index,
                    pokemon: pokemon.name.clone(),
                });
            }
        }
    }
}

fn finalize_turn(battle_state: &mut BattleState, bus: &mut EventBus) {
    // 1. Check for win conditions, which override everything else
    if battle_state.game_state == GameState::TurnInProgress {
        check_win_conditions(battle_state, bus);
    }

    // 2. Escapes and captures end the battle without a winner
    if matches!(
        battle_state.game_state,
        GameState::Escaped | GameState::Captured
    ) {
        bus.push(BattleEvent::BattleEnded { winner: None });
        log::info!("Battle ended: {:?}", battle_state.game_state);
    }

    // 3. Increment turn number and wait for the next actions if the battle is ongoing
    if battle_state.game_state == GameState::TurnInProgress {
        run_commands(
            vec![
                BattleCommand::IncrementTurnNumber,
                BattleCommand::SetGameState(GameState::WaitingForActions),
            ],
            battle_state,
            bus,
        );
    }

    // 4. Check if the default state needs to be overridden by a replacement phase
    check_for_pending_replacements(battle_state, bus);

    // 5. Clear the action queue from the turn that just ended
    run_commands(vec![BattleCommand::ClearActionQueue], battle_state, bus);

    bus.push(BattleEvent::TurnEnded);
}

/// Checks whether any active Pokemon has fainted with a replacement available.
fn check_for_pending_replacements(battle_state: &mut BattleState, bus: &mut EventBus) {
    if battle_state.game_state.is_terminal() {
        return;
    }

    let needs_replacement = |player: &Trainer| {
        player.active_is_fainted() && !player.get_valid_switches().is_empty()
    };
    let p1_needs_replacement = needs_replacement(&battle_state.players[0]);
    let p2_needs_replacement = needs_replacement(&battle_state.players[1]);

    let new_game_state = match (p1_needs_replacement, p2_needs_replacement) {
        (true, true) => Some(GameState::WaitingForBothReplacements),
        (true, false) => Some(GameState::WaitingForPlayer1Replacement),
        (false, true) => Some(GameState::WaitingForPlayer2Replacement),
        (false, false) => None,
    };

    if let Some(state) = new_game_state {
        run_commands(vec![BattleCommand::SetGameState(state)], battle_state, bus);
    }
}

/// Check win conditions and update battle state accordingly
fn check_win_conditions(battle_state: &mut BattleState, bus: &mut EventBus) {
    let player1_has_pokemon = battle_state.players[0].has_non_fainted_pokemon();
    let player2_has_pokemon = battle_state.players[1].has_non_fainted_pokemon();

    let (new_state, defeated, winner) = match (player1_has_pokemon, player2_has_pokemon) {
        (false, false) => (GameState::Draw, vec![0, 1], None),
        (false, true) => (GameState::Player2Win, vec![0], Some(1)),
        (true, false) => (GameState::Player1Win, vec![1], Some(0)),
        (true, true) => return,
    };

    run_commands(vec![BattleCommand::SetGameState(new_state)], battle_state, bus);
    for player_index in defeated {
        bus.push(BattleEvent::PlayerDefeated { player_index });
    }
    bus.push(BattleEvent::BattleEnded { winner });
    log::info!(
        "Battle ended on turn {}: {:?}",
        battle_state.turn_number,
        new_state
    );
}
