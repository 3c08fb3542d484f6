//! A module for defining AI behaviors for battle opponents.

use crate::battle::calculators::calculate_damage;
use crate::battle::state::{BattleState, BattleType};
use crate::player::{PlayerAction, Trainer};
use crate::pokemon::PokemonInst;
use ordered_float::OrderedFloat;
use schema::{DataTable, ItemData, MoveEffect};

/// A trait for any system that can decide on a battle action.
/// This provides a common interface for different AI difficulties or strategies.
pub trait Behavior {
    /// Inspects the battle state and decides on the next action for the given player.
    fn decide_action(
        &self,
        player_index: usize,
        battle_state: &BattleState,
        data: &DataTable,
    ) -> PlayerAction;
}

/// Falls back to the first replacement, or Flee when there is none.
fn forced_switch(player: &Trainer) -> PlayerAction {
    player
        .first_non_fainted_index()
        .map(|team_index| PlayerAction::SwitchPokemon { team_index })
        .unwrap_or(PlayerAction::Flee)
}

/// Picks the move with the best expected damage.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoringAI;

/// Below this fraction of max health the AI reaches for food.
const HEAL_THRESHOLD: f64 = 0.3;

impl ScoringAI {
    pub fn new() -> Self {
        Self
    }

    /// Expected value of using `move_index`: hit chance times damage for attacks,
    /// a flat utility for everything else.
    fn score_move(
        &self,
        move_index: usize,
        attacker: &PokemonInst,
        defender: Option<&PokemonInst>,
        data: &DataTable,
    ) -> f64 {
        let Some(move_data) = attacker
            .get_move(move_index)
            .and_then(|instance| data.move_data(&instance.name))
        else {
            return 0.0;
        };
        let attacker_stats = attacker.effective_stats();

        match (&move_data.effect, defender) {
            (MoveEffect::Damage { base_damage, hit_chance }, Some(defender)) => {
                let effectiveness = move_data.element_type.effectiveness(defender.element_type);
                let damage = calculate_damage(
                    *base_damage,
                    effectiveness,
                    attacker_stats.attack,
                    defender.effective_stats().defense,
                )
                .min(defender.current_hp());
                attacker_stats.hit_chance * hit_chance * damage as f64
            }
            (MoveEffect::FixedDamage { amount, hit_chance }, Some(defender)) => {
                let damage = (*amount).min(defender.current_hp());
                attacker_stats.hit_chance * hit_chance * damage as f64
            }
            (MoveEffect::StatModifier { .. }, _) => {
                // Worth a little more on the first turns than once modifiers pile up
                5.0 / (attacker.modifiers.len() as f64 + 1.0)
            }
            (MoveEffect::Heal { amount }, _) => {
                let missing = attacker.max_hp().saturating_sub(attacker.current_hp());
                (*amount).min(missing) as f64 * 0.5
            }
            _ => 0.0,
        }
    }

    /// Healthiest replacement wins.
    fn score_switch(&self, team_index: usize, player: &Trainer) -> f64 {
        player
            .team
            .get(team_index)
            .map_or(0.0, |pokemon| pokemon.current_hp() as f64)
    }

    fn food_to_use(&self, player: &Trainer, data: &DataTable) -> Option<PlayerAction> {
        let active = player.active_pokemon()?;
        if active.current_hp() as f64 > active.max_hp() as f64 * HEAL_THRESHOLD {
            return None;
        }
        player
            .inventory
            .iter()
            .filter(|(_, &count)| count > 0)
            .find(|(name, _)| matches!(data.item(name), Some(ItemData::Food { .. })))
            .map(|(name, _)| PlayerAction::UseItem { item: name.clone() })
    }
}

impl Behavior for ScoringAI {
    fn decide_action(
        &self,
        player_index: usize,
        battle_state: &BattleState,
        data: &DataTable,
    ) -> PlayerAction {
        let player = &battle_state.players[player_index];

        // --- Phase 1: Handle Forced Replacements ---
        if player.active_is_fainted() {
            return player
                .get_valid_switches()
                .into_iter()
                .max_by_key(|action| match action {
                    PlayerAction::SwitchPokemon { team_index } => {
                        OrderedFloat(self.score_switch(*team_index, player))
                    }
                    _ => OrderedFloat(0.0),
                })
                .unwrap_or(PlayerAction::Flee);
        }

        // --- Phase 2: Heal when in danger ---
        if let Some(action) = self.food_to_use(player, data) {
            return action;
        }

        // --- Phase 3: Best attack ---
        let attacker = player.active_pokemon();
        let defender = battle_state.players[1 - player_index]
            .active_pokemon()
            .filter(|pokemon| !pokemon.is_fainted());

        let best_move = attacker.and_then(|attacker| {
            player
                .get_valid_moves()
                .into_iter()
                .filter_map(|action| match action {
                    PlayerAction::UseMove { move_index } => {
                        let score = self.score_move(move_index, attacker, defender, data);
                        Some((action, score))
                    }
                    _ => None,
                })
                .max_by_key(|(_, score)| OrderedFloat(*score))
        });

        match best_move {
            Some((action, _)) => action,
            // Out of moves: send in someone who still has some
            None => player
                .get_valid_switches()
                .into_iter()
                .find(|action| match action {
                    PlayerAction::SwitchPokemon { team_index } => player
                        .team
                        .get(*team_index)
                        .is_some_and(|pokemon| pokemon.has_usable_move()),
                    _ => false,
                })
                .unwrap_or(PlayerAction::Flee),
        }
    }
}

/// Runs from wild battles, throws Poke Balls at any Pikachu, and otherwise attacks
/// with the first super-effective move.
#[derive(Debug, Default, Clone, Copy)]
pub struct TeamRocket;

impl Behavior for TeamRocket {
    fn decide_action(
        &self,
        player_index: usize,
        battle_state: &BattleState,
        data: &DataTable,
    ) -> PlayerAction {
        let player = &battle_state.players[player_index];
        if player.active_is_fainted() || battle_state.battle_type == BattleType::Wild {
            return ScaredyCat.decide_action(player_index, battle_state, data);
        }

        let opponent = battle_state.players[1 - player_index].active_pokemon();

        if opponent.is_some_and(|pokemon| pokemon.species == "Pikachu") {
            let ball = player
                .inventory
                .iter()
                .filter(|(_, &count)| count > 0)
                .find(|(name, _)| data.item(name).is_some_and(ItemData::is_pokeball));
            if let Some((name, _)) = ball {
                return PlayerAction::UseItem { item: name.clone() };
            }
        }

        let Some(active) = player.active_pokemon() else {
            return PlayerAction::Flee;
        };

        let mut usable: Vec<(usize, &str)> = active
            .moves
            .iter()
            .enumerate()
            .filter(|(_, instance)| instance.is_usable())
            .map(|(index, instance)| (index, instance.name.as_str()))
            .collect();
        usable.sort_by_key(|(_, name)| *name);

        let super_effective = usable.iter().find(|(_, name)| {
            match (data.move_data(name), opponent) {
                (Some(move_data), Some(target)) => {
                    move_data.element_type.is_super_effective(target.element_type)
                }
                _ => false,
            }
        });

        super_effective
            .or(usable.first())
            .map(|(move_index, _)| PlayerAction::UseMove {
                move_index: *move_index,
            })
            .unwrap_or(PlayerAction::Flee)
    }
}

/// Always runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaredyCat;

impl Behavior for ScaredyCat {
    fn decide_action(
        &self,
        player_index: usize,
        battle_state: &BattleState,
        _data: &DataTable,
    ) -> PlayerAction {
        let player = &battle_state.players[player_index];
        if player.active_is_fainted() {
            forced_switch(player)
        } else {
            PlayerAction::Flee
        }
    }
}
