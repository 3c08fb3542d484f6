use crate::data::MAXIMUM_LEVEL;
use schema::{ElementType, MoveData, SpeciesData, StatBlock, StatModifier, MAXIMUM_MOVE_SLOTS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveInstance {
    pub name: String,
    pub uses: u8,
    pub max_uses: u8,
}

impl MoveInstance {
    /// Create a new move instance with every use available
    pub fn new(move_data: &MoveData) -> Self {
        MoveInstance {
            name: move_data.name.clone(),
            uses: move_data.max_uses,
            max_uses: move_data.max_uses,
        }
    }

    pub fn is_usable(&self) -> bool {
        self.uses > 0
    }

    /// Use the move (decrease remaining uses)
    pub fn use_move(&mut self) -> bool {
        if self.uses > 0 {
            self.uses -= 1;
            true
        } else {
            false
        }
    }

    pub fn restore_uses(&mut self) {
        self.uses = self.max_uses;
    }
}

/// A stat modifier that expires after `rounds_remaining` end-of-turn ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveModifier {
    pub modifier: StatModifier,
    pub rounds_remaining: u8,
}

/// Outcome of awarding experience to a Pokemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceGain {
    pub gained: u32,
    pub old_level: u8,
    pub new_level: u8,
}

impl ExperienceGain {
    pub fn levels_gained(&self) -> u8 {
        self.new_level - self.old_level
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonInst {
    pub name: String,    // Species name if no nickname
    pub species: String, // Key for looking up species data
    pub element_type: ElementType,
    pub level: u8,
    pub experience: u32,
    pub stats: StatBlock,
    curr_hp: u16,
    pub moves: Vec<MoveInstance>,
    pub modifiers: Vec<ActiveModifier>,
}

/// Total experience a Pokemon has on reaching `level`.
pub fn experience_for_level(level: u8) -> u32 {
    let level = level as u32;
    level * level * level
}

/// Experience awarded for making a Pokemon of `level` faint.
pub fn experience_reward(level: u8) -> u32 {
    200 * level as u32 / 7
}

impl PokemonInst {
    /// Create a new Pokemon instance from species data.
    ///
    /// The species stats are taken as the stats at `level`; they are not scaled.
    pub fn new(
        species_data: &SpeciesData,
        level: u8,
        moves: Vec<&MoveData>,
        nickname: Option<String>,
    ) -> Self {
        let level = level.clamp(1, MAXIMUM_LEVEL);
        let move_instances = moves
            .into_iter()
            .take(MAXIMUM_MOVE_SLOTS)
            .map(MoveInstance::new)
            .collect();

        PokemonInst {
            name: nickname.unwrap_or_else(|| species_data.name.clone()),
            species: species_data.name.clone(),
            element_type: species_data.element_type,
            level,
            experience: experience_for_level(level),
            stats: species_data.stats,
            curr_hp: species_data.stats.max_health,
            moves: move_instances,
            modifiers: Vec::new(),
        }
    }

    pub fn current_hp(&self) -> u16 {
        self.curr_hp
    }

    /// Maximum health after active modifiers.
    pub fn max_hp(&self) -> u16 {
        self.effective_stats().max_health
    }

    pub fn is_fainted(&self) -> bool {
        self.curr_hp == 0
    }

    /// Base stats with the sum of all active modifiers applied.
    pub fn effective_stats(&self) -> StatBlock {
        let total = self
            .modifiers
            .iter()
            .fold(StatModifier::default(), |acc, active| {
                acc.combine(&active.modifier)
            });
        self.stats.apply_modifier(&total)
    }

    /// Returns true if this damage made the Pokemon faint.
    pub fn take_damage(&mut self, damage: u16) -> bool {
        let was_fainted = self.is_fainted();
        self.curr_hp = self.curr_hp.saturating_sub(damage);
        !was_fainted && self.is_fainted()
    }

    /// Restores health up to the modified maximum. Fainted Pokemon are not revived.
    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        if self.is_fainted() {
            return 0;
        }
        let before = self.curr_hp;
        self.curr_hp = self.curr_hp.saturating_add(amount).min(self.max_hp());
        self.curr_hp.saturating_sub(before)
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.curr_hp = hp.min(self.max_hp());
    }

    pub fn set_hp_to_max(&mut self) {
        self.curr_hp = self.max_hp();
    }

    /// Applies `modifier` for `rounds` rounds and clamps health to the new maximum.
    /// Returns true if the lowered maximum made the Pokemon faint.
    pub fn add_modifier(&mut self, modifier: StatModifier, rounds: u8) -> bool {
        let was_fainted = self.is_fainted();
        self.modifiers.push(ActiveModifier {
            modifier,
            rounds_remaining: rounds,
        });
        self.curr_hp = self.curr_hp.min(self.max_hp());
        !was_fainted && self.is_fainted()
    }

    /// Counts every modifier down by one round and drops the expired ones.
    /// Returns how many expired.
    pub fn tick_modifiers(&mut self) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain_mut(|active| {
            active.rounds_remaining = active.rounds_remaining.saturating_sub(1);
            active.rounds_remaining > 0
        });
        let expired = before - self.modifiers.len();
        self.curr_hp = self.curr_hp.min(self.max_hp());
        expired
    }

    /// Full health, no modifiers, every move use restored.
    pub fn rest(&mut self) {
        self.modifiers.clear();
        self.curr_hp = self.stats.max_health;
        for move_instance in self.moves.iter_mut() {
            move_instance.restore_uses();
        }
    }

    /// A move can be learned while a slot is free and the Pokemon does not already know it.
    pub fn can_learn_move(&self, move_name: &str) -> bool {
        self.moves.len() < MAXIMUM_MOVE_SLOTS && !self.knows_move(move_name)
    }

    pub fn knows_move(&self, move_name: &str) -> bool {
        self.moves.iter().any(|instance| instance.name == move_name)
    }

    /// Learns `move_data` with every use available. Returns false if it could not be learned.
    pub fn learn_move(&mut self, move_data: &MoveData) -> bool {
        if !self.can_learn_move(&move_data.name) {
            return false;
        }
        self.moves.push(MoveInstance::new(move_data));
        true
    }

    /// Forgets `move_name`. Later moves shift down one slot. Returns false if it was not known.
    pub fn forget_move(&mut self, move_name: &str) -> bool {
        let before = self.moves.len();
        self.moves.retain(|instance| instance.name != move_name);
        self.moves.len() < before
    }

    pub fn get_move(&self, move_index: usize) -> Option<&MoveInstance> {
        self.moves.get(move_index)
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().any(MoveInstance::is_usable)
    }

    /// Uses one charge of the move in `move_index`. Returns false if it had none.
    pub fn use_move(&mut self, move_index: usize) -> bool {
        self.moves
            .get_mut(move_index)
            .is_some_and(|move_instance| move_instance.use_move())
    }

    /// Adds experience and levels up as many times as the new total allows.
    pub fn gain_experience(&mut self, amount: u32) -> ExperienceGain {
        let old_level = self.level;
        self.experience = self.experience.saturating_add(amount);

        while self.level < MAXIMUM_LEVEL && self.experience >= experience_for_level(self.level + 1)
        {
            self.level_up();
        }

        ExperienceGain {
            gained: amount,
            old_level,
            new_level: self.level,
        }
    }

    fn level_up(&mut self) {
        let old_max_health = self.stats.max_health;
        self.stats.level_up();
        let health_growth = self.stats.max_health - old_max_health;
        self.level += 1;
        if !self.is_fainted() {
            self.curr_hp = self.curr_hp.saturating_add(health_growth).min(self.max_hp());
        }
    }
}
