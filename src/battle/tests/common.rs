use crate::battle::runner::Battle;
use crate::battle::state::{BattleState, TurnRng};
use crate::config::BattleConfig;
use crate::data::DataTableExt;
use crate::player::Trainer;
use crate::pokemon::PokemonInst;
use schema::DataTable;
use std::sync::Arc;

/// A small data table covering every move effect and item kind.
pub const TEST_DATA: &str = r#"(
    species: {
        "Pikachu": (
            element_type: Electric,
            stats: (hit_chance: 1.0, max_health: 35, attack: 55, defense: 40),
            moves: ["Thunder Shock", "Growl"],
        ),
        "Charmander": (
            element_type: Fire,
            stats: (hit_chance: 1.0, max_health: 39, attack: 52, defense: 43),
            moves: ["Ember", "Growl"],
        ),
        "Squirtle": (
            element_type: Water,
            stats: (hit_chance: 1.0, max_health: 44, attack: 48, defense: 65),
            moves: ["Water Gun", "Tackle"],
        ),
        "Bulbasaur": (
            element_type: Grass,
            stats: (hit_chance: 1.0, max_health: 45, attack: 49, defense: 49),
            moves: ["Vine Whip", "Tackle"],
        ),
        "Onix": (
            element_type: Rock,
            stats: (hit_chance: 1.0, max_health: 35, attack: 45, defense: 160),
            moves: ["Tackle", "Harden"],
        ),
    },
    moves: {
        "Thunder Shock": (element_type: Electric, max_uses: 30, effect: Damage(base_damage: 40, hit_chance: 0.9)),
        "Ember": (element_type: Fire, max_uses: 25, effect: Damage(base_damage: 40, hit_chance: 1.0)),
        "Water Gun": (element_type: Water, max_uses: 25, effect: Damage(base_damage: 40, hit_chance: 1.0)),
        "Vine Whip": (element_type: Grass, max_uses: 25, effect: Damage(base_damage: 45, hit_chance: 1.0)),
        "Tackle": (element_type: Normal, max_uses: 35, effect: Damage(base_damage: 40, hit_chance: 1.0)),
        "Quick Attack": (element_type: Normal, max_uses: 30, priority: 1, effect: Damage(base_damage: 40, hit_chance: 1.0)),
        "Jab": (element_type: Fighting, max_uses: 10, priority: 1, effect: FixedDamage(amount: 10, hit_chance: 1.0)),
        "Poke": (element_type: Normal, max_uses: 10, effect: FixedDamage(amount: 5, hit_chance: 1.0)),
        "Growl": (
            element_type: Normal,
            max_uses: 40,
            effect: StatModifier(target: Target, modifier: (attack: -5), rounds: 3),
        ),
        "Harden": (
            element_type: Normal,
            max_uses: 30,
            effect: StatModifier(target: User, modifier: (defense: 10, max_health: 5), rounds: 1),
        ),
        "Shrink": (
            element_type: Normal,
            max_uses: 10,
            effect: StatModifier(target: Target, modifier: (max_health: -10), rounds: 2),
        ),
        "Wither": (
            element_type: Water,
            max_uses: 5,
            effect: StatModifier(target: Target, modifier: (max_health: -100), rounds: 1),
        ),
        "Recover": (element_type: Normal, max_uses: 10, effect: Heal(amount: 20)),
        "Splash": (element_type: Water, max_uses: 40, effect: NoEffect),
    },
    items: {
        "Potion": Food(health_restored: 20),
        "Poke Ball": Pokeball(catch_chance: 0.5),
        "Master Ball": Pokeball(catch_chance: 1.0),
    },
    trainers: {
        "Ash": (
            roster: [(species: "Pikachu", level: 5), (species: "Squirtle", level: 5)],
            inventory: {"Poke Ball": 5, "Potion": 2},
        ),
        "Brock": (
            roster: [(species: "Onix", level: 8, moves: Some(["Tackle"]))],
        ),
    },
)"#;

pub fn test_data() -> DataTable {
    match DataTable::from_ron_str(TEST_DATA) {
        Ok(data) => data,
        Err(err) => panic!("Failed to load test data: {}", err),
    }
}

/// A builder for creating test Pokemon instances with common defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new("Pikachu", 25)
///     .with_moves(vec!["Tackle"])
///     .with_hp(10)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    species: String,
    level: u8,
    moves: Option<Vec<String>>,
    current_hp: Option<u16>,
}

impl TestPokemonBuilder {
    /// Creates a new builder for a given species and level.
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            moves: None,
            current_hp: None,
        }
    }

    /// Sets the moves for the test Pokemon. Defaults to the species' moves.
    pub fn with_moves(mut self, moves: Vec<&str>) -> Self {
        self.moves = Some(moves.into_iter().map(str::to_string).collect());
        self
    }

    /// Sets the current HP for the test Pokemon. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn build(self) -> PokemonInst {
        let data = test_data();
        let species_data = match data.species(&self.species) {
            Some(species_data) => species_data,
            None => panic!("Unknown test species {}", self.species),
        };

        let move_names = self.moves.unwrap_or_else(|| species_data.moves.clone());
        let moves = move_names
            .iter()
            .map(|name| match data.move_data(name) {
                Some(move_data) => move_data,
                None => panic!("Unknown test move {}", name),
            })
            .collect();

        let mut pokemon = PokemonInst::new(species_data, self.level, moves, None);
        if let Some(hp) = self.current_hp {
            pokemon.set_hp(hp);
        }
        pokemon
    }
}

pub fn create_test_player(name: &str, team: Vec<PokemonInst>) -> Trainer {
    Trainer::new(name, team)
}

/// Creates a standard 1v1 battle state for testing.
pub fn create_test_battle(p1_pokemon: PokemonInst, p2_pokemon: PokemonInst) -> BattleState {
    BattleState::new(
        create_test_player("Player 1", vec![p1_pokemon]),
        create_test_player("Player 2", vec![p2_pokemon]),
    )
}

/// A seeded `Battle` over the test data table.
pub fn create_test_runner(player1: Trainer, player2: Trainer) -> Battle {
    match Battle::new(
        Arc::new(test_data()),
        player1,
        player2,
        &BattleConfig::trainer().with_seed(42),
    ) {
        Ok(battle) => battle,
        Err(err) => panic!("Failed to start test battle: {}", err),
    }
}

/// Outcomes of 50 pass every check with a chance of at least 0.5.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 100])
}
