use anyhow::{bail, Context, Result};
use pokemon_battle::{
    create_pokemon, create_trainer, get_trainer_names, Battle, BattleConfig, Behavior, DataTable,
    DataTableExt, PlayerAction, ScoringAI, TeamRocket,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "Usage: pokemon-battle [--data <path>] [--config <path>] [--player <trainer>] \
[--opponent <trainer> | --wild <species> [--level <n>]] [--seed <n>] [--auto] [--json] [-v]";

/// Auto battles stop here if neither side can finish the other.
const MAX_AUTO_TURNS: u32 = 500;

struct Args {
    data: PathBuf,
    config: Option<PathBuf>,
    player: String,
    opponent: Option<String>,
    wild: Option<String>,
    level: u8,
    seed: Option<u64>,
    auto: bool,
    json: bool,
    verbose: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        data: PathBuf::from("data/pokedex.ron"),
        config: None,
        player: "Ash".to_string(),
        opponent: None,
        wild: None,
        level: 5,
        seed: None,
        auto: false,
        json: false,
        verbose: false,
    };

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = |name: &str| {
            it.next()
                .with_context(|| format!("{} needs a value\n{}", name, USAGE))
        };
        match arg.as_str() {
            "--data" => args.data = PathBuf::from(value("--data")?),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            "--player" => args.player = value("--player")?,
            "--opponent" => args.opponent = Some(value("--opponent")?),
            "--wild" => args.wild = Some(value("--wild")?),
            "--level" => {
                args.level = value("--level")?
                    .parse()
                    .context("--level must be a number between 1 and 100")?
            }
            "--seed" => args.seed = Some(value("--seed")?.parse().context("--seed must be a number")?),
            "--auto" => args.auto = true,
            "--json" => args.json = true,
            "-v" | "--verbose" => args.verbose = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("unknown argument '{}'\n{}", other, USAGE),
        }
    }

    if args.opponent.is_some() && args.wild.is_some() {
        bail!("--opponent and --wild cannot be combined\n{}", USAGE);
    }
    Ok(args)
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing_core::Level::DEBUG
    } else {
        tracing_core::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn describe_action(battle: &Battle, player_index: usize, action: &PlayerAction) -> String {
    let trainer = &battle.battle_state().players[player_index];
    match action {
        PlayerAction::UseMove { move_index } => trainer
            .active_pokemon()
            .and_then(|pokemon| pokemon.get_move(*move_index))
            .map(|m| format!("{} ({}/{})", m.name, m.uses, m.max_uses))
            .unwrap_or_else(|| action.to_string()),
        PlayerAction::SwitchPokemon { team_index } => trainer
            .team
            .get(*team_index)
            .map(|p| {
                format!(
                    "Switch to {} (Lv. {}, {}/{} HP)",
                    p.name,
                    p.level,
                    p.current_hp(),
                    p.max_hp()
                )
            })
            .unwrap_or_else(|| action.to_string()),
        PlayerAction::UseItem { item } => format!("Use {} (x{})", item, trainer.item_count(item)),
        PlayerAction::Flee => "Run".to_string(),
    }
}

fn print_status(battle: &Battle) {
    for (index, trainer) in battle.get_state().trainers.iter().enumerate() {
        let name = battle.battle_state().display_name(index);
        match trainer.team.get(trainer.active_index) {
            Some(active) => println!(
                "  {}: {} Lv. {} [{}/{} HP]",
                name, active.name, active.level, active.current_hp, active.max_hp
            ),
            None => println!("  {}: no Pokemon", name),
        }
    }
}

fn prompt_action(battle: &Battle, input: &mut impl BufRead) -> Result<PlayerAction> {
    let actions = battle.valid_actions(0);
    if actions.is_empty() {
        bail!("no valid actions are available");
    }

    print_status(battle);
    for (number, action) in actions.iter().enumerate() {
        println!("  {}) {}", number + 1, describe_action(battle, 0, action));
    }

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=actions.len()).contains(&choice) => {
                return Ok(actions[choice - 1].clone())
            }
            _ => println!("Pick a number between 1 and {}.", actions.len()),
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;
    init_logging(args.verbose);

    let data = DataTable::load(&args.data)
        .with_context(|| format!("failed to load data from {}", args.data.display()))?;
    let data = Arc::new(data);

    let mut config = match &args.config {
        Some(path) => BattleConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => BattleConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let trainers_available = || format!("trainers available: {}", get_trainer_names(&data).join(", "));

    let (mut battle, opponent_ai): (Battle, Box<dyn Behavior>) = match &args.wild {
        Some(species) => {
            let player = create_trainer(&data, &args.player).with_context(trainers_available)?;
            let wild = create_pokemon(&data, species, args.level)?;
            println!("A wild {} appeared!", wild.name);
            let battle = Battle::encounter(Arc::clone(&data), player, wild, &config)?;
            (battle, Box::new(ScoringAI::new()))
        }
        None => {
            let opponent_name = args.opponent.as_deref().unwrap_or("Brock");
            let ai: Box<dyn Behavior> = if opponent_name.contains("Rocket") {
                Box::new(TeamRocket)
            } else {
                Box::new(ScoringAI::new())
            };
            let battle = Battle::between(Arc::clone(&data), &args.player, opponent_name, &config)
                .with_context(trainers_available)?;
            println!("{} challenges {}!", opponent_name, args.player);
            (battle, ai)
        }
    };

    let player_ai = ScoringAI::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    while !battle.is_battle_ended() {
        if args.auto && battle.battle_state().turn_number > MAX_AUTO_TURNS {
            log::warn!("Stopping after {} turns without a result", MAX_AUTO_TURNS);
            break;
        }

        for player_index in battle.players_needing_actions() {
            let action = if player_index == 0 && !args.auto {
                prompt_action(&battle, &mut input)?
            } else if player_index == 0 {
                player_ai.decide_action(0, battle.battle_state(), battle.data())
            } else {
                opponent_ai.decide_action(1, battle.battle_state(), battle.data())
            };
            battle
                .submit_action(player_index, action)
                .with_context(|| format!("player {} chose an invalid action", player_index + 1))?;
        }

        let result = battle.resolve_turn()?;
        for message in &result.messages {
            println!("{}", message);
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&battle.get_state())?);
    }

    let [trainer, _] = battle.into_trainers();
    let roster: Vec<String> = trainer
        .team
        .iter()
        .map(|p| format!("{} (Lv. {})", p.name, p.level))
        .collect();
    println!("{}'s team: {}", trainer.name, roster.join(", "));

    Ok(())
}
