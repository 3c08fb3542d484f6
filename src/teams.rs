use crate::data::DataTableExt;
use crate::errors::{DataError, DataResult};
use crate::player::Trainer;
use crate::pokemon::PokemonInst;
use schema::{DataTable, PokemonTemplate, MAXIMUM_MOVE_SLOTS};

/// Create a Pokemon from a template, using either the listed moves or the species' defaults
pub fn create_pokemon_from_template(
    data: &DataTable,
    template: &PokemonTemplate,
) -> DataResult<PokemonInst> {
    let species_data = data.require_species(&template.species)?;

    let move_names = template.moves.as_ref().unwrap_or(&species_data.moves);
    if move_names.len() > MAXIMUM_MOVE_SLOTS {
        return Err(DataError::InvalidEntry {
            name: template.species.clone(),
            reason: format!("knows {} moves", move_names.len()),
        });
    }
    let moves = move_names
        .iter()
        .map(|name| data.require_move(name))
        .collect::<DataResult<Vec<_>>>()?;

    Ok(PokemonInst::new(
        species_data,
        template.level,
        moves,
        template.nickname.clone(),
    ))
}

/// Create a Pokemon of `species` at `level` with its default moves.
pub fn create_pokemon(data: &DataTable, species: &str, level: u8) -> DataResult<PokemonInst> {
    create_pokemon_from_template(
        data,
        &PokemonTemplate {
            species: species.to_string(),
            level,
            moves: None,
            nickname: None,
        },
    )
}

/// Build the named trainer, with roster and inventory, from the data table.
pub fn create_trainer(data: &DataTable, name: &str) -> DataResult<Trainer> {
    let template = data.require_trainer(name)?;
    let team = template
        .roster
        .iter()
        .map(|pokemon| create_pokemon_from_template(data, pokemon))
        .collect::<DataResult<Vec<_>>>()?;

    Ok(Trainer::new(name, team).with_inventory(template.inventory.clone()))
}

/// Get the names of all trainers in the data table.
pub fn get_trainer_names(data: &DataTable) -> Vec<&str> {
    data.trainers.keys().map(String::as_str).collect()
}
