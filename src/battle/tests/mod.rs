#[cfg(test)]
pub mod common;






#[cfg(test)]
mod test_stat_modifiers;


#[cfg(test)]
mod test_runner;
