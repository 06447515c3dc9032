#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod NuclearNetwork;
pub mod settings;
