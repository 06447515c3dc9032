/// eng
/// Canonical list of the 13 isotopes of the alpha chain (4He ... 56Ni), their mass and charge
/// numbers and the index constants used by all other modules.
pub mod isotopes;
/// eng
/// Reader of the fixed-format nuclear data table: binding energies, partition functions,
/// the 38-row rate polynomial bank; derives screening and reverse-rate constants.
/// Any malformed record is a fatal error.
pub mod nuclear_data;
/// Declarative table of the 18 reactions: reactants, products, compound nucleus,
/// polynomial rows and identical-particle weight.
pub mod reaction_table;
/// eng
/// Screened forward rates and reverse coefficients of all reactions at given density and temperature.
pub mod rates;
/// Rates of change of mole fractions, energy generation and the analytic Jacobian.
pub mod rates_of_change;
/// eng
/// Coupling to a hydrodynamics host and an ODE harness: unit conversion, temperature from
/// the internal energy, abundance flooring, cold-cell cutoff, energy source term.
pub mod network_driver;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod rates_of_change_tests;
