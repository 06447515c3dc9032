//! Canonical isotope list of the alpha-chain network.
//!
//! The index of an isotope in [`SPECIES_NAMES`] is used everywhere in the crate:
//! in the nuclear data table, in the reaction table, in the state vector and in
//! the Jacobian. Index 0 (4He) takes part in every reaction of the chain.

/// number of isotopes
pub const NISO: usize = 13;
/// number of equations: isotopes + energy
pub const NEQN: usize = 14;
/// number of reactions
pub const NREAC: usize = 18;
/// number of rows in the rate polynomial bank
pub const NALP: usize = 38;
/// index of the energy component of the state vector
pub const IENERGY: usize = NEQN - 1;

/// list of species names, used in output and as labels of the nuclear data table
pub const SPECIES_NAMES: [&str; NISO] = [
    "4He", "12C", "16O", "20Ne", "24Mg", "28Si", "32S", "36Ar", "40Ca", "44Ti", "48Cr", "52Fe",
    "56Ni",
];

/// atomic mass numbers
pub const A_ISO: [f64; NISO] = [
    4.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0, 36.0, 40.0, 44.0, 48.0, 52.0, 56.0,
];
/// atomic numbers
pub const Z_ISO: [f64; NISO] = [
    2.0, 6.0, 8.0, 10.0, 12.0, 14.0, 16.0, 18.0, 20.0, 22.0, 24.0, 26.0, 28.0,
];

pub const I_HE: usize = 0;
pub const I_C: usize = 1;
pub const I_O: usize = 2;
pub const I_NE: usize = 3;
pub const I_MG: usize = 4;
pub const I_SI: usize = 5;
pub const I_S: usize = 6;
pub const I_AR: usize = 7;
pub const I_CA: usize = 8;
pub const I_TI: usize = 9;
pub const I_CR: usize = 10;
pub const I_FE: usize = 11;
pub const I_NI: usize = 12;

/// index of a species by its canonical name, e.g. "16O" -> 2
pub fn species_index(name: &str) -> Option<usize> {
    SPECIES_NAMES.iter().position(|s| *s == name)
}

/// Nuclear data tables write labels in lower case with the element first
/// ("he4", "c12", "ni56"). Returns the canonical index for such a label.
pub fn index_from_table_label(label: &str) -> Option<usize> {
    let label = label.trim().to_lowercase();
    let element: String = label.chars().take_while(|c| c.is_alphabetic()).collect();
    let mass: String = label.chars().skip_while(|c| c.is_alphabetic()).collect();
    if element.is_empty() || mass.is_empty() {
        return None;
    }
    SPECIES_NAMES.iter().position(|s| {
        let s = s.to_lowercase();
        let s_mass: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        let s_element: String = s.chars().skip_while(|c| c.is_ascii_digit()).collect();
        s_mass == mass && s_element == element
    })
}
