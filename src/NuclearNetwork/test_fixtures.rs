//! Synthetic nuclear data table for tests.
//!
//! The binding energies are the real ones, the partition functions and the rate
//! polynomials are SYNTHETIC: non-resonant charged-particle rows
//! `c0 - 4.2487 (Z1^2 Z2^2 mu)^(1/3) T9^(-1/3) - 2/3 ln T9` with small higher terms.
//! They have realistic magnitudes but are not fitted to any measured rate.
use super::isotopes::*;
use super::nuclear_data::NuclearData;
use super::reaction_table::REACTIONS;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// binding energies, MeV
pub const BINDING_ENERGIES: [f64; NISO] = [
    28.296, 92.162, 127.619, 160.645, 198.257, 236.537, 271.781, 306.716, 342.052, 375.475,
    411.462, 447.697, 483.988,
];

/// triple alpha row as written in the table (before the ln 6 correction)
pub const TRIPLE_ALPHA_ROW: [f64; 7] = [-11.0, -4.4, 0.0, 0.0, 0.0, 0.0, -3.0];

fn element(k: usize) -> String {
    SPECIES_NAMES[k]
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .to_lowercase()
}

/// (projectile, target) isotopes of a two-body bank row
pub fn entrance_pair(row: usize) -> (usize, usize) {
    for reaction in REACTIONS.iter() {
        if reaction.channels.contains(&row) {
            return match reaction.reactants {
                [(k, 2)] => (*k, *k),
                [(k1, _), (k2, _)] => (*k1, *k2),
                _ => unreachable!("row {} is not a two-body channel", row),
            };
        }
    }
    unreachable!("row {} belongs to no reaction", row)
}

/// synthetic polynomial of a two-body bank row as written in the table
pub fn pair_row(row: usize) -> [f64; 7] {
    let (x, i) = entrance_pair(row);
    let mu = A_ISO[x] * A_ISO[i] / (A_ISO[x] + A_ISO[i]);
    let c2 = -4.2487 * (Z_ISO[x].powi(2) * Z_ISO[i].powi(2) * mu).powf(1.0 / 3.0);
    let c0 = 25.0 - 0.3 * (row % 3) as f64;
    [c0, 0.0, c2, 0.1, -0.01, 0.001, -2.0 / 3.0]
}

/// partition function parameters (g0, a, b, c)
pub fn partition_row(k: usize) -> [f64; 4] {
    if k == I_HE {
        [1.0, -20.0, 0.0, 0.0]
    } else {
        [1.0, -5.0 - k as f64, 1.0, 0.01 * k as f64]
    }
}

/// text of the synthetic table in the fixed-column layout
pub fn synthetic_table() -> String {
    let mut out = String::new();
    for k in 0..NISO {
        let label = format!("{}{}", element(k), A_ISO[k] as u32);
        let extra = if k == 0 { " 13" } else { "" };
        let [g0, a, b, c] = partition_row(k);
        out.push_str(&format!(
            "{}{} {} {} {} {} {} {}\n",
            label, extra, Z_ISO[k], BINDING_ENERGIES[k], g0, a, b, c
        ));
    }
    for c in TRIPLE_ALPHA_ROW.iter().take(6) {
        out.push_str(&format!("{:>13.6e}", c));
    }
    out.push('\n');
    out.push_str(&format!("{:>13.6e}\n", TRIPLE_ALPHA_ROW[6]));
    for row in 1..NALP {
        let (x, i) = entrance_pair(row);
        let coeffs = pair_row(row);
        let mut first = format!(
            " {:<2}{:>2} {:<2}{:>2}{:10}",
            element(x),
            A_ISO[x] as u32,
            element(i),
            A_ISO[i] as u32,
            ""
        );
        for c in coeffs.iter().take(4) {
            first.push_str(&format!("{:>14.6e}", c));
        }
        let mut second = " ".repeat(20);
        for c in coeffs.iter().skip(4) {
            second.push_str(&format!("{:>14.6e}", c));
        }
        out.push_str(&first);
        out.push('\n');
        out.push_str(&second);
        out.push('\n');
    }
    out
}

/// the synthetic table written to a temporary file
pub fn synthetic_table_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(synthetic_table().as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn synthetic_data() -> Arc<NuclearData> {
    Arc::new(synthetic_table().parse::<NuclearData>().unwrap())
}
