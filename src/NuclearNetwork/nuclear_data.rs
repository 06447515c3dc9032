//! # Nuclear Data Table
//!
//! ## Purpose
//! Reads the fixed-format nuclear data table of the alpha-chain network once and turns it
//! into an immutable [`NuclearData`] bundle. The bundle is shared read-only (`Arc`) by every
//! rate calculator, so no process-wide mutable tables exist.
//!
//! ## Table layout
//! 1. 13 isotope records, whitespace-delimited: `label Z Q g0 a b c`. The first record has
//!    one extra token after the label (record count in the reference tables) which is skipped.
//! 2. Triple-alpha bootstrap: six 13-character fields (c0..c5), then one line with c6 in its
//!    first 13-character field. `c0 -= ln 6` for three identical particles.
//! 3. 37 paired records of two-body `a(x,y)b` channels (bank rows 1..37):
//!    ```text
//!    col  1..3  projectile name    col  3..5  projectile mass
//!    col  6..8  target name        col  8..10 target mass
//!    col 20..   4 coefficients (c0..c3), 14 characters each
//!    next line: col 20.. 3 coefficients (c4..c6), 14 characters each
//!    ```
//!    Identical projectile and target: `c0 -= ln 2`.
//!
//! Any deviation from this layout is fatal: a half-read table is never returned.
//!
//! ## Derived constants
//! Reverse-rate constants are not read from the file but follow from detailed balance:
//! ```text
//! cb = Σ Q(reactants) - Σ Q(products)                                   [MeV]
//! ca = (n_r - n_p) ln(9.867425e9) + 1.5 ln( Π A(reactants) / Π A(products) )
//! ```
//! Screening coefficients are `0.2275e-3 Z^(5/3)`.
use super::isotopes::*;
use super::reaction_table::REACTIONS;
use log::{error, info, warn};
use prettytable::{Cell, Row, Table};
use std::fs;
use std::str::FromStr;
use thiserror::Error;

/// Column layout of the fixed-width part of the table. Offsets are 0-based byte columns,
/// pairs are (offset, width).
pub mod schema {
    /// tokens between the label and Z in the first isotope record
    pub const FIRST_ISOTOPE_EXTRA_TOKENS: usize = 1;
    /// fields per isotope record after the label: Z Q g0 a b c
    pub const ISOTOPE_FIELDS: usize = 6;
    /// width of the triple-alpha bootstrap fields
    pub const BOOTSTRAP_WIDTH: usize = 13;
    /// coefficients on the first bootstrap line
    pub const BOOTSTRAP_FIRST_LINE_FIELDS: usize = 6;
    pub const PROJECTILE_NAME: (usize, usize) = (1, 2);
    pub const PROJECTILE_MASS: (usize, usize) = (3, 2);
    pub const TARGET_NAME: (usize, usize) = (6, 2);
    pub const TARGET_MASS: (usize, usize) = (8, 2);
    /// first column of the coefficient fields of a paired record
    pub const COEFF_OFFSET: usize = 20;
    pub const COEFF_WIDTH: usize = 14;
    pub const FIRST_LINE_COEFFS: usize = 4;
    pub const SECOND_LINE_COEFFS: usize = 3;
}

/// 1 MeV/(k_B * 1e9 K)
pub const T9_PER_MEV: f64 = 11.605;
/// statistical factor of the reverse constants per unbalanced particle
pub const REVERSE_CONV: f64 = 9.867425e9;
/// MeV per nucleon -> erg/g
pub const MEV_TO_ERG_PER_GRAM: f64 = 9.64867e17;
/// prefactor of the screening coefficient Z^(5/3)
pub const SCREENING_PREFACTOR: f64 = 0.2275e-3;

/// total number of non-empty lines of a valid table
pub const TABLE_LINES: usize = NISO + 2 + 2 * (NALP - 1);

#[derive(Debug, Error)]
pub enum NuclearDataError {
    #[error("unable to open nuclear data table '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("nuclear data table has {found} lines, expected {expected}")]
    RecordCount { expected: usize, found: usize },
    #[error("line {line}: expected at least {expected} fields, found {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: columns {start}..{end} are not wholly inside the line")]
    FieldOutOfLine { line: usize, start: usize, end: usize },
    #[error("line {line}: cannot read '{field}' as a number")]
    InvalidNumber { line: usize, field: String },
    #[error("line {line}: isotope '{label}' found where {expected} was expected")]
    IsotopeOrder {
        line: usize,
        label: String,
        expected: &'static str,
    },
}

/// one isotope record of the table
#[derive(Debug, Clone, PartialEq)]
pub struct IsotopeRecord {
    pub label: String,
    /// atomic number
    pub z: f64,
    /// binding energy, MeV
    pub q: f64,
    /// pre-exponential factor of the partition function
    pub g0: f64,
    /// term of the partition function exponent divided by T9
    pub a: f64,
    /// constant term of the partition function exponent
    pub b: f64,
    /// term of the partition function exponent multiplied by T9
    pub c: f64,
}

/// Immutable nuclear and reaction constants of the network.
#[derive(Debug, Clone, PartialEq)]
pub struct NuclearData {
    pub isotopes: Vec<IsotopeRecord>,
    /// binding energies, MeV
    pub q: [f64; NISO],
    pub g0: [f64; NISO],
    pub apf: [f64; NISO],
    pub bpf: [f64; NISO],
    pub cpf: [f64; NISO],
    /// screening coefficients
    pub gscr: [f64; NISO],
    /// rate polynomial bank, identical-particle corrections already applied
    pub calp: [[f64; 7]; NALP],
    /// constant term of the reverse rate exponent
    pub ca: [f64; NREAC],
    /// reaction energy, MeV; multiplied by 11.605/T9 in the reverse rate exponent
    pub cb: [f64; NREAC],
}

impl NuclearData {
    /// Assemble the bundle from already decoded records and derive reverse and screening constants.
    pub fn from_parts(isotopes: [IsotopeRecord; NISO], calp: [[f64; 7]; NALP]) -> Self {
        let mut q = [0.0; NISO];
        let mut g0 = [0.0; NISO];
        let mut apf = [0.0; NISO];
        let mut bpf = [0.0; NISO];
        let mut cpf = [0.0; NISO];
        let mut gscr = [0.0; NISO];
        for (k, iso) in isotopes.iter().enumerate() {
            q[k] = iso.q;
            g0[k] = iso.g0;
            apf[k] = iso.a;
            bpf[k] = iso.b;
            cpf[k] = iso.c;
            gscr[k] = SCREENING_PREFACTOR * iso.z.powf(5.0 / 3.0);
        }
        let (ca, cb) = reverse_constants(&q);
        Self {
            isotopes: isotopes.to_vec(),
            q,
            g0,
            apf,
            bpf,
            cpf,
            gscr,
            calp,
            ca,
            cb,
        }
    }

    /// Reads and decodes the table. Every failure is fatal and reported.
    pub fn from_file(path: &str) -> Result<Self, NuclearDataError> {
        let content = fs::read_to_string(path).map_err(|source| {
            error!("Unable to open nuclear data table '{}': {}", path, source);
            NuclearDataError::Io {
                path: path.to_string(),
                source,
            }
        })?;
        let data = content.parse::<NuclearData>().inspect_err(|e| {
            error!("Nuclear data table '{}' is malformed: {}", path, e);
        })?;
        info!("Nuclear data table loaded from '{}'", path);
        Ok(data)
    }

    /// binding energies in MeV, indexed like [`SPECIES_NAMES`]
    pub fn binding_energies(&self) -> &[f64; NISO] {
        &self.q
    }

    /// prints the isotope part of the table
    pub fn pretty_print(&self) {
        let mut table = Table::new();
        let header = ["isotope", "Z", "Q, MeV", "g0", "a", "b", "c", "screening"];
        table.add_row(Row::new(header.iter().map(|h| Cell::new(h)).collect()));
        for (k, iso) in self.isotopes.iter().enumerate() {
            table.add_row(Row::new(vec![
                Cell::new(SPECIES_NAMES[k]),
                Cell::new(&iso.z.to_string()),
                Cell::new(&iso.q.to_string()),
                Cell::new(&iso.g0.to_string()),
                Cell::new(&iso.a.to_string()),
                Cell::new(&iso.b.to_string()),
                Cell::new(&iso.c.to_string()),
                Cell::new(&format!("{:.4e}", self.gscr[k])),
            ]));
        }
        table.printstd();
    }
}

impl FromStr for NuclearData {
    type Err = NuclearDataError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut lines: Vec<&str> = content.lines().collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.len() != TABLE_LINES {
            return Err(NuclearDataError::RecordCount {
                expected: TABLE_LINES,
                found: lines.len(),
            });
        }

        let mut isotopes = Vec::with_capacity(NISO);
        for (k, line) in lines[..NISO].iter().enumerate() {
            isotopes.push(parse_isotope_record(line, k)?);
        }

        let mut calp = [[0.0; 7]; NALP];
        // 3He ==> C
        let first = NISO;
        for l in 0..schema::BOOTSTRAP_FIRST_LINE_FIELDS {
            let start = l * schema::BOOTSTRAP_WIDTH;
            calp[0][l] = fixed_number(lines[first], first + 1, start, schema::BOOTSTRAP_WIDTH)?;
        }
        calp[0][6] = fixed_number(lines[first + 1], first + 2, 0, schema::BOOTSTRAP_WIDTH)?;
        calp[0][0] -= 6.0_f64.ln();

        // a(x,y)b reactions
        for m in 1..NALP {
            let i1 = first + 2 + 2 * (m - 1);
            let i2 = i1 + 1;
            let (l1, l2) = (lines[i1], lines[i2]);
            let (n1, n2) = (i1 + 1, i2 + 1);
            let name_x = fixed_field(l1, n1, schema::PROJECTILE_NAME.0, schema::PROJECTILE_NAME.1)?;
            let a_x = fixed_mass(l1, n1, schema::PROJECTILE_MASS)?;
            let name_i = fixed_field(l1, n1, schema::TARGET_NAME.0, schema::TARGET_NAME.1)?;
            let a_i = fixed_mass(l1, n1, schema::TARGET_MASS)?;
            for l in 0..schema::FIRST_LINE_COEFFS {
                let start = schema::COEFF_OFFSET + l * schema::COEFF_WIDTH;
                calp[m][l] = fixed_number(l1, n1, start, schema::COEFF_WIDTH)?;
            }
            for l in 0..schema::SECOND_LINE_COEFFS {
                let start = schema::COEFF_OFFSET + l * schema::COEFF_WIDTH;
                calp[m][schema::FIRST_LINE_COEFFS + l] =
                    fixed_number(l2, n2, start, schema::COEFF_WIDTH)?;
            }
            if a_x == a_i && name_x.trim() == name_i.trim() {
                calp[m][0] -= 2.0_f64.ln();
            }
        }

        let isotopes: [IsotopeRecord; NISO] =
            isotopes
                .try_into()
                .map_err(|v: Vec<IsotopeRecord>| NuclearDataError::RecordCount {
                    expected: NISO,
                    found: v.len(),
                })?;
        Ok(NuclearData::from_parts(isotopes, calp))
    }
}

/// reverse rate constants of all reactions from binding energies and mass numbers
fn reverse_constants(q: &[f64; NISO]) -> ([f64; NREAC], [f64; NREAC]) {
    let mut ca = [0.0; NREAC];
    let mut cb = [0.0; NREAC];
    for (i, reaction) in REACTIONS.iter().enumerate() {
        let mass_product = |channel: &[(usize, u32)]| -> f64 {
            channel
                .iter()
                .map(|(k, m)| A_ISO[*k].powi(*m as i32))
                .product()
        };
        let binding = |channel: &[(usize, u32)]| -> f64 {
            channel.iter().map(|(k, m)| *m as f64 * q[*k]).sum()
        };
        let unbalanced = (reaction.reactant_count() - reaction.product_count()) as f64;
        ca[i] = unbalanced * REVERSE_CONV.ln()
            + 1.5 * (mass_product(reaction.reactants) / mass_product(reaction.products)).ln();
        cb[i] = binding(reaction.reactants) - binding(reaction.products);
    }
    (ca, cb)
}

fn parse_isotope_record(line: &str, k: usize) -> Result<IsotopeRecord, NuclearDataError> {
    let line_no = k + 1;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let offset = if k == 0 {
        1 + schema::FIRST_ISOTOPE_EXTRA_TOKENS
    } else {
        1
    };
    let expected = offset + schema::ISOTOPE_FIELDS;
    if tokens.len() < expected {
        return Err(NuclearDataError::MissingField {
            line: line_no,
            expected,
            found: tokens.len(),
        });
    }
    let label = tokens[0];
    let resolved = species_index(label).or_else(|| index_from_table_label(label));
    match resolved {
        Some(idx) if idx != k => {
            return Err(NuclearDataError::IsotopeOrder {
                line: line_no,
                label: label.to_string(),
                expected: SPECIES_NAMES[k],
            });
        }
        None => warn!(
            "line {}: unrecognised isotope label '{}', assuming {}",
            line_no, label, SPECIES_NAMES[k]
        ),
        _ => {}
    }
    let mut values = [0.0; schema::ISOTOPE_FIELDS];
    for (l, v) in values.iter_mut().enumerate() {
        *v = parse_number(tokens[offset + l], line_no)?;
    }
    Ok(IsotopeRecord {
        label: label.to_string(),
        z: values[0],
        q: values[1],
        g0: values[2],
        a: values[3],
        b: values[4],
        c: values[5],
    })
}

/// Fixed-width field. The last field of a line may be cut short by the end of the line,
/// but it must start inside the line.
fn fixed_field(line: &str, line_no: usize, start: usize, width: usize) -> Result<&str, NuclearDataError> {
    let end = start + width;
    let out_of_line = NuclearDataError::FieldOutOfLine {
        line: line_no,
        start,
        end,
    };
    // a field cut short by the end of the line is as corrupt as a missing one
    if end > line.len() {
        return Err(out_of_line);
    }
    line.get(start..end).ok_or(out_of_line)
}

fn fixed_number(line: &str, line_no: usize, start: usize, width: usize) -> Result<f64, NuclearDataError> {
    parse_number(fixed_field(line, line_no, start, width)?, line_no)
}

fn fixed_mass(line: &str, line_no: usize, field: (usize, usize)) -> Result<u32, NuclearDataError> {
    let raw = fixed_field(line, line_no, field.0, field.1)?;
    raw.trim()
        .parse::<u32>()
        .map_err(|_| NuclearDataError::InvalidNumber {
            line: line_no,
            field: raw.to_string(),
        })
}

/// Fortran-style `D` exponents are accepted
fn parse_number(raw: &str, line_no: usize) -> Result<f64, NuclearDataError> {
    let cleaned = raw.trim().replace(['D', 'd'], "E");
    cleaned
        .parse::<f64>()
        .map_err(|_| NuclearDataError::InvalidNumber {
            line: line_no,
            field: raw.to_string(),
        })
}
