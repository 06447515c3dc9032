//! # Network Driver
//!
//! ## Purpose
//! Connects the alpha-chain network to a hydrodynamics host and an ODE integrator.
//!
//! ## Main Structures
//! - [`HydroHost`]: what the host supplies per cell (density, density floor, γ, EOS kind)
//! - [`ChemNetwork`]: what an ODE harness needs from a network (names, per-cell setup,
//!   right-hand side, energy source term)
//! - [`AlphaNetwork`]: the 13-isotope network; converts code units, derives the temperature
//!   from the internal energy density and evaluates rates
//! - [`GridHost`]: a simple host holding a density field on a (k, j, i) grid
//!
//! ## Units
//! The state vector holds mole fractions; `ed` is the internal energy density in code units.
//! ```text
//! ED_cgs = ed * unit_energy_density_in_cgs
//! T      = ED_cgs (γ - 1) m_n / (ρ k_B)
//! ydot   = unit_time_in_s * f(y)
//! Edot   = 9.64867e17 Σ Q_k f_k ρ * unit_time_in_s / unit_energy_density_in_cgs
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let mut network = AlphaNetwork::from_config(NetworkConfig::default())?;
//! let host = GridHost::uniform(1.0e7, 1.0e-10, 5.0 / 3.0, true);
//! network.initialize_next_step(&host, CellIndex::new(0, 0, 0))?;
//! let ydot = network.rhs(0.0, &y, ed);
//! ```
use super::isotopes::*;
use super::nuclear_data::{NuclearData, NuclearDataError};
use super::rates::{RateCalculator, ReactionRates};
use super::rates_of_change::{energy_generation, partial_derivatives, rates_of_change};
use crate::settings::NetworkConfig;
use log::{debug, info, warn};
use nalgebra::{SMatrix, SVector};
use std::sync::Arc;
use thiserror::Error;

/// neutron mass, g
pub const NEUTRON_MASS: f64 = 1.674920e-24;
/// Boltzmann constant, erg/K
pub const BOLTZMANN: f64 = 1.380658e-16;
/// below this temperature (K) the network is not integrated
pub const T_COLD: f64 = 2.0e8;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("invalid network configuration: {0}")]
    Config(String),
    #[error(transparent)]
    NuclearData(#[from] NuclearDataError),
    #[error("unable to parse network configuration: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// position of a cell in the host's mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub k: usize,
    pub j: usize,
    pub i: usize,
}

impl CellIndex {
    pub fn new(k: usize, j: usize, i: usize) -> Self {
        Self { k, j, i }
    }
}

/// Per-cell context supplied by the hydrodynamics host, in code units.
pub trait HydroHost {
    fn density(&self, cell: CellIndex) -> f64;
    fn density_floor(&self) -> f64;
    /// adiabatic index
    fn gamma(&self) -> f64;
    /// false for an isothermal equation of state
    fn non_barotropic(&self) -> bool;
}

/// Capability set an ODE harness relies on.
pub trait ChemNetwork {
    fn species_names(&self) -> &'static [&'static str; NISO];
    /// caches the per-cell quantities used by every later evaluation in this cell
    fn initialize_next_step(
        &mut self,
        host: &dyn HydroHost,
        cell: CellIndex,
    ) -> Result<(), NetworkError>;
    /// d y / dt in code time units
    fn rhs(&self, t: f64, y: &[f64; NISO], ed: f64) -> [f64; NISO];
    /// d ED / dt in code units
    fn edot(&self, t: f64, y: &[f64; NISO], ed: f64) -> f64;
}

/// The 13-isotope alpha-chain network.
///
/// Until [`ChemNetwork::initialize_next_step`] is called the network describes a cell of one
/// code density unit with γ = 5/3 and a non-barotropic EOS.
#[derive(Debug, Clone)]
pub struct AlphaNetwork {
    config: NetworkConfig,
    calculator: RateCalculator,
    /// g/cm^3
    rho: f64,
    gamma: f64,
    non_barotropic: bool,
}

impl AlphaNetwork {
    pub fn new(config: NetworkConfig, data: Arc<NuclearData>) -> Result<Self, NetworkError> {
        config.validate()?;
        info!(
            "Alpha network: {} isotopes, fuel {}, unit time {} s",
            NISO,
            SPECIES_NAMES[config.niso_fuel],
            config.unit_time_in_s()
        );
        let rho = config.unit_density;
        Ok(Self {
            config,
            calculator: RateCalculator::new(data),
            rho,
            gamma: 5.0 / 3.0,
            non_barotropic: true,
        })
    }

    /// Loads the nuclear data table named in the configuration.
    pub fn from_config(config: NetworkConfig) -> Result<Self, NetworkError> {
        config.validate()?;
        let data = NuclearData::from_file(&config.nuclear_data_path)?;
        Self::new(config, Arc::new(data))
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn nuclear_data(&self) -> &NuclearData {
        self.calculator.data()
    }

    /// cached density, g/cm^3
    pub fn density(&self) -> f64 {
        self.rho
    }

    /// temperature in K of the internal energy density `ed` (code units)
    pub fn temperature(&self, ed: f64) -> f64 {
        let ed_cgs = ed * self.config.unit_energy_density_in_cgs();
        ed_cgs * (self.gamma - 1.0) * NEUTRON_MASS / (self.rho * BOLTZMANN)
    }

    /// internal energy density (code units) of the cached cell at `temperature` K
    pub fn energy_density_for_temperature(&self, temperature: f64) -> f64 {
        temperature * self.rho * BOLTZMANN
            / ((self.gamma - 1.0) * NEUTRON_MASS * self.config.unit_energy_density_in_cgs())
    }

    /// rates at the cached density and the temperature of `ed`
    pub fn reaction_rates(&self, ed: f64) -> ReactionRates {
        self.calculator.calculate_rates(self.rho, self.temperature(ed))
    }

    /// d y / dt in 1/s with negative abundances treated as zero
    fn species_rates_cgs(&self, t: f64, y: &[f64; NISO], ed: f64) -> [f64; NISO] {
        let temperature = self.temperature(ed);
        if t == 0.0 {
            debug!("T_9 = {}", temperature * 1e-9);
        }
        let rates = self.calculator.calculate_rates(self.rho, temperature);
        rates_of_change(&rates, &floor_abundances(y))
    }

    /// Right-hand side and Jacobian of the full system (13 isotopes + energy) in code time units.
    ///
    /// The energy component is measured in units of the current specific energy
    /// `e0 = ED_cgs/ρ`, so its value in the state is 1. The derivatives with respect to energy
    /// are central differences with relative increment `alphanet_epsder`.
    /// Returns `None` for cells colder than [`T_COLD`].
    pub fn rhs_with_jacobian(
        &self,
        _t: f64,
        y: &[f64; NISO],
        ed: f64,
    ) -> Option<(SVector<f64, NEQN>, SMatrix<f64, NEQN, NEQN>)> {
        let temperature = self.temperature(ed);
        if temperature < T_COLD {
            return None;
        }
        let y = floor_abundances(y);
        let q = self.nuclear_data().binding_energies();
        let rates = self.calculator.calculate_rates(self.rho, temperature);
        let (mut f, mut jac) = partial_derivatives(&rates, &y, q);

        let e0_inv = self.rho / (ed * self.config.unit_energy_density_in_cgs());
        f[IENERGY] *= e0_inv;
        for j in 0..NEQN {
            jac[(IENERGY, j)] *= e0_inv;
        }

        let eps = self.config.alphanet_epsder;
        let perturbed = |factor: f64| -> SVector<f64, NEQN> {
            let rates = self
                .calculator
                .calculate_rates(self.rho, temperature * factor);
            let fs = rates_of_change(&rates, &y);
            let mut out = SVector::<f64, NEQN>::zeros();
            for k in 0..NISO {
                out[k] = fs[k];
            }
            out[IENERGY] = energy_generation(q, &fs) * e0_inv;
            out
        };
        let df = (perturbed(1.0 + eps) - perturbed(1.0 - eps)) / (2.0 * eps);
        jac.set_column(IENERGY, &df);

        let unit_time = self.config.unit_time_in_s();
        Some((f * unit_time, jac * unit_time))
    }

    /// rate of destruction of the fuel isotope, code units
    pub fn fuel_consumption_rate(&self, t: f64, y: &[f64; NISO], ed: f64) -> f64 {
        -self.rhs(t, y, ed)[self.config.niso_fuel]
    }

    /// Species Jacobian of [`ChemNetwork::rhs`] by finite differences: central where the
    /// backward step stays non-negative, forward otherwise.
    pub fn jacobian_numerical(&self, t: f64, y: &[f64; NISO], ed: f64) -> SMatrix<f64, NISO, NISO> {
        let mut jac = SMatrix::<f64, NISO, NISO>::zeros();
        let y = floor_abundances(y);
        let f0 = self.rhs(t, &y, ed);
        for j in 0..NISO {
            let h = 1e-4 * y[j].abs().max(1e-4);
            let mut yp = y;
            yp[j] += h;
            let fp = self.rhs(t, &yp, ed);
            if y[j] >= h {
                let mut ym = y;
                ym[j] -= h;
                let fm = self.rhs(t, &ym, ed);
                for i in 0..NISO {
                    jac[(i, j)] = (fp[i] - fm[i]) / (2.0 * h);
                }
            } else {
                for i in 0..NISO {
                    jac[(i, j)] = (fp[i] - f0[i]) / h;
                }
            }
        }
        jac
    }
}

impl ChemNetwork for AlphaNetwork {
    fn species_names(&self) -> &'static [&'static str; NISO] {
        &SPECIES_NAMES
    }

    fn initialize_next_step(
        &mut self,
        host: &dyn HydroHost,
        cell: CellIndex,
    ) -> Result<(), NetworkError> {
        let raw = host.density(cell);
        let floor = host.density_floor();
        if !(raw > 0.0) {
            warn!("non-positive density {} in cell {:?}, using floor {}", raw, cell, floor);
        }
        let rho = raw.max(floor);
        if !(rho > 0.0 && rho.is_finite()) {
            return Err(NetworkError::Config(format!(
                "density {} of cell {:?} is not usable (floor {})",
                rho, cell, floor
            )));
        }
        let gamma = host.gamma();
        if !(gamma > 1.0) {
            return Err(NetworkError::Config(format!(
                "adiabatic index must exceed 1, got {}",
                gamma
            )));
        }
        self.rho = rho * self.config.unit_density;
        self.gamma = gamma;
        self.non_barotropic = host.non_barotropic();
        Ok(())
    }

    fn rhs(&self, t: f64, y: &[f64; NISO], ed: f64) -> [f64; NISO] {
        let unit_time = self.config.unit_time_in_s();
        self.species_rates_cgs(t, y, ed).map(|f| f * unit_time)
    }

    fn edot(&self, t: f64, y: &[f64; NISO], ed: f64) -> f64 {
        if !self.non_barotropic {
            return 0.0;
        }
        let f = self.species_rates_cgs(t, y, ed);
        // erg/g/s -> erg/cm^3/s -> code units
        energy_generation(self.nuclear_data().binding_energies(), &f)
            * self.rho
            * self.config.unit_time_in_s()
            / self.config.unit_energy_density_in_cgs()
    }
}

/// copy of the abundances with negative entries replaced by zero
fn floor_abundances(y: &[f64; NISO]) -> [f64; NISO] {
    y.map(|v| if v < 0.0 { 0.0 } else { v })
}

/// Host with a density field on a (k, j, i) grid and uniform EOS parameters.
#[derive(Debug, Clone)]
pub struct GridHost {
    pub dims: (usize, usize, usize),
    pub densities: Vec<f64>,
    pub density_floor: f64,
    pub gamma: f64,
    pub non_barotropic: bool,
}

impl GridHost {
    /// one cell
    pub fn uniform(density: f64, density_floor: f64, gamma: f64, non_barotropic: bool) -> Self {
        Self {
            dims: (1, 1, 1),
            densities: vec![density],
            density_floor,
            gamma,
            non_barotropic,
        }
    }

    fn offset(&self, cell: CellIndex) -> Option<usize> {
        let (nk, nj, ni) = self.dims;
        if cell.k < nk && cell.j < nj && cell.i < ni {
            Some((cell.k * nj + cell.j) * ni + cell.i)
        } else {
            None
        }
    }
}

impl HydroHost for GridHost {
    /// cells outside the grid have zero density
    fn density(&self, cell: CellIndex) -> f64 {
        self.offset(cell)
            .and_then(|n| self.densities.get(n).copied())
            .unwrap_or(0.0)
    }

    fn density_floor(&self) -> f64 {
        self.density_floor
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn non_barotropic(&self) -> bool {
        self.non_barotropic
    }
}
