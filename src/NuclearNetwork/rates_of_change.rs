//! Rates of change of the isotope mole fractions, the specific nuclear energy generation
//! and the analytic Jacobian of both.
//!
//! For every reaction of [`REACTIONS`] the net rate `r` is evaluated once; each reactant
//! loses `m r`, each product gains `m r`. The Jacobian scatters the gradient of `r` with
//! the same stoichiometry, so the two are consistent by construction.
use super::isotopes::*;
use super::nuclear_data::MEV_TO_ERG_PER_GRAM;
use super::rates::ReactionRates;
use super::reaction_table::REACTIONS;
use nalgebra::{SMatrix, SVector};

/// d y_k / dt for all isotopes, 1/s
pub fn rates_of_change(rates: &ReactionRates, y: &[f64; NISO]) -> [f64; NISO] {
    let mut f = [0.0; NISO];
    for (i, reaction) in REACTIONS.iter().enumerate() {
        let r = reaction.net_rate(rates.forward[i], rates.reverse[i], y);
        for (k, nu) in reaction.stoichiometry() {
            f[k] += nu * r;
        }
    }
    f
}

/// specific energy generation 9.64867e17 Σ Q_k f_k, erg/g/s
pub fn energy_generation(q: &[f64; NISO], f: &[f64; NISO]) -> f64 {
    MEV_TO_ERG_PER_GRAM * q.iter().zip(f.iter()).map(|(q, f)| q * f).sum::<f64>()
}

/// Rates of change with the energy row appended and their Jacobian `jac[(i, j)] = ∂f_i/∂y_j`.
///
/// Row 13 is the specific energy generation and its derivatives. Column 13 (derivatives
/// with respect to energy) is left at zero: the rates are not a function of the abundances'
/// energy and the caller fills it when needed.
pub fn partial_derivatives(
    rates: &ReactionRates,
    y: &[f64; NISO],
    q: &[f64; NISO],
) -> (SVector<f64, NEQN>, SMatrix<f64, NEQN, NEQN>) {
    let mut f = SVector::<f64, NEQN>::zeros();
    let mut jac = SMatrix::<f64, NEQN, NEQN>::zeros();

    for (i, reaction) in REACTIONS.iter().enumerate() {
        let (frv, rev) = (rates.forward[i], rates.reverse[i]);
        let r = reaction.net_rate(frv, rev, y);
        let grad = reaction.rate_gradient(frv, rev, y);
        for (k, nu) in reaction.stoichiometry() {
            f[k] += nu * r;
            for (j, g) in grad.iter().enumerate() {
                if *g != 0.0 {
                    jac[(k, j)] += nu * g;
                }
            }
        }
    }

    let mut edot = 0.0;
    for k in 0..NISO {
        edot += q[k] * f[k];
    }
    f[IENERGY] = MEV_TO_ERG_PER_GRAM * edot;
    for j in 0..NISO {
        let mut sum = 0.0;
        for k in 0..NISO {
            sum += q[k] * jac[(k, j)];
        }
        jac[(IENERGY, j)] = MEV_TO_ERG_PER_GRAM * sum;
    }
    (f, jac)
}
