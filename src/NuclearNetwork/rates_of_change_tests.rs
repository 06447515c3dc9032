/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::NuclearNetwork::isotopes::*;
    use crate::NuclearNetwork::nuclear_data::MEV_TO_ERG_PER_GRAM;
    use crate::NuclearNetwork::rates::{RateCalculator, ReactionRates};
    use crate::NuclearNetwork::rates_of_change::*;
    use crate::NuclearNetwork::reaction_table::REACTIONS;
    use crate::NuclearNetwork::test_fixtures::{BINDING_ENERGIES, synthetic_data};
    use approx::assert_relative_eq;
    use nalgebra::SMatrix;

    /// moderate rates of order one, independent of the nuclear data
    fn artificial_rates() -> ReactionRates {
        let mut forward = [0.0; NREAC];
        let mut reverse = [0.0; NREAC];
        for i in 0..NREAC {
            let s = i as f64 / (NREAC - 1) as f64;
            forward[i] = 0.5 + 1.5 * s;
            reverse[i] = 0.1 + 0.9 * s;
        }
        ReactionRates {
            rho: 1.0,
            t9: 1.0,
            forward,
            reverse,
            screening: [0.0; NISO],
        }
    }

    /// synthetic-table rates at a moderate, a strongly screened and a hot dilute cell
    fn physical_rates() -> Vec<ReactionRates> {
        let calc = RateCalculator::new(synthetic_data());
        [(1.0e7, 3.0e9), (1.0e9, 5.0e8), (1.0e5, 8.0e9)]
            .iter()
            .map(|(rho, temperature)| calc.calculate_rates(*rho, *temperature))
            .collect()
    }

    fn test_points() -> Vec<[f64; NISO]> {
        let mut spread = [0.0; NISO];
        for (k, y) in spread.iter_mut().enumerate() {
            *y = 0.05 / (k + 1) as f64;
        }
        let mut near_zero = [0.0; NISO];
        near_zero[I_HE] = 1e-12;
        near_zero[I_C] = 0.02;
        near_zero[I_O] = 0.03;
        let mut pure_helium = [0.0; NISO];
        pure_helium[I_HE] = 0.25;
        vec![spread, near_zero, pure_helium]
    }

    /// central differences of `rates_of_change` at fixed rates
    fn numerical_jacobian(rates: &ReactionRates, y: &[f64; NISO]) -> SMatrix<f64, NISO, NISO> {
        let mut jac = SMatrix::<f64, NISO, NISO>::zeros();
        for j in 0..NISO {
            let h = 1e-4 * y[j].abs().max(1e-4);
            let mut yp = *y;
            let mut ym = *y;
            yp[j] += h;
            ym[j] -= h;
            let fp = rates_of_change(rates, &yp);
            let fm = rates_of_change(rates, &ym);
            for i in 0..NISO {
                jac[(i, j)] = (fp[i] - fm[i]) / (2.0 * h);
            }
        }
        jac
    }

    fn assert_jacobian_matches(rates: &ReactionRates, y: &[f64; NISO]) {
        let (_, ana) = partial_derivatives(rates, y, &BINDING_ENERGIES);
        let num = numerical_jacobian(rates, y);
        for i in 0..NISO {
            let scale: f64 = (0..NISO).map(|j| ana[(i, j)].abs() * y[j].abs()).sum();
            for j in 0..NISO {
                let tol = 1e-6 * (ana[(i, j)].abs() + scale / y[j].abs().max(1e-4));
                let diff = (ana[(i, j)] - num[(i, j)]).abs();
                assert!(
                    diff <= tol,
                    "jac[({}, {})]: analytic {} numerical {} at y = {:?}",
                    i,
                    j,
                    ana[(i, j)],
                    num[(i, j)],
                    y
                );
            }
        }
    }

    #[test]
    fn test_jacobian_matches_finite_differences_artificial_rates() {
        let rates = artificial_rates();
        for y in test_points() {
            assert_jacobian_matches(&rates, &y);
        }
    }

    #[test]
    fn test_jacobian_matches_finite_differences_physical_rates() {
        for rates in physical_rates() {
            for y in test_points() {
                assert_jacobian_matches(&rates, &y);
            }
        }
    }

    #[test]
    fn test_partial_derivatives_reproduce_rates_of_change() {
        for rates in std::iter::once(artificial_rates()).chain(physical_rates()) {
            for y in test_points() {
                let f = rates_of_change(&rates, &y);
                let (f_full, _) = partial_derivatives(&rates, &y, &BINDING_ENERGIES);
                for k in 0..NISO {
                    assert_eq!(f[k], f_full[k]);
                }
            }
        }
    }

    #[test]
    fn test_energy_row_is_linear_in_binding_energies() {
        let rates = artificial_rates();
        let y = test_points()[0];
        let (f, jac) = partial_derivatives(&rates, &y, &BINDING_ENERGIES);
        let f_species = rates_of_change(&rates, &y);
        assert_relative_eq!(
            f[IENERGY],
            energy_generation(&BINDING_ENERGIES, &f_species),
            max_relative = 1e-12
        );
        for j in 0..NISO {
            let expected: f64 = MEV_TO_ERG_PER_GRAM
                * (0..NISO).map(|k| BINDING_ENERGIES[k] * jac[(k, j)]).sum::<f64>();
            assert_relative_eq!(jac[(IENERGY, j)], expected, max_relative = 1e-12, epsilon = 1e-3);
        }
        let doubled: [f64; NISO] = BINDING_ENERGIES.map(|q| 2.0 * q);
        let (f2, jac2) = partial_derivatives(&rates, &y, &doubled);
        assert_eq!(f2[IENERGY], 2.0 * f[IENERGY]);
        for j in 0..NISO {
            assert_eq!(jac2[(IENERGY, j)], 2.0 * jac[(IENERGY, j)]);
        }
        // derivatives with respect to energy are left to the driver
        for i in 0..NEQN {
            assert_eq!(jac[(i, IENERGY)], 0.0);
        }
    }

    #[test]
    fn test_mass_and_charge_balance() {
        for rates in std::iter::once(artificial_rates()).chain(physical_rates()) {
            for y in test_points() {
                let (f, jac) = partial_derivatives(&rates, &y, &BINDING_ENERGIES);
                // size of the individual reaction terms entering the sums
                let mut magnitude = 0.0;
                let mut column_magnitude = [0.0; NISO];
                for (i, reaction) in REACTIONS.iter().enumerate() {
                    let weight: f64 = reaction.stoichiometry().map(|(k, nu)| nu.abs() * A_ISO[k]).sum();
                    let r = reaction.net_rate(rates.forward[i], rates.reverse[i], &y);
                    let grad = reaction.rate_gradient(rates.forward[i], rates.reverse[i], &y);
                    magnitude += weight * r.abs();
                    for j in 0..NISO {
                        column_magnitude[j] += weight * grad[j].abs();
                    }
                }
                let mass: f64 = (0..NISO).map(|k| A_ISO[k] * f[k]).sum();
                let charge: f64 = (0..NISO).map(|k| Z_ISO[k] * f[k]).sum();
                assert!(mass.abs() <= 1e-13 * magnitude);
                assert!(charge.abs() <= 1e-13 * magnitude);
                for j in 0..NISO {
                    let column: f64 = (0..NISO).map(|k| A_ISO[k] * jac[(k, j)]).sum();
                    assert!(column.abs() <= 1e-13 * column_magnitude[j]);
                }
            }
        }
    }

    #[test]
    fn test_pure_helium_burns_to_carbon() {
        let rates = artificial_rates();
        let y = test_points()[2];
        let f = rates_of_change(&rates, &y);
        let r = rates.forward[0] * 0.25_f64.powi(3);
        assert_relative_eq!(f[I_HE], -3.0 * r, max_relative = 1e-14);
        assert_relative_eq!(f[I_C], r, max_relative = 1e-14);
        for k in 2..NISO {
            assert_eq!(f[k], 0.0);
        }
    }
}
