//! # Reaction table
//!
//! Declarative description of the 18 reactions of the alpha chain. Every other part
//! of the network (forward rate aggregation, screening, reverse coefficients, rates
//! of change and the Jacobian) is driven by this table, so one reaction is described
//! in exactly one place.
//!
//! | field | meaning |
//! |-------|---------|
//! | `reactants` | (isotope, multiplicity) of the forward entrance channel |
//! | `products` | (isotope, multiplicity) of the exit channel |
//! | `compound` | compound nucleus; its screening factor is subtracted from both channels |
//! | `channels` | rows of the rate polynomial bank summed into the forward rate |
//! | `weight` | factor applied to the summed rows (identical particles) |
//!
//! The net rate of a reaction is
//! ```text
//! r = forward * ( Π y_reactant^m - reverse * Π y_product^m )
//! ```
//! so `forward * reverse` is the rate of the reverse channel.
use super::isotopes::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reaction {
    /// human readable equation
    pub label: &'static str,
    pub reactants: &'static [(usize, u32)],
    pub products: &'static [(usize, u32)],
    pub compound: usize,
    pub channels: &'static [usize],
    pub weight: f64,
}

impl Reaction {
    /// total number of particles in the entrance channel
    pub fn reactant_count(&self) -> i32 {
        self.reactants.iter().map(|(_, m)| *m as i32).sum()
    }
    /// total number of particles in the exit channel
    pub fn product_count(&self) -> i32 {
        self.products.iter().map(|(_, m)| *m as i32).sum()
    }
    /// extra powers of density carried by the forward rate on top of the one every bank row has
    pub fn extra_density_power(&self) -> i32 {
        self.reactant_count() - 2
    }
    /// signed stoichiometric coefficients: negative for reactants, positive for products
    pub fn stoichiometry(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.reactants
            .iter()
            .map(|(k, m)| (*k, -(*m as f64)))
            .chain(self.products.iter().map(|(k, m)| (*k, *m as f64)))
    }
    /// does the isotope take part in the reaction
    #[cfg(test)]
    pub fn involves(&self, isotope: usize) -> bool {
        self.reactants
            .iter()
            .chain(self.products.iter())
            .any(|(k, _)| *k == isotope)
    }
    /// net reaction rate r = forward * (Π y_r^m - reverse * Π y_p^m)
    pub fn net_rate(&self, forward: f64, reverse: f64, y: &[f64]) -> f64 {
        forward * (power_product(self.reactants, y) - reverse * power_product(self.products, y))
    }
    /// partial derivatives of the net rate with respect to every isotope abundance
    pub fn rate_gradient(&self, forward: f64, reverse: f64, y: &[f64]) -> [f64; NISO] {
        let mut grad = [0.0; NISO];
        for (k, _) in self.reactants {
            grad[*k] += forward * power_product_derivative(self.reactants, y, *k);
        }
        for (k, _) in self.products {
            grad[*k] -= forward * reverse * power_product_derivative(self.products, y, *k);
        }
        grad
    }
}

/// Π y_k^m over the channel
fn power_product(channel: &[(usize, u32)], y: &[f64]) -> f64 {
    channel
        .iter()
        .map(|(k, m)| y[*k].powi(*m as i32))
        .product()
}

/// d/dy_j of Π y_k^m over the channel
fn power_product_derivative(channel: &[(usize, u32)], y: &[f64], j: usize) -> f64 {
    channel
        .iter()
        .map(|(k, m)| {
            if *k == j {
                *m as f64 * y[*k].powi(*m as i32 - 1)
            } else {
                y[*k].powi(*m as i32)
            }
        })
        .product()
}

/// alpha capture X + He -> Y, screened through the product
const fn alpha_capture(
    label: &'static str,
    target: &'static [(usize, u32)],
    product: &'static [(usize, u32)],
    channels: &'static [usize],
) -> Reaction {
    Reaction {
        label,
        reactants: target,
        products: product,
        compound: product[0].0,
        channels,
        weight: 1.0,
    }
}

pub const REACTIONS: [Reaction; NREAC] = [
    Reaction {
        label: "3 He -> C",
        reactants: &[(I_HE, 3)],
        products: &[(I_C, 1)],
        compound: I_C,
        channels: &[0],
        weight: 1.0 / 12.0,
    },
    Reaction {
        label: "C + C -> Ne + He",
        reactants: &[(I_C, 2)],
        products: &[(I_NE, 1), (I_HE, 1)],
        compound: I_MG,
        channels: &[1],
        weight: 0.5,
    },
    Reaction {
        label: "C + C -> Mg",
        reactants: &[(I_C, 2)],
        products: &[(I_MG, 1)],
        compound: I_MG,
        channels: &[2, 3],
        weight: 0.5,
    },
    Reaction {
        label: "C + O -> Mg + He",
        reactants: &[(I_C, 1), (I_O, 1)],
        products: &[(I_MG, 1), (I_HE, 1)],
        compound: I_SI,
        channels: &[4],
        weight: 1.0,
    },
    Reaction {
        label: "C + O -> Si",
        reactants: &[(I_C, 1), (I_O, 1)],
        products: &[(I_SI, 1)],
        compound: I_SI,
        channels: &[5, 6],
        weight: 1.0,
    },
    Reaction {
        label: "O + O -> Si + He",
        reactants: &[(I_O, 2)],
        products: &[(I_SI, 1), (I_HE, 1)],
        compound: I_S,
        channels: &[7],
        weight: 0.5,
    },
    Reaction {
        label: "O + O -> S",
        reactants: &[(I_O, 2)],
        products: &[(I_S, 1)],
        compound: I_S,
        channels: &[8, 9],
        weight: 0.5,
    },
    alpha_capture("He + C -> O", &[(I_HE, 1), (I_C, 1)], &[(I_O, 1)], &[10, 11]),
    alpha_capture("He + O -> Ne", &[(I_HE, 1), (I_O, 1)], &[(I_NE, 1)], &[12, 13]),
    alpha_capture(
        "He + Ne -> Mg",
        &[(I_HE, 1), (I_NE, 1)],
        &[(I_MG, 1)],
        &[14, 15, 16, 17, 18],
    ),
    alpha_capture(
        "He + Mg -> Si",
        &[(I_HE, 1), (I_MG, 1)],
        &[(I_SI, 1)],
        &[19, 20, 21, 22, 23],
    ),
    alpha_capture("He + Si -> S", &[(I_HE, 1), (I_SI, 1)], &[(I_S, 1)], &[24, 25]),
    alpha_capture("He + S -> Ar", &[(I_HE, 1), (I_S, 1)], &[(I_AR, 1)], &[26, 27]),
    alpha_capture("He + Ar -> Ca", &[(I_HE, 1), (I_AR, 1)], &[(I_CA, 1)], &[28, 29]),
    alpha_capture("He + Ca -> Ti", &[(I_HE, 1), (I_CA, 1)], &[(I_TI, 1)], &[30, 31]),
    alpha_capture("He + Ti -> Cr", &[(I_HE, 1), (I_TI, 1)], &[(I_CR, 1)], &[32, 33]),
    alpha_capture("He + Cr -> Fe", &[(I_HE, 1), (I_CR, 1)], &[(I_FE, 1)], &[34, 35]),
    alpha_capture("He + Fe -> Ni", &[(I_HE, 1), (I_FE, 1)], &[(I_NI, 1)], &[36, 37]),
];
