//! # Rate Calculator
//!
//! Screened forward rates and reverse coefficients of the 18 reactions at a given
//! density and temperature.
//!
//! ## Forward rates
//! Every row of the polynomial bank is
//! ```text
//! ρ exp( c0 + c1/T9 + c2 T9^(-1/3) + c3 T9^(1/3) + c4 T9 + c5 T9^(5/3) + c6 ln T9 )
//! ```
//! evaluated in Horner form in T9^(2/3). Rows are summed per reaction, multiplied by the
//! identical-particle weight and, for three-body reactions, by one more ρ.
//!
//! ## Screening
//! Plasma parameter of isotope k: `Γ_k = min(150, gscr_k (ρ/2)^(1/3) / T9)`. The screening
//! function F(Γ) has a weak (Γ < 1) and a strong branch. A forward rate is multiplied by
//! `exp(S_f)` with `S_f = Σ m F(reactants) - F(compound)`.
//!
//! ## Reverse coefficients
//! ```text
//! rev = exp(ca + cb 11.605/T9 + S_r - S_f) Π pf(reactants)/Π pf(products) (T9^1.5/ρ)^(n_r - n_p)
//! ```
//! with `S_r = Σ m F(products) - F(compound)`. Then `forward * reverse` is the screened rate
//! of the reverse channel and detailed balance holds.
use super::isotopes::*;
use super::nuclear_data::{NuclearData, T9_PER_MEV};
use super::reaction_table::{REACTIONS, Reaction};
use std::sync::Arc;

/// lower bound of T9
pub const T9_MIN: f64 = 0.01;
/// upper bound of the plasma parameter
pub const GAMMA_MAX: f64 = 150.0;

// weak screening
const A6: f64 = -0.57735;
const A8: f64 = 2.0160;
const A7: f64 = 0.29341 / A8;
// strong screening
const A1: f64 = -0.897744;
const A2: f64 = 4.0 * 0.95043;
const A3: f64 = -4.0 * 0.18956;
const A4: f64 = -0.81487;
const A5: f64 = -2.58020;

/// T9 = T/1e9 K, never below [`T9_MIN`]
pub fn clamp_t9(temperature: f64) -> f64 {
    (1e-9 * temperature).max(T9_MIN)
}

/// screening function F(Γ)
pub fn screening_function(gamma: f64) -> f64 {
    if gamma < 1.0 {
        A6 * gamma.powf(1.5) + A7 * gamma.powf(A8)
    } else {
        let gam4 = gamma.powf(0.25);
        A1 * gamma + A2 * gam4 + A3 / gam4 + A4 * gamma.ln() + A5
    }
}

/// powers of T9 shared by all bank rows
#[derive(Debug, Clone, Copy)]
struct T9Powers {
    t9i: f64,
    t923: f64,
    t9l: f64,
}

impl T9Powers {
    fn new(t9: f64) -> Self {
        Self {
            t9i: 1.0 / t9,
            t923: t9.powf(2.0 / 3.0),
            t9l: t9.ln(),
        }
    }

    /// logarithm of one bank row divided by ρ
    fn bank_exponent(&self, c: &[f64; 7]) -> f64 {
        let t923 = self.t923;
        c[0] + self.t9i * (c[1] + t923 * (c[2] + t923 * (c[3] + t923 * (c[4] + t923 * c[5]))))
            + self.t9l * c[6]
    }
}

/// Rates of all reactions at one (ρ, T) point.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRates {
    /// density, g/cm^3
    pub rho: f64,
    /// clamped temperature, 1e9 K
    pub t9: f64,
    /// screened forward rates
    pub forward: [f64; NREAC],
    /// reverse coefficients: the reverse rate is `forward * reverse`
    pub reverse: [f64; NREAC],
    /// screening function F(Γ_k) of every isotope
    pub screening: [f64; NISO],
}

impl ReactionRates {
    /// S_f = Σ m F(reactants) - F(compound)
    pub fn forward_screening_exponent(&self, reaction: usize) -> f64 {
        channel_screening(&REACTIONS[reaction], REACTIONS[reaction].reactants, &self.screening)
    }

    /// S_r = Σ m F(products) - F(compound), zero for photodisintegration
    pub fn reverse_screening_exponent(&self, reaction: usize) -> f64 {
        channel_screening(&REACTIONS[reaction], REACTIONS[reaction].products, &self.screening)
    }
}

fn channel_screening(reaction: &Reaction, channel: &[(usize, u32)], screening: &[f64; NISO]) -> f64 {
    channel
        .iter()
        .map(|(k, m)| *m as f64 * screening[*k])
        .sum::<f64>()
        - screening[reaction.compound]
}

/// Pure function of (ρ, T) over a shared nuclear data bundle.
#[derive(Debug, Clone)]
pub struct RateCalculator {
    data: Arc<NuclearData>,
}

impl RateCalculator {
    pub fn new(data: Arc<NuclearData>) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &NuclearData {
        &self.data
    }

    /// ln pf_k = ln g0_k + ln(1 + exp(a_k/T9 + b_k + c_k T9))
    pub fn log_partition_functions(&self, t9: f64) -> [f64; NISO] {
        let d = &self.data;
        let mut ln_pf = [0.0; NISO];
        for (k, v) in ln_pf.iter_mut().enumerate() {
            *v = d.g0[k].ln() + ln_one_plus_exp(d.apf[k] / t9 + d.bpf[k] + d.cpf[k] * t9);
        }
        ln_pf
    }

    /// F(Γ_k) for every isotope
    pub fn screening(&self, rho: f64, t9: f64) -> [f64; NISO] {
        let g1 = (0.5 * rho).cbrt() / t9;
        let mut screening = [0.0; NISO];
        for (k, s) in screening.iter_mut().enumerate() {
            let gamma = (g1 * self.data.gscr[k]).min(GAMMA_MAX);
            *s = screening_function(gamma);
        }
        screening
    }

    /// every bank row at (ρ, T9)
    pub fn bank_rates(&self, rho: f64, t9: f64) -> [f64; NALP] {
        let powers = T9Powers::new(t9);
        let mut bank = [0.0; NALP];
        for (row, c) in bank.iter_mut().zip(self.data.calp.iter()) {
            *row = rho * powers.bank_exponent(c).exp();
        }
        bank
    }

    /// forward rates and reverse coefficients of all reactions
    pub fn calculate_rates(&self, rho: f64, temperature: f64) -> ReactionRates {
        let t9 = clamp_t9(temperature);
        let ln_rho = rho.ln();
        let ln_t9 = t9.ln();
        let t9r = T9_PER_MEV / t9;

        let bank = self.bank_rates(rho, t9);
        let ln_pf = self.log_partition_functions(t9);
        let screening = self.screening(rho, t9);

        let mut forward = [0.0; NREAC];
        let mut reverse = [0.0; NREAC];
        for (i, reaction) in REACTIONS.iter().enumerate() {
            let s_f = channel_screening(reaction, reaction.reactants, &screening);
            let s_r = channel_screening(reaction, reaction.products, &screening);
            let summed: f64 = reaction.channels.iter().map(|m| bank[*m]).sum();
            forward[i] = reaction.weight
                * summed
                * (s_f + reaction.extra_density_power() as f64 * ln_rho).exp();

            let ln_pf_ratio = log_channel_sum(reaction.reactants, &ln_pf)
                - log_channel_sum(reaction.products, &ln_pf);
            let unbalanced = (reaction.reactant_count() - reaction.product_count()) as f64;
            reverse[i] = (self.data.ca[i]
                + self.data.cb[i] * t9r
                + s_r
                - s_f
                + ln_pf_ratio
                + unbalanced * (1.5 * ln_t9 - ln_rho))
                .exp();
        }

        ReactionRates {
            rho,
            t9,
            forward,
            reverse,
            screening,
        }
    }
}

/// Σ m ln x_k over the channel
/// ln(1 + e^x) without overflow for large x
fn ln_one_plus_exp(x: f64) -> f64 {
    x.max(0.0) + (-x.abs()).exp().ln_1p()
}

fn log_channel_sum(channel: &[(usize, u32)], ln_x: &[f64; NISO]) -> f64 {
    channel.iter().map(|(k, m)| *m as f64 * ln_x[*k]).sum()
}
