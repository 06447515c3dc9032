use crate::NuclearNetwork::isotopes::*;
use crate::NuclearNetwork::network_driver::{AlphaNetwork, CellIndex, ChemNetwork, GridHost};
use crate::NuclearNetwork::reaction_table::REACTIONS;
use crate::settings::NetworkConfig;
use log::{error, info};
use nalgebra::SMatrix;
use prettytable::{Cell, Row, Table};
use std::path::Path;

const CONFIG_FILE: &str = "alphanet.json";

/// configuration from alphanet.json when present, defaults otherwise
fn load_config() -> NetworkConfig {
    if Path::new(CONFIG_FILE).exists() {
        match NetworkConfig::from_json_file(CONFIG_FILE) {
            Ok(config) => return config,
            Err(e) => error!("{}: {}, falling back to defaults", CONFIG_FILE, e),
        }
    }
    NetworkConfig::default()
}

/// network set up for one cell of the given density (g/cm^3)
fn network_for_cell(density: f64) -> Option<AlphaNetwork> {
    let config = load_config();
    let density_code = density / config.unit_density;
    let mut network = match AlphaNetwork::from_config(config) {
        Ok(network) => network,
        Err(e) => {
            error!("unable to build the alpha network: {}", e);
            return None;
        }
    };
    let host = GridHost::uniform(density_code, 1e-10, 5.0 / 3.0, true);
    if let Err(e) = network.initialize_next_step(&host, CellIndex::new(0, 0, 0)) {
        error!("{}", e);
        return None;
    }
    Some(network)
}

fn pure_helium() -> [f64; NISO] {
    let mut y = [0.0; NISO];
    y[I_HE] = 1.0 / A_ISO[I_HE];
    y
}

pub fn network_examples(task: usize) {
    match task {
        0 => {
            // NUCLEAR DATA TABLE AND ONE CELL
            let Some(network) = network_for_cell(1.0e7) else {
                return;
            };
            network.nuclear_data().pretty_print();
            let y = pure_helium();
            let ed = network.energy_density_for_temperature(5.0e9);
            let ydot = network.rhs(0.0, &y, ed);
            for (name, rate) in network.species_names().iter().zip(ydot.iter()) {
                println!("d{}/dt = {:e}", name, rate);
            }
            println!("Edot = {:e}", network.edot(0.0, &y, ed));
            println!(
                "fuel consumption = {:e}",
                network.fuel_consumption_rate(0.0, &y, ed)
            );
        }
        1 => {
            // FORWARD AND REVERSE RATES OVER TEMPERATURE
            let Some(network) = network_for_cell(1.0e7) else {
                return;
            };
            let mut table = Table::new();
            let mut header = vec![Cell::new("T9")];
            for i in [0, 2, 7, 17] {
                header.push(Cell::new(&format!("{} fwd", REACTIONS[i].label)));
                header.push(Cell::new("rev"));
            }
            table.add_row(Row::new(header));
            for t9 in [0.1, 0.3, 1.0, 2.0, 3.0, 5.0] {
                let ed = network.energy_density_for_temperature(t9 * 1e9);
                let rates = network.reaction_rates(ed);
                let mut row = vec![Cell::new(&t9.to_string())];
                for i in [0, 2, 7, 17] {
                    row.push(Cell::new(&format!("{:.3e}", rates.forward[i])));
                    row.push(Cell::new(&format!("{:.3e}", rates.reverse[i])));
                }
                table.add_row(Row::new(row));
            }
            table.printstd();
        }
        2 => {
            // ANALYTIC VS NUMERICAL JACOBIAN
            let Some(network) = network_for_cell(1.0e8) else {
                return;
            };
            let mut y = [0.0; NISO];
            for (k, v) in y.iter_mut().enumerate() {
                *v = 0.5 / (NISO as f64 * A_ISO[k]);
            }
            let ed = network.energy_density_for_temperature(3.0e9);
            let Some((_, jac)) = network.rhs_with_jacobian(0.0, &y, ed) else {
                info!("cell is too cold to burn");
                return;
            };
            let num = network.jacobian_numerical(0.0, &y, ed);
            let mut worst = 0.0_f64;
            for i in 0..NISO {
                for j in 0..NISO {
                    let scale = jac[(i, j)].abs().max(1e-30);
                    worst = worst.max((jac[(i, j)] - num[(i, j)]).abs() / scale);
                }
            }
            println!("largest relative deviation of the species Jacobian: {:e}", worst);
            println!("d(energy)/d(energy) = {:e}", jac[(IENERGY, IENERGY)]);
        }
        3 => {
            // HELIUM BURNING IN ONE CELL WITH BACKWARD EULER STEPS
            let Some(network) = network_for_cell(1.0e7) else {
                return;
            };
            let mut y = pure_helium();
            let mut ed = network.energy_density_for_temperature(2.0e9);
            let mut t = 0.0;
            let mut dt = 1e-6;
            for step in 0..40 {
                let Some((f, jac)) = network.rhs_with_jacobian(t, &y, ed) else {
                    info!("step {}: cell too cold, burning stops", step);
                    break;
                };
                let lhs = SMatrix::<f64, NEQN, NEQN>::identity() - jac * dt;
                let Some(delta) = lhs.lu().solve(&(f * dt)) else {
                    error!("step {}: singular iteration matrix", step);
                    break;
                };
                for k in 0..NISO {
                    y[k] = (y[k] + delta[k]).max(0.0);
                }
                ed *= 1.0 + delta[IENERGY];
                t += dt;
                dt *= 1.5;
                println!(
                    "t = {:.3e} s  T = {:.3e} K  X(He) = {:.4}  X(C) = {:.4}  X(O) = {:.4}",
                    t,
                    network.temperature(ed),
                    y[I_HE] * A_ISO[I_HE],
                    y[I_C] * A_ISO[I_C],
                    y[I_O] * A_ISO[I_O]
                );
            }
        }
        _ => {
            println!("no such example: {}", task);
        }
    }
}
