#[allow(non_snake_case)]
pub mod Examples;
#[allow(non_snake_case)]
pub mod NuclearNetwork;
pub mod settings;

use Examples::network_examples::network_examples;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

pub fn main() {
    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let task: usize = 0;
    network_examples(task);
}
