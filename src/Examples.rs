/// demonstrations of the alpha-chain network: table inspection, rate scans, one-cell burning
pub mod network_examples;
