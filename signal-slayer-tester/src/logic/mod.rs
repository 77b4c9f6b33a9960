pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::PilotKind;
pub use seeds::resolve_seed_inputs;
pub use simulation::{RunRecord, SimulationConfig, run_simulation};
