pub mod entity;
pub mod error;
pub mod manager;
pub mod scenario;

pub use entity::Entity;
pub use error::ManagerError;
pub use manager::{Action, Manager, Mutator, Processor};
pub use scenario::{Scenario, ScenarioLoader};
