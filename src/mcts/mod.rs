pub mod algorithm;
pub mod hyperparameters;
pub mod node;
pub mod simulation;
pub mod state_store;
pub mod stats;
