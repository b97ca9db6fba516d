pub mod actions;
pub mod ai;
pub mod events;
pub mod movement;
pub mod orchestrator;
pub mod scheduler;

#[cfg(test)]
mod tests;
