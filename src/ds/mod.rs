pub mod events;
pub mod transactions;
