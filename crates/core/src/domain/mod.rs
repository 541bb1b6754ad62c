pub mod collection;
pub mod compliance;
pub mod dates;
pub mod network;
pub mod processing;
pub mod sales;
pub mod workforce;
