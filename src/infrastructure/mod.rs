pub mod database;
pub mod network;
pub mod remote;
pub mod sync;
