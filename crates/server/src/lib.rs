pub mod errors;
pub mod extract;
pub mod observability;
pub mod routes;
pub mod startup;
pub mod state;

pub use startup::run;
pub use state::ServerState;
