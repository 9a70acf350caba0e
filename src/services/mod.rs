pub mod admin;
pub mod delivery;
pub mod interval;
pub mod review_state;
pub mod scheduler;
pub mod session;
