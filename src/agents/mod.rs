//! Concrete buyer and seller agents

pub mod cautious;
pub mod diplomatic;
pub mod reservation;

pub use cautious::CautiousBuyer;
pub use diplomatic::{DiplomaticBuyer, DiplomaticSeller};
pub use reservation::{ReservationBuyer, ReservationSeller};
