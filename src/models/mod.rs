//! Domain models for the carpool.
//!
//! # Core Concepts
//!
//! - [`Car`]: A vehicle. Identity is assigned by storage on first insert; the
//!   only mutable field is its `model`.
//! - [`Transportation`]: A trip window linking one car to one passenger. The
//!   transportation owns the car reference; [`Car::transportations`] is a
//!   back-reference resolved on read.
//! - [`Customer`]: The bookstore customer, consumed here as an identity that can
//!   own cars and ride in them.
//! - [`Ownership`]: The many-to-many car/customer link. It has no attributes
//!   of its own and no independent identity.

mod car;
mod customer;
mod ids;
mod transportation;

pub use car::*;
pub use customer::*;
pub use ids::*;
pub use transportation::*;
