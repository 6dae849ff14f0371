//! Car orchestration: the read, upsert and delete flows behind the car pages.

use serde::Serialize;

use crate::db::CarRepository;
use crate::error::Result;
use crate::models::{Car, CarId, CarUpsert, Ownership};

/// Where the listing lives. Every mutation sends the caller back here.
pub const CAR_LISTING_PATH: &str = "/cars";

/// Template the listing is rendered with by the presentation layer.
pub const CAR_LISTING_VIEW: &str = "car/get_all";

/// Instruction to send the client to another page after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub location: String,
}

impl Redirect {
    pub fn to_listing() -> Self {
        Self {
            location: CAR_LISTING_PATH.to_string(),
        }
    }
}

/// Payload handed to the view layer for the car listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarListing {
    pub view: &'static str,
    pub cars: Vec<Car>,
}

/// Coordinates car requests against a [`CarRepository`].
///
/// No business rules live here: there is no duplicate-model check, no limit on
/// owners, and blank models are accepted. Storage failures propagate
/// unchanged.
#[derive(Clone)]
pub struct CarService<R> {
    repo: R,
}

impl<R: CarRepository> CarService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn list_cars(&self) -> Result<CarListing> {
        let cars = self.repo.find_all()?;
        tracing::debug!(count = cars.len(), "Listing cars");
        Ok(CarListing {
            view: CAR_LISTING_VIEW,
            cars,
        })
    }

    pub fn find_car(&self, id: CarId) -> Result<Option<Car>> {
        self.repo.find_by_id(id)
    }

    pub fn upsert_car(&self, upsert: impl Into<CarUpsert>) -> Result<Redirect> {
        let upsert = upsert.into();
        match &upsert {
            CarUpsert::Insert(_) => tracing::debug!("Upserting new car"),
            CarUpsert::Update(id, _) => tracing::debug!(car_id = %id, "Upserting existing car"),
        }
        self.repo.save(upsert)?;
        Ok(Redirect::to_listing())
    }

    /// Deleting an unknown id is not an error; the caller is redirected either
    /// way.
    pub fn delete_car(&self, id: CarId) -> Result<Redirect> {
        if !self.repo.delete_by_id(id)? {
            tracing::debug!(car_id = %id, "Delete requested for unknown car");
        }
        Ok(Redirect::to_listing())
    }

    pub fn add_owner(&self, ownership: Ownership) -> Result<Redirect> {
        self.repo.add_owner(ownership)?;
        Ok(Redirect::to_listing())
    }

    pub fn remove_owner(&self, ownership: Ownership) -> Result<bool> {
        self.repo.remove_owner(ownership)
    }
}
