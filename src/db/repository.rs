use crate::error::Result;
use crate::models::{Car, CarId, CarUpsert, Ownership};

use super::Database;

/// Storage operations the car orchestrator relies on, independent of the
/// backing engine.
pub trait CarRepository: Send + Sync {
    /// Every stored car with owners and transportations resolved. Empty, not
    /// an error, when there are none.
    fn find_all(&self) -> Result<Vec<Car>>;

    fn find_by_id(&self, id: CarId) -> Result<Option<Car>>;

    /// Insert when the upsert carries no id, otherwise overwrite the existing
    /// row. Updating a missing id is [`NotFound`](crate::Error::NotFound).
    fn save(&self, upsert: CarUpsert) -> Result<Car>;

    /// Returns `false` when the id was unknown.
    fn delete_by_id(&self, id: CarId) -> Result<bool>;

    fn add_owner(&self, ownership: Ownership) -> Result<()>;

    fn remove_owner(&self, ownership: Ownership) -> Result<bool>;
}

impl CarRepository for Database {
    fn find_all(&self) -> Result<Vec<Car>> {
        self.get_all_cars()
    }

    fn find_by_id(&self, id: CarId) -> Result<Option<Car>> {
        self.get_car(id)
    }

    fn save(&self, upsert: CarUpsert) -> Result<Car> {
        self.save_car(upsert)
    }

    fn delete_by_id(&self, id: CarId) -> Result<bool> {
        self.delete_car(id)
    }

    fn add_owner(&self, ownership: Ownership) -> Result<()> {
        Database::add_owner(self, ownership)
    }

    fn remove_owner(&self, ownership: Ownership) -> Result<bool> {
        Database::remove_owner(self, ownership)
    }
}
