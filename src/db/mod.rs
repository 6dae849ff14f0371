mod repository;
mod rows;
mod schema;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, Params};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::*;

pub use repository::CarRepository;

/// What happens to a car's transportations when the car is deleted.
///
/// Ownership links are always removed together with the car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Delete the dependent transportations in the same transaction.
    #[default]
    Cascade,
    /// Refuse with [`Error::Conflict`] while transportations reference the car.
    Block,
    /// Keep the transportations and clear their car reference.
    Detach,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Block => "block",
            Self::Detach => "detach",
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown delete policy '{0}' (expected cascade, block or detach)")]
pub struct UnknownDeletePolicy(String);

impl FromStr for DeletePolicy {
    type Err = UnknownDeletePolicy;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(Self::Cascade),
            "block" => Ok(Self::Block),
            "detach" => Ok(Self::Detach),
            _ => Err(UnknownDeletePolicy(s.to_string())),
        }
    }
}

/// Handle to the carpool SQLite store. Cheap to clone; clones share one
/// connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    delete_policy: DeletePolicy,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "carpool")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("carpool.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            delete_policy: DeletePolicy::default(),
        })
    }

    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.lock();
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database lock poisoned")
    }

    // ============================================================
    // Car operations
    // ============================================================

    /// Every car ordered by model, with owners and transportations resolved.
    pub fn get_all_cars(&self) -> Result<Vec<Car>> {
        let conn = self.lock();
        load_cars(&conn, "SELECT id, model FROM car ORDER BY model, id", [])
    }

    pub fn get_car(&self, id: CarId) -> Result<Option<Car>> {
        let conn = self.lock();
        load_car(&conn, id)
    }

    /// Cars linked to a customer through the ownership relation.
    pub fn get_cars_by_owner(&self, customer_id: CustomerId) -> Result<Vec<Car>> {
        let conn = self.lock();
        load_cars(
            &conn,
            "SELECT c.id, c.model FROM car c
             JOIN owner_car o ON o.car_id = c.id
             WHERE o.customer_id = ? ORDER BY c.model, c.id",
            [customer_id],
        )
    }

    /// Insert or overwrite a car.
    ///
    /// An update replaces the scalar fields only; owners and transportations
    /// are left as they are. Updating an id that does not exist fails with
    /// [`Error::NotFound`] instead of inserting.
    pub fn save_car(&self, upsert: CarUpsert) -> Result<Car> {
        match upsert {
            CarUpsert::Insert(fields) => self.insert_car(fields),
            CarUpsert::Update(id, fields) => self.update_car(id, fields),
        }
    }

    fn insert_car(&self, fields: CarFields) -> Result<Car> {
        let conn = self.lock();
        let id = CarId::generate();

        conn.execute(
            "INSERT INTO car (id, model) VALUES (?, ?)",
            (id, &fields.model),
        )?;

        tracing::info!(car_id = %id, model = %fields.model, "Inserted car");
        Ok(Car {
            id,
            model: fields.model,
            owners: Vec::new(),
            transportations: Vec::new(),
        })
    }

    fn update_car(&self, id: CarId, fields: CarFields) -> Result<Car> {
        let conn = self.lock();
        let rows = conn.execute(
            "UPDATE car SET model = ? WHERE id = ?",
            (&fields.model, id),
        )?;
        if rows == 0 {
            return Err(Error::not_found("car", id));
        }

        tracing::info!(car_id = %id, model = %fields.model, "Updated car");
        load_car(&conn, id)?.ok_or_else(|| Error::not_found("car", id))
    }

    /// Delete a car, applying the configured [`DeletePolicy`] to its
    /// transportations. Returns `false` when no such car exists.
    pub fn delete_car(&self, id: CarId) -> Result<bool> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        if !car_exists(&tx, id)? {
            return Ok(false);
        }

        let dependents: i64 = tx.query_row(
            "SELECT COUNT(*) FROM transportation WHERE car_id = ?",
            [id],
            |row| row.get(0),
        )?;

        match self.delete_policy {
            DeletePolicy::Cascade => {
                tx.execute("DELETE FROM transportation WHERE car_id = ?", [id])?;
            }
            DeletePolicy::Detach => {
                tx.execute(
                    "UPDATE transportation SET car_id = NULL WHERE car_id = ?",
                    [id],
                )?;
            }
            DeletePolicy::Block if dependents > 0 => {
                return Err(Error::Conflict(format!(
                    "car {} is referenced by {} transportation(s)",
                    id, dependents
                )));
            }
            DeletePolicy::Block => {}
        }

        tx.execute("DELETE FROM owner_car WHERE car_id = ?", [id])?;
        tx.execute("DELETE FROM car WHERE id = ?", [id])?;
        tx.commit()?;

        tracing::info!(
            car_id = %id,
            policy = %self.delete_policy,
            dependents,
            "Deleted car"
        );
        Ok(true)
    }

    // ============================================================
    // Ownership operations
    // ============================================================

    /// Link a customer to a car as an owner. Linking twice is a no-op.
    pub fn add_owner(&self, ownership: Ownership) -> Result<()> {
        let conn = self.lock();
        if !car_exists(&conn, ownership.car_id)? {
            return Err(Error::not_found("car", ownership.car_id));
        }
        if !customer_exists(&conn, ownership.customer_id)? {
            return Err(Error::not_found("customer", ownership.customer_id));
        }

        conn.execute(
            "INSERT OR IGNORE INTO owner_car (car_id, customer_id) VALUES (?, ?)",
            (ownership.car_id, ownership.customer_id),
        )?;

        tracing::info!(
            car_id = %ownership.car_id,
            customer_id = %ownership.customer_id,
            "Added car owner"
        );
        Ok(())
    }

    /// Remove an ownership link. Returns whether the link existed.
    pub fn remove_owner(&self, ownership: Ownership) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute(
            "DELETE FROM owner_car WHERE car_id = ? AND customer_id = ?",
            (ownership.car_id, ownership.customer_id),
        )?;
        Ok(rows > 0)
    }

    pub fn get_owners(&self, car_id: CarId) -> Result<Vec<CustomerId>> {
        let conn = self.lock();
        load_owners(&conn, car_id)
    }

    // ============================================================
    // Customer operations
    // ============================================================

    pub fn create_customer(&self, input: CreateCustomerInput) -> Result<Customer> {
        let conn = self.lock();
        let id = CustomerId::generate();

        conn.execute(
            "INSERT INTO customer (id, name) VALUES (?, ?)",
            (id, &input.name),
        )?;

        Ok(Customer {
            id,
            name: input.name,
        })
    }

    pub fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let conn = self.lock();
        let customer = conn
            .query_row(
                "SELECT id, name FROM customer WHERE id = ?",
                [id],
                rows::customer,
            )
            .optional()?;
        Ok(customer)
    }

    // ============================================================
    // Transportation operations
    // ============================================================

    pub fn create_transportation(
        &self,
        input: CreateTransportationInput,
    ) -> Result<Transportation> {
        if input.transportation_start > input.transportation_end {
            return Err(Error::Validation(format!(
                "transportation_start {} is after transportation_end {}",
                input.transportation_start, input.transportation_end
            )));
        }

        let conn = self.lock();
        if !car_exists(&conn, input.car_id)? {
            return Err(Error::not_found("car", input.car_id));
        }
        if !customer_exists(&conn, input.passenger_id)? {
            return Err(Error::not_found("customer", input.passenger_id));
        }

        let id = TransportationId::generate();
        conn.execute(
            "INSERT INTO transportation (id, transportation_start, transportation_end, car_id, passenger_id)
             VALUES (?, ?, ?, ?, ?)",
            (
                id,
                rows::date_to_sql(input.transportation_start),
                rows::date_to_sql(input.transportation_end),
                input.car_id,
                input.passenger_id,
            ),
        )?;

        tracing::info!(transportation_id = %id, car_id = %input.car_id, "Created transportation");
        Ok(Transportation {
            id,
            transportation_start: input.transportation_start,
            transportation_end: input.transportation_end,
            car_id: Some(input.car_id),
            passenger_id: input.passenger_id,
        })
    }

    pub fn get_transportation(&self, id: TransportationId) -> Result<Option<Transportation>> {
        let conn = self.lock();
        let trip = conn
            .query_row(
                "SELECT id, transportation_start, transportation_end, car_id, passenger_id
                 FROM transportation WHERE id = ?",
                [id],
                rows::transportation,
            )
            .optional()?;
        Ok(trip)
    }

    pub fn get_transportations_by_car(&self, car_id: CarId) -> Result<Vec<Transportation>> {
        let conn = self.lock();
        load_transportations(&conn, car_id)
    }

    pub fn delete_transportation(&self, id: TransportationId) -> Result<bool> {
        let conn = self.lock();
        let rows = conn.execute("DELETE FROM transportation WHERE id = ?", [id])?;
        Ok(rows > 0)
    }
}

// Helpers below take a plain connection so they can run under a lock (or
// inside a transaction) that the caller already holds.

fn car_exists(conn: &Connection, id: CarId) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM car WHERE id = ?", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn customer_exists(conn: &Connection, id: CustomerId) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM customer WHERE id = ?", [id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn load_car(conn: &Connection, id: CarId) -> Result<Option<Car>> {
    Ok(load_cars(conn, "SELECT id, model FROM car WHERE id = ?", [id])?
        .into_iter()
        .next())
}

fn load_cars<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Car>> {
    let mut stmt = conn.prepare(sql)?;
    let car_rows = stmt
        .query_map(params, rows::car_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    car_rows
        .into_iter()
        .map(|row| -> Result<Car> {
            let owners = load_owners(conn, row.id)?;
            let transportations = load_transportations(conn, row.id)?;
            Ok(row.into_car(owners, transportations))
        })
        .collect()
}

fn load_owners(conn: &Connection, car_id: CarId) -> Result<Vec<CustomerId>> {
    let mut stmt =
        conn.prepare("SELECT customer_id FROM owner_car WHERE car_id = ? ORDER BY customer_id")?;
    let owners = stmt
        .query_map([car_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(owners)
}

fn load_transportations(conn: &Connection, car_id: CarId) -> Result<Vec<Transportation>> {
    let mut stmt = conn.prepare(
        "SELECT id, transportation_start, transportation_end, car_id, passenger_id
         FROM transportation WHERE car_id = ? ORDER BY transportation_start, id",
    )?;
    let trips = stmt
        .query_map([car_id], rows::transportation)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(trips)
}
