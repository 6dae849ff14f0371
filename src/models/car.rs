use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use super::{CarId, CustomerId, Transportation};

/// A vehicle offered for carpooling.
///
/// Owners and transportations are resolved from their relation tables when a
/// car is read. Saving a car never writes either collection; see
/// [`CarUpsert`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    /// Free-text model name. May be empty.
    pub model: String,
    /// Customers linked through the ownership relation.
    #[serde(default)]
    pub owners: Vec<CustomerId>,
    /// Trips whose car reference is this car.
    #[serde(default)]
    pub transportations: Vec<Transportation>,
}

impl Car {
    pub fn fields(&self) -> CarFields {
        CarFields {
            model: self.model.clone(),
        }
    }
}

/// The scalar, user-editable fields of a car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarFields {
    pub model: String,
}

impl CarFields {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

/// What a save should do, decided up front instead of inferred from a
/// nullable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarUpsert {
    Insert(CarFields),
    /// Replace every scalar field of the car with this id.
    Update(CarId, CarFields),
}

impl CarUpsert {
    pub fn fields(&self) -> &CarFields {
        match self {
            Self::Insert(fields) | Self::Update(_, fields) => fields,
        }
    }
}

/// A car as submitted by the upsert form.
///
/// Fields map one to one onto the form body. An absent or empty `id` means
/// insert; an absent `model` is taken as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarInput {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub id: Option<CarId>,
    #[serde(default)]
    pub model: String,
}

impl From<CarInput> for CarUpsert {
    fn from(input: CarInput) -> Self {
        let fields = CarFields { model: input.model };
        match input.id {
            Some(id) => CarUpsert::Update(id, fields),
            None => CarUpsert::Insert(fields),
        }
    }
}

/// Add or remove a single ownership link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub car_id: CarId,
    pub customer_id: CustomerId,
}

// HTML forms post `id=` for a car that has not been saved yet.
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}
