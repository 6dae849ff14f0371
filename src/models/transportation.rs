use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{CarId, CustomerId, TransportationId};

/// A trip in which a passenger rides in a car between two calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transportation {
    pub id: TransportationId,
    pub transportation_start: NaiveDate,
    pub transportation_end: NaiveDate,
    /// `None` once the car was deleted under the detach policy.
    pub car_id: Option<CarId>,
    pub passenger_id: CustomerId,
}

/// Input for booking a transportation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransportationInput {
    pub transportation_start: NaiveDate,
    pub transportation_end: NaiveDate,
    pub car_id: CarId,
    pub passenger_id: CustomerId,
}
