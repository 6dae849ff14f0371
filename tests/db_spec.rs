use carpool::db::{Database, DeletePolicy};
use carpool::models::*;
use carpool::Error;
use chrono::NaiveDate;
use speculate2::speculate;
use uuid::Uuid;

fn insert_car(db: &Database, model: &str) -> Car {
    db.save_car(CarUpsert::Insert(CarFields::new(model)))
        .expect("Failed to insert car")
}

fn create_customer(db: &Database, name: &str) -> Customer {
    db.create_customer(CreateCustomerInput {
        name: name.to_string(),
    })
    .expect("Failed to create customer")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date")
}

fn book_trip(db: &Database, car: &Car, passenger: &Customer) -> Transportation {
    db.create_transportation(CreateTransportationInput {
        transportation_start: date(1),
        transportation_end: date(3),
        car_id: car.id,
        passenger_id: passenger.id,
    })
    .expect("Failed to create transportation")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "cars" {
        describe "save_car" {
            it "assigns a fresh id on insert" {
                let first = insert_car(&db, "Tesla Model 3");
                let second = insert_car(&db, "Renault Zoe");

                assert_ne!(first.id, second.id);
                assert_eq!(first.model, "Tesla Model 3");
                assert!(first.owners.is_empty());
                assert!(first.transportations.is_empty());
            }

            it "accepts an empty model" {
                let car = insert_car(&db, "");
                let found = db.get_car(car.id).expect("Query failed").expect("Car missing");
                assert_eq!(found.model, "");
            }

            it "overwrites the model on update without adding a row" {
                let car = insert_car(&db, "Tesla Model 3");

                let updated = db.save_car(CarUpsert::Update(car.id, CarFields::new("Tesla Model 3001")))
                    .expect("Failed to update");

                assert_eq!(updated.id, car.id);
                assert_eq!(updated.model, "Tesla Model 3001");
                let cars = db.get_all_cars().expect("Query failed");
                assert_eq!(cars.len(), 1);
                assert_eq!(cars[0].model, "Tesla Model 3001");
            }

            it "keeps owners and transportations when updating" {
                let car = insert_car(&db, "Tesla Model 3");
                let owner = create_customer(&db, "Ada");
                db.add_owner(Ownership { car_id: car.id, customer_id: owner.id }).expect("Failed to add owner");
                let trip = book_trip(&db, &car, &owner);

                let updated = db.save_car(CarUpsert::Update(car.id, CarFields::new("Model Y")))
                    .expect("Failed to update");

                assert_eq!(updated.owners, vec![owner.id]);
                assert_eq!(updated.transportations, vec![trip]);
            }

            it "fails with NotFound when updating an unknown id" {
                let missing = CarId::from(Uuid::new_v4());

                let result = db.save_car(CarUpsert::Update(missing, CarFields::new("Ghost")));

                assert!(matches!(result, Err(Error::NotFound { entity: "car", .. })));
                assert!(db.get_all_cars().expect("Query failed").is_empty());
            }
        }

        describe "get_car" {
            it "returns None for a non-existent car" {
                let result = db.get_car(CarId::from(Uuid::new_v4())).expect("Query failed");
                assert!(result.is_none());
            }

            it "round trips every field but the id" {
                let car = insert_car(&db, "Renault Zoe");
                let found = db.get_car(car.id).expect("Query failed").expect("Car missing");
                assert_eq!(found, car);
            }
        }

        describe "get_all_cars" {
            it "returns an empty list when no cars exist" {
                let cars = db.get_all_cars().expect("Query failed");
                assert!(cars.is_empty());
            }

            it "returns all cars ordered by model" {
                insert_car(&db, "Tesla Model 3");
                insert_car(&db, "Renault Zoe");

                let cars = db.get_all_cars().expect("Query failed");
                assert_eq!(cars.len(), 2);
                assert_eq!(cars[0].model, "Renault Zoe");
                assert_eq!(cars[1].model, "Tesla Model 3");
            }

            it "resolves owners and transportations" {
                let car = insert_car(&db, "Renault Zoe");
                let owner = create_customer(&db, "Ada");
                let passenger = create_customer(&db, "Grace");
                db.add_owner(Ownership { car_id: car.id, customer_id: owner.id }).expect("Failed to add owner");
                let trip = book_trip(&db, &car, &passenger);

                let cars = db.get_all_cars().expect("Query failed");
                assert_eq!(cars[0].owners, vec![owner.id]);
                assert_eq!(cars[0].transportations, vec![trip]);
            }
        }

        describe "delete_car" {
            it "returns false for an unknown id" {
                let deleted = db.delete_car(CarId::from(Uuid::new_v4())).expect("Delete failed");
                assert!(!deleted);
            }

            it "removes the car and its ownership links" {
                let car = insert_car(&db, "Tesla Model 3");
                let owner = create_customer(&db, "Ada");
                db.add_owner(Ownership { car_id: car.id, customer_id: owner.id }).expect("Failed to add owner");

                assert!(db.delete_car(car.id).expect("Delete failed"));

                assert!(db.get_car(car.id).expect("Query failed").is_none());
                assert!(db.get_owners(car.id).expect("Query failed").is_empty());
                assert!(db.get_cars_by_owner(owner.id).expect("Query failed").is_empty());
                assert!(db.get_customer(owner.id).expect("Query failed").is_some());
            }

            it "cascades to transportations by default" {
                assert_eq!(db.delete_policy(), DeletePolicy::Cascade);
                let car = insert_car(&db, "Tesla Model 3");
                let passenger = create_customer(&db, "Grace");
                let trip = book_trip(&db, &car, &passenger);

                db.delete_car(car.id).expect("Delete failed");

                assert!(db.get_transportation(trip.id).expect("Query failed").is_none());
            }

            it "blocks while transportations reference the car" {
                let db = db.clone().with_delete_policy(DeletePolicy::Block);
                let car = insert_car(&db, "Tesla Model 3");
                let passenger = create_customer(&db, "Grace");
                let trip = book_trip(&db, &car, &passenger);

                let result = db.delete_car(car.id);

                assert!(matches!(result, Err(Error::Conflict(_))));
                assert!(db.get_car(car.id).expect("Query failed").is_some());
                assert!(db.get_transportation(trip.id).expect("Query failed").is_some());
            }

            it "deletes an unreferenced car under the block policy" {
                let db = db.clone().with_delete_policy(DeletePolicy::Block);
                let car = insert_car(&db, "Tesla Model 3");

                assert!(db.delete_car(car.id).expect("Delete failed"));
            }

            it "detaches transportations under the detach policy" {
                let db = db.clone().with_delete_policy(DeletePolicy::Detach);
                let car = insert_car(&db, "Tesla Model 3");
                let passenger = create_customer(&db, "Grace");
                let trip = book_trip(&db, &car, &passenger);

                db.delete_car(car.id).expect("Delete failed");

                let orphan = db.get_transportation(trip.id).expect("Query failed").expect("Trip missing");
                assert!(orphan.car_id.is_none());
                assert_eq!(orphan.passenger_id, passenger.id);
            }
        }
    }

    describe "ownership" {
        it "links one car to many owners and one owner to many cars" {
            let zoe = insert_car(&db, "Renault Zoe");
            let tesla = insert_car(&db, "Tesla Model 3");
            let ada = create_customer(&db, "Ada");
            let grace = create_customer(&db, "Grace");

            db.add_owner(Ownership { car_id: zoe.id, customer_id: ada.id }).expect("Failed");
            db.add_owner(Ownership { car_id: zoe.id, customer_id: grace.id }).expect("Failed");
            db.add_owner(Ownership { car_id: tesla.id, customer_id: ada.id }).expect("Failed");

            assert_eq!(db.get_owners(zoe.id).expect("Query failed").len(), 2);
            let owned: Vec<CarId> = db.get_cars_by_owner(ada.id).expect("Query failed")
                .into_iter().map(|c| c.id).collect();
            assert_eq!(owned, vec![zoe.id, tesla.id]);
        }

        it "ignores a duplicate link" {
            let car = insert_car(&db, "Renault Zoe");
            let ada = create_customer(&db, "Ada");
            let link = Ownership { car_id: car.id, customer_id: ada.id };

            db.add_owner(link).expect("Failed");
            db.add_owner(link).expect("Failed");

            assert_eq!(db.get_owners(car.id).expect("Query failed"), vec![ada.id]);
        }

        it "rejects links to unknown rows" {
            let car = insert_car(&db, "Renault Zoe");
            let ada = create_customer(&db, "Ada");

            let no_customer = db.add_owner(Ownership { car_id: car.id, customer_id: CustomerId::from(Uuid::new_v4()) });
            let no_car = db.add_owner(Ownership { car_id: CarId::from(Uuid::new_v4()), customer_id: ada.id });

            assert!(matches!(no_customer, Err(Error::NotFound { entity: "customer", .. })));
            assert!(matches!(no_car, Err(Error::NotFound { entity: "car", .. })));
        }

        it "removes a link and reports whether it existed" {
            let car = insert_car(&db, "Renault Zoe");
            let ada = create_customer(&db, "Ada");
            let link = Ownership { car_id: car.id, customer_id: ada.id };
            db.add_owner(link).expect("Failed");

            assert!(db.remove_owner(link).expect("Remove failed"));
            assert!(!db.remove_owner(link).expect("Remove failed"));
            assert!(db.get_owners(car.id).expect("Query failed").is_empty());
        }
    }

    describe "transportations" {
        it "stores the trip window and both references" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");

            let trip = book_trip(&db, &car, &passenger);

            let found = db.get_transportation(trip.id).expect("Query failed").expect("Trip missing");
            assert_eq!(found.transportation_start, date(1));
            assert_eq!(found.transportation_end, date(3));
            assert_eq!(found.car_id, Some(car.id));
            assert_eq!(found.passenger_id, passenger.id);
        }

        it "allows a single day trip" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");

            let trip = db.create_transportation(CreateTransportationInput {
                transportation_start: date(5),
                transportation_end: date(5),
                car_id: car.id,
                passenger_id: passenger.id,
            });

            assert!(trip.is_ok());
        }

        it "rejects a window that ends before it starts" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");

            let result = db.create_transportation(CreateTransportationInput {
                transportation_start: date(4),
                transportation_end: date(2),
                car_id: car.id,
                passenger_id: passenger.id,
            });

            assert!(matches!(result, Err(Error::Validation(_))));
        }

        it "requires an existing car and passenger" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");

            let no_car = db.create_transportation(CreateTransportationInput {
                transportation_start: date(1),
                transportation_end: date(2),
                car_id: CarId::from(Uuid::new_v4()),
                passenger_id: passenger.id,
            });
            let no_passenger = db.create_transportation(CreateTransportationInput {
                transportation_start: date(1),
                transportation_end: date(2),
                car_id: car.id,
                passenger_id: CustomerId::from(Uuid::new_v4()),
            });

            assert!(matches!(no_car, Err(Error::NotFound { entity: "car", .. })));
            assert!(matches!(no_passenger, Err(Error::NotFound { entity: "customer", .. })));
        }

        it "lists the trips of a car ordered by start date" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");
            let later = db.create_transportation(CreateTransportationInput {
                transportation_start: date(10),
                transportation_end: date(12),
                car_id: car.id,
                passenger_id: passenger.id,
            }).expect("Failed");
            let earlier = book_trip(&db, &car, &passenger);

            let trips = db.get_transportations_by_car(car.id).expect("Query failed");
            assert_eq!(trips, vec![earlier, later]);
        }

        it "deletes a trip without touching the car" {
            let car = insert_car(&db, "Renault Zoe");
            let passenger = create_customer(&db, "Grace");
            let trip = book_trip(&db, &car, &passenger);

            assert!(db.delete_transportation(trip.id).expect("Delete failed"));
            assert!(!db.delete_transportation(trip.id).expect("Delete failed"));
            let found = db.get_car(car.id).expect("Query failed").expect("Car missing");
            assert!(found.transportations.is_empty());
        }
    }

    describe "file backed database" {
        it "persists cars across reopen" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("carpool.db");

            let car = {
                let db = Database::open(path.clone()).expect("Failed to open");
                db.migrate().expect("Failed to migrate");
                insert_car(&db, "Renault Zoe")
            };

            let reopened = Database::open(path).expect("Failed to reopen");
            reopened.migrate().expect("Failed to migrate");
            let found = reopened.get_car(car.id).expect("Query failed");
            assert_eq!(found.map(|c| c.model), Some("Renault Zoe".to_string()));
        }
    }
}
