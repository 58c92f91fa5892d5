//! Client of the factory: a police car database.
//!
//! Each registration keeps its own extrinsic state (plates, owner) next to a
//! handle to the shared car model.

use crate::error::CacheError;
use crate::factory::{FlyweightFactory, Lookup};
use crate::record::{CarModel, SharedRecord};
use tracing::info;

#[derive(Debug, Clone)]
pub struct Registration {
    pub plates: String,
    pub owner: String,
    pub model: SharedRecord<CarModel>,
}

impl Registration {
    /// Runs the shared record's operation with this registration's state.
    pub fn describe(&self) -> Result<String, CacheError> {
        self.model.operation(&[&self.plates, &self.owner])
    }
}

#[derive(Debug, Default)]
pub struct CarRegistry {
    factory: FlyweightFactory<CarModel>,
    registrations: Vec<Registration>,
}

impl CarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(factory: FlyweightFactory<CarModel>) -> Self {
        CarRegistry {
            factory,
            registrations: Vec::new(),
        }
    }

    /// The fleet the demo database starts from.
    pub fn police_fleet() -> Vec<CarModel> {
        vec![
            CarModel::new("Chevrolet", "Camaro2018", "pink"),
            CarModel::new("Mercedes Benz", "C300", "black"),
            CarModel::new("Mercedes Benz", "C500", "red"),
            CarModel::new("BMW", "M5", "red"),
            CarModel::new("BMW", "X6", "white"),
        ]
    }

    pub fn add_car(
        &mut self,
        plates: &str,
        owner: &str,
        brand: &str,
        model: &str,
        color: &str,
    ) -> Result<&Registration, CacheError> {
        self.register(plates, owner, CarModel::new(brand, model, color))
    }

    pub fn register(
        &mut self,
        plates: &str,
        owner: &str,
        car: CarModel,
    ) -> Result<&Registration, CacheError> {
        if plates.trim().is_empty() {
            return Err(CacheError::invalid_input("plates must not be blank"));
        }
        if owner.trim().is_empty() {
            return Err(CacheError::invalid_input("owner must not be blank"));
        }

        let (model, outcome) = self.factory.lookup(car);
        info!(
            plates,
            key = %model.key(),
            reused = outcome == Lookup::Hit,
            "registered car"
        );

        self.registrations.push(Registration {
            plates: plates.to_string(),
            owner: owner.to_string(),
            model,
        });
        self.registrations
            .last()
            .ok_or_else(|| CacheError::invalid_input("registration was not stored"))
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn factory(&self) -> &FlyweightFactory<CarModel> {
        &self.factory
    }
}
