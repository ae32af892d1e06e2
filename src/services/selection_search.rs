//! Filtro de búsqueda sobre pares conductor-coche
//!
//! Traduce los parámetros de búsqueda de la query string a un filtro tipado.
//! Las claves reconocidas son exactamente las columnas de búsqueda expuestas;
//! una clave desconocida o un valor no interpretable se rechazan, nunca se
//! ignoran en silencio.

use std::collections::HashMap;
use std::str::FromStr;

use crate::models::car::Car;
use crate::models::driver::{Driver, OnlineStatus};
use crate::utils::errors::{AppError, AppResult};

/// Filtro compuesto: AND de todos los campos presentes. Sin campos, el
/// filtro acepta cualquier fila.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionFilter {
    pub username: Option<String>,
    pub online_status: Option<OnlineStatus>,
    pub license_plate: Option<String>,
    pub convertible: Option<bool>,
    pub rating: Option<f32>,
    pub engine_type: Option<String>,
    pub manufacturer: Option<String>,
}

impl SelectionFilter {
    pub fn from_params(params: &HashMap<String, String>) -> AppResult<Self> {
        let mut filter = SelectionFilter::default();

        for (key, value) in params {
            match key.as_str() {
                "username" => filter.username = Some(value.clone()),
                "onlineStatus" => {
                    let status = OnlineStatus::from_str(value).map_err(|_| {
                        AppError::InvalidFilter(format!(
                            "'{}' is not a valid value for 'onlineStatus'",
                            value
                        ))
                    })?;
                    filter.online_status = Some(status);
                }
                "licensePlate" => filter.license_plate = Some(value.clone()),
                "convertible" => {
                    let convertible = value.parse::<bool>().map_err(|_| {
                        AppError::InvalidFilter(format!(
                            "'{}' is not a valid value for 'convertible'",
                            value
                        ))
                    })?;
                    filter.convertible = Some(convertible);
                }
                "rating" => {
                    let rating = value.parse::<f32>().map_err(|_| {
                        AppError::InvalidFilter(format!(
                            "'{}' is not a valid value for 'rating'",
                            value
                        ))
                    })?;
                    filter.rating = Some(rating);
                }
                "engineType" => filter.engine_type = Some(value.clone()),
                "manufacturer" => filter.manufacturer = Some(value.clone()),
                other => {
                    return Err(AppError::InvalidFilter(format!(
                        "unknown search parameter '{}'",
                        other
                    )));
                }
            }
        }

        Ok(filter)
    }

    /// Evalúa el filtro contra una fila unida conductor + coche. Es la misma
    /// semántica que aplica el backend Postgres en SQL: substring para
    /// username, licensePlate y manufacturer; igualdad exacta para el resto.
    pub fn matches(&self, driver: &Driver, car: &Car) -> bool {
        if let Some(username) = &self.username {
            if !driver.username.contains(username.as_str()) {
                return false;
            }
        }
        if let Some(status) = self.online_status {
            if driver.online_status != status {
                return false;
            }
        }
        if let Some(license_plate) = &self.license_plate {
            if !car.license_plate.contains(license_plate.as_str()) {
                return false;
            }
        }
        if let Some(convertible) = self.convertible {
            if car.convertible != convertible {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if car.rating != Some(rating) {
                return false;
            }
        }
        if let Some(engine_type) = &self.engine_type {
            if car.engine_type.as_deref() != Some(engine_type.as_str()) {
                return false;
            }
        }
        if let Some(manufacturer) = &self.manufacturer {
            match &car.manufacturer {
                Some(value) if value.contains(manufacturer.as_str()) => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::car::CarStatus;
    use chrono::Utc;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn driver(username: &str, status: OnlineStatus) -> Driver {
        Driver {
            id: 1,
            username: username.to_string(),
            password: "hash".to_string(),
            online_status: status,
            longitude: None,
            latitude: None,
            deleted: false,
            date_created: Utc::now(),
        }
    }

    fn car(license_plate: &str, manufacturer: &str, convertible: bool) -> Car {
        Car {
            id: 2,
            license_plate: license_plate.to_string(),
            convertible,
            rating: Some(4.5),
            engine_type: Some("ELECTRIC".to_string()),
            manufacturer: Some(manufacturer.to_string()),
            car_status: CarStatus::Active,
            date_created: Utc::now(),
        }
    }

    #[test]
    fn test_empty_params_match_everything() {
        let filter = SelectionFilter::from_params(&HashMap::new()).unwrap();
        assert_eq!(filter, SelectionFilter::default());
        assert!(filter.matches(
            &driver("driver01", OnlineStatus::Offline),
            &car("AB-123-CD", "Audi", false)
        ));
    }

    #[test]
    fn test_all_keys_are_parsed() {
        let filter = SelectionFilter::from_params(&params(&[
            ("username", "driver"),
            ("onlineStatus", "online"),
            ("licensePlate", "123"),
            ("convertible", "true"),
            ("rating", "4.5"),
            ("engineType", "ELECTRIC"),
            ("manufacturer", "Audi"),
        ]))
        .unwrap();

        assert_eq!(filter.username.as_deref(), Some("driver"));
        assert_eq!(filter.online_status, Some(OnlineStatus::Online));
        assert_eq!(filter.license_plate.as_deref(), Some("123"));
        assert_eq!(filter.convertible, Some(true));
        assert_eq!(filter.rating, Some(4.5));
        assert_eq!(filter.engine_type.as_deref(), Some("ELECTRIC"));
        assert_eq!(filter.manufacturer.as_deref(), Some("Audi"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = SelectionFilter::from_params(&params(&[("color", "red")]));
        assert!(matches!(result, Err(AppError::InvalidFilter(_))));
    }

    #[test]
    fn test_bogus_online_status_is_rejected() {
        let result = SelectionFilter::from_params(&params(&[("onlineStatus", "bogus")]));
        assert!(matches!(result, Err(AppError::InvalidFilter(_))));
    }

    #[test]
    fn test_bogus_convertible_and_rating_are_rejected() {
        assert!(matches!(
            SelectionFilter::from_params(&params(&[("convertible", "maybe")])),
            Err(AppError::InvalidFilter(_))
        ));
        assert!(matches!(
            SelectionFilter::from_params(&params(&[("rating", "five")])),
            Err(AppError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_username_match_is_case_sensitive_substring() {
        let filter = SelectionFilter::from_params(&params(&[("username", "river")])).unwrap();
        assert!(filter.matches(
            &driver("driver01", OnlineStatus::Offline),
            &car("AB-123-CD", "Audi", false)
        ));

        let filter = SelectionFilter::from_params(&params(&[("username", "RIVER")])).unwrap();
        assert!(!filter.matches(
            &driver("driver01", OnlineStatus::Offline),
            &car("AB-123-CD", "Audi", false)
        ));
    }

    #[test]
    fn test_combined_filters_are_anded() {
        let filter = SelectionFilter::from_params(&params(&[
            ("manufacturer", "Audi"),
            ("convertible", "true"),
        ]))
        .unwrap();

        let d = driver("driver01", OnlineStatus::Offline);
        assert!(filter.matches(&d, &car("AB-123-CD", "Audi Sport", true)));
        // manufacturer coincide pero convertible no
        assert!(!filter.matches(&d, &car("AB-123-CD", "Audi Sport", false)));
        // convertible coincide pero manufacturer no
        assert!(!filter.matches(&d, &car("AB-123-CD", "BMW", true)));
    }

    #[test]
    fn test_missing_optional_car_fields_do_not_match() {
        let filter =
            SelectionFilter::from_params(&params(&[("manufacturer", "Audi")])).unwrap();
        let mut no_manufacturer = car("AB-123-CD", "Audi", false);
        no_manufacturer.manufacturer = None;
        assert!(!filter.matches(&driver("driver01", OnlineStatus::Offline), &no_manufacturer));
    }
}
