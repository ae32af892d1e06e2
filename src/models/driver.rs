//! Modelo de Driver
//!
//! Este módulo contiene el struct Driver y su estado online.
//! Mapea exactamente al schema PostgreSQL con primary key 'id'.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use std::fmt;
use std::str::FromStr;

/// Estado online del conductor - mapea al ENUM online_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "online_status")]
pub enum OnlineStatus {
    #[sqlx(rename = "ONLINE")]
    #[serde(rename = "ONLINE")]
    Online,
    #[sqlx(rename = "OFFLINE")]
    #[serde(rename = "OFFLINE")]
    Offline,
}

impl FromStr for OnlineStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(OnlineStatus::Online),
            "OFFLINE" => Ok(OnlineStatus::Offline),
            other => Err(format!("unknown online status '{}'", other)),
        }
    }
}

impl fmt::Display for OnlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnlineStatus::Online => write!(f, "ONLINE"),
            OnlineStatus::Offline => write!(f, "OFFLINE"),
        }
    }
}

/// Driver principal - mapea exactamente a la tabla driver
#[derive(Debug, Clone, FromRow)]
pub struct Driver {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub online_status: OnlineStatus,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub deleted: bool,
    pub date_created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_status_from_str() {
        assert_eq!("online".parse::<OnlineStatus>(), Ok(OnlineStatus::Online));
        assert_eq!("OFFLINE".parse::<OnlineStatus>(), Ok(OnlineStatus::Offline));
        assert_eq!("OnLiNe".parse::<OnlineStatus>(), Ok(OnlineStatus::Online));
        assert!("bogus".parse::<OnlineStatus>().is_err());
    }

    #[test]
    fn test_online_status_display() {
        assert_eq!(OnlineStatus::Online.to_string(), "ONLINE");
        assert_eq!(OnlineStatus::Offline.to_string(), "OFFLINE");
    }
}
