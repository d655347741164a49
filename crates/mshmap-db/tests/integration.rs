//! Offline unit tests for mshmap-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use mshmap_core::{AppConfig, Environment, LocationRecord};
use mshmap_db::{LocationRow, PoolConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        analytics_config_path: None,
        trigger_tokens: Vec::new(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        scheduler_enabled: false,
        daily_cron: "0 0 3 * * *".to_string(),
        weekly_cron: "0 0 6 * * Sun".to_string(),
        schedule_timezone: chrono_tz::Europe::Berlin,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

fn location_row(latitude: Option<f64>, longitude: Option<f64>) -> LocationRow {
    LocationRow {
        id: "spielplatz-rosarium".to_string(),
        name: "Spielplatz am Rosarium".to_string(),
        category: Some("playground".to_string()),
        latitude,
        longitude,
        rating: Some(4.2),
        city: Some("Sangerhausen".to_string()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn location_row_with_coordinates_maps_to_record() {
    let record = LocationRecord::from(location_row(Some(51.47), Some(11.3)));

    assert_eq!(record.id, "spielplatz-rosarium");
    assert_eq!(record.category.as_deref(), Some("playground"));
    let coords = record.coordinates.expect("coordinates present");
    assert_eq!(coords.latitude, 51.47);
    assert_eq!(coords.longitude, 11.3);
    assert_eq!(record.city_hint(), Some("Sangerhausen"));
}

#[test]
fn location_row_with_half_coordinates_has_none() {
    let record = LocationRecord::from(location_row(Some(51.47), None));
    assert!(record.coordinates.is_none());
}
