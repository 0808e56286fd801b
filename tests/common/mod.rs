#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::{America::New_York, Tz};
use fake::faker::lorem::en::Word;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

use shiftclock::database::models::Location;
use shiftclock::database::repositories::{InMemoryLocationDirectory, InMemoryShiftStore};
use shiftclock::services::auth::issue_token;
use shiftclock::services::FixedClock;
use shiftclock::{AppState, Config};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-key-that-is-long-enough";

/// Builds an initialised actix test service over a [`TestContext`].
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.app_state())
                .app_data($ctx.config_data())
                .configure(shiftclock::routes::configure),
        )
        .await
    };
}

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory stores, a clock that only moves when told to, and one known location.
pub struct TestContext {
    pub shifts: InMemoryShiftStore,
    pub locations: InMemoryLocationDirectory,
    pub clock: FixedClock,
    pub config: Config,
    pub location: Location,
    state: web::Data<AppState>,
}

impl TestContext {
    pub fn new(now: DateTime<Tz>) -> Self {
        setup_test_env();

        let location = Location::new("Harbor Street Store", Some("12 Harbor St".to_string()))
            .with_post_code("02110");
        let locations = InMemoryLocationDirectory::with_locations(vec![location.clone()]);
        let shifts = InMemoryShiftStore::new();
        let clock = FixedClock::new(now);

        let state = web::Data::new(AppState::new(
            Arc::new(shifts.clone()),
            Arc::new(locations.clone()),
            Arc::new(clock.clone()),
        ));

        let config = Config {
            database_url: None,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            client_base_url: "http://localhost:3000".to_string(),
            shift_timezone: now.timezone(),
            seed_locations: vec![],
        };

        Self {
            shifts,
            locations,
            clock,
            config,
            location,
            state,
        }
    }

    /// 2025-06-17 in New York at the given wall time.
    pub fn new_york(hour: u32, minute: u32) -> Self {
        Self::new(june_17(hour, minute))
    }

    pub fn app_state(&self) -> web::Data<AppState> {
        self.state.clone()
    }

    pub fn config_data(&self) -> web::Data<Config> {
        web::Data::new(self.config.clone())
    }

    pub fn set_time(&self, hour: u32, minute: u32) {
        self.clock.set(june_17(hour, minute));
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        issue_token(user_id, &self.config.jwt_secret, Duration::hours(1))
            .expect("failed to sign test token")
    }

    pub fn auth_header(&self, user_id: Uuid) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token_for(user_id)))
    }

    pub fn shift_body(&self, date: &str, start: &str, finish: &str) -> Value {
        shift_body(self.location.id, date, start, finish)
    }
}

pub fn june_17(hour: u32, minute: u32) -> DateTime<Tz> {
    New_York
        .with_ymd_and_hms(2025, 6, 17, hour, minute, 0)
        .single()
        .expect("unambiguous test instant")
}

pub fn shift_body(location_id: Uuid, date: &str, start: &str, finish: &str) -> Value {
    let word: String = Word().fake();
    json!({
        "title": format!("{} shift", word),
        "role": "Cashier",
        "typeOfShift": ["front-of-house"],
        "startTime": start,
        "finishTime": finish,
        "locationId": location_id.to_string(),
        "date": date,
    })
}
