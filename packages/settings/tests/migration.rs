use std::fs;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use typed_settings::{Setting, Settings, SettingsService, UntypedProperty};
use typed_settings_stores::FileBackend;

mod common;
use common::{ada, fixtures, Person};

#[test]
fn test_guid_reads_back_as_string() {
    let guid = Uuid::new_v4();
    for fixture in fixtures() {
        fixture.service.add_or_update("id", guid).unwrap();
        let read = fixture.service.get_or_default("id", String::new()).unwrap();
        assert_eq!(read, guid.hyphenated().to_string(), "on {}", fixture.name);
    }
}

#[test]
fn test_int_reads_back_as_double() {
    for fixture in fixtures() {
        fixture.service.add_or_update("n", 999i32).unwrap();
        let read = fixture.service.get_or_default("n", 0.0f64).unwrap();
        assert_eq!(read, 999.0, "on {}", fixture.name);

        let widened = fixture.service.get_or_default("n", 0i64).unwrap();
        assert_eq!(widened, 999, "on {}", fixture.name);
    }
}

#[test]
fn test_string_reads_back_as_number() {
    for fixture in fixtures() {
        fixture.service.add_or_update("n", "12".to_string()).unwrap();
        assert_eq!(fixture.service.get_or_default("n", 0u8).unwrap(), 12);
        assert_eq!(fixture.service.get_or_default("n", 0.0f32).unwrap(), 12.0);
    }
}

#[test]
fn test_incompatible_type_reads_default() {
    for fixture in fixtures() {
        fixture.service.add_or_update("name", "Ada".to_string()).unwrap();
        assert_eq!(fixture.service.get_or_default("name", 7i32).unwrap(), 7);
        assert_eq!(fixture.service.get_or_default("name", Uuid::nil()).unwrap(), Uuid::nil());
        assert!(fixture.service.get_or_default("name", true).unwrap());

        fixture.service.add_or_update("big", i64::MAX).unwrap();
        assert_eq!(fixture.service.get_or_default("big", -1i32).unwrap(), -1);
    }
}

#[test]
fn test_utc_reads_back_as_local_instant() {
    let utc = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();
    for fixture in fixtures() {
        fixture.service.add_or_update("when", utc).unwrap();
        let local: DateTime<Local> = fixture
            .service
            .get_or_default("when", Local::now())
            .unwrap();
        assert_eq!(local.with_timezone(&Utc), utc);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Contact {
    name: String,
    #[serde(default)]
    email: Option<String>,
}

impl Setting for Contact {}

#[test]
fn test_object_reads_back_as_compatible_type() {
    for fixture in fixtures() {
        fixture.service.add_or_update("who", ada()).unwrap();
        let default = Contact {
            name: "nobody".to_string(),
            email: None,
        };
        let contact = fixture.service.get_or_default("who", default).unwrap();
        assert_eq!(contact.name, "Ada");
        assert_eq!(contact.email, None);
    }
}

#[test]
fn test_corrupt_object_reads_default() {
    for fixture in fixtures() {
        fixture.service.add_or_update("who", "{ broken".to_string()).unwrap();
        let person = fixture
            .service
            .get_or_default("who", common::nobody())
            .unwrap();
        assert_eq!(person, common::nobody());
    }
}

#[test]
fn test_bare_json_object_is_readable() {
    for fixture in fixtures() {
        fixture
            .service
            .add_or_update("who", r#"{"name":"Ada","age":36}"#.to_string())
            .unwrap();
        let person: Person = fixture.service.get_or_default("who", common::nobody()).unwrap();
        assert_eq!(person, ada());
    }
}

#[test]
fn test_legacy_tick_values_are_readable() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("installed"), "630822816000000000").unwrap();

    let service = SettingsService::new(FileBackend::new(dir.path()).unwrap());
    let read = service
        .get_or_default("installed", NaiveDateTime::default())
        .unwrap();
    assert_eq!(
        read,
        NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}

#[test]
fn test_migration_through_untyped_properties() {
    let guid = Uuid::new_v4();
    for fixture in fixtures() {
        let service = &fixture.service;
        let as_guid = typed_settings::SettingsProperty::new(service, "id", Uuid::nil()).unwrap();
        let as_string =
            typed_settings::SettingsProperty::new(service, "id", String::new()).unwrap();

        let properties: Vec<&dyn UntypedProperty> = vec![&as_guid, &as_string];
        properties[0].set_untyped(Box::new(guid)).unwrap();

        let read = properties[1].get_untyped().unwrap();
        assert_eq!(
            read.downcast_ref::<String>(),
            Some(&guid.hyphenated().to_string())
        );
    }
}
