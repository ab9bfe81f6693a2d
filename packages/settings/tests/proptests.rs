use proptest::prelude::*;
use rust_decimal::Decimal;

use typed_settings::{Settings, SettingsService};
use typed_settings_stores::{JsonFileBackend, MemoryBackend};

fn both() -> [SettingsService<MemoryBackend>; 2] {
    [
        SettingsService::new(MemoryBackend::new()),
        SettingsService::new(MemoryBackend::string_only()),
    ]
}

proptest! {
    /// Integers survive both the native and the string path.
    #[test]
    fn prop_i64_roundtrip(v in any::<i64>()) {
        for service in both() {
            service.add_or_update("v", v).unwrap();
            prop_assert_eq!(service.get_or_default("v", 0i64).unwrap(), v);
        }
    }

    #[test]
    fn prop_u64_roundtrip(v in any::<u64>()) {
        for service in both() {
            service.add_or_update("v", v).unwrap();
            prop_assert_eq!(service.get_or_default("v", 0u64).unwrap(), v);
        }
    }

    /// Finite doubles come back with the same bits.
    #[test]
    fn prop_f64_bit_exact(v in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO) {
        for service in both() {
            service.add_or_update("v", v).unwrap();
            let read: f64 = service.get_or_default("v", f64::NAN).unwrap();
            prop_assert_eq!(read.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn prop_f32_bit_exact(v in prop::num::f32::NORMAL | prop::num::f32::ZERO) {
        for service in both() {
            service.add_or_update("v", v).unwrap();
            let read: f32 = service.get_or_default("v", f32::NAN).unwrap();
            prop_assert_eq!(read.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn prop_string_roundtrip(v in ".*") {
        for service in both() {
            service.add_or_update("v", v.clone()).unwrap();
            prop_assert_eq!(service.get_or_default("v", String::new()).unwrap(), v.clone());
        }
    }

    #[test]
    fn prop_char_roundtrip(v in any::<char>()) {
        for service in both() {
            service.add_or_update("v", v).unwrap();
            prop_assert_eq!(service.get_or_default("v", '?').unwrap(), v);
        }
    }

    /// Decimals keep both value and scale.
    #[test]
    fn prop_decimal_roundtrip(mantissa in any::<i64>(), scale in 0u32..=28) {
        let v = Decimal::new(mantissa, scale);
        for service in both() {
            service.add_or_update("v", v).unwrap();
            let read = service.get_or_default("v", Decimal::ZERO).unwrap();
            prop_assert_eq!(read, v);
            prop_assert_eq!(read.scale(), v.scale());
        }
    }

    /// Any key the validator accepts can be used.
    #[test]
    fn prop_valid_keys_work(key in "\\PC{1,255}") {
        let service = SettingsService::new(MemoryBackend::new());
        service.add_or_update(&key, 1u8).unwrap();
        prop_assert_eq!(service.get_or_default(&key, 0u8).unwrap(), 1);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Doubles written to a JSON file read back with the same bits after
    /// the file is reopened.
    #[test]
    fn prop_f64_bit_exact_in_reopened_json_file(
        v in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        SettingsService::new(JsonFileBackend::open(&path).unwrap())
            .add_or_update("v", v)
            .unwrap();

        let service = SettingsService::new(JsonFileBackend::open(&path).unwrap());
        let read: f64 = service.get_or_default("v", f64::NAN).unwrap();
        prop_assert_eq!(read.to_bits(), v.to_bits());
    }
}
