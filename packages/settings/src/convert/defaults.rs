//! The default converter set.
//!
//! Every string-convertible type gets a pair of converters: its canonical
//! culture-invariant string form, and a parser accepting that form.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use url::Url;
use uuid::Uuid;

use crate::convert::ConverterRegistry;
use crate::datetime::TaggedDateTime;
use crate::ConversionError;

fn parse<T>(source: &String) -> Result<T, ConversionError>
where
    T: FromStr,
    T::Err: Display,
{
    source
        .trim()
        .parse::<T>()
        .map_err(|e| ConversionError::failed::<String, T>(e.to_string()))
}

fn parse_bool(source: &String) -> Result<bool, ConversionError> {
    let trimmed = source.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Ok(false)
    } else {
        Err(ConversionError::failed::<String, bool>(format!(
            "'{}' is not a boolean",
            source
        )))
    }
}

fn parse_char(source: &String) -> Result<char, ConversionError> {
    let mut chars = source.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConversionError::failed::<String, char>(format!(
            "expected exactly one character, got '{}'",
            source
        ))),
    }
}

fn parse_decimal(source: &String) -> Result<Decimal, ConversionError> {
    let trimmed = source.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| ConversionError::failed::<String, Decimal>(e.to_string()))
}

fn parse_url(source: &String) -> Result<Url, ConversionError> {
    Url::parse(source.trim()).map_err(|e| ConversionError::failed::<String, Url>(e.to_string()))
}

fn parse_tagged(source: &String) -> Result<TaggedDateTime, ConversionError> {
    source.parse()
}

fn parse_offset(source: &String) -> Result<DateTime<FixedOffset>, ConversionError> {
    let trimmed = source.trim();
    DateTime::parse_from_rfc3339(trimmed).or_else(|e| {
        // a kind-tagged value written by one of the zone-less types
        trimmed
            .parse::<TaggedDateTime>()
            .map(|tagged| tagged.to_utc().fixed_offset())
            .map_err(|_| ConversionError::failed::<String, DateTime<FixedOffset>>(e.to_string()))
    })
}

fn display<T: Display>(source: &T) -> Result<String, ConversionError> {
    Ok(source.to_string())
}

macro_rules! register_parsed {
    ($registry:expr, $($ty:ty),* $(,)?) => {
        $(
            $registry.register(parse::<$ty>);
            $registry.register(display::<$ty>);
        )*
    };
}

/// Register the default converters into `registry`.
pub fn register_defaults(registry: &ConverterRegistry) {
    register_parsed!(registry, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

    registry.register(parse_bool);
    registry.register(display::<bool>);

    registry.register(parse_char);
    registry.register(display::<char>);

    registry.register(parse_decimal);
    registry.register(display::<Decimal>);

    registry.register(parse::<Uuid>);
    registry.register(|guid: &Uuid| Ok(guid.hyphenated().to_string()));

    registry.register(parse_url);
    registry.register(|url: &Url| Ok(url.as_str().to_string()));

    registry.register(|s: &String| parse_tagged(s).map(|tagged| tagged.to_utc()));
    registry.register(|dt: &DateTime<Utc>| Ok(TaggedDateTime::from_utc(dt).to_string()));

    registry.register(|s: &String| parse_tagged(s).map(|tagged| tagged.to_local()));
    registry.register(|dt: &DateTime<Local>| Ok(TaggedDateTime::from_local(dt).to_string()));

    registry.register(|s: &String| parse_tagged(s).map(|tagged| tagged.to_naive()));
    registry.register(|dt: &NaiveDateTime| Ok(TaggedDateTime::from_naive(dt).to_string()));

    registry.register(parse_offset);
    registry.register(|dt: &DateTime<FixedOffset>| {
        Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
    });
}
