//! Road-position descriptor parsing.
//!
//! A descriptor names a provincial highway and a chainage along it in
//! kilometer+meter notation, the way road signs and survey sheets write
//! positions:
//!
//! - `台27線45K+200` — 45 km plus 200 m → 45 200 m
//! - `台9線136.7K` — decimal kilometers → 136 700 m
//! - `台8甲12K+600` — line-type suffix omitted; normalized to `台8甲線`
//!
//! Both notations denominate to the same meter value, and a road name
//! missing the `線` suffix gains it, so every parse yields a canonical
//! [`PositionQuery`].

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MilepostError, Result};
use crate::milestone::PositionQuery;

/// Line-type suffix appended to road names that omit it.
const LINE_SUFFIX: char = '線';

/// Descriptor grammar: road token (class marker + route number + optional
/// branch character + optional suffix), kilometers (integer or decimal),
/// `K` marker, optional `+meters` with optional whitespace around the `+`.
fn descriptor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(台\d+[甲乙丙丁戊]?線?)\s*([0-9]+(?:\.[0-9]+)?)\s*[kK]\s*\+?\s*(\d+)?")
            .expect("descriptor regex is valid")
    })
}

/// Parse a road-position descriptor into a structured query.
///
/// Pure function of its input; no side effects.
///
/// # Examples
///
/// ```
/// use milepost::descriptor::parse;
///
/// let query = parse("台27線45k+200").unwrap();
/// assert_eq!(query.road, "台27線");
/// assert_eq!(query.mileage_meters, 45200.0);
/// ```
///
/// # Errors
///
/// [`MilepostError::UnrecognizedPattern`] if the grammar does not match,
/// [`MilepostError::InvalidNumber`] if a matched numeric token fails to
/// convert (a grammar/conversion mismatch; should not occur in practice).
pub fn parse(input: &str) -> Result<PositionQuery> {
    let captures =
        descriptor_re()
            .captures(input)
            .ok_or_else(|| MilepostError::UnrecognizedPattern {
                input: input.to_string(),
            })?;

    let mut road = captures[1].to_string();
    if !road.ends_with(LINE_SUFFIX) {
        road.push(LINE_SUFFIX);
    }

    let km_token = &captures[2];
    let kilometers: f64 = km_token
        .parse()
        .map_err(|_| MilepostError::InvalidNumber {
            token: km_token.to_string(),
        })?;

    let meters: f64 = match captures.get(3) {
        Some(m) => m.as_str().parse().map_err(|_| MilepostError::InvalidNumber {
            token: m.as_str().to_string(),
        })?,
        None => 0.0,
    };

    Ok(PositionQuery {
        road,
        mileage_meters: kilometers * 1000.0 + meters,
    })
}
