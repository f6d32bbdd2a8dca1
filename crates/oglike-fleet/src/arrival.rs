//! Travel distance, flight duration, and fuel consumption.
//!
//! Everything here is a pure function of its inputs: same coordinates,
//! ships, speed fraction, and multipliers always give the same plan.
//!
//! # Formulas
//!
//! Distance between two coordinates uses three tiers so that travel inside
//! a system is always cheaper than between systems, itself always cheaper
//! than between galaxies:
//!
//! | Difference | Distance |
//! |------------|----------|
//! | galaxy | `20000 * |dg|` |
//! | system | `2700 + 95 * |ds|` |
//! | position | `1000 + 5 * |dp|` |
//! | none | `5` |
//!
//! The raw flight time in seconds for distance `d`, slowest ship speed `v`,
//! and speed fraction `f` is `35000 / (10 f) * sqrt(10 d / v) + 10`. The
//! universe fleet-speed multiplier divides it and the result is rounded up
//! to the next whole second.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use oglike_types::{
    Coordinate, PlanetSnapshot, ResourceAmount, ResourceId, ShipDescription, UniverseMultipliers,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Slowest admissible speed fraction.
pub const MIN_SPEED_FRACTION: f64 = 0.01;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Distance between two coordinates of the same universe.
pub fn distance(from: &Coordinate, to: &Coordinate) -> u64 {
    if from.galaxy != to.galaxy {
        return 20_000_u64.saturating_mul(u64::from(from.galaxy.abs_diff(to.galaxy)));
    }
    if from.system != to.system {
        return 95_u64
            .saturating_mul(u64::from(from.system.abs_diff(to.system)))
            .saturating_add(2_700);
    }
    if from.position != to.position {
        return 5_u64
            .saturating_mul(u64::from(from.position.abs_diff(to.position)))
            .saturating_add(1_000);
    }
    5
}

/// Speed of a ship type launched from `source`, propulsion included.
pub fn ship_speed(ship: &ShipDescription, source: &PlanetSnapshot) -> f64 {
    let base = f64::from(ship.base_speed);
    ship.propulsion.map_or(base, |propulsion| {
        let level = f64::from(source.technology_level(propulsion.technology));
        base * propulsion.increase_per_level.mul_add(level, 1.0)
    })
}

/// Clamp a client speed fraction into `[0.01, 1]`. Non-finite values fly at
/// full speed.
pub fn clamp_speed(fraction: f64) -> f64 {
    if fraction.is_finite() {
        fraction.clamp(MIN_SPEED_FRACTION, 1.0)
    } else {
        1.0
    }
}

/// Timing of a single trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPlan {
    /// Distance flown.
    pub distance: u64,
    /// Speed of the slowest ship.
    pub slowest_speed: f64,
    /// Flight time before the universe multiplier, in seconds.
    pub raw_seconds: f64,
    /// Flight time after the universe multiplier, rounded up.
    pub duration_seconds: i64,
}

impl FlightPlan {
    /// Flight time as a [`TimeDelta`].
    pub fn duration(&self) -> Option<TimeDelta> {
        TimeDelta::try_seconds(self.duration_seconds)
    }

    /// When a fleet leaving at `departure` reaches its target.
    pub fn arrival_from(&self, departure: DateTime<Utc>) -> Option<DateTime<Utc>> {
        departure.checked_add_signed(self.duration()?)
    }
}

/// Plan a trip over `distance` with the slowest ship at `slowest_speed`.
///
/// Returns `None` when the fleet cannot move at all.
pub fn plan(
    distance: u64,
    slowest_speed: f64,
    speed_fraction: f64,
    multipliers: &UniverseMultipliers,
) -> Option<FlightPlan> {
    if !slowest_speed.is_finite() || slowest_speed <= 0.0 {
        return None;
    }
    let fraction = clamp_speed(speed_fraction);

    #[allow(clippy::cast_precision_loss)]
    let d = distance as f64;
    let raw_seconds = (35_000.0 / (10.0 * fraction)).mul_add((10.0 * d / slowest_speed).sqrt(), 10.0);

    let scaled = raw_seconds / positive_or_one(multipliers.fleet_speed);
    if !scaled.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let duration_seconds = scaled.ceil() as i64;

    Some(FlightPlan {
        distance,
        slowest_speed,
        raw_seconds,
        duration_seconds,
    })
}

/// One ship type of a fleet, with its resolved catalog entry and speed.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    /// Catalog entry.
    pub ship: &'a ShipDescription,
    /// Number of ships.
    pub count: u32,
    /// Speed of this ship type from the source.
    pub speed: f64,
}

/// Fuel burnt by the fleet along `plan`, plus the holding cost for
/// `holding_seconds` spent at a rendezvous.
///
/// Amounts are scaled by the consumption multiplier and rounded up to whole
/// units. Resources are listed in id order; zero amounts are omitted.
pub fn consumption(
    plan: &FlightPlan,
    legs: &[Leg<'_>],
    multipliers: &UniverseMultipliers,
    holding_seconds: i64,
) -> Vec<ResourceAmount> {
    let mut totals: BTreeMap<ResourceId, f64> = BTreeMap::new();

    #[allow(clippy::cast_precision_loss)]
    let d = plan.distance as f64;
    let flight = plan.raw_seconds - 10.0;

    for leg in legs {
        let count = f64::from(leg.count);
        if flight > 0.0 && leg.speed > 0.0 {
            let sk = 35_000.0 * (10.0 * d / leg.speed).sqrt() / flight;
            let factor = (1.0 + sk / 10.0).powi(2);
            for (resource, per_ship) in &leg.ship.fuel {
                let burnt = per_ship.to_f64().unwrap_or(0.0) * count * d * factor / 35_000.0;
                *totals.entry(*resource).or_insert(0.0) += burnt;
            }
        }
        if holding_seconds > 0 {
            #[allow(clippy::cast_precision_loss)]
            let hours = holding_seconds as f64 / SECONDS_PER_HOUR;
            for (resource, per_hour) in &leg.ship.holding_cost {
                let held = per_hour.to_f64().unwrap_or(0.0) * count * hours;
                *totals.entry(*resource).or_insert(0.0) += held;
            }
        }
    }

    let ratio = positive_or_one(multipliers.consumption);
    totals
        .into_iter()
        .filter_map(|(resource, amount)| {
            let amount = Decimal::from_f64(amount * ratio)?.ceil();
            (amount > Decimal::ZERO).then_some(ResourceAmount { resource, amount })
        })
        .collect()
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 1.0 }
}
