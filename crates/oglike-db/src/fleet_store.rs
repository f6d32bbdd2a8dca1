//! Fleet and ACS persistence.
//!
//! [`FleetStore::persist`] writes an accepted fleet in a single transaction:
//! the rendezvous, the fleet rows, the membership link, and the
//! deductions from the source. Deductions are conditional updates; one
//! that matches no row aborts the transaction, so a fleet is never stored
//! without its ships and resources leaving the source.

use std::collections::BTreeMap;

use oglike_types::{
    AcsFleet, AcsId, ExistingFleet, Fleet, FleetId, PlanetId, PlayerId, ResourceId, UniverseId,
};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{
    AcsRow, FleetHeadRow, coordinate, coordinate_columns, location_from_db, location_to_db,
    purpose_from_db, purpose_to_db, to_i32,
};

const INSERT_CARGO: &str = r"INSERT INTO fleet_cargo (fleet, resource, amount)
    SELECT $1, * FROM UNNEST($2::UUID[], $3::NUMERIC[])";

const INSERT_CONSUMPTION: &str = r"INSERT INTO fleet_consumption (fleet, resource, amount)
    SELECT $1, * FROM UNNEST($2::UUID[], $3::NUMERIC[])";

/// Operations on the `fleets` and `acs_fleets` tables.
pub struct FleetStore<'a> {
    pool: &'a PgPool,
}

impl<'a> FleetStore<'a> {
    /// Create a new fleet store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A previously stored fleet, reduced to what replays need.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn existing_fleet(&self, id: FleetId) -> Result<Option<ExistingFleet>, DbError> {
        let row = sqlx::query_as::<_, FleetHeadRow>(
            r"SELECT id, player, acs FROM fleets WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| ExistingFleet {
            id: FleetId::from(r.id),
            player: PlayerId::from(r.player),
            acs: r.acs.map(AcsId::from),
        }))
    }

    /// An ACS rendezvous with its members in joining order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    /// Returns [`DbError::Corrupt`] if a stored enum is unknown.
    pub async fn acs_fleet(&self, id: AcsId) -> Result<Option<AcsFleet>, DbError> {
        let Some(row) = sqlx::query_as::<_, AcsRow>(
            r"SELECT id, universe, objective, target, galaxy, solar_system, position,
                     location, arrival_time
              FROM acs_fleets
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let members = sqlx::query_scalar::<_, Uuid>(
            r"SELECT fleet FROM acs_members WHERE acs = $1 ORDER BY joined",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        let location = location_from_db(&row.location)?;
        Ok(Some(AcsFleet {
            id: AcsId::from(row.id),
            universe: UniverseId::from(row.universe),
            objective: purpose_from_db(&row.objective)?,
            target: row.target.map(PlanetId::from),
            target_coordinates: coordinate(row.galaxy, row.solar_system, row.position, location)?,
            members: members.into_iter().map(FleetId::from).collect(),
            arrival_time: row.arrival_time,
        }))
    }

    /// Store a validated fleet and apply its deductions atomically.
    ///
    /// When `acs` is given the rendezvous is inserted if new, otherwise
    /// its agreed arrival is refreshed, and the fleet is linked to it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InsufficientStock`] if the source no longer
    /// holds enough ships or resources.
    /// Returns [`DbError::Postgres`] if any statement fails. Nothing is
    /// written in either case.
    pub async fn persist(&self, fleet: &Fleet, acs: Option<&AcsFleet>) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;

        if let Some(acs) = acs {
            upsert_acs(&mut tx, acs).await?;
        }
        insert_fleet(&mut tx, fleet).await?;
        if let Some(acs) = acs {
            sqlx::query(r"INSERT INTO acs_members (acs, fleet) VALUES ($1, $2)")
                .bind(acs.id.into_inner())
                .bind(fleet.id.into_inner())
                .execute(&mut *tx)
                .await?;
        }
        deduct_from_source(&mut tx, fleet).await?;

        tx.commit().await?;

        tracing::debug!(
            fleet_id = %fleet.id,
            universe = %fleet.universe,
            acs = ?fleet.acs,
            "Persisted fleet"
        );
        Ok(())
    }
}

async fn upsert_acs(tx: &mut Transaction<'_, Postgres>, acs: &AcsFleet) -> Result<(), DbError> {
    let (galaxy, solar_system, position) = coordinate_columns(acs.target_coordinates)?;
    sqlx::query(
        r"INSERT INTO acs_fleets
          (id, universe, objective, target, galaxy, solar_system, position, location, arrival_time)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
          ON CONFLICT (id) DO UPDATE SET arrival_time = EXCLUDED.arrival_time",
    )
    .bind(acs.id.into_inner())
    .bind(acs.universe.into_inner())
    .bind(purpose_to_db(acs.objective))
    .bind(acs.target.map(PlanetId::into_inner))
    .bind(galaxy)
    .bind(solar_system)
    .bind(position)
    .bind(location_to_db(acs.target_coordinates.location))
    .bind(acs.arrival_time)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_fleet(tx: &mut Transaction<'_, Postgres>, fleet: &Fleet) -> Result<(), DbError> {
    let (galaxy, solar_system, position) = coordinate_columns(fleet.target_coordinates)?;
    sqlx::query(
        r"INSERT INTO fleets
          (id, universe, player, source, source_type, target, galaxy, solar_system, position,
           location, objective, acs, speed, created_at, arrival_time, deployment_time, return_time)
          VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
    )
    .bind(fleet.id.into_inner())
    .bind(fleet.universe.into_inner())
    .bind(fleet.player.into_inner())
    .bind(fleet.source.into_inner())
    .bind(location_to_db(fleet.source_type))
    .bind(fleet.target.map(PlanetId::into_inner))
    .bind(galaxy)
    .bind(solar_system)
    .bind(position)
    .bind(location_to_db(fleet.target_coordinates.location))
    .bind(purpose_to_db(fleet.objective))
    .bind(fleet.acs.map(AcsId::into_inner))
    .bind(fleet.speed)
    .bind(fleet.created_at)
    .bind(fleet.arrival_time)
    .bind(fleet.deployment_time)
    .bind(fleet.return_time)
    .execute(&mut **tx)
    .await?;

    let mut ships = Vec::with_capacity(fleet.ships.len());
    let mut counts = Vec::with_capacity(fleet.ships.len());
    for entry in &fleet.ships {
        ships.push(entry.ship.into_inner());
        counts.push(to_i32(entry.count, "fleet_ships.count")?);
    }
    sqlx::query(
        r"INSERT INTO fleet_ships (fleet, ship, count)
          SELECT $1, * FROM UNNEST($2::UUID[], $3::INTEGER[])",
    )
    .bind(fleet.id.into_inner())
    .bind(&ships)
    .bind(&counts)
    .execute(&mut **tx)
    .await?;

    for (sql, amounts) in [
        (INSERT_CARGO, &fleet.cargo),
        (INSERT_CONSUMPTION, &fleet.consumption),
    ] {
        if amounts.is_empty() {
            continue;
        }
        let resources: Vec<Uuid> = amounts.iter().map(|a| a.resource.into_inner()).collect();
        let values: Vec<Decimal> = amounts.iter().map(|a| a.amount).collect();
        sqlx::query(sql)
            .bind(fleet.id.into_inner())
            .bind(&resources)
            .bind(&values)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn deduct_from_source(
    tx: &mut Transaction<'_, Postgres>,
    fleet: &Fleet,
) -> Result<(), DbError> {
    let source = fleet.source.into_inner();

    for entry in &fleet.ships {
        let count = to_i32(entry.count, "body_ships.count")?;
        let updated = sqlx::query(
            r"UPDATE body_ships SET count = count - $3
              WHERE body = $1 AND ship = $2 AND count >= $3",
        )
        .bind(source)
        .bind(entry.ship.into_inner())
        .bind(count)
        .execute(&mut **tx)
        .await?;
        if updated.rows_affected() != 1 {
            return Err(DbError::InsufficientStock(format!(
                "ship {} on {}",
                entry.ship, fleet.source
            )));
        }
    }

    for (resource, amount) in outgoing_resources(fleet) {
        let updated = sqlx::query(
            r"UPDATE body_resources SET amount = amount - $3
              WHERE body = $1 AND resource = $2 AND amount >= $3",
        )
        .bind(source)
        .bind(resource.into_inner())
        .bind(amount)
        .execute(&mut **tx)
        .await?;
        if updated.rows_affected() != 1 {
            return Err(DbError::InsufficientStock(format!(
                "resource {resource} on {}",
                fleet.source
            )));
        }
    }
    Ok(())
}

/// Cargo and fuel leaving the source, summed per resource.
fn outgoing_resources(fleet: &Fleet) -> BTreeMap<ResourceId, Decimal> {
    let mut totals: BTreeMap<ResourceId, Decimal> = BTreeMap::new();
    for entry in fleet.cargo.iter().chain(&fleet.consumption) {
        let total = totals.entry(entry.resource).or_insert(Decimal::ZERO);
        *total = total.saturating_add(entry.amount);
    }
    totals
}
