//! Read-side queries feeding fleet validation.
//!
//! Every lookup returns `Ok(None)` (or an empty list) for unknown ids so
//! that the engine can tell a bad request apart from a failing database.

use std::collections::{BTreeMap, BTreeSet};

use oglike_types::{
    Coordinate, LocationKind, PlanetId, PlanetSnapshot, PlayerId, PlayerSnapshot, Propulsion,
    ResourceDescription, ResourceId, ShipDescription, ShipId, TechnologyId, UniverseId,
    UniverseMultipliers, UniverseSnapshot,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{
    BodyRow, MultipliersRow, PlayerRow, ResourceRow, ShipAmountRow, ShipObjectiveRow, ShipRow,
    UniverseRow, coordinate, coordinate_columns, purpose_from_db, to_u32,
};

const SHIP_FUEL: &str = "SELECT ship, resource, amount FROM ships_fuel WHERE ship = ANY($1)";

const SHIP_HOLDING_COST: &str =
    "SELECT ship, resource, amount FROM ships_holding_cost WHERE ship = ANY($1)";

/// Queries over universes, catalogs, and planet inventories.
pub struct SnapshotStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SnapshotStore<'a> {
    /// Create a new snapshot store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Universes
    // =========================================================================

    /// Dimensions of a universe.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn universe(&self, id: UniverseId) -> Result<Option<UniverseSnapshot>, DbError> {
        let row = sqlx::query_as::<_, UniverseRow>(
            r"SELECT id, name, galaxies_count, galaxy_size, solar_system_size
              FROM universes
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            Ok(UniverseSnapshot {
                id: UniverseId::from(r.id),
                name: r.name,
                galaxies_count: to_u32(r.galaxies_count, "galaxies_count")?,
                galaxy_size: to_u32(r.galaxy_size, "galaxy_size")?,
                solar_system_size: to_u32(r.solar_system_size, "solar_system_size")?,
            })
        })
        .transpose()
    }

    /// Balance multipliers of a universe.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn multipliers(
        &self,
        id: UniverseId,
    ) -> Result<Option<UniverseMultipliers>, DbError> {
        let row = sqlx::query_as::<_, MultipliersRow>(
            r"SELECT fleet_speed, consumption
              FROM universe_multipliers
              WHERE universe = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| UniverseMultipliers {
            fleet_speed: r.fleet_speed,
            consumption: r.consumption,
        }))
    }

    /// Whether a debris field exists at the given position.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn debris_field_exists(
        &self,
        universe: UniverseId,
        coordinates: Coordinate,
    ) -> Result<bool, DbError> {
        let (galaxy, solar_system, position) = coordinate_columns(coordinates)?;
        let exists = sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS (
                SELECT 1 FROM debris_fields
                WHERE universe = $1 AND galaxy = $2 AND solar_system = $3 AND position = $4
              )",
        )
        .bind(universe.into_inner())
        .bind(galaxy)
        .bind(solar_system)
        .bind(position)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// A planet or a moon with its stationed ships, stored resources, and
    /// the technology levels of its owner.
    ///
    /// Moons share the coordinates and owner of the planet they orbit.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    /// Returns [`DbError::Corrupt`] if a stored value is out of range.
    pub async fn body(
        &self,
        id: PlanetId,
        kind: LocationKind,
    ) -> Result<Option<PlanetSnapshot>, DbError> {
        let sql = match kind {
            LocationKind::Planet => {
                r"SELECT id, player, galaxy, solar_system, position
                  FROM planets
                  WHERE id = $1"
            }
            LocationKind::Moon => {
                r"SELECT m.id, p.player, p.galaxy, p.solar_system, p.position
                  FROM moons m
                  JOIN planets p ON p.id = m.planet
                  WHERE m.id = $1"
            }
            LocationKind::Debris => return Ok(None),
        };

        let Some(row) = sqlx::query_as::<_, BodyRow>(sql)
            .bind(id.into_inner())
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let ships = self.stationed_ships(row.id).await?;
        let resources = self.stored_resources(row.id).await?;
        let technologies = match row.player {
            Some(player) => self.technology_levels(player).await?,
            None => BTreeMap::new(),
        };

        Ok(Some(PlanetSnapshot {
            id: PlanetId::from(row.id),
            player: row.player.map(PlayerId::from),
            coordinates: coordinate(row.galaxy, row.solar_system, row.position, kind)?,
            ships,
            resources,
            technologies,
        }))
    }

    async fn stationed_ships(&self, body: Uuid) -> Result<BTreeMap<ShipId, u32>, DbError> {
        let rows = sqlx::query_as::<_, (Uuid, i32)>(
            r"SELECT ship, count FROM body_ships WHERE body = $1",
        )
        .bind(body)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(ship, count)| Ok((ShipId::from(ship), to_u32(count, "body_ships.count")?)))
            .collect()
    }

    async fn stored_resources(&self, body: Uuid) -> Result<BTreeMap<ResourceId, Decimal>, DbError> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            r"SELECT resource, amount FROM body_resources WHERE body = $1",
        )
        .bind(body)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(resource, amount)| (ResourceId::from(resource), amount))
            .collect())
    }

    async fn technology_levels(
        &self,
        player: Uuid,
    ) -> Result<BTreeMap<TechnologyId, u32>, DbError> {
        let rows = sqlx::query_as::<_, (Uuid, i32)>(
            r"SELECT technology, level FROM player_technologies WHERE player = $1",
        )
        .bind(player)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(tech, level)| {
                Ok((TechnologyId::from(tech), to_u32(level, "player_technologies.level")?))
            })
            .collect()
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// A player account.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn player(&self, id: PlayerId) -> Result<Option<PlayerSnapshot>, DbError> {
        let row = sqlx::query_as::<_, PlayerRow>(
            r"SELECT id, universe, name FROM players WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| PlayerSnapshot {
            id: PlayerId::from(r.id),
            universe: UniverseId::from(r.universe),
            name: r.name,
        }))
    }

    // =========================================================================
    // Catalogs
    // =========================================================================

    /// Ship descriptions for the given ids. Unknown ids are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if a query fails.
    /// Returns [`DbError::Corrupt`] if a stored value is out of range.
    pub async fn ships(&self, ids: &[ShipId]) -> Result<Vec<ShipDescription>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();

        let ships = sqlx::query_as::<_, ShipRow>(
            r"SELECT id, name, cargo, base_speed, propulsion_technology, propulsion_increase
              FROM ships
              WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let fuel = self.ship_amounts(SHIP_FUEL, &ids).await?;
        let holding = self.ship_amounts(SHIP_HOLDING_COST, &ids).await?;
        let objectives = sqlx::query_as::<_, ShipObjectiveRow>(
            r"SELECT ship, objective FROM ships_objectives WHERE ship = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        ships
            .into_iter()
            .map(|row| {
                let propulsion = match (row.propulsion_technology, row.propulsion_increase) {
                    (Some(tech), Some(increase)) => Some(Propulsion {
                        technology: TechnologyId::from(tech),
                        increase_per_level: increase,
                    }),
                    _ => None,
                };
                let objectives = objectives
                    .iter()
                    .filter(|o| o.ship == row.id)
                    .map(|o| purpose_from_db(&o.objective))
                    .collect::<Result<BTreeSet<_>, _>>()?;

                Ok(ShipDescription {
                    id: ShipId::from(row.id),
                    cargo: u64::try_from(row.cargo)
                        .map_err(|e| DbError::Corrupt(format!("ships.cargo: {e}")))?,
                    base_speed: to_u32(row.base_speed, "ships.base_speed")?,
                    propulsion,
                    fuel: amounts_for(&fuel, row.id),
                    holding_cost: amounts_for(&holding, row.id),
                    objectives,
                    name: row.name,
                })
            })
            .collect()
    }

    async fn ship_amounts(
        &self,
        sql: &'static str,
        ids: &[Uuid],
    ) -> Result<Vec<ShipAmountRow>, DbError> {
        let rows = sqlx::query_as::<_, ShipAmountRow>(sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Resource descriptions for the given ids. Unknown ids are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn resources(&self, ids: &[ResourceId]) -> Result<Vec<ResourceDescription>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();

        let rows = sqlx::query_as::<_, ResourceRow>(
            r"SELECT id, name, movable FROM resources WHERE id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ResourceDescription {
                id: ResourceId::from(r.id),
                name: r.name,
                movable: r.movable,
            })
            .collect())
    }
}

fn amounts_for(rows: &[ShipAmountRow], ship: Uuid) -> BTreeMap<ResourceId, Decimal> {
    rows.iter()
        .filter(|r| r.ship == ship)
        .map(|r| (ResourceId::from(r.resource), r.amount))
        .collect()
}
