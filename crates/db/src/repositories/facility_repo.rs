//! Repository for the `facilities` and `facility_sports` tables.

use std::collections::HashMap;

use sqlx::PgPool;
use sportsbook_core::types::DbId;

use crate::models::facility::{
    CreateFacility, Facility, FacilitySearch, FacilitySport, FacilityWithSports, NewOffering,
    UpdateFacility,
};

/// Column list for the `facilities` table.
const COLUMNS: &str = "id, owner_id, name, address, description, contact_number, photos, \
                       amenities, average_rating, created_at, updated_at";

/// Column list for `facility_sports` joined with `sports` (aliases `fs`, `s`).
pub(crate) const OFFERING_COLUMNS: &str =
    "fs.id, fs.facility_id, fs.sport_id, s.name AS sport_name, fs.price, fs.resource_count, \
     fs.max_people_per_unit, fs.opening_hour, fs.closing_hour, fs.operating_days, \
     fs.created_at, fs.updated_at";

/// Provides CRUD and search operations for facilities and their offerings.
pub struct FacilityRepo;

impl FacilityRepo {
    /// Insert a facility and all of its offerings in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateFacility) -> Result<Facility, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO facilities \
                (owner_id, name, address, description, contact_number, photos, amenities) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let facility = sqlx::query_as::<_, Facility>(&insert_query)
            .bind(input.owner_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .bind(&input.contact_number)
            .bind(&input.photos)
            .bind(&input.amenities)
            .fetch_one(&mut *tx)
            .await?;

        Self::insert_offerings_inner(&mut tx, facility.id, &input.offerings).await?;

        tx.commit().await?;
        Ok(facility)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Facility>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM facilities WHERE id = $1");
        sqlx::query_as::<_, Facility>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every facility, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Facility>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM facilities ORDER BY created_at DESC");
        sqlx::query_as::<_, Facility>(&query).fetch_all(pool).await
    }

    /// Facilities owned by `owner_id`, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Facility>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM facilities WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Facility>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Facilities offering `sport_id`.
    pub async fn list_by_sport(pool: &PgPool, sport_id: DbId) -> Result<Vec<Facility>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM facilities f \
             WHERE EXISTS ( \
                 SELECT 1 FROM facility_sports fs \
                 WHERE fs.facility_id = f.id AND fs.sport_id = $1 \
             ) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Facility>(&query)
            .bind(sport_id)
            .fetch_all(pool)
            .await
    }

    /// Filter facilities. Unset filters match everything.
    ///
    /// `keyword` and `location` are plain substrings; `%` and `_` match
    /// themselves. Sport and price filters must be satisfied by the same
    /// offering.
    pub async fn search(pool: &PgPool, filter: &FacilitySearch) -> Result<Vec<Facility>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM facilities f \
             WHERE ($1::TEXT IS NULL OR f.name ILIKE '%' || $1 || '%' ESCAPE '\\') \
               AND ($2::TEXT IS NULL OR f.address ILIKE '%' || $2 || '%' ESCAPE '\\') \
               AND ( \
                   ($3::TEXT IS NULL AND $4::BIGINT IS NULL AND $5::BIGINT IS NULL) \
                   OR EXISTS ( \
                       SELECT 1 FROM facility_sports fs \
                       JOIN sports s ON s.id = fs.sport_id \
                       WHERE fs.facility_id = f.id \
                         AND ($3::TEXT IS NULL OR LOWER(s.name) = LOWER($3)) \
                         AND ($4::BIGINT IS NULL OR fs.price >= $4) \
                         AND ($5::BIGINT IS NULL OR fs.price <= $5) \
                   ) \
               ) \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Facility>(&query)
            .bind(filter.keyword.as_deref().map(escape_like))
            .bind(filter.location.as_deref().map(escape_like))
            .bind(&filter.sport)
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_all(pool)
            .await
    }

    /// Update a facility. Only non-`None` fields are applied.
    ///
    /// If `offerings` is `Some`, it becomes the full set of offerings: kept
    /// sports are updated in place, missing ones removed. Returns `None` if no
    /// row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateFacility,
    ) -> Result<Option<Facility>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE facilities SET \
                name = COALESCE($2, name), \
                address = COALESCE($3, address), \
                description = COALESCE($4, description), \
                contact_number = COALESCE($5, contact_number), \
                photos = COALESCE($6, photos), \
                amenities = COALESCE($7, amenities) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let facility = sqlx::query_as::<_, Facility>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .bind(&input.contact_number)
            .bind(&input.photos)
            .bind(&input.amenities)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref facility) = facility {
            if let Some(ref offerings) = input.offerings {
                Self::replace_offerings_inner(&mut tx, facility.id, offerings).await?;
            }
        }

        tx.commit().await?;
        Ok(facility)
    }

    /// Delete a facility. Offerings, bookings and reviews cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM facilities WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Offerings
    // -----------------------------------------------------------------------

    /// The capacity record for one sport at one facility.
    pub async fn find_offering(
        pool: &PgPool,
        facility_id: DbId,
        sport_id: DbId,
    ) -> Result<Option<FacilitySport>, sqlx::Error> {
        let query = format!(
            "SELECT {OFFERING_COLUMNS} \
             FROM facility_sports fs \
             JOIN sports s ON s.id = fs.sport_id \
             WHERE fs.facility_id = $1 AND fs.sport_id = $2"
        );
        sqlx::query_as::<_, FacilitySport>(&query)
            .bind(facility_id)
            .bind(sport_id)
            .fetch_optional(pool)
            .await
    }

    /// All offerings of the given facilities, ordered by sport name.
    pub async fn offerings_for(
        pool: &PgPool,
        facility_ids: &[DbId],
    ) -> Result<Vec<FacilitySport>, sqlx::Error> {
        let query = format!(
            "SELECT {OFFERING_COLUMNS} \
             FROM facility_sports fs \
             JOIN sports s ON s.id = fs.sport_id \
             WHERE fs.facility_id = ANY($1) \
             ORDER BY fs.facility_id, s.name"
        );
        sqlx::query_as::<_, FacilitySport>(&query)
            .bind(facility_ids)
            .fetch_all(pool)
            .await
    }

    /// Attach offerings to each facility, preserving the input order.
    pub async fn with_sports(
        pool: &PgPool,
        facilities: Vec<Facility>,
    ) -> Result<Vec<FacilityWithSports>, sqlx::Error> {
        let ids: Vec<DbId> = facilities.iter().map(|f| f.id).collect();
        let mut by_facility: HashMap<DbId, Vec<FacilitySport>> = HashMap::new();
        for offering in Self::offerings_for(pool, &ids).await? {
            by_facility
                .entry(offering.facility_id)
                .or_default()
                .push(offering);
        }

        Ok(facilities
            .into_iter()
            .map(|facility| {
                let sports = by_facility.remove(&facility.id).unwrap_or_default();
                FacilityWithSports { facility, sports }
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn insert_offerings_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
        offerings: &[NewOffering],
    ) -> Result<(), sqlx::Error> {
        for offering in offerings {
            sqlx::query(
                "INSERT INTO facility_sports \
                    (facility_id, sport_id, price, resource_count, max_people_per_unit, \
                     opening_hour, closing_hour, operating_days) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(facility_id)
            .bind(offering.sport_id)
            .bind(offering.price)
            .bind(offering.resource_count)
            .bind(offering.max_people_per_unit)
            .bind(offering.opening_hour)
            .bind(offering.closing_hour)
            .bind(&offering.operating_days)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    /// Upsert on `uq_facility_sports` so a surviving row keeps its id and any
    /// admission lock held on it.
    async fn replace_offerings_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        facility_id: DbId,
        offerings: &[NewOffering],
    ) -> Result<(), sqlx::Error> {
        for offering in offerings {
            sqlx::query(
                "INSERT INTO facility_sports \
                    (facility_id, sport_id, price, resource_count, max_people_per_unit, \
                     opening_hour, closing_hour, operating_days) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 ON CONFLICT (facility_id, sport_id) DO UPDATE SET \
                    price = EXCLUDED.price, \
                    resource_count = EXCLUDED.resource_count, \
                    max_people_per_unit = EXCLUDED.max_people_per_unit, \
                    opening_hour = EXCLUDED.opening_hour, \
                    closing_hour = EXCLUDED.closing_hour, \
                    operating_days = EXCLUDED.operating_days",
            )
            .bind(facility_id)
            .bind(offering.sport_id)
            .bind(offering.price)
            .bind(offering.resource_count)
            .bind(offering.max_people_per_unit)
            .bind(offering.opening_hour)
            .bind(offering.closing_hour)
            .bind(&offering.operating_days)
            .execute(&mut **tx)
            .await?;
        }

        let kept: Vec<DbId> = offerings.iter().map(|o| o.sport_id).collect();
        sqlx::query("DELETE FROM facility_sports WHERE facility_id = $1 AND sport_id <> ALL($2)")
            .bind(facility_id)
            .bind(&kept)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// Escape `LIKE` metacharacters so `input` matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
