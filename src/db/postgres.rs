use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::store::{ListingStore, PhotoStore, RecommendationStore},
    error::{AppError, AppResult},
    models::{
        reorder_positions, CheckInPhoto, Listing, NewRecommendation, Recommendation,
        RecommendationRow, MAX_CHECK_IN_PHOTOS,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

const LISTING_COLUMNS: &str = r#"
    id, owner_id, title, address, check_in, check_out, wifi_network, wifi_password,
    house_rules, before_you_leave, host_name, host_about, host_email, host_phone,
    image_url, directions, check_in_method, check_in_instructions, created_at, updated_at
"#;

const RECOMMENDATION_COLUMNS: &str = r#"
    id, listing_id, category, name, description, address, photo, lat, lng,
    rating, place_id, is_generated, created_at
"#;

/// PostgreSQL implementation of the store traits
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_recommendation_rows(
        tx: &mut Transaction<'_, Postgres>,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>> {
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            let sql = format!(
                r#"
                INSERT INTO recommendations
                    (id, listing_id, category, name, description, address, photo,
                     lat, lng, rating, place_id, is_generated)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING {}
                "#,
                RECOMMENDATION_COLUMNS
            );

            let saved: RecommendationRow = sqlx::query_as(&sql)
                .bind(Uuid::new_v4())
                .bind(row.listing_id)
                .bind(&row.category)
                .bind(&row.name)
                .bind(&row.description)
                .bind(&row.address)
                .bind(&row.photo)
                .bind(row.location.lat)
                .bind(row.location.lng)
                .bind(row.rating)
                .bind(&row.place_id)
                .bind(row.is_generated)
                .fetch_one(&mut **tx)
                .await?;

            inserted.push(Recommendation::from(saved));
        }

        Ok(inserted)
    }
}

#[async_trait::async_trait]
impl ListingStore for PgStore {
    async fn insert_listing(&self, listing: Listing) -> AppResult<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20)
            RETURNING {cols}
            "#,
            cols = LISTING_COLUMNS
        );

        let saved = sqlx::query_as::<_, Listing>(&sql)
            .bind(listing.id)
            .bind(listing.owner_id)
            .bind(&listing.title)
            .bind(&listing.address)
            .bind(&listing.check_in)
            .bind(&listing.check_out)
            .bind(&listing.wifi_network)
            .bind(&listing.wifi_password)
            .bind(&listing.house_rules)
            .bind(&listing.before_you_leave)
            .bind(&listing.host_name)
            .bind(&listing.host_about)
            .bind(&listing.host_email)
            .bind(&listing.host_phone)
            .bind(&listing.image_url)
            .bind(&listing.directions)
            .bind(&listing.check_in_method)
            .bind(&listing.check_in_instructions)
            .bind(listing.created_at)
            .bind(listing.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn get_listing(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let sql = format!("SELECT {} FROM listings WHERE id = $1", LISTING_COLUMNS);
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    async fn list_listings_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {} FROM listings WHERE owner_id = $1 ORDER BY created_at DESC",
            LISTING_COLUMNS
        );
        let listings = sqlx::query_as::<_, Listing>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(listings)
    }

    async fn update_listing(&self, listing: Listing) -> AppResult<Listing> {
        let sql = format!(
            r#"
            UPDATE listings SET
                title = $3, address = $4, check_in = $5, check_out = $6,
                wifi_network = $7, wifi_password = $8, house_rules = $9,
                before_you_leave = $10, host_name = $11, host_about = $12,
                host_email = $13, host_phone = $14, image_url = $15, directions = $16,
                check_in_method = $17, check_in_instructions = $18, updated_at = $19
            WHERE id = $1 AND owner_id = $2
            RETURNING {}
            "#,
            LISTING_COLUMNS
        );

        let saved = sqlx::query_as::<_, Listing>(&sql)
            .bind(listing.id)
            .bind(listing.owner_id)
            .bind(&listing.title)
            .bind(&listing.address)
            .bind(&listing.check_in)
            .bind(&listing.check_out)
            .bind(&listing.wifi_network)
            .bind(&listing.wifi_password)
            .bind(&listing.house_rules)
            .bind(&listing.before_you_leave)
            .bind(&listing.host_name)
            .bind(&listing.host_about)
            .bind(&listing.host_email)
            .bind(&listing.host_phone)
            .bind(&listing.image_url)
            .bind(&listing.directions)
            .bind(&listing.check_in_method)
            .bind(&listing.check_in_instructions)
            .bind(listing.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        saved.ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing.id)))
    }

    async fn delete_listing(&self, id: Uuid) -> AppResult<bool> {
        // Photos and recommendations go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl PhotoStore for PgStore {
    async fn list_photos(&self, listing_id: Uuid) -> AppResult<Vec<CheckInPhoto>> {
        let photos = sqlx::query_as::<_, CheckInPhoto>(
            r#"
            SELECT id, listing_id, photo_url, caption, display_order, created_at
            FROM check_in_photos
            WHERE listing_id = $1
            ORDER BY display_order, created_at
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(photos)
    }

    async fn insert_photo(
        &self,
        listing_id: Uuid,
        photo_url: String,
        caption: Option<String>,
    ) -> AppResult<CheckInPhoto> {
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent inserts for the same listing
        let locked = sqlx::query("SELECT id FROM listings WHERE id = $1 FOR UPDATE")
            .bind(listing_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(AppError::NotFound(format!("Listing {} not found", listing_id)));
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM check_in_photos WHERE listing_id = $1")
                .bind(listing_id)
                .fetch_one(&mut *tx)
                .await?;
        if count as usize >= MAX_CHECK_IN_PHOTOS {
            return Err(AppError::PhotoLimitReached(MAX_CHECK_IN_PHOTOS));
        }

        let photo = sqlx::query_as::<_, CheckInPhoto>(
            r#"
            INSERT INTO check_in_photos (id, listing_id, photo_url, caption, display_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, listing_id, photo_url, caption, display_order, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(listing_id)
        .bind(&photo_url)
        .bind(&caption)
        .bind(count as i32)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(photo)
    }

    async fn update_photo_caption(
        &self,
        listing_id: Uuid,
        photo_id: Uuid,
        caption: Option<String>,
    ) -> AppResult<Option<CheckInPhoto>> {
        let photo = sqlx::query_as::<_, CheckInPhoto>(
            r#"
            UPDATE check_in_photos SET caption = $3
            WHERE id = $1 AND listing_id = $2
            RETURNING id, listing_id, photo_url, caption, display_order, created_at
            "#,
        )
        .bind(photo_id)
        .bind(listing_id)
        .bind(&caption)
        .fetch_optional(&self.pool)
        .await?;
        Ok(photo)
    }

    async fn move_photo(&self, listing_id: Uuid, from: usize, to: usize) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Row locks keep a concurrent delete from re-packing under us
        let current: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM check_in_photos
            WHERE listing_id = $1
            ORDER BY display_order, created_at
            FOR UPDATE
            "#,
        )
        .bind(listing_id)
        .fetch_all(&mut *tx)
        .await?;

        for (photo_id, display_order) in reorder_positions(&current, from, to)? {
            sqlx::query("UPDATE check_in_photos SET display_order = $2 WHERE id = $1")
                .bind(photo_id)
                .bind(display_order)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_photo(&self, listing_id: Uuid, photo_id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM check_in_photos WHERE id = $1 AND listing_id = $2")
            .bind(photo_id)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE check_in_photos AS p
            SET display_order = (r.position - 1)::INTEGER
            FROM (
                SELECT id, ROW_NUMBER() OVER (ORDER BY display_order, created_at) AS position
                FROM check_in_photos
                WHERE listing_id = $1
            ) AS r
            WHERE p.id = r.id
            "#,
        )
        .bind(listing_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgStore {
    async fn list_recommendations(
        &self,
        listing_id: Uuid,
        category: Option<String>,
    ) -> AppResult<Vec<Recommendation>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM recommendations
            WHERE listing_id = $1 AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY created_at, rating DESC NULLS LAST
            "#,
            RECOMMENDATION_COLUMNS
        );

        let rows = sqlx::query_as::<_, RecommendationRow>(&sql)
            .bind(listing_id)
            .bind(&category)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Recommendation::from).collect())
    }

    async fn insert_recommendations(
        &self,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>> {
        let mut tx = self.pool.begin().await?;
        let inserted = Self::insert_recommendation_rows(&mut tx, rows).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn replace_generated_recommendations(
        &self,
        listing_id: Uuid,
        category: String,
        rows: Vec<NewRecommendation>,
    ) -> AppResult<Vec<Recommendation>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM recommendations
            WHERE listing_id = $1 AND category = $2 AND is_generated = TRUE
            "#,
        )
        .bind(listing_id)
        .bind(&category)
        .execute(&mut *tx)
        .await?;

        tracing::debug!(
            listing_id = %listing_id,
            category = %category,
            removed = removed.rows_affected(),
            "Removed previously generated recommendations"
        );

        let inserted = Self::insert_recommendation_rows(&mut tx, rows).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    async fn delete_recommendation(&self, listing_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recommendations WHERE id = $1 AND listing_id = $2")
            .bind(id)
            .bind(listing_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
