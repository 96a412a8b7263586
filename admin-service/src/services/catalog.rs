//! Relational catalog operations: categories, tours, and stops.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::*;

pub struct CatalogService {
    db_pool: PgPool,
}

impl CatalogService {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    // ============= Categories =============

    pub async fn list_categories(&self) -> AdminResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn create_category(&self, req: CreateCategoryRequest) -> AdminResult<Category> {
        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        let name = req.name.trim();
        if name.is_empty() {
            return Err(AdminError::ValidationError(
                "Category name is required".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if existing.is_some() {
            return Err(AdminError::AlreadyExists("Category"));
        }

        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, created_at) VALUES ($1, $2, NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    /// Delete a category, refusing while any tour still references it.
    pub async fn delete_category(&self, category_id: Uuid) -> AdminResult<()> {
        let (in_use,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tours WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.db_pool)
                .await
                .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if in_use > 0 {
            return Err(AdminError::CategoryInUse(in_use));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound("Category"));
        }

        Ok(())
    }

    // ============= Tours =============

    pub async fn list_tours(&self) -> AdminResult<Vec<TourSummary>> {
        sqlx::query_as::<_, TourSummary>(
            "SELECT id, title, city, is_published, created_at FROM tours ORDER BY created_at DESC",
        )
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn create_tour(&self, req: CreateTourRequest) -> AdminResult<Tour> {
        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        let title = req.title.trim();
        if title.is_empty() {
            return Err(AdminError::ValidationError("Title is required".to_string()));
        }

        sqlx::query_as::<_, Tour>(
            r#"
            INSERT INTO tours (id, title, city, is_published, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(normalize_optional_text(req.city))
        .bind(req.is_published.unwrap_or(false))
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn get_tour(&self, tour_id: Uuid) -> AdminResult<Tour> {
        sqlx::query_as::<_, Tour>("SELECT * FROM tours WHERE id = $1")
            .bind(tour_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?
            .ok_or(AdminError::NotFound("Tour"))
    }

    /// Tour edit-screen payload: the tour plus its stops in play order.
    pub async fn get_tour_detail(&self, tour_id: Uuid) -> AdminResult<TourDetail> {
        let tour = self.get_tour(tour_id).await?;
        let stops = self.list_stops(tour_id).await?;

        Ok(TourDetail { tour, stops })
    }

    pub async fn update_tour(&self, tour_id: Uuid, req: UpdateTourRequest) -> AdminResult<Tour> {
        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        let title = req.title.trim();
        if title.is_empty() {
            return Err(AdminError::ValidationError("Title is required".to_string()));
        }

        if let Some(category_id) = req.category_id {
            let exists = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(&self.db_pool)
                .await
                .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

            if exists.is_none() {
                return Err(AdminError::NotFound("Category"));
            }
        }

        sqlx::query_as::<_, Tour>(
            r#"
            UPDATE tours
            SET title = $1,
                city = $2,
                is_published = $3,
                category_id = $4,
                start_touring_color_hex = $5,
                highlights_button_color_hex = $6,
                map_button_color_hex = $7,
                where_starts_button_color_hex = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(normalize_optional_text(req.city))
        .bind(req.is_published)
        .bind(req.category_id)
        .bind(req.start_touring_color_hex)
        .bind(req.highlights_button_color_hex)
        .bind(req.map_button_color_hex)
        .bind(req.where_starts_button_color_hex)
        .bind(tour_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?
        .ok_or(AdminError::NotFound("Tour"))
    }

    /// Delete a tour; its stops cascade at the database layer.
    pub async fn delete_tour(&self, tour_id: Uuid) -> AdminResult<()> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1")
            .bind(tour_id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound("Tour"));
        }

        Ok(())
    }

    // ============= Stops =============

    pub async fn list_stops(&self, tour_id: Uuid) -> AdminResult<Vec<Stop>> {
        sqlx::query_as::<_, Stop>(
            "SELECT * FROM stops WHERE tour_id = $1 ORDER BY sort_order ASC",
        )
        .bind(tour_id)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn create_stop(&self, tour_id: Uuid, req: CreateStopRequest) -> AdminResult<Stop> {
        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        // Make sure the parent tour exists before assigning a sort slot
        self.get_tour(tour_id).await?;

        let (next_sort,): (i32,) = sqlx::query_as(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM stops WHERE tour_id = $1",
        )
        .bind(tour_id)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        sqlx::query_as::<_, Stop>(
            r#"
            INSERT INTO stops (id, tour_id, title, lat, lng, radius_m, pass_by,
                               audio_url, image_url, sort_order, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tour_id)
        .bind(req.title.trim())
        .bind(req.lat)
        .bind(req.lng)
        .bind(req.radius_m.unwrap_or(75.0))
        .bind(req.pass_by.unwrap_or(false))
        .bind(req.audio_url)
        .bind(req.image_url)
        .bind(next_sort)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))
    }

    pub async fn update_stop(&self, stop_id: Uuid, req: UpdateStopRequest) -> AdminResult<Stop> {
        req.validate()
            .map_err(|e| AdminError::ValidationError(format!("{}", e)))?;

        sqlx::query_as::<_, Stop>(
            r#"
            UPDATE stops
            SET title = $1, lat = $2, lng = $3, radius_m = $4, pass_by = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(req.title.trim())
        .bind(req.lat)
        .bind(req.lng)
        .bind(req.radius_m)
        .bind(req.pass_by)
        .bind(stop_id)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| AdminError::DatabaseError(e.to_string()))?
        .ok_or(AdminError::NotFound("Stop"))
    }

    pub async fn delete_stop(&self, stop_id: Uuid) -> AdminResult<()> {
        let result = sqlx::query("DELETE FROM stops WHERE id = $1")
            .bind(stop_id)
            .execute(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AdminError::NotFound("Stop"));
        }

        Ok(())
    }

    /// Swap a stop's sort slot with its neighbor in the given direction.
    ///
    /// Moving past either end of the list is a no-op. The two-row swap runs
    /// in one transaction so a concurrent reader never observes a duplicated
    /// sort slot. Returns the tour's stops in their new order.
    pub async fn move_stop(
        &self,
        stop_id: Uuid,
        direction: MoveDirection,
    ) -> AdminResult<Vec<Stop>> {
        let stop = sqlx::query_as::<_, Stop>("SELECT * FROM stops WHERE id = $1")
            .bind(stop_id)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?
            .ok_or(AdminError::NotFound("Stop"))?;

        let neighbor_sql = match direction {
            MoveDirection::Up => {
                "SELECT * FROM stops WHERE tour_id = $1 AND sort_order < $2 \
                 ORDER BY sort_order DESC LIMIT 1"
            }
            MoveDirection::Down => {
                "SELECT * FROM stops WHERE tour_id = $1 AND sort_order > $2 \
                 ORDER BY sort_order ASC LIMIT 1"
            }
        };

        let neighbor = sqlx::query_as::<_, Stop>(neighbor_sql)
            .bind(stop.tour_id)
            .bind(stop.sort_order)
            .fetch_optional(&self.db_pool)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        let Some(neighbor) = neighbor else {
            return self.list_stops(stop.tour_id).await;
        };

        let mut tx = self
            .db_pool
            .begin()
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        sqlx::query("UPDATE stops SET sort_order = $1, updated_at = NOW() WHERE id = $2")
            .bind(neighbor.sort_order)
            .bind(stop.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        sqlx::query("UPDATE stops SET sort_order = $1, updated_at = NOW() WHERE id = $2")
            .bind(stop.sort_order)
            .bind(neighbor.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AdminError::DatabaseError(e.to_string()))?;

        self.list_stops(stop.tour_id).await
    }
}

/// Trim free-text input, mapping empty strings to NULL.
fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_optional_text() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("".to_string())), None);
        assert_eq!(normalize_optional_text(Some("   ".to_string())), None);
        assert_eq!(
            normalize_optional_text(Some("  Portland ".to_string())),
            Some("Portland".to_string())
        );
    }
}
