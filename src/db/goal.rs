// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal storage, keyed by the (athlete, type, field, freq) tuple.

use super::Db;
use crate::error::AppError;
use crate::models::Goal;
use std::collections::HashMap;

const GOAL_COLUMNS: &str =
    "id, athlete_id, type, field, freq, value, created_at, updated_at, deleted_at";

impl Db {
    /// Create a goal. Fails with `Conflict` when a live goal already
    /// exists for the same (athlete, type, field, freq); a partial unique
    /// index backs the check against races.
    pub async fn create_goal(
        &self,
        athlete_id: i64,
        activity_type: &str,
        field: &str,
        freq: &str,
        value: f64,
    ) -> Result<Goal, AppError> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM goal \
             WHERE athlete_id = $1 AND type = $2 AND field = $3 AND freq = $4 AND deleted_at = 0",
        )
        .bind(athlete_id)
        .bind(activity_type)
        .bind(field)
        .bind(freq)
        .fetch_optional(self.pool())
        .await?;

        if existing.is_some() {
            return Err(AppError::Conflict("goal exists".to_string()));
        }

        let goal = sqlx::query_as::<_, Goal>(&format!(
            "INSERT INTO goal (athlete_id, type, field, freq, value) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {GOAL_COLUMNS}",
        ))
        .bind(athlete_id)
        .bind(activity_type)
        .bind(field)
        .bind(freq)
        .bind(value)
        .fetch_one(self.pool())
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("goal exists".to_string())
            }
            _ => AppError::from(e),
        })?;

        Ok(goal)
    }

    /// Fetch one goal by surrogate id, athlete-scoped.
    pub async fn get_goal(&self, athlete_id: i64, goal_id: i64) -> Result<Option<Goal>, AppError> {
        let row = sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal \
             WHERE athlete_id = $1 AND id = $2 AND deleted_at = 0",
        ))
        .bind(athlete_id)
        .bind(goal_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row)
    }

    /// Update a goal's target value. `NotFound` when the row is absent.
    pub async fn update_goal_value(
        &self,
        athlete_id: i64,
        goal_id: i64,
        value: f64,
    ) -> Result<(), AppError> {
        if self.get_goal(athlete_id, goal_id).await?.is_none() {
            return Err(AppError::NotFound("goal not found".to_string()));
        }

        sqlx::query(
            "UPDATE goal SET value = $1, updated_at = now() \
             WHERE athlete_id = $2 AND id = $3 AND deleted_at = 0",
        )
        .bind(value)
        .bind(athlete_id)
        .bind(goal_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Soft-delete a goal. `NotFound` when the row is absent.
    pub async fn delete_goal(&self, athlete_id: i64, goal_id: i64) -> Result<(), AppError> {
        if self.get_goal(athlete_id, goal_id).await?.is_none() {
            return Err(AppError::NotFound("goal not found".to_string()));
        }

        sqlx::query(
            "UPDATE goal SET deleted_at = extract(epoch FROM now())::bigint, updated_at = now() \
             WHERE athlete_id = $1 AND id = $2 AND deleted_at = 0",
        )
        .bind(athlete_id)
        .bind(goal_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// List goals for one (athlete, type, field) across all frequencies.
    pub async fn query_goals(
        &self,
        athlete_id: i64,
        activity_type: &str,
        field: &str,
    ) -> Result<Vec<Goal>, AppError> {
        let rows = sqlx::query_as::<_, Goal>(&format!(
            "SELECT {GOAL_COLUMNS} FROM goal \
             WHERE athlete_id = $1 AND type = $2 AND field = $3 AND deleted_at = 0",
        ))
        .bind(athlete_id)
        .bind(activity_type)
        .bind(field)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    /// Goals for one (athlete, type, field) as a freq -> value map, for
    /// the progress snapshot.
    pub async fn goal_values(
        &self,
        athlete_id: i64,
        activity_type: &str,
        field: &str,
    ) -> Result<HashMap<String, f64>, AppError> {
        let goals = self.query_goals(athlete_id, activity_type, field).await?;
        Ok(goals.into_iter().map(|g| (g.freq, g.value)).collect())
    }
}
