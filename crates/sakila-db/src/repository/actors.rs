//! Actor operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{Actor, NewActor};

use super::Database;

impl Database {
    /// List all actors
    pub async fn list_actors(&self) -> Result<Vec<Actor>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT actor_id, first_name, last_name, last_update
            FROM actor
            ORDER BY actor_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Actor::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get an actor by ID
    pub async fn get_actor(&self, actor_id: i64) -> Result<Option<Actor>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT actor_id, first_name, last_name, last_update
            FROM actor
            WHERE actor_id = ?
            "#,
        )
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Actor::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Insert a new actor
    pub async fn insert_actor(&self, actor: NewActor) -> Result<Actor, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO actor (first_name, last_name, last_update)
            VALUES (?, ?, ?)
            RETURNING actor_id
            "#,
        )
        .bind(&actor.first_name)
        .bind(&actor.last_name)
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(Actor {
            actor_id: result.get("actor_id"),
            first_name: actor.first_name,
            last_name: actor.last_name,
            last_update: now,
        })
    }

    /// Replace an actor's names, returning the updated row if it exists
    pub async fn update_actor(
        &self,
        actor_id: i64,
        actor: NewActor,
    ) -> Result<Option<Actor>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE actor
            SET first_name = ?, last_name = ?, last_update = ?
            WHERE actor_id = ?
            "#,
        )
        .bind(&actor.first_name)
        .bind(&actor.last_name)
        .bind(now.to_rfc3339())
        .bind(actor_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Actor {
            actor_id,
            first_name: actor.first_name,
            last_name: actor.last_name,
            last_update: now,
        }))
    }

    /// Delete an actor
    pub async fn delete_actor(&self, actor_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM actor WHERE actor_id = ?")
            .bind(actor_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
