use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppResult;

/// Donor profile row. One per user, enforced by the unique constraint on
/// user_id.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub blood_group: String,
    pub city: String,
    pub contact_number: String,
    pub availability: String,
    pub additional_info: Option<String>,
    pub date_created: DateTime<Utc>,
}

/// Donor joined with the owning user's display fields, as shown to
/// recipients browsing for a match.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDonor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub blood_group: String,
    pub city: String,
    pub contact_number: String,
    pub availability: String,
    pub additional_info: Option<String>,
}

/// Creates or replaces the user's single donor profile in one statement.
/// Returns true when a new row was inserted, false when an existing profile
/// was updated.
///
/// Omitted availability keeps the stored value (or the 'yes' default on
/// first creation).
pub async fn upsert_profile(
    pool: &DbPool,
    user_id: &Uuid,
    blood_group: &str,
    city: &str,
    contact_number: &str,
    availability: Option<&str>,
    additional_info: Option<&str>,
) -> AppResult<bool> {
    // xmax = 0 only for rows created by this statement
    let inserted: bool = sqlx::query_scalar(
        r#"
        INSERT INTO donors (user_id, blood_group, city, contact_number, availability, additional_info)
        VALUES ($1, $2, $3, $4, COALESCE($5, 'yes'), $6)
        ON CONFLICT (user_id) DO UPDATE SET
            blood_group = EXCLUDED.blood_group,
            city = EXCLUDED.city,
            contact_number = EXCLUDED.contact_number,
            availability = COALESCE($5, donors.availability),
            additional_info = EXCLUDED.additional_info
        RETURNING (xmax = 0) AS inserted
        "#,
    )
    .bind(user_id)
    .bind(blood_group)
    .bind(city)
    .bind(contact_number)
    .bind(availability)
    .bind(additional_info)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

pub async fn get_by_user_id(pool: &DbPool, user_id: &Uuid) -> AppResult<Option<Donor>> {
    let donor = sqlx::query_as::<_, Donor>(
        r#"
        SELECT id, user_id, blood_group, city, contact_number, availability,
               additional_info, date_created
        FROM donors
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(donor)
}

pub async fn get_by_id(pool: &DbPool, id: &Uuid) -> AppResult<Option<Donor>> {
    let donor = sqlx::query_as::<_, Donor>(
        r#"
        SELECT id, user_id, blood_group, city, contact_number, availability,
               additional_info, date_created
        FROM donors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(donor)
}

/// Unconditional overwrite of the availability flag. Returns false when the
/// user has no donor profile.
pub async fn set_availability(
    pool: &DbPool,
    user_id: &Uuid,
    availability: &str,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE donors
        SET availability = $2
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(availability)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Applies facade updates to the user's donor profile; `None` leaves the
/// column unchanged. Returns false when the user has no profile.
pub async fn update_fields(
    pool: &DbPool,
    user_id: &Uuid,
    blood_group: Option<&str>,
    city: Option<&str>,
    contact_number: Option<&str>,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE donors
        SET blood_group = COALESCE($2, blood_group),
            city = COALESCE($3, city),
            contact_number = COALESCE($4, contact_number)
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .bind(blood_group)
    .bind(city)
    .bind(contact_number)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_available(pool: &DbPool) -> AppResult<Vec<AvailableDonor>> {
    let donors = sqlx::query_as::<_, AvailableDonor>(
        r#"
        SELECT d.id, u.name, u.email, d.blood_group, d.city, d.contact_number,
               d.availability, d.additional_info
        FROM donors d
        JOIN users u ON d.user_id = u.id
        WHERE d.availability = 'yes'
        ORDER BY d.date_created DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(donors)
}

/// Deletes a donor profile by its record id. Connection requests addressed
/// to it go with it (cascade).
pub async fn delete_by_id(pool: &DbPool, id: &Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM donors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Removes the user's donor profile if one exists (facade account deletion).
pub async fn delete_by_user_id(pool: &DbPool, user_id: &Uuid) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM donors
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

pub async fn exists_for_user(pool: &DbPool, user_id: &Uuid) -> AppResult<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (SELECT 1 FROM donors WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
