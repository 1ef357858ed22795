use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::RecipientStatus;

/// One posted blood request. A user may post several; each carries its own
/// status flag.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_name: String,
    pub blood_group: String,
    pub city: String,
    pub hospital_name: String,
    pub contact_number: String,
    pub urgency: String,
    pub units_required: i32,
    pub status: String,
    pub date_requested: DateTime<Utc>,
}

/// Trimmed posting row for the donor dashboard; leaves out the owner id
/// and status flags.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecipientSummary {
    pub id: Uuid,
    pub patient_name: String,
    pub blood_group: String,
    pub city: String,
    pub hospital_name: String,
    pub contact_number: String,
    pub urgency: String,
    pub units_required: i32,
}

/// Validated fields for a new blood request posting.
#[derive(Debug)]
pub struct NewBloodRequest<'a> {
    pub patient_name: &'a str,
    pub blood_group: &'a str,
    pub city: &'a str,
    pub hospital_name: &'a str,
    pub contact_number: &'a str,
    pub urgency: &'a str,
    pub units_required: i32,
}

pub async fn insert(
    pool: &DbPool,
    user_id: &Uuid,
    request: &NewBloodRequest<'_>,
) -> AppResult<Recipient> {
    let recipient = sqlx::query_as::<_, Recipient>(
        r#"
        INSERT INTO recipients
            (user_id, patient_name, blood_group, city, hospital_name,
             contact_number, urgency, units_required)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, user_id, patient_name, blood_group, city, hospital_name,
                  contact_number, urgency, units_required, status, date_requested
        "#,
    )
    .bind(user_id)
    .bind(request.patient_name)
    .bind(request.blood_group)
    .bind(request.city)
    .bind(request.hospital_name)
    .bind(request.contact_number)
    .bind(request.urgency)
    .bind(request.units_required)
    .fetch_one(pool)
    .await?;

    Ok(recipient)
}

/// Open postings for the donor dashboard, newest first.
pub async fn list_pending(pool: &DbPool) -> AppResult<Vec<Recipient>> {
    let recipients = sqlx::query_as::<_, Recipient>(
        r#"
        SELECT id, user_id, patient_name, blood_group, city, hospital_name,
               contact_number, urgency, units_required, status, date_requested
        FROM recipients
        WHERE status = $1
        ORDER BY date_requested DESC
        "#,
    )
    .bind(RecipientStatus::Pending.as_str())
    .fetch_all(pool)
    .await?;

    Ok(recipients)
}

/// Every posting regardless of status, newest first, trimmed for the
/// donor dashboard.
pub async fn list_all(pool: &DbPool) -> AppResult<Vec<RecipientSummary>> {
    let recipients = sqlx::query_as::<_, RecipientSummary>(
        r#"
        SELECT id, patient_name, blood_group, city, hospital_name,
               contact_number, urgency, units_required
        FROM recipients
        ORDER BY date_requested DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(recipients)
}

pub async fn list_by_user(pool: &DbPool, user_id: &Uuid) -> AppResult<Vec<Recipient>> {
    let recipients = sqlx::query_as::<_, Recipient>(
        r#"
        SELECT id, user_id, patient_name, blood_group, city, hospital_name,
               contact_number, urgency, units_required, status, date_requested
        FROM recipients
        WHERE user_id = $1
        ORDER BY date_requested DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(recipients)
}

/// The user's most recent posting, the one the profile facade surfaces and
/// updates.
pub async fn latest_for_user(pool: &DbPool, user_id: &Uuid) -> AppResult<Option<Recipient>> {
    let recipient = sqlx::query_as::<_, Recipient>(
        r#"
        SELECT id, user_id, patient_name, blood_group, city, hospital_name,
               contact_number, urgency, units_required, status, date_requested
        FROM recipients
        WHERE user_id = $1
        ORDER BY date_requested DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(recipient)
}

pub async fn get_by_id(pool: &DbPool, id: &Uuid) -> AppResult<Option<Recipient>> {
    let recipient = sqlx::query_as::<_, Recipient>(
        r#"
        SELECT id, user_id, patient_name, blood_group, city, hospital_name,
               contact_number, urgency, units_required, status, date_requested
        FROM recipients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(recipient)
}

/// Applies facade updates to the user's most recent posting; `None` leaves
/// the column unchanged. Returns false when the user has no postings.
pub async fn update_latest_for_user(
    pool: &DbPool,
    user_id: &Uuid,
    patient_name: Option<&str>,
    hospital_name: Option<&str>,
    city: Option<&str>,
    contact_number: Option<&str>,
    urgency: Option<&str>,
    units_required: Option<i32>,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE recipients
        SET patient_name = COALESCE($2, patient_name),
            hospital_name = COALESCE($3, hospital_name),
            city = COALESCE($4, city),
            contact_number = COALESCE($5, contact_number),
            urgency = COALESCE($6, urgency),
            units_required = COALESCE($7, units_required)
        WHERE id = (
            SELECT id FROM recipients
            WHERE user_id = $1
            ORDER BY date_requested DESC
            LIMIT 1
        )
        "#,
    )
    .bind(user_id)
    .bind(patient_name)
    .bind(hospital_name)
    .bind(city)
    .bind(contact_number)
    .bind(urgency)
    .bind(units_required)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_by_id(pool: &DbPool, id: &Uuid) -> AppResult<()> {
    sqlx::query(
        r#"
        DELETE FROM recipients
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Removes every posting owned by the user (facade account deletion).
pub async fn delete_by_user_id(pool: &DbPool, user_id: &Uuid) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM recipients
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
        SELECT EXISTS (SELECT 1 FROM recipients WHERE user_id = $1)
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}
