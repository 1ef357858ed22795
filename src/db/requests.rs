use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::AppResult;

/// A connection request as the receiving donor sees it. The sender columns
/// fall back to placeholders when the sender's account no longer exists.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    pub id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub recipient_id: Option<Uuid>,
    pub recipient_name: String,
    pub recipient_email: String,
}

/// A contacted donor as the sending user sees it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SentRequest {
    pub donor_id: Uuid,
    pub name: String,
    pub email: String,
    pub blood_group: String,
    pub city: String,
    pub contact_number: String,
    pub availability: String,
}

/// Inserts a connection request unless one already exists for the
/// (donor, sender) pair; returns false on a duplicate. The unique
/// constraint makes the insert atomic, so of two concurrent sends for the
/// same pair exactly one lands.
pub async fn insert_unique(
    pool: &DbPool,
    donor_id: &Uuid,
    recipient_user_id: &Uuid,
) -> AppResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO connection_requests (donor_id, recipient_user_id)
        VALUES ($1, $2)
        ON CONFLICT (donor_id, recipient_user_id) DO NOTHING
        "#,
    )
    .bind(donor_id)
    .bind(recipient_user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Removes every request the user has sent to the donor. Deleting nothing
/// is not an error; cancellation is idempotent.
pub async fn delete_for_pair(
    pool: &DbPool,
    donor_id: &Uuid,
    recipient_user_id: &Uuid,
) -> AppResult<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM connection_requests
        WHERE donor_id = $1 AND recipient_user_id = $2
        "#,
    )
    .bind(donor_id)
    .bind(recipient_user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Requests received by a donor profile, oldest first. Senders whose
/// accounts were deleted show up as "Unknown" with an empty email.
pub async fn list_for_donor(pool: &DbPool, donor_id: &Uuid) -> AppResult<Vec<IncomingRequest>> {
    let requests = sqlx::query_as::<_, IncomingRequest>(
        r#"
        SELECT cr.id,
               cr.status,
               cr.created_at,
               cr.recipient_user_id AS recipient_id,
               COALESCE(u.name, 'Unknown') AS recipient_name,
               COALESCE(u.email, '') AS recipient_email
        FROM connection_requests cr
        LEFT JOIN users u ON cr.recipient_user_id = u.id
        WHERE cr.donor_id = $1
        ORDER BY cr.seq
        "#,
    )
    .bind(donor_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}

/// Donors the user has sent requests to, oldest first.
pub async fn list_sent_by_user(pool: &DbPool, user_id: &Uuid) -> AppResult<Vec<SentRequest>> {
    let requests = sqlx::query_as::<_, SentRequest>(
        r#"
        SELECT d.id AS donor_id,
               u.name,
               u.email,
               d.blood_group,
               d.city,
               d.contact_number,
               d.availability
        FROM connection_requests cr
        JOIN donors d ON cr.donor_id = d.id
        JOIN users u ON d.user_id = u.id
        WHERE cr.recipient_user_id = $1
        ORDER BY cr.seq
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(requests)
}
