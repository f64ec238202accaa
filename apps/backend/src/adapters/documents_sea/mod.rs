//! SeaORM adapter for the documents table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::documents;

pub mod dto;

pub use dto::DocumentCreate;

// Adapter functions return DbErr; the store maps it to StoreError.

pub async fn find_by_path<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    path: &str,
) -> Result<Option<documents::Model>, sea_orm::DbErr> {
    documents::Entity::find_by_id(path.to_string()).one(conn).await
}

/// Direct children of a collection, in path order.
pub async fn find_in_collection<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    parent: &str,
) -> Result<Vec<documents::Model>, sea_orm::DbErr> {
    documents::Entity::find()
        .filter(documents::Column::Parent.eq(parent))
        .order_by_asc(documents::Column::Path)
        .all(conn)
        .await
}

/// Documents of every collection named `collection_id`, in path order.
pub async fn find_in_group<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    collection_id: &str,
) -> Result<Vec<documents::Model>, sea_orm::DbErr> {
    documents::Entity::find()
        .filter(documents::Column::CollectionId.eq(collection_id))
        .order_by_asc(documents::Column::Path)
        .all(conn)
        .await
}

/// Insert a new document at version `lock_version`.
///
/// A concurrent insert of the same path surfaces as a unique violation.
pub async fn insert_document<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: DocumentCreate,
    lock_version: i64,
) -> Result<documents::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    documents::ActiveModel {
        path: Set(dto.path),
        parent: Set(dto.parent),
        collection_id: Set(dto.collection_id),
        lock_version: Set(lock_version),
        body: Set(dto.body),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

fn lost_race(path: &str, expected: i64, actual: Option<i64>) -> sea_orm::DbErr {
    match actual {
        Some(actual) => sea_orm::DbErr::Custom(format!(
            "OPTIMISTIC_LOCK:{{\"path\":\"{path}\",\"expected\":{expected},\"actual\":{actual}}}"
        )),
        None => sea_orm::DbErr::RecordNotFound(format!("document {path} not found")),
    }
}

/// Replace the body of a document still at `current_lock_version`, bumping the version.
///
/// Zero affected rows means someone else changed or removed the row since it
/// was read; the error distinguishes the two.
pub async fn optimistic_update<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    path: &str,
    current_lock_version: i64,
    body: String,
) -> Result<(), sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();

    let result = documents::Entity::update_many()
        .col_expr(documents::Column::Body, Expr::val(body).into())
        .col_expr(documents::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            documents::Column::LockVersion,
            Expr::col(documents::Column::LockVersion).add(1),
        )
        .filter(documents::Column::Path.eq(path))
        .filter(documents::Column::LockVersion.eq(current_lock_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let actual = find_by_path(conn, path).await?.map(|row| row.lock_version);
        return Err(lost_race(path, current_lock_version, actual));
    }
    Ok(())
}

/// Delete a document still at `current_lock_version`.
pub async fn optimistic_delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    path: &str,
    current_lock_version: i64,
) -> Result<(), sea_orm::DbErr> {
    let result = documents::Entity::delete_many()
        .filter(documents::Column::Path.eq(path))
        .filter(documents::Column::LockVersion.eq(current_lock_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        let actual = find_by_path(conn, path).await?.map(|row| row.lock_version);
        return Err(lost_race(path, current_lock_version, actual));
    }
    Ok(())
}
