use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Documents {
    Table,
    Path,
    Parent,
    CollectionId,
    LockVersion,
    Body,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Path)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::Parent).text().not_null())
                    .col(ColumnDef::new(Documents::CollectionId).text().not_null())
                    .col(
                        ColumnDef::new(Documents::LockVersion)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    // JSON text rather than jsonb: key order of the body is part of the record
                    .col(ColumnDef::new(Documents::Body).text().not_null())
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Documents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_documents_parent")
                    .table(Documents::Table)
                    .col(Documents::Parent)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_documents_collection_id")
                    .table(Documents::Table)
                    .col(Documents::CollectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("ix_documents_collection_id")
                    .table(Documents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_documents_parent")
                    .table(Documents::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}
