//! Create points_of_sale table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PointsOfSale::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsOfSale::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsOfSale::Name).string().not_null())
                    .col(ColumnDef::new(PointsOfSale::Description).text())
                    .col(
                        ColumnDef::new(PointsOfSale::PosType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsOfSale::Campus)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointsOfSale::Street).string().not_null())
                    .col(ColumnDef::new(PointsOfSale::HouseNumber).string().not_null())
                    .col(
                        ColumnDef::new(PointsOfSale::PostalCode)
                            .integer()
                            .not_null()
                            .check(Expr::col(PointsOfSale::PostalCode).gte(0)),
                    )
                    .col(ColumnDef::new(PointsOfSale::City).string().not_null())
                    .col(
                        ColumnDef::new(PointsOfSale::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsOfSale::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_points_of_sale_created_at")
                    .table(PointsOfSale::Table)
                    .col(PointsOfSale::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PointsOfSale::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum PointsOfSale {
    Table,
    Id,
    Name,
    Description,
    PosType,
    Campus,
    Street,
    HouseNumber,
    PostalCode,
    City,
    CreatedAt,
    UpdatedAt,
}
