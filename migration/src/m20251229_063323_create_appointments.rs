use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 创建预约表
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    // ID: 由应用生成 UUID，数据库侧保留默认值以便手工插入
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Appointments::Name).string().not_null())
                    .col(ColumnDef::new(Appointments::Email).string().not_null())
                    .col(ColumnDef::new(Appointments::Phone).string().not_null())
                    .col(ColumnDef::new(Appointments::Service).string().not_null())
                    .col(ColumnDef::new(Appointments::Doctor).string())
                    .col(ColumnDef::new(Appointments::Date).date().not_null())
                    .col(ColumnDef::new(Appointments::Time).string().not_null())
                    .col(ColumnDef::new(Appointments::Message).text())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. 按日期建索引：计算当日排队号时使用
        manager
            .create_index(
                Index::create()
                    .name("idx_appointments_date")
                    .table(Appointments::Table)
                    .col(Appointments::Date)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_appointments_date").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Appointments {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Service,
    Doctor,
    Date,
    Time,
    Message,
    CreatedAt,
}
