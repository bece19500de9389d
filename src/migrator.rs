use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_users_table::Migration),
            Box::new(m20240601_000002_create_materials_table::Migration),
            Box::new(m20240601_000003_create_suppliers_table::Migration),
            Box::new(m20240601_000004_create_inventory_table::Migration),
            Box::new(m20240601_000005_create_invoices_table::Migration),
            Box::new(m20240601_000006_create_invoice_items_table::Migration),
            Box::new(m20240601_000007_create_employees_table::Migration),
            Box::new(m20240601_000008_create_messages_table::Migration),
        ]
    }
}

mod m20240601_000001_create_users_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Users::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Users::Username)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::Password).string().not_null())
                        .col(ColumnDef::new(Users::FullName).string().not_null())
                        .col(
                            ColumnDef::new(Users::Role)
                                .string_len(16)
                                .not_null()
                                .default("employee"),
                        )
                        .col(ColumnDef::new(Users::Email).string().null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Users {
        Table,
        Id,
        Username,
        Password,
        FullName,
        Role,
        Email,
        CreatedAt,
    }
}

mod m20240601_000002_create_materials_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(ColumnDef::new(Materials::Type).string().null())
                        .col(
                            ColumnDef::new(Materials::Unit)
                                .string()
                                .not_null()
                                .default("ml"),
                        )
                        .col(
                            ColumnDef::new(Materials::MinStock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Materials::CurrentStock)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Materials::Description).text().null())
                        .col(ColumnDef::new(Materials::ImageUrl).string().null())
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
        Name,
        Type,
        Unit,
        MinStock,
        CurrentStock,
        Description,
        ImageUrl,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_suppliers_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_suppliers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Suppliers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Suppliers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Suppliers::Name).string().not_null())
                        .col(ColumnDef::new(Suppliers::Phone).string().null())
                        .col(ColumnDef::new(Suppliers::Email).string().null())
                        .col(ColumnDef::new(Suppliers::Contact).string().null())
                        .col(ColumnDef::new(Suppliers::Address).string().null())
                        .col(ColumnDef::new(Suppliers::Note).text().null())
                        .col(
                            ColumnDef::new(Suppliers::Rating)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(
                            ColumnDef::new(Suppliers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Suppliers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
        Name,
        Phone,
        Email,
        Contact,
        Address,
        Note,
        Rating,
        CreatedAt,
    }
}

mod m20240601_000004_create_inventory_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::MaterialId).integer().null())
                        .col(ColumnDef::new(Inventory::SupplierId).integer().null())
                        .col(ColumnDef::new(Inventory::Quantity).big_integer().not_null())
                        .col(ColumnDef::new(Inventory::Price).big_integer().not_null())
                        .col(
                            ColumnDef::new(Inventory::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Inventory::Expiry)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Inventory::Status)
                                .string_len(16)
                                .not_null()
                                .default("fresh"),
                        )
                        .col(ColumnDef::new(Inventory::BatchCode).string().null())
                        .col(ColumnDef::new(Inventory::Note).text().null())
                        .col(
                            ColumnDef::new(Inventory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_material_id")
                                .from(Inventory::Table, Inventory::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inventory_supplier_id")
                                .from(Inventory::Table, Inventory::SupplierId)
                                .to(Suppliers::Table, Suppliers::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inventory {
        Table,
        Id,
        MaterialId,
        SupplierId,
        Quantity,
        Price,
        Date,
        Expiry,
        Status,
        BatchCode,
        Note,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Suppliers {
        Table,
        Id,
    }
}

mod m20240601_000005_create_invoices_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000005_create_invoices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Invoices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Invoices::Type).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Invoices::Date)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Invoices::PartnerName).string().null())
                        .col(
                            ColumnDef::new(Invoices::Total)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::Status)
                                .string_len(16)
                                .not_null()
                                .default("completed"),
                        )
                        .col(ColumnDef::new(Invoices::Note).text().null())
                        .col(ColumnDef::new(Invoices::InvoiceNumber).string().null())
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        Type,
        Date,
        PartnerName,
        Total,
        Status,
        Note,
        InvoiceNumber,
        CreatedAt,
    }
}

mod m20240601_000006_create_invoice_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000006_create_invoice_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InvoiceItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InvoiceItems::InvoiceId).integer().not_null())
                        .col(ColumnDef::new(InvoiceItems::MaterialId).integer().null())
                        .col(
                            ColumnDef::new(InvoiceItems::Quantity)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceItems::Price).big_integer().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_items_invoice_id")
                                .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_items_material_id")
                                .from(InvoiceItems::Table, InvoiceItems::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoiceItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InvoiceItems {
        Table,
        Id,
        InvoiceId,
        MaterialId,
        Quantity,
        Price,
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }
}

mod m20240601_000007_create_employees_table {
    use super::m20240601_000001_create_users_table::Users;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000007_create_employees_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::UserId).integer().not_null())
                        .col(
                            ColumnDef::new(Employees::Salary)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Employees::Shift).string().null())
                        .col(ColumnDef::new(Employees::Performance).string().null())
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_employees_user_id")
                                .from(Employees::Table, Employees::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        UserId,
        Salary,
        Shift,
        Performance,
        CreatedAt,
    }
}

mod m20240601_000008_create_messages_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000008_create_messages_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Messages::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Messages::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Messages::FromName).string().not_null())
                        .col(ColumnDef::new(Messages::Content).text().not_null())
                        .col(ColumnDef::new(Messages::Type).string_len(32).not_null())
                        .col(ColumnDef::new(Messages::Metadata).json_binary().null())
                        .col(
                            ColumnDef::new(Messages::Status)
                                .string_len(16)
                                .not_null()
                                .default("unread"),
                        )
                        .col(
                            ColumnDef::new(Messages::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Messages::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Messages {
        Table,
        Id,
        FromName,
        Content,
        Type,
        Metadata,
        Status,
        CreatedAt,
    }
}
