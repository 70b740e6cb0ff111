use sea_orm_migration::prelude::*;

use crate::datatype::{ColumnDefExt, timestamp, uuid_char};

#[derive(DeriveMigrationName)]
pub struct Migration;

const UNIQUE_CSR_SHA256SUM_INDEX: &str = "index-Csr-Sha256sum-Unique";
const UNIQUE_SUBJECT_ALT_NAME_INDEX: &str = "index-SubjectAltName-CsrId-Kind-Value-Unique";
const CERTIFICATE_CSR_ID_NOT_AFTER_INDEX: &str = "index-Certificate-CsrId-NotAfter";
const ACCESS_LOG_CSR_ID_INDEX: &str = "index-AccessLog-CsrId";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Csr::Table)
                    .if_not_exists()
                    .col(uuid_char(Csr::Id).primary_key())
                    .col(timestamp(Csr::CreatedDate, manager))
                    .col(ColumnDef::new(Csr::Sha256sum).char_len(64).not_null())
                    .col(ColumnDef::new(Csr::Pem).large_blob(manager).not_null())
                    .col(ColumnDef::new(Csr::Orgunit).string().not_null())
                    .col(ColumnDef::new(Csr::Commonname).string().not_null())
                    .col(
                        ColumnDef::new(Csr::Rejected)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_CSR_SHA256SUM_INDEX)
                    .table(Csr::Table)
                    .col(Csr::Sha256sum)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubjectAltName::Table)
                    .if_not_exists()
                    .col(uuid_char(SubjectAltName::Id).primary_key())
                    .col(uuid_char(SubjectAltName::CsrId))
                    .col(ColumnDef::new(SubjectAltName::Kind).string_len(8).not_null())
                    .col(ColumnDef::new(SubjectAltName::Value).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-SubjectAltName-CsrId")
                            .from_tbl(SubjectAltName::Table)
                            .from_col(SubjectAltName::CsrId)
                            .to_tbl(Csr::Table)
                            .to_col(Csr::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(UNIQUE_SUBJECT_ALT_NAME_INDEX)
                    .table(SubjectAltName::Table)
                    .col(SubjectAltName::CsrId)
                    .col(SubjectAltName::Kind)
                    .col(SubjectAltName::Value)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificate::Table)
                    .if_not_exists()
                    .col(uuid_char(Certificate::Id).primary_key())
                    .col(uuid_char(Certificate::CsrId))
                    .col(timestamp(Certificate::CreatedDate, manager))
                    .col(ColumnDef::new(Certificate::Pem).text().not_null())
                    .col(timestamp(Certificate::NotBefore, manager))
                    .col(timestamp(Certificate::NotAfter, manager))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-Certificate-CsrId")
                            .from_tbl(Certificate::Table)
                            .from_col(Certificate::CsrId)
                            .to_tbl(Csr::Table)
                            .to_col(Csr::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(CERTIFICATE_CSR_ID_NOT_AFTER_INDEX)
                    .table(Certificate::Table)
                    .col(Certificate::CsrId)
                    .col(Certificate::NotAfter)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccessLog::Table)
                    .if_not_exists()
                    .col(uuid_char(AccessLog::Id).primary_key())
                    .col(uuid_char(AccessLog::CsrId))
                    .col(timestamp(AccessLog::When, manager))
                    .col(ColumnDef::new(AccessLog::Addr).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-AccessLog-CsrId")
                            .from_tbl(AccessLog::Table)
                            .from_col(AccessLog::CsrId)
                            .to_tbl(Csr::Table)
                            .to_col(Csr::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(ACCESS_LOG_CSR_ID_INDEX)
                    .table(AccessLog::Table)
                    .col(AccessLog::CsrId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            AccessLog::Table.into_iden(),
            Certificate::Table.into_iden(),
            SubjectAltName::Table.into_iden(),
            Csr::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}

#[derive(Iden)]
pub enum Csr {
    Table,
    Id,
    CreatedDate,
    Sha256sum,
    Pem,
    Orgunit,
    Commonname,
    Rejected,
}

#[derive(Iden)]
pub enum SubjectAltName {
    Table,
    Id,
    CsrId,
    Kind,
    Value,
}

#[derive(Iden)]
pub enum Certificate {
    Table,
    Id,
    CsrId,
    CreatedDate,
    Pem,
    NotBefore,
    NotAfter,
}

#[derive(Iden)]
pub enum AccessLog {
    Table,
    Id,
    CsrId,
    When,
    Addr,
}
