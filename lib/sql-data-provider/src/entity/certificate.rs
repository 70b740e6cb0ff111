use ca_core::model::certificate::Certificate;
use one_dto_mapper::Into;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use shared_types::{CertificateId, CsrId};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Into)]
#[into(Certificate)]
#[sea_orm(table_name = "certificate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: CertificateId,
    pub csr_id: CsrId,
    pub created_date: OffsetDateTime,
    #[sea_orm(column_type = "Text")]
    pub pem: String,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::csr::Entity",
        from = "Column::CsrId",
        to = "super::csr::Column::Id",
        on_update = "Restrict",
        on_delete = "Cascade"
    )]
    Csr,
}

impl Related<super::csr::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Csr.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Certificate> for ActiveModel {
    fn from(value: Certificate) -> Self {
        Self {
            id: Set(value.id),
            csr_id: Set(value.csr_id),
            created_date: Set(value.created_date),
            pem: Set(value.pem),
            not_before: Set(value.not_before),
            not_after: Set(value.not_after),
        }
    }
}
