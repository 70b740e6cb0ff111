use ca_core::model::csr::Csr;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use shared_types::CsrId;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "csr")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: CsrId,
    pub created_date: OffsetDateTime,
    #[sea_orm(unique)]
    pub sha256sum: String,
    pub pem: Vec<u8>,
    pub orgunit: String,
    pub commonname: String,
    pub rejected: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::access_log::Entity")]
    AccessLog,
    #[sea_orm(has_many = "super::certificate::Entity")]
    Certificate,
    #[sea_orm(has_many = "super::subject_alt_name::Entity")]
    SubjectAltName,
}

impl Related<super::access_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccessLog.def()
    }
}

impl Related<super::certificate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificate.def()
    }
}

impl Related<super::subject_alt_name::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubjectAltName.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Csr> for ActiveModel {
    fn from(csr: &Csr) -> Self {
        Self {
            id: Set(csr.id),
            created_date: Set(csr.created_date),
            sha256sum: Set(csr.sha256sum.to_owned()),
            pem: Set(csr.pem.to_owned()),
            orgunit: Set(csr.orgunit.to_owned()),
            commonname: Set(csr.commonname.to_owned()),
            rejected: Set(csr.rejected),
        }
    }
}

impl From<Model> for Csr {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            created_date: value.created_date,
            sha256sum: value.sha256sum,
            pem: value.pem,
            orgunit: value.orgunit,
            commonname: value.commonname,
            rejected: value.rejected,
            subject_alt_names: None,
            certificates: None,
        }
    }
}
