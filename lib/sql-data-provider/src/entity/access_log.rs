use ca_core::model::access_log::AccessLog;
use one_dto_mapper::Into;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use shared_types::{AccessLogId, CsrId};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Into)]
#[into(AccessLog)]
#[sea_orm(table_name = "access_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: AccessLogId,
    pub csr_id: CsrId,
    pub when: OffsetDateTime,
    pub addr: String,
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

impl From<AccessLog> for ActiveModel {
    fn from(value: AccessLog) -> Self {
        Self {
            id: Set(value.id),
            csr_id: Set(value.csr_id),
            when: Set(value.when),
            addr: Set(value.addr),
        }
    }
}
