use ca_core::model::subject_alt_name::{SubjectAltName, SubjectAltNameKind as ModelKind};
use ca_core::repository::error::DataLayerError;
use one_dto_mapper::{From, Into};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use shared_types::{CsrId, SubjectAltNameId};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subject_alt_name")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: SubjectAltNameId,
    pub csr_id: CsrId,
    pub kind: SubjectAltNameKind,
    pub value: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, DeriveActiveEnum, Into, From)]
#[from(ModelKind)]
#[into(ModelKind)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum SubjectAltNameKind {
    #[sea_orm(string_value = "email")]
    Email,
    #[sea_orm(string_value = "DNS")]
    Dns,
    #[sea_orm(string_value = "IP")]
    Ip,
    #[sea_orm(string_value = "URI")]
    Uri,
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

impl From<SubjectAltName> for ActiveModel {
    fn from(value: SubjectAltName) -> Self {
        Self {
            id: Set(value.id()),
            csr_id: Set(value.csr_id()),
            kind: Set(value.kind().into()),
            value: Set(value.value().to_owned()),
        }
    }
}

impl TryFrom<Model> for SubjectAltName {
    type Error = DataLayerError;

    fn try_from(value: Model) -> Result<Self, Self::Error> {
        SubjectAltName::with_id(value.id, value.csr_id, value.kind.into(), &value.value)
            .map_err(|_| DataLayerError::MappingError)
    }
}
