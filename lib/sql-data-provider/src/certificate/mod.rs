use std::collections::HashMap;

use ca_core::model::certificate::CertificateLifetime;
use ca_core::repository::error::DataLayerError;
use sea_orm::sea_query::{Alias, Expr, Query};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use shared_types::CsrId;
use time::OffsetDateTime;

use crate::entity::certificate;
use crate::mapper::to_data_layer_error;

pub mod repository;
pub mod session;

pub(crate) struct CertificateProvider {
    pub db: DatabaseConnection,
}

/// Lifetime of the certificate with the latest expiry, per CSR
pub(crate) async fn latest_lifetimes(
    db: &impl ConnectionTrait,
) -> Result<HashMap<CsrId, CertificateLifetime>, DataLayerError> {
    let latest = Alias::new("latest");
    let rows: Vec<(CsrId, OffsetDateTime, OffsetDateTime)> = certificate::Entity::find()
        .select_only()
        .columns([
            certificate::Column::CsrId,
            certificate::Column::NotBefore,
            certificate::Column::NotAfter,
        ])
        .filter(
            certificate::Column::NotAfter.in_subquery(
                Query::select()
                    .expr(Expr::col((latest.clone(), certificate::Column::NotAfter)).max())
                    .from_as(certificate::Entity, latest.clone())
                    .and_where(
                        Expr::col((latest, certificate::Column::CsrId))
                            .equals((certificate::Entity, certificate::Column::CsrId)),
                    )
                    .to_owned(),
            ),
        )
        // ties on the expiry keep the latest start
        .order_by_desc(certificate::Column::NotBefore)
        .into_tuple()
        .all(db)
        .await
        .map_err(to_data_layer_error)?;

    let mut lifetimes = HashMap::new();
    for (csr_id, not_before, not_after) in rows {
        lifetimes.entry(csr_id).or_insert(CertificateLifetime {
            not_before,
            not_after,
        });
    }

    Ok(lifetimes)
}
