use sea_orm::DatabaseConnection;

pub mod repository;

mod mapper;

pub(crate) struct CsrProvider {
    pub db: DatabaseConnection,
}

#[cfg(test)]
mod test;
