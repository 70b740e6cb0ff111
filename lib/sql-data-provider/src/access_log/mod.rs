use sea_orm::DatabaseConnection;

pub mod repository;

pub(crate) struct AccessLogProvider {
    pub db: DatabaseConnection,
}

#[cfg(test)]
mod test;
