//! Business logic services

pub mod auth;
pub mod borrowings;
pub mod catalog;
pub mod storage;

use crate::{config::AuthConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub borrowings: borrowings::BorrowingsService,
    pub storage: storage::StorageService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub async fn new(
        repository: Repository,
        auth_config: AuthConfig,
        storage: storage::StorageService,
    ) -> AppResult<Self> {
        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone(), storage.clone()),
            borrowings: borrowings::BorrowingsService::new(repository.clone(), storage.clone()),
            storage,
            repository,
        })
    }
}
