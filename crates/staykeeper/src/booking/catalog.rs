use super::domain::{Unit, UnitId};

/// Read-only view of the unit catalog collaborator. The core consumes
/// pricing fields and the listing kind; it never writes back to a unit.
pub trait UnitCatalog: Send + Sync {
    fn fetch(&self, id: &UnitId) -> Result<Option<Unit>, CatalogError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}
