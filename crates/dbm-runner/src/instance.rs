//! Dev instance provisioning

use crate::error::RunnerResult;
use dbm_core::{CoreError, InstanceNamer};
use dbm_db::DatabaseCatalog;

/// Locates and clones hash-named development databases
pub struct DevInstance<'a> {
    catalog: &'a dyn DatabaseCatalog,
    namer: InstanceNamer<'a>,
}

impl<'a> DevInstance<'a> {
    /// Create a provisioner over the cluster catalog
    pub fn new(catalog: &'a dyn DatabaseCatalog, namer: InstanceNamer<'a>) -> Self {
        Self { catalog, namer }
    }

    /// Name of the dev database for the full patch list
    pub fn name(&self) -> String {
        self.namer.instance_name(true)
    }

    /// Nearest existing ancestor, dropping trailing patches one at a time
    pub async fn closest_existing(&self) -> RunnerResult<String> {
        for candidate in self.namer.candidate_names() {
            if self.catalog.database_exists(&candidate).await? {
                log::debug!("Closest existing database is {}", candidate);
                return Ok(candidate);
            }
        }
        Err(CoreError::InstanceNotFound {
            base: self.namer.base().to_string(),
        }
        .into())
    }

    /// Ensure the dev database exists, cloning the closest ancestor if not.
    ///
    /// Returns the template used, or `None` when the database already
    /// existed. Patches the ancestor lacks are applied by the normal upgrade
    /// loop afterwards.
    pub async fn rewind_invalid_patches(&self) -> RunnerResult<Option<String>> {
        let name = self.name();
        if self.catalog.database_exists(&name).await? {
            return Ok(None);
        }
        let template = self.closest_existing().await?;
        self.catalog
            .create_database_from_template(&name, &template)
            .await?;
        log::info!("Created dev database {} from {}", name, template);
        Ok(Some(template))
    }
}
