//! Runtime context for CLI commands

use anyhow::{bail, Context, Result};
use dbm_core::{ConfigOverrides, CoreError, InstanceNamer, PatchSet, ProjectConfig, Settings};
use dbm_db::{Database, PsqlBackend};
use dbm_runner::DevInstance;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Runtime context containing resolved settings, patches and database handles
pub struct RuntimeContext {
    /// Resolved settings
    pub settings: Settings,

    /// Handle on the configured base database, also used for cluster-level calls
    pub base: PsqlBackend,

    /// Handle on the database commands act on (the dev instance in dev mode)
    pub target: PsqlBackend,

    patches: Option<PatchSet>,
}

impl RuntimeContext {
    /// Resolve settings and discover patches without touching the database.
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let project_root = std::fs::canonicalize(&args.project_dir).with_context(|| {
            format!("Failed to open project directory {}", args.project_dir)
        })?;
        let config = ProjectConfig::load_from_dir(&project_root)
            .context("Failed to load project configuration")?;

        let overrides = ConfigOverrides {
            patches: args.patches.clone(),
            schema: args.schema.clone(),
            db_config: args.db_config.clone(),
            dev_mode: args.dev_mode,
            force: args.yes,
            per_file: args.per_file,
        };
        let settings = Settings::resolve(&project_root, &config, &overrides)?;

        let patches = match &settings.patch_dir {
            Some(dir) => Some(PatchSet::discover(dir).context("Failed to read patches")?),
            None => None,
        };

        let base = PsqlBackend::from_settings(&settings);
        let target = if settings.dev_mode {
            let patches = patches.as_ref().ok_or(CoreError::PatchDirNotConfigured)?;
            let name = InstanceNamer::new(&settings.connection.database, patches)
                .instance_name(true);
            base.with_database(&name)
        } else {
            base.clone()
        };
        log::debug!("Target database is {}", target.database_name());

        Ok(Self {
            settings,
            base,
            target,
            patches,
        })
    }

    /// Context for every command except `init`: in dev mode the caller must
    /// acknowledge data loss, and the dev database is provisioned up front.
    pub async fn for_command(args: &GlobalArgs) -> Result<Self> {
        if args.dev_mode && !args.permit_data_loss {
            bail!(
                "In order to use dev_mode, you must pass the parameter --WARNING__permit_data_loss."
            );
        }
        let ctx = Self::new(args)?;
        if ctx.settings.dev_mode {
            ctx.rewind_dev_instance().await?;
        }
        Ok(ctx)
    }

    /// The discovered patch set
    pub fn patches(&self) -> Result<&PatchSet> {
        Ok(self
            .patches
            .as_ref()
            .ok_or(CoreError::PatchDirNotConfigured)?)
    }

    /// The saved schema path; required by init, upgrade, save and verify
    pub fn schema_path(&self) -> Result<&Path> {
        match &self.settings.schema_path {
            Some(path) => Ok(path),
            None => bail!("Schema path was not provided. Pass --schema=<file>"),
        }
    }

    /// Create the dev database from its closest existing ancestor if missing
    pub async fn rewind_dev_instance(&self) -> Result<()> {
        let patches = self.patches()?;
        let namer = InstanceNamer::new(&self.settings.connection.database, patches);
        let instance = DevInstance::new(&self.base, namer);
        if let Some(template) = instance.rewind_invalid_patches().await? {
            log::info!("Provisioned {} from {}", instance.name(), template);
        }
        Ok(())
    }
}
