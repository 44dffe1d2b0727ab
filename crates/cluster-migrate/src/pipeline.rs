//! Migration pipeline orchestration.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::client::{AdminClient, HttpAdminClient};
use crate::compat::{ensure_compatible, NodeInfo};
use crate::config::{MigrationConfig, MigrationOptions};
use crate::error::{Error, Result};
use crate::plan::{MigrationPlan, PlanStep, Relation};
use crate::reader::CollectionReader;
use crate::record::Record;
use crate::transfer::{transfer, TransferOutcome};

/// Migration statistics.
#[derive(Debug, Default, Clone)]
pub struct MigrationStats {
    /// Records read from the source and attempted at the destination.
    pub read: u64,
    /// Records created on the destination.
    pub created: u64,
    /// Records skipped because the destination already had them.
    pub skipped: u64,
    /// Records that would have been written (dry run).
    pub planned: u64,
    /// Source pages fetched, parents and relations included.
    pub pages: u64,
    /// Plan steps completed.
    pub steps: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
}

impl MigrationStats {
    /// Calculate throughput (records per second).
    #[must_use]
    pub fn throughput(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.read as f64 / self.duration_secs
        } else {
            0.0
        }
    }
}

/// Migration pipeline.
///
/// Every request is awaited before the next one is issued, and the first
/// error ends the run.
pub struct Pipeline {
    source: Box<dyn AdminClient>,
    destination: Box<dyn AdminClient>,
    plan: MigrationPlan,
    options: MigrationOptions,
}

impl Pipeline {
    /// Create a new migration pipeline talking HTTP to the configured
    /// endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or incomplete.
    pub fn new(config: MigrationConfig) -> Result<Self> {
        config.validate()?;
        let (source, destination) = config.endpoints()?;
        let timeout = config.options.timeout();

        Ok(Self {
            source: Box::new(HttpAdminClient::new(source, timeout)?),
            destination: Box::new(HttpAdminClient::new(destination, timeout)?),
            plan: config.plan()?,
            options: config.options,
        })
    }

    /// Create a pipeline over arbitrary admin clients.
    pub fn with_clients(
        source: Box<dyn AdminClient>,
        destination: Box<dyn AdminClient>,
        plan: MigrationPlan,
        options: MigrationOptions,
    ) -> Self {
        Self {
            source,
            destination,
            plan,
            options,
        }
    }

    /// The plan this pipeline executes.
    #[must_use]
    pub fn plan(&self) -> &MigrationPlan {
        &self.plan
    }

    /// Run only the compatibility gate.
    ///
    /// # Errors
    ///
    /// Returns an error if the clusters are unreachable or incompatible.
    pub async fn check(&self) -> Result<NodeInfo> {
        ensure_compatible(
            self.source.as_ref(),
            self.destination.as_ref(),
            self.options.check_version,
        )
        .await
    }

    /// Run the migration pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first error; records transferred before it stay on the
    /// destination.
    pub async fn run(&self) -> Result<MigrationStats> {
        let start = std::time::Instant::now();
        let mut stats = MigrationStats::default();

        info!(
            "Starting migration {} -> {}",
            self.source.endpoint(),
            self.destination.endpoint()
        );

        self.check().await?;

        if self.options.dry_run {
            info!("Dry run mode - not writing to destination");
        }

        let progress = create_progress_bar();
        let total = self.plan.len();

        for (i, step) in self.plan.steps().iter().enumerate() {
            info!("Step {}/{}: {}", i + 1, total, step);
            progress.set_message(step.to_string());

            self.run_step(step, &mut stats, &progress).await?;
            stats.steps += 1;
        }

        progress.finish_with_message("Migration complete");

        stats.duration_secs = start.elapsed().as_secs_f64();

        info!(
            "Migration complete: {} read, {} created, {} skipped, {} planned in {:.2}s ({:.0} records/sec)",
            stats.read,
            stats.created,
            stats.skipped,
            stats.planned,
            stats.duration_secs,
            stats.throughput()
        );

        Ok(stats)
    }

    async fn run_step(
        &self,
        step: &PlanStep,
        stats: &mut MigrationStats,
        progress: &ProgressBar,
    ) -> Result<()> {
        let mut records = CollectionReader::new(self.source.as_ref(), step.collection.as_str());

        while let Some(record) = records.next_record().await? {
            match &step.relation {
                None => {
                    self.replay(&step.collection, &record, stats).await?;
                    progress.inc(1);
                }
                Some(relation) => {
                    self.run_relation(&step.collection, relation, &record, stats, progress)
                        .await?;
                }
            }
        }

        stats.pages += records.pages_fetched();
        Ok(())
    }

    /// Migrates one parent's relation sub-collection completely.
    async fn run_relation(
        &self,
        collection: &str,
        relation: &Relation,
        parent: &Record,
        stats: &mut MigrationStats,
        progress: &ProgressBar,
    ) -> Result<()> {
        let parent_id = parent.id().ok_or_else(|| Error::MissingId {
            collection: collection.to_string(),
        })?;
        let path = relation.path_for(collection, &parent_id)?;

        let mut children = CollectionReader::new(self.source.as_ref(), path.as_str());
        while let Some(child) = children.next_record().await? {
            self.replay(&path, &child, stats).await?;
            progress.inc(1);
        }

        stats.pages += children.pages_fetched();
        Ok(())
    }

    async fn replay(&self, path: &str, record: &Record, stats: &mut MigrationStats) -> Result<()> {
        stats.read += 1;

        if self.options.dry_run {
            stats.planned += 1;
            return Ok(());
        }

        match transfer(self.destination.as_ref(), path, record).await? {
            TransferOutcome::Created => stats.created += 1,
            TransferOutcome::AlreadyExists => stats.skipped += 1,
        }
        Ok(())
    }
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    pb
}
