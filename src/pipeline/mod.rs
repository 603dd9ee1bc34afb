//! The take pipeline
//!
//! A run is a single directed pass:
//!
//! ```text
//! load rosters -> load context -> fan out -> generate takes (xN) -> accumulate -> publish
//! ```
//!
//! Roster and context loading are fatal on failure. Each branch of the map
//! stage is isolated: its error or panic removes only its own takes. The
//! branch results are folded with [`TakeList::combine`] in dispatch order
//! and every resulting take is delivered independently.

pub mod aggregation;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod executor;
pub mod generator;
pub mod publisher;
pub mod roster;
pub mod types;
pub mod validation;

pub use aggregation::{accumulate, AggregationSummary, TakeList};
pub use context::{format_context, load_context};
pub use dispatch::fan_out;
pub use errors::{PipelineError, PipelineResult, PipelineStage};
pub use executor::{execute_branches, BranchOutcome, BranchStatus, ExecutionStrategy};
pub use generator::{TakeDraft, TakeGenerator};
pub use publisher::{PublishReport, Publisher};
pub use roster::{load_rosters, TeamDirectory};
pub use types::{RunState, SharedContext, Take, TeamRoster, WorkItem};

use crate::claude::{ClaudeClient, TextGenerator};
use crate::config::TakeBotConfig;
use crate::error::Result;
use crate::forum::reddit::RedditClient;
use crate::forum::{ForumProvider, TopPostsQuery};
use crate::league::espn::EspnClient;
use crate::league::LeagueProvider;
use crate::notify::{LoggingSink, NotificationSink, SlackWebhook};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

/// External services a run talks to
#[derive(Clone)]
pub struct Collaborators {
    pub league: Arc<dyn LeagueProvider>,
    pub forum: Arc<dyn ForumProvider>,
    pub backend: Arc<dyn TextGenerator>,
    pub sink: Arc<dyn NotificationSink>,
}

/// What one run did
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rosters: usize,
    pub aggregation: AggregationSummary,
    pub delivered: usize,
    pub delivery_failures: usize,
    #[serde(with = "humantime_serde")]
    pub duration: Duration,
}

pub struct Pipeline {
    league: Arc<dyn LeagueProvider>,
    forum: Arc<dyn ForumProvider>,
    generator: Arc<TakeGenerator>,
    publisher: Publisher,
    directory: TeamDirectory,
    query: TopPostsQuery,
    strategy: ExecutionStrategy,
}

impl Pipeline {
    pub fn new(collaborators: Collaborators, config: &TakeBotConfig) -> Result<Self> {
        Ok(Self {
            league: collaborators.league,
            forum: collaborators.forum,
            generator: Arc::new(TakeGenerator::new(collaborators.backend)?),
            publisher: Publisher::new(collaborators.sink),
            directory: TeamDirectory::new(config.teams.clone()),
            query: TopPostsQuery::from(&config.forum),
            strategy: ExecutionStrategy::from_max_parallel(config.pipeline.max_parallel),
        })
    }

    /// Wire the production clients. A dry run logs payloads instead of
    /// posting them.
    pub fn from_config(config: &TakeBotConfig, dry_run: bool) -> Result<Self> {
        let sink: Arc<dyn NotificationSink> = if dry_run {
            Arc::new(LoggingSink)
        } else {
            Arc::new(SlackWebhook::new(&config.notify)?)
        };

        let collaborators = Collaborators {
            league: Arc::new(EspnClient::new(&config.league)?),
            forum: Arc::new(RedditClient::new(&config.forum)?),
            backend: Arc::new(ClaudeClient::new(&config.llm)?),
            sink,
        };
        Self::new(collaborators, config)
    }

    pub async fn run(&self) -> PipelineResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        info!("Starting take-bot run {}", run_id);

        let rosters = load_rosters(self.league.as_ref(), &self.directory)
            .await
            .map_err(|e| PipelineError::stage(PipelineStage::LoadRosters, e))?;
        if rosters.is_empty() {
            warn!("League returned no teams");
        }

        let context = load_context(self.forum.as_ref(), &self.query)
            .await
            .map_err(|e| PipelineError::stage(PipelineStage::LoadContext, e))?;

        let mut state = RunState::new(rosters, context);
        let items = fan_out(&state.rosters, &state.context);

        let generator = Arc::clone(&self.generator);
        let outcomes = execute_branches(items, self.strategy, move |item| {
            let generator = Arc::clone(&generator);
            async move { generator.generate(&item).await }.boxed()
        })
        .await;

        let (takes, aggregation) = accumulate(outcomes);
        state.takes = TakeList::combine(std::mem::take(&mut state.takes), takes);

        let report = self.publisher.publish(&state.takes).await;

        let summary = RunSummary {
            run_id,
            started_at,
            rosters: state.rosters.len(),
            aggregation,
            delivered: report.delivered,
            delivery_failures: report.failed.len(),
            duration: start.elapsed(),
        };
        info!(
            "Run {} finished: {} rosters, {} takes, {} delivered, {} failed branches in {:?}",
            summary.run_id,
            summary.rosters,
            summary.aggregation.takes,
            summary.delivered,
            summary.aggregation.failed,
            summary.duration
        );
        Ok(summary)
    }
}
