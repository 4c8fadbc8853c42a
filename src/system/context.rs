//! Application context
//!
//! Every shared component is built here once and handed out explicitly.

use std::sync::Arc;
use std::time::Duration;

use crate::config::StaticConfig;
use crate::services::{EvictionSweeper, LinkService, NotificationSink, Notifier, UserInboxSink};
use crate::storage::{LinkRegistry, RegistryConfig, UserRegistry};
use crate::utils::{Clock, CodeGenerator, SystemClock};

pub struct AppContext {
    pub config: Arc<StaticConfig>,
    pub clock: Arc<dyn Clock>,
    pub codes: Arc<CodeGenerator>,
    pub links: Arc<LinkRegistry>,
    pub users: Arc<UserRegistry>,
    pub notifier: Arc<Notifier>,
    pub link_service: Arc<LinkService>,
}

impl AppContext {
    pub fn new(config: StaticConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the context with a custom time source, delivering notifications
    /// to the users' inboxes.
    pub fn with_clock(config: StaticConfig, clock: Arc<dyn Clock>) -> Self {
        let users = Arc::new(UserRegistry::new(
            config.notifications.history_capacity,
            Arc::clone(&clock),
        ));
        let sink: Arc<dyn NotificationSink> = Arc::new(UserInboxSink::new(Arc::clone(&users)));
        Self::build(config, clock, users, sink)
    }

    /// Build the context with a custom notification sink.
    pub fn with_sink(
        config: StaticConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let users = Arc::new(UserRegistry::new(
            config.notifications.history_capacity,
            Arc::clone(&clock),
        ));
        Self::build(config, clock, users, sink)
    }

    fn build(
        config: StaticConfig,
        clock: Arc<dyn Clock>,
        users: Arc<UserRegistry>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let codes = Arc::new(CodeGenerator::new());
        let links = Arc::new(LinkRegistry::new(
            RegistryConfig::from_links_config(&config.links),
            Arc::clone(&codes),
            Arc::clone(&clock),
        ));
        let notifier = Arc::new(Notifier::new(sink, config.notifications.enabled));
        let link_service = Arc::new(LinkService::new(
            Arc::clone(&links),
            Arc::clone(&users),
            Arc::clone(&notifier),
            config.links.base_url.clone(),
        ));

        Self {
            config: Arc::new(config),
            clock,
            codes,
            links,
            users,
            notifier,
            link_service,
        }
    }

    pub fn sweeper(&self) -> EvictionSweeper {
        EvictionSweeper::new(
            Arc::clone(&self.links),
            Arc::clone(&self.users),
            Arc::clone(&self.notifier),
            Duration::from_secs(self.config.sweeper.interval_secs),
            Duration::from_secs(self.config.sweeper.stats_interval_secs),
        )
    }
}
