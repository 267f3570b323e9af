mod reconcile;
mod tab_actions;
#[cfg(test)]
mod tests;

use crate::cache::RouteCache;
use crate::config::ReuseTabConfig;
use crate::i18n::Translator;
use crate::router::Navigator;
use crate::scheduler::{EventScheduler, Trigger};
use crate::types::{ReuseItem, ReuseTabEvent};
use anyhow::Result;
use std::time::Instant;

/// Strip of reusable route tabs.
///
/// The strip is rebuilt from the cache and the live route on every
/// reconciliation; only the active position survives between runs.
/// Upstream signals are read from the collaborators' outboxes by [`pump`],
/// which runs one reconciliation at a time until nothing is left to do.
///
/// [`pump`]: ReuseTab::pump
pub struct ReuseTab<C: RouteCache, N: Navigator> {
    config: ReuseTabConfig,
    cache: C,
    navigator: N,
    translator: Option<Box<dyn Translator>>,
    scheduler: EventScheduler,
    list: Vec<ReuseItem>,
    item: Option<ReuseItem>,
    pos: usize,
    visible: bool,
    events: Vec<ReuseTabEvent>,
}

impl<C: RouteCache, N: Navigator> ReuseTab<C, N> {
    pub fn new(config: ReuseTabConfig, mut cache: C, navigator: N) -> Result<Self> {
        cache.apply_options(&config.cache_options()?);

        Ok(Self {
            config,
            cache,
            navigator,
            translator: None,
            scheduler: EventScheduler::new(false),
            list: Vec::new(),
            item: None,
            pos: 0,
            visible: true,
            events: Vec::new(),
        })
    }

    pub fn with_translator(mut self, translator: Box<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self.scheduler.set_translation_enabled(true);
        self
    }

    /// Replace the configuration and forward cache settings.
    pub fn set_config(&mut self, config: ReuseTabConfig) -> Result<()> {
        let options = config.cache_options()?;
        self.cache.apply_options(&options);
        self.config = config;
        self.emit(ReuseTabEvent::Refresh);
        Ok(())
    }

    pub fn config(&self) -> &ReuseTabConfig {
        &self.config
    }

    pub fn list(&self) -> &[ReuseItem] {
        &self.list
    }

    /// Active position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Tab selected by the last committed navigation.
    pub fn item(&self) -> Option<&ReuseItem> {
        self.item.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut N {
        &mut self.navigator
    }

    pub fn take_events(&mut self) -> Vec<ReuseTabEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ReuseTabEvent) {
        self.events.push(event);
    }

    /// First reconciliation. The route on screen counts as settled.
    pub fn init(&mut self, now: Instant) {
        self.scheduler.push(Trigger::NavigationSettled);
        self.pump(now);
    }

    /// Drain collaborator outboxes and run every due reconciliation.
    /// Returns how many ran.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut runs = 0;
        loop {
            self.collect_upstream(now);
            let Some(job) = self.scheduler.next_job(now) else {
                break;
            };
            self.reconcile(job.notify.as_ref());
            runs += 1;
        }
        runs
    }

    /// When the next debounced translation job is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    fn collect_upstream(&mut self, now: Instant) {
        for notify in self.cache.drain_notifications() {
            self.scheduler.push(Trigger::CacheChanged(notify));
        }
        for url in self.navigator.drain_settled() {
            crate::debug_log!("[reuse-tab] navigation settled at {}", url);
            self.scheduler.push(Trigger::NavigationSettled);
        }
        if let Some(translator) = self.translator.as_mut()
            && translator.take_change()
        {
            self.scheduler.translation_changed(now);
        }
    }

    /// Release every upstream feed. Nothing reconciles afterwards.
    pub fn dispose(&mut self) {
        self.scheduler.dispose();
        crate::debug_log!("[reuse-tab] disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.scheduler.is_disposed()
    }
}
