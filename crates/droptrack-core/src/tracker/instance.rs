use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::BossRules;
use crate::config::delimiters::INSTANCE_FIELD;
use crate::error::Result;
use crate::events::{Cue, LifecycleEvent, Notifier};
use crate::model::{Instance, InstanceId, NewInstance, Timestamp};
use crate::protocol::Fields;
use crate::storage::Repository;

/// Instance envelope field positions.
mod field {
    pub const DIFFICULTY: usize = 3;
    pub const CORRELATION_ID: usize = 4;
    pub const COMPLETION_FLAG: usize = 7;
    pub const NAME: usize = 10;
    pub const MIN_FIELDS: usize = 11;
}

/// Dungeon run state machine
///
/// ## States
///
/// - NoOpenInstance: no run is being tracked
/// - Open: kills are matched against the boss rules
///
/// Completion detected from kills only latches a pending flag; the run is
/// closed by [`close_if_pending`](Self::close_if_pending) at the next fight end.
#[derive(Debug)]
pub struct InstanceTracker {
    rules: BossRules,
    current: Option<Instance>,
    group_progress: Vec<HashSet<String>>,
    kill_counts: HashMap<String, u32>,
    pending: bool,
}

impl InstanceTracker {
    pub fn new(rules: BossRules) -> Self {
        let group_progress = vec![HashSet::new(); rules.groups.len()];
        Self {
            rules,
            current: None,
            group_progress,
            kill_counts: HashMap::new(),
            pending: false,
        }
    }

    pub fn current(&self) -> Option<&Instance> {
        self.current.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Pick up the newest open instance left in the repository.
    pub fn load_open(&mut self, repo: &dyn Repository) -> Result<()> {
        let mut open = repo.open_instances()?;
        if open.len() > 1 {
            warn!("{} open instances in store, tracking the newest", open.len());
        }
        if let Some(instance) = open.pop() {
            info!("Resuming instance {} ({})", instance.id, instance.name);
            self.current = Some(instance);
            self.reset_progress();
        }
        Ok(())
    }

    /// Instance a fight starting at `time` belongs to.
    pub fn adopt(&self, time: Timestamp) -> Option<InstanceId> {
        self.current
            .as_ref()
            .filter(|instance| instance.contains(time))
            .map(|instance| instance.id)
    }

    /// Handle an instance envelope payload.
    pub fn handle_envelope(
        &mut self,
        payload: &str,
        time: Timestamp,
        repo: &mut dyn Repository,
        notifier: &Notifier<'_>,
    ) -> Result<()> {
        let fields = Fields::split(payload, INSTANCE_FIELD);
        if fields.len() < field::MIN_FIELDS {
            warn!(
                "Instance envelope with {} fields ignored (need {})",
                fields.len(),
                field::MIN_FIELDS
            );
            return Ok(());
        }

        if !fields.text(field::COMPLETION_FLAG).is_empty() {
            debug!("Instance envelope with completion flag ignored");
            return Ok(());
        }

        let correlation_id = fields.text(field::CORRELATION_ID);
        if repo.instance_by_correlation(correlation_id)?.is_some() {
            debug!("Instance {} already recorded", correlation_id);
            return Ok(());
        }

        if let Some(previous) = self.current.take() {
            self.close(previous, time, repo, notifier)?;
        }

        let instance = repo.create_instance(NewInstance {
            correlation_id: correlation_id.to_string(),
            name: fields.text(field::NAME).to_string(),
            difficulty: fields.int_or_zero(field::DIFFICULTY),
            start: time,
        })?;
        info!(
            "Instance {} started: {} (difficulty {})",
            instance.id, instance.name, instance.difficulty
        );

        notifier.publish(LifecycleEvent::InstanceStarted {
            instance_id: instance.id,
            name: instance.name.clone(),
        });
        self.current = Some(instance);
        self.reset_progress();
        Ok(())
    }

    /// Match one opponent kill against the boss rules.
    pub fn record_kill(&mut self, name: &str) {
        if self.current.is_none() {
            return;
        }

        if let Some(required) = self.rules.required_kills(name) {
            let count = self.kill_counts.entry(name.to_string()).or_insert(0);
            *count += 1;
            debug!("Boss {} killed {}/{}", name, count, required);
            if *count >= required {
                self.latch(name);
            }
            return;
        }

        if let Some(index) = self.rules.group_of(name) {
            let progress = &mut self.group_progress[index];
            progress.insert(name.to_string());
            let group: HashSet<&str> = self.rules.groups[index]
                .iter()
                .map(String::as_str)
                .collect();
            debug!("Boss group {}: {}/{}", index, progress.len(), group.len());
            if progress.len() == group.len() {
                self.latch(name);
            }
            return;
        }

        if self.rules.is_single(name) {
            self.latch(name);
        }
    }

    /// The tracked player died; some instances end on death.
    pub fn record_death(&mut self) {
        if let Some(instance) = &self.current
            && self.rules.ends_on_death(&instance.name)
        {
            info!("Player died in {}, instance will close", instance.name);
            self.pending = true;
        }
    }

    /// Close the open instance at `end` if completion was latched.
    ///
    /// Returns whether an instance was closed.
    pub fn close_if_pending(
        &mut self,
        end: Timestamp,
        repo: &mut dyn Repository,
        notifier: &Notifier<'_>,
    ) -> Result<bool> {
        if !self.pending {
            return Ok(false);
        }
        self.pending = false;

        let Some(instance) = self.current.take() else {
            return Ok(false);
        };
        let closed = self.close(instance, end, repo, notifier)?;
        if closed {
            notifier.cue(Cue::InstanceEnded);
        }
        self.reset_progress();
        Ok(closed)
    }

    fn close(
        &self,
        instance: Instance,
        end: Timestamp,
        repo: &mut dyn Repository,
        notifier: &Notifier<'_>,
    ) -> Result<bool> {
        let closed = repo.close_instance(instance.id, end)?;
        if closed {
            info!("Instance {} ({}) ended", instance.id, instance.name);
            notifier.publish(LifecycleEvent::InstanceEnded {
                instance_id: instance.id,
            });
        }
        Ok(closed)
    }

    fn latch(&mut self, boss: &str) {
        if !self.pending {
            info!("Completion condition met by {}", boss);
        }
        self.pending = true;
    }

    fn reset_progress(&mut self) {
        self.group_progress = vec![HashSet::new(); self.rules.groups.len()];
        self.kill_counts.clear();
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, Silent};
    use crate::storage::MemoryRepository;
    use chrono::{TimeZone, Utc};

    fn at(minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
    }

    fn envelope(correlation_id: &str, name: &str, flag: &str) -> String {
        let mut fields = vec![""; 11];
        fields[3] = "2";
        fields[4] = correlation_id;
        fields[7] = flag;
        fields[10] = name;
        fields.join("[$]")
    }

    fn rules() -> BossRules {
        let mut rules = BossRules::default();
        rules.single.insert("Lich".to_string());
        rules.multi_kill.insert("Hydra".to_string(), 3);
        rules.groups.push(vec![
            "Red".to_string(),
            "Green".to_string(),
            "Blue".to_string(),
        ]);
        rules.death_end_instances.insert("Arena".to_string());
        rules
    }

    fn open(tracker: &mut InstanceTracker, repo: &mut MemoryRepository, name: &str) {
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);
        tracker
            .handle_envelope(&envelope("c1", name, ""), at(0), repo, &notifier)
            .unwrap();
    }

    #[test]
    fn test_envelope_opens_instance() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");

        let current = tracker.current().unwrap();
        assert_eq!(current.name, "Crypt");
        assert_eq!(current.difficulty, 2);
        assert_eq!(current.correlation_id, "c1");
    }

    #[test]
    fn test_completion_flag_and_short_envelopes_ignored() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);

        tracker
            .handle_envelope(&envelope("c1", "Crypt", "1"), at(0), &mut repo, &notifier)
            .unwrap();
        tracker
            .handle_envelope("a[$]b[$]c", at(0), &mut repo, &notifier)
            .unwrap();

        assert!(tracker.current().is_none());
        assert_eq!(repo.instance_count(), 0);
    }

    #[test]
    fn test_new_envelope_closes_previous() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);

        tracker
            .handle_envelope(&envelope("c1", "Crypt", ""), at(0), &mut repo, &notifier)
            .unwrap();
        tracker
            .handle_envelope(&envelope("c2", "Tower", ""), at(5), &mut repo, &notifier)
            .unwrap();

        assert_eq!(repo.instance(1).unwrap().unwrap().end, Some(at(5)));
        assert_eq!(tracker.current().unwrap().name, "Tower");
    }

    #[test]
    fn test_non_numeric_difficulty_reads_zero() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);
        let payload = envelope("c1", "Crypt", "").replacen("[$]2[$]", "[$]x[$]", 1);

        tracker
            .handle_envelope(&payload, at(0), &mut repo, &notifier)
            .unwrap();
        assert_eq!(tracker.current().unwrap().difficulty, 0);
    }

    #[test]
    fn test_kills_without_instance_are_ignored() {
        let mut tracker = InstanceTracker::new(rules());
        tracker.record_kill("Lich");
        assert!(!tracker.is_pending());
    }

    #[test]
    fn test_single_boss_latches() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");

        tracker.record_kill("Rat");
        assert!(!tracker.is_pending());
        tracker.record_kill("Lich");
        assert!(tracker.is_pending());
    }

    #[test]
    fn test_group_needs_distinct_members() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");

        tracker.record_kill("Red");
        tracker.record_kill("Red");
        tracker.record_kill("Green");
        tracker.record_kill("Green");
        assert!(!tracker.is_pending());
        tracker.record_kill("Blue");
        assert!(tracker.is_pending());
    }

    #[test]
    fn test_death_latches_only_listed_instances() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");
        tracker.record_death();
        assert!(!tracker.is_pending());

        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Arena");
        tracker.record_death();
        assert!(tracker.is_pending());
    }

    #[test]
    fn test_close_if_pending() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);

        assert!(!tracker.close_if_pending(at(3), &mut repo, &notifier).unwrap());
        tracker.record_kill("Lich");
        assert!(tracker.close_if_pending(at(4), &mut repo, &notifier).unwrap());

        assert!(tracker.current().is_none());
        assert!(!tracker.is_pending());
        assert_eq!(repo.instance(1).unwrap().unwrap().end, Some(at(4)));
    }

    #[test]
    fn test_adopt_only_inside_window() {
        let mut repo = MemoryRepository::new();
        let mut tracker = InstanceTracker::new(rules());
        open(&mut tracker, &mut repo, "Crypt");

        assert_eq!(tracker.adopt(at(1)), Some(1));
        assert_eq!(
            tracker.adopt(Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap()),
            None
        );
    }

    #[test]
    fn test_load_open_resumes_newest() {
        let mut repo = MemoryRepository::new();
        for (id, minute) in [("a", 0), ("b", 10)] {
            repo.create_instance(NewInstance {
                correlation_id: id.to_string(),
                name: id.to_string(),
                difficulty: 0,
                start: at(minute),
            })
            .unwrap();
        }

        let mut tracker = InstanceTracker::new(rules());
        tracker.load_open(&repo).unwrap();
        assert_eq!(tracker.current().unwrap().correlation_id, "b");
    }
}
