use tracing::{debug, info, warn};

use super::InstanceTracker;
use crate::config::GameConfig;
use crate::config::delimiters::{ENTRY_FIELD, SUMMARY_ENTRY};
use crate::drops::{ValueRules, collect_drops};
use crate::error::{Error, Result};
use crate::events::{LifecycleEvent, Notifier};
use crate::model::{Fight, FightId, Timestamp};
use crate::protocol::Fields;
use crate::storage::Repository;

/// Participant entry field positions.
mod entry {
    pub const KIND: usize = 0;
    pub const NAME: usize = 1;

    pub const SELF_KIND: &str = "1";
    pub const EXP: usize = 2;
    pub const HEALTH: usize = 3;
    pub const GOLD: usize = 4;
    pub const PSYCHO: usize = 24;

    pub const OPPONENT_KIND: &str = "2";
    pub const LEVEL: usize = 15;
}

/// Everything a fight transition may touch besides the tracker itself.
pub struct FightContext<'a> {
    pub repo: &'a mut dyn Repository,
    pub instances: &'a mut InstanceTracker,
    pub config: &'a GameConfig,
    /// Tracked player; self entries of other players are ignored.
    pub player_name: &'a str,
    pub notifier: &'a Notifier<'a>,
}

/// Combat encounter state machine
///
/// ## States
///
/// - NoOpenFight
/// - Open: summaries are applied to the open fight until fight end
#[derive(Debug, Default)]
pub struct FightTracker {
    open: Option<FightId>,
}

impl FightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<FightId> {
        self.open
    }

    /// Pick up the newest open fight left in the repository.
    pub fn load_open(&mut self, repo: &dyn Repository) -> Result<()> {
        if let Some(fight) = repo.open_fights()?.pop() {
            info!("Resuming fight {}", fight.id);
            self.open = Some(fight.id);
        }
        Ok(())
    }

    /// Open a fight at `time`, or keep the one already open.
    pub fn start(&mut self, time: Timestamp, ctx: &mut FightContext<'_>) -> Result<FightId> {
        if let Some(id) = self.open {
            debug!("Fight {} already open, reusing it", id);
            return Ok(id);
        }

        let instance_id = ctx.instances.adopt(time);
        let fight = ctx.repo.create_fight(time, instance_id)?;
        debug!("Fight {} started (instance {:?})", fight.id, instance_id);

        ctx.notifier
            .publish(LifecycleEvent::FightStarted { fight_id: fight.id });
        self.open = Some(fight.id);
        Ok(fight.id)
    }

    /// Apply a fight summary payload to the open fight.
    pub fn apply_summary(
        &mut self,
        payload: &str,
        time: Timestamp,
        ctx: &mut FightContext<'_>,
    ) -> Result<()> {
        let fight_id = match self.open {
            Some(id) => id,
            None => self.start(time, ctx)?,
        };
        let mut fight = ctx
            .repo
            .fight(fight_id)?
            .ok_or_else(|| Error::RecordNotFound(format!("fight {}", fight_id)))?;

        let mut opponents = Vec::new();
        let mut died = false;
        for raw in payload.split(SUMMARY_ENTRY) {
            let fields = Fields::split(raw, ENTRY_FIELD);
            match fields.text(entry::KIND) {
                entry::SELF_KIND => {
                    died |= apply_self_entry(&mut fight, &fields, ctx)?;
                }
                entry::OPPONENT_KIND => {
                    let name = fields.text(entry::NAME);
                    fight.record_kill(name, fields.int_or_zero(entry::LEVEL));
                    opponents.push(name);
                }
                other => debug!("Unknown participant kind {:?}", other),
            }
        }
        ctx.repo.update_fight(&fight)?;

        for name in opponents {
            ctx.instances.record_kill(name);
        }
        if died {
            info!("Player {} died in fight {}", ctx.player_name, fight_id);
            ctx.instances.record_death();
            ctx.notifier
                .publish(LifecycleEvent::PlayerDied { fight_id });
        }

        ctx.notifier
            .publish(LifecycleEvent::FightSummaryApplied { fight_id });
        Ok(())
    }

    /// Close the open fight at `time` and apply any pending instance completion.
    pub fn end(&mut self, time: Timestamp, ctx: &mut FightContext<'_>) -> Result<()> {
        let Some(fight_id) = self.open.take() else {
            debug!("Fight end without an open fight");
            return Ok(());
        };

        let Some(mut fight) = ctx.repo.fight(fight_id)? else {
            warn!("Open fight {} missing from store", fight_id);
            return Ok(());
        };
        fight.end = Some(time);
        ctx.repo.update_fight(&fight)?;
        debug!(
            "Fight {} ended after {}s, {} kills",
            fight_id,
            fight.duration().num_seconds(),
            fight.kill_count()
        );

        ctx.notifier
            .publish(LifecycleEvent::FightEnded { fight_id });
        ctx.instances
            .close_if_pending(time, &mut *ctx.repo, ctx.notifier)?;
        Ok(())
    }
}

/// Apply the tracked player's entry. Returns whether the player died.
fn apply_self_entry(
    fight: &mut Fight,
    fields: &Fields<'_>,
    ctx: &mut FightContext<'_>,
) -> Result<bool> {
    let name = fields.text(entry::NAME);
    if name.to_lowercase() != ctx.player_name.to_lowercase() {
        debug!("Ignoring summary entry of {}", name);
        return Ok(false);
    }

    ctx.repo.upsert_player(name)?;
    fight.player_name = Some(name.to_string());
    fight.exp = fields.int_or_zero(entry::EXP);
    fight.gold = fields.int_or_zero(entry::GOLD);
    fight.psycho = fields.int_or_zero(entry::PSYCHO);

    let rules = ValueRules::from_catalog(ctx.config, &*ctx.repo)?;
    let drops = collect_drops(fields, &rules, &*ctx.repo)?;
    debug!("{} drops for {} in fight {}", drops.len(), name, fight.id);
    fight.drops.extend(drops);

    Ok(fields.int(entry::HEALTH) == Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BossRules;
    use crate::events::{EventBus, Silent};
    use crate::model::{DropKind, NewInstance};
    use crate::storage::MemoryRepository;
    use chrono::{TimeZone, Utc};
    use std::sync::mpsc;

    fn at(minute: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0).unwrap()
    }

    fn self_entry(name: &str, exp: &str, health: &str, gold: &str, items: &str) -> String {
        let mut fields = vec![""; 28];
        fields[0] = "1";
        fields[1] = name;
        fields[2] = exp;
        fields[3] = health;
        fields[4] = gold;
        fields[9] = items;
        fields[24] = "4";
        fields.join("&")
    }

    fn opponent(name: &str, level: &str) -> String {
        let mut fields = vec![""; 16];
        fields[0] = "2";
        fields[1] = name;
        fields[15] = level;
        fields.join("&")
    }

    struct Harness {
        repo: MemoryRepository,
        instances: InstanceTracker,
        config: GameConfig,
        bus: EventBus,
        fights: FightTracker,
    }

    impl Harness {
        fn new(rules: BossRules) -> Self {
            Self {
                repo: MemoryRepository::new(),
                instances: InstanceTracker::new(rules),
                config: GameConfig::default(),
                bus: EventBus::new(),
                fights: FightTracker::new(),
            }
        }

        fn run<T>(&mut self, f: impl FnOnce(&mut FightTracker, &mut FightContext<'_>) -> T) -> T {
            let notifier = Notifier::new(&self.bus, &Silent, false);
            let mut ctx = FightContext {
                repo: &mut self.repo,
                instances: &mut self.instances,
                config: &self.config,
                player_name: "Hero",
                notifier: &notifier,
            };
            f(&mut self.fights, &mut ctx)
        }
    }

    #[test]
    fn test_start_reuses_open_fight() {
        let mut h = Harness::new(BossRules::default());
        let first = h.run(|f, ctx| f.start(at(0), ctx)).unwrap();
        let second = h.run(|f, ctx| f.start(at(1), ctx)).unwrap();

        assert_eq!(first, second);
        assert_eq!(h.repo.fight_count(), 1);
    }

    #[test]
    fn test_summary_applies_self_entry() {
        let mut h = Harness::new(BossRules::default());
        h.run(|f, ctx| f.start(at(0), ctx)).unwrap();

        let payload = [
            self_entry("hero", "120", "50", "33", "Bone(2)"),
            self_entry("Other", "999", "50", "999", "Gem"),
            opponent("Rat", "5"),
            opponent("Rat", "5"),
            opponent("Wolf", "7"),
        ]
        .join("[--]");
        h.run(|f, ctx| f.apply_summary(&payload, at(1), ctx))
            .unwrap();

        let fight = h.repo.fight(1).unwrap().unwrap();
        assert_eq!((fight.exp, fight.gold, fight.psycho), (120, 33, 4));
        assert_eq!(fight.player_name.as_deref(), Some("hero"));
        assert_eq!(fight.drops.len(), 1);
        assert_eq!(fight.drops[0].kind, DropKind::Item);
        assert_eq!(fight.kill_count(), 3);
        assert_eq!(fight.opponents.len(), 2);
        assert_eq!(h.repo.players().unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_summary_keeps_latest_totals() {
        let mut h = Harness::new(BossRules::default());
        h.run(|f, ctx| f.start(at(0), ctx)).unwrap();

        let payload = self_entry("Hero", "100", "50", "10", "");
        for minute in 1..=2 {
            h.run(|f, ctx| f.apply_summary(&payload, at(minute), ctx))
                .unwrap();
        }
        let fight = h.repo.fight(1).unwrap().unwrap();
        assert_eq!((fight.exp, fight.gold, fight.psycho), (100, 10, 4));

        let payload = self_entry("Hero", "150", "50", "12", "");
        h.run(|f, ctx| f.apply_summary(&payload, at(3), ctx))
            .unwrap();
        let fight = h.repo.fight(1).unwrap().unwrap();
        assert_eq!((fight.exp, fight.gold), (150, 12));
    }

    #[test]
    fn test_summary_without_open_fight_opens_one() {
        let mut h = Harness::new(BossRules::default());
        let (tx, rx) = mpsc::channel::<LifecycleEvent>();
        h.bus.subscribe(tx);

        h.run(|f, ctx| f.apply_summary(&opponent("Rat", "1"), at(2), ctx))
            .unwrap();

        assert_eq!(h.fights.current(), Some(1));
        assert_eq!(h.repo.fight(1).unwrap().unwrap().start, at(2));
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                LifecycleEvent::FightStarted { fight_id: 1 },
                LifecycleEvent::FightSummaryApplied { fight_id: 1 }
            ]
        );
    }

    #[test]
    fn test_end_without_open_fight_is_noop() {
        let mut h = Harness::new(BossRules::default());
        h.run(|f, ctx| f.end(at(0), ctx)).unwrap();
        assert_eq!(h.repo.fight_count(), 0);
    }

    #[test]
    fn test_end_closes_fight_and_pending_instance() {
        let mut rules = BossRules::default();
        rules.single.insert("Lich".to_string());
        let mut h = Harness::new(rules);
        let bus = EventBus::new();
        let notifier = Notifier::new(&bus, &Silent, false);
        let envelope = {
            let mut fields = vec![""; 11];
            fields[4] = "c1";
            fields[10] = "Crypt";
            fields.join("[$]")
        };
        h.instances
            .handle_envelope(&envelope, at(0), &mut h.repo, &notifier)
            .unwrap();

        h.run(|f, ctx| f.start(at(1), ctx)).unwrap();
        h.run(|f, ctx| f.apply_summary(&opponent("Lich", "30"), at(2), ctx))
            .unwrap();
        h.run(|f, ctx| f.end(at(3), ctx)).unwrap();

        let fight = h.repo.fight(1).unwrap().unwrap();
        assert_eq!(fight.instance_id, Some(1));
        assert_eq!(fight.end, Some(at(3)));
        assert_eq!(h.repo.instance(1).unwrap().unwrap().end, Some(at(3)));
        assert!(h.fights.current().is_none());
    }

    #[test]
    fn test_death_is_published() {
        let mut h = Harness::new(BossRules::default());
        let (tx, rx) = mpsc::channel::<LifecycleEvent>();
        h.bus.subscribe(tx);

        h.run(|f, ctx| f.apply_summary(&self_entry("Hero", "0", "0", "0", ""), at(0), ctx))
            .unwrap();

        assert!(
            rx.try_iter()
                .any(|e| e == LifecycleEvent::PlayerDied { fight_id: 1 })
        );
    }

    #[test]
    fn test_load_open_resumes_fight() {
        let mut repo = MemoryRepository::new();
        repo.create_instance(NewInstance {
            correlation_id: "c".into(),
            name: "Crypt".into(),
            difficulty: 0,
            start: at(0),
        })
        .unwrap();
        repo.create_fight(at(1), Some(1)).unwrap();

        let mut tracker = FightTracker::new();
        tracker.load_open(&repo).unwrap();
        assert_eq!(tracker.current(), Some(1));
    }
}
