use crate::error::Result;
use crate::model::{
    ArtifactPrice, Fight, FightId, Instance, InstanceId, ItemPrice, NewInstance, Player, Timestamp,
};

/// Store for instances, fights, players and both price catalogs.
///
/// Calls are synchronous and expected to be fast; the capture thread
/// blocks on them while handling a frame.
pub trait Repository {
    fn create_instance(&mut self, new: NewInstance) -> Result<Instance>;

    fn instance(&self, id: InstanceId) -> Result<Option<Instance>>;

    fn instance_by_correlation(&self, correlation_id: &str) -> Result<Option<Instance>>;

    /// Instances without an end time, oldest first.
    fn open_instances(&self) -> Result<Vec<Instance>>;

    /// Set the end time of an open instance.
    ///
    /// Returns `false` when the instance was already closed; its end time is left as is.
    fn close_instance(&mut self, id: InstanceId, end: Timestamp) -> Result<bool>;

    /// Instances that started within `[from, to]`, newest first.
    fn instances_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Instance>>;

    fn create_fight(&mut self, start: Timestamp, instance_id: Option<InstanceId>) -> Result<Fight>;

    fn fight(&self, id: FightId) -> Result<Option<Fight>>;

    /// Fights without an end time, oldest first.
    fn open_fights(&self) -> Result<Vec<Fight>>;

    /// Overwrite a stored fight with `fight` (matched by id).
    fn update_fight(&mut self, fight: &Fight) -> Result<()>;

    /// Fights that started within `[from, to]`, newest first.
    fn fights_between(&self, from: Timestamp, to: Timestamp) -> Result<Vec<Fight>>;

    /// Fights associated with an instance, newest first.
    fn fights_in_instance(&self, id: InstanceId) -> Result<Vec<Fight>>;

    /// Find a player by name or create it.
    fn upsert_player(&mut self, name: &str) -> Result<Player>;

    fn players(&self) -> Result<Vec<Player>>;

    fn item_price(&self, name: &str) -> Result<Option<ItemPrice>>;

    /// Insert or replace the entry with the same name.
    fn save_item_price(&mut self, price: ItemPrice) -> Result<()>;

    fn item_prices(&self) -> Result<Vec<ItemPrice>>;

    fn artifact_price_by_code(&self, code: &str) -> Result<Option<ArtifactPrice>>;

    fn artifact_price_by_name(&self, name: &str) -> Result<Option<ArtifactPrice>>;

    fn insert_artifact_price(&mut self, price: ArtifactPrice) -> Result<()>;

    /// Replace the entry currently stored under `code` with `price`.
    fn replace_artifact_price(&mut self, code: &str, price: ArtifactPrice) -> Result<()>;

    fn artifact_prices(&self) -> Result<Vec<ArtifactPrice>>;
}
