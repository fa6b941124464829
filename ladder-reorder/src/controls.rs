//! Reorder control state
//!
//! Computes, per record, which move controls a list view should enable.
//! Rendering stays with the caller; this module only answers "can this
//! record move up, can it move down" and which request parameters a
//! control should carry.

use crate::engine::ReorderEngine;
use ladder_core::{Direction, LadderResult, RecordId, ReorderConfig, SortRecord};
use ladder_storage::{BoundsCache, RecordStore};
use serde::{Deserialize, Serialize};

/// Enabled state of a record's up and down controls.
///
/// A control is disabled exactly when the move it triggers would be a
/// no-op, so a record alone in its partition disables both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub up_enabled: bool,
    pub down_enabled: bool,
}

impl ControlState {
    /// Compute the control state for one record from live bounds.
    pub fn for_record<S: RecordStore>(
        engine: &ReorderEngine<S>,
        cache: &BoundsCache,
        record: &SortRecord,
    ) -> LadderResult<Self> {
        engine.control_state(cache, record)
    }

    /// Whether the control for this direction is enabled.
    pub fn is_enabled(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up_enabled,
            Direction::Down => self.down_enabled,
        }
    }
}

impl<S: RecordStore> ReorderEngine<S> {
    /// Both directions' `can_move` answers, packaged for a list view.
    pub fn control_state(
        &self,
        cache: &BoundsCache,
        record: &SortRecord,
    ) -> LadderResult<ControlState> {
        Ok(ControlState {
            up_enabled: self.can_move(cache, record, Direction::Up)?,
            down_enabled: self.can_move(cache, record, Direction::Down)?,
        })
    }
}

/// Request parameters a move control should submit, named per the
/// configuration.
pub fn move_params(
    config: &ReorderConfig,
    id: RecordId,
    direction: Direction,
) -> Vec<(String, String)> {
    vec![
        (config.id_param.clone(), id.to_string()),
        (
            config.direction_param.clone(),
            direction.as_db_str().to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_test_utils::{memory_store, seed_partition};

    #[test]
    fn test_middle_record_enables_both_controls() {
        let store = memory_store();
        let records = seed_partition(&store, "article", &[1, 2, 3]);
        let engine = ReorderEngine::new(store);
        let cache = BoundsCache::new();

        let state = ControlState::for_record(&engine, &cache, &records[1]).unwrap();
        assert!(state.up_enabled);
        assert!(state.down_enabled);
    }

    #[test]
    fn test_extremes_disable_one_control_each() {
        let store = memory_store();
        let records = seed_partition(&store, "article", &[1, 2, 3]);
        let engine = ReorderEngine::new(store);
        let cache = BoundsCache::new();

        let first = ControlState::for_record(&engine, &cache, &records[0]).unwrap();
        assert!(!first.up_enabled);
        assert!(first.down_enabled);

        let last = engine.control_state(&cache, &records[2]).unwrap();
        assert!(last.up_enabled);
        assert!(!last.down_enabled);
    }

    #[test]
    fn test_singleton_disables_both_controls() {
        let store = memory_store();
        let records = seed_partition(&store, "article", &[7]);
        let engine = ReorderEngine::new(store);
        let cache = BoundsCache::new();

        let state = ControlState::for_record(&engine, &cache, &records[0]).unwrap();
        assert!(!state.up_enabled);
        assert!(!state.down_enabled);
    }

    #[test]
    fn test_is_enabled_selects_by_direction() {
        let state = ControlState {
            up_enabled: true,
            down_enabled: false,
        };
        assert!(state.is_enabled(Direction::Up));
        assert!(!state.is_enabled(Direction::Down));
    }

    #[test]
    fn test_move_params_carry_configured_names() {
        let config = ReorderConfig::default()
            .with_id_param("article_id")
            .with_direction_param("dir");
        let id = ladder_core::new_record_id();

        let params = move_params(&config, id, Direction::Down);
        assert_eq!(
            params,
            vec![
                ("article_id".to_string(), id.to_string()),
                ("dir".to_string(), "down".to_string()),
            ]
        );
    }
}
