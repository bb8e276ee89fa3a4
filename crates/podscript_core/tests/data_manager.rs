use log::Level;
use podscript_core::{
    DataManager, EditorConfig, Entity, Replica, Role, ScriptError, ScriptLogger, Statistics,
};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct RecordingLogger {
    entries: RefCell<Vec<(Level, String)>>,
}

impl RecordingLogger {
    fn count(&self, level: Level, event: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(current, message)| *current == level && message.contains(event))
            .count()
    }
}

impl ScriptLogger for RecordingLogger {
    fn log(&self, level: Level, message: &str, _data: Option<&Value>) {
        self.entries.borrow_mut().push((level, message.to_string()));
    }
}

fn setup() -> (DataManager, Rc<RecordingLogger>) {
    let logger = Rc::new(RecordingLogger::default());
    let manager = DataManager::new(EditorConfig::default(), logger.clone());
    (manager, logger)
}

fn notification_counter(manager: &mut DataManager) -> Rc<Cell<usize>> {
    let counter = Rc::new(Cell::new(0));
    let observed = counter.clone();
    manager.add_update_callback(move |_| observed.set(observed.get() + 1));
    counter
}

fn replica_ids(manager: &DataManager) -> Vec<String> {
    manager
        .replicas()
        .iter()
        .map(|replica| replica.id().to_string())
        .collect()
}

#[test]
fn add_role_rejects_case_insensitive_duplicate_names() {
    let (mut manager, _) = setup();
    manager.add_role(Role::speaker("Alice", 150).unwrap()).unwrap();

    let err = manager
        .add_role(Role::sound_effect("  aLiCe ", 1.0).unwrap())
        .unwrap_err();
    assert_eq!(err, ScriptError::DuplicateRoleName("aLiCe".to_string()));
    assert_eq!(manager.roles().len(), 1);
}

#[test]
fn add_role_rejects_duplicate_ids() {
    let (mut manager, _) = setup();
    let role = Role::speaker("Alice", 150).unwrap();
    let mut clone = role.clone();
    clone.set_name("Someone Else").unwrap();

    let id = manager.add_role(role).unwrap();
    assert_eq!(manager.add_role(clone).unwrap_err(), ScriptError::DuplicateId(id));
    assert_eq!(manager.roles().len(), 1);
}

#[test]
fn role_ids_stay_unique_across_many_adds() {
    let (mut manager, _) = setup();
    for index in 0..50 {
        manager
            .add_role(Role::speaker(&format!("Speaker {index}"), 150).unwrap())
            .unwrap();
    }
    let mut ids: Vec<&str> = manager.roles().iter().map(Entity::id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn remove_role_cascades_to_exactly_its_replicas() {
    let (mut manager, logger) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    let bob = manager.add_role(Role::speaker("Bob", 120).unwrap()).unwrap();

    let mut bob_lines = Vec::new();
    for index in 0..6 {
        let owner = if index % 2 == 0 { &alice } else { &bob };
        let id = manager
            .add_replica(Replica::new(format!("line {index}"), Some(owner.clone())))
            .unwrap();
        if owner == &bob {
            bob_lines.push(id);
        }
    }
    let before_stats = manager.statistics();

    assert!(manager.remove_role(&alice));

    assert_eq!(manager.roles().len(), 1);
    assert_eq!(manager.replicas().len(), 3);
    assert!(manager.replicas().get_by_role(&alice).is_empty());
    assert_eq!(replica_ids(&manager), bob_lines);
    assert_eq!(logger.count(Level::Debug, "event=replica_cascade_removed"), 3);

    let after_stats = manager.statistics();
    assert_eq!(after_stats.total_words, before_stats.total_words - 6);
    assert_eq!(after_stats.replica_count, 3);
}

#[test]
fn remove_role_without_replicas_and_unknown_role() {
    let (mut manager, _) = setup();
    let counter = notification_counter(&mut manager);
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    assert_eq!(counter.get(), 1);

    assert!(!manager.remove_role("missing"));
    assert_eq!(counter.get(), 1, "not-found must not notify");

    assert!(manager.remove_role(&alice));
    assert!(manager.is_empty());
    assert_eq!(counter.get(), 2);
}

#[test]
fn undo_role_removal_restores_original_positions() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    let bob = manager.add_role(Role::speaker("Bob", 120).unwrap()).unwrap();
    let owners = [&bob, &alice, &bob, &alice, &alice];
    for (index, owner) in owners.iter().enumerate() {
        manager
            .add_replica(Replica::new(format!("line {index}"), Some((*owner).clone())))
            .unwrap();
    }
    let role_order: Vec<String> = manager.roles().iter().map(|r| r.id().to_string()).collect();
    let replica_order = replica_ids(&manager);

    assert!(manager.remove_role(&alice));
    assert!(manager.can_undo_removal());
    assert!(manager.undo_last_removal());

    let restored_roles: Vec<String> =
        manager.roles().iter().map(|r| r.id().to_string()).collect();
    assert_eq!(restored_roles, role_order);
    assert_eq!(replica_ids(&manager), replica_order);
    assert!(!manager.undo_last_removal(), "undo is single-step");
}

#[test]
fn undo_replica_removal_reinserts_at_index() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    for index in 0..3 {
        manager
            .add_replica(Replica::new(format!("line {index}"), Some(alice.clone())))
            .unwrap();
    }
    let order = replica_ids(&manager);

    assert!(manager.remove_replica(&order[1]));
    assert!(!manager.remove_replica(&order[1]));
    assert_eq!(manager.replicas().len(), 2);

    assert!(manager.undo_last_removal());
    assert_eq!(replica_ids(&manager), order);
}

#[test]
fn clear_all_drops_pending_undo() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    assert!(manager.remove_role(&alice));

    manager.clear_all();
    assert!(!manager.can_undo_removal());
    assert!(!manager.undo_last_removal());
    assert!(manager.is_empty());
}

#[test]
fn move_replica_notifies_only_on_success() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    for index in 0..3 {
        manager
            .add_replica(Replica::new(format!("line {index}"), Some(alice.clone())))
            .unwrap();
    }
    let order = replica_ids(&manager);
    let counter = notification_counter(&mut manager);

    assert!(manager.move_replica(&order[0], 2));
    assert_eq!(counter.get(), 1);
    assert_eq!(
        replica_ids(&manager),
        vec![order[1].clone(), order[2].clone(), order[0].clone()]
    );

    assert!(!manager.move_replica(&order[0], 3));
    assert!(!manager.move_replica("missing", 0));
    assert_eq!(counter.get(), 1);
}

#[test]
fn move_up_and_down_respect_bounds() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    for index in 0..3 {
        manager
            .add_replica(Replica::new(format!("line {index}"), Some(alice.clone())))
            .unwrap();
    }
    let order = replica_ids(&manager);

    assert!(!manager.move_replica_up(&order[0]));
    assert!(!manager.move_replica_down(&order[2]));
    assert!(manager.move_replica_down(&order[0]));
    assert_eq!(manager.replicas().index_of(&order[0]), Some(1));
    assert!(manager.move_replica_up(&order[2]));
    assert_eq!(manager.replicas().index_of(&order[2]), Some(1));
    assert_eq!(manager.replicas().len(), 3);
}

#[test]
fn move_role_reorders_roles() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    manager.add_role(Role::speaker("Bob", 120).unwrap()).unwrap();

    assert!(manager.move_role(&alice, 1));
    assert_eq!(manager.roles().index_of(&alice), Some(1));
    assert!(!manager.move_role(&alice, 2));
}

#[test]
fn blank_text_is_only_allowed_for_sound_effects() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    let bell = manager
        .add_role(Role::sound_effect("Bell", 2.0).unwrap())
        .unwrap();

    assert_eq!(
        manager
            .add_replica(Replica::new("  ", Some(alice.clone())))
            .unwrap_err(),
        ScriptError::EmptyReplicaText
    );
    assert_eq!(
        manager.add_replica(Replica::new("", None)).unwrap_err(),
        ScriptError::EmptyReplicaText
    );
    let cue = manager
        .add_replica(Replica::new("", Some(bell.clone())))
        .unwrap();

    assert_eq!(
        manager.set_replica_role(&cue, Some(alice.clone())).unwrap_err(),
        ScriptError::EmptyReplicaText
    );
    assert_eq!(manager.replicas().find_by_id(&cue).unwrap().role_id(), Some(bell.as_str()));

    let line = manager
        .add_replica(Replica::new("hello", Some(alice)))
        .unwrap();
    assert_eq!(
        manager.update_replica_text(&line, "").unwrap_err(),
        ScriptError::EmptyReplicaText
    );
    assert_eq!(manager.update_replica_text("missing", "x"), Ok(false));
}

#[test]
fn update_role_name_enforces_uniqueness_but_allows_self() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    manager.add_role(Role::speaker("Bob", 120).unwrap()).unwrap();

    assert_eq!(
        manager.update_role_name(&alice, "BOB"),
        Err(ScriptError::DuplicateRoleName("BOB".to_string()))
    );
    assert_eq!(manager.update_role_name(&alice, "alice"), Ok(true));
    assert_eq!(manager.roles().find_by_id(&alice).unwrap().name(), "alice");
    assert_eq!(manager.update_role_name("missing", "Zed"), Ok(false));
    assert!(manager.find_role_by_name("ALICE").is_some());
}

#[test]
fn update_role_name_on_unknown_role_is_not_found_even_for_taken_name() {
    let (mut manager, _) = setup();
    let counter = notification_counter(&mut manager);
    manager.add_role(Role::speaker("Bob", 120).unwrap()).unwrap();

    assert_eq!(manager.update_role_name("missing", "Bob"), Ok(false));
    assert_eq!(manager.update_role_name("missing", "   "), Ok(false));
    assert_eq!(counter.get(), 1);
}

#[test]
fn role_parameter_setters_report_kind_mismatch() {
    let (mut manager, _) = setup();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    let bell = manager
        .add_role(Role::sound_effect("Bell", 2.0).unwrap())
        .unwrap();

    assert!(manager.set_speaker_rate(&alice, 1));
    assert_eq!(manager.roles().find_by_id(&alice).unwrap().words_per_minute(), Some(50));
    assert!(!manager.set_speaker_rate(&bell, 100));
    assert!(manager.set_sound_duration(&bell, 7.5));
    assert!(!manager.set_sound_duration(&alice, 7.5));
    assert!(manager.set_speaker_color(&alice, Some("#00ff00".to_string())));
    assert!(!manager.set_speaker_color("missing", None));
}

#[test]
fn batch_defers_and_coalesces_notifications() {
    let (mut manager, _) = setup();
    let counter = notification_counter(&mut manager);

    manager.begin_batch();
    manager.begin_batch();
    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    manager
        .add_replica(Replica::new("hello world", Some(alice)))
        .unwrap();
    manager.end_batch();
    assert_eq!(counter.get(), 0);
    manager.end_batch();
    assert_eq!(counter.get(), 1);

    manager.begin_batch();
    manager.end_batch();
    assert_eq!(counter.get(), 1, "empty batch must not notify");
    manager.end_batch();
    assert_eq!(counter.get(), 1, "unbalanced end is ignored");
}

#[test]
fn callbacks_receive_fresh_statistics_and_can_be_removed() {
    let (mut manager, _) = setup();
    let seen: Rc<RefCell<Vec<Statistics>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let id = manager.add_update_callback(move |stats| sink.borrow_mut().push(stats.clone()));

    let alice = manager.add_role(Role::speaker("Alice", 120).unwrap()).unwrap();
    manager
        .add_replica(Replica::new("one two three four", Some(alice)))
        .unwrap();

    {
        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].total_words, 4);
        assert_eq!(seen[1].total_duration_formatted, "0:02");
    }

    assert!(manager.remove_update_callback(id));
    assert!(!manager.remove_update_callback(id));
    manager.clear_all();
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn import_notifies_exactly_once() {
    let (mut manager, _) = setup();
    let counter = notification_counter(&mut manager);

    let summary = manager
        .import_data(&serde_json::json!({
            "roles": [
                {"id": "r1", "name": "Alice", "type": "speaker", "wordsPerMinute": 120},
                {"id": "r2", "name": "Whoosh", "type": "sound", "duration": 3}
            ],
            "replicas": [
                {"id": "p1", "text": "one two three four", "roleId": "r1"},
                {"id": "p2", "text": "", "roleId": "r2"},
                {"id": "p3", "text": "", "roleId": "r2"}
            ]
        }))
        .unwrap();

    assert_eq!(summary.roles, 2);
    assert_eq!(summary.replicas, 3);
    assert_eq!(counter.get(), 1);
}
