use podscript_core::{count_words, Entity, Replica, Role, RoleKind, RoleValidationError};

#[test]
fn speaker_new_sets_defaults_and_clamps_rate() {
    let role = Role::speaker("  Alice  ", 20).unwrap();

    assert!(!role.id().is_empty());
    assert_eq!(role.name(), "Alice");
    assert_eq!(role.type_name(), "speaker");
    assert_eq!(role.words_per_minute(), Some(50));
    assert_eq!(role.duration_secs(), None);
    assert_eq!(role.color(), None);
    assert_eq!(role.created_at(), role.updated_at());
}

#[test]
fn sound_effect_clamps_negative_duration() {
    let role = Role::sound_effect("Whoosh", -4.0).unwrap();
    assert!(role.is_sound_effect());
    assert_eq!(role.duration_secs(), Some(0.0));
    assert_eq!(role.words_per_minute(), None);
}

#[test]
fn constructors_reject_invalid_names() {
    assert_eq!(
        Role::speaker("   ", 150).unwrap_err(),
        RoleValidationError::EmptyName
    );
    assert!(matches!(
        Role::sound_effect(&"n".repeat(60), 1.0).unwrap_err(),
        RoleValidationError::NameTooLong { chars: 60, max: 50 }
    ));
}

#[test]
fn setters_reclamp_and_bump_updated_at() {
    let mut role = Role::speaker("Bob", 150).unwrap();
    let created = role.updated_at();

    assert!(role.set_words_per_minute(10_000));
    assert_eq!(role.words_per_minute(), Some(500));
    assert!(role.updated_at() >= created);

    assert!(!role.set_duration(3.0), "speaker has no duration");
    assert_eq!(
        role.kind(),
        &RoleKind::Speaker {
            words_per_minute: 500,
            color: None
        }
    );
}

#[test]
fn kind_specific_setters_refuse_other_kinds() {
    let mut sound = Role::sound_effect("Bell", 2.0).unwrap();
    assert!(!sound.set_words_per_minute(120));
    assert!(!sound.set_color(Some("red".to_string())));
    assert!(sound.set_duration(f64::INFINITY));
    assert_eq!(sound.duration_secs(), Some(0.0));
}

#[test]
fn rename_validates_and_keeps_id() {
    let mut role = Role::speaker("Carol", 150).unwrap();
    let id = role.id().to_string();

    role.set_name("  Caroline ").unwrap();
    assert_eq!(role.name(), "Caroline");
    assert_eq!(role.id(), id);
    assert!(role.set_name("").is_err());
    assert_eq!(role.name(), "Caroline");
}

#[test]
fn name_comparison_is_case_insensitive() {
    let role = Role::speaker("Alice", 150).unwrap();
    assert!(role.has_name("alice"));
    assert!(role.has_name(" ALICE "));
    assert!(!role.has_name("Alicia"));
}

#[test]
fn replica_word_count_tracks_text() {
    let texts = [
        "",
        "   ",
        "one",
        "one two three four",
        "  leading and trailing  ",
        "tabs\tand\nnewlines",
    ];
    let mut replica = Replica::new("seed", None);
    for text in texts {
        replica.set_text(text);
        let expected = if text.trim().is_empty() {
            0
        } else {
            text.trim().split_whitespace().count()
        };
        assert_eq!(replica.word_count(), expected, "text {text:?}");
        assert_eq!(replica.word_count(), count_words(text));
    }
}

#[test]
fn replica_role_can_be_repointed_and_cleared() {
    let mut replica = Replica::new("hello there", Some("r1".to_string()));
    assert!(replica.belongs_to("r1"));

    replica.set_role(Some("r2".to_string()));
    assert_eq!(replica.role_id(), Some("r2"));

    replica.set_role(None);
    assert!(!replica.is_assigned());
}
