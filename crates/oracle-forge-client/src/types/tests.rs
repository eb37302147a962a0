//! Unit tests for types module.

use super::*;
use serde_json::json;

// ============================================================================
// Query Tests
// ============================================================================

#[test]
fn test_query_omits_empty_values() {
    let query = Query::new().param("page", 2).param("search", "");

    assert_eq!(query.encode(), "page=2");
}

#[test]
fn test_query_opt_skips_none() {
    let query = Query::new()
        .opt("category", None::<&str>)
        .opt("custom_roll", Some(17));

    assert_eq!(query.pairs(), &[("custom_roll".to_string(), "17".to_string())]);
}

#[test]
fn test_query_encodes_reserved_characters() {
    let query = Query::new().param("question", "Is the door locked? & guarded");

    assert_eq!(query.encode(), "question=Is+the+door+locked%3F+%26+guarded");
}

#[test]
fn test_query_from_serialize_drops_null_and_empty() {
    let query = Query::from_serialize(&json!({"page": 2, "search": "", "per_page": null})).unwrap();

    assert_eq!(query.encode(), "page=2");
}

#[test]
fn test_query_from_list_params() {
    let params = ListParams {
        page: Some(3),
        per_page: Some(25),
        search: Some(String::new()),
        sort_by: None,
        sort_order: Some(SortOrder::Desc),
    };

    let query = Query::from_serialize(&params).unwrap();

    assert_eq!(query.encode(), "page=3&per_page=25&sort_order=desc");
}

#[test]
fn test_query_from_serialize_repeats_array_keys() {
    let query = Query::from_serialize(&json!({"tag": ["undead", "boss"]})).unwrap();

    assert_eq!(query.encode(), "tag=undead&tag=boss");
}

#[test]
fn test_query_from_serialize_rejects_nested_objects() {
    let result = Query::from_serialize(&json!({"filters": {"cr": 5}}));

    assert!(matches!(result, Err(Error::InvalidRequest(_))));
}

#[test]
fn test_query_from_serialize_rejects_non_objects() {
    assert!(Query::from_serialize(&json!([1, 2])).is_err());
    assert!(Query::from_serialize(&json!(null)).unwrap().is_empty());
}

// ============================================================================
// Body pruning Tests
// ============================================================================

#[test]
fn test_prune_empty_removes_null_and_empty_strings() {
    let pruned = prune_empty(json!({
        "name": "Mira",
        "faction": "",
        "location": null,
        "level": 0,
        "alive": false
    }));

    assert_eq!(pruned, json!({"name": "Mira", "level": 0, "alive": false}));
}

#[test]
fn test_prune_empty_recurses_into_objects_but_keeps_array_slots() {
    let pruned = prune_empty(json!({
        "entity_data": {"goals": ["", "revenge"], "notes": ""},
        "tags": [null, {"a": null}]
    }));

    assert_eq!(
        pruned,
        json!({
            "entity_data": {"goals": ["", "revenge"]},
            "tags": [null, {}]
        })
    );
}

// ============================================================================
// Blob / FilePayload Tests
// ============================================================================

#[test]
fn test_blob_len() {
    let blob = Blob::new(Some("image/png".to_string()), vec![1, 2, 3]);

    assert_eq!(blob.len(), 3);
    assert!(!blob.is_empty());
    assert!(Blob::default().is_empty());
}

#[test]
fn test_file_payload_builder() {
    let payload = FilePayload::new("world.map", vec![9; 4]).with_content_type("application/octet-stream");

    assert_eq!(payload.file_name, "world.map");
    assert_eq!(payload.content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(payload.bytes.len(), 4);
}

#[tokio::test]
async fn test_file_payload_from_path_guesses_image_type() {
    let path = std::env::temp_dir().join(format!("oracle-forge-{}.PNG", std::process::id()));
    tokio::fs::write(&path, [137u8, 80, 78, 71]).await.unwrap();

    let payload = FilePayload::from_path(&path).await.unwrap();
    tokio::fs::remove_file(&path).await.unwrap();

    assert_eq!(payload.content_type.as_deref(), Some("image/png"));
    assert_eq!(payload.bytes, vec![137, 80, 78, 71]);
    assert!(payload.file_name.ends_with(".PNG"));
}

#[tokio::test]
async fn test_file_payload_from_missing_path() {
    let result = FilePayload::from_path("/definitely/not/here.map").await;

    assert!(matches!(result, Err(Error::Io(_))));
}

// ============================================================================
// Enum Tests
// ============================================================================

#[test]
fn test_entity_type_round_trip_through_str() {
    for entity_type in EntityType::ALL {
        let parsed: EntityType = entity_type.as_str().parse().unwrap();
        assert_eq!(parsed, entity_type);
    }
}

#[test]
fn test_entity_type_accepts_singular_and_dashes() {
    assert_eq!("npc".parse::<EntityType>().unwrap(), EntityType::Npcs);
    assert_eq!("story-lines".parse::<EntityType>().unwrap(), EntityType::StoryLines);
    assert!("dragons".parse::<EntityType>().is_err());
}

#[test]
fn test_entity_type_serialization() {
    assert_eq!(serde_json::to_string(&EntityType::StoryLines).unwrap(), "\"story_lines\"");
}

#[test]
fn test_lookup_kind_display() {
    assert_eq!(LookupKind::Monsters.to_string(), "monsters");
    assert_eq!("spell".parse::<LookupKind>().unwrap(), LookupKind::Spells);
}

#[test]
fn test_lookup_kind_search_segments() {
    assert_eq!(LookupKind::Monsters.search_segment(), "monster");
    assert_eq!(LookupKind::Rules.search_segment(), "rule");
    assert!(LookupKind::Items.has_random());
    assert!(!LookupKind::Rules.has_random());
}

#[test]
fn test_odds_serialization() {
    assert_eq!(serde_json::to_string(&Odds::Even).unwrap(), "\"50/50\"");
    assert_eq!(serde_json::to_string(&Odds::Likely).unwrap(), "\"likely\"");
    assert_eq!("even".parse::<Odds>().unwrap(), Odds::Even);
}

// ============================================================================
// Request body Tests
// ============================================================================

#[test]
fn test_yes_no_request_skips_defaults() {
    let request = YesNoRequest::new("Is the innkeeper lying?");

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"question": "Is the innkeeper lying?"})
    );
}

#[test]
fn test_yes_no_request_full() {
    let request = YesNoRequest {
        question: "Does the bridge hold?".to_string(),
        odds: Some(Odds::Unlikely),
        chaos: Some(7),
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"question": "Does the bridge hold?", "odds": "unlikely", "chaos": 7})
    );
}

#[test]
fn test_log_entry_type_field_rename() {
    let entry = LogEntry {
        content: "Rolled a twist".to_string(),
        entry_type: Some("oracle".to_string()),
        timestamp: None,
    };

    assert_eq!(
        serde_json::to_value(&entry).unwrap(),
        json!({"content": "Rolled a twist", "type": "oracle"})
    );
}

#[test]
fn test_wrapped_bodies() {
    let fields = json!({"name": "Saltmarsh"});

    assert_eq!(
        serde_json::to_value(EntityRequest { data: &fields }).unwrap(),
        json!({"data": {"name": "Saltmarsh"}})
    );
    assert_eq!(
        serde_json::to_value(WorldEntityRequest { entity_data: &fields }).unwrap(),
        json!({"entity_data": {"name": "Saltmarsh"}})
    );
    assert_eq!(
        serde_json::to_value(CharacterUpdate { character: &fields }).unwrap(),
        json!({"character": {"name": "Saltmarsh"}})
    );
}

#[test]
fn test_active_adventure_missing_field() {
    let active: ActiveAdventure = serde_json::from_str("{}").unwrap();

    assert_eq!(active.active, None);
}

#[test]
fn test_lookup_search_request_skips_unset_filters() {
    let request = LookupSearchRequest {
        system: Some("dnd5e".to_string()),
        random: Some(2),
        ..LookupSearchRequest::new("goblin")
    };

    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({"query": "goblin", "system": "dnd5e", "random": 2})
    );
}

#[test]
fn test_lookup_random_request_empty() {
    assert_eq!(
        serde_json::to_value(LookupRandomRequest::default()).unwrap(),
        json!({})
    );
}

#[test]
fn test_combat_bodies() {
    let start = CombatStartRequest {
        monsters: vec!["Acolyte".to_string(), "Goblin".to_string()],
    };
    let attacker = json!({"name": "Mira", "hp": 12});
    let defender = json!({"name": "Acolyte", "hp": 9});

    assert_eq!(
        serde_json::to_value(&start).unwrap(),
        json!({"monsters": ["Acolyte", "Goblin"]})
    );
    assert_eq!(
        serde_json::to_value(AttackRequest {
            attacker: &attacker,
            defender: &defender
        })
        .unwrap(),
        json!({"attacker": {"name": "Mira", "hp": 12}, "defender": {"name": "Acolyte", "hp": 9}})
    );
}
