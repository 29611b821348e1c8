use std::time::Duration;

use dex_content::{DocumentKind, MemorySource};
use dex_core::{AbilitySlot, LearnsetEntry, StaticCatalog, TimeOfDay};
use dex_resolver::{
    DataKind, Dex, DexConfig, LiveSpawnEntry, LiveSpeciesEntry, LoadState, MemoryLiveSource,
    MemoryTagRegistry, SourceKind, UNKNOWN_ORDINAL,
};

const WAIT: Duration = Duration::from_secs(5);

fn documents() -> MemorySource {
    MemorySource::new()
        .with(
            DocumentKind::Species,
            "bulbasaur.json",
            r#"{
                "name": "Bulbasaur",
                "nationalPokedexNumber": 1,
                "abilities": ["overgrow", "h:chlorophyll"],
                "moves": ["1:tackle", "tm:solarbeam"],
                "eggGroups": ["Monster", "Grass"],
                "evYield": { "special_attack": 1 },
                "evolutions": [{
                    "result": "ivysaur",
                    "requirements": [{ "variant": "level", "minLevel": 16 }]
                }]
            }"#,
        )
        .with(
            DocumentKind::Species,
            "ivysaur.json",
            r#"{ "name": "Ivysaur", "nationalPokedexNumber": 2, "preEvolution": "bulbasaur" }"#,
        )
        .with(
            DocumentKind::Species,
            "raichu.json",
            r#"{ "name": "Raichu", "nationalPokedexNumber": 26, "abilities": ["static"] }"#,
        )
        .with(
            DocumentKind::Species,
            "pikachu.json",
            r#"{
                "name": "Pikachu",
                "nationalPokedexNumber": 25,
                "abilities": ["static", "static", "h:lightning_rod"],
                "moves": ["1:tackle", "egg:volt_tackle"],
                "drops": { "entries": [{ "item": "minecraft:glowstone_dust", "percentage": 25.0 }] }
            }"#,
        )
        .with(
            DocumentKind::Species,
            "ditto.json",
            r#"{ "name": "Ditto", "nationalPokedexNumber": 132 }"#,
        )
        .with(
            DocumentKind::SpawnPool,
            "0001_bulbasaur.json",
            r##"{ "spawns": [{
                "id": "bulbasaur-1",
                "pokemon": "bulbasaur",
                "bucket": "uncommon",
                "level": "5-32",
                "condition": { "biomes": ["#mymod:is_mountain"], "timeRange": "day" },
                "weightMultipliers": [
                    { "multiplier": 2.0, "condition": { "moonPhase": 3 } },
                    { "multiplier": 0.5, "condition": { } }
                ]
            }] }"##,
        )
        .with(
            DocumentKind::SpawnPool,
            "0037_vulpix.json",
            r##"{ "spawns": [
                { "pokemon": "vulpix alolan", "condition": { "biomes": ["#minecraft:is_snowy"] } },
                { "pokemon": "vulpix", "condition": { "biomes": ["minecraft:desert"] } }
            ] }"##,
        )
}

fn offline_dex() -> Dex {
    Dex::builder()
        .background(false)
        .documents(documents())
        .build()
}

#[test]
fn level_up_evolution_forms_two_node_tree() {
    let dex = offline_dex();
    let tree = dex.evolution_tree_of("bulbasaur").expect("bulbasaur evolves");

    assert_eq!(tree.entity_id, "bulbasaur");
    assert!(tree.is_target_entity);
    assert_eq!(tree.node_count(), 2);
    assert_eq!(tree.children[0].entity_id, "ivysaur");
    assert_eq!(tree.children[0].transition_condition, "Lv. 16");

    let from_child = dex.evolution_tree_of("Ivysaur").expect("same family");
    assert_eq!(from_child.entity_id, "bulbasaur");
    assert!(!from_child.is_target_entity);
    assert!(from_child.children[0].is_target_entity);
}

#[test]
fn single_stage_species_has_no_tree() {
    let dex = offline_dex();
    assert!(dex.evolution_tree_of("ditto").is_none());
    assert!(dex.evolution_tree_of("not_a_species").is_none());
}

#[test]
fn bearers_fall_back_to_static_documents() {
    let dex = Dex::builder()
        .background(false)
        .live_source(MemoryLiveSource::new())
        .documents(documents())
        .build();

    dex.bearers_of("static");
    assert!(dex.wait_for(DataKind::AbilityIndex, WAIT));

    let bearers = dex.bearers_of("static");
    let ids: Vec<_> = bearers.iter().map(|b| b.entity_id.as_str()).collect();
    assert_eq!(ids, ["pikachu", "raichu"]);
    assert_eq!(bearers[0].ordinal, 25);

    let hidden = dex.bearers_of("lightning_rod");
    assert_eq!(hidden.len(), 1);
    assert!(hidden[0].is_hidden);
}

#[test]
fn tag_biome_clause_keeps_reference_and_label() {
    let dex = offline_dex();
    let conditions = dex.resolve_spawn_conditions("bulbasaur", None);
    assert_eq!(conditions.len(), 1);

    let condition = &conditions[0];
    let clause = &condition.biome_clauses[0];
    assert_eq!(clause.display_label, "Mountain");
    assert_eq!(clause.tag_reference.as_deref(), Some("mymod:is_mountain"));
    assert_eq!(condition.time_of_day, TimeOfDay::Day);
    assert_eq!(condition.rarity_bucket, "uncommon");
    assert_eq!(condition.source_id.as_deref(), Some("bulbasaur-1"));

    let labels: Vec<_> = condition
        .weight_multipliers
        .iter()
        .map(|m| m.condition_summary.as_str())
        .collect();
    assert_eq!(labels, ["moon:3", "?"]);
}

#[test]
fn forms_are_resolved_separately_and_together() {
    let dex = offline_dex();

    let alolan = dex.resolve_spawn_conditions("vulpix", Some("alolan"));
    assert_eq!(alolan.len(), 1);
    assert_eq!(alolan[0].biome_clauses[0].display_label, "Snowy");

    let all = dex.resolve_spawn_conditions("Vulpix", None);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].biome_clauses[0].display_label, "Desert");

    assert!(dex.resolve_spawn_conditions("vulpix", Some("galarian")).is_empty());
    assert!(dex.resolve_spawn_conditions("mew", None).is_empty());
}

#[test]
fn live_spawns_shadow_static_documents() {
    let dex = Dex::builder()
        .background(false)
        .live_source(MemoryLiveSource::new().with_spawn(LiveSpawnEntry {
            bucket: Some("rare".into()),
            ..LiveSpawnEntry::new("bulbasaur")
        }))
        .documents(documents())
        .build();

    let conditions = dex.resolve_spawn_conditions("bulbasaur", None);
    assert_eq!(conditions.len(), 1);
    assert_eq!(conditions[0].rarity_bucket, "rare");
    assert!(dex.resolve_spawn_conditions("vulpix", None).is_empty());

    let spawns = dex
        .status()
        .into_iter()
        .find(|s| s.kind == DataKind::Spawns)
        .expect("spawns status");
    assert_eq!(spawns.source, Some(SourceKind::Live));
    assert_eq!(spawns.state, LoadState::Loaded);
}

#[test]
fn live_species_feed_forward_relations() {
    let live = MemoryLiveSource::new().with_species(LiveSpeciesEntry {
        egg_groups: vec!["field".into()],
        learnset: vec![LearnsetEntry::parse("tm:thunderbolt").expect("valid entry")],
        abilities: vec![AbilitySlot::parse("static").expect("valid slot")],
        ..LiveSpeciesEntry::new("pikachu", 25)
    });
    let dex = Dex::builder()
        .background(false)
        .live_source(live)
        .documents(documents())
        .build();

    assert_eq!(dex.egg_groups_of("pikachu"), ["field"]);
    assert!(dex.egg_groups_of("bulbasaur").is_empty());
    assert_eq!(dex.moves_of("Pikachu").len(), 1);
    // No live species reports EV yields, so the static documents answer.
    assert_eq!(dex.ev_yield_of("bulbasaur").map(|ev| ev.special_attack), Some(1));
}

#[test]
fn static_forward_relations() {
    let dex = offline_dex();
    assert_eq!(dex.egg_groups_of("bulbasaur"), ["monster", "grass"]);
    assert_eq!(dex.ev_yield_of("bulbasaur").map(|ev| ev.total()), Some(1));
    assert_eq!(dex.moves_of("bulbasaur").len(), 2);
    assert!(dex.ev_yield_of("ditto").is_none());
}

#[test]
fn learners_and_droppers_are_ordinal_ordered() {
    let dex = offline_dex();
    dex.warm_up();
    assert!(dex.wait_for(DataKind::MoveIndex, WAIT));
    assert!(dex.wait_for(DataKind::DropIndex, WAIT));

    let learners: Vec<_> = dex
        .learners_of("tackle")
        .into_iter()
        .map(|l| l.entity_id)
        .collect();
    assert_eq!(learners, ["bulbasaur", "pikachu"]);

    let droppers = dex.droppers_of("minecraft:glowstone_dust");
    assert_eq!(droppers.len(), 1);
    assert_eq!(droppers[0].percentage, 25.0);
}

#[test]
fn catalog_ordinal_overrides_document_number() {
    let catalog: StaticCatalog = [("raichu", 1)].into_iter().collect();
    let dex = Dex::builder()
        .background(false)
        .catalog(catalog)
        .documents(documents())
        .build();
    dex.bearers_of("static");
    assert!(dex.wait_for(DataKind::AbilityIndex, WAIT));

    let ids: Vec<_> = dex
        .bearers_of("static")
        .into_iter()
        .map(|b| b.entity_id)
        .collect();
    assert_eq!(ids, ["raichu", "pikachu"]);
}

#[test]
fn unplaced_species_sort_last() {
    let live = MemoryLiveSource::new()
        .with_species(LiveSpeciesEntry {
            ordinal: None,
            abilities: vec![AbilitySlot::parse("levitate").expect("valid slot")],
            ..LiveSpeciesEntry::new("fakemon", 0)
        })
        .with_species(LiveSpeciesEntry {
            abilities: vec![AbilitySlot::parse("levitate").expect("valid slot")],
            ..LiveSpeciesEntry::new("gastly", 92)
        });
    let dex = Dex::builder().background(false).live_source(live).build();
    dex.bearers_of("levitate");
    assert!(dex.wait_for(DataKind::AbilityIndex, WAIT));

    let bearers = dex.bearers_of("levitate");
    assert_eq!(bearers[0].entity_id, "gastly");
    assert_eq!(bearers[1].ordinal, UNKNOWN_ORDINAL);
}

#[test]
fn tag_members_are_localized_per_locale() {
    let dex = Dex::builder()
        .background(false)
        .tag_registry(
            MemoryTagRegistry::new()
                .with_tag("#mymod:is_mountain", ["minecraft:windswept_hills", "minecraft:jagged_peaks"]),
        )
        .build();

    let names = dex.resolve_tag("#mymod:is_mountain", "en_us");
    assert_eq!(&names[..], ["Jagged Peaks", "Windswept Hills"]);
    assert_eq!(&dex.resolve_tag_default("mymod:is_mountain")[..], &names[..]);
    assert!(dex.resolve_tag("mymod:unknown", "en_us").is_empty());
}

#[test]
fn missing_data_directory_degrades_to_empty() {
    let config = DexConfig {
        data_dir: Some("/nonexistent/dex-data".into()),
        background: false,
        ..DexConfig::default()
    };
    let dex = Dex::builder().config(config).build();

    assert!(dex.resolve_spawn_conditions("bulbasaur", None).is_empty());
    assert!(dex.evolution_tree_of("bulbasaur").is_none());
    assert!(dex.is_loaded(DataKind::Spawns));
    assert!(dex.last_error(DataKind::Spawns).is_some());
    assert!(dex.last_error(DataKind::StaticLibrary).is_some());
}

#[test]
fn documents_on_disk_are_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let species = dir.path().join("species").join("generation1");
    let pools = dir.path().join("spawn_pool_world");
    std::fs::create_dir_all(&species).expect("species dir");
    std::fs::create_dir_all(&pools).expect("pool dir");
    std::fs::write(
        species.join("pikachu.json"),
        r#"{ "name": "Pikachu", "nationalPokedexNumber": 25, "evolutions": [{ "result": "raichu" }] }"#,
    )
    .expect("write species");
    std::fs::write(
        pools.join("0025_pikachu.json"),
        r#"{ "spawns": [{ "pokemon": "pikachu", "level": "3-20" }] }"#,
    )
    .expect("write pool");

    let config = DexConfig {
        data_dir: Some(dir.path().to_path_buf()),
        background: false,
        ..DexConfig::default()
    };
    let dex = Dex::builder().config(config).build();

    let conditions = dex.resolve_spawn_conditions("pikachu", None);
    assert_eq!(conditions.len(), 1);
    assert!(conditions[0].is_biome_unconstrained());
    let tree = dex.evolution_tree_of("raichu").expect("pikachu family");
    assert_eq!(tree.entity_id, "pikachu");
}

#[test]
fn repeated_builds_answer_identically() {
    let first = offline_dex();
    let second = offline_dex();
    first.warm_up();
    second.warm_up();
    for kind in [DataKind::MoveIndex, DataKind::AbilityIndex, DataKind::DropIndex] {
        assert!(first.wait_for(kind, WAIT));
        assert!(second.wait_for(kind, WAIT));
    }

    assert_eq!(first.bearers_of("static"), second.bearers_of("static"));
    assert_eq!(first.learners_of("tackle"), second.learners_of("tackle"));
    assert_eq!(
        first.resolve_spawn_conditions("vulpix", None),
        second.resolve_spawn_conditions("vulpix", None)
    );
}

#[tokio::test]
async fn background_warm_up_inside_runtime() {
    let dex = Dex::builder().documents(documents()).build();

    assert!(dex.ready(DataKind::AbilityIndex, WAIT).await);
    assert!(dex.ready(DataKind::Spawns, WAIT).await);
    assert_eq!(dex.bearers_of("overgrow").len(), 1);

    let status = dex.status();
    assert_eq!(status.len(), DataKind::ALL.len());
    let abilities = status
        .iter()
        .find(|s| s.kind == DataKind::AbilityIndex)
        .expect("ability status");
    assert_eq!(abilities.state, LoadState::Loaded);
    assert!(abilities.entries >= 3);
}

#[test]
fn punctuated_species_names_resolve_by_id() {
    let documents = MemorySource::new()
        .with(
            DocumentKind::Species,
            "mimejr.json",
            r#"{ "name": "Mime Jr.", "nationalPokedexNumber": 439, "evolutions": [{ "result": "mrmime" }] }"#,
        )
        .with(
            DocumentKind::Species,
            "mrmime.json",
            r#"{ "name": "Mr. Mime", "nationalPokedexNumber": 122, "preEvolution": "mimejr", "abilities": ["soundproof"] }"#,
        );
    let dex = Dex::builder().background(false).documents(documents).build();

    let tree = dex.evolution_tree_of("mrmime").expect("mime family");
    assert_eq!(tree.entity_id, "mimejr");
    assert_eq!(tree.children[0].entity_id, "mrmime");
    assert!(tree.children[0].is_target_entity);

    dex.bearers_of("soundproof");
    assert!(dex.wait_for(DataKind::AbilityIndex, WAIT));
    let bearers = dex.bearers_of("soundproof");
    assert_eq!(bearers[0].entity_id, "mrmime");
    assert_eq!(bearers[0].ordinal, 122);
}

#[test]
fn mistyped_species_field_keeps_the_evolution_tree() {
    let documents = MemorySource::new()
        .with(
            DocumentKind::Species,
            "bulbasaur.json",
            r#"{
                "name": "Bulbasaur",
                "evYield": { "hp": -1 },
                "eggGroups": "monster",
                "evolutions": [{ "result": "ivysaur" }]
            }"#,
        )
        .with(DocumentKind::Species, "ivysaur.json", r#"{ "preEvolution": "bulbasaur" }"#);
    let dex = Dex::builder().background(false).documents(documents).build();

    let tree = dex.evolution_tree_of("ivysaur").expect("bulbasaur family");
    assert_eq!(tree.entity_id, "bulbasaur");
    assert_eq!(tree.node_count(), 2);
    assert!(dex.egg_groups_of("bulbasaur").is_empty());
}

#[test]
fn absent_level_is_reported_as_unconstrained() {
    let documents = MemorySource::new().with(
        DocumentKind::SpawnPool,
        "0041_zubat.json",
        r#"{ "spawns": [{ "pokemon": "zubat" }, { "pokemon": "zubat", "level": "1-100" }] }"#,
    );
    let dex = Dex::builder().background(false).documents(documents).build();

    let conditions = dex.resolve_spawn_conditions("zubat", None);
    assert_eq!(conditions.len(), 2);
    assert!(conditions.iter().any(|c| c.level_range.is_none()));
    assert!(conditions.iter().any(|c| c.level_range.is_some()));
}
