use kaminms_api::{
    BlockPos, Capability, ErrorCode, Fault, NmsError, NmsPacket, Release, Revision, ServerVersion,
};
use kaminms_core::{default_registry, NmsConfig, NmsFacade, RegistryBuilder};
use kaminms_harness::{fixtures, RecordingImplementation, RecordingModule, ScriptedHost, ScriptedProbe};
use serde_json::{json, Value};
use std::sync::Arc;

fn v1_20_r3() -> ServerVersion {
    ServerVersion::new(Release::new(1, 20, 4), Revision::from_static("v1_20_R3"))
}

fn recorded() -> (NmsFacade, Arc<RecordingImplementation>) {
    let imp = Arc::new(RecordingImplementation::new(v1_20_r3()));
    let mut registry = RegistryBuilder::new();
    registry
        .register(Arc::new(RecordingModule::new(imp.clone())))
        .unwrap();
    let nms = NmsFacade::new(
        NmsConfig::default(),
        Arc::new(ScriptedProbe::new("1.20.4-R0.1-SNAPSHOT")),
        Arc::new(ScriptedHost::new()),
        registry,
    );
    (nms, imp)
}

fn bundled(bukkit_version: &str, package: &str) -> (NmsFacade, Arc<ScriptedHost>) {
    let host = Arc::new(ScriptedHost::permissive());
    let nms = NmsFacade::new(
        NmsConfig::default(),
        Arc::new(ScriptedProbe::new(bukkit_version).with_package(package)),
        host.clone(),
        default_registry().unwrap(),
    );
    (nms, host)
}

fn to_json<T: serde::Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap()
}

fn invoke_args(capability: Capability) -> Vec<Value> {
    let player = to_json(fixtures::player());
    let item = to_json(fixtures::sword());
    match capability {
        Capability::ColorOf => vec![json!("GOLD")],
        Capability::Namespaced => vec![json!("DURABILITY")],
        Capability::ItemInMainHand | Capability::ItemInOffHand => vec![player],
        Capability::SetItemInMainHand => vec![player, Value::Null],
        Capability::SetItemInOffHand => vec![player, item],
        Capability::IsOffHandInteraction => vec![fixtures::interact_event()],
        Capability::TeleportWithoutEvent => vec![player, to_json(fixtures::location())],
        Capability::SetUnbreakable => vec![item, json!(true)],
        Capability::SetDamage => vec![item, json!(3)],
        Capability::SetNbtTag => vec![item, json!("kami"), json!(1)],
        Capability::NbtTag => vec![item, json!("kami")],
        Capability::IsUnbreakable
        | Capability::Damage
        | Capability::TranslationKey
        | Capability::SpawnerType => vec![item],
        Capability::SetBlockFast => vec![
            json!("world"),
            to_json(fixtures::block_pos()),
            json!("STONE"),
            json!("nms"),
        ],
        Capability::EntityHeight | Capability::EntityWidth => vec![json!(1)],
        Capability::SetPersists | Capability::SetFromSpawner => vec![json!(1), json!(true)],
        Capability::SetMobAi => vec![json!(1), json!(false)],
        Capability::SetSpawnerType => vec![to_json(fixtures::spawner(Release::new(1, 20, 4))), json!("ZOMBIE")],
        Capability::DestroyEntities => vec![json!([1, 2])],
        Capability::EntityStatus => vec![json!(1), json!(3)],
        Capability::SendPacket => vec![
            player,
            to_json(NmsPacket::built(v1_20_r3().revision().clone(), "fixture", json!({}))),
        ],
        Capability::RegisterCommand => vec![to_json(fixtures::command())],
        Capability::UnregisterCommand => vec![json!("kami")],
        Capability::KnownCommands => vec![],
        Capability::SendComponent => vec![player, to_json(fixtures::component())],
        Capability::MinHeight | Capability::MaxHeight => vec![json!("world")],
        Capability::RefreshBlock => vec![player, json!("world"), to_json(fixtures::block_pos())],
        Capability::SetSectionBlock => vec![json!("world"), to_json(fixtures::block_pos()), json!("STONE")],
        Capability::IsSectionEmpty => vec![json!("world"), to_json(fixtures::block_pos())],
        Capability::SendChunkUpdate => vec![player, json!("world"), to_json(fixtures::chunk())],
        Capability::ItemComponents | Capability::NbtTooltip => vec![item],
    }
}

#[test]
fn every_capability_forwards_exactly_once() {
    kaminms_core::init_test_logging();
    let (nms, imp) = recorded();

    for capability in Capability::ALL {
        let before = imp.total();
        nms.invoke(capability.name(), invoke_args(capability))
            .unwrap_or_else(|e| panic!("{}: {}", capability, e));
        assert_eq!(imp.count(capability), 1, "{}", capability);
        assert_eq!(imp.total(), before + 1, "{}", capability);
    }
    assert_eq!(nms.detections(), 1);
}

#[test]
fn typed_calls_return_what_the_binding_returns() {
    let (nms, _) = recorded();

    let item = nms.set_damage(fixtures::sword(), 12).unwrap();
    assert_eq!(nms.damage(&item).unwrap(), 12);

    let spawner = nms
        .set_spawner_type(fixtures::spawner(Release::new(1, 20, 4)), &fixtures::zombie())
        .unwrap();
    assert_eq!(nms.spawner_type(&spawner).unwrap(), Some(fixtures::zombie()));

    assert!(nms.register_command(&fixtures::command()).unwrap());
    assert!(!nms.register_command(&fixtures::command()).unwrap());
    assert_eq!(nms.known_commands().unwrap(), vec!["kami".to_string()]);

    let packet = nms.destroy_entities(&[fixtures::entity()]).unwrap();
    assert_eq!(packet.revision(), v1_20_r3().revision());
    nms.send_packet(&fixtures::player(), &packet).unwrap();
}

#[test]
fn world_and_item_text_round_trip_through_invoke() {
    let (nms, _) = recorded();

    assert_eq!(nms.invoke("world.max_height", vec![json!("world")]).unwrap(), json!(256));
    assert_eq!(
        nms.invoke("item_text.nbt_tooltip", vec![to_json(fixtures::sword())]).unwrap(),
        json!("{id:\"minecraft:diamond_sword\",Count:1b}")
    );

    let above = BlockPos { y: 256, ..fixtures::block_pos() };
    match nms.set_section_block("world", above, "STONE").unwrap_err() {
        NmsError::Implementation(e) => {
            assert_eq!(e.capability, "world.set_section_block");
            assert_eq!(e.cause, Fault::OutOfWorld { y: 256, min: 0, max: 256 });
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn implementation_failure_keeps_the_binding() {
    kaminms_core::init_test_logging();
    let (nms, imp) = recorded();
    let cause = Fault::HostException {
        symbol: "net.minecraft.world.entity.Entity#getBbHeight".to_string(),
        class: "java.lang.NullPointerException".to_string(),
        message: "entity removed".to_string(),
    };
    imp.fail(Capability::EntityHeight, cause.clone());

    match nms.entity_height(fixtures::entity()).unwrap_err() {
        NmsError::Implementation(e) => {
            assert_eq!(e.capability, "entity.height");
            assert_eq!(e.version, v1_20_r3());
            assert_eq!(e.cause, cause);
        }
        other => panic!("unexpected {:?}", other),
    }

    assert_eq!(nms.entity_width(fixtures::entity()).unwrap(), 0.6);
    imp.heal(Capability::EntityHeight);
    assert_eq!(nms.entity_height(fixtures::entity()).unwrap(), 1.8);
    assert_eq!(nms.detections(), 1);
}

#[test]
fn foreign_packets_are_refused() {
    let (nms, _) = recorded();
    let packet = NmsPacket::built(Revision::from_static("v1_8_R3"), "fixture", json!({}));

    match nms.send_packet(&fixtures::player(), &packet).unwrap_err() {
        NmsError::Implementation(e) => assert!(matches!(e.cause, Fault::ForeignPacket { .. })),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn invoke_rejects_unknown_names_and_bad_arguments() {
    let (nms, imp) = recorded();

    assert_eq!(
        nms.invoke("entity.teleport", vec![]).unwrap_err(),
        NmsError::UnknownCapability("entity.teleport".to_string())
    );
    assert_eq!(
        nms.invoke("entity.height", vec![]).unwrap_err().code(),
        ErrorCode::BadArguments
    );
    assert_eq!(
        nms.invoke("entity.height", vec![json!("not an id")])
            .unwrap_err()
            .code(),
        ErrorCode::BadArguments
    );
    assert_eq!(imp.total(), 0);

    let height = nms.invoke("entity.height", vec![json!(7)]).unwrap();
    assert_eq!(height, json!(1.8));
}

#[test]
fn bundled_release_drives_its_own_symbols() {
    let (nms, host) = bundled("1.20.4-R0.1-SNAPSHOT", "org.bukkit.craftbukkit.v1_20_R3");

    nms.teleport_without_event(&fixtures::player(), &fixtures::location())
        .unwrap();
    let symbols: Vec<String> = host.calls().into_iter().map(|c| c.symbol).collect();
    assert_eq!(
        symbols[0],
        "org.bukkit.craftbukkit.v1_20_R3.entity.CraftPlayer#getHandle"
    );
    assert!(symbols.iter().skip(1).all(|s| s.starts_with("net.minecraft.") || s.starts_with("org.bukkit.")));

    assert_eq!(
        nms.namespaced(&kaminms_api::Enchantment::new("DAMAGE_ALL")).unwrap(),
        "sharpness"
    );
}

#[test]
fn legacy_off_hand_write_is_reported_unsupported() {
    let (nms, host) = bundled("1.8.8-R0.1-SNAPSHOT", "org.bukkit.craftbukkit.v1_8_R3");

    assert_eq!(nms.item_in_off_hand(&fixtures::player()).unwrap(), None);
    match nms
        .set_item_in_off_hand(&fixtures::player(), Some(&fixtures::sword()))
        .unwrap_err()
    {
        NmsError::Implementation(e) => {
            assert_eq!(e.capability, "main_hand.set_off_hand_item");
            assert!(matches!(e.cause, Fault::Unsupported { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(host.call_count(), 0);
}

#[test]
fn legacy_enchantments_resolve_without_the_host() {
    let (nms, host) = bundled("1.12.2-R0.1-SNAPSHOT", "org.bukkit.craftbukkit.v1_12_R1");

    assert_eq!(
        nms.namespaced(&kaminms_api::Enchantment::new("DURABILITY")).unwrap(),
        "unbreaking"
    );
    assert_eq!(host.call_count(), 0);
}
