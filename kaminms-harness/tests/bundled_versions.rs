use kaminms_api::{Capability, Fault, HostInternals, Release};
use kaminms_harness::{fixtures, run_contract, ScriptedHost};
use std::sync::Arc;

#[test]
fn every_bundled_version_passes_the_contract() {
    let modules = kaminms_versions::modules();
    assert!(!modules.is_empty());

    for module in &modules {
        let report = run_contract(module.as_ref());
        assert!(
            report.is_clean(),
            "{}",
            report
                .violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

#[test]
fn unsupported_operations_follow_the_release() {
    for module in kaminms_versions::modules() {
        let report = run_contract(module.as_ref());
        let release = module.version().release();
        if release < Release::new(1, 9, 0) {
            assert_eq!(report.unsupported, vec![Capability::SetItemInOffHand]);
        } else if release < Release::new(1, 17, 0) {
            assert!(report.unsupported.is_empty(), "{}", report.version);
        } else {
            assert_eq!(
                report.unsupported,
                vec![Capability::ItemComponents, Capability::NbtTooltip],
                "{}",
                report.version
            );
        }
    }
}

#[test]
fn world_height_follows_the_release() {
    for module in kaminms_versions::modules() {
        let host = Arc::new(ScriptedHost::permissive());
        let imp = module.instantiate(host.clone() as Arc<dyn HostInternals>);
        let world = imp.world().expect("world group");
        let range = (world.min_height("world").unwrap(), world.max_height("world").unwrap());
        if module.version().release() < Release::new(1, 17, 0) {
            assert_eq!(range, (0, 256), "{}", module.version());
        } else {
            assert_eq!(range, (-64, 320), "{}", module.version());
        }
    }
}

#[test]
fn chunk_updates_carry_light_from_1_18() {
    for module in kaminms_versions::modules() {
        let host = Arc::new(ScriptedHost::permissive());
        let imp = module.instantiate(host.clone() as Arc<dyn HostInternals>);
        imp.world()
            .expect("world group")
            .send_chunk_update(&fixtures::player(), "world", fixtures::chunk())
            .unwrap();

        let release = module.version().release();
        let packet = host
            .calls()
            .into_iter()
            .find(|call| call.symbol.contains("Chunk") && !call.symbol.contains('#'))
            .expect("chunk packet built");
        let expected = if release < Release::new(1, 9, 0) {
            3
        } else if release < Release::new(1, 17, 0) {
            2
        } else if release < Release::new(1, 18, 0) {
            1
        } else {
            4
        };
        assert_eq!(packet.args.len(), expected, "{}", module.version());
        assert_eq!(host.calls_to("#getLightEngine"), usize::from(expected == 4));
    }
}

#[test]
fn host_exceptions_surface_with_their_class() {
    let host = Arc::new(ScriptedHost::permissive().throwing(
        "#getHandle",
        "java.lang.IllegalStateException",
        "player offline",
    ));

    for module in kaminms_versions::modules() {
        let imp = module.instantiate(host.clone() as Arc<dyn HostInternals>);
        let teleporter = imp.teleporter().expect("teleport group");
        let err = teleporter
            .teleport_without_event(&fixtures::player(), &fixtures::location())
            .unwrap_err();
        match err {
            Fault::HostException { class, .. } => {
                assert_eq!(class, "java.lang.IllegalStateException")
            }
            other => panic!("{}: unexpected {:?}", module.version(), other),
        }
    }
}

#[test]
fn packet_sends_reach_the_player_connection() {
    for module in kaminms_versions::modules() {
        let host = Arc::new(ScriptedHost::permissive());
        let imp = module.instantiate(host.clone() as Arc<dyn HostInternals>);
        let packets = imp.packet_handler().expect("packet group");

        let packet = packets.entity_status(fixtures::entity(), 3).unwrap();
        host.clear();
        packets.send_packet(&fixtures::player(), &packet).unwrap();

        let calls = host.calls();
        assert_eq!(calls.len(), 2, "{}", module.version());
        assert!(calls[0].symbol.ends_with("CraftPlayer#getHandle"));
        assert_eq!(calls[1].args[1], *packet.handle());
    }
}
