use super::{build_mesh, caches, endpoint_group};
use crate::engine::RecordingEngine;
use crate::noc::{AttachSide, Connectivity, EndpointCategory, FinalizeOptions, Plane, ReservedCategory};

#[test]
fn local_ports_is_the_mesh_wide_maximum() {
    let mut engine = RecordingEngine::new();
    let mut mesh = build_mesh(&mut engine, 2, 2);
    let group = caches(&mut engine, "l2_", 4, 2);
    mesh.attach(&mut engine, &group, Connectivity::Map(vec![3, 0, 1, 0]), AttachSide::HighLink)
        .unwrap();

    let routers: Vec<_> = mesh.routers().iter().map(|r| r.id).collect();
    let finalized = mesh.finalize(&mut engine, &FinalizeOptions::default());
    assert_eq!(3, finalized.max_ports());
    assert_eq!(3, finalized.used_ports(0));
    assert_eq!(0, finalized.used_ports(1));

    for id in routers {
        for plane in Plane::ALL {
            let name = format!("mesh_{}{id}", plane.tag());
            let router = engine.find(&name).unwrap();
            assert_eq!("3", router.param("local_ports").unwrap().to_string(), "{name}");
        }
    }
}

#[test]
fn empty_mesh_finalizes_with_zero_ports() {
    let mut engine = RecordingEngine::new();
    let mesh = build_mesh(&mut engine, 1, 2);
    let finalized = mesh.finalize(&mut engine, &FinalizeOptions::default());
    assert_eq!(0, finalized.max_ports());
    assert_eq!(0, finalized.max_level());
    assert_eq!(None, finalized.reserved_level(ReservedCategory::Memory));
    assert_eq!("0", engine.find("mesh_fwd1").unwrap().param("local_ports").unwrap().to_string());
}

#[test]
fn reserved_levels_stack_above_the_highest_level() {
    let mut engine = RecordingEngine::new();
    let mut mesh = build_mesh(&mut engine, 2, 1);
    let l1 = caches(&mut engine, "l1_", 2, 1);
    let l3 = caches(&mut engine, "l3_", 1, 3);
    let dirs = endpoint_group(&mut engine, "dir", 2, EndpointCategory::DIRECTORY);
    let mems = endpoint_group(&mut engine, "mem", 1, EndpointCategory::MEMORY);

    // Reserved groups attached first still land above every cache level.
    mesh.attach(&mut engine, &mems, Connectivity::Router(1), AttachSide::HighLink)
        .unwrap();
    mesh.attach(&mut engine, &dirs, Connectivity::Map(vec![1, 1]), AttachSide::HighLink)
        .unwrap();
    mesh.attach(&mut engine, &l1, Connectivity::Map(vec![1, 1]), AttachSide::HighLink)
        .unwrap();
    mesh.attach(&mut engine, &l3, Connectivity::Router(0), AttachSide::HighLink)
        .unwrap();

    let finalized = mesh.finalize(&mut engine, &FinalizeOptions::default());
    assert_eq!(Some(4), finalized.reserved_level(ReservedCategory::Directory));
    assert_eq!(Some(5), finalized.reserved_level(ReservedCategory::Memory));
    assert_eq!(5, finalized.max_level());

    for nic in ["dir0.highlink", "dir1.highlink"] {
        assert_eq!("4", engine.find(nic).unwrap().param("group").unwrap().to_string());
    }
    assert_eq!("5", engine.find("mem0.highlink").unwrap().param("group").unwrap().to_string());
    assert_eq!("3", engine.find("l3_0.highlink").unwrap().param("group").unwrap().to_string());
}

#[test]
fn reserved_order_is_configurable() {
    let mut engine = RecordingEngine::new();
    let mut mesh = build_mesh(&mut engine, 1, 1);
    let l2 = caches(&mut engine, "l2_", 1, 2);
    let dirs = endpoint_group(&mut engine, "dir", 1, EndpointCategory::DIRECTORY);
    let mems = endpoint_group(&mut engine, "mem", 1, EndpointCategory::MEMORY);
    for group in [&l2, &dirs, &mems] {
        mesh.attach(&mut engine, group, Connectivity::Router(0), AttachSide::HighLink)
            .unwrap();
    }

    let options = FinalizeOptions::new([ReservedCategory::Memory, ReservedCategory::Directory]).unwrap();
    let finalized = mesh.finalize(&mut engine, &options);
    assert_eq!(Some(3), finalized.reserved_level(ReservedCategory::Memory));
    assert_eq!(Some(4), finalized.reserved_level(ReservedCategory::Directory));
}

#[test]
fn absent_reserved_category_consumes_no_level() {
    let mut engine = RecordingEngine::new();
    let mut mesh = build_mesh(&mut engine, 1, 1);
    let l2 = caches(&mut engine, "l2_", 1, 2);
    let mems = endpoint_group(&mut engine, "mem", 1, EndpointCategory::MEMORY);
    mesh.attach(&mut engine, &l2, Connectivity::Router(0), AttachSide::HighLink)
        .unwrap();
    mesh.attach(&mut engine, &mems, Connectivity::Router(0), AttachSide::HighLink)
        .unwrap();

    let finalized = mesh.finalize(&mut engine, &FinalizeOptions::default());
    assert_eq!(None, finalized.reserved_level(ReservedCategory::Directory));
    assert_eq!(Some(3), finalized.reserved_level(ReservedCategory::Memory));
}

#[test]
fn duplicate_reserved_order_is_rejected() {
    assert!(FinalizeOptions::new([ReservedCategory::Memory, ReservedCategory::Memory]).is_err());
    assert!(FinalizeOptions::try_from(vec![ReservedCategory::Directory]).is_err());

    #[derive(serde::Deserialize)]
    struct Holder {
        order: FinalizeOptions,
    }
    let holder: Holder = toml::from_str(r#"order = ["memory", "directory"]"#).unwrap();
    assert_eq!(
        &[ReservedCategory::Memory, ReservedCategory::Directory],
        holder.order.reserved_order()
    );
    assert!(toml::from_str::<Holder>(r#"order = ["memory", "memory"]"#).is_err());
}
