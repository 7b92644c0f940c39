use std::sync::Arc;

use weft::{
    assembly::Assembly,
    contract::{Attribute, Contract, ContractType, FeatureConstraint, Value},
    remote::{CreatorCapacity, CreatorId, DeviceSnapshot, HostId, StaticContainerPort},
    session::{PlannerConfig, PlanningErrorKind, PlanningOutcome, PlanningSession},
};

fn instance_demand(name: &str, interfaces: &[&str]) -> Contract {
    let mut demand =
        Contract::new(ContractType::InstanceDemand, name).expect("instance demand should build");
    for interface in interfaces {
        demand
            .add_contract(
                Contract::new(ContractType::InterfaceDemand, *interface)
                    .expect("interface demand should build"),
            )
            .expect("interface demand is a legal child");
    }
    demand
}

fn instance_template(interfaces: &[&str], resource_demands: &[&str]) -> Contract {
    let mut template = Contract::new(ContractType::InstanceTemplate, "offer")
        .expect("instance template should build");
    let mut provision = Contract::new(ContractType::InstanceProvision, "impl")
        .expect("instance provision should build");
    for interface in interfaces {
        provision
            .add_contract(
                Contract::new(ContractType::InterfaceProvision, *interface)
                    .expect("interface provision should build"),
            )
            .expect("interface provision is a legal child");
    }
    template
        .add_contract(provision)
        .expect("provision is a legal template child");
    for demand in resource_demands {
        template
            .add_contract(
                Contract::new(ContractType::ResourceDemand, *demand)
                    .expect("resource demand should build"),
            )
            .expect("resource demand is a legal template child");
    }
    template
}

fn resource_template(units: &[u64], resource_demands: &[&str]) -> Contract {
    let mut template = Contract::new(ContractType::ResourceTemplate, "offer")
        .expect("resource template should build");
    if !units.is_empty() {
        template
            .set_attribute(Attribute::CostEstimate {
                units: units.to_vec(),
            })
            .expect("resource templates carry cost estimates");
    }
    template
        .add_contract(
            Contract::new(ContractType::ResourceProvision, "impl")
                .expect("resource provision should build"),
        )
        .expect("provision is a legal template child");
    for demand in resource_demands {
        template
            .add_contract(
                Contract::new(ContractType::ResourceDemand, *demand)
                    .expect("resource demand should build"),
            )
            .expect("resource demand is a legal template child");
    }
    template
}

fn snapshot(creator: &str, total: &[u64], free: &[u64]) -> DeviceSnapshot {
    let mut snapshot = DeviceSnapshot::default();
    snapshot.capacities.insert(
        CreatorId::new(creator),
        CreatorCapacity {
            total: total.to_vec(),
            free: free.to_vec(),
        },
    );
    snapshot
}

fn session(port: StaticContainerPort, hosts: &[&str]) -> PlanningSession {
    PlanningSession::new(
        PlannerConfig::default(),
        Arc::new(port),
        hosts.iter().map(|h| HostId::new(*h)).collect(),
    )
}

fn planned(outcome: PlanningOutcome) -> Assembly {
    match outcome {
        PlanningOutcome::Assembly(assembly) => assembly,
        PlanningOutcome::NoAssembly => panic!("expected an assembly, planner found none"),
    }
}

#[tokio::test]
async fn given_one_matching_template_when_planning_then_single_node_assembly() {
    let port = StaticContainerPort::new().with_offer(
        HostId::new("host-a"),
        ContractType::InstanceDemand,
        "viewer",
        CreatorId::new("factory-1"),
        vec![instance_template(&["ITree"], &[])],
    );

    let outcome = session(port, &["host-a"])
        .plan(instance_demand("viewer", &["ITree"]))
        .await
        .expect("planning should not hard-fail");

    let assembly = planned(outcome);
    assert_eq!(assembly.host, HostId::new("host-a"));
    assert_eq!(assembly.creator, CreatorId::new("factory-1"));
    assert_eq!(assembly.name, "viewer");
    assert!(!assembly.reused);
    assert!(assembly.instances.is_empty());
    assert!(assembly.resources.is_empty());
}

#[tokio::test]
async fn given_exhausted_capacity_when_planning_then_no_assembly() {
    let host = HostId::new("host-a");
    let port = StaticContainerPort::new()
        .with_snapshot(host.clone(), snapshot("allocator-1", &[1], &[0]))
        .with_offer(
            host.clone(),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&[], &["display"])],
        )
        .with_offer(
            host,
            ContractType::ResourceDemand,
            "display",
            CreatorId::new("allocator-1"),
            vec![resource_template(&[1], &[])],
        );

    let outcome = session(port, &["host-a"])
        .plan(instance_demand("viewer", &[]))
        .await
        .expect("planning should not hard-fail");

    assert_eq!(outcome, PlanningOutcome::NoAssembly);
}

#[tokio::test]
async fn given_sufficient_capacity_when_planning_then_resource_is_bound() {
    let host = HostId::new("host-a");
    let port = StaticContainerPort::new()
        .with_snapshot(host.clone(), snapshot("allocator-1", &[1], &[1]))
        .with_offer(
            host.clone(),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&[], &["display"])],
        )
        .with_offer(
            host,
            ContractType::ResourceDemand,
            "display",
            CreatorId::new("allocator-1"),
            vec![resource_template(&[1], &[])],
        );

    let assembly = planned(
        session(port, &["host-a"])
            .plan(instance_demand("viewer", &[]))
            .await
            .expect("planning should not hard-fail"),
    );

    assert_eq!(assembly.resources.len(), 1);
    let display = &assembly.resources[0];
    assert_eq!(display.name, "display");
    assert_eq!(display.host, HostId::new("host-a"));
    assert_eq!(display.creator, CreatorId::new("allocator-1"));
}

#[tokio::test]
async fn given_two_equal_offers_when_planning_then_first_host_in_id_order_wins() {
    let mut port = StaticContainerPort::new();
    for host in ["host-b", "host-a"] {
        port = port.with_offer(
            HostId::new(host),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&["ITree"], &[])],
        );
    }

    let assembly = planned(
        session(port, &["host-a", "host-b"])
            .plan(instance_demand("viewer", &["ITree"]))
            .await
            .expect("planning should not hard-fail"),
    );

    assert_eq!(assembly.host, HostId::new("host-a"));
}

#[tokio::test]
async fn given_one_failing_sibling_when_backtracking_then_other_siblings_stay_bound() {
    let host = HostId::new("host-a");
    let mut snapshot = DeviceSnapshot::default();
    snapshot.capacities.insert(
        CreatorId::new("alloc-left"),
        CreatorCapacity {
            total: vec![5],
            free: vec![5],
        },
    );
    snapshot.capacities.insert(
        CreatorId::new("alloc-right"),
        CreatorCapacity {
            total: vec![5],
            free: vec![5],
        },
    );
    let port = StaticContainerPort::new()
        .with_snapshot(host.clone(), snapshot)
        .with_offer(
            host.clone(),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&[], &["left", "right"])],
        )
        .with_offer(
            host.clone(),
            ContractType::ResourceDemand,
            "left",
            CreatorId::new("alloc-left"),
            vec![resource_template(&[1], &[])],
        )
        .with_offer(
            host,
            ContractType::ResourceDemand,
            "right",
            CreatorId::new("alloc-right"),
            // The first offer can never be reserved; only "right" retries.
            vec![resource_template(&[10], &[]), resource_template(&[1], &[])],
        );

    let assembly = planned(
        session(port, &["host-a"])
            .plan(instance_demand("viewer", &[]))
            .await
            .expect("planning should not hard-fail"),
    );

    assert_eq!(assembly.resources.len(), 2);
    let left = assembly
        .resources
        .iter()
        .find(|resource| resource.name == "left")
        .expect("left slot should be bound");
    let right = assembly
        .resources
        .iter()
        .find(|resource| resource.name == "right")
        .expect("right slot should be bound");
    assert_eq!(left.contract.cost_estimate(), &[1]);
    assert_eq!(right.contract.cost_estimate(), &[1]);
}

#[tokio::test]
async fn given_every_candidate_dead_ends_when_planning_then_terminates_with_no_assembly() {
    let host = HostId::new("host-a");
    let port = StaticContainerPort::new()
        .with_snapshot(host.clone(), snapshot("allocator-1", &[1], &[0]))
        .with_offer(
            host.clone(),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![
                instance_template(&[], &["display"]),
                instance_template(&[], &["display"]),
                instance_template(&[], &["display"]),
            ],
        )
        .with_offer(
            host,
            ContractType::ResourceDemand,
            "display",
            CreatorId::new("allocator-1"),
            vec![resource_template(&[1], &[])],
        );

    let outcome = session(port, &["host-a"])
        .plan(instance_demand("viewer", &[]))
        .await
        .expect("planning should not hard-fail");

    assert_eq!(outcome, PlanningOutcome::NoAssembly);
}

#[tokio::test]
async fn given_chained_resource_demands_when_planning_then_nested_on_the_same_host() {
    let host = HostId::new("host-a");
    let mut snapshot = DeviceSnapshot::default();
    for creator in ["alloc-1", "alloc-2"] {
        snapshot.capacities.insert(
            CreatorId::new(creator),
            CreatorCapacity {
                total: vec![1],
                free: vec![1],
            },
        );
    }
    let port = StaticContainerPort::new()
        .with_snapshot(host.clone(), snapshot)
        .with_offer(
            host.clone(),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&[], &["net"])],
        )
        .with_offer(
            host.clone(),
            ContractType::ResourceDemand,
            "net",
            CreatorId::new("alloc-1"),
            vec![resource_template(&[1], &["chan"])],
        )
        .with_offer(
            host,
            ContractType::ResourceDemand,
            "chan",
            CreatorId::new("alloc-2"),
            vec![resource_template(&[1], &[])],
        );

    let assembly = planned(
        session(port, &["host-a"])
            .plan(instance_demand("viewer", &[]))
            .await
            .expect("planning should not hard-fail"),
    );

    let net = &assembly.resources[0];
    assert_eq!(net.name, "net");
    assert_eq!(net.resources.len(), 1);
    assert_eq!(net.resources[0].name, "chan");
    assert_eq!(net.resources[0].host, HostId::new("host-a"));
}

#[tokio::test]
async fn given_a_failing_host_when_planning_then_healthy_host_still_wins() {
    let port = StaticContainerPort::new()
        .with_failing_host(HostId::new("host-a"))
        .with_offer(
            HostId::new("host-b"),
            ContractType::InstanceDemand,
            "viewer",
            CreatorId::new("factory-1"),
            vec![instance_template(&["ITree"], &[])],
        );

    let assembly = planned(
        session(port, &["host-a", "host-b"])
            .plan(instance_demand("viewer", &["ITree"]))
            .await
            .expect("a failing host is not a session failure"),
    );

    assert_eq!(assembly.host, HostId::new("host-b"));
}

#[tokio::test]
async fn given_only_failing_hosts_when_planning_then_no_assembly_not_an_error() {
    let port = StaticContainerPort::new()
        .with_failing_host(HostId::new("host-a"))
        .with_failing_host(HostId::new("host-b"));

    let outcome = session(port, &["host-a", "host-b"])
        .plan(instance_demand("viewer", &[]))
        .await
        .expect("unreachable hosts are not a session failure");

    assert_eq!(outcome, PlanningOutcome::NoAssembly);
}

#[tokio::test]
async fn given_no_offers_anywhere_when_planning_then_no_assembly() {
    let outcome = session(StaticContainerPort::new(), &["host-a"])
        .plan(instance_demand("viewer", &[]))
        .await
        .expect("an empty candidate set is not a session failure");

    assert_eq!(outcome, PlanningOutcome::NoAssembly);
}

fn assert_everything_reused(prior: &Assembly, next: &Assembly) {
    assert!(next.reused, "slot '{}' should be reused", next.name);
    assert_eq!(next.element, prior.element, "slot '{}' identity", next.name);
    assert_eq!(next.host, prior.host);
    assert_eq!(next.creator, prior.creator);
    assert_eq!(next.instances.len(), prior.instances.len());
    assert_eq!(next.resources.len(), prior.resources.len());
    for (p, n) in prior.instances.iter().zip(next.instances.iter()) {
        assert_everything_reused(p, n);
    }
    for (p, n) in prior.resources.iter().zip(next.resources.iter()) {
        assert_everything_reused(p, n);
    }
}

#[tokio::test]
async fn given_unchanged_environment_when_replanning_then_every_element_is_reused() {
    let host = HostId::new("host-a");
    let build_port = || {
        StaticContainerPort::new()
            .with_snapshot(host.clone(), snapshot("allocator-1", &[2], &[2]))
            .with_offer(
                host.clone(),
                ContractType::InstanceDemand,
                "viewer",
                CreatorId::new("factory-1"),
                vec![instance_template(&["ITree"], &["display"])],
            )
            .with_offer(
                host.clone(),
                ContractType::ResourceDemand,
                "display",
                CreatorId::new("allocator-1"),
                vec![resource_template(&[1], &[])],
            )
    };
    let anchor = instance_demand("viewer", &["ITree"]);

    let first = planned(
        session(build_port(), &["host-a"])
            .plan(anchor.copy())
            .await
            .expect("planning should not hard-fail"),
    );
    assert!(!first.reused);

    let state = first.to_state();
    let second = planned(
        session(build_port(), &["host-a"])
            .with_state(&state)
            .plan(anchor)
            .await
            .expect("replanning should not hard-fail"),
    );

    assert_everything_reused(&first, &second);
}

#[tokio::test]
async fn given_dynamic_feature_offer_when_planning_then_accepted_as_candidate() {
    let mut anchor = instance_demand("viewer", &[]);
    let mut interface = Contract::new(ContractType::InterfaceDemand, "IDisplay")
        .expect("interface demand should build");
    let mut dimension = Contract::new(ContractType::DimensionDemand, "quality")
        .expect("dimension demand should build");
    let mut feature = Contract::new(ContractType::FeatureDemand, "VALUE")
        .expect("feature demand should build");
    feature
        .set_attribute(Attribute::Feature(FeatureConstraint::at_least(
            Value::Integer(10),
        )))
        .expect("feature demand carries a constraint");
    dimension
        .add_contract(feature)
        .expect("feature is a legal dimension child");
    interface
        .add_contract(dimension)
        .expect("dimension is a legal interface child");
    anchor
        .add_contract(interface)
        .expect("interface demand is a legal child");

    let mut template = instance_template(&[], &[]);
    let mut provision = Contract::new(ContractType::InstanceProvision, "impl")
        .expect("instance provision should build");
    let mut interface = Contract::new(ContractType::InterfaceProvision, "IDisplay")
        .expect("interface provision should build");
    let mut dimension = Contract::new(ContractType::DimensionProvision, "quality")
        .expect("dimension provision should build");
    let mut feature = Contract::new(ContractType::FeatureProvision, "VALUE")
        .expect("feature provision should build");
    feature
        .set_attribute(Attribute::Feature(FeatureConstraint::dynamic(
            Value::Integer(0),
        )))
        .expect("feature provision carries a constraint");
    dimension
        .add_contract(feature)
        .expect("feature is a legal dimension child");
    interface
        .add_contract(dimension)
        .expect("dimension is a legal interface child");
    provision
        .add_contract(interface)
        .expect("interface provision is a legal child");
    template
        .add_contract(provision)
        .expect("provision replaces the placeholder");

    let port = StaticContainerPort::new().with_offer(
        HostId::new("host-a"),
        ContractType::InstanceDemand,
        "viewer",
        CreatorId::new("factory-1"),
        vec![template],
    );

    let assembly = planned(
        session(port, &["host-a"])
            .plan(anchor)
            .await
            .expect("planning should not hard-fail"),
    );
    assert_eq!(assembly.host, HostId::new("host-a"));
}

#[tokio::test]
async fn given_a_resource_demand_anchor_when_planning_then_invalid_anchor_error() {
    let anchor =
        Contract::new(ContractType::ResourceDemand, "display").expect("demand should build");
    let err = session(StaticContainerPort::new(), &["host-a"])
        .plan(anchor)
        .await
        .expect_err("sessions anchor on instance demands only");
    assert_eq!(err.kind, PlanningErrorKind::InvalidAnchor);
}
