//! Property-Based Tests for features-guard
//!
//! Uses proptest to check the propagation invariants over arbitrary rule sets
//! and activation histories:
//! - Dependents are enabled iff one of their triggers is (after settling)
//! - No command ever targets a module that is already in the requested state
//! - The default environment is never mutated by the engine
//! - Repeated enable callbacks are idempotent

use proptest::prelude::*;
use std::sync::Arc;

use features_guard::{
    module_set, violations, DependencyIndex, DependencyMap, EngineContext, FeaturesGuard,
    HostSimulator, MemoryShell, ModuleSet,
};

const TRIGGERS: usize = 5;
const DEPENDENTS: usize = 4;

fn trigger(i: usize) -> String {
    format!("T{}", i)
}

fn dependent(i: usize) -> String {
    format!("D{}", i)
}

fn everything() -> ModuleSet {
    module_set((0..TRIGGERS).map(trigger).chain((0..DEPENDENTS).map(dependent)))
}

/// Strategy for acyclic rule sets: dependents and triggers come from disjoint pools
fn rules_strategy() -> impl Strategy<Value = DependencyMap> {
    prop::collection::vec(
        (0..DEPENDENTS, prop::collection::vec(0..TRIGGERS, 1..4)),
        1..6,
    )
    .prop_map(|rules| {
        DependencyMap::new(
            rules
                .into_iter()
                .map(|(d, ts)| (dependent(d), ts.into_iter().map(trigger).collect::<Vec<_>>())),
        )
        .expect("disjoint pools are acyclic")
    })
}

/// An administrator action: toggle a trigger, or switch off a dependent by hand
#[derive(Debug, Clone)]
enum Step {
    EnableTrigger(usize),
    DisableTrigger(usize),
    DisableDependent(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..TRIGGERS).prop_map(Step::EnableTrigger),
        (0..TRIGGERS).prop_map(Step::DisableTrigger),
        (0..DEPENDENTS).prop_map(Step::DisableDependent),
    ]
}

fn host(rules: &DependencyMap, ctx: EngineContext) -> (HostSimulator, Arc<MemoryShell>) {
    let shell = Arc::new(MemoryShell::new(everything()));
    let guard = FeaturesGuard::new(rules, shell.clone(), shell.clone());
    let host = HostSimulator::new(shell.clone(), ctx).with_handler(guard);
    (host, shell)
}

fn run(host: &HostSimulator, step: &Step) -> usize {
    let announced = match step {
        Step::EnableTrigger(i) => host.enable(&trigger(*i)),
        Step::DisableTrigger(i) => host.disable(&trigger(*i)),
        Step::DisableDependent(i) => host.disable(&dependent(*i)),
    };
    announced.expect("in-memory host never fails").len()
}

proptest! {
    /// Enabled iff some trigger is enabled, after every settled action
    #[test]
    fn dependents_follow_triggers(
        rules in rules_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..25),
    ) {
        let (host, shell) = host(&rules, EngineContext::tenant());
        let index = DependencyIndex::new(&rules);

        for step in &steps {
            run(&host, step);
            let found = violations(&index, &shell.enabled(), &everything());
            prop_assert!(found.is_empty(), "after {:?}: {:?}", step, found);
        }
    }

    /// Every id in every issued command changes state, so no write is redundant
    #[test]
    fn commands_are_never_redundant(
        rules in rules_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..25),
    ) {
        let (host, shell) = host(&rules, EngineContext::tenant());

        for step in &steps {
            let before = shell.enabled();
            shell.clear_journal();
            let announced = run(&host, step);

            let admin_changed = match step {
                Step::EnableTrigger(i) => !before.contains(trigger(*i).as_str()),
                Step::DisableTrigger(i) => before.contains(trigger(*i).as_str()),
                Step::DisableDependent(i) => before.contains(dependent(*i).as_str()),
            };
            let issued: usize = shell.journal().iter().map(|c| c.ids().len()).sum();

            prop_assert_eq!(announced, issued + usize::from(admin_changed));
        }
    }

    /// The default environment only ever sees the administrator's own changes
    #[test]
    fn default_environment_is_never_mutated(
        rules in rules_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..25),
    ) {
        let (host, shell) = host(&rules, EngineContext::default_environment());

        for step in &steps {
            run(&host, step);
        }

        prop_assert!(shell.journal().is_empty());
        let dependents_enabled = shell
            .enabled()
            .iter()
            .any(|id| id.as_str().starts_with('D'));
        prop_assert!(!dependents_enabled);
    }

    /// Calling the enabled callback twice issues commands at most once
    #[test]
    fn enable_callback_is_idempotent(
        rules in rules_strategy(),
        t in 0..TRIGGERS,
    ) {
        let shell = Arc::new(MemoryShell::new(everything()));
        let guard = FeaturesGuard::new(&rules, shell.clone(), shell.clone());
        let ctx = EngineContext::tenant();
        let id = trigger(t);

        shell.admin_enable(&id);
        let first = guard.on_module_enabled(&id, &ctx).unwrap();
        let second = guard.on_module_enabled(&id, &ctx).unwrap();

        prop_assert!(second.is_empty());
        let expected: ModuleSet = DependencyIndex::new(&rules).dependents_of(&id).clone();
        prop_assert_eq!(first.enabled(), expected.clone());
        prop_assert!(expected.iter().all(|d| shell.enabled().contains(d)));
    }
}
