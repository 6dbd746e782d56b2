use rc_handle::scenarios::{self, Report, Scenario};

#[test]
fn lifecycle_report() {
    let r = scenarios::basic_lifecycle();
    assert_eq!(r.count_after_new, 1);
    assert_eq!(r.count_after_copy, 2);
    assert_eq!(r.count_after_first_reset, 1);
    assert!(r.alive_after_first_reset);
    assert!(r.first_empty);
    assert!(r.destroyed_after_second_reset);
    assert!(r.second_empty);
}

#[test]
fn cycle_leak_report() {
    let r = scenarios::cycle_leak().unwrap();
    assert_eq!((r.a_count_linked, r.b_count_linked), (2, 2));
    assert_eq!((r.a_count_unreachable, r.b_count_unreachable), (1, 1));
    assert!(r.reclaimed_after_unlink);
}

#[test]
fn cycle_fix_report() {
    let r = scenarios::cycle_fix();
    assert_eq!(r.a_count_linked, 1);
    assert_eq!(r.b_count_linked, 2);
    assert!(r.a_destroyed);
    assert!(r.b_sees_a_expired);
    assert_eq!(r.b_count_after_a, 1);
    assert!(r.b_destroyed);
}

#[test]
fn observe_report() {
    let r = scenarios::observe_until_destroyed().unwrap();
    assert!(!r.expired_while_owned);
    assert_eq!(r.count_with_lock, 2);
    assert!(!r.expired_while_only_lock_held);
    assert!(r.expired_after_all_reset);
    assert!(r.lock_after_destroy_empty);
}

#[test]
fn wiring_report() {
    let r = scenarios::nested_wiring();
    assert_eq!(r.a_count, 2);
    assert_eq!(r.b_count, 1);
    assert!(r.a_owns_inner_b);
    assert!(r.inner_b_peer_empty);
    assert!(r.all_destroyed);
}

#[test]
fn arena_report() {
    let r = scenarios::arena_pair().unwrap();
    assert_eq!(r.nodes_linked, 2);
    assert!(r.b_peer_stale_after_remove);
    assert_eq!(r.freed_by_sweep, 1);
    assert_eq!(r.remaining, 0);
}

#[test]
fn every_scenario_runs() {
    for s in Scenario::ALL {
        let report = s.run().unwrap();
        let matches_kind = matches!(
            (s, &report),
            (Scenario::Lifecycle, Report::Lifecycle(_))
                | (Scenario::CycleLeak, Report::CycleLeak(_))
                | (Scenario::CycleFix, Report::CycleFix(_))
                | (Scenario::Observe, Report::Observe(_))
                | (Scenario::Wiring, Report::Wiring(_))
                | (Scenario::Arena, Report::Arena(_))
        );
        assert!(matches_kind, "{} produced {:?}", s.name(), report);
    }
}
