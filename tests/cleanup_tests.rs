//! End-to-end tests for the reclamation pipeline: phase sequencing,
//! eviction behavior against scripted probes, exclusion handling across
//! phases, and the single-instance guard.

mod common;

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use assert_fs::TempDir;
use assert_fs::prelude::*;
use common::{ConstantProbe, ScriptedProbe, create_aged_file};
use predicates::prelude::*;
use reclaim::audit::AuditLog;
use reclaim::cleanup::Cleanup;
use reclaim::error::ReclaimError;
use reclaim::exclude::ExclusionSet;
use reclaim::guard::{self, InstanceGuard};
use reclaim::scan;

fn quiet_audit() -> AuditLog {
    AuditLog::console(true)
}

#[test]
fn test_eviction_removes_oldest_first_and_stops_at_threshold() {
    let tmp = TempDir::new().unwrap();
    let oldest = create_aged_file(tmp.path(), "backup-2024.tar", 60);
    let middle = create_aged_file(tmp.path(), "backup-2025.tar", 40);
    let newest = create_aged_file(tmp.path(), "backup-2026.tar", 20);

    // Usage drops below the 85% threshold after two deletions.
    let probe = ScriptedProbe::new(vec![96, 90, 84]);
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(85)
        .build();
    let stats = cleanup.run(&probe, &mut quiet_audit()).unwrap();

    assert_eq!(stats.files_evicted, 2);
    assert!(predicate::path::missing().eval(&oldest));
    assert!(predicate::path::missing().eval(&middle));
    assert!(predicate::path::exists().eval(&newest));
}

#[test]
fn test_eviction_stops_instantly_when_already_under_threshold() {
    let tmp = TempDir::new().unwrap();
    let file = create_aged_file(tmp.path(), "data", 60);

    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(85)
        .build();
    let stats = cleanup.run(&ConstantProbe(70), &mut quiet_audit()).unwrap();

    assert_eq!(stats.files_evicted, 0);
    assert!(file.exists());
}

#[test]
fn test_eviction_exhausted_when_goal_unreachable() {
    let tmp = TempDir::new().unwrap();
    create_aged_file(tmp.path(), "only", 60);

    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(50)
        .build();
    let result = cleanup.run(&ConstantProbe(99), &mut quiet_audit());

    // The single candidate is removed, then the loop runs out of files
    // while usage is still reported above threshold.
    assert!(matches!(
        result,
        Err(ReclaimError::EvictionExhausted {
            percent: 99,
            threshold: 50
        })
    ));
    assert!(!tmp.path().join("only").exists());
}

#[test]
fn test_exclusions_apply_to_every_phase() {
    let tmp = TempDir::new().unwrap();
    let kept_old = create_aged_file(tmp.path(), "kept/ancient.keep", 600);
    let evictable = create_aged_file(tmp.path(), "spool/old.dat", 300);
    tmp.child("kept/empty").create_dir_all().unwrap();

    let exclusions: ExclusionSet = ["kept", "*.keep"].into_iter().collect();
    let probe = ScriptedProbe::new(vec![95, 80]);
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(85)
        .prune_empty_dirs(true)
        .exclusions(exclusions)
        .build();
    let stats = cleanup.run(&probe, &mut quiet_audit()).unwrap();

    // The excluded subtree is untouched by eviction and pruning alike.
    assert_eq!(stats.files_evicted, 1);
    assert!(kept_old.exists());
    assert!(tmp.path().join("kept/empty").exists());
    assert!(!evictable.exists());
}

#[test]
fn test_enumerator_never_lists_excluded_paths() {
    let tmp = TempDir::new().unwrap();
    create_aged_file(tmp.path(), "a.log", 10);
    create_aged_file(tmp.path(), "b.dat", 10);
    create_aged_file(tmp.path(), "nested/c.log", 10);

    let exclusions: ExclusionSet = ["*.log"].into_iter().collect();
    let compiled = exclusions.compile().unwrap();

    let files = scan::list_files(tmp.path(), &compiled).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("b.dat"));

    let oldest = scan::oldest_file(tmp.path(), &compiled).unwrap().unwrap();
    assert!(oldest.ends_with("b.dat"));
}

#[test]
fn test_phase_order_prune_sees_dirs_emptied_by_eviction() {
    let tmp = TempDir::new().unwrap();
    // A directory whose only file is evicted in this same run. It was
    // not empty when pruning candidates would have been gathered before
    // eviction, so phase ordering matters.
    let victim = create_aged_file(tmp.path(), "spool/old", 600);

    let probe = ScriptedProbe::new(vec![95, 80]);
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(85)
        .prune_empty_dirs(true)
        .build();
    let stats = cleanup.run(&probe, &mut quiet_audit()).unwrap();

    assert!(!victim.exists());
    assert_eq!(stats.files_evicted, 1);
    // Pruning runs after eviction and finds the now-empty directory.
    assert_eq!(stats.dirs_pruned, 1);
    assert!(!tmp.path().join("spool").exists());
}

#[test]
fn test_age_phase_removes_eligible_files_exactly_once() {
    let tmp = TempDir::new().unwrap();
    let log = TempDir::new().unwrap();
    let log_path = log.path().join("audit.log");
    create_aged_file(tmp.path(), "stale", 600);
    fs::create_dir(tmp.path().join("sub")).unwrap();
    create_aged_file(tmp.path(), "sub/also-stale", 600);

    // Status-change times cannot be staged the way mtimes can, so pin the
    // cutoff in the future to make every file eligible.
    let cutoff = SystemTime::now() + Duration::from_secs(3600);
    let build = || {
        Cleanup::builder()
            .target(tmp.path())
            .age_cutoff(cutoff)
            .build()
    };

    let mut audit = AuditLog::new(Some(log_path.to_str().unwrap()), true).unwrap();
    let stats = build().run(&ConstantProbe(0), &mut audit).unwrap();
    drop(audit);

    assert_eq!(stats.files_aged_out, 2);
    assert!(!tmp.path().join("stale").exists());
    assert!(!tmp.path().join("sub/also-stale").exists());

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.lines().any(|l| l.starts_with("age: removed") && l.contains("stale")));

    // Same cutoff again: everything eligible is already gone.
    let stats = build().run(&ConstantProbe(0), &mut quiet_audit()).unwrap();
    assert_eq!(stats.files_aged_out, 0);
}

#[test]
fn test_dry_run_age_phase_lists_without_deleting() {
    let tmp = TempDir::new().unwrap();
    create_aged_file(tmp.path(), "victim", 10);

    // A future cutoff makes the file eligible, so the dry run must list
    // it while leaving it in place.
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .age_cutoff(SystemTime::now() + Duration::from_secs(3600))
        .dry_run(true)
        .build();
    let stats = cleanup.run(&ConstantProbe(0), &mut quiet_audit()).unwrap();

    assert_eq!(stats.files_aged_out, 1);
    assert!(tmp.path().join("victim").exists());
}

#[test]
fn test_guard_blocks_second_run_against_same_target() {
    let tmp = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    let _held = InstanceGuard::acquire(state.path(), tmp.path()).unwrap();
    let second = InstanceGuard::acquire(state.path(), tmp.path());
    assert!(matches!(
        second,
        Err(ReclaimError::AlreadyRunning { .. })
    ));
}

#[test]
fn test_guard_released_after_run() {
    let tmp = TempDir::new().unwrap();
    let state = TempDir::new().unwrap();

    {
        let _guard = InstanceGuard::acquire(state.path(), tmp.path()).unwrap();
        let cleanup = Cleanup::builder().target(tmp.path()).build();
        cleanup.run(&ConstantProbe(0), &mut quiet_audit()).unwrap();
    }

    // A fresh acquisition succeeds once the previous guard is dropped.
    let reacquired = InstanceGuard::acquire(state.path(), tmp.path());
    assert!(reacquired.is_ok());
}

#[test]
fn test_guard_markers_are_per_target() {
    let state = TempDir::new().unwrap();
    let a = guard::marker_path(state.path(), Path::new("/srv/a"));
    let b = guard::marker_path(state.path(), Path::new("/srv/b"));
    assert_ne!(a, b);
}

#[test]
fn test_audit_log_records_evictions() {
    let tmp = TempDir::new().unwrap();
    let log = TempDir::new().unwrap();
    let log_path = log.path().join("audit.log");
    create_aged_file(tmp.path(), "doomed", 60);

    let mut audit = AuditLog::new(Some(log_path.to_str().unwrap()), true).unwrap();
    let probe = ScriptedProbe::new(vec![95, 80]);
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .usage_threshold(85)
        .build();
    cleanup.run(&probe, &mut audit).unwrap();
    drop(audit);

    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("doomed"));
    assert!(contents.lines().any(|l| l.starts_with("evict: removed")));
}

#[test]
fn test_eviction_error_leaves_age_deletions_applied() {
    let tmp = TempDir::new().unwrap();
    create_aged_file(tmp.path(), "survivor", 5);

    // Age phase: nothing old enough (ctime is fresh). Eviction: the one
    // candidate goes, then exhaustion. Phases are not transactional, so
    // the partial result stands.
    let cleanup = Cleanup::builder()
        .target(tmp.path())
        .age_minutes(60)
        .usage_threshold(10)
        .build();
    let result = cleanup.run(&ConstantProbe(99), &mut quiet_audit());

    assert!(matches!(
        result,
        Err(ReclaimError::EvictionExhausted { .. })
    ));
    assert!(!tmp.path().join("survivor").exists());
}
