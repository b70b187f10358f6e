#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use household_core::domain::{Household, Member, MemberId, RotationTask, SplitTransaction};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn test_dir() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

pub fn ids(raw: &[&str]) -> Vec<MemberId> {
    raw.iter().copied().map(MemberId::from).collect()
}

/// Three members, one shared dinner paid by Ada and a weekly bins rotation.
pub fn flat_share() -> Household {
    let mut household = Household::new("Flat 3");
    household.add_member(Member::new("A", "Ada"));
    household.add_member(Member::new("B", "Bo"));
    household.add_member(Member::new("C", "Cy"));
    household.add_transaction(
        SplitTransaction::try_new(30.0, ["A"], ["A", "B", "C"], at(1, 20))
            .expect("valid dinner")
            .with_description("Dinner"),
    );
    household.add_task(
        RotationTask::new("Bins", ids(&["A", "B", "C"]), 7, 2.0, at(3, 19)).expect("valid task"),
    );
    household
}
