mod common;

use chrono::Duration;
use household_core::{
    config::EngineConfig,
    core::services::{RotationService, ServiceError},
    domain::{FairnessMode, Household, Member, MemberId, RotationTask},
    errors::RotationError,
    rotation::{
        FairnessContext, ForecastEngine, RotationScheduler, SkipClearance, TaskPhase, Transition,
    },
};

use common::{at, flat_share, ids};

fn bins_id(household: &Household) -> uuid::Uuid {
    household.tasks[0].id
}

#[test]
fn completing_hands_the_task_to_the_next_member() {
    let mut household = flat_share();
    let config = EngineConfig::default();
    let task_id = bins_id(&household);
    let due = household.tasks[0].due_at;

    let outcome =
        RotationService::complete(&mut household, &config, task_id, &MemberId::from("A"), due)
            .unwrap();
    assert_eq!(outcome.transition, Transition::Completed);
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("B")));
    assert_eq!(outcome.task.due_at, due + Duration::days(7));
    let record = outcome.completion.expect("completion recorded");
    assert_eq!(record.user_id, MemberId::from("A"));
    assert_eq!(record.pimpers_earned, 2.0);
    assert_eq!(household.completions.len(), 1);
}

#[test]
fn skipping_advances_without_credit() {
    let mut household = flat_share();
    let config = EngineConfig::default();
    let task_id = bins_id(&household);
    let due = household.tasks[0].due_at;

    let outcome = RotationService::skip(
        &mut household,
        &config,
        task_id,
        &MemberId::from("A"),
        due,
        SkipClearance::granted(),
    )
    .unwrap();
    assert_eq!(outcome.transition, Transition::Skipped);
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("B")));
    assert!(outcome.completion.is_none());
    assert!(household.completions.is_empty());
}

#[test]
fn skip_before_due_is_rejected() {
    let mut household = flat_share();
    let task_id = bins_id(&household);
    let early = household.tasks[0].due_at - Duration::days(2);
    let err = RotationService::skip(
        &mut household,
        &EngineConfig::default(),
        task_id,
        &MemberId::from("A"),
        early,
        SkipClearance::granted(),
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Rotation(RotationError::NotDue)));
}

#[test]
fn early_completion_window_comes_from_config() {
    let mut household = flat_share();
    let task_id = bins_id(&household);
    let due = household.tasks[0].due_at;
    let config = EngineConfig {
        early_completion_window_hours: 48,
        ..EngineConfig::default()
    };

    assert!(RotationService::complete(
        &mut household.clone(),
        &EngineConfig::default(),
        task_id,
        &MemberId::from("A"),
        due - Duration::hours(36),
    )
    .is_err());
    RotationService::complete(
        &mut household,
        &config,
        task_id,
        &MemberId::from("A"),
        due - Duration::hours(36),
    )
    .unwrap();
}

#[test]
fn late_completion_is_penalized() {
    let mut household = flat_share();
    household.tasks[0] = household.tasks[0]
        .clone()
        .with_grace_period(60)
        .with_delay_penalty(0.25)
        .unwrap();
    let task_id = bins_id(&household);
    let deadline = household.tasks[0].grace_deadline().expect("representable deadline");

    assert_eq!(
        RotationService::phase(&household, task_id, deadline + Duration::minutes(1)).unwrap(),
        TaskPhase::Overdue
    );
    let outcome = RotationService::complete(
        &mut household,
        &EngineConfig::default(),
        task_id,
        &MemberId::from("A"),
        deadline + Duration::days(2),
    )
    .unwrap();
    let record = outcome.completion.unwrap();
    assert_eq!(record.delay_minutes, 2880);
    assert!((record.pimpers_earned - 1.5).abs() < 1e-9);
}

#[test]
fn take_over_credits_the_helper() {
    let mut household = flat_share();
    let task_id = bins_id(&household);
    let due = household.tasks[0].due_at;

    let outcome = RotationService::take_over(
        &mut household,
        &EngineConfig::default(),
        task_id,
        &MemberId::from("C"),
        due,
    )
    .unwrap();
    assert_eq!(outcome.previous_assignee, Some(MemberId::from("A")));
    assert_eq!(outcome.completion.unwrap().user_id, MemberId::from("C"));
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("B")));
}

#[test]
fn paused_task_rejects_every_transition() {
    let mut household = flat_share();
    let config = EngineConfig::default();
    let task_id = bins_id(&household);
    let due = household.tasks[0].due_at;

    RotationService::set_active(&mut household, &config, task_id, false).unwrap();
    assert_eq!(
        RotationService::phase(&household, task_id, due).unwrap(),
        TaskPhase::Paused
    );
    let err =
        RotationService::complete(&mut household, &config, task_id, &MemberId::from("A"), due)
            .unwrap_err();
    assert!(matches!(err, ServiceError::Rotation(RotationError::TaskInactive)));

    RotationService::set_active(&mut household, &config, task_id, true).unwrap();
    assert_eq!(household.tasks[0].due_at, due);
}

#[test]
fn vacationing_members_are_passed_over() {
    let mut household = Household::new("Holiday");
    household.add_member(Member::new("A", "Ada"));
    household.add_member(Member::new("B", "Bo").on_vacation(true));
    household.add_member(Member::new("C", "Cy"));
    let task = RotationTask::new("Dishes", ids(&["A", "B", "C"]), 1, 1.0, at(10, 18)).unwrap();
    let ctx = FairnessContext::new(&household.members, &household.tasks, &household.completions);
    let outcome = RotationScheduler::default()
        .complete(&task, &MemberId::from("A"), at(10, 18), &ctx)
        .unwrap();
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("C")));
}

#[test]
fn low_credit_members_are_prioritized() {
    let mut household = Household::new("Fair");
    for id in ["A", "B", "C"] {
        household.add_member(Member::new(id, id));
    }
    let task = RotationTask::new("Hoover", ids(&["A", "B", "C"]), 7, 3.0, at(10, 18))
        .unwrap()
        .prioritizing_low_pimpers(true);
    let task_id = household.add_task(task);
    let config = EngineConfig::default();

    // B has already done a lot this month.
    let outcome = RotationService::take_over(
        &mut household,
        &config,
        task_id,
        &MemberId::from("B"),
        at(10, 18),
    )
    .unwrap();
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("C")));

    let outcome = RotationService::complete(
        &mut household,
        &config,
        task_id,
        &MemberId::from("C"),
        at(17, 18),
    )
    .unwrap();
    assert_eq!(outcome.task.assignee_id, Some(MemberId::from("A")));
}

#[test]
fn preview_lists_every_fairness_mode() {
    let household = flat_share();
    let preview =
        RotationService::preview(&household, &EngineConfig::default(), bins_id(&household))
            .unwrap();
    assert_eq!(preview.next_assignee_id, Some(MemberId::from("B")));
    for mode in FairnessMode::ALL {
        assert_eq!(preview.order_by_mode[&mode].len(), 3);
    }
}

#[test]
fn zero_horizon_for_the_current_assignee() {
    let mut household = flat_share();
    household.add_task(
        RotationTask::new("Dishes", ids(&["A", "B", "C"]), 1, 3.0, at(3, 19)).unwrap(),
    );
    let forecasts = RotationService::forecast(&household, bins_id(&household)).unwrap();
    let assignee = &forecasts[0];
    assert_eq!(assignee.candidate_id, MemberId::from("A"));
    assert_eq!(assignee.turns_until_turn, 0);
    assert_eq!(assignee.projected_credit, 0.0);

    // C waits two weekly turns: 14 daily dishes rounds shared by three.
    let last = &forecasts[2];
    assert_eq!(last.horizon_days, 14.0);
    assert!((last.projected_credit - 14.0).abs() < 1e-9);

    let engine = ForecastEngine::new(&household.tasks);
    let task = &household.tasks[0];
    assert_eq!(
        ForecastEngine::turns_until_turn(task, &MemberId::from("B"), &task.rotation_user_ids),
        1
    );
    assert_eq!(
        engine.projected_credit(task, &MemberId::from("B"), &task.rotation_user_ids, 10.0),
        0.0
    );
}
