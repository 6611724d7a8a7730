// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 出勤希望 upsert、班段整体替换、求解记录顺序
// ==========================================


use shift_scheduler::domain::{AvailabilityEntry, ScheduleRun, ScheduleRunStatus, ShiftBlock};
use shift_scheduler::repository::{
    AvailabilityRepository, DemandRepository, RepositoryError, ScheduleRunRepository,
    ShiftBlockRepository, WorkerRepository,
};
use test_helpers::{create_test_db, date, open_shared, seed_workers, test_date};

// ==========================================
// 出勤希望
// ==========================================

#[test]
fn test_availability_upsert_keeps_one_row_per_worker_and_date() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = AvailabilityRepository::from_connection(conn);

    let ids = seed_workers(&workers, &["A"]);
    repo.upsert(&AvailabilityEntry::available(ids[0], test_date(), 9, Some(17)))
        .unwrap();
    repo.upsert(&AvailabilityEntry::available(ids[0], test_date(), 12, None))
        .unwrap();

    let entries = repo.find_by_date(test_date()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start_hour, 12);
    assert_eq!(entries[0].end_hour, None);
}

#[test]
fn test_availability_for_unknown_worker_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = AvailabilityRepository::from_connection(open_shared(&db_path));

    let result = repo.upsert(&AvailabilityEntry::available(999, test_date(), 9, None));
    assert!(result.is_err());
    assert!(repo.find_by_date(test_date()).unwrap().is_empty());
}

#[test]
fn test_availability_batch_and_delete() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = AvailabilityRepository::from_connection(conn);
    let ids = seed_workers(&workers, &["A"]);

    let entries: Vec<_> = (24..=26)
        .map(|d| AvailabilityEntry::available(ids[0], date(2025, 11, d), 10, Some(18)))
        .collect();
    assert_eq!(repo.upsert_batch(&entries).unwrap(), 3);

    assert!(repo.delete(ids[0], date(2025, 11, 25)).unwrap());
    assert!(!repo.delete(ids[0], date(2025, 11, 25)).unwrap());
    assert!(repo.find_by_date(date(2025, 11, 25)).unwrap().is_empty());
    assert_eq!(repo.find_by_date(date(2025, 11, 26)).unwrap().len(), 1);
}

// ==========================================
// 员工
// ==========================================

#[test]
fn test_deactivated_worker_is_not_listed() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = WorkerRepository::from_connection(open_shared(&db_path));
    let ids = seed_workers(&repo, &["A", "B"]);

    repo.set_active(ids[0], false).unwrap();

    let active = repo.list_active().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].worker_id, ids[1]);

    let err = repo.set_active(12345, true).unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

// ==========================================
// 班段整体替换
// ==========================================

#[test]
fn test_replace_for_date_leaves_no_stale_blocks() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = ShiftBlockRepository::from_connection(conn);
    let ids = seed_workers(&workers, &["A", "B", "C"]);
    let day = test_date();

    repo.replace_for_date(
        day,
        &[
            ShiftBlock::new(ids[0], day, 9, 17),
            ShiftBlock::new(ids[1], day, 15, 23),
        ],
    )
    .unwrap();
    repo.replace_for_date(day, &[ShiftBlock::new(ids[2], day, 10, 18)])
        .unwrap();

    let blocks = repo.find_by_date(day).unwrap();
    assert_eq!(blocks, vec![ShiftBlock::new(ids[2], day, 10, 18)]);
}

#[test]
fn test_replace_for_date_does_not_touch_other_dates() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = ShiftBlockRepository::from_connection(conn);
    let ids = seed_workers(&workers, &["A"]);
    let monday = date(2025, 11, 24);
    let tuesday = date(2025, 11, 25);

    repo.replace_for_date(monday, &[ShiftBlock::new(ids[0], monday, 9, 13)])
        .unwrap();
    repo.replace_for_date(tuesday, &[]).unwrap();

    assert_eq!(repo.find_by_date(monday).unwrap().len(), 1);
    assert!(repo.find_by_date(tuesday).unwrap().is_empty());
}

#[test]
fn test_invalid_block_keeps_previous_schedule() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = ShiftBlockRepository::from_connection(conn);
    let ids = seed_workers(&workers, &["A"]);
    let day = test_date();

    repo.replace_for_date(day, &[ShiftBlock::new(ids[0], day, 9, 17)])
        .unwrap();

    // 日期不一致
    let other_day = date(2025, 11, 26);
    let err = repo
        .replace_for_date(day, &[ShiftBlock::new(ids[0], other_day, 9, 12)])
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));

    // 区间为空
    let err = repo
        .replace_for_date(day, &[ShiftBlock::new(ids[0], day, 12, 12)])
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError(_)));

    assert_eq!(
        repo.find_by_date(day).unwrap(),
        vec![ShiftBlock::new(ids[0], day, 9, 17)]
    );
}

#[test]
fn test_failed_insert_rolls_back_delete() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_shared(&db_path);
    let workers = WorkerRepository::from_connection(conn.clone());
    let repo = ShiftBlockRepository::from_connection(conn);
    let ids = seed_workers(&workers, &["A"]);
    let day = test_date();

    repo.replace_for_date(day, &[ShiftBlock::new(ids[0], day, 9, 17)])
        .unwrap();

    // 第二条引用不存在的员工，外键失败，整个事务回滚
    let result = repo.replace_for_date(
        day,
        &[
            ShiftBlock::new(ids[0], day, 10, 14),
            ShiftBlock::new(999, day, 14, 18),
        ],
    );
    assert!(result.is_err());

    assert_eq!(
        repo.find_by_date(day).unwrap(),
        vec![ShiftBlock::new(ids[0], day, 9, 17)]
    );
}

// ==========================================
// 需求覆写
// ==========================================

#[test]
fn test_demand_override_upsert_and_clear() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = DemandRepository::from_connection(open_shared(&db_path));
    let day = test_date();

    repo.set_override(day, 18, 2).unwrap();
    repo.set_override(day, 18, 3).unwrap();
    repo.set_override(day, 10, 0).unwrap();

    let overrides = repo.find_overrides(day).unwrap();
    assert_eq!(overrides.len(), 2);
    assert_eq!(overrides.get(&18), Some(&3));
    assert_eq!(overrides.get(&10), Some(&0));

    assert_eq!(repo.clear_overrides(day).unwrap(), 2);
    assert!(repo.find_overrides(day).unwrap().is_empty());
}

// ==========================================
// 求解记录
// ==========================================

#[test]
fn test_schedule_runs_are_listed_newest_first() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = ScheduleRunRepository::from_connection(open_shared(&db_path));
    let day = test_date();

    let first = repo
        .insert(
            &ScheduleRun::new(day, ScheduleRunStatus::Infeasible).with_message("17时 人手不足"),
        )
        .unwrap();
    let second = repo
        .insert(
            &ScheduleRun::new(day, ScheduleRunStatus::Solved)
                .with_objective(16, true)
                .with_gap_count(1)
                .with_elapsed_ms(12),
        )
        .unwrap();
    repo.insert(&ScheduleRun::new(date(2025, 11, 26), ScheduleRunStatus::Solved))
        .unwrap();

    let runs = repo.find_by_date(day).unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].run_id, second);
    assert_eq!(runs[0].status, ScheduleRunStatus::Solved);
    assert_eq!(runs[0].objective, Some(16));
    assert!(runs[0].optimal);
    assert_eq!(runs[0].gap_count, 1);
    assert_eq!(runs[1].run_id, first);
    assert_eq!(runs[1].status, ScheduleRunStatus::Infeasible);
    assert_eq!(runs[1].objective, None);
    assert_eq!(runs[1].message.as_deref(), Some("17时 人手不足"));
}
