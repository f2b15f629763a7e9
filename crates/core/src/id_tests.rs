use super::*;

#[test]
fn task_id_round_trips_through_display_and_parse() {
    let id = TaskId::new(42);
    let parsed: TaskId = id.to_string().parse().unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn job_id_orders_by_index() {
    assert!(JobId::new(0) < JobId::new(1));
}

#[test]
fn distinct_id_types_do_not_unify() {
    let task = TaskId::new(3);
    let job = JobId::new(3);
    assert_eq!(task.index(), job.index());
    // Different types: this line wouldn't compile if uncommented.
    // let _ : TaskId = job;
}

#[test]
fn as_usize_matches_index() {
    let id = JobId::new(7);
    assert_eq!(id.as_usize(), 7usize);
}
