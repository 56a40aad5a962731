//! Integration tests for the enrollment transaction and certificate requests.
//!
//! Exercises `EnrollmentRepo` against a real database:
//! - enrolling consumes exactly one seat and creates an ONGOING enrollment
//! - full trainings and duplicate enrollments are refused without side effects
//! - concurrent enrollments never oversell a training
//! - certificate requests honour ownership and completion status

use std::time::Duration;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use seatwise_core::training::EnrollmentError;
use seatwise_db::error::EnrollError;
use seatwise_db::models::employee::{CreateEmployee, Employee};
use seatwise_db::models::status::EnrollmentStatus;
use seatwise_db::models::training::{CreateTraining, Training};
use seatwise_db::repositories::{EmployeeRepo, EnrollmentRepo, TrainingRepo};
use sqlx::PgPool;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_training(pool: &PgPool, name: &str, seats: i32) -> Training {
    let input = CreateTraining {
        name: name.to_string(),
        department: "Engineering".to_string(),
        total_seats: seats,
        start_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 11, 6).unwrap(),
    };
    TrainingRepo::create(pool, &input).await.unwrap()
}

async fn new_employee(pool: &PgPool, user_id: i64) -> Employee {
    let input = CreateEmployee {
        user_id,
        department: "Engineering".to_string(),
        salary: Some("52000.00".to_string()),
    };
    EmployeeRepo::create(pool, &input).await.unwrap()
}

/// Force a training's available seat count, bypassing the enrollment path.
async fn set_available_seats(pool: &PgPool, training_id: i64, seats: i32) {
    sqlx::query("UPDATE trainings SET available_seats = $2 WHERE id = $1")
        .bind(training_id)
        .bind(seats)
        .execute(pool)
        .await
        .unwrap();
}

async fn available_seats(pool: &PgPool, training_id: i64) -> i32 {
    TrainingRepo::find_by_id(pool, training_id)
        .await
        .unwrap()
        .unwrap()
        .available_seats
}

// ---------------------------------------------------------------------------
// Enroll
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enroll_consumes_one_seat(pool: PgPool) {
    let training = new_training(&pool, "Rust Basics", 3).await;
    let employee = new_employee(&pool, 100).await;

    let enrollment = EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();

    assert_eq!(enrollment.employee_id, employee.id);
    assert_eq!(enrollment.training_id, training.id);
    assert_eq!(enrollment.status_id, EnrollmentStatus::Ongoing.id());
    assert!(!enrollment.certificate_requested);
    assert!(enrollment.certificate_requested_at.is_none());
    assert_eq!(available_seats(&pool, training.id).await, 2);
}

/// Training{total=2, available=1}: A succeeds, B is refused, nothing else moves.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_last_seat_goes_to_first_caller(pool: PgPool) {
    let training = new_training(&pool, "Last Seat", 2).await;
    set_available_seats(&pool, training.id, 1).await;
    let a = new_employee(&pool, 1).await;
    let b = new_employee(&pool, 2).await;

    let enrollment = EnrollmentRepo::enroll(&pool, a.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    assert_eq!(enrollment.status_id, EnrollmentStatus::Ongoing.id());
    assert_eq!(available_seats(&pool, training.id).await, 0);

    let err = EnrollmentRepo::enroll(&pool, b.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap_err();
    assert_matches!(err, EnrollError::Rejected(EnrollmentError::NoSeatsAvailable));

    assert_eq!(available_seats(&pool, training.id).await, 0);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        1
    );
    assert!(EnrollmentRepo::list_for_employee(&pool, b.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enroll_twice_is_refused(pool: PgPool) {
    let training = new_training(&pool, "Twice", 5).await;
    let employee = new_employee(&pool, 7).await;

    EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    let seats_after_first = available_seats(&pool, training.id).await;

    let err = EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap_err();
    assert_matches!(err, EnrollError::Rejected(EnrollmentError::AlreadyEnrolled));

    assert_eq!(available_seats(&pool, training.id).await, seats_after_first);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enroll_unknown_training(pool: PgPool) {
    let employee = new_employee(&pool, 8).await;

    let err = EnrollmentRepo::enroll(&pool, employee.id, 999_999, LOCK_TIMEOUT)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        EnrollError::Rejected(EnrollmentError::TrainingNotFound(999_999))
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_training_creates_nothing(pool: PgPool) {
    let training = new_training(&pool, "Full", 1).await;
    set_available_seats(&pool, training.id, 0).await;
    let employee = new_employee(&pool, 9).await;

    let err = EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap_err();

    assert_matches!(err, EnrollError::Rejected(EnrollmentError::NoSeatsAvailable));
    assert_eq!(available_seats(&pool, training.id).await, 0);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        0
    );
}

/// A failed insert after the seat update leaves the seat untouched.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_failed_insert_rolls_back_seat(pool: PgPool) {
    let training = new_training(&pool, "Rollback", 2).await;

    // No employee with this id exists, so the FK on the insert fails after
    // the seat has been taken inside the transaction.
    let err = EnrollmentRepo::enroll(&pool, 424_242, training.id, LOCK_TIMEOUT)
        .await
        .unwrap_err();

    assert_matches!(err, EnrollError::Database(_));
    assert_eq!(available_seats(&pool, training.id).await, 2);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        0
    );
}

/// Caller-owned transaction that is dropped without commit keeps no effect.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_enroll_in_tx_without_commit_has_no_effect(pool: PgPool) {
    let training = new_training(&pool, "Uncommitted", 2).await;
    let employee = new_employee(&pool, 10).await;

    {
        let mut tx = pool.begin().await.unwrap();
        EnrollmentRepo::enroll_in_tx(&mut tx, employee.id, training.id)
            .await
            .unwrap();
        tx.rollback().await.unwrap();
    }

    assert_eq!(available_seats(&pool, training.id).await, 2);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        0
    );
}

/// A second caller blocked on the training row lock gives up after the
/// lock timeout instead of waiting forever.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_timeout_fails_transaction(pool: PgPool) {
    let training = new_training(&pool, "Contended", 5).await;
    let holder = new_employee(&pool, 11).await;
    let waiter = new_employee(&pool, 12).await;

    let mut tx = pool.begin().await.unwrap();
    EnrollmentRepo::enroll_in_tx(&mut tx, holder.id, training.id)
        .await
        .unwrap();

    let err = EnrollmentRepo::enroll(&pool, waiter.id, training.id, Duration::from_millis(100))
        .await
        .unwrap_err();

    match err {
        EnrollError::Database(db) => {
            assert!(seatwise_db::error::is_transaction_failure(&db), "got {db:?}");
        }
        other => panic!("expected a database error, got {other:?}"),
    }

    tx.rollback().await.unwrap();
    assert_eq!(available_seats(&pool, training.id).await, 5);
}

/// A zero lock timeout fails fast instead of waiting behind the holder.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_zero_lock_timeout_does_not_wait_forever(pool: PgPool) {
    let training = new_training(&pool, "Contended", 5).await;
    let holder = new_employee(&pool, 11).await;
    let waiter = new_employee(&pool, 12).await;

    let mut tx = pool.begin().await.unwrap();
    EnrollmentRepo::enroll_in_tx(&mut tx, holder.id, training.id)
        .await
        .unwrap();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        EnrollmentRepo::enroll(&pool, waiter.id, training.id, Duration::ZERO),
    )
    .await
    .expect("enroll must not block behind the held lock");

    match result.unwrap_err() {
        EnrollError::Database(db) => {
            assert!(seatwise_db::error::is_transaction_failure(&db), "got {db:?}");
        }
        other => panic!("expected a database error, got {other:?}"),
    }

    tx.rollback().await.unwrap();
    assert_eq!(available_seats(&pool, training.id).await, 5);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// N concurrent enrollments against k seats: exactly k succeed.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_enrollments_never_oversell(pool: PgPool) {
    const SEATS: i32 = 3;
    const CALLERS: i64 = 8;

    let training = new_training(&pool, "Popular", SEATS).await;
    let mut employees = Vec::new();
    for user_id in 0..CALLERS {
        employees.push(new_employee(&pool, 1_000 + user_id).await);
    }

    let handles = employees.iter().map(|employee| {
        let pool = pool.clone();
        let employee_id = employee.id;
        let training_id = training.id;
        tokio::spawn(async move {
            EnrollmentRepo::enroll(&pool, employee_id, training_id, LOCK_TIMEOUT).await
        })
    });
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, SEATS as usize);
    for result in results.iter().filter(|r| r.is_err()) {
        assert_matches!(
            result,
            Err(EnrollError::Rejected(EnrollmentError::NoSeatsAvailable))
        );
    }

    assert_eq!(available_seats(&pool, training.id).await, 0);
    assert_eq!(
        EnrollmentRepo::count_for_training(&pool, training.id).await.unwrap(),
        i64::from(SEATS)
    );
}

/// The same employee racing against itself on one free seat enrolls once.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_duplicate_enrollment(pool: PgPool) {
    let training = new_training(&pool, "Race", 1).await;
    let employee = new_employee(&pool, 20).await;

    let (first, second) = tokio::join!(
        EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT),
        EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = outcomes.iter().find(|r| r.is_err()).unwrap();
    assert_matches!(
        failure,
        Err(EnrollError::Rejected(
            EnrollmentError::NoSeatsAvailable | EnrollmentError::AlreadyEnrolled
        ))
    );
    assert_eq!(available_seats(&pool, training.id).await, 0);
}

/// Enrollments on different trainings do not wait on each other's locks.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_trainings_not_blocked(pool: PgPool) {
    let locked = new_training(&pool, "Locked", 2).await;
    let free = new_training(&pool, "Free", 2).await;
    let holder = new_employee(&pool, 30).await;
    let other = new_employee(&pool, 31).await;

    let mut tx = pool.begin().await.unwrap();
    EnrollmentRepo::enroll_in_tx(&mut tx, holder.id, locked.id)
        .await
        .unwrap();

    let enrollment = EnrollmentRepo::enroll(&pool, other.id, free.id, Duration::from_millis(200))
        .await
        .unwrap();
    assert_eq!(enrollment.training_id, free.id);

    tx.commit().await.unwrap();
    assert_eq!(available_seats(&pool, locked.id).await, 1);
    assert_eq!(available_seats(&pool, free.id).await, 1);
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_for_employee_joins_training(pool: PgPool) {
    let later = {
        let input = CreateTraining {
            name: "Later".to_string(),
            department: "Finance".to_string(),
            total_seats: 4,
            start_date: NaiveDate::from_ymd_opt(2027, 1, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2027, 1, 12).unwrap(),
        };
        TrainingRepo::create(&pool, &input).await.unwrap()
    };
    let sooner = new_training(&pool, "Sooner", 4).await;
    let employee = new_employee(&pool, 40).await;
    let someone_else = new_employee(&pool, 41).await;

    EnrollmentRepo::enroll(&pool, employee.id, later.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    EnrollmentRepo::enroll(&pool, employee.id, sooner.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    EnrollmentRepo::enroll(&pool, someone_else.id, sooner.id, LOCK_TIMEOUT)
        .await
        .unwrap();

    let list = EnrollmentRepo::list_for_employee(&pool, employee.id)
        .await
        .unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].training_name, "Sooner");
    assert_eq!(list[1].training_name, "Later");
    assert_eq!(list[1].training_department, "Finance");
    assert!(list.iter().all(|e| e.status == "ONGOING"));
    assert!(list.iter().all(|e| e.employee_id == employee.id));
}

// ---------------------------------------------------------------------------
// Certificate
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_certificate_refused_while_ongoing(pool: PgPool) {
    let training = new_training(&pool, "Ongoing", 2).await;
    let employee = new_employee(&pool, 50).await;
    let enrollment = EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();

    let err = EnrollmentRepo::request_certificate(&pool, enrollment.id, employee.id)
        .await
        .unwrap_err();
    assert_matches!(err, EnrollError::Rejected(EnrollmentError::TrainingNotCompleted));

    let stored = EnrollmentRepo::find_for_employee(&pool, enrollment.id, employee.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.certificate_requested);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_certificate_on_completed_enrollment(pool: PgPool) {
    let training = new_training(&pool, "Done", 2).await;
    let employee = new_employee(&pool, 51).await;
    let enrollment = EnrollmentRepo::enroll(&pool, employee.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    EnrollmentRepo::set_status(&pool, enrollment.id, EnrollmentStatus::Completed)
        .await
        .unwrap()
        .unwrap();

    let first = EnrollmentRepo::request_certificate(&pool, enrollment.id, employee.id)
        .await
        .unwrap();
    assert!(first.certificate_requested);
    let requested_at = first.certificate_requested_at.expect("timestamp set");

    // Repeat request is a no-op success that keeps the first timestamp.
    let second = EnrollmentRepo::request_certificate(&pool, enrollment.id, employee.id)
        .await
        .unwrap();
    assert!(second.certificate_requested);
    assert_eq!(second.certificate_requested_at, Some(requested_at));
}

/// Someone else's completed enrollment looks exactly like a missing one.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_certificate_for_foreign_enrollment(pool: PgPool) {
    let training = new_training(&pool, "Foreign", 2).await;
    let owner = new_employee(&pool, 60).await;
    let intruder = new_employee(&pool, 61).await;
    let enrollment = EnrollmentRepo::enroll(&pool, owner.id, training.id, LOCK_TIMEOUT)
        .await
        .unwrap();
    EnrollmentRepo::set_status(&pool, enrollment.id, EnrollmentStatus::Completed)
        .await
        .unwrap();

    let foreign = EnrollmentRepo::request_certificate(&pool, enrollment.id, intruder.id)
        .await
        .unwrap_err();
    let missing = EnrollmentRepo::request_certificate(&pool, 987_654, intruder.id)
        .await
        .unwrap_err();

    assert_matches!(
        foreign,
        EnrollError::Rejected(EnrollmentError::EnrollmentNotFoundOrUnauthorized(_))
    );
    assert_matches!(
        missing,
        EnrollError::Rejected(EnrollmentError::EnrollmentNotFoundOrUnauthorized(_))
    );

    let stored = EnrollmentRepo::find_for_employee(&pool, enrollment.id, owner.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.certificate_requested);
}

// ---------------------------------------------------------------------------
// Catalogue and employee lookup
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_trainings_by_department(pool: PgPool) {
    new_training(&pool, "Eng A", 2).await;
    new_training(&pool, "Eng B", 2).await;
    let finance = CreateTraining {
        name: "Ledgers".to_string(),
        department: "Finance".to_string(),
        total_seats: 2,
        start_date: NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 12, 2).unwrap(),
    };
    TrainingRepo::create(&pool, &finance).await.unwrap();

    let all = TrainingRepo::list(&pool, None).await.unwrap();
    let eng = TrainingRepo::list(&pool, Some("Engineering")).await.unwrap();
    let none = TrainingRepo::list(&pool, Some("Legal")).await.unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(eng.len(), 2);
    assert!(eng.iter().all(|t| t.department == "Engineering"));
    assert!(none.is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_employee_by_user_id(pool: PgPool) {
    let employee = new_employee(&pool, 77).await;

    let found = EmployeeRepo::find_by_user_id(&pool, 77).await.unwrap().unwrap();
    assert_eq!(found.id, employee.id);
    assert_eq!(found.salary, "52000.00");

    assert!(EmployeeRepo::find_by_user_id(&pool, 78).await.unwrap().is_none());
}
