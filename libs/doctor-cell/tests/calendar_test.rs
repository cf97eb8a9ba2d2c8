use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use doctor_cell::models::{DoctorId, SlotTime};
use doctor_cell::services::{InMemoryCalendar, SlotCalendar};

fn slots(times: &[&str]) -> BTreeSet<SlotTime> {
    times.iter().map(|t| t.parse().unwrap()).collect()
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn seeded_calendar(doctor: &DoctorId, day: NaiveDate, times: &[&str]) -> InMemoryCalendar {
    let calendar = InMemoryCalendar::new();
    calendar
        .set_availability(doctor, day, slots(times))
        .await
        .unwrap();
    calendar
}

#[tokio::test]
async fn test_reserve_removes_slot_from_availability() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00", "11:00"]).await;

    let outcome = calendar
        .reserve(&doctor, day, "10:00".parse().unwrap())
        .await
        .unwrap();

    assert!(outcome.is_reserved());
    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["11:00"])
    );
}

#[tokio::test]
async fn test_reserve_taken_slot_is_already_taken() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00"]).await;
    let slot: SlotTime = "10:00".parse().unwrap();

    calendar.reserve(&doctor, day, slot).await.unwrap();
    let second = calendar.reserve(&doctor, day, slot).await.unwrap();

    assert!(!second.is_reserved());
}

#[tokio::test]
async fn test_reserve_unpublished_time_leaves_slots_untouched() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00", "11:00"]).await;

    let outcome = calendar
        .reserve(&doctor, day, "12:00".parse().unwrap())
        .await
        .unwrap();

    assert!(!outcome.is_reserved());
    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["10:00", "11:00"])
    );
}

#[tokio::test]
async fn test_reserve_without_schedule_entry() {
    let calendar = InMemoryCalendar::new();

    let outcome = calendar
        .reserve(&DoctorId::new("D1"), date("2024-06-01"), "10:00".parse().unwrap())
        .await
        .unwrap();

    assert!(!outcome.is_reserved());
}

#[tokio::test]
async fn test_release_returns_slot() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00"]).await;
    let slot: SlotTime = "10:00".parse().unwrap();

    calendar.reserve(&doctor, day, slot).await.unwrap();
    calendar.release(&doctor, day, slot).await.unwrap();

    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["10:00"])
    );
}

#[tokio::test]
async fn test_release_twice_equals_release_once() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00", "11:00"]).await;
    let slot: SlotTime = "10:00".parse().unwrap();

    calendar.reserve(&doctor, day, slot).await.unwrap();
    calendar.release(&doctor, day, slot).await.unwrap();
    calendar.release(&doctor, day, slot).await.unwrap();

    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["10:00", "11:00"])
    );
}

#[tokio::test]
async fn test_release_creates_day_entry_when_absent() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = InMemoryCalendar::new();

    calendar
        .release(&doctor, day, "10:00".parse().unwrap())
        .await
        .unwrap();

    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["10:00"])
    );
}

#[tokio::test]
async fn test_set_availability_replaces_existing_slots() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = seeded_calendar(&doctor, day, &["10:00", "11:00"]).await;

    calendar
        .set_availability(&doctor, day, slots(&["14:00"]))
        .await
        .unwrap();

    assert_eq!(
        calendar.availability(&doctor, day).await.unwrap(),
        slots(&["14:00"])
    );
}

#[tokio::test]
async fn test_schedule_sorted_by_date() {
    let doctor = DoctorId::new("D1");
    let calendar = InMemoryCalendar::new();
    calendar
        .set_availability(&doctor, date("2024-06-03"), slots(&["10:00"]))
        .await
        .unwrap();
    calendar
        .set_availability(&doctor, date("2024-06-01"), slots(&["09:00"]))
        .await
        .unwrap();
    calendar
        .set_availability(&doctor, date("2024-06-02"), slots(&["11:00"]))
        .await
        .unwrap();

    let schedule = calendar.schedule(&doctor).await.unwrap();

    let dates: Vec<NaiveDate> = schedule.iter().map(|day| day.date).collect();
    assert_eq!(
        dates,
        vec![date("2024-06-01"), date("2024-06-02"), date("2024-06-03")]
    );
}

#[tokio::test]
async fn test_schedule_excludes_other_doctors() {
    let calendar = InMemoryCalendar::new();
    let d1 = DoctorId::new("D1");
    let d2 = DoctorId::new("D2");
    calendar
        .set_availability(&d1, date("2024-06-01"), slots(&["10:00"]))
        .await
        .unwrap();
    calendar
        .set_availability(&d2, date("2024-06-01"), slots(&["11:00"]))
        .await
        .unwrap();

    let schedule = calendar.schedule(&d1).await.unwrap();

    assert_eq!(schedule.len(), 1);
    assert_eq!(schedule[0].available_slots, slots(&["10:00"]));
}

#[tokio::test]
async fn test_concurrent_reserves_have_one_winner() {
    let doctor = DoctorId::new("D1");
    let day = date("2024-06-01");
    let calendar = Arc::new(seeded_calendar(&doctor, day, &["10:00"]).await);
    let slot: SlotTime = "10:00".parse().unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let calendar = Arc::clone(&calendar);
        let doctor = doctor.clone();
        handles.push(tokio::spawn(async move {
            calendar.reserve(&doctor, day, slot).await.unwrap()
        }));
    }

    let mut reserved = 0;
    for handle in handles {
        if handle.await.unwrap().is_reserved() {
            reserved += 1;
        }
    }

    assert_eq!(reserved, 1);
    assert!(calendar.availability(&doctor, day).await.unwrap().is_empty());
}
