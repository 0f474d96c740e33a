//! Week view-model: the people a store can schedule, laid out against the
//! seven days of a week with their shifts and submitted availability.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::{Availability, AvailabilityStatus};
use crate::clock::TimeRange;
use crate::membership::{ApprovalStatus, StoreRole};
use crate::week::{self, DAYS_PER_WEEK};

/// A `store_managers` row joined with the user's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerRow {
    pub user_id: String,
    pub display_name: String,
    pub status: ApprovalStatus,
    pub is_primary: bool,
}

/// A `store_employees` row joined with the user's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRow {
    pub user_id: String,
    pub display_name: String,
    pub status: ApprovalStatus,
}

/// Someone who can be put on the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub user_id: String,
    pub display_name: String,
    pub role: StoreRole,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRecord {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub range: TimeRange,
    pub notes: Option<String>,
}

impl RosterMember {
    /// Merge manager and employee rows into one roster.
    ///
    /// Only approved rows count. A person approved in both tables appears once,
    /// as a manager. Managers sort first (primary leading), then by name.
    pub fn from_memberships(managers: &[ManagerRow], employees: &[EmployeeRow]) -> Vec<Self> {
        let mut by_user: BTreeMap<&str, Self> = BTreeMap::new();

        for e in employees
            .iter()
            .filter(|e| e.status == ApprovalStatus::Approved)
        {
            by_user.insert(
                &e.user_id,
                Self {
                    user_id: e.user_id.clone(),
                    display_name: e.display_name.clone(),
                    role: StoreRole::Employee,
                    is_primary: false,
                },
            );
        }

        for m in managers
            .iter()
            .filter(|m| m.status == ApprovalStatus::Approved)
        {
            by_user.insert(
                &m.user_id,
                Self {
                    user_id: m.user_id.clone(),
                    display_name: m.display_name.clone(),
                    role: StoreRole::Manager,
                    is_primary: m.is_primary,
                },
            );
        }

        let mut roster: Vec<Self> = by_user.into_values().collect();
        roster.sort_by(|a, b| {
            role_rank(a)
                .cmp(&role_rank(b))
                .then_with(|| {
                    a.display_name
                        .to_lowercase()
                        .cmp(&b.display_name.to_lowercase())
                })
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        roster
    }
}

fn role_rank(m: &RosterMember) -> u8 {
    match (m.role, m.is_primary) {
        (StoreRole::Manager, true) => 0,
        (StoreRole::Manager, false) => 1,
        (StoreRole::Employee, _) => 2,
    }
}

pub fn can_be_scheduled(roster: &[RosterMember], user_id: &str) -> bool {
    roster.iter().any(|m| m.user_id == user_id)
}

// ── View types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub shift_id: String,
    #[serde(flatten)]
    pub range: TimeRange,
    pub notes: Option<String>,
    /// The person's availability for the day does not allow this shift.
    pub outside_availability: bool,
    /// Another shift of the same person on the same day overlaps this one.
    pub overlaps: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityMark {
    pub status: AvailabilityStatus,
    pub window: Option<TimeRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub shifts: Vec<ShiftSlot>,
    pub availability: Option<AvailabilityMark>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub user_id: String,
    pub display_name: String,
    pub role: StoreRole,
    pub is_primary: bool,
    pub days: Vec<DayCell>,
    pub shift_count: usize,
    pub total_minutes: i64,
}

/// A shift whose assignee is no longer on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedShift {
    pub user_id: String,
    pub date: NaiveDate,
    pub slot: ShiftSlot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub shift_count: usize,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekView {
    pub week_start: NaiveDate,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<RosterRow>,
    pub unassigned: Vec<UnassignedShift>,
    pub day_totals: Vec<DayTotal>,
    pub total_minutes: i64,
}

pub struct WeekViewInput<'a> {
    pub week_start: NaiveDate,
    pub managers: &'a [ManagerRow],
    pub employees: &'a [EmployeeRow],
    pub shifts: &'a [ShiftRecord],
    pub availability: &'a [Availability],
}

pub fn build_week_view(input: WeekViewInput<'_>) -> WeekView {
    let dates = week::week_dates(input.week_start);
    let roster = RosterMember::from_memberships(input.managers, input.employees);

    let row_index: HashMap<&str, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, m)| (m.user_id.as_str(), i))
        .collect();

    let availability: HashMap<(&str, NaiveDate), &Availability> = input
        .availability
        .iter()
        .filter(|a| week::week_contains(input.week_start, a.date))
        .map(|a| ((a.user_id.as_str(), a.date), a))
        .collect();

    let mut rows: Vec<RosterRow> = roster
        .iter()
        .map(|m| RosterRow {
            user_id: m.user_id.clone(),
            display_name: m.display_name.clone(),
            role: m.role,
            is_primary: m.is_primary,
            days: dates
                .iter()
                .map(|&date| DayCell {
                    date,
                    shifts: Vec::new(),
                    availability: availability.get(&(m.user_id.as_str(), date)).map(|a| {
                        AvailabilityMark {
                            status: a.status,
                            window: a.window,
                        }
                    }),
                })
                .collect(),
            shift_count: 0,
            total_minutes: 0,
        })
        .collect();

    // Group the week's shifts per (person, day), ordered by start time.
    let mut groups: BTreeMap<(&str, NaiveDate), Vec<&ShiftRecord>> = BTreeMap::new();
    for shift in input
        .shifts
        .iter()
        .filter(|s| week::week_contains(input.week_start, s.date))
    {
        groups
            .entry((shift.user_id.as_str(), shift.date))
            .or_default()
            .push(shift);
    }

    let mut unassigned = Vec::new();
    let mut day_totals: Vec<DayTotal> = dates
        .iter()
        .map(|&date| DayTotal {
            date,
            shift_count: 0,
            minutes: 0,
        })
        .collect();

    for ((user_id, date), mut shifts) in groups {
        shifts.sort_by(|a, b| a.range.start.cmp(&b.range.start).then(a.id.cmp(&b.id)));
        let day_avail = availability.get(&(user_id, date)).copied();
        let day_idx = (date - input.week_start).num_days() as usize;

        for (i, shift) in shifts.iter().enumerate() {
            let overlaps = shifts
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && other.range.overlaps(&shift.range));
            let slot = ShiftSlot {
                shift_id: shift.id.clone(),
                range: shift.range,
                notes: shift.notes.clone(),
                outside_availability: day_avail.is_some_and(|a| !a.permits(&shift.range)),
                overlaps,
            };

            if day_idx < DAYS_PER_WEEK {
                day_totals[day_idx].shift_count += 1;
                day_totals[day_idx].minutes += shift.range.minutes();
            }

            match row_index.get(user_id) {
                Some(&row) if day_idx < DAYS_PER_WEEK => {
                    let r = &mut rows[row];
                    r.shift_count += 1;
                    r.total_minutes += shift.range.minutes();
                    r.days[day_idx].shifts.push(slot);
                }
                _ => unassigned.push(UnassignedShift {
                    user_id: user_id.to_string(),
                    date,
                    slot,
                }),
            }
        }
    }

    let total_minutes = day_totals.iter().map(|d| d.minutes).sum();

    WeekView {
        week_start: input.week_start,
        dates: dates.to_vec(),
        rows,
        unassigned,
        day_totals,
        total_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn roster_fixture() -> (Vec<ManagerRow>, Vec<EmployeeRow>) {
        let managers = vec![
            testing::manager_row("m-primary", "Zoe", ApprovalStatus::Approved, true),
            testing::manager_row("m-pending", "Pat", ApprovalStatus::Pending, false),
            testing::manager_row("both", "Bea", ApprovalStatus::Approved, false),
            testing::manager_row("m-rejected", "Rex", ApprovalStatus::Rejected, false),
        ];
        let employees = vec![
            testing::employee_row("e-anna", "anna"),
            testing::employee_row("both", "Bea"),
            testing::employee_row("m-rejected", "Rex"),
            testing::employee_row("e-carl", "Carl"),
        ];
        (managers, employees)
    }

    #[test]
    fn roster_reconciles_roles_and_status() {
        let (managers, employees) = roster_fixture();
        let roster = RosterMember::from_memberships(&managers, &employees);
        let ids: Vec<&str> = roster.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, ["m-primary", "both", "e-anna", "e-carl", "m-rejected"]);

        let bea = &roster[1];
        assert_eq!(bea.role, StoreRole::Manager);
        // Rejected as manager, still an approved employee.
        assert_eq!(roster[4].role, StoreRole::Employee);
        assert!(!can_be_scheduled(&roster, "m-pending"));
        assert!(can_be_scheduled(&roster, "e-carl"));
    }

    #[test]
    fn week_view_places_shifts_by_day() {
        let (managers, employees) = roster_fixture();
        let shifts = vec![
            testing::shift("s2", "e-anna", d(13), "13:00", "17:00"),
            testing::shift("s1", "e-anna", d(13), "08:00", "12:00"),
            testing::shift("s3", "m-primary", d(18), "10:00", "18:00"),
            // Outside the week.
            testing::shift("s4", "e-anna", d(19), "08:00", "12:00"),
        ];

        let view = build_week_view(WeekViewInput {
            week_start: d(12),
            managers: &managers,
            employees: &employees,
            shifts: &shifts,
            availability: &[],
        });

        assert_eq!(view.dates.len(), 7);
        assert_eq!(view.rows.len(), 5);

        let anna = view.rows.iter().find(|r| r.user_id == "e-anna").unwrap();
        let tuesday = &anna.days[1];
        assert_eq!(tuesday.date, d(13));
        let order: Vec<&str> = tuesday.shifts.iter().map(|s| s.shift_id.as_str()).collect();
        assert_eq!(order, ["s1", "s2"]);
        assert_eq!(anna.shift_count, 2);
        assert_eq!(anna.total_minutes, 8 * 60);

        let zoe = &view.rows[0];
        assert_eq!(zoe.days[6].shifts.len(), 1);

        assert_eq!(view.day_totals[1].shift_count, 2);
        assert_eq!(view.day_totals[6].minutes, 8 * 60);
        assert_eq!(view.total_minutes, 16 * 60);
        assert!(view.unassigned.is_empty());
    }

    #[test]
    fn shifts_of_departed_people_are_unassigned() {
        let (managers, employees) = roster_fixture();
        let shifts = vec![
            testing::shift("gone", "former", d(14), "09:00", "12:00"),
            testing::shift("pend", "m-pending", d(14), "09:00", "12:00"),
        ];
        let view = build_week_view(WeekViewInput {
            week_start: d(12),
            managers: &managers,
            employees: &employees,
            shifts: &shifts,
            availability: &[],
        });
        assert_eq!(view.unassigned.len(), 2);
        assert_eq!(view.day_totals[2].shift_count, 2);
        assert!(view.rows.iter().all(|r| r.shift_count == 0));
    }

    #[test]
    fn flags_availability_conflicts_and_overlaps() {
        let (managers, employees) = roster_fixture();
        let shifts = vec![
            testing::shift("a", "e-carl", d(15), "09:00", "13:00"),
            testing::shift("b", "e-carl", d(15), "12:00", "16:00"),
            testing::shift("c", "e-anna", d(15), "09:00", "11:00"),
            testing::shift("x", "e-anna", d(16), "09:00", "11:00"),
        ];
        let availability = vec![
            testing::available("e-carl", d(15), Some(("08:00", "14:00"))),
            testing::unavailable("e-anna", d(16)),
            testing::available("e-anna", d(15), None),
            // Not on the roster, ignored.
            testing::unavailable("stranger", d(15)),
        ];

        let view = build_week_view(WeekViewInput {
            week_start: d(12),
            managers: &managers,
            employees: &employees,
            shifts: &shifts,
            availability: &availability,
        });

        let carl = view.rows.iter().find(|r| r.user_id == "e-carl").unwrap();
        let thursday = &carl.days[3];
        assert_eq!(thursday.shifts.len(), 2);
        assert!(thursday.shifts.iter().all(|s| s.overlaps));
        assert!(!thursday.shifts[0].outside_availability);
        assert!(thursday.shifts[1].outside_availability);
        assert_eq!(
            thursday.availability.as_ref().map(|a| a.status),
            Some(AvailabilityStatus::Available)
        );

        let anna = view.rows.iter().find(|r| r.user_id == "e-anna").unwrap();
        assert!(!anna.days[3].shifts[0].outside_availability);
        assert!(!anna.days[3].shifts[0].overlaps);
        assert!(anna.days[4].shifts[0].outside_availability);
        assert!(carl.days[4].availability.is_none());
    }

    #[test]
    fn empty_week_still_has_seven_days() {
        let view = build_week_view(WeekViewInput {
            week_start: d(12),
            managers: &[],
            employees: &[],
            shifts: &[],
            availability: &[],
        });
        assert_eq!(view.dates.len(), 7);
        assert_eq!(view.day_totals.len(), 7);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_minutes, 0);
    }

    #[test]
    fn slot_serializes_flat_times() {
        let slot = ShiftSlot {
            shift_id: "s".into(),
            range: TimeRange::parse("09:00", "10:30").unwrap(),
            notes: None,
            outside_availability: false,
            overlaps: false,
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["start"], "09:00");
        assert_eq!(json["end"], "10:30");
    }
}
