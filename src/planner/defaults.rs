//! Built-in areas, default vision board and sample data

use super::ids::{IdGenerator, IdKind};
use super::models::*;
use chrono::{Datelike, Months, NaiveDate};

const DEFAULT_YEAR: &str = "2025";
const DEFAULT_THEME_ID: &str = "ocean";

const DEFAULT_IMAGES: [&str; 4] = [
    "https://images.unsplash.com/photo-1557683316-973673baf926?q=80&w=600&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1557682250-33bd709cbe85?q=80&w=300&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1557682224-5b8590cd9ec5?q=80&w=300&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1557682260-96773eb01377?q=80&w=300&auto=format&fit=crop",
];

/// (id, name, icon, color)
const AREA_TABLE: [(&str, &str, &str, &str); 8] = [
    ("1", "Career", "briefcase", "#2C5282"),
    ("2", "Finance", "dollar-sign", "#3B76B8"),
    ("3", "Health", "heart", "#4299E1"),
    ("4", "Relationships", "users", "#63B3ED"),
    ("5", "Personal Growth", "book", "#4A5568"),
    ("6", "Learning", "graduation-cap", "#805AD5"),
    ("7", "Recreation", "music", "#90CDF4"),
    ("8", "Spirituality", "sun", "#A0AEC0"),
];

impl Default for VisionBoardData {
    fn default() -> Self {
        Self {
            year: DEFAULT_YEAR.to_string(),
            theme: String::new(),
            vision_statement: String::new(),
            images: DEFAULT_IMAGES.iter().map(|s| s.to_string()).collect(),
            theme_id: DEFAULT_THEME_ID.to_string(),
            custom_colors: None,
        }
    }
}

/// The eight built-in life areas
pub fn areas() -> Vec<Area> {
    AREA_TABLE
        .iter()
        .map(|(id, name, icon, color)| Area {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            vision: String::new(),
            current_status: String::new(),
            rating: 5,
            color: color.to_string(),
        })
        .collect()
}

/// Look up a built-in area by id
pub fn area(area_id: &str) -> Option<Area> {
    areas().into_iter().find(|a| a.id == area_id)
}

/// Goals and tasks produced by [`sample_data`]
#[derive(Debug, Clone, Default)]
pub struct SampleData {
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
}

/// Date in `month` of `year`, clamped to the last day of the month
fn day_of(year: i32, month: u32, day: u32) -> NaiveDate {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .unwrap_or(NaiveDate::MIN)
}

struct SampleGoal {
    area_id: &'static str,
    title: &'static str,
    description: &'static str,
    why_important: &'static str,
    success_criteria: &'static str,
    is_completed: bool,
    /// (description, day of current month, priority, done)
    steps: &'static [(&'static str, u32, Priority, bool)],
}

const SAMPLE_GOALS: [SampleGoal; 4] = [
    SampleGoal {
        area_id: "1",
        title: "Get promoted to Senior Manager",
        description: "Reach a senior management position",
        why_important: "Prove my ability and grow my income",
        success_criteria: "Promotion letter approved",
        is_completed: false,
        steps: &[
            ("Finish the PMP certification", 15, Priority::High, true),
            ("Lead the Q3 project to success", 25, Priority::High, false),
            ("Mentor two new hires", 20, Priority::Medium, false),
        ],
    },
    SampleGoal {
        area_id: "2",
        title: "Build an emergency fund",
        description: "Save a safety cushion",
        why_important: "Peace of mind against surprises",
        success_criteria: "Savings account reaches the target",
        is_completed: false,
        steps: &[
            ("Set aside 30% of this month's salary", 5, Priority::High, true),
            ("Cut back on eating out", 30, Priority::Medium, false),
        ],
    },
    SampleGoal {
        area_id: "3",
        title: "Run a half marathon (21km)",
        description: "Improve fitness",
        why_important: "Stay healthy and strong",
        success_criteria: "Finish 21km in under 2h30",
        is_completed: true,
        steps: &[
            ("Run 5km every other morning", 30, Priority::Medium, true),
            ("Weekend long run of 15km", 28, Priority::High, true),
        ],
    },
    SampleGoal {
        area_id: "5",
        title: "Read 10 business books",
        description: "Sharpen my thinking",
        why_important: "Broaden my knowledge",
        success_criteria: "A written review for each book",
        is_completed: false,
        steps: &[("Finish \"Zero to One\"", 10, Priority::Low, false)],
    },
];

/// (goal index or none, area, title, status, day, frequency, discipline)
type SampleTask = (
    Option<usize>,
    &'static str,
    &'static str,
    TaskStatus,
    u32,
    Frequency,
    Discipline,
);

const SAMPLE_TASKS: [SampleTask; 6] = [
    (Some(0), "1", "Send the weekly report", TaskStatus::Pending, 12, Frequency::Weekly, Discipline::Pending),
    (None, "3", "Drink 2 litres of water", TaskStatus::Completed, 12, Frequency::Daily, Discipline::OnTime),
    (Some(1), "2", "Transfer savings for the month", TaskStatus::Completed, 5, Frequency::Monthly, Discipline::OnTime),
    (None, "4", "Call my parents", TaskStatus::Pending, 13, Frequency::Weekly, Discipline::Pending),
    (Some(3), "5", "Read 30 minutes before bed", TaskStatus::Missed, 11, Frequency::Daily, Discipline::Late),
    (None, "7", "Movie night at the weekend", TaskStatus::Scheduled, 14, Frequency::Weekly, Discipline::Pending),
];

/// Example goals and tasks dated around `today`'s month
///
/// Every sample step gets its paired task, so appending the result to a
/// consistent store keeps it consistent.
pub fn sample_data(today: NaiveDate, ids: &dyn IdGenerator) -> SampleData {
    let (year, month) = (today.year(), today.month());
    let next_month = today
        .with_day(1)
        .and_then(|d| d.checked_add_months(Months::new(1)))
        .unwrap_or(today);
    let goal_deadlines = [
        day_of(year, month, 28),
        day_of(next_month.year(), next_month.month(), 30),
        day_of(year, month, 30),
        day_of(year, 12, 31),
    ];

    let mut data = SampleData::default();

    for (sample, deadline) in SAMPLE_GOALS.iter().zip(goal_deadlines) {
        let steps = sample
            .steps
            .iter()
            .map(|(description, day, priority, done)| Step {
                id: ids.next_id(IdKind::Step),
                description: description.to_string(),
                deadline: day_of(year, month, *day),
                priority: *priority,
                is_completed: *done,
            })
            .collect();

        let goal = Goal {
            id: ids.next_id(IdKind::Goal),
            area_id: sample.area_id.to_string(),
            title: sample.title.to_string(),
            description: sample.description.to_string(),
            deadline,
            is_completed: sample.is_completed,
            why_important: sample.why_important.to_string(),
            success_criteria: sample.success_criteria.to_string(),
            frequency: Frequency::OneTime,
            steps,
        };

        data.tasks
            .extend(goal.steps.iter().map(|step| Task::for_step(&goal, step)));
        data.goals.push(goal);
    }

    for (goal_index, area_id, title, status, day, frequency, discipline) in SAMPLE_TASKS {
        let goal_id = goal_index
            .and_then(|i| data.goals.get(i))
            .map(|g| g.id.clone())
            .unwrap_or_default();
        data.tasks.push(Task {
            id: ids.next_id(IdKind::Task),
            goal_id,
            area_id: area_id.to_string(),
            title: title.to_string(),
            status,
            deadline: day_of(year, month, day),
            frequency,
            completed_date: None,
            discipline,
        });
    }

    data
}
