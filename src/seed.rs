use chrono::{DateTime, TimeZone, Utc};

use crate::models::{BoardState, Section, Settings, TeamMember, Todo, TodoStatus};

pub fn default_sections() -> Vec<Section> {
    [
        ("finance", "Finance", "#4CAF50"),
        ("it", "IT", "#2196F3"),
        ("management", "Management", "#FF9800"),
        ("legal", "Legal Approvals", "#9C27B0"),
        ("designing", "Designing", "#E91E63"),
    ]
    .into_iter()
    .map(|(id, name, color)| Section {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        is_default: true,
    })
    .collect()
}

fn ts(day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, min, 0)
        .single()
        .unwrap_or_default()
}

/// First-run document: default sections plus a few sample cards and members.
pub fn sample_board() -> BoardState {
    let todo = |id: &str, title: &str, desc: &str, section: &str, status, who: &str, created, modified| Todo {
        id: id.to_string(),
        section_id: section.to_string(),
        title: title.to_string(),
        description: Some(desc.to_string()),
        status,
        assigned_to: Some(who.to_string()),
        created_at: created,
        modified_at: modified,
    };
    let member = |id: &str, name: &str, email: &str, online| TeamMember {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        online,
    };

    BoardState {
        sections: default_sections(),
        todos: vec![
            todo(
                "todo1",
                "Review Q4 Budget",
                "Analyze quarterly expenses and prepare budget report",
                "finance",
                TodoStatus::Todo,
                "john@example.com",
                ts(15, 10, 0),
                ts(15, 10, 0),
            ),
            todo(
                "todo2",
                "Server Maintenance",
                "Schedule monthly server updates and security patches",
                "it",
                TodoStatus::InProgress,
                "sarah@example.com",
                ts(14, 14, 30),
                ts(16, 9, 15),
            ),
            todo(
                "todo3",
                "Team Performance Review",
                "Conduct quarterly performance evaluations",
                "management",
                TodoStatus::Completed,
                "mike@example.com",
                ts(10, 11, 0),
                ts(18, 16, 45),
            ),
        ],
        team_members: vec![
            member("1", "John Doe", "john@example.com", true),
            member("2", "Sarah Smith", "sarah@example.com", false),
            member("3", "Mike Johnson", "mike@example.com", true),
        ],
        comments: Vec::new(),
        settings: Settings::default(),
    }
}

/// What "clear all data" leaves behind.
pub fn empty_board(settings: Settings) -> BoardState {
    BoardState {
        sections: default_sections(),
        settings,
        ..BoardState::default()
    }
}
