use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// Catalog tables are seeded outside this service and only read here.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub duration_weeks: i32,
    pub price: i32,
}

/// Program as listed on the website, with a display-ready duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub duration: String,
    pub price: i32,
}

impl From<Program> for ProgramView {
    fn from(program: Program) -> Self {
        Self {
            id: program.id,
            name: program.name,
            description: program.description,
            duration: format!("{} weeks", program.duration_weeks),
            price: program.price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: i32,
    pub name: String,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    pub id: i32,
    pub plan_name: String,
    pub price: i32,
    pub duration_months: i32,
    pub is_popular: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_view_formats_duration() {
        let view = ProgramView::from(Program {
            id: 3,
            name: "Cardio Training".to_string(),
            description: None,
            duration_weeks: 8,
            price: 4500,
        });
        assert_eq!(view.duration, "8 weeks");
        assert_eq!(view.name, "Cardio Training");
    }
}
