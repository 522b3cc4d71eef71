use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use tracing::warn;

use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Intelligence,
    Physical,
    Social,
    Discipline,
    Determination,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Intelligence,
        Category::Physical,
        Category::Social,
        Category::Discipline,
        Category::Determination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Intelligence => "Intelligence",
            Category::Physical => "Physical",
            Category::Social => "Social",
            Category::Discipline => "Discipline",
            Category::Determination => "Determination",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Category, String> {
        Category::ALL
            .iter()
            .find(|category| category.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Category> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// League tiers in promotion order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum League {
    #[default]
    Normal,
    Novice,
    Advanced,
    Master,
    Legendary,
    #[serde(rename = "Discipline-Star")]
    DisciplineStar,
}

impl League {
    pub fn as_str(&self) -> &'static str {
        match self {
            League::Normal => "Normal",
            League::Novice => "Novice",
            League::Advanced => "Advanced",
            League::Master => "Master",
            League::Legendary => "Legendary",
            League::DisciplineStar => "Discipline-Star",
        }
    }

    pub fn parse(s: &str) -> Option<League> {
        match s {
            "Normal" => Some(League::Normal),
            "Novice" => Some(League::Novice),
            "Advanced" => Some(League::Advanced),
            "Master" => Some(League::Master),
            "Legendary" => Some(League::Legendary),
            "Discipline-Star" => Some(League::DisciplineStar),
            _ => None,
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for League {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

// An unrecognised stored tier is read back as Normal.
impl FromSql for League {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<League> {
        let s = value.as_str()?;

        Ok(League::parse(s).unwrap_or_else(|| {
            warn!("unknown league {:?} in storage, treating as Normal", s);
            League::Normal
        }))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    #[serde(rename = "Bronze Trophy")]
    BronzeTrophy,
    #[serde(rename = "Silver Trophy")]
    SilverTrophy,
    #[serde(rename = "Golden Trophy")]
    GoldenTrophy,
    #[serde(rename = "Diamond Trophy")]
    DiamondTrophy,
    #[serde(rename = "Black Trophy")]
    BlackTrophy,
    Beginner,
    Disciplined,
    Master,
}

impl Badge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Badge::BronzeTrophy => "Bronze Trophy",
            Badge::SilverTrophy => "Silver Trophy",
            Badge::GoldenTrophy => "Golden Trophy",
            Badge::DiamondTrophy => "Diamond Trophy",
            Badge::BlackTrophy => "Black Trophy",
            Badge::Beginner => "Beginner",
            Badge::Disciplined => "Disciplined",
            Badge::Master => "Master",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point balance per category. Serialized as a map keyed by category name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct CategoryPoints {
    #[serde(rename = "Intelligence")]
    pub intelligence: f64,
    #[serde(rename = "Physical")]
    pub physical: f64,
    #[serde(rename = "Social")]
    pub social: f64,
    #[serde(rename = "Discipline")]
    pub discipline: f64,
    #[serde(rename = "Determination")]
    pub determination: f64,
}

impl CategoryPoints {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Intelligence => self.intelligence,
            Category::Physical => self.physical,
            Category::Social => self.social,
            Category::Discipline => self.discipline,
            Category::Determination => self.determination,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Intelligence => &mut self.intelligence,
            Category::Physical => &mut self.physical,
            Category::Social => &mut self.social,
            Category::Discipline => &mut self.discipline,
            Category::Determination => &mut self.determination,
        }
    }

    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Mean balance across the five categories, rounded to two decimals.
    pub fn overall_score(&self) -> f64 {
        round_to_hundredths(self.total() / Category::ALL.len() as f64)
    }
}

pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProgressionState {
    pub league: League,
    pub current_streak: u32,
    pub best_streak: u32,
    #[serde(rename = "total_points")]
    pub points: CategoryPoints,
    pub badges: Vec<Badge>,
    pub last_task_completion: Option<DateTime<Utc>>,
    pub last_point_deduction: Option<DateTime<Utc>>,
}

impl ProgressionState {
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Returns false when the badge was already held.
    pub fn award_badge(&mut self, badge: Badge) -> bool {
        if self.has_badge(badge) {
            return false;
        }

        self.badges.push(badge);
        true
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub completed_categories: Vec<Category>,
    pub points_earned: CategoryPoints,
    pub streak_day: bool,
}

impl DailyProgress {
    pub fn new(date: NaiveDate) -> DailyProgress {
        DailyProgress {
            date,
            completed_categories: vec![],
            points_earned: CategoryPoints::default(),
            streak_day: false,
        }
    }

    pub fn all_categories_completed(&self) -> bool {
        self.completed_categories.len() == Category::ALL.len()
    }

    pub fn record(&mut self, category: Category, points: f64) {
        if !self.completed_categories.contains(&category) {
            self.completed_categories.push(category);
        }
        *self.points_earned.get_mut(category) += points;
        self.streak_day = self.all_categories_completed();
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryScore {
    pub category: Category,
    pub points: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RadarStats {
    pub categories: Vec<CategoryScore>,
    pub overall_score: f64,
}

impl From<&CategoryPoints> for RadarStats {
    fn from(points: &CategoryPoints) -> RadarStats {
        RadarStats {
            categories: Category::ALL
                .iter()
                .map(|category| CategoryScore {
                    category: *category,
                    points: points.get(*category),
                })
                .collect(),
            overall_score: points.overall_score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_in_normal_league() {
        assert_eq!(League::default(), League::Normal);
        assert_eq!(ProgressionState::default().league, League::Normal);
    }

    #[test]
    fn overall_score_is_rounded_mean() {
        let points = CategoryPoints {
            intelligence: 10.0,
            physical: 3.0,
            social: 0.5,
            discipline: 0.0,
            determination: 1.0,
        };

        assert_eq!(points.total(), 14.5);
        assert_eq!(points.overall_score(), 2.9);

        let thirds = CategoryPoints {
            intelligence: 1.0 / 3.0,
            ..CategoryPoints::default()
        };
        assert_eq!(thirds.overall_score(), 0.07);
    }

    #[test]
    fn daily_progress_ignores_repeated_categories() {
        let mut day = DailyProgress::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        day.record(Category::Social, 2.0);
        day.record(Category::Social, 2.0);

        assert_eq!(day.completed_categories, vec![Category::Social]);
        assert_eq!(day.points_earned.social, 4.0);
        assert!(!day.streak_day);

        for category in Category::ALL {
            day.record(category, 0.0);
        }
        assert!(day.all_categories_completed());
        assert!(day.streak_day);
    }

    #[test]
    fn badges_are_awarded_once() {
        let mut state = ProgressionState::default();

        assert!(state.award_badge(Badge::Beginner));
        assert!(!state.award_badge(Badge::Beginner));
        assert_eq!(state.badges, vec![Badge::Beginner]);
    }

    #[test]
    fn wire_names_match_display_names() {
        assert_eq!(
            serde_json::to_string(&League::DisciplineStar).unwrap(),
            "\"Discipline-Star\""
        );
        assert_eq!(
            serde_json::to_string(&Badge::BronzeTrophy).unwrap(),
            "\"Bronze Trophy\""
        );
        assert_eq!("Determination".parse::<Category>(), Ok(Category::Determination));
        assert!("Cooking".parse::<Category>().is_err());
        assert_eq!(League::parse("Platinum"), None);
    }

    #[test]
    fn radar_lists_every_category_in_order() {
        let points = CategoryPoints {
            physical: 5.0,
            ..CategoryPoints::default()
        };
        let radar = RadarStats::from(&points);

        assert_eq!(
            radar.categories.iter().map(|c| c.category).collect::<Vec<_>>(),
            Category::ALL.to_vec()
        );
        assert_eq!(radar.categories[1].points, 5.0);
        assert_eq!(radar.overall_score, 1.0);
    }
}
