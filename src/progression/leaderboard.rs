use serde::Serialize;

use std::cmp::Ordering;

use super::data::{CategoryPoints, League};
use crate::users::data::Language;

pub const LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Contender {
    pub username: String,
    pub language: Language,
    pub league: League,
    pub current_streak: u32,
    pub points: CategoryPoints,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub username: String,
    pub overall_score: f64,
    pub league: League,
    pub current_streak: u32,
    pub rank: usize,
}

/// Ranks contenders by overall score, highest first.
///
/// Equal scores keep their input order and share a rank: one more than the
/// number of contenders scoring strictly higher. At most `LEADERBOARD_SIZE`
/// entries are returned.
pub fn rank(contenders: &[Contender], language: Option<Language>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = contenders
        .iter()
        .filter(|c| language.map_or(true, |l| c.language == l))
        .map(|c| LeaderboardEntry {
            username: c.username.clone(),
            overall_score: c.points.overall_score(),
            league: c.league,
            current_streak: c.current_streak,
            rank: 0,
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
    });
    entries.truncate(LEADERBOARD_SIZE);

    let mut previous: Option<(f64, usize)> = None;
    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = match previous {
            Some((score, rank)) if score == entry.overall_score => rank,
            _ => position + 1,
        };
        previous = Some((entry.overall_score, entry.rank));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contender(username: &str, score: f64, language: Language) -> Contender {
        Contender {
            username: username.to_string(),
            language,
            league: League::Normal,
            current_streak: 0,
            points: CategoryPoints {
                intelligence: score * 5.0,
                ..CategoryPoints::default()
            },
        }
    }

    #[test]
    fn empty_input_gives_empty_board() {
        assert!(rank(&[], None).is_empty());
    }

    #[test]
    fn ties_share_rank_and_keep_input_order() {
        let contenders = vec![
            contender("a", 10.0, Language::English),
            contender("b", 30.0, Language::English),
            contender("c", 30.0, Language::English),
            contender("d", 5.0, Language::English),
        ];

        let board = rank(&contenders, None);

        let order: Vec<&str> = board.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);

        let rank_of = |name: &str| board.iter().find(|e| e.username == name).unwrap().rank;
        assert_eq!(
            ["a", "b", "c", "d"].map(rank_of),
            [3, 1, 1, 4],
            "ranks in input order"
        );
    }

    #[test]
    fn scores_are_rounded_means() {
        let mut odd = contender("odd", 0.0, Language::English);
        odd.points = CategoryPoints {
            intelligence: 1.0,
            physical: 1.0,
            social: 1.0 / 3.0,
            discipline: 0.0,
            determination: 0.0,
        };

        let board = rank(&[odd], None);
        assert_eq!(board[0].overall_score, 0.47);
        assert_eq!(board[0].rank, 1);
    }

    #[test]
    fn language_filter_applies_before_ranking() {
        let contenders = vec![
            contender("en-top", 50.0, Language::English),
            contender("fr-low", 1.0, Language::French),
            contender("fr-top", 9.0, Language::French),
        ];

        let board = rank(&contenders, Some(Language::French));

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username, "fr-top");
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].rank, 2);
        assert!(rank(&contenders, Some(Language::Japanese)).is_empty());
    }

    #[test]
    fn board_is_capped() {
        let contenders: Vec<Contender> = (0..150)
            .map(|i| contender(&format!("user{}", i), i as f64, Language::German))
            .collect();

        let board = rank(&contenders, None);

        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert_eq!(board[0].username, "user149");
        assert_eq!(board[99].rank, 100);
    }
}
