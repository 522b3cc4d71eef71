use super::data::{Badge, League};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    /// Points earned per completed task.
    pub points: f64,
    /// Points lost per category when a deduction is applied.
    pub decay: f64,
}

impl League {
    pub fn multipliers(&self) -> Multipliers {
        let (points, decay) = match self {
            League::Normal => (2.0, 4.0),
            League::Novice => (1.5, 4.0),
            League::Advanced => (1.0, 4.0),
            League::Master => (1.0, 3.0),
            League::Legendary => (0.5, 1.5),
            League::DisciplineStar => (0.1, 0.4),
        };

        Multipliers { points, decay }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Promotion {
    pub streak: u32,
    pub from: League,
    pub to: League,
    pub trophy: Badge,
}

pub const PROMOTIONS: [Promotion; 5] = [
    Promotion {
        streak: 25,
        from: League::Normal,
        to: League::Novice,
        trophy: Badge::BronzeTrophy,
    },
    Promotion {
        streak: 50,
        from: League::Novice,
        to: League::Advanced,
        trophy: Badge::SilverTrophy,
    },
    Promotion {
        streak: 100,
        from: League::Advanced,
        to: League::Master,
        trophy: Badge::GoldenTrophy,
    },
    Promotion {
        streak: 250,
        from: League::Master,
        to: League::Legendary,
        trophy: Badge::DiamondTrophy,
    },
    Promotion {
        streak: 500,
        from: League::Legendary,
        to: League::DisciplineStar,
        trophy: Badge::BlackTrophy,
    },
];

pub const STREAK_BADGES: [(u32, Badge); 3] = [
    (3, Badge::Beginner),
    (7, Badge::Disciplined),
    (30, Badge::Master),
];

/// Promotion only fires on the exact milestone while sitting in the preceding league.
pub fn promotion_for(streak: u32, league: League) -> Option<&'static Promotion> {
    PROMOTIONS
        .iter()
        .find(|promotion| promotion.streak == streak && promotion.from == league)
}

pub fn streak_badge_for(streak: u32) -> Option<Badge> {
    STREAK_BADGES
        .iter()
        .find(|(milestone, _)| *milestone == streak)
        .map(|(_, badge)| *badge)
}
