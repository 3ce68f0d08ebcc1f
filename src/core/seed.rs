//! Synthetic workshop data for rehearsals.
//!
//! The seeder is just another client: it registers teams by name and plays
//! every game through `ProgressLogic::start` / `submit`, so it is subject to
//! exactly the same rules (registration policy, duplicate names, validation).

use crate::core::progress::ProgressLogic;
use crate::core::roster::RosterEntry;
use crate::core::scoring::{MEMORY_ANSWER_KEY, MEMORY_OPTIONS, PERIMETER_GROUND_TRUTH};
use crate::core::session::SessionLogic;
use crate::core::team::{Members, RegistrationPolicy, TeamLogic};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::{GameKind, Team, Treatment};
use crate::models::payload::{
    ClinicalPayload, FeedbackPayload, GamePayload, HeightsPayload, MemoryAnswer, MemoryPayload,
    PerimeterPayload, TechCheckPayload,
};
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

/// Session the seeder is allowed to fill.
pub const SEED_SESSION: &str = "test_session";

/// Same seed as the workshop notebook, so rehearsal data is reproducible.
pub const DEFAULT_SEED: u64 = 1887;

const PARENT_NAMES: [&str; 6] = ["Andrea", "Beat", "Carla", "Daniel", "Eva", "Franz"];
const CHILD_NAMES: [&str; 6] = ["Anna", "Ben", "Clara", "David", "Elin", "Felix"];
const FAVORITES: [&str; 4] = [
    "Game 1: Heights",
    "Game 2: Perimeter",
    "Game 3: Memory",
    "Game 4: Clinical Trial",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub teams: usize,
    pub skipped: usize,
    pub submissions: usize,
}

pub struct SeedLogic;

impl SeedLogic {
    pub fn run(
        pool: &mut DbPool,
        policy: RegistrationPolicy,
        roster: &[RosterEntry],
        n_teams: usize,
        seed: u64,
    ) -> AppResult<SeedReport> {
        let active = SessionLogic::active(pool)?;
        if active.id != SEED_SESSION {
            return Err(AppError::SeedRefused(format!(
                "active session is '{}', switch to '{SEED_SESSION}' first",
                active.id
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let names = pick_team_names(&mut rng, roster, n_teams);
        let mut report = SeedReport::default();

        for name in names {
            let members = Members::new(
                PARENT_NAMES.choose(&mut rng).copied(),
                CHILD_NAMES.choose(&mut rng).copied(),
            )?;

            let team = match TeamLogic::register_by_name(pool, policy, &name, &members) {
                Ok(team) => team,
                Err(AppError::DuplicateName { .. }) => {
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            report.teams += 1;

            for kind in GameKind::ALL {
                let payload = synthetic_payload(&mut rng, kind, &team);
                let raw = payload.to_json()?;

                ProgressLogic::start(pool, team.id, kind)?;
                ProgressLogic::submit(pool, team.id, kind, &raw)?;
                report.submissions += 1;
            }
        }

        Ok(report)
    }
}

fn pick_team_names(rng: &mut StdRng, roster: &[RosterEntry], n: usize) -> Vec<String> {
    let mut names: Vec<String> = roster.iter().map(|e| e.name.clone()).collect();
    names.shuffle(rng);
    names.truncate(n);

    let mut i = 1;
    while names.len() < n {
        let candidate = format!("Testteam {i:02}");
        if !names.contains(&candidate) {
            names.push(candidate);
        }
        i += 1;
    }

    names.sort();
    names
}

/// A plausible answer for each game, always inside the validation ranges.
fn synthetic_payload(rng: &mut StdRng, kind: GameKind, team: &Team) -> GamePayload {
    match kind {
        GameKind::TechCheck => GamePayload::TechCheck(TechCheckPayload {
            parent_name: team.parent_name.clone(),
            child_name: team.child_name.clone(),
        }),
        GameKind::Game1Heights => GamePayload::Heights(HeightsPayload {
            parent_height: rng.random_range(160..=195) as f64,
            child_height: rng.random_range(110..=140) as f64,
        }),
        GameKind::Game2Perimeter => {
            let parent = PERIMETER_GROUND_TRUTH * 1.2 + rng.random_range(-8.0..=8.0);
            let child = PERIMETER_GROUND_TRUTH * 0.9 + rng.random_range(-10.0..=10.0);
            GamePayload::Perimeter(PerimeterPayload {
                parent_estimate: (parent * 100.0).round() / 100.0,
                child_estimate: (child * 10.0).round() / 10.0,
            })
        }
        GameKind::Game3Memory => GamePayload::Memory(MemoryPayload {
            answers: (1..=MEMORY_ANSWER_KEY.len() as u32)
                .map(|round| {
                    let answer = if rng.random_bool(0.6) {
                        MEMORY_ANSWER_KEY[round as usize - 1]
                    } else {
                        MEMORY_OPTIONS.choose(&mut *rng).copied().unwrap_or("A")
                    };
                    MemoryAnswer {
                        round,
                        answer: answer.to_string(),
                    }
                })
                .collect(),
        }),
        GameKind::Game4Clinical => {
            // placebo effect ~0, molecule ~3
            let parent_placebo = team.parent_treatment != Some(Treatment::Molecule);
            let mut pain = |placebo: bool| {
                let before: i64 = rng.random_range(5..=10);
                let effect: i64 = if placebo {
                    rng.random_range(-1..=1)
                } else {
                    rng.random_range(2..=4)
                };
                (before, (before - effect).clamp(0, 10))
            };
            let (parent_before, parent_after) = pain(parent_placebo);
            let (child_before, child_after) = pain(!parent_placebo);
            GamePayload::Clinical(ClinicalPayload {
                parent_before,
                parent_after,
                child_before,
                child_after,
            })
        }
        GameKind::Feedback => GamePayload::Feedback(FeedbackPayload {
            overall_rating: rng.random_range(3..=5),
            favorite_game: FAVORITES.choose(rng).copied().unwrap_or("Game 1: Heights").to_string(),
            comments: String::new(),
        }),
    }
}
