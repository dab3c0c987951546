//! Score calculation.
//!
//! Totals are always derived from match history:
//! - a player's total is their carried-over base score plus every point
//!   awarded to them in completed rounds
//! - the leaderboard sorts by total, descending, keeping registration order
//!   for ties
//!
//! The tournament's cached `players_score` is only ever a copy of this.

use serde::{Deserialize, Serialize};

use crate::models::{Player, PlayerId, Round};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Standing {
    pub player: PlayerId,
    pub name: String,
    pub score: f64,
}

/// Total score for a player across all completed rounds.
pub fn total_score(player: &Player, rounds: &[Round]) -> f64 {
    let earned: f64 = rounds
        .iter()
        .filter(|round| round.is_complete())
        .flat_map(|round| round.matches())
        .filter(|game| game.is_played())
        .filter_map(|game| game.points_for(&player.id))
        .sum();

    player.base_score + earned
}

/// Leaderboard, highest score first. Ties keep roster order.
pub fn leaderboard(players: &[Player], rounds: &[Round]) -> Vec<Standing> {
    let mut standings: Vec<Standing> = players
        .iter()
        .map(|player| Standing {
            player: player.id.clone(),
            name: player.full_name(),
            score: total_score(player, rounds),
        })
        .collect();

    // sort_by is stable
    standings.sort_by(|a, b| b.score.total_cmp(&a.score));
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, Outcome};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn player(n: u32) -> Player {
        Player::new(
            &format!("p{}", n),
            "test",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            PlayerId::parse(&format!("AA{:05}", n)).unwrap(),
        )
    }

    fn played(a: &Player, b: &Player, outcome: Outcome) -> Match {
        let mut m = Match::new(a.id.clone(), b.id.clone()).unwrap();
        m.record(outcome).unwrap();
        m
    }

    fn history(players: &[Player]) -> Vec<Round> {
        let mut r1 = Round::new("Round 1");
        r1.add_match(played(&players[0], &players[1], Outcome::FirstWins));
        r1.add_match(played(&players[2], &players[3], Outcome::Draw));

        let mut r2 = Round::new("Round 2");
        r2.add_match(played(&players[0], &players[2], Outcome::SecondWins));
        r2.add_match(played(&players[1], &players[3], Outcome::FirstWins));

        vec![r1, r2]
    }

    #[test]
    fn test_total_score_sums_match_points() {
        let players: Vec<Player> = (1..=4).map(player).collect();
        let rounds = history(&players);

        assert_eq!(total_score(&players[0], &rounds), 1.0);
        assert_eq!(total_score(&players[1], &rounds), 1.0);
        assert_eq!(total_score(&players[2], &rounds), 1.5);
        assert_eq!(total_score(&players[3], &rounds), 0.5);
    }

    #[test]
    fn test_total_score_includes_base_score() {
        let players: Vec<Player> = (1..=4).map(player).collect();
        let rounds = history(&players);
        let carried = players[3].clone().with_base_score(2.0);

        assert_eq!(total_score(&carried, &rounds), 2.5);
    }

    #[test]
    fn test_incomplete_rounds_are_ignored() {
        let players: Vec<Player> = (1..=4).map(player).collect();
        let mut round = Round::new("Round 1");
        round.add_match(played(&players[0], &players[1], Outcome::FirstWins));
        round.add_match(Match::new(players[2].id.clone(), players[3].id.clone()).unwrap());

        assert_eq!(total_score(&players[0], &[round]), 0.0);
    }

    #[test]
    fn test_leaderboard_sorted_with_stable_ties() {
        let players: Vec<Player> = (1..=4).map(player).collect();
        let rounds = history(&players);

        let board = leaderboard(&players, &rounds);
        let order: Vec<&str> = board.iter().map(|s| s.player.as_str()).collect();

        // p1 and p2 tie on 1.0 and keep roster order
        assert_eq!(order, vec!["AA00003", "AA00001", "AA00002", "AA00004"]);
        assert_eq!(board[0].name, "P3 Test");
        assert_eq!(board[0].score, 1.5);
    }

    #[test]
    fn test_leaderboard_is_idempotent() {
        let players: Vec<Player> = (1..=4).map(player).collect();
        let rounds = history(&players);

        assert_eq!(leaderboard(&players, &rounds), leaderboard(&players, &rounds));
    }
}
