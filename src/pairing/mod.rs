//! Swiss pairing engine.
//!
//! Round one is drawn at random. Later rounds pair by standings: the
//! highest-ranked unpaired player meets the unpaired player closest to them
//! in score whom they have not met yet, ties going to the higher-ranked
//! candidate. If that player has no such opponent, pairing stops and the
//! round fails with `NoLegalPairing`; a rematch is never forced.
//!
//! Nothing is committed to the played-pairs set unless the whole round
//! pairs successfully.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculate::Standing;
use crate::models::{ConfigurationError, Match, PlayedPairs, Player, PlayerId};

/// Errors that can occur during pairing.
#[derive(Debug, Error, PartialEq)]
pub enum PairingError {
    #[error("No rematch-free opponent for {player} in round {}", .round + 1)]
    NoLegalPairing { round: usize, player: PlayerId },

    #[error("Invalid pairing: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Produce the matches for a round and record their pairs as played.
///
/// `standings` is the current leaderboard; players missing from it rank by
/// their base score. On error `played` is left untouched.
pub fn pair_round<R: Rng + ?Sized>(
    round_index: usize,
    pool: &[Player],
    played: &mut PlayedPairs,
    standings: &[Standing],
    rng: &mut R,
) -> Result<Vec<Match>, PairingError> {
    if pool.len() < 2 {
        warn!(
            "Round {}: {} player(s) left, nothing to pair",
            round_index + 1,
            pool.len()
        );
        return Ok(Vec::new());
    }

    let pairs = if round_index == 0 {
        random_pairs(pool, played, rng)
    } else {
        standings_pairs(round_index, pool, played, standings)?
    };

    let matches = pairs
        .iter()
        .map(|(a, b)| Match::new(a.clone(), b.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    for (a, b) in &pairs {
        played.insert(a, b);
    }

    info!(
        "Round {}: paired {} matches ({} played pairs)",
        round_index + 1,
        matches.len(),
        played.len()
    );
    Ok(matches)
}

/// Shuffle every possible pair and greedily accept those whose players are
/// both still free.
fn random_pairs<R: Rng + ?Sized>(
    pool: &[Player],
    played: &PlayedPairs,
    rng: &mut R,
) -> Vec<(PlayerId, PlayerId)> {
    let n = pool.len();
    let mut candidates: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect();
    candidates.shuffle(rng);

    let mut paired = vec![false; n];
    let mut accepted = Vec::with_capacity(n / 2);

    for (i, j) in candidates {
        if paired[i] || paired[j] || played.contains(&pool[i].id, &pool[j].id) {
            continue;
        }
        paired[i] = true;
        paired[j] = true;
        debug!("Accepted random pair {} - {}", pool[i].id, pool[j].id);
        accepted.push((pool[i].id.clone(), pool[j].id.clone()));
    }

    for (player, _) in pool.iter().zip(&paired).filter(|(_, p)| !**p) {
        warn!("Player {} left without an opponent", player.id);
    }

    accepted
}

struct Ranked<'a> {
    id: &'a PlayerId,
    score: f64,
}

/// Greedy scan down the standings.
fn standings_pairs(
    round_index: usize,
    pool: &[Player],
    played: &PlayedPairs,
    standings: &[Standing],
) -> Result<Vec<(PlayerId, PlayerId)>, PairingError> {
    let scores: HashMap<&PlayerId, f64> = standings.iter().map(|s| (&s.player, s.score)).collect();

    let mut free: Vec<Ranked> = pool
        .iter()
        .map(|p| Ranked {
            id: &p.id,
            score: scores.get(&p.id).copied().unwrap_or(p.base_score),
        })
        .collect();
    // Stable: equal scores keep roster order.
    free.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut pairs = Vec::with_capacity(free.len() / 2);
    while free.len() >= 2 {
        let top = free.remove(0);

        // min_by keeps the first of equal differences, i.e. the higher rank.
        let opponent = free
            .iter()
            .enumerate()
            .filter(|(_, c)| !played.contains(top.id, c.id))
            .min_by(|(_, a), (_, b)| {
                (top.score - a.score)
                    .abs()
                    .total_cmp(&(top.score - b.score).abs())
            })
            .map(|(i, _)| i);

        let opponent = match opponent {
            Some(i) => free.remove(i),
            None => {
                warn!(
                    "Round {}: no rematch-free opponent left for {}",
                    round_index + 1,
                    top.id
                );
                return Err(PairingError::NoLegalPairing {
                    round: round_index,
                    player: top.id.clone(),
                });
            }
        };

        debug!("Accepted standings pair {} - {}", top.id, opponent.id);
        pairs.push((top.id.clone(), opponent.id.clone()));
    }

    if let Some(left) = free.first() {
        warn!("Player {} left without an opponent", left.id);
    }

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn id(n: usize) -> PlayerId {
        PlayerId::parse(&format!("AA{:05}", n)).unwrap()
    }

    fn roster(n: usize) -> Vec<Player> {
        (1..=n)
            .map(|i| {
                Player::new(
                    &format!("p{}", i),
                    "test",
                    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                    id(i),
                )
            })
            .collect()
    }

    fn standings(scores: &[(usize, f64)]) -> Vec<Standing> {
        scores
            .iter()
            .map(|&(n, score)| Standing {
                player: id(n),
                name: format!("P{} Test", n),
                score,
            })
            .collect()
    }

    fn pair_ids(matches: &[Match]) -> Vec<(PlayerId, PlayerId)> {
        matches
            .iter()
            .map(|m| (m.first().clone(), m.second().clone()))
            .collect()
    }

    #[test]
    fn test_first_round_covers_everyone_once() {
        let pool = roster(6);
        let mut played = PlayedPairs::new();
        let mut rng = StdRng::seed_from_u64(42);

        let matches = pair_round(0, &pool, &mut played, &[], &mut rng).unwrap();

        assert_eq!(matches.len(), 3);
        let seen: HashSet<&PlayerId> = matches
            .iter()
            .flat_map(|m| [m.first(), m.second()])
            .collect();
        assert_eq!(seen.len(), 6);
        assert_eq!(played.len(), 3);
        assert_eq!(played.directed_len(), 6);
    }

    #[test]
    fn test_first_round_reproducible_with_seed() {
        let pool = roster(8);
        let a = pair_round(0, &pool, &mut PlayedPairs::new(), &[], &mut StdRng::seed_from_u64(9))
            .unwrap();
        let b = pair_round(0, &pool, &mut PlayedPairs::new(), &[], &mut StdRng::seed_from_u64(9))
            .unwrap();
        assert_eq!(pair_ids(&a), pair_ids(&b));
    }

    #[test]
    fn test_standings_pairs_closest_scores() {
        let pool = roster(6);
        let mut played = PlayedPairs::new();
        let board = standings(&[(1, 2.0), (2, 0.0), (3, 1.5), (4, 1.0), (5, 0.5), (6, 1.0)]);

        let matches =
            pair_round(1, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0)).unwrap();

        // Ranking: 1 (2.0), 3 (1.5), 4 (1.0), 6 (1.0), 5 (0.5), 2 (0.0)
        assert_eq!(
            pair_ids(&matches),
            vec![(id(1), id(3)), (id(4), id(6)), (id(5), id(2))]
        );
    }

    #[test]
    fn test_standings_skip_played_pairs() {
        let pool = roster(4);
        let mut played = PlayedPairs::new();
        played.insert(&id(1), &id(2));
        let board = standings(&[(1, 1.0), (2, 1.0), (3, 0.0), (4, 0.0)]);

        let matches =
            pair_round(1, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0)).unwrap();

        assert_eq!(pair_ids(&matches), vec![(id(1), id(3)), (id(2), id(4))]);
    }

    #[test]
    fn test_standings_stop_at_dead_end() {
        let pool = roster(6);
        let mut played = PlayedPairs::new();
        played.insert(&id(5), &id(6));
        let before = played.clone();
        let board = standings(&[(1, 5.0), (2, 4.0), (3, 3.0), (4, 2.0), (5, 1.0), (6, 0.0)]);

        let err = pair_round(1, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0))
            .unwrap_err();

        // 1-2 and 3-4 pair greedily; 5 is left facing 6, whom they already met.
        assert_eq!(
            err,
            PairingError::NoLegalPairing {
                round: 1,
                player: id(5)
            }
        );
        assert_eq!(played, before);
    }

    #[test]
    fn test_standings_prefer_closest_over_completion() {
        let pool = roster(4);
        let mut played = PlayedPairs::new();
        played.insert(&id(3), &id(4));
        let board = standings(&[(1, 3.0), (2, 2.0), (3, 1.0), (4, 0.0)]);

        let err = pair_round(1, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0))
            .unwrap_err();

        // 1 takes 2 (closest) even though 1-3, 2-4 would have completed the round.
        assert_eq!(
            err,
            PairingError::NoLegalPairing {
                round: 1,
                player: id(3)
            }
        );
    }

    #[test]
    fn test_standings_ties_go_to_higher_rank() {
        let pool = roster(4);
        let mut played = PlayedPairs::new();
        let board = standings(&[(1, 2.0), (2, 1.0), (3, 1.0), (4, 0.0)]);

        let matches =
            pair_round(1, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0)).unwrap();

        // 2 and 3 are equally close to 1; 2 ranks higher.
        assert_eq!(pair_ids(&matches), vec![(id(1), id(2)), (id(3), id(4))]);
    }

    #[test]
    fn test_no_legal_pairing_is_surfaced() {
        let pool = roster(4);
        let mut played = PlayedPairs::new();
        played.insert(&id(1), &id(2));
        played.insert(&id(1), &id(3));
        played.insert(&id(1), &id(4));
        let before = played.clone();
        let board = standings(&[(1, 3.0), (2, 2.0), (3, 1.0), (4, 0.0)]);

        let err = pair_round(2, &pool, &mut played, &board, &mut StdRng::seed_from_u64(0))
            .unwrap_err();

        assert_eq!(
            err,
            PairingError::NoLegalPairing {
                round: 2,
                player: id(1)
            }
        );
        assert_eq!(played, before);
    }

    #[test]
    fn test_too_few_players_pairs_nothing() {
        let pool = roster(1);
        let mut played = PlayedPairs::new();
        let matches = pair_round(0, &pool, &mut played, &[], &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(matches.is_empty());
        assert!(played.is_empty());
    }

    #[test]
    fn test_second_round_never_repeats_first() {
        let pool = roster(6);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut played = PlayedPairs::new();
            let first = pair_round(0, &pool, &mut played, &[], &mut rng).unwrap();
            let snapshot = played.clone();

            let board = standings(&[(1, 1.0), (2, 1.0), (3, 0.5), (4, 0.5), (5, 0.0), (6, 0.0)]);
            match pair_round(1, &pool, &mut played, &board, &mut rng) {
                Ok(second) => {
                    assert_eq!(second.len(), 3);
                    for m in &second {
                        assert!(!snapshot.contains(m.first(), m.second()));
                    }
                    assert_eq!(played.len(), first.len() + second.len());
                }
                Err(PairingError::NoLegalPairing { round, .. }) => {
                    assert_eq!(round, 1);
                    assert_eq!(played, snapshot);
                }
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
    }
}
