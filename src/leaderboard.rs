use crate::progress::PlayerState;

/// Rivals the player is ranked against.
pub const RIVAL_NAMES: [&str; 10] = [
    "ShadowNinja_99",
    "CosmosWarrior",
    "DeFiMaster",
    "ChainSamurai",
    "CryptoRonin",
    "BlockBuilder",
    "TendermintPro",
    "StakingKing",
    "IBCExplorer",
    "NinjaLegend",
];

/// How many ranks the board shows.
pub const VISIBLE_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub score: u32,
    pub is_player: bool,
}

/// Fixed score of the rival at `position`, falling off with each place.
pub fn rival_score(position: usize) -> u32 {
    let position = position as u32;
    150u32.saturating_sub(position * 12 + (position % 3) * 5)
}

/// Ranks the player among the rivals, highest score first.
///
/// The sort is stable and the player is appended last, so a player tied with
/// a rival is listed below them.
pub fn generate(player: &PlayerState) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = RIVAL_NAMES
        .iter()
        .enumerate()
        .map(|(position, name)| LeaderboardEntry {
            rank: 0,
            name: name.to_string(),
            score: rival_score(position),
            is_player: false,
        })
        .collect();

    entries.push(LeaderboardEntry {
        rank: 0,
        name: player.display_name.clone(),
        score: player.score,
        is_player: true,
    });

    entries.sort_by(|left, right| right.score.cmp(&left.score));

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }

    entries
}

/// Player's rank on the full board.
pub fn player_rank(entries: &[LeaderboardEntry]) -> Option<usize> {
    entries
        .iter()
        .find(|entry| entry.is_player)
        .map(|entry| entry.rank)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with_score(score: u32) -> PlayerState {
        PlayerState {
            score,
            ..PlayerState::default()
        }
    }

    #[test]
    fn rival_scores_decrease_with_position() {
        let scores: Vec<u32> = (0..RIVAL_NAMES.len()).map(rival_score).collect();

        assert_eq!(scores, vec![150, 133, 116, 114, 97, 80, 78, 61, 44, 42]);
    }

    #[test]
    fn eleven_entries_with_contiguous_ranks() {
        for score in [0, 42, 90, 150] {
            let entries = generate(&player_with_score(score));

            assert_eq!(entries.len(), 11);
            assert_eq!(
                entries.iter().map(|entry| entry.rank).collect::<Vec<_>>(),
                (1..=11).collect::<Vec<_>>()
            );
            assert!(
                entries
                    .windows(2)
                    .all(|pair| pair[0].score >= pair[1].score)
            );
            assert_eq!(entries.iter().filter(|entry| entry.is_player).count(), 1);
        }
    }

    #[test]
    fn fresh_player_is_last() {
        let entries = generate(&PlayerState::default());
        let last = entries.last().expect("board is never empty");

        assert!(last.is_player);
        assert_eq!(last.name, "Guest Ninja");
        assert_eq!(last.rank, 11);
        assert_eq!(player_rank(&entries), Some(11));
    }

    #[test]
    fn ties_rank_player_below_rival() {
        let entries = generate(&player_with_score(150));

        assert_eq!(entries[0].name, "ShadowNinja_99");
        assert!(entries[1].is_player);
        assert_eq!(player_rank(&entries), Some(2));
    }

    #[test]
    fn mid_table_score_slots_between_rivals() {
        let entries = generate(&player_with_score(100));

        assert_eq!(player_rank(&entries), Some(5));
        assert_eq!(entries[3].name, "ChainSamurai");
        assert_eq!(entries[5].name, "CryptoRonin");
    }

    #[test]
    fn generation_is_repeatable() {
        let player = player_with_score(60);

        assert_eq!(generate(&player), generate(&player));
    }
}
