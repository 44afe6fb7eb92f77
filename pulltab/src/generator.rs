//! Randomized tab layout.
//!
//! A ticket either loses outright or carries exactly one prize. One Bernoulli
//! trial against the design's `win_probability` decides which; a winner gets
//! a uniform prize from `min_prize..=max_prize` placed at a uniform index.

use crate::error::PullTabError;
use crate::types::{Coins, DesignSpec, Tab, TabValue};
use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;

/// Generate the tabs for one ticket of `design`.
///
/// All tabs start unrevealed and are returned in index order.
///
/// # Errors
///
/// Returns [`PullTabError::InvalidDesign`] if the design fails validation.
pub fn generate_tabs<R: Rng + ?Sized>(
    design: &DesignSpec,
    rng: &mut R,
) -> Result<Vec<Tab>, PullTabError> {
    design.validate()?;

    let mut tabs: Vec<Tab> = (0..design.tab_count).map(Tab::loss).collect();

    let trial = Bernoulli::new(design.win_probability)
        .map_err(|e| PullTabError::InvalidDesign(e.to_string()))?;

    if trial.sample(rng) {
        let prize = rng.gen_range(design.min_prize.amount()..=design.max_prize.amount());
        let winner = rng.gen_range(0..design.tab_count);
        if let Some(tab) = tabs.get_mut(winner) {
            tab.value = TabValue::Prize(Coins::new(prize));
        }
    }

    Ok(tabs)
}

/// Check a tab layout against the design it claims to come from.
///
/// # Errors
///
/// Returns [`PullTabError::TamperedTabs`] if the count, ordering, revealed
/// flags, number of winners or prize range do not match.
pub fn verify_tabs(design: &DesignSpec, tabs: &[Tab]) -> Result<(), PullTabError> {
    if tabs.len() != design.tab_count {
        return Err(PullTabError::TamperedTabs(format!(
            "expected {} tabs, got {}",
            design.tab_count,
            tabs.len()
        )));
    }

    if let Some(tab) = tabs.iter().enumerate().find(|(i, tab)| tab.index != *i) {
        return Err(PullTabError::TamperedTabs(format!(
            "tab at position {} has index {}",
            tab.0, tab.1.index
        )));
    }

    if tabs.iter().any(|tab| tab.revealed) {
        return Err(PullTabError::TamperedTabs(
            "tabs must start unrevealed".to_string(),
        ));
    }

    let prizes: Vec<Coins> = tabs.iter().filter_map(|tab| tab.value.prize()).collect();
    match prizes.as_slice() {
        [] => Ok(()),
        [prize] if (design.min_prize..=design.max_prize).contains(prize) => Ok(()),
        [prize] => Err(PullTabError::TamperedTabs(format!(
            "prize {prize} is outside {}..={}",
            design.min_prize, design.max_prize
        ))),
        _ => Err(PullTabError::TamperedTabs(format!(
            "{} winning tabs on one ticket",
            prizes.len()
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use pulltab_testing::seeded_rng;

    fn design(tab_count: usize, win_probability: f64, min: u64, max: u64) -> DesignSpec {
        DesignSpec {
            name: "Test Design".to_string(),
            cost: Coins::new(10),
            tab_count,
            win_probability,
            min_prize: Coins::new(min),
            max_prize: Coins::new(max),
        }
    }

    #[test]
    fn test_certain_loss() {
        let mut rng = seeded_rng(7);
        let tabs = generate_tabs(&design(5, 0.0, 1, 10), &mut rng).unwrap();
        assert_eq!(tabs.len(), 5);
        assert!(tabs.iter().all(|tab| tab.value == TabValue::Loss));
    }

    #[test]
    fn test_certain_win_single_prize_value() {
        let mut rng = seeded_rng(7);
        let tabs = generate_tabs(&design(3, 1.0, 25, 25), &mut rng).unwrap();
        let winners: Vec<_> = tabs.iter().filter(|tab| tab.value.is_winner()).collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].value, TabValue::Prize(Coins::new(25)));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let d = design(10, 0.5, 1, 1_000);
        let first = generate_tabs(&d, &mut seeded_rng(42)).unwrap();
        let second = generate_tabs(&d, &mut seeded_rng(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_design_rejected() {
        let mut rng = seeded_rng(1);
        let result = generate_tabs(&design(0, 0.5, 1, 10), &mut rng);
        assert!(matches!(result, Err(PullTabError::InvalidDesign(_))));
    }

    #[test]
    fn test_verify_rejects_two_winners() {
        let d = design(3, 0.5, 1, 100);
        let tabs = vec![
            Tab::prize(0, Coins::new(5)),
            Tab::prize(1, Coins::new(5)),
            Tab::loss(2),
        ];
        assert!(matches!(verify_tabs(&d, &tabs), Err(PullTabError::TamperedTabs(_))));
    }

    #[test]
    fn test_verify_rejects_out_of_range_prize() {
        let d = design(2, 0.5, 10, 20);
        let tabs = vec![Tab::loss(0), Tab::prize(1, Coins::new(21))];
        assert!(verify_tabs(&d, &tabs).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_count_and_order() {
        let d = design(2, 0.5, 10, 20);
        assert!(verify_tabs(&d, &[Tab::loss(0)]).is_err());
        assert!(verify_tabs(&d, &[Tab::loss(1), Tab::loss(0)]).is_err());

        let mut revealed = vec![Tab::loss(0), Tab::loss(1)];
        revealed[0].revealed = true;
        assert!(verify_tabs(&d, &revealed).is_err());
    }

    #[test]
    fn test_win_rate_tracks_probability() {
        let d = design(5, 0.3, 1, 10);
        let mut rng = seeded_rng(2024);
        let wins = (0..10_000)
            .filter(|_| {
                generate_tabs(&d, &mut rng)
                    .unwrap()
                    .iter()
                    .any(|tab| tab.value.is_winner())
            })
            .count();
        assert!((2_700..=3_300).contains(&wins), "wins = {wins}");
    }

    proptest! {
        #[test]
        fn prop_generated_tabs_pass_verification(
            seed in any::<u64>(),
            tab_count in 1usize..=50,
            win_probability in 0.0f64..=1.0,
            min in 1u64..1_000,
            spread in 0u64..1_000,
        ) {
            let d = design(tab_count, win_probability, min, min + spread);
            let tabs = generate_tabs(&d, &mut seeded_rng(seed)).unwrap();

            prop_assert_eq!(tabs.len(), tab_count);
            prop_assert!(tabs.iter().all(|tab| !tab.revealed));
            prop_assert!(tabs.iter().filter(|tab| tab.value.is_winner()).count() <= 1);
            prop_assert!(verify_tabs(&d, &tabs).is_ok());
        }
    }
}
