//! Whole turns through the public `Game` API, observed via the transition stream.

use proptest::prelude::*;
use stonemerge::linking::has_activatable_group;
use stonemerge::{Activation, Game, GameConfig, Grid, Ignored, Phase};

fn config(rows: usize, cols: usize, seed: u64) -> GameConfig {
    GameConfig {
        rows,
        cols,
        merge_threshold: 50,
        seed: Some(seed),
    }
}

#[test]
fn vertical_run_of_four_on_default_board() {
    let grid: Grid = "sysys/gsysy/gysys/gsysy/gysys".parse().unwrap();
    let mut game = Game::with_grid(config(5, 5, 9), grid).unwrap();
    let rx = game.subscribe();

    let Activation::Resolved(turn) = game.activate(20) else {
        panic!("run of four should resolve");
    };
    assert_eq!(game.score(), 4);
    assert_eq!(turn.spawned, vec![0, 5, 10]);

    let stages: Vec<_> = rx.try_iter().collect();
    let phases: Vec<_> = stages.iter().map(|t| t.phase).collect();
    assert_eq!(&phases[..4], &[
        Phase::Resolving,
        Phase::Settling,
        Phase::Refilling,
        Phase::AwaitingInput
    ]);
    // the four-point stone has dropped to the bottom of column 0
    let settled = &stages[1].snapshot;
    assert_eq!(settled.cells[20].points, 4);
    assert!(settled.cells[0].is_empty());
    assert!(stages[2].snapshot.cells.iter().all(|c| !c.is_empty()));
}

#[test]
fn game_over_ignores_further_input() {
    let grid: Grid = "gsgs/sgsg/gsgs".parse().unwrap();
    let mut game = Game::with_grid(config(3, 4, 1), grid).unwrap();
    let rx = game.subscribe();
    assert!(game.is_game_over());
    assert_eq!(game.activate(0), Activation::Ignored(Ignored::GameOver));
    assert_eq!(rx.try_iter().count(), 0);

    game.restart();
    let last = rx.try_iter().last().unwrap();
    assert_eq!(last.snapshot.score, 0);
    assert_eq!(last.phase, game.phase());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_play_keeps_board_consistent(seed in any::<u64>(), picks in prop::collection::vec(0usize..25, 1..40)) {
        let mut game = Game::new(config(5, 5, seed)).unwrap();
        let rx = game.subscribe();
        let mut score = 0;

        for pick in picks {
            match game.activate(pick) {
                Activation::Ignored(_) => {
                    prop_assert_eq!(rx.try_iter().count(), 0);
                }
                Activation::Resolved(turn) => {
                    prop_assert!(game.score() >= score);
                    prop_assert_eq!(game.score() - score, turn.gained);
                    score = game.score();

                    let last = rx.try_iter().last().unwrap();
                    prop_assert!(matches!(last.phase, Phase::Idle | Phase::GameOver));
                    prop_assert_eq!(game.grid().empty_count(), 0);
                    prop_assert_eq!(game.is_game_over(), !has_activatable_group(game.grid()));
                    for cell in game.grid().cells() {
                        prop_assert!(cell.points <= 50);
                    }
                }
            }
        }
    }
}
