//! Search integration tests on the fixture games and Sueca.

mod common;

use common::{SingleMoveGame, TwoCellGame};
use trick_search::core::{PlayerId, SearchRng};
use trick_search::games::Sueca;
use trick_search::rules::Game;
use trick_search::search::{Algorithm, SearchAlgorithm, SearchBuilder, SearchConfig};

fn opening(seed: u64) -> (Sueca, Sueca, PlayerId) {
    let game = Sueca::deal(seed);
    let me = game.next_player();
    let view = game.observed_by(me);
    (game, view, me)
}

fn select(view: &Sueca, me: PlayerId, config: SearchConfig, algorithm: Algorithm) -> trick_search::Card {
    let mut search = SearchBuilder::new(view.clone(), me, config).build(algorithm).unwrap();
    search.select_move().unwrap()
}

// =============================================================================
// Basic Search Tests
// =============================================================================

#[test]
fn test_every_algorithm_returns_a_legal_card() {
    let (game, view, me) = opening(3);
    let legal = game.possible_moves();
    let config = SearchConfig::default().with_iterations(100).with_determinizations(5);

    for algorithm in [Algorithm::Ismcts, Algorithm::Uct, Algorithm::DeterminizedUct, Algorithm::Random] {
        let card = select(&view, me, config.clone(), algorithm);
        assert!(legal.contains(&card), "{algorithm:?} played {card}");
    }
}

#[test]
fn test_single_legal_move_uses_no_iterations() {
    for algorithm in [Algorithm::Ismcts, Algorithm::Uct, Algorithm::DeterminizedUct, Algorithm::Minimax] {
        let mut search = SearchBuilder::new(SingleMoveGame::default(), PlayerId::new(0), SearchConfig::default())
            .build(algorithm)
            .unwrap();
        assert_eq!(search.select_move().unwrap(), 7);
        assert_eq!(search.stats().iterations, 0, "{algorithm:?}");
    }
}

#[test]
fn test_ismcts_prefers_the_winning_cell() {
    let mut search = SearchBuilder::new(TwoCellGame::default(), PlayerId::new(0), SearchConfig::default())
        .build_ismcts()
        .unwrap();

    assert_eq!(search.select_move().unwrap(), 0);
    assert_eq!(search.stats().iterations, 1000);

    let children = search.root_children();
    let visits = |cell: u8| children.iter().find(|c| c.mv == cell).map_or(0, |c| c.visits);
    assert!(visits(0) > visits(1));
    assert_eq!(visits(0) + visits(1), 1000);
}

#[test]
fn test_uct_prefers_the_winning_cell() {
    let mut search = SearchBuilder::new(TwoCellGame::default(), PlayerId::new(0), SearchConfig::default())
        .build(Algorithm::Uct)
        .unwrap();
    assert_eq!(search.select_move().unwrap(), 0);
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_same_seed_same_move() {
    let (_, view, me) = opening(17);
    let config = SearchConfig::default()
        .with_iterations(300)
        .with_determinizations(5)
        .with_seed(12345);

    for algorithm in [Algorithm::Ismcts, Algorithm::DeterminizedUct, Algorithm::Random] {
        let first = select(&view, me, config.clone(), algorithm);
        let second = select(&view, me, config.clone(), algorithm);
        assert_eq!(first, second, "{algorithm:?}");
    }
}

#[test]
fn test_same_rng_state_same_move() {
    let (_, view, me) = opening(23);
    let mut rng = SearchRng::new(99);
    rng.gen_f64();
    let config = SearchConfig::default().with_iterations(200).with_rng_state(rng.state());

    let first = select(&view, me, config.clone(), Algorithm::Ismcts);
    let second = select(&view, me, config, Algorithm::Ismcts);
    assert_eq!(first, second);
}

#[test]
fn test_same_seed_same_statistics() {
    let (_, view, me) = opening(5);
    let config = SearchConfig::default().with_iterations(200);

    let run = || {
        let mut search = SearchBuilder::new(view.clone(), me, config.clone()).build_ismcts().unwrap();
        search.select_move().unwrap();
        search.root_children()
    };
    assert_eq!(run(), run());
}

// =============================================================================
// Statistics and Stopping
// =============================================================================

#[test]
fn test_stop_condition_ends_search_early() {
    let (game, view, me) = opening(8);
    let mut search = SearchBuilder::new(view, me, SearchConfig::default())
        .with_stop_condition(Box::new(|stats| stats.iterations >= 10))
        .build(Algorithm::Ismcts)
        .unwrap();

    let card = search.select_move().unwrap();
    assert!(game.possible_moves().contains(&card));
    assert_eq!(search.stats().iterations, 10);
}

#[test]
fn test_ismcts_statistics() {
    let (_, view, me) = opening(12);
    let mut search = SearchBuilder::new(view, me, SearchConfig::default().with_iterations(250))
        .build_ismcts()
        .unwrap();
    search.select_move().unwrap();

    let stats = search.stats();
    assert_eq!(stats.iterations, 250);
    assert_eq!(stats.simulations, 250);
    assert!(stats.nodes_created > 0 && stats.nodes_created <= 250);
    assert!(stats.max_depth >= 1);

    let tree = search.tree().unwrap();
    assert_eq!(tree.root_node().visits, 250);
    assert_eq!(tree.len() as u32, stats.nodes_created + 1);

    // Every root child's visits sum to the root's.
    let total: u32 = search.root_children().iter().map(|c| c.visits).sum();
    assert_eq!(total, 250);
    for child in search.root_children() {
        assert!(child.avails >= child.visits);
    }
}

#[test]
fn test_determinized_uct_counts_all_iterations() {
    let (_, view, me) = opening(31);
    let config = SearchConfig::default().with_iterations(50).with_determinizations(4);
    let mut search = SearchBuilder::new(view, me, config).build(Algorithm::DeterminizedUct).unwrap();
    search.select_move().unwrap();
    assert_eq!(search.stats().iterations, 200);
}

#[test]
fn test_full_game_between_searches() {
    let mut game = Sueca::deal(2);
    let config = SearchConfig::default().with_iterations(40).with_determinizations(2);

    while !game.is_finished() {
        let me = game.next_player();
        let algorithm = if me.index() % 2 == 0 {
            Algorithm::Ismcts
        } else {
            Algorithm::DeterminizedUct
        };
        let card = select(&game.observed_by(me), me, config.clone(), algorithm);
        game.perform_move(&card).unwrap();
    }

    assert!(game.result().is_some());
}
