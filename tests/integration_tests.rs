use mcts_2048::{
    agents::{Agent, MctsAgent},
    harness,
    policy::{LeastVisitedPolicy, SimulationPolicy, StandardPolicy, UCB1Policy},
    Board, Direction, Error, MCTSConfig, Phase, Position, MCTS,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn position(rows: &[Vec<u64>]) -> Position {
    let board = Board::new(rows.len(), 0.1).unwrap();
    Position::from_rows(&board, rows).unwrap()
}

// Walk a random game, collecting every position where the agent is to move
fn random_trajectory(board: &Board, seed: u64) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut current = board.initial_position(&mut rng);
    let mut positions = Vec::new();

    while !current.game_over() {
        positions.push(current.clone());
        let direction = *current.legal_moves().choose(&mut rng).unwrap();
        current = current.result(direction, &mut rng).unwrap();
    }

    positions
}

#[test]
fn test_mcts_basic_functionality() {
    let board = Board::new(4, 0.1).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let initial = board.initial_position(&mut rng);

    let config = MCTSConfig::default().with_seed(3).with_max_iterations(200);
    let mut mcts = MCTS::new(config);

    let direction = mcts.recommend_move(&initial, 200).unwrap();
    assert!(initial.legal_moves().contains(&direction));

    let stats = mcts.get_statistics();
    assert_eq!(stats.iterations, 200, "Should have performed expected iterations");
    assert!(stats.table_size > 1, "Table should have grown");
    assert!(stats.max_depth >= 1);
    assert!(stats.expansions >= 1 && stats.expansions < 200);
}

#[test]
fn test_recommendation_is_always_legal() {
    let board = Board::new(3, 0.1).unwrap();

    for seed in 0..4 {
        let positions = random_trajectory(&board, seed);
        let mut mcts = MCTS::new(MCTSConfig::default().with_seed(seed));

        for (i, position) in positions.iter().enumerate().step_by(3) {
            let iterations = [1, 2, 5, 40][i % 4];
            let direction = mcts.recommend_move(position, iterations).unwrap();
            assert!(
                position.legal_moves().contains(&direction),
                "{:?} is not legal in {:?}",
                direction,
                position
            );
        }
    }
}

#[test]
fn test_same_seed_same_recommendation() {
    let board = Board::new(4, 0.1).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let initial = board.initial_position(&mut rng);
    let position = initial.result(initial.legal_moves()[0], &mut rng).unwrap();

    let first = MCTS::new(MCTSConfig::default().with_seed(1234))
        .recommend_move(&position, 300)
        .unwrap();
    let second = MCTS::new(MCTSConfig::default().with_seed(1234))
        .recommend_move(&position, 300)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_single_legal_move_is_recommended() {
    // Only a slide to the left changes this grid
    let p = position(&[vec![0, 2, 4], vec![0, 4, 8], vec![0, 8, 16]]);
    assert_eq!(p.legal_moves(), vec![Direction::Left]);

    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(5));
    for iterations in [1, 2, 10, 100] {
        assert_eq!(mcts.recommend_move(&p, iterations).unwrap(), Direction::Left);
    }
}

#[test]
fn test_zero_iterations_rejected() {
    let p = position(&[vec![2, 2], vec![0, 0]]);
    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(0));

    match mcts.recommend_move(&p, 0) {
        Err(Error::InvalidArgument(msg)) => assert!(msg.contains("iteration")),
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn test_terminal_root_rejected() {
    let p = position(&[
        vec![2, 4, 2, 4],
        vec![4, 2, 4, 2],
        vec![2, 4, 2, 4],
        vec![4, 2, 4, 2],
    ]);
    assert!(p.game_over());

    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(0));
    let result = mcts.recommend_move(&p, 100);
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_spawn_phase_root_rejected() {
    let p = position(&[vec![2, 2], vec![0, 0]]);
    let slid = p.slide(Direction::Left).unwrap();
    assert_eq!(slid.phase(), Phase::EnvironmentToSpawn);

    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(0));
    assert!(matches!(
        mcts.recommend_move(&slid, 10),
        Err(Error::InvalidArgument(_))
    ));

    // The generic search still works from chance states
    let action = mcts.search_for_iterations(&slid, 20).unwrap();
    assert!(slid.search_legal_moves().contains(&action));
}

#[test]
fn test_invalid_normalization_rejected() {
    let p = position(&[vec![2, 2], vec![0, 0]]);
    let mut mcts = MCTS::new(MCTSConfig::default().with_reward_normalization(0.0));
    assert!(matches!(
        mcts.recommend_move(&p, 10),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_search_uses_configured_iterations() {
    let p = position(&[vec![2, 0, 0], vec![0, 0, 0], vec![0, 0, 2]]);
    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(8).with_max_iterations(64));

    let action = mcts.search(&p).unwrap();
    assert!(p.search_legal_moves().contains(&action));
    assert_eq!(mcts.get_statistics().iterations, 64);
}

#[test]
fn test_mcts_agent_plays_a_full_game() {
    let board = Board::new(3, 0.1).unwrap();
    let mut rng = StdRng::seed_from_u64(17);
    let mut agent = MctsAgent::new(30, MCTSConfig::default().with_seed(17)).unwrap();
    assert_eq!(agent.name(), "mcts(30)");

    let finished = harness::play_game(&board, &mut agent, &mut rng, |_: &Position| {}).unwrap();
    assert!(finished.game_over());
    assert!(finished.turn() > 0);
}

/// Scores a leaf by its own value without playing on
#[derive(Clone)]
struct NoRollout;

impl SimulationPolicy<Position> for NoRollout {
    fn simulate(&self, state: &Position, _rng: &mut dyn rand::RngCore) -> Position {
        state.clone()
    }

    fn clone_box(&self) -> Box<dyn SimulationPolicy<Position>> {
        Box::new(self.clone())
    }
}

#[test]
fn test_custom_policies() {
    let p = position(&[vec![2, 2, 0], vec![0, 4, 0], vec![0, 0, 0]]);

    let mut mcts = MCTS::new(MCTSConfig::default())
        .with_rng(StdRng::seed_from_u64(10))
        .with_selection_policy(UCB1Policy::new(0.0))
        .with_chance_policy(LeastVisitedPolicy::new())
        .with_simulation_policy(NoRollout)
        .with_backpropagation_policy(StandardPolicy::new());
    assert_eq!(mcts.config().exploration_constant, 0.5);

    // Only the merging slides score, and without exploration they dominate
    let direction = mcts.recommend_move(&p, 200).unwrap();
    assert!(matches!(direction, Direction::Left | Direction::Right));
    assert!(mcts.get_statistics().best_reward > 0.0);
}

#[test]
fn test_agent_exposes_its_engine() {
    let agent = MctsAgent::new(25, MCTSConfig::default().with_exploration_constant(1.0)).unwrap();
    assert_eq!(agent.engine().config().exploration_constant, 1.0);
}

#[test]
fn test_root_without_moves_rejected() {
    let empty = position(&[vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
    assert!(!empty.game_over());
    assert!(empty.legal_moves().is_empty());

    let mut mcts = MCTS::new(MCTSConfig::default().with_seed(0));
    match mcts.recommend_move(&empty, 5) {
        Err(Error::InvalidArgument(msg)) => assert!(msg.contains("no moves")),
        other => panic!("Unexpected result: {:?}", other),
    }
    assert_eq!(mcts.get_statistics().iterations, 0);
}
