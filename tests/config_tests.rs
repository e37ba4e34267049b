use mcts_2048::{
    board::DEFAULT_FOUR_SPAWN_PROBABILITY, config::DEFAULT_REWARD_NORMALIZATION, Board, Error,
    MCTSConfig,
};

#[test]
fn test_config_builder_methods() {
    // Test that all builder methods correctly set their respective values
    let config = MCTSConfig::default()
        .with_exploration_constant(2.0)
        .with_max_iterations(5000)
        .with_reward_normalization(1000.0)
        .with_seed(77);

    assert_eq!(config.exploration_constant, 2.0);
    assert_eq!(config.max_iterations, 5000);
    assert_eq!(config.reward_normalization, 1000.0);
    assert_eq!(config.seed, Some(77));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_default_values() {
    let config = MCTSConfig::default();

    assert_eq!(config.exploration_constant, 0.5);
    assert_eq!(config.max_iterations, 1_000);
    assert_eq!(config.reward_normalization, DEFAULT_REWARD_NORMALIZATION);
    assert_eq!(config.reward_normalization, 3_932_156.0);
    assert_eq!(config.seed, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let bad = [
        MCTSConfig::default().with_exploration_constant(-1.0),
        MCTSConfig::default().with_exploration_constant(f64::NAN),
        MCTSConfig::default().with_reward_normalization(0.0),
        MCTSConfig::default().with_reward_normalization(-5.0),
        MCTSConfig::default().with_reward_normalization(f64::INFINITY),
    ];

    for config in bad {
        assert!(
            matches!(config.validate(), Err(Error::InvalidConfiguration(_))),
            "{:?} should be rejected",
            config
        );
    }

    // Pure exploitation is allowed
    assert!(MCTSConfig::default()
        .with_exploration_constant(0.0)
        .validate()
        .is_ok());
}

#[test]
fn test_board_configuration() {
    let board = Board::new(5, DEFAULT_FOUR_SPAWN_PROBABILITY).unwrap();
    assert_eq!(board.dimension(), 5);
    assert_eq!(board.cell_count(), 25);
    assert_eq!(board.four_spawn_probability(), 0.1);

    assert!(matches!(Board::new(0, 0.1), Err(Error::InvalidConfiguration(_))));
    assert!(matches!(Board::new(4, 1.01), Err(Error::InvalidConfiguration(_))));

    let message = Board::new(0, 0.1).unwrap_err().to_string();
    assert!(message.starts_with("Invalid configuration"));
}
