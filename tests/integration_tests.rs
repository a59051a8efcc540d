//! Integration tests for goban
//!
//! End-to-end scenarios through the public API: captures, suicide, ko and
//! superko, pass termination and scoring. The randomized checks use seeded
//! `fastrand` generators so every run plays the same games.

use goban::board::{Board, Cell, Color, MoveError, Point};
use goban::config::GameConfig;
use goban::coord::{Vertex, parse_vertex};
use goban::game::{GameError, GameState, MoveKind, Phase, RecordedMove};
use goban::territory::{Smoothing, TerritoryEvaluator};

// =============================================================================
// Helper functions
// =============================================================================

fn game9() -> GameState {
    GameState::with_size(9).unwrap()
}

/// Play a list of vertices alternately, Black first. Panics on an illegal move.
fn setup_game(size: usize, moves: &[&str]) -> GameState {
    let mut game = GameState::with_size(size).unwrap();
    for mv in moves {
        match parse_vertex(mv, size).unwrap() {
            Vertex::Pass => {
                game.pass();
            }
            Vertex::Play((x, y)) => {
                if let Err(err) = game.place_stone(x, y) {
                    panic!("Illegal move {mv} in setup: {err}");
                }
            }
        }
    }
    game
}

/// Every group on the board has at least one liberty.
fn all_groups_alive(board: &Board) -> bool {
    board.points().all(|(x, y)| {
        board.get(x, y) == Some(Cell::Empty) || board.has_liberties(&board.find_group(x, y))
    })
}

fn random_empty_point(board: &Board, rng: &mut fastrand::Rng) -> Option<Point> {
    let empty: Vec<Point> = board
        .points()
        .filter(|&(x, y)| board.get(x, y) == Some(Cell::Empty))
        .collect();
    (!empty.is_empty()).then(|| empty[rng.usize(..empty.len())])
}

// =============================================================================
// Capture tests
// =============================================================================

#[test]
fn test_basic_capture_scenario() {
    let mut game = game9();
    game.set_acting_color(Color::White);
    game.place_stone(4, 4).unwrap();

    // Black surrounds, White plays elsewhere in between.
    for (black, white) in [((3, 4), (8, 8)), ((5, 4), (8, 0)), ((4, 3), (0, 8))] {
        let result = game.place_stone(black.0, black.1).unwrap();
        assert_eq!(result.captures, 0);
        game.place_stone(white.0, white.1).unwrap();
    }
    assert_eq!(game.board().get(4, 4), Some(Cell::White));

    let result = game.place_stone(4, 5).unwrap();
    assert_eq!(result.captures, 1);
    assert_eq!(game.board().get(4, 4), Some(Cell::Empty));
    assert_eq!(game.captures(Color::Black), 1);
    assert_eq!(game.captures(Color::White), 0);
}

#[test]
fn test_capture_group_tally() {
    // White pair at D4 and D5 surrounded by Black.
    let game = setup_game(
        9,
        &["C4", "D4", "C5", "D5", "E4", "J9", "E5", "J8", "D3", "J7", "D6"],
    );
    let d4 = parse_vertex("D4", 9).unwrap();
    let d5 = parse_vertex("D5", 9).unwrap();
    for v in [d4, d5] {
        let Vertex::Play((x, y)) = v else {
            unreachable!()
        };
        assert_eq!(game.board().get(x, y), Some(Cell::Empty));
    }
    assert_eq!(game.captures(Color::Black), 2);
}

#[test]
fn test_capture_corner() {
    let game = setup_game(9, &["B2", "A1", "A2", "J9", "B1"]);
    assert_eq!(game.board().get(0, 8), Some(Cell::Empty), "A1 should be captured");
    assert_eq!(game.captures(Color::Black), 1);
}

#[test]
fn test_random_games_keep_groups_alive() {
    for seed in 0..20 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut game = game9();
        for _ in 0..120 {
            let Some((x, y)) = random_empty_point(game.board(), &mut rng) else {
                break;
            };
            let mover = game.current_player();
            let opp = mover.opponent();
            let opp_before = game.board().stone_count(opp);
            let tally_before = game.captures(mover);

            if let Ok(result) = game.place_stone(x, y) {
                let removed = opp_before - game.board().stone_count(opp);
                assert_eq!(removed, result.captures, "seed {seed}");
                assert_eq!(game.captures(mover), tally_before + removed, "seed {seed}");
                assert!(all_groups_alive(game.board()), "seed {seed}");
            }
        }
    }
}

// =============================================================================
// Suicide tests
// =============================================================================

#[test]
fn test_suicide_single_stone() {
    let mut game = setup_game(9, &["A2", "J9", "B1"]);
    let before = game.board().cells().to_vec();
    let moves_before = game.moves().len();

    assert_eq!(game.place_stone(0, 8), Err(GameError::Move(MoveError::Suicide)));
    assert_eq!(game.board().cells(), before.as_slice());
    assert_eq!(game.moves().len(), moves_before);
    assert_eq!(game.current_player(), Color::White);
}

#[test]
fn test_rejections_leave_board_unchanged() {
    for seed in 100..110 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut board = Board::new(7).unwrap();
        let mut color = Color::Black;
        for _ in 0..150 {
            let Some((x, y)) = random_empty_point(&board, &mut rng) else {
                break;
            };
            let cells = board.cells().to_vec();
            let forbidden = board.forbidden_point();
            let history = board.history().len();
            match board.place(x, y, color) {
                Ok(_) => color = color.opponent(),
                Err(err) => {
                    assert!(
                        matches!(
                            err,
                            MoveError::Suicide
                                | MoveError::KoForbiddenPoint
                                | MoveError::SuperkoRepetition
                        ),
                        "unexpected {err} for seed {seed}"
                    );
                    assert_eq!(board.cells(), cells.as_slice(), "seed {seed}");
                    assert_eq!(board.forbidden_point(), forbidden);
                    assert_eq!(board.history().len(), history);
                }
            }
        }
    }
}

// =============================================================================
// Ko tests
// =============================================================================

#[test]
fn test_simple_ko_scenario() {
    let mut game = game9();
    // Black builds an eye around (2,4), White one around (3,4).
    let setup = [(2, 3), (3, 3), (2, 5), (3, 5), (1, 4), (4, 4), (3, 4)];
    for (x, y) in setup {
        game.place_stone(x, y).unwrap();
    }

    // White takes the black stone at (3,4).
    assert_eq!(game.current_player(), Color::White);
    let result = game.place_stone(2, 4).unwrap();
    assert_eq!(result.captures, 1);
    assert_eq!(result.ko, Some((3, 4)));

    // Immediate recapture is refused and nothing changes.
    let before = game.board().cells().to_vec();
    assert_eq!(
        game.place_stone(3, 4),
        Err(GameError::Move(MoveError::KoForbiddenPoint))
    );
    assert_eq!(game.board().cells(), before.as_slice());
    assert_eq!(game.current_player(), Color::Black);

    // After an exchange elsewhere Black may retake.
    game.place_stone(7, 7).unwrap();
    game.place_stone(7, 1).unwrap();
    let result = game.place_stone(3, 4).unwrap();
    assert_eq!(result.captures, 1);
    assert_eq!(game.captures(Color::White), 1);
    assert_eq!(game.captures(Color::Black), 1);
    assert_eq!(game.board().forbidden_point(), Some((2, 4)));
}

/// Black and White eyes around (2,4) and (3,4); the last move is Black's
/// stone at (3,4), so White to play can take it.
const KO_SETUP: [(usize, usize); 7] = [(2, 3), (3, 3), (2, 5), (3, 5), (1, 4), (4, 4), (3, 4)];

#[test]
fn test_capturer_fills_ko_after_pass() {
    let mut game = game9();
    for (x, y) in KO_SETUP {
        game.place_stone(x, y).unwrap();
    }
    let result = game.place_stone(2, 4).unwrap();
    assert_eq!(result.ko, Some((3, 4)));

    // Black passes instead of retaking; White is free to fill the ko.
    assert!(!game.pass());
    assert_eq!(game.current_player(), Color::White);
    assert!(game.legal_moves().contains(&(3, 4)));
    let result = game.place_stone(3, 4).unwrap();
    assert_eq!(result.captures, 0);
    assert_eq!(result.ko, None);
    assert_eq!(game.board().forbidden_point(), None);
    assert_eq!(game.board().get(3, 4), Some(Cell::White));
}

#[test]
fn test_ko_binds_opponent_in_out_of_order_replay() {
    let mut game = game9();
    let mut record: Vec<RecordedMove> = KO_SETUP
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| {
            let color = if i % 2 == 0 { Color::Black } else { Color::White };
            RecordedMove::play(color, x, y)
        })
        .collect();
    // White takes the ko, then moves again and fills it.
    record.push(RecordedMove::play(Color::White, 2, 4));
    record.push(RecordedMove::play(Color::White, 3, 4));
    game.replay(&record).unwrap();
    assert_eq!(game.board().get(3, 4), Some(Cell::White));
    assert_eq!(game.captures(Color::White), 1);

    // The ko still binds Black when Black is the one to move right after.
    game.reset();
    record.truncate(KO_SETUP.len() + 1);
    record.push(RecordedMove::play(Color::Black, 3, 4));
    let err = game.replay(&record).unwrap_err();
    assert_eq!(err.index, KO_SETUP.len() + 1);
    assert_eq!(err.source, GameError::Move(MoveError::KoForbiddenPoint));
}

#[test]
fn test_superko_in_double_ko() {
    let mut board = Board::from_rows(&[
        ".OX......", //
        "OX.X.....",
        ".OX......",
        ".........",
        ".XO......",
        "XO.O.....",
        ".XO......",
        ".........",
        ".........",
    ])
    .unwrap();
    board.place(8, 0, Color::White).unwrap();

    board.place(2, 1, Color::White).unwrap();
    board.place(2, 5, Color::Black).unwrap();
    board.place(1, 1, Color::Black).unwrap();
    // Retaking the second ko would restore the position after (8,0).
    let before = board.cells().to_vec();
    assert_eq!(board.forbidden_point(), Some((2, 1)));
    assert_eq!(board.place(1, 5, Color::White), Err(MoveError::SuperkoRepetition));
    assert_eq!(board.cells(), before.as_slice());
    assert!(!board.legal_moves(Color::White).contains(&(1, 5)));
}

#[test]
fn test_ko_history_is_bounded() {
    let mut board = Board::new(9).unwrap();
    for i in 0..20 {
        board.place(i % 9, i / 9, Color::Black).unwrap();
    }
    assert_eq!(board.history().len(), 8);
    assert_eq!(board.history().capacity(), 8);
}

// =============================================================================
// Liberty tests
// =============================================================================

#[test]
fn test_has_liberties_idempotent() {
    let mut rng = fastrand::Rng::with_seed(42);
    let mut game = game9();
    for _ in 0..60 {
        if let Some((x, y)) = random_empty_point(game.board(), &mut rng) {
            let _ = game.place_stone(x, y);
        }
    }
    let board = game.board();
    for (x, y) in board.points() {
        let group = board.find_group(x, y);
        assert_eq!(board.has_liberties(&group), board.has_liberties(&group));
        assert_eq!(board.liberties(x, y), board.liberties(x, y));
    }
}

// =============================================================================
// Game flow tests
// =============================================================================

#[test]
fn test_pass_termination() {
    let mut game = game9();
    assert!(!game.pass());
    game.place_stone(2, 2).unwrap();
    assert!(!game.pass(), "Placement resets the pass streak");
    assert_eq!(game.phase(), Phase::InProgress);
    assert!(game.pass());
    assert!(game.is_game_over());
    assert_eq!(game.phase(), Phase::Over);

    let kinds: Vec<MoveKind> = game.moves().iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MoveKind::Pass,
            MoveKind::Place((2, 2)),
            MoveKind::Pass,
            MoveKind::Pass
        ]
    );
}

#[test]
fn test_replay_out_of_order_record() {
    let mut game = game9();
    game.replay(&[
        RecordedMove::play(Color::Black, 2, 2),
        RecordedMove::play(Color::Black, 6, 6),
        RecordedMove::play(Color::White, 2, 6),
        RecordedMove::pass(Color::White),
    ])
    .unwrap();
    assert_eq!(game.board().stone_count(Color::Black), 2);
    assert_eq!(game.board().stone_count(Color::White), 1);
    assert_eq!(game.current_player(), Color::Black);
    assert_eq!(game.pass_count(), 1);
}

#[test]
fn test_empty_board_all_moves_legal() {
    let game = game9();
    let moves = game.legal_moves();
    assert_eq!(moves.len(), 81);
    assert_eq!(moves.first(), Some(&(0, 0)));
    assert_eq!(moves.last(), Some(&(8, 8)));
}

// =============================================================================
// Scoring tests
// =============================================================================

#[test]
fn test_scoring_single_center_stone() {
    let mut game = game9();
    game.place_stone(4, 4).unwrap();

    let ownership = game.ownership();
    assert_eq!(ownership.black, 80);
    assert_eq!(ownership.white, 0);
    assert_eq!(ownership.neutral, 0);

    let score = game.score();
    assert_eq!(score.black, 81.0);
    assert_eq!(score.white, 6.5);
    assert_eq!(score.winner(), Some(Color::Black));
}

#[test]
fn test_empty_board_score_is_komi() {
    let game = game9();
    let score = game.score();
    assert_eq!(score.black, 0.0);
    assert_eq!(score.white, 6.5);
    assert!(game.influence_map().iter().all(|&v| v == 0.0));
}

#[test]
fn test_split_board_territory() {
    // A black wall on column C and a white wall on column G.
    let mut game = game9();
    for y in 0..9 {
        game.set_acting_color(Color::Black);
        game.place_stone(2, y).unwrap();
        game.set_acting_color(Color::White);
        game.place_stone(6, y).unwrap();
    }
    let eval = game.evaluation();
    assert_eq!(eval.owner(0, 4), Some(Color::Black));
    assert_eq!(eval.owner(8, 4), Some(Color::White));
    assert_eq!(eval.owner(4, 4), None, "Middle column is contested");

    let score = game.score();
    assert!(score.black >= 27.0);
    assert!(score.white >= 27.0 + 6.5);
}

#[test]
fn test_ownership_partitions_empty_points() {
    for seed in 0..15 {
        let mut rng = fastrand::Rng::with_seed(seed);
        let size = [5, 9, 13][seed as usize % 3];
        let mut game = GameState::with_size(size).unwrap();
        let moves = rng.usize(0..size * size);
        for _ in 0..moves {
            if let Some((x, y)) = random_empty_point(game.board(), &mut rng) {
                let _ = game.place_stone(x, y);
            }
        }
        let ownership = game.ownership();
        assert_eq!(ownership.total(), game.board().empty_count(), "seed {seed}");
        assert!(game.influence_map().iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}

#[test]
fn test_smoothing_config_is_used() {
    let config = GameConfig {
        size: 9,
        smoothing: Smoothing::Simple,
        smoothing_passes: None,
        ..GameConfig::default()
    };
    let mut game = GameState::new(config).unwrap();
    game.place_stone(4, 4).unwrap();

    let expected = TerritoryEvaluator::new(game.board())
        .smoothing(Smoothing::Simple)
        .passes(3)
        .evaluate();
    assert_eq!(game.evaluation(), &expected);
}
