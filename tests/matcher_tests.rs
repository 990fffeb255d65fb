//! Matcher tests - line counting, shape classification and swipe hints

use wizmatch::core::{best_swipe, check_token, classify, count_line, find_swipe, Grid};
use wizmatch::types::{Direction, MatchType, Pos};

#[test]
fn test_classify_table() {
    let cases = [
        ((0, 0), MatchType::None),
        ((1, 1), MatchType::None),
        ((2, 0), MatchType::Three),
        ((0, 2), MatchType::Three),
        ((2, 1), MatchType::Three),
        ((3, 0), MatchType::Four),
        ((1, 3), MatchType::Four),
        ((3, 2), MatchType::Cross),
        ((2, 2), MatchType::Cross),
        ((4, 0), MatchType::Five),
        ((4, 2), MatchType::Five),
        ((0, 5), MatchType::Five),
    ];
    for ((x, y), expected) in cases {
        assert_eq!(classify(x, y), expected, "classify({}, {})", x, y);
    }
}

#[test]
fn test_count_line_stops_at_color_change_and_matched() {
    let mut grid = Grid::from_rows(&[&[1, 1, 1, 1, 0], &[0, 2, 0, 2, 0], &[2, 0, 2, 0, 2]], 3).unwrap();
    let run = count_line(&grid, Pos::new(0, 0), Direction::Right);
    assert_eq!(run.count, 3);
    assert_eq!(
        run.tokens.as_slice(),
        &[Pos::new(1, 0), Pos::new(2, 0), Pos::new(3, 0)]
    );
    assert_eq!(count_line(&grid, Pos::new(0, 0), Direction::Left).count, 0);

    grid.get_mut(Pos::new(2, 0)).unwrap().matched = true;
    assert_eq!(count_line(&grid, Pos::new(0, 0), Direction::Right).count, 1);
}

#[test]
fn test_plus_shape_is_cross() {
    let grid = Grid::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 1, 0]], 3).unwrap();
    let result = check_token(&grid, Pos::new(1, 1));
    assert_eq!(result.match_type, MatchType::Cross);
    assert_eq!(result.affected.len(), 5);
}

#[test]
fn test_short_axis_is_dropped() {
    let grid = Grid::from_rows(&[&[0, 1, 0], &[1, 1, 1], &[0, 2, 0]], 3).unwrap();
    let result = check_token(&grid, Pos::new(1, 1));
    assert_eq!(result.match_type, MatchType::Three);
    assert!(!result.affected.contains(&Pos::new(1, 0)));
    assert_eq!(result.affected.len(), 3);
}

#[test]
fn test_check_from_line_end() {
    let grid = Grid::from_rows(&[&[2, 2, 2, 2, 0], &[0, 1, 0, 1, 2], &[1, 0, 1, 0, 1]], 3).unwrap();
    let from_end = check_token(&grid, Pos::new(3, 0));
    assert_eq!(from_end.match_type, MatchType::Four);
    assert_eq!(from_end.primary, Pos::new(3, 0));
    assert_eq!(from_end.affected.len(), 4);

    let lone = check_token(&grid, Pos::new(4, 0));
    assert!(!lone.is_match());
    assert!(lone.affected.is_empty());
}

fn hint_grid() -> Grid {
    Grid::from_rows(
        &[&[1, 1, 0, 1, 1], &[2, 3, 1, 2, 3], &[3, 2, 3, 0, 2]],
        4,
    )
    .unwrap()
}

#[test]
fn test_find_swipe_returns_first_hit() {
    let hint = find_swipe(&hint_grid()).unwrap();
    assert_eq!(hint.pos, Pos::new(1, 0));
    assert_eq!(hint.direction, Direction::Right);
    assert_eq!(hint.match_type, MatchType::Three);
}

#[test]
fn test_best_swipe_prefers_bigger_shapes() {
    let grid = hint_grid();
    let hint = best_swipe(&grid).unwrap();
    assert_eq!(hint.pos, Pos::new(2, 0));
    assert_eq!(hint.direction, Direction::Down);
    assert_eq!(hint.match_type, MatchType::Five);
    assert_eq!(hint.size, 5);

    // Hint search never mutates the board.
    assert_eq!(grid, hint_grid());
}

#[test]
fn test_no_swipe_on_dead_board() {
    // No color appears three times.
    let grid = Grid::from_rows(&[&[0, 1, 2], &[3, 4, 0], &[1, 2, 3]], 5).unwrap();
    assert!(find_swipe(&grid).is_none());
    assert!(best_swipe(&grid).is_none());
}
