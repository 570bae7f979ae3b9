//! Randomized depth-first carving and loop insertion.

use rand_chacha::ChaCha8Rng;

use crate::rng::random_below;
use crate::state::Grid;
use crate::types::{Direction, GameError, Pos};

/// Carves a perfect maze from the origin with an explicit stack and the per-cell visited flag.
pub(super) fn carve_passages(grid: &mut Grid, rng: &mut ChaCha8Rng) -> Result<(), GameError> {
    let origin = Pos::new(0, 0);
    mark_visited(grid, origin);
    let mut stack = vec![origin];

    while let Some(&current) = stack.last() {
        let unvisited: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|direction| {
                grid.neighbor(current, *direction)
                    .and_then(|next| grid.cell(next))
                    .is_some_and(|cell| !cell.visited)
            })
            .collect();
        if unvisited.is_empty() {
            stack.pop();
            continue;
        }
        let direction = unvisited[random_below(rng, unvisited.len())];
        let next = grid.open_between(current, direction)?;
        mark_visited(grid, next);
        stack.push(next);
    }

    grid.clear_visited();
    Ok(())
}

/// Knocks down up to `count` intact walls around interior cells. The outer border is never
/// touched because interior cells always have in-bounds neighbours.
pub(super) fn add_loops(
    grid: &mut Grid,
    rng: &mut ChaCha8Rng,
    count: usize,
) -> Result<usize, GameError> {
    if grid.width() < 3 || grid.height() < 3 {
        return Ok(0);
    }
    let mut opened = 0;
    let max_attempts = count * 16;
    for _ in 0..max_attempts {
        if opened == count {
            break;
        }
        let pos = Pos::new(
            1 + random_below(rng, grid.width() - 2) as i32,
            1 + random_below(rng, grid.height() - 2) as i32,
        );
        let direction = Direction::ALL[random_below(rng, Direction::ALL.len())];
        let intact = grid.cell(pos).is_some_and(|cell| cell.has_wall(direction.wall()));
        if !intact {
            continue;
        }
        grid.open_between(pos, direction)?;
        opened += 1;
    }
    Ok(opened)
}

fn mark_visited(grid: &mut Grid, pos: Pos) {
    if let Some(cell) = grid.cell_mut(pos) {
        cell.visited = true;
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn open_passages(grid: &Grid) -> usize {
        grid.positions()
            .flat_map(|pos| [Direction::Front, Direction::Right].map(|d| grid.can_walk(pos, d)))
            .filter(|open| *open)
            .count()
    }

    #[test]
    fn carving_produces_a_spanning_tree() {
        let mut grid = Grid::new(7, 5).expect("7x5 grid");
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        carve_passages(&mut grid, &mut rng).expect("carving stays in bounds");

        assert_eq!(open_passages(&grid), grid.cell_count() - 1);
        assert!(grid.positions().all(|pos| grid.cell(pos).is_some_and(|cell| !cell.visited)));
    }

    #[test]
    fn loops_add_passages_without_opening_the_border() {
        let mut grid = Grid::new(6, 6).expect("6x6 grid");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        carve_passages(&mut grid, &mut rng).expect("carving stays in bounds");
        let before = open_passages(&grid);

        let opened = add_loops(&mut grid, &mut rng, 4).expect("loops stay in bounds");

        assert!(opened <= 4);
        assert_eq!(open_passages(&grid), before + opened);
        assert!(grid.validate_symmetry().is_ok());
    }

    #[test]
    fn narrow_grids_skip_loop_insertion() {
        let mut grid = Grid::new(2, 9).expect("2x9 grid");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(add_loops(&mut grid, &mut rng, 5), Ok(0));
    }
}
