use gridworld_rs::{
    Action, Cell, Color, Direction, DoorState, Generated, Grid, GridConfig, GridError, Layout, World, STEP_PENALTY,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const EPS: f64 = 1e-9;

fn empty_5x5(max_steps: u32) -> World {
    let mut world = World::new(GridConfig::new(5, 5, max_steps), Layout::EmptyRoom).unwrap();
    world.reset(&mut StdRng::seed_from_u64(0)).unwrap();
    world
}

fn room(w: usize, h: usize) -> Grid {
    let mut g = Grid::new(w, h);
    g.wall_rect(0, 0, w, h);
    g
}

fn world_with(grid: Grid, pos: (i32, i32), dir: Direction, max_steps: u32) -> World<Generated> {
    let (w, h) = (grid.width(), grid.height());
    let mut world = World::new(GridConfig::new(w, h, max_steps), Generated::new(grid, pos, dir)).unwrap();
    world.reset(&mut StdRng::seed_from_u64(0)).unwrap();
    world
}

#[test]
fn basic_forward_movement() {
    let mut world = empty_5x5(100);
    assert_eq!(world.agent().pos, (1, 1));
    assert_eq!(world.agent().dir, Direction::Right);

    let out = world.step(Action::Forward).unwrap();
    assert_eq!(out.observation.agent.pos, (2, 1));
    assert_eq!(out.observation.agent.dir, Direction::Right);
    assert!((out.reward - STEP_PENALTY).abs() < EPS);
    assert!(!out.done);
}

#[test]
fn turning_wraps_both_ways() {
    let mut world = empty_5x5(100);
    let out = world.step(Action::Left).unwrap();
    assert_eq!(out.observation.agent.dir, Direction::Up);
    assert_eq!(out.observation.agent.pos, (1, 1));

    world.step(Action::Right).unwrap();
    let out = world.step(Action::Right).unwrap();
    assert_eq!(out.observation.agent.dir, Direction::Down);
}

#[test]
fn left_then_right_is_identity_for_every_direction() {
    for start in Direction::ALL {
        let mut world = world_with(room(5, 5), (2, 2), start, 100);
        world.step(Action::Left).unwrap();
        world.step(Action::Right).unwrap();
        assert_eq!(world.agent().dir, start);
        world.step(Action::Right).unwrap();
        world.step(Action::Left).unwrap();
        assert_eq!(world.agent().dir, start);
    }
}

#[test]
fn four_turns_close_the_cycle() {
    for start in Direction::ALL {
        for action in [Action::Left, Action::Right] {
            let mut world = world_with(room(5, 5), (2, 2), start, 100);
            for _ in 0..4 {
                world.step(action).unwrap();
            }
            assert_eq!(world.agent().dir, start, "{action:?} x4 from {start:?}");
        }
    }
}

#[test]
fn wall_blocks_forward_and_only_costs_the_penalty() {
    let mut world = empty_5x5(100);
    world.step(Action::Forward).unwrap(); // (2,1)
    world.step(Action::Forward).unwrap(); // (3,1)
    let out = world.step(Action::Forward).unwrap();
    assert_eq!(out.observation.agent.pos, (3, 1));
    assert!((out.reward - STEP_PENALTY).abs() < EPS);
    assert!(!out.done);
    assert!(!out.terminated);
}

#[test]
fn objects_and_closed_doors_block_forward() {
    let mut grid = room(6, 3);
    grid.set(2, 1, Some(Cell::Key { color: Color::Red }));
    let mut world = world_with(grid, (1, 1), Direction::Right, 100);
    assert_eq!(world.step(Action::Forward).unwrap().observation.agent.pos, (1, 1));

    let mut grid = room(6, 3);
    grid.set(2, 1, Some(Cell::door(Color::Blue, DoorState::Closed)));
    let mut world = world_with(grid, (1, 1), Direction::Right, 100);
    assert_eq!(world.step(Action::Forward).unwrap().observation.agent.pos, (1, 1));

    let mut grid = room(6, 3);
    grid.set(2, 1, Some(Cell::door(Color::Blue, DoorState::Open)));
    let mut world = world_with(grid, (1, 1), Direction::Right, 100);
    assert_eq!(world.step(Action::Forward).unwrap().observation.agent.pos, (2, 1));
}

#[test]
fn reaching_goal_pays_point_999() {
    let mut world = empty_5x5(100);
    world.step(Action::Forward).unwrap();
    world.step(Action::Forward).unwrap();
    world.step(Action::Right).unwrap();
    world.step(Action::Forward).unwrap();
    let out = world.step(Action::Forward).unwrap();
    assert_eq!(out.observation.agent.pos, (3, 3));
    assert!(out.done);
    assert!(out.terminated);
    assert!(!out.truncated);
    assert!((out.reward - 0.999).abs() < EPS);
    assert!(out.observation.done);
}

#[test]
fn lava_costs_two_and_ends_episode() {
    let mut grid = room(5, 5);
    grid.set(2, 1, Some(Cell::Lava));
    let mut world = world_with(grid, (1, 1), Direction::Right, 50);
    let out = world.step(Action::Forward).unwrap();
    assert_eq!(out.observation.agent.pos, (2, 1), "lava is overlappable");
    assert!(out.done);
    assert!(out.terminated);
    assert!((out.reward - (-2.001)).abs() < EPS);
    assert!((world.total_reward() - (-2.001)).abs() < EPS);
}

#[test]
fn step_budget_forces_done() {
    let mut world = empty_5x5(3);
    assert!(!world.step(Action::Right).unwrap().done);
    assert!(!world.step(Action::Right).unwrap().done);
    let out = world.step(Action::Right).unwrap();
    assert!(out.done);
    assert!(out.truncated);
    assert!(!out.terminated);
    assert!((out.reward - STEP_PENALTY).abs() < EPS);
    assert_eq!(world.step_count(), 3);
}

#[test]
fn goal_on_last_budgeted_step_keeps_reward() {
    let mut world = empty_5x5(5);
    for a in [Action::Forward, Action::Forward, Action::Right, Action::Forward] {
        world.step(a).unwrap();
    }
    let out = world.step(Action::Forward).unwrap();
    assert!(out.terminated && out.truncated && out.done);
    assert!((out.reward - 0.999).abs() < EPS);
}

#[test]
fn stepping_after_done_is_a_contract_error() {
    let mut world = empty_5x5(1);
    assert!(world.step(Action::Done).unwrap().done);
    let before = world.observation();
    assert_eq!(world.step(Action::Forward), Err(GridError::EpisodeFinished));
    assert_eq!(world.observation(), before, "rejected step must not mutate the world");
}

#[test]
fn done_action_is_a_noop() {
    let mut world = empty_5x5(100);
    let before = world.observation();
    let out = world.step(Action::Done).unwrap();
    assert!(!out.done);
    assert_eq!(out.observation.agent, before.agent);
    assert_eq!(out.observation.grid, before.grid);
    assert_eq!(out.observation.step_count, 1);
}

#[test]
fn step_count_and_total_reward_accumulate() {
    let mut world = empty_5x5(100);
    for i in 1..=5u32 {
        world.step(Action::Left).unwrap();
        assert_eq!(world.step_count(), i);
    }
    assert!((world.total_reward() - 5.0 * STEP_PENALTY).abs() < EPS);
    assert!((world.last_reward() - STEP_PENALTY).abs() < EPS);
}

#[test]
fn unwalled_edge_is_treated_as_blocked() {
    let grid = Grid::new(3, 3);
    let mut world = world_with(grid, (2, 1), Direction::Right, 10);
    let out = world.step(Action::Forward).unwrap();
    assert_eq!(out.observation.agent.pos, (2, 1));
    world.step(Action::Pickup).unwrap();
    world.step(Action::Toggle).unwrap();
    assert!(world.agent().carrying.is_none());
}

#[test]
fn navigate_around_the_room() {
    let mut world = empty_5x5(100);
    // right along the top, down the right side
    for a in [Action::Forward, Action::Forward, Action::Right, Action::Forward] {
        world.step(a).unwrap();
    }
    assert_eq!(world.agent().pos, (3, 2));
    world.step(Action::Right).unwrap();
    world.step(Action::Forward).unwrap();
    world.step(Action::Forward).unwrap();
    assert_eq!(world.agent().pos, (1, 2));
    assert_eq!(world.agent().dir, Direction::Left);
}
