use gridworld_rs::{Action, Cell, CellKind, Color, Direction, DoorState, GridError};

#[test]
fn action_indices_roundtrip() {
    for i in 0u8..=6u8 {
        let a = Action::try_from(i).expect("valid action index");
        assert_eq!(a as u8, i);
    }
    assert_eq!(Action::try_from(7u8), Err(GridError::InvalidAction(7)));
    assert_eq!(Action::try_from(255u8), Err(GridError::InvalidAction(255)));
}

#[test]
fn action_names() {
    assert_eq!(Action::from_name("Forward"), Some(Action::Forward));
    assert_eq!(Action::from_name("pickup"), Some(Action::Pickup));
    assert_eq!(Action::from_name("jump"), None);
}

#[test]
fn direction_indices_and_rotation() {
    for (i, d) in Direction::ALL.iter().enumerate() {
        assert_eq!(Direction::try_from(i as u8), Ok(*d));
    }
    assert_eq!(Direction::try_from(4u8), Err(GridError::InvalidDirection(4)));

    let start = Direction::Right;
    assert_eq!(start.right(), Direction::Down);
    assert_eq!(start.left(), Direction::Up);
    assert_eq!(start.right().right().right().right(), start);
    assert_eq!(start.left().left().left().left(), start);
}

#[test]
fn direction_delta_vectors() {
    assert_eq!(Direction::Right.delta(), (1, 0));
    assert_eq!(Direction::Down.delta(), (0, 1));
    assert_eq!(Direction::Left.delta(), (-1, 0));
    assert_eq!(Direction::Up.delta(), (0, -1));
}

#[test]
fn cell_kind_values_match_minigrid() {
    assert_eq!(CellKind::Unseen as u8, 0);
    assert_eq!(CellKind::Empty as u8, 1);
    assert_eq!(CellKind::Wall as u8, 2);
    assert_eq!(CellKind::Door as u8, 4);
    assert_eq!(CellKind::Key as u8, 5);
    assert_eq!(CellKind::Ball as u8, 6);
    assert_eq!(CellKind::Box as u8, 7);
    assert_eq!(CellKind::Goal as u8, 8);
    assert_eq!(CellKind::Lava as u8, 9);
    assert_eq!(CellKind::Agent as u8, 10);
}

#[test]
fn capabilities() {
    let key = Cell::Key { color: Color::Red };
    let ball = Cell::Ball { color: Color::Blue };
    let crate_ = Cell::boxed(Color::Grey, None);
    let open = Cell::door(Color::Green, DoorState::Open);
    let closed = Cell::door(Color::Green, DoorState::Closed);
    let locked = Cell::door(Color::Green, DoorState::Locked);

    assert!(Cell::Goal.can_overlap());
    assert!(Cell::Lava.can_overlap());
    assert!(open.can_overlap());
    for blocked in [&Cell::Wall, &closed, &locked, &key, &ball, &crate_] {
        assert!(!blocked.can_overlap(), "{blocked:?} should block");
    }

    for liftable in [&key, &ball, &crate_] {
        assert!(liftable.can_pickup());
    }
    for fixed in [&Cell::Wall, &Cell::Goal, &Cell::Lava, &open] {
        assert!(!fixed.can_pickup());
    }

    assert!(!Cell::Wall.see_behind());
    assert!(open.see_behind());
    assert!(!closed.see_behind());
}

#[test]
fn cells_serialize_with_serde() {
    let cell = Cell::boxed(Color::Purple, Some(Cell::Key { color: Color::Yellow }));
    let s = serde_json::to_string(&cell).unwrap();
    let back: Cell = serde_json::from_str(&s).unwrap();
    assert_eq!(back, cell);
}
