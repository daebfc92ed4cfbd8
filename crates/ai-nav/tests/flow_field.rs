use ai_nav::{FlowField, FlowSource, TileCoord, Vec2};

#[test]
fn world_positions_map_to_tiles() {
    let field = FlowField::new(4, 3, 2.0, 7);
    assert_eq!(field.tile_of(Vec2::new(3.9, 0.1)), TileCoord::new(1, 0));
    assert_eq!(field.tile_of(Vec2::new(-0.1, 0.0)), TileCoord::new(-1, 0));
    assert_eq!(field.value_at(Vec2::new(7.9, 5.9)), Some(7));
    assert_eq!(field.value_at(Vec2::new(8.0, 0.0)), None);
    assert!(!field.contains(Vec2::new(-1.0, -1.0)));
    assert_eq!(field.bounds().1, Vec2::new(8.0, 6.0));
}

#[test]
fn from_rows_rejects_ragged_input() {
    assert!(FlowField::from_rows(&[vec![1, 2], vec![3]], 1.0).is_none());

    let field = FlowField::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]], 1.0).expect("rows");
    assert_eq!(field.width(), 3);
    assert_eq!(field.height(), 2);
    assert_eq!(field.value_at_tile(TileCoord::new(2, 1)), Some(6));
}

#[test]
fn from_sources_counts_diagonal_steps() {
    let field = FlowField::from_sources(5, 5, 1.0, &[TileCoord::new(0, 0)]);
    assert_eq!(field.value_at_tile(TileCoord::new(0, 0)), Some(0));
    assert_eq!(field.value_at_tile(TileCoord::new(3, 3)), Some(3));
    assert_eq!(field.value_at_tile(TileCoord::new(4, 1)), Some(4));

    let none = FlowField::from_sources(2, 2, 1.0, &[]);
    assert_eq!(none.value_at_tile(TileCoord::new(1, 1)), Some(u32::MAX));
}
