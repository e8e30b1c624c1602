//! Projection tests - grouping, filtering, geometry and camera through the engine

mod common;

use common::{now, open_engine, projected_records, record_ids, DocumentBuilder};
use crossmap::commands::{
    MoveCameraToRecord, SetListItemProperty, SetRecordsCollapsed, ToggleBreakout,
    ToggleFilterValue, ToggleSectionCollapsed,
};
use crossmap::model::{ListField, RecordField, RecordId};
use crossmap::projection::ItemId;
use crossmap::{CommandEngine, EditorId};
use pretty_assertions::assert_eq;

fn section(engine: &CommandEngine, id: EditorId, name: &str) -> ItemId {
    engine
        .editor(id)
        .unwrap()
        .view
        .iter()
        .find(|(_, item)| item.name() == Some(name))
        .map(|(item, _)| item)
        .unwrap_or_else(|| panic!("no section named {name}"))
}

fn section_names(engine: &CommandEngine, id: EditorId) -> Vec<String> {
    engine
        .editor(id)
        .unwrap()
        .view
        .iter()
        .filter_map(|(_, item)| item.name().map(str::to_owned))
        .collect()
}

fn section_records(engine: &CommandEngine, id: EditorId, name: &str) -> Vec<RecordId> {
    let section = section(engine, id, name);
    engine
        .editor(id)
        .unwrap()
        .view
        .section_records(section)
        .unwrap()
}

// ========================================================================
// Grouping
// ========================================================================

#[test]
fn test_breakout_groups_records_under_every_option() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(6).build());
    let ids = record_ids(&engine, id);

    engine
        .execute(id, ToggleBreakout { field: RecordField::MappingStatus }, now())
        .unwrap();

    assert_eq!(
        section_names(&engine, id),
        vec!["No Value", "Complete", "In Progress", "Non-Mappable"]
    );
    assert_eq!(
        projected_records(&engine, id),
        vec![ids[2], ids[5], ids[0], ids[3], ids[1], ids[4]]
    );
    assert!(section_records(&engine, id, "Non-Mappable").is_empty());
}

#[test]
fn test_removing_breakout_restores_collection_order() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(4).build());
    let ids = record_ids(&engine, id);
    let toggle = ToggleBreakout { field: RecordField::MappingStatus };

    engine.execute(id, toggle, now()).unwrap();
    engine.execute(id, toggle, now()).unwrap();

    assert!(section_names(&engine, id).is_empty());
    assert_eq!(projected_records(&engine, id), ids);
    let view = &engine.editor(id).unwrap().view;
    assert_eq!(view.items().len(), ids.len());
}

#[test]
fn test_editing_a_breakout_field_moves_the_record() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(6).build());
    let ids = record_ids(&engine, id);
    engine
        .execute(id, ToggleBreakout { field: RecordField::MappingStatus }, now())
        .unwrap();

    engine
        .execute(
            id,
            SetListItemProperty::new(ids[2], ListField::MappingStatus, Some("complete".into())),
            now(),
        )
        .unwrap();

    assert_eq!(section_records(&engine, id, "No Value"), vec![ids[5]]);
    assert_eq!(
        section_records(&engine, id, "Complete"),
        vec![ids[0], ids[2], ids[3]]
    );

    engine.undo(id, now()).unwrap();
    assert_eq!(section_records(&engine, id, "No Value"), vec![ids[2], ids[5]]);
}

#[test]
fn test_collapsed_section_keeps_identity_and_hides_records() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(6).build());
    engine
        .execute(id, ToggleBreakout { field: RecordField::MappingStatus }, now())
        .unwrap();
    let complete = section(&engine, id, "Complete");

    engine
        .execute(id, ToggleSectionCollapsed { item: complete }, now())
        .unwrap();

    assert_eq!(section(&engine, id, "Complete"), complete);
    assert!(section_records(&engine, id, "Complete").is_empty());
    assert_eq!(projected_records(&engine, id).len(), 4);

    engine
        .execute(id, ToggleSectionCollapsed { item: complete }, now())
        .unwrap();
    assert_eq!(section_records(&engine, id, "Complete").len(), 2);
}

// ========================================================================
// Filtering
// ========================================================================

#[test]
fn test_filter_hides_value_and_its_section() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(6).build());
    let ids = record_ids(&engine, id);
    let hide_complete = ToggleFilterValue {
        field: RecordField::MappingStatus,
        value: Some("complete".into()),
    };

    engine.execute(id, hide_complete.clone(), now()).unwrap();
    assert_eq!(
        projected_records(&engine, id),
        vec![ids[1], ids[2], ids[4], ids[5]]
    );

    engine
        .execute(id, ToggleBreakout { field: RecordField::MappingStatus }, now())
        .unwrap();
    assert_eq!(
        section_names(&engine, id),
        vec!["No Value", "In Progress", "Non-Mappable"]
    );

    engine.execute(id, hide_complete, now()).unwrap();
    assert_eq!(projected_records(&engine, id).len(), 6);
}

// ========================================================================
// Geometry and camera
// ========================================================================

#[test]
fn test_layout_of_ungrouped_records() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(3).build());
    let ids = record_ids(&engine, id);
    let editor = engine.editor(id).unwrap();
    let heads: Vec<usize> = editor
        .view
        .iter()
        .map(|(_, item)| item.head_offset)
        .collect();
    assert_eq!(heads, vec![0, 246, 492]);
    assert_eq!(editor.view.content_height(), 738);
    assert_eq!(editor.view.items_visible_at(300, 400), vec![editor.view.record_item(ids[1]).unwrap()]);

    engine
        .execute(id, SetRecordsCollapsed { all: true, collapsed: true }, now())
        .unwrap();
    assert_eq!(engine.editor(id).unwrap().view.content_height(), 3 * (45 + 6));
}

#[test]
fn test_move_camera_to_record_scrolls_and_selects() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(10).build());
    let ids = record_ids(&engine, id);
    engine.editor_mut(id).unwrap().view.set_view_height(300);

    engine
        .execute(id, MoveCameraToRecord { record: ids[5] }, now())
        .unwrap();

    let view = &engine.editor(id).unwrap().view;
    assert_eq!(view.camera().position, 5 * 246);
    assert_eq!(view.selected_records(), vec![ids[5]]);

    // Already on screen: no movement
    let before = view.camera().position;
    engine
        .execute(id, MoveCameraToRecord { record: ids[5] }, now())
        .unwrap();
    assert_eq!(engine.editor(id).unwrap().view.camera().position, before);
}

#[test]
fn test_camera_clamps_when_content_shrinks() {
    let (mut engine, id) = open_engine(DocumentBuilder::new().mappings(10).build());
    let ids = record_ids(&engine, id);
    {
        let view = &mut engine.editor_mut(id).unwrap().view;
        view.set_view_height(300);
        view.set_camera_position(usize::MAX);
        assert_eq!(view.camera().position, 10 * 246 - 300);
    }

    engine
        .execute(id, SetRecordsCollapsed { all: true, collapsed: true }, now())
        .unwrap();

    let view = &engine.editor(id).unwrap().view;
    assert_eq!(view.content_height(), 10 * 51);
    assert_eq!(view.camera().position, 10 * 51 - 300);
    assert!(view.is_record_visible(ids[9]));
}
