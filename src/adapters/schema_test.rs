use serde_json::json;

use super::*;

#[test]
fn tabs_props_accept_full_shape() {
    let props: InteractableProps<TabsState> = parse_props(
        TABS_COMPONENT,
        json!({"className": "bar", "state": {"canvases": [{"id": "a", "name": "A"}], "activeCanvasId": "a"}}),
    )
    .unwrap();
    assert_eq!(props.class_name.as_deref(), Some("bar"));
    let state = props.state.unwrap();
    assert_eq!(state.canvases, vec![TabEntry { id: "a".into(), name: "A".into() }]);
    assert_eq!(state.active_canvas_id.as_deref(), Some("a"));
}

#[test]
fn tabs_props_allow_missing_state_and_active() {
    let props: InteractableProps<TabsState> = parse_props(TABS_COMPONENT, json!({})).unwrap();
    assert!(props.state.is_none());

    let props: InteractableProps<TabsState> = parse_props(TABS_COMPONENT, json!({"state": {"canvases": []}})).unwrap();
    assert_eq!(props.state.unwrap().active_canvas_id, None);
}

#[test]
fn tabs_props_reject_missing_name() {
    let err = parse_props::<TabsState>(TABS_COMPONENT, json!({"state": {"canvases": [{"id": "a"}]}})).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid { component: "Tabs", .. }));
}

#[test]
fn chart_props_parse_types() {
    let props: InteractableProps<CanvasDetailsState> = parse_props(
        CANVAS_DETAILS_COMPONENT,
        json!({"state": {"charts": [
            {"id": "g1", "title": "A", "type": "bar"},
            {"id": "g2", "title": "B", "type": "pie"}
        ]}}),
    )
    .unwrap();
    let types: Vec<ChartType> = props.state.unwrap().charts.iter().map(|c| c.chart_type).collect();
    assert_eq!(types, [ChartType::Bar, ChartType::Pie]);
}

#[test]
fn chart_props_reject_unknown_type() {
    let result = parse_props::<CanvasDetailsState>(
        CANVAS_DETAILS_COMPONENT,
        json!({"state": {"charts": [{"id": "g1", "title": "A", "type": "area"}]}}),
    );
    assert!(result.is_err());
}

#[test]
fn stored_chart_type_falls_back_to_bar() {
    assert_eq!(ChartType::from_stored(Some("line")), ChartType::Line);
    assert_eq!(ChartType::from_stored(Some("pie")), ChartType::Pie);
    assert_eq!(ChartType::from_stored(Some("radar")), ChartType::Bar);
    assert_eq!(ChartType::from_stored(None), ChartType::Bar);
}

#[test]
fn class_name_is_omitted_when_absent() {
    let props = InteractableProps { class_name: None, state: Some(CanvasDetailsState { charts: vec![] }) };
    assert_eq!(serde_json::to_value(&props).unwrap(), json!({"state": {"charts": []}}));
}

#[test]
fn definitions_serialize_camel_case() {
    let value = serde_json::to_value(canvas_details_definition()).unwrap();
    assert_eq!(value["componentName"], json!("CanvasDetails"));
    assert_eq!(
        value["propsSchema"]["properties"]["state"]["properties"]["charts"]["items"]["properties"]["type"]["enum"],
        json!(["bar", "line", "pie"])
    );
}
