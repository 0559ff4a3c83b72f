use crate::service::{ParseVNodeIdError, VNodeId, route_key};

#[test]
fn names_round_trip_through_text() {
    for id in [
        VNodeId::Root,
        VNodeId::Start(3),
        VNodeId::Gateway(12),
        VNodeId::Cache(1),
        VNodeId::Cdn(2),
    ] {
        let text = id.to_string();
        assert_eq!(text.parse::<VNodeId>(), Ok(id), "{text}");
    }
    assert_eq!(VNodeId::Root.to_string(), "S0");
    assert_eq!(VNodeId::Cache(4).to_string(), "VCDN4");
}

#[test]
fn malformed_names_are_rejected() {
    for raw in ["", "S", "VHG0", "CDN0", "X1", "VHGx", "S-1"] {
        assert_eq!(
            raw.parse::<VNodeId>(),
            Err(ParseVNodeIdError(raw.to_string())),
            "{raw:?}"
        );
    }
}

#[test]
fn json_uses_textual_ids() {
    let v = serde_json::to_value(VNodeId::Gateway(2)).expect("serialize");
    assert_eq!(v, serde_json::json!("VHG2"));
    let back: VNodeId = serde_json::from_str("\"CDN3\"").expect("deserialize");
    assert_eq!(back, VNodeId::Cdn(3));
    assert!(serde_json::from_str::<VNodeId>("\"nope\"").is_err());
}

#[test]
fn route_key_joins_names() {
    assert_eq!(
        route_key(&[VNodeId::Start(1), VNodeId::Gateway(1), VNodeId::Cache(2)]),
        "S1_VHG1_VCDN2"
    );
}
