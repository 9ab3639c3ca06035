use std::collections::BTreeMap;
use std::path::PathBuf;

use kdl_edit::{AccessError, Editable, FieldKind, FieldValue};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Color {
    r: u8,
    g: u8,
    b: u8,
}

#[derive(Debug, Editable)]
struct Inner {
    #[edit(rename = "max-volume", default = 11)]
    max_volume: i32,
}

#[derive(Debug, Default, Serialize, Deserialize, Editable)]
#[edit(name = "Everything")]
struct Everything {
    #[edit(desc = "Flag", comment = "first", comment = "second")]
    flag: bool,
    count: i32,
    ratio: f32,
    precise: f64,
    #[edit(readonly)]
    build: i32,
    #[edit(exclude)]
    hidden: bool,
    #[serde(skip)]
    #[edit(skip)]
    scratch: Vec<u8>,
    name: String,
    path: PathBuf,
    tags: Vec<String>,
    limits: BTreeMap<String, i64>,
    small: u8,
    maybe: Option<i32>,
    #[edit(opaque)]
    color: Color,
    #[serde(skip)]
    inner: Inner,
    #[serde(rename = "// explains things")]
    _comment_flag0: String,
    r#type: i32,
}

impl Default for Inner2 {
    fn default() -> Self {
        Inner2 { depth: 1 }
    }
}

#[derive(Debug, Editable)]
struct Inner2 {
    depth: i32,
}

#[derive(Debug, Default, Editable)]
struct Wrapper {
    #[edit(nested)]
    inner: Inner2,
}

impl Default for Inner {
    fn default() -> Self {
        Inner { max_volume: 11 }
    }
}

fn kinds(config: &dyn Editable) -> Vec<(&'static str, FieldKind)> {
    config.fields().iter().map(|f| (f.name, f.kind)).collect()
}

#[test]
fn descriptors_follow_declaration_order() {
    let config = Everything::default();
    assert_eq!(config.type_name(), "Everything");
    assert_eq!(
        kinds(&config),
        [
            ("flag", FieldKind::Boolean),
            ("count", FieldKind::Integer32),
            ("ratio", FieldKind::Float32),
            ("precise", FieldKind::Float64),
            ("build", FieldKind::Integer32),
            ("hidden", FieldKind::Boolean),
            ("name", FieldKind::Opaque),
            ("path", FieldKind::Opaque),
            ("tags", FieldKind::Opaque),
            ("limits", FieldKind::Opaque),
            ("small", FieldKind::Opaque),
            ("maybe", FieldKind::Opaque),
            ("color", FieldKind::Opaque),
            ("inner", FieldKind::Nested),
            ("_comment_flag0", FieldKind::Opaque),
            ("type", FieldKind::Integer32),
        ]
    );
}

#[test]
fn attributes_land_in_descriptors() {
    let config = Everything::default();
    let config: &dyn Editable = &config;

    let flag = config.field("flag").unwrap();
    assert_eq!(flag.description, Some("Flag"));
    assert_eq!(flag.comments, ["first", "second"]);
    assert_eq!(flag.type_name, "bool");

    let build = config.field("build").unwrap();
    assert!(build.readonly && build.excluded);
    assert!(config.field("hidden").unwrap().excluded);
    assert!(config.field("scratch").is_none());

    assert!(config.field("name").unwrap().text);
    assert!(config.field("path").unwrap().text);
    let tags = config.field("tags").unwrap();
    assert!(tags.sequence && !tags.text);
    assert_eq!(tags.type_name, "Vec<String>");
    assert_eq!(config.field("limits").unwrap().type_name, "BTreeMap<String, i64>");

    let companion = config.field("_comment_flag0").unwrap();
    assert_eq!(companion.serialized_comment, Some("explains things"));

    let inner = config.nested("inner").unwrap();
    let max = inner.field("max-volume").unwrap();
    assert_eq!(max.default_option, Some("11"));
}

#[test]
fn scalar_accessors_convert_strictly() {
    let mut config = Everything::default();
    config.set("flag", FieldValue::Bool(true)).unwrap();
    config.set("count", FieldValue::Int(-4)).unwrap();
    config.set("precise", FieldValue::Int(2)).unwrap();
    config.set("type", FieldValue::Int(5)).unwrap();
    assert!(config.flag);
    assert_eq!(config.count, -4);
    assert_eq!(config.precise, 2.0);
    assert_eq!(config.r#type, 5);
    assert_eq!(config.get("ratio"), Ok(FieldValue::Float(0.0)));

    assert!(matches!(
        config.set("flag", FieldValue::Int(1)),
        Err(AccessError::WrongKind { .. })
    ));
    assert!(config.set("missing", FieldValue::Bool(true)).is_err());
}

#[test]
fn readonly_fields_read_but_never_write() {
    let mut config = Everything {
        build: 7,
        ..Default::default()
    };
    assert_eq!(config.get("build"), Ok(FieldValue::Int(7)));
    assert!(matches!(
        config.set("build", FieldValue::Int(8)),
        Err(AccessError::ReadOnly { .. })
    ));
    assert_eq!(config.build, 7);
}

#[test]
fn opaque_fields_round_trip_through_json() {
    let mut config = Everything::default();
    let color = Color { r: 1, g: 2, b: 3 };
    config
        .set("color", FieldValue::from_serialize(&color).unwrap())
        .unwrap();
    assert_eq!(config.color, color);

    config
        .set("tags", FieldValue::from_serialize(&["a", "b"]).unwrap())
        .unwrap();
    assert_eq!(config.tags, ["a", "b"]);
    assert_eq!(config.get("name").unwrap().to_string(), "");

    let err = config
        .set("small", FieldValue::from_serialize(&300).unwrap())
        .unwrap_err();
    assert!(matches!(err, AccessError::Convert { .. }));
    assert_eq!(config.small, 0);
}

#[test]
fn nested_fields_are_objects_not_values() {
    let mut config = Wrapper::default();
    assert!(matches!(config.get("inner"), Err(AccessError::NotScalar { .. })));
    assert_eq!(kinds(&config), [("inner", FieldKind::Nested)]);

    let inner = config.nested_mut("inner").unwrap();
    inner.set("depth", FieldValue::Int(4)).unwrap();
    assert_eq!(config.inner.depth, 4);
    assert!(config.nested("depth").is_none());
    assert!((&config as &dyn Editable).downcast_ref::<Wrapper>().is_some());
}
