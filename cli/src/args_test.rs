use super::*;

#[test]
fn param_ref_splits_on_first_dot() {
    let r: ParamRef = "title.font.size".parse().unwrap();
    assert_eq!(r.module, "title");
    assert_eq!(r.param, "font.size");
}

#[test]
fn param_ref_rejects_missing_parts() {
    assert!("title".parse::<ParamRef>().is_err());
    assert!(".text".parse::<ParamRef>().is_err());
    assert!("title.".parse::<ParamRef>().is_err());
}

#[test]
fn assign_keeps_raw_value() {
    let a: ParamAssign = "glow.intensity= 7".parse().unwrap();
    assert_eq!(a.target, ParamRef { module: "glow".into(), param: "intensity".into() });
    assert_eq!(a.value, " 7");

    let a: ParamAssign = "title.text=a=b".parse().unwrap();
    assert_eq!(a.value, "a=b");
}

#[test]
fn assign_requires_equals() {
    let err = "glow.intensity".parse::<ParamAssign>().unwrap_err();
    assert!(err.contains("MOD.PARAM=VALUE"));
}

#[test]
fn selection_keeps_first_mention_order() {
    let mods = vec!["title".to_owned(), "glow".to_owned()];
    let refs: Vec<ParamRef> = ["overlay.picture", "glow.intensity", "overlay.opacity"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(selection(&mods, &refs), ["title", "glow", "overlay"]);
}
