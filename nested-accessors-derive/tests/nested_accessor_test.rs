use nested_accessors::{SerializedMap, nested_accessor};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Person {
    #[serde(default)]
    info: SerializedMap,
    #[serde(default)]
    things: SerializedMap,
    #[serde(default)]
    home: SerializedMap,
    #[serde(default)]
    bank: Value,
}

nested_accessor!(Person.info =>
    phone,
    [phone1, phone2],
    address: [street, city],
    snub: [snub_id],
    auth: facebook,
);

nested_accessor!(Person.things => balls: List);

nested_accessor!(Person.home => budget: { heating: [high, low], cooling: fan });

nested_accessor!(Person.bank => branch: [branch_id, account_number]);

#[test]
fn root_leaves_are_stringified() {
    let mut person = Person::default();
    assert_eq!(person.phone(), None);
    person.set_phone(123);
    assert_eq!(person.phone(), Some("123"));
    assert_eq!(person.info["phone"], json!("123"));
    assert!(person.info.keys().any(|key| key == "phone"));
}

#[test]
fn leaf_lists_declare_each_name() {
    let mut person = Person::default();
    person.info.insert("phone1".into(), json!("2365"));
    assert_eq!(person.phone1(), Some("2365"));
    person.set_phone2("9090");
    assert_eq!(person.info["phone2"], json!("9090"));
}

#[test]
fn first_level_group_is_a_live_map() {
    let mut person = Person::default();
    assert!(person.info.get("address").is_none());
    assert!(person.address().is_empty());
    person
        .address()
        .insert("city".into(), json!("Goteborg"));
    assert_eq!(person.address_city(), Some("Goteborg"));
    person.set_address_street("Storgatan");
    assert_eq!(
        person.info["address"],
        json!({"city": "Goteborg", "street": "Storgatan"})
    );
}

#[test]
fn single_leaf_groups() {
    let mut person = Person::default();
    assert!(person.snub().is_empty());
    person.set_snub_snub_id("Achaplan");
    assert_eq!(person.snub_snub_id(), Some("Achaplan"));

    assert!(person.auth().is_empty());
    person.set_auth_facebook("Achaplan");
    assert_eq!(person.auth_facebook(), Some("Achaplan"));
    assert_eq!(person.info["auth"], json!({"facebook": "Achaplan"}));
}

#[test]
fn list_group_appends_in_order() {
    let mut person = Person::default();
    assert!(person.balls().is_empty());
    person.balls().push("bob".into());
    person.balls().push("alice".into());
    assert_eq!(person.balls(), &vec![json!("bob"), json!("alice")]);
    assert_eq!(person.things["balls"], json!(["bob", "alice"]));
}

#[test]
fn wrong_kind_groups_are_repaired() {
    let mut person: Person = serde_json::from_value(json!({
        "things": {"balls": {"not": "a list"}},
        "info": {"address": ["not", "a", "map"]}
    }))
    .unwrap();
    assert!(person.balls().is_empty());
    assert_eq!(person.address_city(), None);
    assert_eq!(person.things["balls"], json!([]));
    assert_eq!(person.info["address"], json!({}));
}

#[test]
fn second_level_nesting() {
    let mut person = Person::default();
    assert!(person.budget_heating().is_empty());
    assert!(person.budget().contains_key("heating"));
    assert!(!person.budget().contains_key("cooling"));

    person.set_budget_heating_high("32 C");
    assert_eq!(person.budget_heating_high(), Some("32 C"));
    person.set_budget_heating_low("10 C");
    assert_eq!(person.budget_heating_low(), Some("10 C"));
    person.set_budget_cooling_fan("on");

    assert_eq!(
        person.home["budget"],
        json!({"heating": {"high": "32 C", "low": "10 C"}, "cooling": {"fan": "on"}})
    );
}

#[test]
fn value_fields_default_to_a_map() {
    let mut person = Person::default();
    assert_eq!(person.bank, Value::Null);
    assert_eq!(person.branch_branch_id(), None);
    person.set_branch_account_number(999);
    assert_eq!(person.branch_account_number(), Some("999"));
    assert_eq!(person.bank, json!({"branch": {"account_number": "999"}}));
}
