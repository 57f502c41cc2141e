use datasheets::config::AppConfig;
use datasheets::server::routes::route_request;
use datasheets::Dashboard;

fn dashboard() -> Dashboard {
    Dashboard::open(AppConfig::default()).expect("bundled data should load")
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("response should be valid json")
}

#[test]
fn health_endpoint_returns_ok_json() {
    let response = route_request(&dashboard(), "GET", "/api/health", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "application/json");
    let payload = json(&response.body_text());
    assert_eq!(payload["status"], "ok");
    assert!(payload["loaded_at"].as_str().is_some());
}

#[test]
fn index_page_is_html() {
    let response = route_request(&dashboard(), "GET", "/", "");
    assert_eq!(response.status_code, 200);
    assert!(response.content_type.starts_with("text/html"));
    assert!(response.body_text().contains("Select Faction"));
}

#[test]
fn factions_endpoint_lists_distinct_factions() {
    let response = route_request(&dashboard(), "GET", "/api/factions", "");
    let payload = json(&response.body_text());
    assert_eq!(
        payload["factions"],
        serde_json::json!(["space marines", "orks", "necrons"])
    );
}

#[test]
fn units_endpoint_filters_by_encoded_faction() {
    let response = route_request(&dashboard(), "GET", "/api/units?faction=space%20marines", "");
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    assert_eq!(
        payload["units"],
        serde_json::json!(["Intercessor Squad", "Terminator Squad"])
    );
}

#[test]
fn units_endpoint_requires_faction() {
    let response = route_request(&dashboard(), "GET", "/api/units", "");
    assert_eq!(response.status_code, 400);
    assert!(response.body_text().contains("faction"));
}

#[test]
fn unit_endpoint_returns_datasheet_weapons_and_pages() {
    let response = route_request(&dashboard(), "GET", "/api/units/Intercessor%20Squad", "");
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    assert_eq!(payload["datasheet"]["faction"], "space marines");
    assert_eq!(payload["weapons"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["weapons"][0]["WEAPONS"], "Bolt rifle");
    assert_eq!(payload["images"], serde_json::json!([1, 2]));
}

#[test]
fn unknown_unit_is_not_found() {
    let response = route_request(&dashboard(), "GET", "/api/units/Grots", "");
    assert_eq!(response.status_code, 404);
}

#[test]
fn keywords_endpoint_scopes_to_selected_units() {
    let d = dashboard();
    let all = json(&route_request(&d, "GET", "/api/keywords", "").body_text());
    assert_eq!(all["keywords"].as_array().map(Vec::len), Some(d.tables.keywords.len()));

    let scoped = json(
        &route_request(&d, "GET", "/api/keywords?units=Boyz,Necron%20Warriors", "").body_text(),
    );
    let names: Vec<&str> = scoped["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|k| k["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Lethal Hits", "Pistol", "Rapid Fire"]);
}

#[test]
fn image_endpoint_serves_decoded_bytes() {
    let d = dashboard();
    let response = route_request(&d, "GET", "/api/images/Intercessor%20Squad/2", "");
    assert_eq!(response.status_code, 200);
    assert_eq!(response.content_type, "image/png");
    assert!(response.body.starts_with(b"\x89PNG"));

    let missing = route_request(&d, "GET", "/api/images/Lootas/1", "");
    assert_eq!(missing.status_code, 404);
}

#[test]
fn calc_endpoint_matches_closed_form() {
    let body = r#"{"attacks":10,"ballistic_skill":3,"hit_modifier":0,"save_roll":3}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    assert_eq!(payload["effective_hit_roll"], 3);
    assert_eq!(payload["expected_hits"]["4+"], 1.11);
    assert_eq!(payload["expected_hits"].as_object().map(|m| m.len()), Some(6));
}

#[test]
fn calc_endpoint_accepts_dice_tokens_and_missing_skill() {
    let body = r#"{"attacks":"D6","save_roll":4}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    assert_eq!(payload["expected_attacks"], 3.0);
    assert_eq!(payload["effective_hit_roll"], 1);
    // 3 * 1 * 1 * 1/2
    assert_eq!(payload["expected_hits"]["1+"], 1.5);
}

#[test]
fn calc_endpoint_rejects_bad_fields() {
    let body = r#"{"attacks":"N/A","ballistic_skill":3,"hit_modifier":2,"save_roll":9}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc", body);
    assert_eq!(response.status_code, 400);
    let payload = json(&response.body_text());
    let fields: Vec<&str> = payload["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["hit_modifier", "save_roll", "attacks"]);
}

#[test]
fn calc_endpoint_reports_out_of_domain_hit_roll() {
    let body = r#"{"attacks":4,"ballistic_skill":6,"hit_modifier":-1,"save_roll":3}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc", body);
    assert_eq!(response.status_code, 400);
    assert!(response.body_text().contains("effective_hit_roll"));
}

#[test]
fn calc_endpoint_rejects_invalid_json() {
    let response = route_request(&dashboard(), "POST", "/api/calc", "{bad json}");
    assert_eq!(response.status_code, 400);
    assert!(response.body_text().contains("Invalid request body"));
}

#[test]
fn unit_calc_endpoint_covers_every_weapon() {
    let body = r#"{"unit":"Intercessor Squad","save_roll":3}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc/unit", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    let weapons = payload["weapons"].as_array().unwrap();
    assert_eq!(weapons.len(), 2);
    assert_eq!(weapons[0]["weapon"], "Bolt rifle");
    assert_eq!(weapons[0]["expected_hits"]["4+"], 0.22);
    assert_eq!(weapons[1]["weapon"], "Close combat weapon");
    assert_eq!(weapons[1]["expected_hits"]["4+"], 0.5);
}

#[test]
fn unit_calc_endpoint_clamps_inputs() {
    let body = r#"{"unit":"Lootas","save_roll":12,"hit_modifier":-5}"#;
    let response = route_request(&dashboard(), "POST", "/api/calc/unit", body);
    assert_eq!(response.status_code, 200);
    let payload = json(&response.body_text());
    assert_eq!(payload["save_roll"], 6);
    assert_eq!(payload["hit_modifier"], -1);
}

#[test]
fn unit_calc_endpoint_unknown_unit_is_not_found() {
    let response = route_request(&dashboard(), "POST", "/api/calc/unit", r#"{"unit":"Grots"}"#);
    assert_eq!(response.status_code, 404);
}

#[test]
fn unknown_route_is_not_found() {
    let response = route_request(&dashboard(), "DELETE", "/api/units", "");
    assert_eq!(response.status_code, 404);
}
