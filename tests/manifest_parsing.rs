//! Manifest parser integration tests: reserved names, legacy conversion, and
//! JSON/YAML round-trips exercised through the public API only.

use janus::manifest::ManifestParser;

#[test]
fn reserved_name_in_json_manifest_is_rejected() {
    let json = r#"{
        "version": "1.0.0",
        "requests": {
            "manifest": {
                "response": { "type": "object" }
            }
        }
    }"#;
    let err = ManifestParser::from_json(json).unwrap_err();
    assert_eq!(err.code, -32013);
}

#[test]
fn yaml_manifest_parses_and_validates() {
    let yaml = "
version: 1.0.0
requests:
  greet:
    description: says hello
    args:
      name:
        type: string
        required: true
    response:
      type: object
      properties:
        message:
          type: string
";
    let manifest = ManifestParser::from_yaml(yaml).unwrap();
    assert!(manifest.requests.contains_key("greet"));
}

#[test]
fn legacy_channel_document_converts_and_stamps_channel() {
    let legacy = r#"{
        "version": "1.0.0",
        "channels": {
            "inventory": {
                "commands": {
                    "list_items": {
                        "description": "lists inventory items",
                        "response": { "type": "array", "items": { "type": "string" } }
                    }
                }
            }
        }
    }"#;
    let manifest = ManifestParser::from_legacy_channels_json(legacy).unwrap();
    let request = manifest.requests.get("list_items").unwrap();
    assert_eq!(request.channel.as_deref(), Some("inventory"));
}

#[test]
fn manifest_json_round_trips_through_to_json_and_from_json() {
    let yaml = "
version: 2.0.0
name: demo
requests:
  ping_like:
    description: behaves like ping
    response:
      type: boolean
";
    let manifest = ManifestParser::from_yaml(yaml).unwrap();
    let json = ManifestParser::to_json(&manifest).unwrap();
    let reparsed = ManifestParser::from_json(&json).unwrap();
    assert_eq!(manifest, reparsed);
}
