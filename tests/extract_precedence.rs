use deploy_artifacts::{
    extract::{extract, extract_with_source, CandidateSource, ExtractError},
    report::ArtifactMap,
};
use serde_json::json;

fn map(pairs: &[(&str, &str)]) -> ArtifactMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn top_level_artifacts() {
    let report = json!({"artifacts": {"a.txt": "hello"}});
    assert_eq!(extract(&report).unwrap(), map(&[("a.txt", "hello")]));
}

#[test]
fn result_artifacts() {
    let report = json!({"result": {"artifacts": {"b.txt": "x"}}});
    assert_eq!(extract(&report).unwrap(), map(&[("b.txt", "x")]));
}

#[test]
fn result_artifacts_beat_top_level() {
    let report = json!({
        "artifacts": {"a": "1"},
        "result": {"artifacts": {"b": "2"}}
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.artifacts, map(&[("b", "2")]));
    assert_eq!(got.source, CandidateSource::ResultArtifacts);
    assert_eq!(got.candidates, 2);
}

#[test]
fn string_log_with_surrounding_junk() {
    let report = json!({
        "result": {"logs": ["prefix junk {\"artifacts\":{\"c.txt\":\"y\"}} trailing"]}
    });
    assert_eq!(extract(&report).unwrap(), map(&[("c.txt", "y")]));
}

#[test]
fn message_without_braces_is_not_found() {
    let report = json!({"result": {"logs": [{"message": "no braces here"}]}});
    assert_eq!(extract(&report), Err(ExtractError::NotFound));
}

#[test]
fn log_candidate_beats_top_level() {
    let report = json!({
        "artifacts": {"a": "1"},
        "result": {"logs": [{"message": "{\"artifacts\":{\"b\":\"2\"}}"}]}
    });
    assert_eq!(extract(&report).unwrap(), map(&[("b", "2")]));
}

#[test]
fn log_candidate_beats_result_artifacts() {
    let report = json!({
        "result": {
            "artifacts": {"r": "1"},
            "logs": ["generated {\"artifacts\":{\"l\":\"2\"}}"]
        }
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.artifacts, map(&[("l", "2")]));
    assert_eq!(got.source, CandidateSource::Log { index: 0 });
}

#[test]
fn last_log_entry_wins() {
    let report = json!({
        "result": {"logs": [
            {"message": "first {\"artifacts\":{\"one\":\"1\"}}"},
            "noise",
            "second {\"artifacts\":{\"two\":\"2\"}}",
            {"message": "broken {\"artifacts\":"},
            {"message": "no artifacts here {\"status\":\"ok\"}"}
        ]}
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.artifacts, map(&[("two", "2")]));
    assert_eq!(got.source, CandidateSource::Log { index: 2 });
    assert_eq!(got.candidates, 2);
}

#[test]
fn candidates_are_not_merged() {
    let report = json!({
        "artifacts": {"keep-out.txt": "a"},
        "result": {"logs": ["{\"artifacts\":{\"only.txt\":\"b\"}}"]}
    });
    let got = extract(&report).unwrap();
    assert_eq!(got.len(), 1);
    assert!(got.get("keep-out.txt").is_none());
}

#[test]
fn non_object_result_artifacts_is_not_replaced_by_earlier_map() {
    let report = json!({"artifacts": {"a": "1"}, "result": {"artifacts": "oops"}});
    assert_eq!(
        extract_with_source(&report),
        Err(ExtractError::NotAMap {
            from: CandidateSource::ResultArtifacts,
            kind: "string",
        })
    );
}

#[test]
fn non_object_log_artifacts_still_wins() {
    let report = json!({
        "artifacts": {"a": "1"},
        "result": {"logs": ["{\"artifacts\":[\"x\"]}"]}
    });
    assert_eq!(
        extract_with_source(&report),
        Err(ExtractError::NotAMap {
            from: CandidateSource::Log { index: 0 },
            kind: "array",
        })
    );
}

#[test]
fn absent_artifacts_values_are_not_candidates() {
    let report = json!({
        "artifacts": {"a": "1"},
        "result": {
            "artifacts": 0,
            "logs": ["{\"artifacts\":null}", "{\"artifacts\":\"\"}"]
        }
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.source, CandidateSource::Artifacts);
    assert_eq!(got.candidates, 1);
}

#[test]
fn log_entries_without_usable_text_are_skipped() {
    let report = json!({
        "result": {
            "artifacts": {"r.txt": "kept"},
            "logs": [
                {"message": 42},
                {"message": {"artifacts": {"x": "1"}}},
                {"message": ""},
                {"message": false},
                {"level": "info", "artifacts": {"y": "2"}},
                7,
                null,
                ["{\"artifacts\":{\"z\":\"3\"}}"]
            ]
        }
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.artifacts, map(&[("r.txt", "kept")]));
    assert_eq!(got.source, CandidateSource::ResultArtifacts);
    assert_eq!(got.candidates, 1);
}

#[test]
fn record_with_string_message_is_scanned() {
    let report = json!({
        "result": {"logs": [
            {"message": "ignored"},
            {"level": "info", "message": "ok {\"artifacts\":{\"m.txt\":\"v\"}}"}
        ]}
    });
    let got = extract_with_source(&report).unwrap();
    assert_eq!(got.artifacts, map(&[("m.txt", "v")]));
    assert_eq!(got.source, CandidateSource::Log { index: 1 });
}

#[test]
fn unparseable_fragments_fall_back_to_direct_fields() {
    let report = json!({
        "artifacts": {"a.txt": "hello"},
        "result": {"logs": ["oops {not json", {"message": "{\"artifacts\": [1,"}]}
    });
    assert_eq!(extract(&report).unwrap(), map(&[("a.txt", "hello")]));
}

#[test]
fn nothing_anywhere_is_not_found() {
    for report in [
        json!({}),
        json!({"result": {}}),
        json!({"result": {"logs": []}}),
        json!({"artifacts": null, "result": {"artifacts": false, "logs": [""]}}),
        json!([1, 2, 3]),
    ] {
        assert_eq!(extract(&report), Err(ExtractError::NotFound), "{report}");
    }
}

#[test]
fn not_found_message() {
    assert_eq!(
        ExtractError::NotFound.to_string(),
        "No artifact map found in generate output."
    );
}

#[test]
fn content_values_pass_through_untouched() {
    let report = json!({"artifacts": {"n.json": 5, "s.txt": "line\r\n"}});
    let got = extract(&report).unwrap();
    assert_eq!(got.get("n.json"), Some(&json!(5)));
    assert_eq!(got.get("s.txt"), Some(&json!("line\r\n")));
}

#[test]
fn extraction_is_repeatable() {
    let report = json!({
        "artifacts": {"a": "1"},
        "result": {"logs": ["{\"artifacts\":{\"b\":\"2\"}}"]}
    });
    let first = extract_with_source(&report).unwrap();
    let second = extract_with_source(&report).unwrap();
    assert_eq!(first, second);
}
