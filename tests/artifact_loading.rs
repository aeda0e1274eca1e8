use emotion_service::{
    Error,
    artifacts::{Manifest, load_or_unavailable, load_pipeline},
    pipeline::Vocabulary,
};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

mod common;

use common::test_utils::{
    ARTIFACT_VERSION, ArtifactOptions, LABELS, create_artifacts_dir, create_model_config,
    numbered_text, write_artifacts,
};

fn artifacts_with(options: ArtifactOptions) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_artifacts(dir.path(), &options);
    dir
}

fn edit_manifest(dir: &Path, edit: impl FnOnce(&mut Value)) {
    let path = dir.join("manifest.json");
    let mut manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    edit(&mut manifest);
    std::fs::write(&path, manifest.to_string()).unwrap();
}

#[test]
fn test_manifest_round_trips_from_disk() {
    let dir = create_artifacts_dir();
    let manifest = Manifest::from_path(dir.path().join("manifest.json")).unwrap();

    assert_eq!(manifest.version, ARTIFACT_VERSION);
    assert_eq!(manifest.sequence_length, 100);
    assert_eq!(manifest.model.vocab_size, 400);
    assert!(manifest.model.file.sha256.is_some());
    assert_eq!(manifest.labels.path.to_str(), Some("labels.json"));
}

#[test]
fn test_load_pipeline_with_checksums() {
    let dir = create_artifacts_dir();
    let pipeline = load_pipeline(&create_model_config(dir.path())).unwrap();

    let status = pipeline.status();
    assert!(status.model_loaded);
    assert_eq!(status.model_version.as_deref(), Some(ARTIFACT_VERSION));
    assert_eq!(status.labels, LABELS.to_vec());
}

#[test]
fn test_load_pipeline_without_checksums() {
    let dir = artifacts_with(ArtifactOptions {
        with_checksums: false,
        ..ArtifactOptions::default()
    });
    assert!(load_pipeline(&create_model_config(dir.path())).is_ok());
}

#[test]
fn test_tampered_tokenizer_fails_checksum() {
    let dir = create_artifacts_dir();
    let path = dir.path().join("tokenizer.json");
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push('\n');
    std::fs::write(&path, contents).unwrap();

    let err = load_pipeline(&create_model_config(dir.path())).unwrap_err();
    match err {
        Error::ChecksumMismatch { path: reported, .. } => {
            assert!(reported.ends_with("tokenizer.json"));
        }
        other => panic!("expected checksum mismatch, got {other:?}"),
    }
}

#[test]
fn test_expected_version_guard() {
    let dir = create_artifacts_dir();
    let mut config = create_model_config(dir.path());

    config.expected_version = Some(ARTIFACT_VERSION.to_string());
    assert!(load_pipeline(&config).is_ok());

    config.expected_version = Some("2023-01-01".to_string());
    assert!(matches!(load_pipeline(&config), Err(Error::Config(_))));
}

#[test]
fn test_missing_weights_file() {
    let dir = create_artifacts_dir();
    std::fs::remove_file(dir.path().join("emotion_model.safetensors")).unwrap();

    assert!(matches!(
        load_pipeline(&create_model_config(dir.path())),
        Err(Error::Artifact(_))
    ));
}

#[test]
fn test_missing_manifest() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_pipeline(&create_model_config(dir.path())),
        Err(Error::Artifact(_))
    ));
}

#[test]
fn test_tokenizer_wider_than_embedding_is_rejected() {
    let dir = artifacts_with(ArtifactOptions {
        with_checksums: false,
        manifest_vocab_size: 200,
        ..ArtifactOptions::default()
    });

    assert!(matches!(
        load_pipeline(&create_model_config(dir.path())),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_num_words_bounds_the_tokenizer() {
    // Only indices below 200 are emitted, so a 200-row embedding suffices.
    let dir = artifacts_with(ArtifactOptions {
        with_checksums: false,
        num_words: Some(200),
        manifest_vocab_size: 200,
        ..ArtifactOptions::default()
    });

    let vocabulary = Vocabulary::from_path(dir.path().join("tokenizer.json")).unwrap();
    assert_eq!(vocabulary.max_emitted_index(), 199);

    let pipeline = load_pipeline(&create_model_config(dir.path())).unwrap();
    assert!(pipeline.is_loaded());

    // w250 sits at index 260 and is dropped rather than indexing past the embedding.
    let prediction = pipeline.predict(&numbered_text(180, 250)).unwrap();
    assert_eq!(prediction.all_emotions.len(), LABELS.len());
}

#[test]
fn test_label_count_must_match_dense_layer() {
    let dir = artifacts_with(ArtifactOptions {
        with_checksums: false,
        ..ArtifactOptions::default()
    });
    std::fs::write(
        dir.path().join("labels.json"),
        r#"["anger", "fear", "joy", "love", "sadness"]"#,
    )
    .unwrap();

    assert!(matches!(
        load_pipeline(&create_model_config(dir.path())),
        Err(Error::Artifact(_))
    ));
}

#[test]
fn test_zero_sequence_length_is_rejected() {
    let dir = create_artifacts_dir();
    edit_manifest(dir.path(), |m| m["sequence_length"] = 0.into());

    assert!(matches!(
        Manifest::from_path(dir.path().join("manifest.json")),
        Err(Error::Artifact(_))
    ));
}

#[test]
fn test_load_or_unavailable_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = load_or_unavailable(&create_model_config(dir.path())).unwrap();

    assert!(!pipeline.is_loaded());
    assert!(matches!(
        pipeline.predict("I am so happy today"),
        Err(Error::ModelUnavailable(_))
    ));
    assert!(pipeline.unavailable_reason().is_some());
}

#[test]
fn test_load_or_unavailable_respects_require_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_model_config(dir.path());
    config.require_loaded = true;

    assert!(load_or_unavailable(&config).is_err());
}
