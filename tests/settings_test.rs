// Settings files and their effect on assembly

use std::io::Write;

use notation_assembly::ir::PartBuilder;
use notation_assembly::models::{
    AssemblySettings, Event, NotationError, Note, Rational, TieState, TimeSignature,
};
use tempfile::NamedTempFile;

fn write_settings(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_settings_file() {
    let file = write_settings("max_denominator: 32\nrescale_measures: false\n");
    let settings = AssemblySettings::from_yaml_file(file.path()).unwrap();
    assert_eq!(settings.max_denominator, 32);
    assert!(!settings.rescale_measures);
    assert!(settings.close_beat_ties);
    assert!(settings.detect_tuplets);
}

#[test]
fn test_missing_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = AssemblySettings::from_yaml_file(dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(NotationError::Settings(_))));
}

#[test]
fn test_invalid_settings_rejected() {
    let file = write_settings("max_denominator: 0\n");
    assert!(matches!(
        AssemblySettings::from_yaml_file(file.path()),
        Err(NotationError::Settings(_))
    ));

    let file = write_settings("max_denominator: [1, 2]\n");
    assert!(matches!(
        AssemblySettings::from_yaml_file(file.path()),
        Err(NotationError::Settings(_))
    ));
}

#[test]
fn test_settings_change_assembly() {
    let events = vec![
        Event::Note(Note::new(Rational::new(1, 2), 4, 0).unwrap()),
        Event::Note(Note::new(Rational::from_integer(1), 4, 2).unwrap()),
    ];

    let file = write_settings("close_beat_ties: false\nrescale_measures: false\n");
    let settings = AssemblySettings::from_yaml_file(file.path()).unwrap();
    let part = PartBuilder::new(vec![TimeSignature::COMMON])
        .events(events.clone())
        .settings(settings)
        .build()
        .unwrap();
    let measure = &part.measures[0];
    assert_eq!(measure.rescale, 1);
    // the tail of a beat split keeps the pre-split state
    assert_eq!(measure.beats[1].events[0].tie(), TieState::None);
    assert_eq!(measure.beats[1].events[0].duration(), Rational::new(1, 2));

    let part = PartBuilder::new(vec![TimeSignature::COMMON])
        .events(events)
        .build()
        .unwrap();
    let measure = &part.measures[0];
    assert_eq!(measure.rescale, 2);
    assert_eq!(measure.beats[1].events[0].tie(), TieState::End);
    assert_eq!(measure.beats[1].events[0].duration(), Rational::from_integer(1));
}
