use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use xfade_engine::{EngineEvent, FadeCurve, FadeMode};
use xfade_sim::{run, RunOptions, SimConfig, SimError};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
fn loads_engine_settings_and_clips_from_toml() {
    let file = write_config(
        r#"
[engine]
fade_duration_ms = 1500
target_volume = 0.8
auto_crossfade_near_end = false
curve = "equal_power"

[[clips]]
id = "intro"
length_secs = 12.5

[[clips]]
id = "main"
"#,
    );

    let config = SimConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.engine.fade_duration_ms, 1500);
    assert_eq!(config.engine.target_volume, 0.8);
    assert!(!config.engine.auto_crossfade_near_end);
    assert_eq!(config.engine.curve, FadeCurve::EqualPower);
    assert_eq!(config.clips.len(), 2);
    assert_eq!(config.clips[0].length_secs, 12.5);
    assert_eq!(config.clips[1].length_secs, 60.0);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let result = SimConfig::load(Some(Path::new("/definitely/not/here/xfade.toml")));
    assert!(matches!(result, Err(SimError::Config(_))));
}

#[test]
fn invalid_clip_in_file_is_rejected() {
    let file = write_config(
        r#"
[[clips]]
id = "broken"
length_secs = -4.0
"#,
    );
    assert!(matches!(
        SimConfig::load(Some(file.path())),
        Err(SimError::Config(_))
    ));
}

#[test]
fn scheduled_advance_crossfades_to_next_clip() {
    let file = write_config(
        r#"
[engine]
fade_duration_ms = 1000

[[clips]]
id = "a"
length_secs = 5.0

[[clips]]
id = "b"
length_secs = 5.0
"#,
    );
    let config = SimConfig::load(Some(file.path())).unwrap();

    let summary = run(
        &config,
        &RunOptions {
            duration: Duration::from_secs(3),
            tick: Duration::from_millis(10),
            advance_every: Some(Duration::from_millis(1500)),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(summary.ticks, 300);
    assert_eq!(summary.final_index, 1);
    assert_eq!(summary.final_mode, FadeMode::None);
    assert_eq!(summary.final_volumes, (0.0, 1.0));

    let completed: Vec<FadeMode> = summary
        .events
        .iter()
        .filter_map(|event| match event {
            EngineEvent::FadeCompleted { mode, .. } => Some(*mode),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![FadeMode::FadeIn, FadeMode::CrossFade]);
}

#[test]
fn looping_clip_restarts_before_it_ends() {
    let file = write_config(
        r#"
[engine]
fade_duration_ms = 500

[[clips]]
id = "loop"
length_secs = 2.0
"#,
    );
    let config = SimConfig::load(Some(file.path())).unwrap();

    let summary = run(
        &config,
        &RunOptions {
            duration: Duration::from_secs(5),
            tick: Duration::from_millis(10),
            ..Default::default()
        },
    )
    .unwrap();

    let restarts = summary
        .events
        .iter()
        .filter(|event| matches!(event, EngineEvent::LoopRestarted { .. }))
        .count();
    assert!(restarts >= 2, "expected repeated loop restarts, got {}", restarts);
    assert_eq!(summary.final_index, 0);
}

#[test]
fn empty_config_runs_silently() {
    let summary = run(
        &SimConfig::default(),
        &RunOptions {
            duration: Duration::from_secs(1),
            ..Default::default()
        },
    )
    .unwrap();

    assert!(summary.events.is_empty());
    assert_eq!(summary.final_volumes, (0.0, 0.0));
}
