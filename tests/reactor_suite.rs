//! End-to-end reactor behaviour: lifecycle, fallbacks, loading, playback.

use std::f32::consts::PI;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;
use meshpulse::model::{ModelLoader, ObjSource};
use meshpulse::params::{AnalyserConfig, GridShape, ParameterHandle, Parameters, ReactionMode};
use meshpulse::reactive::TargetState;
use meshpulse::spectrum::{ConstantSpectrum, SilentSource, SpectrumSource, WavSource};
use meshpulse::{FrameOutcome, ModelEvent, Reactor};

const CUBE_OBJ: &str = "\
o cube
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 8 7
f 4 7 3
f 2 3 7
f 2 7 6
f 1 5 8
f 1 8 4
";

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn reactor_with_loader(params: Parameters) -> Reactor {
    Reactor::new(GridShape::default(), ParameterHandle::new(params))
        .with_loader(ModelLoader::new(Arc::new(ObjSource)))
}

fn tick_until_model_event(reactor: &mut Reactor, source: &mut dyn SpectrumSource) -> ModelEvent {
    for _ in 0..500 {
        if let Some(event) = reactor.tick(source).model_event {
            return event;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("model load never completed");
}

#[test]
fn test_full_spectrum_lifts_flat_grid_by_amplitude() {
    let params = Parameters {
        amplitude: 5.0,
        decay: 0.95,
        reaction_mode: ReactionMode::Displacement,
        ..Parameters::default()
    };
    let mut reactor = Reactor::new(GridShape::default(), ParameterHandle::new(params));
    let mut source = ConstantSpectrum::filled(512, 255);

    let report = reactor.tick(&mut source);
    assert!(matches!(report.outcome, FrameOutcome::Deformed(_)));

    let grid = &reactor.targets().targets()[0];
    for (vertex, original) in grid.base().positions().iter().enumerate() {
        let live = grid.live().position(vertex);
        assert!((live.y - original.y - 5.0).abs() < 1e-6);
    }
}

#[test]
fn test_background_obj_load_switches_to_model() {
    let obj = write_temp(CUBE_OBJ, ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 128);

    reactor.request_model(obj.path()).unwrap();
    let event = tick_until_model_event(&mut reactor, &mut source);

    match event {
        ModelEvent::Loaded {
            sub_meshes,
            vertices,
            ..
        } => {
            assert_eq!(sub_meshes, 1);
            assert_eq!(vertices, 8);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(reactor.targets().state(), TargetState::ModelActive);

    // Cube normals were estimated and point outward
    let cube = &reactor.targets().targets()[0];
    for (position, normal) in cube.base().positions().iter().zip(cube.base().normals()) {
        assert!(position.dot(*normal) > 0.0);
    }
}

#[test]
fn test_empty_obj_leaves_grid_untouched() {
    let obj = write_temp("# lights only in the original scene\n", ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 200);

    reactor.tick(&mut source);
    let decay = reactor.targets().targets()[0].decay().clone();

    reactor.request_model(obj.path()).unwrap();
    // Spectrum frozen at zero so the grid only changes if state is lost
    let mut frozen = ConstantSpectrum::filled(512, 0);
    loop {
        let report = reactor.tick(&mut frozen);
        if let Some(event) = report.model_event {
            assert!(matches!(
                event,
                ModelEvent::Rejected {
                    state: TargetState::GridActive,
                    ..
                }
            ));
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(reactor.targets().state(), TargetState::GridActive);
    assert_eq!(reactor.targets().vertex_count(), 121);
    let grid = &reactor.targets().targets()[0];
    assert_eq!(grid.decay().len(), decay.len());
    // Frames ticked during the load only decayed the existing state
    assert!(grid.decay().peak() <= decay.peak());
    assert!(grid.decay().peak() > 0.0);
}

#[test]
fn test_failed_load_preserves_checksum() {
    let obj = write_temp("# nothing renderable\n", ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 200);
    reactor.tick(&mut source);
    let checksum = reactor.targets().position_checksum();
    let decay = reactor.targets().targets()[0].decay().clone();

    reactor.request_model(obj.path()).unwrap();
    // A silent source never touches geometry, so only the load can
    let mut silent = SilentSource { bin_count: 512 };
    let event = tick_until_model_event(&mut reactor, &mut silent);

    assert!(matches!(event, ModelEvent::Rejected { .. }));
    assert_eq!(reactor.targets().position_checksum(), checksum);
    assert_eq!(reactor.targets().targets()[0].decay(), &decay);
}

#[test]
fn test_second_request_cancels_first() {
    let cube = write_temp(CUBE_OBJ, ".obj");
    let empty = write_temp("# empty\n", ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 64);

    reactor.request_model(cube.path()).unwrap();
    reactor.request_model(empty.path()).unwrap();

    let event = tick_until_model_event(&mut reactor, &mut source);
    assert!(matches!(event, ModelEvent::Rejected { .. }));

    // The cube result must never be published afterwards
    for _ in 0..40 {
        let report = reactor.tick(&mut source);
        assert!(report.model_event.is_none());
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(reactor.targets().state(), TargetState::GridActive);
}

#[test]
fn test_unload_restores_grid() {
    let obj = write_temp(CUBE_OBJ, ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 255);
    reactor.request_model(obj.path()).unwrap();
    tick_until_model_event(&mut reactor, &mut source);

    reactor.unload_model();
    assert_eq!(reactor.targets().state(), TargetState::GridActive);
    assert_eq!(reactor.targets().targets()[0].decay().peak(), 0.0);
}

#[test]
fn test_wav_playback_drives_grid() {
    let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
    // Centre of bin 40, the band read by the second grid row
    let frequency = 40.0 * 44100.0 / 1024.0;
    for i in 0..44100 {
        let t = i as f32 / 44100.0;
        let sample = (2.0 * PI * frequency * t).sin() * 0.8;
        writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let mut source = WavSource::open(file.path(), AnalyserConfig::default()).unwrap();
    assert_eq!(source.frequency_bin_count(), 512);

    let mut reactor = Reactor::new(GridShape::default(), ParameterHandle::default());
    let mut deformed = 0;
    while !source.is_exhausted() {
        if let FrameOutcome::Deformed(_) = reactor.tick(&mut source).outcome {
            deformed += 1;
        }
    }

    // One second at 60 fps, minus the frame spent filling the first window
    assert_eq!(deformed, 59);
    let grid = &reactor.targets().targets()[0];

    // Row 1 (vertices 11..22) reads bin 40
    for vertex in 11..22 {
        let offset = grid.live().position(vertex) - grid.base().positions()[vertex];
        assert!(offset.dot(Vec3::Y) > 4.0, "vertex {} offset {:?}", vertex, offset);
    }
}

#[test]
fn test_two_object_obj_deforms_each_sub_mesh() {
    let obj = write_temp(
        "\
o left
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
o right
v 2 0 0
v 3 0 0
v 2 1 0
vn 0 0 1
f 4//1 5//1 6//1
",
        ".obj",
    );
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 255);
    reactor.request_model(obj.path()).unwrap();
    let event = tick_until_model_event(&mut reactor, &mut source);
    assert!(matches!(event, ModelEvent::Loaded { sub_meshes: 2, .. }));

    let targets = reactor.targets().targets();
    assert_eq!(targets.len(), 2);
    for target in targets {
        assert_eq!(target.decay().len(), target.vertex_count());
        for (vertex, original) in target.base().positions().iter().enumerate() {
            let offset = target.live().position(vertex) - *original;
            assert!((offset - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        }
    }
}

#[test]
fn test_empty_replacement_keeps_loaded_model() {
    let cube = write_temp(CUBE_OBJ, ".obj");
    let empty = write_temp("# no geometry\n", ".obj");
    let mut reactor = reactor_with_loader(Parameters::default());
    let mut source = ConstantSpectrum::filled(512, 255);
    reactor.request_model(cube.path()).unwrap();
    tick_until_model_event(&mut reactor, &mut source);

    let checksum = reactor.targets().position_checksum();
    reactor.request_model(empty.path()).unwrap();
    let mut silent = SilentSource { bin_count: 512 };
    let event = tick_until_model_event(&mut reactor, &mut silent);

    assert!(matches!(
        event,
        ModelEvent::Rejected {
            state: TargetState::ModelActive,
            ..
        }
    ));
    assert_eq!(reactor.targets().vertex_count(), 8);
    assert_eq!(reactor.targets().position_checksum(), checksum);
}
