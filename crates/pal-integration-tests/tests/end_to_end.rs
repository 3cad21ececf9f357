//! # Compile → Record → Program → Verify
//!
//! Exercises the whole toolchain against the simulated board, including
//! the four reference scenarios:
//!
//! - A: "HI" compiles to two terms; only term 1 drives `done`.
//! - B: a one-symbol string has a single term, in O0, valid and done.
//! - C: a 28-word record lands 8/8/8/4 across a 4 × 8 channel bank.
//! - D: decoy "NOPE!" against "HELLO" is never recognized and fails a step.

use std::path::Path;

use pal_compiler::{compile, emit, OutputKind};
use pal_core::{lookup, LoaderError, PalError, PalSettings, RecordError, RegistryError, TargetString};
use pal_loader::{ChannelPlan, Loader};
use pal_record::{
    compile_and_build, module_path_for, BitstreamAssembler, ConfigurationRecord, PersistedModule,
    RegistryBuilder,
};
use pal_sim::{rig, SimulatedPal, SimulatedSequencers};
use pal_verify::{run_suite, verify, Failure, Verdict, DEFAULT_DECOYS};

/// Stands in for the external assembler: reports 28 words derived from
/// the equation text it was given.
struct FoldingAssembler;

impl BitstreamAssembler for FoldingAssembler {
    fn assemble(&self, equations: &Path) -> Result<String, RecordError> {
        let text = std::fs::read_to_string(equations).map_err(|e| RecordError::Assembler(e.to_string()))?;
        // FNV-1a, then xorshift for the word stream.
        let mut state = text
            .bytes()
            .fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
        let words: Vec<String> = (0..28)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                format!("0x{:02x}", state & 0xff)
            })
            .collect();
        Ok(format!(
            "# folding assembler\n'fuses' : 2194,\n    'prog' : [{}],\n",
            words.join(", ")
        ))
    }
}

fn build_record(dir: &Path, msg: &str) -> ConfigurationRecord {
    let equations = dir.join(format!("{}.txt", msg.len()));
    let (_, record) = compile_and_build(msg, &equations, &FoldingAssembler).unwrap();
    record
}

// ─── Reference Scenarios ─────────────────────────────────────────────

#[test]
fn scenario_a_hi() {
    let c = compile("HI").unwrap();
    assert_eq!(c.terms().len(), 2);
    assert_eq!(c.terms()[0].state().value(), 0);
    assert_eq!(c.terms()[0].code(), lookup('H').unwrap());
    assert_eq!(c.terms()[1].state().value(), 1);
    assert_eq!(c.terms()[1].code(), lookup('I').unwrap());
    assert_eq!(c.output(OutputKind::Done).terms(), &[1]);
}

#[test]
fn scenario_b_single_symbol() {
    let c = compile("A").unwrap();
    assert_eq!(c.terms().len(), 1);
    // Next state is 1: only bit 0 of the state is driven.
    for kind in [OutputKind::NextStateBit0, OutputKind::Valid, OutputKind::Done] {
        assert_eq!(c.output(kind).terms(), &[0], "{kind}");
    }
    for kind in [OutputKind::NextStateBit1, OutputKind::NextStateBit2] {
        assert!(c.output(kind).terms().is_empty(), "{kind}");
    }
}

#[test]
fn scenario_c_channel_distribution() {
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "HELLO");
    let (mut device, mut loader) = rig(&record, &PalSettings::default()).unwrap();

    let summary = loader.program(&mut device, &record).unwrap();
    loader.wait_idle().unwrap();

    assert_eq!(summary.per_channel, vec![8, 8, 8, 4]);
    let pass = loader.bank().last_pass();
    assert_eq!(pass[0], record.words()[0..8]);
    assert_eq!(pass[1], record.words()[8..16]);
    assert_eq!(pass[2], record.words()[16..24]);
    assert_eq!(pass[3], record.words()[24..28]);
    assert_eq!(device.received(), record.words());
}

#[test]
fn scenario_d_decoy_nope() {
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "HELLO");
    let (mut device, mut loader) = rig(&record, &PalSettings::default()).unwrap();
    loader.program(&mut device, &record).unwrap();
    loader.wait_idle().unwrap();

    let report = verify(&mut device, &record, "NOPE!", false);
    assert!(!report.done_seen);
    assert!(report.failed_steps() >= 1);
    assert!(report.passed());
}

// ─── Full Pipeline ───────────────────────────────────────────────────

#[test]
fn compile_persist_reload_and_verify() {
    let dir = tempfile::tempdir().unwrap();
    let equations = dir.path().join("greeting.txt");
    let (compilation, record) = compile_and_build("Hello World", &equations, &FoldingAssembler).unwrap();

    assert_eq!(std::fs::read_to_string(&equations).unwrap(), emit(&compilation));

    let mut module = PersistedModule::new();
    assert_eq!(module.insert(&record), "hello_world_config");
    let module_path = module_path_for(&equations);
    module.write(&module_path).unwrap();

    let mut builder = RegistryBuilder::new();
    builder.register_dir(dir.path()).unwrap();
    let registry = builder.build();
    let loaded = registry.get_by_key("hello_world").unwrap();
    assert_eq!(loaded, &record);

    let (mut device, mut loader) = rig(loaded, &PalSettings::default()).unwrap();
    let suite = run_suite(&mut device, &mut loader, loaded, &DEFAULT_DECOYS).unwrap();
    assert!(suite.passed(), "{:#?}", suite.reports);
    assert_eq!(suite.reports.len(), 1 + DEFAULT_DECOYS.len());
    assert_eq!(suite.reports[0].trail().lines().count(), 11);
}

#[test]
fn compile_rejection_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let equations = dir.path().join("bad.txt");
    let err = compile_and_build("HELLO, WORLD", &equations, &FoldingAssembler).unwrap_err();
    assert!(matches!(err, PalError::Compile(_)));
    assert!(!equations.exists());
}

#[test]
fn device_loaded_with_foreign_record_misses_and_sweeps() {
    let dir = tempfile::tempdir().unwrap();
    let hello = build_record(dir.path(), "HELLO");
    let world = build_record(dir.path(), "WORLD");
    assert_ne!(hello.words(), world.words());

    // Built for HELLO, programmed with WORLD's bitstream.
    let (mut device, mut loader) = rig(&hello, &PalSettings::default()).unwrap();
    let suite = run_suite(&mut device, &mut loader, &world, &[]).unwrap();
    let report = &suite.reports[0];
    assert_eq!(report.verdict, Verdict::Fail(Failure::MissedRecognition));
    // The device stays dark, so the sweep finds nothing.
    assert!(report.diagnostics.is_empty());
}

// ─── Transfer Protocol Guards ────────────────────────────────────────

#[test]
fn shape_mismatch_touches_no_signal() {
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "HI");
    let mut device = SimulatedPal::new(&record);
    let bank = SimulatedSequencers::new(device.clone(), 4, 8);
    let mut loader = Loader::new(bank, ChannelPlan::new(4, 8, 30).unwrap(), 0, 5_000_000).unwrap();
    assert_eq!(
        loader.program(&mut device, &record),
        Err(LoaderError::ShapeMismatch {
            expected: 30,
            actual: 28
        })
    );
    assert!(device.signals().is_empty());
    assert!(loader.bank().commits().is_empty());
}

#[test]
fn second_pass_refused_while_shifting() {
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "HI");
    let settings = PalSettings::default();
    let mut device = SimulatedPal::new(&record);
    // 1 kHz serial clock: a full quota takes 64 ms to shift.
    let bank = SimulatedSequencers::from_settings(device.clone(), &settings).with_serial_rate(1_000);
    let mut loader = Loader::from_settings(bank, &settings).unwrap();

    loader.program(&mut device, &record).unwrap();
    assert_eq!(loader.program(&mut device, &record), Err(LoaderError::PassInProgress));

    loader.wait_idle().unwrap();
    assert!(device.is_configured());
    loader.program(&mut device, &record).unwrap();
    loader.wait_idle().unwrap();
    assert_eq!(loader.bank().commits(), &[0, 0]);
}

#[test]
fn short_bank_quota_is_refused_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "HI");
    let device = SimulatedPal::new(&record);
    let bank = SimulatedSequencers::new(device.clone(), 4, 7);
    assert!(matches!(
        Loader::from_settings(bank, &PalSettings::default()),
        Err(LoaderError::Sequencer(_))
    ));
    assert!(device.received().is_empty());
}

#[test]
fn huge_quota_is_rejected_by_settings() {
    let settings = PalSettings {
        quota: 3_000_000_000,
        ..PalSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn registry_rejects_aliasing_modules() {
    let dir = tempfile::tempdir().unwrap();
    for (file, msg) in [("a.json", "DON'T PANIC"), ("b.json", "DONT PANIC")] {
        let mut module = PersistedModule::new();
        module.insert(&build_record(dir.path(), msg));
        module.write(&dir.path().join(file)).unwrap();
    }
    let err = RegistryBuilder::new().register_dir(dir.path()).unwrap_err();
    assert!(matches!(
        err,
        PalError::Registry(RegistryError::KeyCollision { ref key, .. }) if key == "dont_panic"
    ));
}

#[test]
fn lowercase_input_is_normalized_end_to_end() {
    let target = TargetString::parse("nope!").unwrap();
    assert_eq!(target.as_str(), "NOPE!");
    let dir = tempfile::tempdir().unwrap();
    let record = build_record(dir.path(), "nope!");
    assert_eq!(record.key(), "nope");
    assert_eq!(record.source(), &target);
}
