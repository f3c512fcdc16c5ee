//! Synthesizer tests: sine table, DDS engine and blocking tone generation

use rotary_tone_dialer::audio::dds::{mix, sample_index, MAX_OUTPUT, PHASE_PERIOD};
use rotary_tone_dialer::audio::lut::{LUT_MIDPOINT, LUT_PEAK, LUT_SIZE, SINE_LUT};
use rotary_tone_dialer::audio::tones::{self, ToneSpec, Voice, SAMPLE_RATE_HZ, SUPERVISORY_MS};
use rotary_tone_dialer::audio::{ToneEngine, ToneGenerator};
use rotary_tone_dialer::hal::{AudioSink, LowPower};
use rotary_tone_dialer::timing::ms_to_ticks;
use rotary_tone_dialer::{Digit, TickClock};

/// Ticks the engine and clock from `idle`, like the sample ISR would.
struct TickBoard<'a> {
    engine: &'a ToneEngine,
    clock: &'a TickClock,
    playing: bool,
    started: u32,
    audible_ticks: u32,
    idle_ticks: u32,
    tones: Vec<ToneSpec>,
}

impl<'a> TickBoard<'a> {
    fn new(engine: &'a ToneEngine, clock: &'a TickClock) -> Self {
        Self {
            engine,
            clock,
            playing: false,
            started: 0,
            audible_ticks: 0,
            idle_ticks: 0,
            tones: Vec::new(),
        }
    }
}

impl AudioSink for TickBoard<'_> {
    fn start(&mut self) {
        self.playing = true;
        self.started += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

impl LowPower for TickBoard<'_> {
    fn idle(&mut self) {
        let sample = self.engine.tick();
        self.clock.tick();
        assert!(sample <= MAX_OUTPUT);
        if self.playing {
            self.audible_ticks += 1;
            let tone = self.engine.tone();
            if self.tones.last() != Some(&tone) {
                self.tones.push(tone);
            }
        } else {
            self.idle_ticks += 1;
        }
    }

    fn power_down(&mut self) {
        panic!("tone generation must not power down");
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

// ============================================================================
// Sine table
// ============================================================================

#[test]
fn test_lut_shape() {
    assert_eq!(SINE_LUT.len(), LUT_SIZE);
    assert_eq!(SINE_LUT[0], LUT_MIDPOINT);
    assert_eq!(SINE_LUT[LUT_SIZE / 2], LUT_MIDPOINT);
    assert_eq!(SINE_LUT[LUT_SIZE / 4], LUT_PEAK);
    assert_eq!(SINE_LUT[3 * LUT_SIZE / 4], 0);
}

#[test]
fn test_lut_matches_formula() {
    for (i, &value) in SINE_LUT.iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / LUT_SIZE as f64;
        let expected = (64.0 + 63.5 * angle.sin()).round().clamp(0.0, 127.0) as u8;
        assert!(
            (value as i16 - expected as i16).abs() <= 1,
            "LUT[{}] = {}, expected ~{}",
            i,
            value,
            expected
        );
    }
}

#[test]
fn test_lut_half_wave_symmetry() {
    // sin(x + π) = -sin(x) around the midpoint
    for i in 1..LUT_SIZE / 2 {
        let a = SINE_LUT[i] as i16 - LUT_MIDPOINT as i16;
        let b = SINE_LUT[i + LUT_SIZE / 2] as i16 - LUT_MIDPOINT as i16;
        assert!((a + b).abs() <= 1, "asymmetry at {}: {} vs {}", i, a, b);
    }
}

// ============================================================================
// DDS engine
// ============================================================================

#[test]
fn test_mix_formula_over_all_table_values() {
    for a in 0..=LUT_PEAK {
        for b in 0..=LUT_PEAK {
            let expected = a as u16 + b as u16 - (b as u16 / 4);
            assert_eq!(mix(a, b) as u16, expected);
            assert!(mix(a, b) <= MAX_OUTPUT);
        }
    }
    assert_eq!(mix(LUT_PEAK, LUT_PEAK), MAX_OUTPUT);
}

#[test]
fn test_phase_index_covers_one_period() {
    assert_eq!(PHASE_PERIOD, 1024);
    let mut seen = [false; LUT_SIZE];
    for phase in 0..PHASE_PERIOD as u16 {
        seen[sample_index(phase)] = true;
    }
    assert!(seen.iter().all(|&s| s));
    // Phase wraps mod 2^16 without disturbing the index sequence.
    assert_eq!(sample_index(u16::MAX), sample_index(PHASE_PERIOD as u16 - 1));
}

#[test]
fn test_single_tone_output_is_periodic() {
    for digit in [Digit::Beep, Digit::BeepLow, Digit::Supervisory] {
        let Voice::Steady(spec) = tones::voice(digit) else {
            panic!("beeps are steady tones");
        };
        let period = (PHASE_PERIOD / gcd(spec.step_a as u32, PHASE_PERIOD)) as usize;

        let engine = ToneEngine::new();
        engine.set_tone(spec);
        let samples: Vec<u8> = (0..period * 2).map(|_| engine.tick()).collect();
        assert_eq!(samples[..period], samples[period..], "step {}", spec.step_a);
        assert!(samples.iter().all(|&s| s <= LUT_PEAK));
    }
}

#[test]
fn test_single_tone_output_is_tone_a_sample() {
    let engine = ToneEngine::new();
    engine.set_tone(ToneSpec::single(33));

    let mut phase: u16 = 0;
    for tick in 0..5000 {
        phase = phase.wrapping_add(33);
        assert_eq!(engine.tick(), SINE_LUT[sample_index(phase)], "tick {}", tick);
    }
}

#[test]
fn test_dual_tone_output_is_periodic() {
    let Voice::Steady(spec) = tones::voice(Digit::D5) else {
        panic!("DTMF digits are steady tones");
    };
    assert!(!spec.is_single());

    let pa = PHASE_PERIOD / gcd(spec.step_a as u32, PHASE_PERIOD);
    let pb = PHASE_PERIOD / gcd(spec.step_b as u32, PHASE_PERIOD);
    let period = (pa * pb / gcd(pa, pb)) as usize;

    let engine = ToneEngine::new();
    engine.set_tone(spec);
    let samples: Vec<u8> = (0..period * 2).map(|_| engine.tick()).collect();
    assert_eq!(samples[..period], samples[period..]);
    assert!(samples.iter().any(|&s| s > LUT_PEAK), "tone B must add on top of tone A");
}

#[test]
fn test_engine_reset_zeroes_phases() {
    let engine = ToneEngine::new();
    engine.set_tone(ToneSpec::dual(79, 46));
    for _ in 0..37 {
        engine.tick();
    }
    engine.reset();
    assert_eq!(engine.tone(), ToneSpec::SILENT);

    let fresh = ToneEngine::new();
    engine.set_tone(ToneSpec::dual(79, 46));
    fresh.set_tone(ToneSpec::dual(79, 46));
    for _ in 0..64 {
        assert_eq!(engine.tick(), fresh.tick());
    }
}

#[test]
fn test_every_dialable_symbol_has_a_tone() {
    let dialable = [
        Digit::D0, Digit::D1, Digit::D2, Digit::D3, Digit::D4, Digit::D5, Digit::D6, Digit::D7,
        Digit::D8, Digit::D9, Digit::Star, Digit::Pound, Digit::Mf0, Digit::Mf1, Digit::Mf2,
        Digit::Mf3, Digit::Mf4, Digit::Mf5, Digit::Mf6, Digit::Mf7, Digit::Mf8, Digit::Mf9,
        Digit::MfKp, Digit::MfSt, Digit::MfStp, Digit::MfSt2p, Digit::Supervisory,
    ];
    let mut specs = Vec::new();
    for digit in dialable {
        match tones::voice(digit) {
            Voice::Steady(spec) => {
                assert_ne!(spec.step_a, 0, "{:?}", digit);
                specs.push(spec);
            }
            other => panic!("{:?} sounds as {:?}", digit, other),
        }
    }
    // DTMF and MF tables are each free of duplicates.
    for (i, a) in specs.iter().enumerate() {
        for b in &specs[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(tones::voice(Digit::Off), Voice::Silent);
}

// ============================================================================
// Blocking generator
// ============================================================================

#[test]
fn test_generate_steady_tone_for_duration() {
    let engine = ToneEngine::new();
    let clock = TickClock::new();
    let generator = ToneGenerator::new(&engine, &clock);
    let mut board = TickBoard::new(&engine, &clock);

    generator.generate_tone(&mut board, Digit::D7, 100);

    let Voice::Steady(spec) = tones::voice(Digit::D7) else {
        unreachable!()
    };
    assert_eq!(board.started, 1);
    assert!(!board.playing);
    assert_eq!(board.audible_ticks, ms_to_ticks(100));
    assert_eq!(board.tones, vec![spec]);
    assert_eq!(engine.tone(), ToneSpec::SILENT);
}

#[test]
fn test_generate_off_is_silent_and_immediate() {
    let engine = ToneEngine::new();
    let clock = TickClock::new();
    let generator = ToneGenerator::new(&engine, &clock);
    let mut board = TickBoard::new(&engine, &clock);

    generator.generate_tone(&mut board, Digit::Off, 200);

    assert_eq!(board.started, 0);
    assert_eq!(clock.now(), 0);
}

#[test]
fn test_generate_melody_plays_notes_in_order() {
    let engine = ToneEngine::new();
    let clock = TickClock::new();
    let generator = ToneGenerator::new(&engine, &clock);
    let mut board = TickBoard::new(&engine, &clock);

    generator.generate_tone(&mut board, Digit::TuneAsc, 300);

    let steps: Vec<u8> = board.tones.iter().map(|t| t.step_a).collect();
    let expected: Vec<u8> = tones::TUNE_ASC.iter().map(|n| n.step).collect();
    assert_eq!(steps, expected);
    assert!(board.tones.iter().all(|t| t.is_single()));
    assert_eq!(board.audible_ticks, 3 * ms_to_ticks(100));

    // Descending two-note tune: halves
    let mut board = TickBoard::new(&engine, &clock);
    generator.generate_tone(&mut board, Digit::TuneDesc2, 800);
    let steps: Vec<u8> = board.tones.iter().map(|t| t.step_a).collect();
    assert_eq!(steps, vec![tones::TUNE_DESC2[0].step, tones::TUNE_DESC2[1].step]);
    assert_eq!(board.audible_ticks, 2 * ms_to_ticks(400));
}

#[test]
fn test_supervisory_ignores_requested_duration() {
    let engine = ToneEngine::new();
    let clock = TickClock::new();
    let generator = ToneGenerator::new(&engine, &clock);
    let mut board = TickBoard::new(&engine, &clock);

    generator.generate_tone(&mut board, Digit::Supervisory, 50);

    assert_eq!(board.audible_ticks, ms_to_ticks(SUPERVISORY_MS as u32));
    assert_eq!(ms_to_ticks(SUPERVISORY_MS as u32), SAMPLE_RATE_HZ);
}

#[test]
fn test_silence_keeps_output_off() {
    let engine = ToneEngine::new();
    let clock = TickClock::new();
    let generator = ToneGenerator::new(&engine, &clock);
    let mut board = TickBoard::new(&engine, &clock);

    generator.silence(&mut board, 200);

    assert_eq!(board.started, 0);
    assert_eq!(board.audible_ticks, 0);
    assert_eq!(board.idle_ticks, ms_to_ticks(200));
}
