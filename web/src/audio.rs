use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

/// Sound cues synthesized on the fly: a short descending blip when a cell
/// opens and a low rumble when an ad goes off.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Cue {
    Pop,
    Boom,
}

struct Tone {
    wave: OscillatorType,
    start_hz: f32,
    end_hz: f32,
    gain: f32,
    secs: f64,
}

impl Cue {
    fn tone(self) -> Tone {
        match self {
            Cue::Pop => Tone {
                wave: OscillatorType::Sine,
                start_hz: 800.0,
                end_hz: 400.0,
                gain: 0.1,
                secs: 0.1,
            },
            Cue::Boom => Tone {
                wave: OscillatorType::Triangle,
                start_hz: 120.0,
                end_hz: 40.0,
                gain: 0.25,
                secs: 0.25,
            },
        }
    }
}

/// Plays a cue, silently skipping it where no `AudioContext` is available.
pub(crate) fn play(cue: Cue) {
    if let Err(err) = synth(cue) {
        log::debug!("audio cue {:?} skipped: {:?}", cue, err);
    }
}

fn synth(cue: Cue) -> Result<(), JsValue> {
    let Tone {
        wave,
        start_hz,
        end_hz,
        gain,
        secs,
    } = cue.tone();

    let ctx = AudioContext::new()?;
    let oscillator = ctx.create_oscillator()?;
    let gain_node = ctx.create_gain()?;

    oscillator.connect_with_audio_node(&gain_node)?;
    gain_node.connect_with_audio_node(&ctx.destination())?;

    let now = ctx.current_time();
    oscillator.set_type(wave);
    oscillator.frequency().set_value_at_time(start_hz, now)?;
    oscillator
        .frequency()
        .exponential_ramp_to_value_at_time(end_hz, now + secs)?;
    gain_node.gain().set_value_at_time(gain, now)?;
    gain_node
        .gain()
        .exponential_ramp_to_value_at_time(0.01, now + secs)?;

    oscillator.start()?;
    oscillator.stop_with_when(now + secs)?;
    Ok(())
}
