use crate::storage::KeyValueStore;

/// Storage key of the mute preference, saved as `"true"` or `"false"`.
pub const MUTE_KEY: &str = "audio-muted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Incorrect,
    ChapterComplete,
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Sawtooth,
}

/// A single oscillator note, timed relative to when the cue is played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub frequency: f32,
    /// Target frequency of an exponential glide and how long the glide takes, in seconds.
    pub glide_to: Option<(f32, f64)>,
    pub waveform: Waveform,
    pub gain: f32,
    pub start: f64,
    pub duration: f64,
}

/// Gain the envelope decays to before the oscillator stops.
pub const RELEASE_GAIN: f32 = 0.01;

impl Cue {
    pub fn tones(self) -> Vec<Tone> {
        match self {
            Cue::Correct => vec![Tone {
                frequency: 800.0,
                glide_to: Some((1200.0, 0.1)),
                waveform: Waveform::Sine,
                gain: 0.3,
                start: 0.0,
                duration: 0.3,
            }],
            Cue::Incorrect => vec![Tone {
                frequency: 200.0,
                glide_to: Some((150.0, 0.2)),
                waveform: Waveform::Sawtooth,
                gain: 0.2,
                start: 0.0,
                duration: 0.3,
            }],
            // C major triad, one note every 100 ms.
            Cue::ChapterComplete => [523.25, 659.25, 783.99]
                .into_iter()
                .enumerate()
                .map(|(index, frequency)| Tone {
                    frequency,
                    glide_to: None,
                    waveform: Waveform::Sine,
                    gain: 0.2,
                    start: index as f64 * 0.1,
                    duration: 0.5,
                })
                .collect(),
            Cue::Click => vec![Tone {
                frequency: 1000.0,
                glide_to: None,
                waveform: Waveform::Sine,
                gain: 0.1,
                start: 0.0,
                duration: 0.05,
            }],
        }
    }

    pub fn length(self) -> f64 {
        self.tones()
            .iter()
            .map(|tone| tone.start + tone.duration)
            .fold(0.0, f64::max)
    }
}

/// One sustained layer of the background drone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drone {
    pub frequency: f32,
    pub gain: f32,
    /// Rate in Hz and depth of a slow oscillation applied to the layer's gain.
    pub pulse: Option<(f32, f32)>,
}

/// Overall volume of the background drone.
pub const AMBIENT_MASTER_GAIN: f32 = 0.08;

/// A1 bass, two pads a fifth apart and a faint A5 shimmer.
pub const AMBIENT_LAYERS: [Drone; 4] = [
    Drone {
        frequency: 55.0,
        gain: 0.4,
        pulse: Some((0.2, 0.03)),
    },
    Drone {
        frequency: 110.0,
        gain: 0.15,
        pulse: None,
    },
    Drone {
        frequency: 165.0,
        gain: 0.12,
        pulse: None,
    },
    Drone {
        frequency: 880.0,
        gain: 0.05,
        pulse: Some((0.5, 0.02)),
    },
];

/// Saved mute preference; anything but `"true"` means sound is on.
pub fn load_muted<S: KeyValueStore>(storage: &S) -> bool {
    match storage.get(MUTE_KEY) {
        Ok(value) => value.as_deref() == Some("true"),
        Err(error) => {
            log::warn!("mute preference unavailable: {error}");
            false
        }
    }
}

pub fn save_muted<S: KeyValueStore>(storage: &mut S, muted: bool) {
    if let Err(error) = storage.set(MUTE_KEY, if muted { "true" } else { "false" }) {
        log::warn!("mute preference not saved: {error}");
    }
}

#[cfg(target_arch = "wasm32")]
pub use player::CuePlayer;

#[cfg(target_arch = "wasm32")]
mod player {
    use super::{AMBIENT_LAYERS, AMBIENT_MASTER_GAIN, Cue, Drone, RELEASE_GAIN, Tone, Waveform};
    use wasm_bindgen::JsValue;
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    /// Nodes of a running background drone.
    struct Ambient {
        master: GainNode,
        gains: Vec<GainNode>,
        oscillators: Vec<OscillatorNode>,
    }

    impl Ambient {
        fn stop(self) {
            for oscillator in &self.oscillators {
                let _ = oscillator.stop();
                let _ = oscillator.disconnect();
            }
            for gain in &self.gains {
                let _ = gain.disconnect();
            }
            let _ = self.master.disconnect();
        }
    }

    /// Plays cues and the background drone through one lazily created
    /// `AudioContext`.
    pub struct CuePlayer {
        context: Option<AudioContext>,
        muted: bool,
        ambient: Option<Ambient>,
        ambient_requested: bool,
    }

    impl Default for CuePlayer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CuePlayer {
        pub fn new() -> Self {
            Self {
                context: None,
                muted: false,
                ambient: None,
                ambient_requested: false,
            }
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }

        /// Muting silences the drone too; unmuting resumes it if it was running.
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
            if muted {
                if let Some(ambient) = self.ambient.take() {
                    ambient.stop();
                }
            } else if self.ambient_requested {
                self.resume_ambient();
            }
        }

        /// Starts the drone unless it is already running or sound is muted.
        pub fn start_ambient(&mut self) {
            self.ambient_requested = true;
            if !self.muted {
                self.resume_ambient();
            }
        }

        pub fn stop_ambient(&mut self) {
            self.ambient_requested = false;
            if let Some(ambient) = self.ambient.take() {
                ambient.stop();
            }
        }

        pub fn play(&mut self, cue: Cue) {
            if self.muted {
                return;
            }

            if let Some(context) = self.context() {
                for tone in cue.tones() {
                    if let Err(error) = schedule(context, &tone) {
                        log::debug!("dropped tone for {:?}: {:?}", cue, error);
                    }
                }
            }
        }

        fn resume_ambient(&mut self) {
            if self.ambient.is_some() {
                return;
            }

            let Some(context) = self.context() else {
                return;
            };
            match drone(context) {
                Ok(ambient) => self.ambient = Some(ambient),
                Err(error) => log::warn!("background drone unavailable: {:?}", error),
            }
        }

        fn context(&mut self) -> Option<&AudioContext> {
            if self.context.is_none() {
                match AudioContext::new() {
                    Ok(context) => self.context = Some(context),
                    Err(error) => {
                        log::warn!("audio unavailable: {:?}", error);
                        return None;
                    }
                }
            }
            self.context.as_ref()
        }
    }

    fn drone(context: &AudioContext) -> Result<Ambient, JsValue> {
        let master = context.create_gain()?;
        master.gain().set_value(AMBIENT_MASTER_GAIN);
        master.connect_with_audio_node(&context.destination())?;

        let mut ambient = Ambient {
            master,
            gains: Vec::new(),
            oscillators: Vec::new(),
        };

        for layer in AMBIENT_LAYERS {
            if let Err(error) = add_layer(context, &mut ambient, &layer) {
                ambient.stop();
                return Err(error);
            }
        }
        Ok(ambient)
    }

    fn add_layer(
        context: &AudioContext,
        ambient: &mut Ambient,
        layer: &Drone,
    ) -> Result<(), JsValue> {
        let oscillator = context.create_oscillator()?;
        let gain = context.create_gain()?;
        oscillator.set_type(OscillatorType::Sine);
        oscillator.frequency().set_value(layer.frequency);
        gain.gain().set_value(layer.gain);
        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ambient.master)?;
        oscillator.start()?;
        ambient.oscillators.push(oscillator);

        if let Some((rate, depth)) = layer.pulse {
            let lfo = context.create_oscillator()?;
            let lfo_gain = context.create_gain()?;
            lfo.set_type(OscillatorType::Sine);
            lfo.frequency().set_value(rate);
            lfo_gain.gain().set_value(depth);
            lfo.connect_with_audio_node(&lfo_gain)?;
            lfo_gain.connect_with_audio_param(&gain.gain())?;
            lfo.start()?;
            ambient.oscillators.push(lfo);
            ambient.gains.push(lfo_gain);
        }

        ambient.gains.push(gain);
        Ok(())
    }

    fn schedule(context: &AudioContext, tone: &Tone) -> Result<(), JsValue> {
        let oscillator = context.create_oscillator()?;
        let gain = context.create_gain()?;

        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&context.destination())?;

        let start = context.current_time() + tone.start;
        let stop = start + tone.duration;

        oscillator.set_type(match tone.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        });
        oscillator
            .frequency()
            .set_value_at_time(tone.frequency, start)?;
        if let Some((target, ramp)) = tone.glide_to {
            oscillator
                .frequency()
                .exponential_ramp_to_value_at_time(target, start + ramp)?;
        }

        gain.gain().set_value_at_time(tone.gain, start)?;
        gain.gain()
            .exponential_ramp_to_value_at_time(RELEASE_GAIN, stop)?;

        oscillator.start_with_when(start)?;
        oscillator.stop_with_when(stop)?;
        Ok(())
    }
}
