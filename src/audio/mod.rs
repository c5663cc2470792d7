use std::{fs, path::Path, sync::Arc};

use tracing::{info, warn};

use crate::core::Cue;

const CUE_FILES: [(Cue, &str); 3] = [
    (Cue::Correct, "correct.wav"),
    (Cue::Incorrect, "incorrect.wav"),
    (Cue::WordComplete, "word_complete.wav"),
];

/// Fire-and-forget feedback sounds. A cue without a clip is silent.
pub struct SoundBank {
    clips: [Option<Arc<[u8]>>; 3],
    output: Option<backend::Output>,
}

impl SoundBank {
    pub fn silent() -> Self {
        Self {
            clips: [None, None, None],
            output: None,
        }
    }

    /// Reads the three cue files from `dir`. Missing or unreadable clips are
    /// logged and left silent.
    pub fn load(dir: &Path) -> Self {
        let mut clips: [Option<Arc<[u8]>>; 3] = [None, None, None];
        for (cue, file) in CUE_FILES {
            let path = dir.join(file);
            match fs::read(&path) {
                Ok(bytes) if backend::decodes(&bytes) => {
                    clips[slot(cue)] = Some(Arc::from(bytes));
                }
                Ok(_) => warn!(path = %path.display(), "sound file not decodable, cue disabled"),
                Err(err) => warn!(path = %path.display(), error = %err, "sound file not found, cue disabled"),
            }
        }
        let output = if clips.iter().any(Option::is_some) {
            backend::Output::open()
        } else {
            None
        };
        Self { clips, output }
    }

    pub fn has_clip(&self, cue: Cue) -> bool {
        self.clips[slot(cue)].is_some()
    }

    pub fn play(&self, cue: Cue) {
        let (Some(clip), Some(output)) = (&self.clips[slot(cue)], &self.output) else {
            return;
        };
        output.play(Arc::clone(clip));
    }
}

fn slot(cue: Cue) -> usize {
    match cue {
        Cue::Correct => 0,
        Cue::Incorrect => 1,
        Cue::WordComplete => 2,
    }
}

#[cfg(feature = "audio")]
mod backend {
    use std::{io::Cursor, sync::Arc};

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
    use tracing::{info, warn};

    pub struct Output {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl Output {
        pub fn open() -> Option<Self> {
            match OutputStream::try_default() {
                Ok((stream, handle)) => Some(Self {
                    _stream: stream,
                    handle,
                }),
                Err(err) => {
                    warn!(error = %err, "no audio device, sounds disabled");
                    None
                }
            }
        }

        pub fn play(&self, clip: Arc<[u8]>) {
            let Ok(source) = Decoder::new(Cursor::new(clip)) else {
                return;
            };
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    sink.append(source);
                    sink.detach();
                }
                Err(err) => info!(error = %err, "audio sink unavailable"),
            }
        }
    }

    pub fn decodes(bytes: &[u8]) -> bool {
        Decoder::new(Cursor::new(bytes.to_vec())).is_ok()
    }
}

#[cfg(not(feature = "audio"))]
mod backend {
    use std::sync::Arc;

    pub struct Output;

    impl Output {
        pub fn open() -> Option<Self> {
            tracing::debug!("built without the audio feature, sounds are silent");
            None
        }

        pub fn play(&self, _clip: Arc<[u8]>) {}
    }

    /// Without a decoder only the RIFF/WAVE header can be checked.
    pub fn decodes(bytes: &[u8]) -> bool {
        bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
    }
}

/// Logs which cues will be audible.
pub fn report(bank: &SoundBank) {
    let enabled: Vec<&str> = CUE_FILES
        .iter()
        .filter(|(cue, _)| bank.has_clip(*cue))
        .map(|(_, file)| *file)
        .collect();
    info!(?enabled, "sound cues");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_header() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&36u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&8_000u32.to_le_bytes());
        bytes.extend_from_slice(&16_000u32.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes
    }

    mod load {
        use super::*;

        #[test]
        fn missing_directory_is_silent() {
            let bank = SoundBank::load(Path::new("/nonexistent/sounds"));
            assert!(!bank.has_clip(Cue::Correct));
            assert!(!bank.has_clip(Cue::Incorrect));
            assert!(!bank.has_clip(Cue::WordComplete));
            bank.play(Cue::Correct);
        }

        #[test]
        fn each_cue_loads_independently() {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("correct.wav"), wav_header()).unwrap();
            fs::write(dir.path().join("incorrect.wav"), b"not a wav").unwrap();
            let bank = SoundBank::load(dir.path());
            assert!(bank.has_clip(Cue::Correct));
            assert!(!bank.has_clip(Cue::Incorrect));
            assert!(!bank.has_clip(Cue::WordComplete));
        }
    }

    mod silent {
        use super::*;

        #[test]
        fn play_is_a_no_op() {
            let bank = SoundBank::silent();
            for cue in [Cue::Correct, Cue::Incorrect, Cue::WordComplete] {
                assert!(!bank.has_clip(cue));
                bank.play(cue);
            }
        }
    }
}
